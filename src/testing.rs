//! Test doubles shared by the unit tests.

use std::collections::HashMap;

use crate::boundary::{entry, CallArg, CallValue, EngineCalls, ReturnKind};
use crate::error::CallFault;
use crate::probe::ProbeAccessor;
use crate::sink::PresentationSink;

/// One recorded boundary call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(Vec<u8>),
    Speed(i32),
    Flag(String, i32),
    Start,
    Stop,
    Pause,
    Resume,
    Key(u32, bool),
    Read(String, Option<i32>),
    Listing,
}

impl Call {
    pub fn is_read(&self) -> bool {
        matches!(self, Call::Read(..))
    }
}

/// Engine that records every call and serves probe values from a table.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<Call>,
    pub values: HashMap<(&'static str, Option<i32>), f64>,
    pub listing: String,
    pub fail_loads: bool,
}

impl FakeEngine {
    pub fn set_probe(&mut self, accessor: ProbeAccessor, value: u32) {
        let key = (accessor.entry(), accessor.index().map(i32::from));
        self.values.insert(key, f64::from(value));
    }

    pub fn set_register(&mut self, index: u8, value: u32) {
        self.set_probe(ProbeAccessor::Register(index), value);
    }

    /// Calls other than probe reads, in order.
    pub fn commands(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| !c.is_read()).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

fn int_arg(args: &[CallArg<'_>]) -> Option<i32> {
    match args.first() {
        Some(CallArg::Int(v)) => Some(*v),
        _ => None,
    }
}

impl EngineCalls for FakeEngine {
    fn invoke(
        &mut self,
        name: &str,
        returns: ReturnKind,
        args: &[CallArg<'_>],
    ) -> Result<CallValue, CallFault> {
        match name {
            entry::LOAD_ROM => {
                let bytes = match args.first() {
                    Some(CallArg::Bytes(b)) => b.to_vec(),
                    _ => Vec::new(),
                };
                self.calls.push(Call::Load(bytes));
                if self.fail_loads {
                    return Err(CallFault::Raised {
                        entry: name.to_string(),
                        message: "no such file".to_string(),
                    });
                }
            }
            entry::SET_SPEED => self.calls.push(Call::Speed(int_arg(args).unwrap_or(-1))),
            entry::START => self.calls.push(Call::Start),
            entry::STOP => self.calls.push(Call::Stop),
            entry::PAUSE => self.calls.push(Call::Pause),
            entry::RESUME => self.calls.push(Call::Resume),
            entry::KEY_DOWN | entry::KEY_UP => {
                let code = int_arg(args).unwrap_or(0) as u32;
                self.calls.push(Call::Key(code, name == entry::KEY_DOWN));
            }
            entry::DISASSEMBLY => {
                self.calls.push(Call::Listing);
                return Ok(CallValue::Text(self.listing.clone()));
            }
            _ if returns == ReturnKind::Number => {
                let index = int_arg(args);
                self.calls.push(Call::Read(name.to_string(), index));
                let value = self
                    .values
                    .iter()
                    .find(|((e, idx), _)| *e == name && *idx == index)
                    .map(|(_, v)| *v)
                    .unwrap_or(0.0);
                return Ok(CallValue::Number(value));
            }
            _ if name.starts_with("set") => {
                self.calls
                    .push(Call::Flag(name.to_string(), int_arg(args).unwrap_or(-1)));
            }
            _ => return Err(CallFault::MissingEntry(name.to_string())),
        }
        Ok(CallValue::Void)
    }
}

/// One recorded sink update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Render(String, String),
    StackHighlight(Option<usize>),
    Instruction(u32, Option<usize>),
    StartButton(bool),
    PauseButton(bool, bool),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn renders(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Render(id, text) => Some((id.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn last_stack_highlight(&self) -> Option<Option<usize>> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::StackHighlight(i) => Some(*i),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PresentationSink for RecordingSink {
    fn render_value(&mut self, identifier: &str, formatted: &str) {
        self.events.push(SinkEvent::Render(
            identifier.to_string(),
            formatted.to_string(),
        ));
    }

    fn set_stack_highlight(&mut self, index: Option<usize>) {
        self.events.push(SinkEvent::StackHighlight(index));
    }

    fn set_current_instruction(&mut self, address: u32, entry: Option<usize>) {
        self.events.push(SinkEvent::Instruction(address, entry));
    }

    fn set_start_button_state(&mut self, is_running: bool) {
        self.events.push(SinkEvent::StartButton(is_running));
    }

    fn set_pause_button_state(&mut self, is_paused: bool, is_running: bool) {
        self.events.push(SinkEvent::PauseButton(is_paused, is_running));
    }
}
