//! Typed wrapper over the engine's call-by-name surface.
//!
//! The engine only understands primitive arguments (integers and byte arrays)
//! and returns a number, a string, or nothing. [`BoundaryAdapter`] turns the
//! console's domain calls into that convention and holds no session state.

use tracing::{debug, error};

use crate::error::{CallFault, LoadFailure};
use crate::listing::InstructionListing;
use crate::probe::ProbeAccessor;

/// Argument passed across the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg<'a> {
    Int(i32),
    Bytes(&'a [u8]),
}

/// Declared return type of an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallValue {
    Void,
    Number(f64),
    Text(String),
}

/// The engine's foreign-call convention.
pub trait EngineCalls {
    fn invoke(
        &mut self,
        entry: &str,
        returns: ReturnKind,
        args: &[CallArg<'_>],
    ) -> Result<CallValue, CallFault>;
}

pub mod entry {
    pub const LOAD_ROM: &str = "loadRom";
    pub const SET_SPEED: &str = "setSpeed";
    pub const START: &str = "main";
    pub const STOP: &str = "stop";
    pub const PAUSE: &str = "pause";
    pub const RESUME: &str = "resume";
    pub const DISASSEMBLY: &str = "getDisassembledInstructions";
    pub const KEY_DOWN: &str = "pushKeyDownEvent";
    pub const KEY_UP: &str = "pushKeyUpEvent";
}

/// Setter entry point for a behavioral flag: `shiftQuirk` -> `setShiftQuirk`.
pub fn flag_entry(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(name.len() + 3);
            out.push_str("set");
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => "set".to_string(),
    }
}

pub struct BoundaryAdapter<E> {
    engine: E,
    rom_dir: String,
    program_start: u32,
}

impl<E: EngineCalls> BoundaryAdapter<E> {
    pub fn new(engine: E, rom_dir: impl Into<String>, program_start: u32) -> Self {
        Self {
            engine,
            rom_dir: rom_dir.into(),
            program_start,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// NUL-terminated resource path handed to the loader.
    pub fn rom_path_bytes(&self, filename: &str) -> Result<Vec<u8>, LoadFailure> {
        if filename.contains('\0') {
            return Err(LoadFailure::InvalidPath(filename.to_string()));
        }
        let mut bytes = Vec::with_capacity(self.rom_dir.len() + filename.len() + 1);
        bytes.extend_from_slice(self.rom_dir.as_bytes());
        bytes.extend_from_slice(filename.as_bytes());
        bytes.push(0);
        Ok(bytes)
    }

    /// Replaces the engine's program memory. The only fallible boundary call.
    pub fn load_program(&mut self, filename: &str) -> Result<(), LoadFailure> {
        let path = self.rom_path_bytes(filename)?;
        self.engine
            .invoke(entry::LOAD_ROM, ReturnKind::Void, &[CallArg::Bytes(&path)])
            .map_err(|source| LoadFailure::Engine {
                filename: filename.to_string(),
                source,
            })?;
        debug!(filename, "program loaded");
        Ok(())
    }

    pub fn set_speed(&mut self, rate: u32) {
        let rate = i32::try_from(rate).unwrap_or(i32::MAX);
        self.call_void(entry::SET_SPEED, &[CallArg::Int(rate)]);
    }

    pub fn set_flag(&mut self, name: &str, enabled: bool) {
        let entry = flag_entry(name);
        self.call_void(&entry, &[CallArg::Int(i32::from(enabled))]);
    }

    pub fn start(&mut self) {
        self.call_void(entry::START, &[]);
    }

    pub fn stop(&mut self) {
        self.call_void(entry::STOP, &[]);
    }

    pub fn pause(&mut self) {
        self.call_void(entry::PAUSE, &[]);
    }

    pub fn resume(&mut self) {
        self.call_void(entry::RESUME, &[]);
    }

    pub fn push_key_event(&mut self, key_code: u32, pressed: bool) {
        let entry = if pressed { entry::KEY_DOWN } else { entry::KEY_UP };
        let code = i32::try_from(key_code).unwrap_or(0);
        self.call_void(entry, &[CallArg::Int(code)]);
    }

    pub fn read_probe(&mut self, accessor: ProbeAccessor) -> u32 {
        let index = accessor.index().map(|i| [CallArg::Int(i32::from(i))]);
        let args: &[CallArg<'_>] = match &index {
            Some(a) => &a[..],
            None => &[],
        };
        match self.engine.invoke(accessor.entry(), ReturnKind::Number, args) {
            Ok(CallValue::Number(n)) if n.is_finite() && n >= 0.0 => n as u32,
            Ok(_) => {
                error!(entry = accessor.entry(), "probe returned a non-numeric value");
                0
            }
            Err(e) => {
                error!("probe read failed: {e}");
                0
            }
        }
    }

    pub fn disassembled_listing(&mut self) -> InstructionListing {
        match self
            .engine
            .invoke(entry::DISASSEMBLY, ReturnKind::Text, &[])
        {
            Ok(CallValue::Text(text)) => InstructionListing::parse(self.program_start, &text),
            Ok(_) => {
                error!("disassembly listing returned a non-string value");
                InstructionListing::default()
            }
            Err(e) => {
                error!("disassembly listing failed: {e}");
                InstructionListing::default()
            }
        }
    }

    fn call_void(&mut self, entry: &str, args: &[CallArg<'_>]) {
        if let Err(e) = self.engine.invoke(entry, ReturnKind::Void, args) {
            error!("{e}");
        }
    }
}
