//! Telemetry probes: what to read from the engine and how to show it.

use std::fmt::Write as _;

/// Engine getter backing a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeAccessor {
    ProgramCounter,
    IndexRegister,
    StackPointer,
    DelayTimer,
    SoundTimer,
    Register(u8),
    StackSlot(u8),
}

impl ProbeAccessor {
    /// Engine entry point name.
    pub fn entry(self) -> &'static str {
        match self {
            ProbeAccessor::ProgramCounter => "getProgramCounterValue",
            ProbeAccessor::IndexRegister => "getIndexRegisterValue",
            ProbeAccessor::StackPointer => "getStackPointerValue",
            ProbeAccessor::DelayTimer => "getDelayTimerValue",
            ProbeAccessor::SoundTimer => "getSoundTimerValue",
            ProbeAccessor::Register(_) => "getRegisterValue",
            ProbeAccessor::StackSlot(_) => "getStackValue",
        }
    }

    /// Index argument, for the indexed getters.
    pub fn index(self) -> Option<u8> {
        match self {
            ProbeAccessor::Register(i) | ProbeAccessor::StackSlot(i) => Some(i),
            _ => None,
        }
    }
}

/// Immutable description of one telemetry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeDefinition {
    pub identifier: String,
    /// Display width in hex digits.
    pub width: usize,
    pub accessor: ProbeAccessor,
}

impl ProbeDefinition {
    pub fn new(identifier: impl Into<String>, width: usize, accessor: ProbeAccessor) -> Self {
        Self {
            identifier: identifier.into(),
            width,
            accessor,
        }
    }
}

/// `0x`-prefixed, upper-case, zero-padded hex. Wider values are not truncated.
pub fn hex_format(value: u32, width: usize) -> String {
    let mut out = String::with_capacity(2 + width);
    out.push_str("0x");
    let _ = write!(out, "{value:0width$X}");
    out
}

/// Last observed value of a probe together with its rendered text.
///
/// The text is only ever written alongside the value, so it always shows the
/// value currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReading {
    value: Option<u32>,
    text: String,
}

impl ProbeReading {
    pub fn value(&self) -> Option<u32> {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Stores `value` if it differs from the held one. Returns `true` when the
    /// reading changed (the first observation always counts as a change).
    pub fn observe(&mut self, value: u32, width: usize) -> bool {
        if self.value == Some(value) {
            return false;
        }
        self.value = Some(value);
        self.text = hex_format(value, width);
        true
    }
}

/// Position of the program counter in [`probe_set`].
pub const PC_PROBE: usize = 0;
/// Position of the stack pointer in [`probe_set`].
pub const SP_PROBE: usize = 2;

/// The fixed probe layout: five special probes, then `register_count`
/// registers (`v0`..), then `stack_size` stack slots (`stack-0`..).
///
/// Counts are capped at 256 since the indexed getters take a byte index.
pub fn probe_set(register_count: usize, stack_size: usize) -> Vec<ProbeDefinition> {
    let mut probes = Vec::with_capacity(5 + register_count.min(256) + stack_size.min(256));
    probes.push(ProbeDefinition::new("pc", 4, ProbeAccessor::ProgramCounter));
    probes.push(ProbeDefinition::new("i", 4, ProbeAccessor::IndexRegister));
    probes.push(ProbeDefinition::new("sp", 2, ProbeAccessor::StackPointer));
    probes.push(ProbeDefinition::new("dt", 2, ProbeAccessor::DelayTimer));
    probes.push(ProbeDefinition::new("st", 2, ProbeAccessor::SoundTimer));

    for i in byte_indices(register_count) {
        probes.push(ProbeDefinition::new(
            format!("v{i:X}"),
            2,
            ProbeAccessor::Register(i),
        ));
    }
    for i in byte_indices(stack_size) {
        probes.push(ProbeDefinition::new(
            format!("stack-{i}"),
            4,
            ProbeAccessor::StackSlot(i),
        ));
    }
    probes
}

fn byte_indices(count: usize) -> impl Iterator<Item = u8> {
    (0..count).map_while(|i| u8::try_from(i).ok())
}
