//! Disassembly listing of the loaded program.

/// One line per memory byte, starting at the program load address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionListing {
    start: u32,
    lines: Vec<String>,
}

impl InstructionListing {
    /// Splits the engine's newline-delimited listing. A trailing empty line
    /// (the engine terminates every entry with `\n`) is dropped.
    pub fn parse(start: u32, text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        Self { start, lines }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn address_of(&self, entry: usize) -> Option<u32> {
        (entry < self.lines.len()).then(|| self.start + entry as u32)
    }
}

/// Listing entry for `address` when the listing covers
/// `program_start..memory_size`.
pub fn entry_for_address(address: u32, program_start: u32, memory_size: u32) -> Option<usize> {
    if address < program_start || address >= memory_size {
        return None;
    }
    Some((address - program_start) as usize)
}
