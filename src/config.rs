//! Console configuration.
//!
//! Every field has a default matching the stock CHIP-8 engine build, so an
//! empty JSON object (or no config file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a config file for the native binary.
pub const CONFIG_ENV_VAR: &str = "CHIP8_CONSOLE_CONFIG";

/// Indexed getters take a single-byte index.
pub const MAX_INDEXED_PROBES: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Prefix prepended to program filenames before they reach the engine.
    #[serde(default = "default_rom_dir")]
    pub rom_dir: String,
    /// Location of the program metadata document.
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,
    /// Number of general-purpose registers exposed as probes.
    #[serde(default = "default_register_count")]
    pub register_count: usize,
    /// Number of stack slots exposed as probes.
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
    /// Address at which programs are loaded; first entry of the listing.
    #[serde(default = "default_program_start")]
    pub program_start: u32,
    /// One past the last addressable byte.
    #[serde(default = "default_memory_size")]
    pub memory_size: u32,
}

fn default_rom_dir() -> String {
    "roms/".to_string()
}

fn default_metadata_path() -> String {
    "roms.json".to_string()
}

fn default_register_count() -> usize {
    16
}

fn default_stack_size() -> usize {
    16
}

fn default_program_start() -> u32 {
    0x200
}

fn default_memory_size() -> u32 {
    0x1000
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            rom_dir: default_rom_dir(),
            metadata_path: default_metadata_path(),
            register_count: default_register_count(),
            stack_size: default_stack_size(),
            program_start: default_program_start(),
            memory_size: default_memory_size(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.register_count == 0 {
            return Err(ConfigError::Invalid("register_count must be > 0".into()));
        }
        if self.stack_size == 0 {
            return Err(ConfigError::Invalid("stack_size must be > 0".into()));
        }
        for (name, count) in [
            ("register_count", self.register_count),
            ("stack_size", self.stack_size),
        ] {
            if count > MAX_INDEXED_PROBES {
                return Err(ConfigError::Invalid(format!(
                    "{name} {count} exceeds {MAX_INDEXED_PROBES}"
                )));
            }
        }
        if self.program_start >= self.memory_size {
            return Err(ConfigError::Invalid(format!(
                "program_start 0x{:X} must be below memory_size 0x{:X}",
                self.program_start, self.memory_size
            )));
        }
        Ok(())
    }
}
