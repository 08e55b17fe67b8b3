//! Error types for the console core.
//!
//! Only the recoverable failures get a type here: program loads, metadata
//! documents and config files. Misuse of the lifecycle is prevented by the
//! session transition table instead.

use std::path::PathBuf;

use thiserror::Error;

/// A fault raised by the engine while servicing a call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallFault {
    /// The engine has no export with this name (usually: not initialized yet).
    #[error("engine entry point `{0}` is unavailable")]
    MissingEntry(String),
    /// The engine threw while executing the call.
    #[error("engine call `{entry}` failed: {message}")]
    Raised { entry: String, message: String },
    /// The call returned something other than the declared return kind.
    #[error("engine call `{entry}` returned an unexpected value")]
    UnexpectedReturn { entry: String },
}

/// Why a program could not be loaded into the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadFailure {
    #[error("program filename {0:?} contains a NUL byte")]
    InvalidPath(String),
    #[error("engine rejected program {filename:?}: {source}")]
    Engine {
        filename: String,
        #[source]
        source: CallFault,
    },
}

/// Why the program metadata document could not be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch program metadata: {0}")]
    Fetch(String),
    #[error("program metadata is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("program metadata must be a JSON array")]
    NotAnArray,
}

/// Why a config file was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
