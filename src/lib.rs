//! # chip8_console
//!
//! Run-state orchestration and live telemetry for a CHIP-8 engine that is only
//! reachable through a narrow call-by-name boundary.
//!
//! The host (a browser page, a native loop, a test) supplies three things:
//! an [`EngineCalls`] implementation, a [`PresentationSink`] and a
//! [`FrameScheduler`]. Everything else lives in [`SessionController`]:
//!
//! - start/stop and pause/resume toggles driven by an explicit [`RunState`]
//! - program hot-swap while a session is active
//! - a change-only telemetry loop that re-arms itself once per display frame
//!
//! ## Modules
//!
//! - [`boundary`]: typed wrapper over the engine's foreign-call convention
//! - [`monitor`]: probe polling, diffing and the cancellable frame loop
//! - [`session`]: the run-state machine
//! - [`program`]: program descriptors and the metadata document
//! - [`probe`], [`listing`], [`keypad`], [`scheduler`], [`sink`]: supporting types
//! - [`config`], [`error`]: configuration and error types

pub mod boundary;
pub mod config;
pub mod error;
pub mod keypad;
pub mod listing;
pub mod monitor;
pub mod probe;
pub mod program;
pub mod scheduler;
pub mod session;
pub mod sink;

#[cfg(test)]
mod testing;

pub use boundary::{BoundaryAdapter, CallArg, CallValue, EngineCalls, ReturnKind};
pub use config::ConsoleConfig;
pub use error::{CallFault, CatalogError, ConfigError, LoadFailure};
pub use monitor::TelemetryMonitor;
pub use program::{ProgramDescriptor, ProgramFlag};
pub use scheduler::{FrameScheduler, ManualScheduler, PollHandle};
pub use session::{RunState, SessionController};
pub use sink::PresentationSink;

pub mod prelude {
    pub use crate::boundary::{CallArg, CallValue, EngineCalls, ReturnKind};
    pub use crate::config::ConsoleConfig;
    pub use crate::program::ProgramDescriptor;
    pub use crate::scheduler::{FrameScheduler, PollHandle};
    pub use crate::session::{RunState, SessionController};
    pub use crate::sink::PresentationSink;
}
