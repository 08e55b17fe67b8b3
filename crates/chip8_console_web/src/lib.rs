//! Browser front end for the CHIP-8 console: a Leptos page that drives a
//! [`chip8_console::SessionController`] against the Emscripten `Module`.
//!
//! Only [`ui_model`] and [`frame_slots`] are compiled by default, so native
//! workspace builds and host tests need no wasm toolchain. The page itself
//! needs `--features web` on a wasm32 target.

pub mod frame_slots;
pub mod ui_model;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::start;
