//! Causette is a terminal-first chat client backed by a local model runtime.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session state machine, the application reducer, the
//!   runtime boundary trait, and configuration.
//! - [`api`] defines the wire payloads for the local runtime's HTTP surface
//!   and the client that implements the runtime boundary against it.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives input, playback, and display updates.
//! - [`utils`] carries the small shared helpers (URL joining, transcript
//!   logging).
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which probes the runtime server and then
//! dispatches into [`ui::chat_loop`] for the interactive session.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
