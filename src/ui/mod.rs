//! Terminal UI layer for the interactive chat session.
//!
//! - [`chat_loop`]: the main interaction loop, terminal lifecycle, and the
//!   executor tasks spawned from reducer commands.
//! - [`renderer`]: frame composition over the application value.
//! - [`markdown`]: pulldown-cmark rendering into styled lines.
//! - [`typewriter`]: typing-effect playback over a known reply.
//! - [`calendar`]: the month-grid side panel.
//!
//! Ownership boundary: this layer presents and captures interaction state,
//! while [`crate::core`] owns the session and transcript.

pub mod calendar;
pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod typewriter;
