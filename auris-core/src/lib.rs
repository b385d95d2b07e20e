//! # auris-core
//!
//! Reusable audio-feedback engine for a host game process: a multi-voice
//! real-time synthesizer driven by textual commands, conveying aim
//! precision, terrain radar echoes and navigation bearings non-visually.
//!
//! ## Architecture
//!
//! ```text
//! host command ─► parse_line ─► FeedbackEngine::execute
//!                                   │            │
//!                            SharedParams   beep ring (SPSC)
//!                                   │            │
//! audio device ─► callback ─► Renderer::render ──┴─► interleaved f32 stereo
//! ```
//!
//! The audio callback is zero-alloc and lock-free. All blocking (device
//! open, screen-reader IPC) happens on the host command thread.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod command;
pub mod engine;
pub mod error;
pub mod params;
pub mod queue;
pub mod speech;
pub mod synth;

// Convenience re-exports for the bridge crate and embedders
pub use command::{parse_line, Command, Status};
pub use engine::FeedbackEngine;
pub use error::AurisError;
pub use speech::{NullScreenReader, ScreenReader};
