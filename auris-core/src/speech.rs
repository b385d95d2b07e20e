//! Screen-reader client abstraction.
//!
//! The `ScreenReader` trait is the seam between command dispatch and the
//! native controller client: the bridge crate implements it over the real
//! client library, tests substitute a recording mock, and featureless
//! builds fall back to [`NullScreenReader`].

use crate::error::Result;

/// The three announcement calls plus the liveness probe.
///
/// Implementations may block briefly (the client performs IPC); the engine
/// only ever calls them from the host command thread, never from the audio
/// callback.
pub trait ScreenReader: Send + Sync {
    /// Whether the screen reader is reachable right now.
    fn is_running(&self) -> bool;

    /// Speak `text` asynchronously.
    ///
    /// # Errors
    /// `AurisError::SpeechClient` with the client's status code on failure.
    fn speak(&self, text: &str) -> Result<()>;

    /// Stop any in-progress speech.
    fn cancel(&self) -> Result<()>;

    /// Show `text` on a connected braille display.
    fn braille(&self, text: &str) -> Result<()>;
}

/// A client for environments with no screen reader: never running, every
/// call fails with a client error.
pub struct NullScreenReader;

impl ScreenReader for NullScreenReader {
    fn is_running(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) -> Result<()> {
        Err(crate::error::AurisError::SpeechClient { code: -1 })
    }

    fn cancel(&self) -> Result<()> {
        Err(crate::error::AurisError::SpeechClient { code: -1 })
    }

    fn braille(&self, _text: &str) -> Result<()> {
        Err(crate::error::AurisError::SpeechClient { code: -1 })
    }
}
