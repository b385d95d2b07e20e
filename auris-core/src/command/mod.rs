//! Host command surface.
//!
//! Commands arrive as UTF-8 lines of the form `verb` or `verb:arg1,arg2,…`.
//! Parsing never rejects malformed input — missing or unreadable numeric
//! fields fall back to per-field defaults — and every command resolves to a
//! short ASCII status the host can branch on.

pub mod parser;

pub use parser::parse_line;

use std::fmt;

use crate::queue::Material;

/// A decoded host command. Text payloads borrow from the input line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command<'a> {
    /// Probe whether the screen reader is reachable.
    Test,
    Speak(&'a str),
    Cancel,
    Braille(&'a str),
    AimStart,
    AimUpdate(AimUpdate),
    AimBlip,
    AimUnlockBlip,
    AimStop,
    RadarStart,
    RadarBeep(RadarBeepCommand),
    RadarStop,
    BeaconStart,
    BeaconUpdate { pan: f32 },
    BeaconStop,
    Unknown,
}

/// Payload of `aim_update:pan,pitch,vertErr,horizErr[,vertThr[,horizThr]]`.
///
/// A negative pitch means "mute without touching anything else"; the engine
/// checks that before committing the other fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimUpdate {
    pub pan: f32,
    pub pitch: f32,
    pub vert_error: f32,
    pub horiz_error: f32,
    /// `None` leaves the stored threshold unchanged.
    pub vert_threshold: Option<f32>,
    pub horiz_threshold: Option<f32>,
}

/// Payload of `radar_beep:pan,distance,material`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarBeepCommand {
    pub pan: f32,
    /// Distance in metres; the engine maps it to a volume.
    pub distance: f32,
    /// `None` means material "none" — the beep is dropped silently.
    pub material: Option<Material>,
}

/// Result of executing a command, as reported back to the host.
///
/// The string set is part of the host contract; every value is plain ASCII
/// and short enough for any reasonable caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    UnknownCommand,
    AudioInitFailed,
    EmptyText,
    SpeechError,
    SpeechNotRunning,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::UnknownCommand => "UNKNOWN_COMMAND",
            Status::AudioInitFailed => "AUDIO_INIT_FAILED",
            Status::EmptyText => "EMPTY_TEXT",
            Status::SpeechError => "NVDA_ERROR",
            Status::SpeechNotRunning => "NVDA_NOT_RUNNING",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
