//! Shared parameter slots between the command thread and the audio callback.
//!
//! # Ordering contract
//!
//! Scalar slots use relaxed load/store: each field is a single word and
//! cannot tear, but a multi-field update (e.g. `aim_update`) may be observed
//! across two callback snapshots. The smoothing envelopes in the synth layer
//! hide that discontinuity, so no stronger pairing is needed.
//!
//! The two blip pending flags are a real producer/consumer handshake
//! (command thread arms, callback consumes) and use SeqCst. The radar beep
//! ring carries its own acquire/release index handshake inside `ringbuf`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Aim pitch applied by `aim_start` and used as the `aim_update` default (Hz).
pub const DEFAULT_AIM_PITCH: f32 = 550.0;
/// Vertical dead-zone applied by `aim_start`.
pub const DEFAULT_VERT_THRESHOLD: f32 = 0.02;
/// Horizontal dead-zone applied by `aim_start`.
pub const DEFAULT_HORIZ_THRESHOLD: f32 = 0.005;

pub const PITCH_MIN: f32 = 100.0;
pub const PITCH_MAX: f32 = 2_000.0;
pub const THRESHOLD_MIN: f32 = 0.001;
pub const THRESHOLD_MAX: f32 = 0.5;

/// An `f32` slot readable from the audio callback without tearing.
///
/// Stored as raw bits in an `AtomicU32`; all access is relaxed per the
/// module ordering contract.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Aim voice parameters as written by the command thread.
#[derive(Debug)]
pub struct AimParams {
    pub pan: AtomicF32,
    pub pitch: AtomicF32,
    pub vert_error: AtomicF32,
    pub horiz_error: AtomicF32,
    pub vert_threshold: AtomicF32,
    pub horiz_threshold: AtomicF32,
    pub active: AtomicBool,
    pub muted: AtomicBool,
    blip_pending: AtomicBool,
    unlock_blip_pending: AtomicBool,
}

/// Per-buffer snapshot of the aim slots, taken once at the top of a callback.
#[derive(Debug, Clone, Copy)]
pub struct AimSnapshot {
    pub pan: f32,
    pub pitch: f32,
    pub vert_error: f32,
    pub horiz_error: f32,
    pub vert_threshold: f32,
    pub horiz_threshold: f32,
    pub active: bool,
    pub muted: bool,
}

impl AimParams {
    fn new() -> Self {
        Self {
            pan: AtomicF32::new(0.0),
            pitch: AtomicF32::new(DEFAULT_AIM_PITCH),
            vert_error: AtomicF32::new(1.0),
            horiz_error: AtomicF32::new(1.0),
            vert_threshold: AtomicF32::new(DEFAULT_VERT_THRESHOLD),
            horiz_threshold: AtomicF32::new(DEFAULT_HORIZ_THRESHOLD),
            active: AtomicBool::new(false),
            muted: AtomicBool::new(true),
            blip_pending: AtomicBool::new(false),
            unlock_blip_pending: AtomicBool::new(false),
        }
    }

    /// `aim_start` reset: centred, default pitch, maximal error, muted until
    /// the first pitched `aim_update` arrives.
    pub fn reset(&self) {
        self.pan.store(0.0);
        self.pitch.store(DEFAULT_AIM_PITCH);
        self.vert_error.store(1.0);
        self.horiz_error.store(1.0);
        self.vert_threshold.store(DEFAULT_VERT_THRESHOLD);
        self.horiz_threshold.store(DEFAULT_HORIZ_THRESHOLD);
        self.muted.store(true, Ordering::Relaxed);
        self.active.store(true, Ordering::Relaxed);
    }
}

/// The full set of lock-free slots shared with the renderer.
///
/// One instance lives in an `Arc` held by both the engine (writer) and the
/// renderer (reader). No other state crosses the thread boundary.
#[derive(Debug)]
pub struct SharedParams {
    pub aim: AimParams,
    pub radar_active: AtomicBool,
    pub beacon_active: AtomicBool,
    pub beacon_pan: AtomicF32,
    /// Generation counter for the radar queue; beeps stamped with an older
    /// generation are discarded by the consumer.
    pub radar_epoch: AtomicU32,
    /// Once set, the callback emits only zero-filled frames.
    shutdown: AtomicBool,
}

impl SharedParams {
    pub fn new() -> Self {
        Self {
            aim: AimParams::new(),
            radar_active: AtomicBool::new(false),
            beacon_active: AtomicBool::new(false),
            beacon_pan: AtomicF32::new(0.0),
            radar_epoch: AtomicU32::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn aim_snapshot(&self) -> AimSnapshot {
        AimSnapshot {
            pan: self.aim.pan.load(),
            pitch: self.aim.pitch.load(),
            vert_error: self.aim.vert_error.load(),
            horiz_error: self.aim.horiz_error.load(),
            vert_threshold: self.aim.vert_threshold.load(),
            horiz_threshold: self.aim.horiz_threshold.load(),
            active: self.aim.active.load(Ordering::Relaxed),
            muted: self.aim.muted.load(Ordering::Relaxed),
        }
    }

    /// Arm the lock blip. Unconditional; coalescing is the consumer's job.
    pub fn arm_blip(&self) {
        self.aim.blip_pending.store(true, Ordering::SeqCst);
    }

    pub fn arm_unlock_blip(&self) {
        self.aim.unlock_blip_pending.store(true, Ordering::SeqCst);
    }

    /// Consume the lock-blip pending flag (audio thread only).
    pub fn take_blip(&self) -> bool {
        self.aim.blip_pending.swap(false, Ordering::SeqCst)
    }

    pub fn take_unlock_blip(&self) -> bool {
        self.aim.unlock_blip_pending.swap(false, Ordering::SeqCst)
    }

    /// Advance the radar queue generation, invalidating every queued beep.
    pub fn bump_radar_epoch(&self) -> u32 {
        self.radar_epoch.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current_radar_epoch(&self) -> u32 {
        self.radar_epoch.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}
