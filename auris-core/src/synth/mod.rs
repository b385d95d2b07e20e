//! DSP primitives shared by the voice generators.
//!
//! Everything here is audio-thread-private plain state: phase accumulators,
//! slew envelopes, pulse gates and one-pole filters. None of it allocates or
//! synchronises; the renderer owns one instance of each per voice.

pub mod aim;
pub mod beacon;
pub mod blip;
pub mod radar;
pub mod renderer;

use std::f32::consts::{PI, TAU};

/// Fixed engine sample rate (Hz). The device is opened at exactly this rate.
pub const SAMPLE_RATE: u32 = 44_100;
pub(crate) const SAMPLE_RATE_F: f32 = SAMPLE_RATE as f32;

/// Interleaved stereo throughout.
pub const CHANNEL_COUNT: usize = 2;

/// Aim primary sine amplitude.
pub const BASE_VOLUME: f32 = 0.01;
/// Aim secondary click amplitude.
pub const CLICK_VOLUME: f32 = 0.008;
/// One-shot blip amplitude. Deliberately far louder than the continuous
/// voices so a blip cuts through gunfire.
pub const BLIP_VOLUME: f32 = 0.30;
/// Radar beep master amplitude.
pub const RADAR_BASE_VOLUME: f32 = 0.015;
/// Beacon amplitude.
pub const BEACON_VOLUME: f32 = 0.012;

/// Slowest pulse gate rate (far from target), Hz.
pub const MIN_PULSE_RATE: f32 = 2.0;
/// Fastest pulse gate rate (near the target), Hz.
pub const MAX_PULSE_RATE: f32 = 15.0;
/// Vertical error at which the primary pulse reaches its slowest rate.
pub const VERT_ACTIVATE_THRESHOLD: f32 = 0.4;
/// Pan magnitude beyond which the secondary click voice is silent.
pub const HORIZ_ACTIVATE_THRESHOLD: f32 = 0.2;

/// Secondary click frequency at the edge of its activation window.
pub const CLICK_FREQ_MIN: f32 = 500.0;
/// Secondary click frequency when horizontally centred.
pub const CLICK_FREQ_MAX: f32 = 560.0;
/// Secondary click low-pass cutoff (Hz).
pub const CLICK_LPF_CUTOFF: f32 = 4_100.0;

/// Attack and release ramp time of the smoothing envelopes (ms).
pub const SLEW_RAMP_MS: f32 = 5.0;

/// A wrapping oscillator phase in [0, 2π).
///
/// Wraps by subtracting 2π; the per-sample increment is bounded (pitch is
/// clamped to 2 kHz at the command boundary) so a single subtraction always
/// renormalises.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phase {
    value: f32,
}

impl Phase {
    #[inline]
    pub fn get(self) -> f32 {
        self.value
    }

    #[inline]
    pub fn advance(&mut self, freq: f32) {
        self.value += TAU * freq / SAMPLE_RATE_F;
        if self.value >= TAU {
            self.value -= TAU;
        }
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Triangle wave in [-1, 1] from a phase in [0, 2π).
#[inline]
pub fn triangle(phase: f32) -> f32 {
    let t = phase / TAU;
    if t < 0.5 {
        4.0 * t - 1.0
    } else {
        3.0 - 4.0 * t
    }
}

/// Linear amplitude pan: full-scale on the facing channel, the other fades.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let left = if pan <= 0.0 { 1.0 } else { 1.0 - pan };
    let right = if pan >= 0.0 { 1.0 } else { 1.0 + pan };
    (left, right)
}

/// Map an error magnitude onto a pulse gate rate.
///
/// Inside `threshold` the voice is continuous (rate 0). From `threshold` out
/// to `activate` the rate sweeps from [`MAX_PULSE_RATE`] down to
/// [`MIN_PULSE_RATE`]: fast pulsing reads as "close", slow as "far". A
/// non-positive span (threshold at or past `activate`) saturates at the slow
/// end.
#[inline]
pub fn pulse_rate(error: f32, threshold: f32, activate: f32) -> f32 {
    if error < threshold {
        return 0.0;
    }
    let span = activate - threshold;
    let t = if span > f32::EPSILON {
        ((error - threshold) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    MAX_PULSE_RATE + t * (MIN_PULSE_RATE - MAX_PULSE_RATE)
}

/// Linear attack/release ramp toward a moving target level.
///
/// Per-sample step is `1 / (ramp_ms · samples_per_ms)`; with the 5 ms
/// default the envelope traverses its full range in 220 samples.
#[derive(Debug, Clone, Copy)]
pub struct SlewEnvelope {
    level: f32,
    step: f32,
}

impl SlewEnvelope {
    pub fn new(ramp_ms: f32) -> Self {
        Self {
            level: 0.0,
            step: 1.0 / (ramp_ms * SAMPLE_RATE_F / 1_000.0),
        }
    }

    /// Advance one sample toward `target` and return the new level.
    #[inline]
    pub fn next(&mut self, target: f32) -> f32 {
        if self.level < target {
            self.level = (self.level + self.step).min(target);
        } else if self.level > target {
            self.level = (self.level - self.step).max(target);
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}

impl Default for SlewEnvelope {
    fn default() -> Self {
        Self::new(SLEW_RAMP_MS)
    }
}

/// 50 %-duty square gate at a variable rate.
///
/// Rate 0 means "continuous": the gate stays open and its phase is reset so
/// the next pulsed epoch starts cleanly at the top of a duty cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGate {
    phase: f32,
}

impl PulseGate {
    /// Advance one sample; returns whether the gate is open.
    #[inline]
    pub fn next(&mut self, rate: f32) -> bool {
        if rate <= 0.0 {
            self.phase = 0.0;
            return true;
        }
        let open = self.phase < PI;
        self.phase += TAU * rate / SAMPLE_RATE_F;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        open
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// One-pole low-pass filter, `y += α(x − y)` with `α = 1 − e^(−2πfc/fs)`.
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    alpha: f32,
    state: f32,
}

impl OnePole {
    pub fn new(cutoff_hz: f32) -> Self {
        Self {
            alpha: 1.0 - (-TAU * cutoff_hz / SAMPLE_RATE_F).exp(),
            state: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state += self.alpha * (input - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
