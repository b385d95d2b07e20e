//! Precision-aiming voice: panned primary sine plus a mono filtered-triangle
//! click that engages near horizontal alignment.
//!
//! Both sub-voices are pulse-modulated by the error/threshold mapping in
//! [`pulse_rate`]: continuous inside the dead-zone, fast pulsing near the
//! target, slow pulsing far away.

use crate::params::AimSnapshot;

use super::{
    pan_gains, pulse_rate, triangle, OnePole, Phase, PulseGate, SlewEnvelope, BASE_VOLUME,
    CLICK_FREQ_MAX, CLICK_FREQ_MIN, CLICK_LPF_CUTOFF, CLICK_VOLUME, HORIZ_ACTIVATE_THRESHOLD,
    VERT_ACTIVATE_THRESHOLD,
};

/// Audio-thread-private state of the aim voice.
#[derive(Debug)]
pub struct AimVoice {
    primary_phase: Phase,
    primary_gate: PulseGate,
    primary_env: SlewEnvelope,
    secondary_phase: Phase,
    secondary_gate: PulseGate,
    secondary_env: SlewEnvelope,
    secondary_lpf: OnePole,
}

impl AimVoice {
    pub fn new() -> Self {
        Self {
            primary_phase: Phase::default(),
            primary_gate: PulseGate::default(),
            primary_env: SlewEnvelope::default(),
            secondary_phase: Phase::default(),
            secondary_gate: PulseGate::default(),
            secondary_env: SlewEnvelope::default(),
            secondary_lpf: OnePole::new(CLICK_LPF_CUTOFF),
        }
    }

    /// Restart from silence: phases, gates, envelopes and filter state.
    pub fn reset(&mut self) {
        self.primary_phase.reset();
        self.primary_gate.reset();
        self.primary_env.reset();
        self.secondary_phase.reset();
        self.secondary_gate.reset();
        self.secondary_env.reset();
        self.secondary_lpf.reset();
    }

    /// Render one frame into the stereo accumulators.
    ///
    /// Caller gates on `snap.active`; `snap.muted` silences both sub-voices
    /// through their envelopes while phases keep running for continuity.
    #[inline]
    pub fn render(&mut self, snap: &AimSnapshot, left: &mut f32, right: &mut f32) {
        self.render_primary(snap, left, right);
        self.render_secondary(snap, left, right);
    }

    fn render_primary(&mut self, snap: &AimSnapshot, left: &mut f32, right: &mut f32) {
        let rate = pulse_rate(snap.vert_error, snap.vert_threshold, VERT_ACTIVATE_THRESHOLD);
        let gate_open = self.primary_gate.next(rate);
        let target = if !snap.muted && gate_open { 1.0 } else { 0.0 };
        let env = self.primary_env.next(target);

        let sample = self.primary_phase.get().sin() * env * BASE_VOLUME;
        self.primary_phase.advance(snap.pitch);

        let (lg, rg) = pan_gains(snap.pan);
        *left += sample * lg;
        *right += sample * rg;
    }

    fn render_secondary(&mut self, snap: &AimSnapshot, left: &mut f32, right: &mut f32) {
        let magnitude = snap.pan.abs();
        let engaged = magnitude < HORIZ_ACTIVATE_THRESHOLD && !snap.muted;

        // Frequency sweeps down as the pan magnitude approaches the
        // activation edge: 560 Hz centred, 500 Hz at the edge.
        let sweep = (magnitude / HORIZ_ACTIVATE_THRESHOLD).clamp(0.0, 1.0);
        let freq = CLICK_FREQ_MAX + sweep * (CLICK_FREQ_MIN - CLICK_FREQ_MAX);

        let rate = pulse_rate(magnitude, snap.horiz_threshold, HORIZ_ACTIVATE_THRESHOLD);
        let gate_open = self.secondary_gate.next(rate);
        let target = if engaged && gate_open { 1.0 } else { 0.0 };
        let env = self.secondary_env.next(target);

        let filtered = self.secondary_lpf.process(triangle(self.secondary_phase.get()));
        self.secondary_phase.advance(freq);

        if !engaged {
            // Outside the activation window the click contributes nothing,
            // even while its envelope decays internally.
            return;
        }

        let sample = filtered * env * CLICK_VOLUME;
        if magnitude < snap.horiz_threshold {
            *left += sample;
            *right += sample;
        } else if snap.pan < 0.0 {
            *left += sample;
        } else {
            *right += sample;
        }
    }
}

impl Default for AimVoice {
    fn default() -> Self {
        Self::new()
    }
}
