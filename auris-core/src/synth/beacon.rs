//! Navigation-beacon voice: a pulsed, low-passed triangle whose frequency
//! rises as the listener faces the beacon and whose pulse slows as the
//! bearing error grows.

use super::{
    pan_gains, pulse_rate, triangle, OnePole, Phase, PulseGate, SlewEnvelope, BEACON_VOLUME,
};

/// Frequency when fully off-bearing (Hz).
pub const BEACON_BASE_FREQ: f32 = 400.0;
/// Additional frequency when dead-centred (Hz).
pub const BEACON_FREQ_SWEEP: f32 = 60.0;
/// Pan window over which centeredness falls from 1 to 0.
pub const BEACON_CENTER_WINDOW: f32 = 0.2;
/// Pan magnitude inside which the beacon plays continuously.
pub const BEACON_PULSE_DEADZONE: f32 = 0.05;
/// Beacon low-pass cutoff (Hz).
pub const BEACON_LPF_CUTOFF: f32 = 4_000.0;

/// Audio-thread-private state of the beacon voice.
#[derive(Debug)]
pub struct BeaconVoice {
    phase: Phase,
    gate: PulseGate,
    env: SlewEnvelope,
    lpf: OnePole,
}

impl BeaconVoice {
    pub fn new() -> Self {
        Self {
            phase: Phase::default(),
            gate: PulseGate::default(),
            env: SlewEnvelope::default(),
            lpf: OnePole::new(BEACON_LPF_CUTOFF),
        }
    }

    /// Restart from silence.
    pub fn reset(&mut self) {
        self.phase.reset();
        self.gate.reset();
        self.env.reset();
        self.lpf.reset();
    }

    /// Render one frame into the stereo accumulators.
    #[inline]
    pub fn render(&mut self, pan: f32, left: &mut f32, right: &mut f32) {
        let magnitude = pan.abs();
        let centeredness = (1.0 - magnitude / BEACON_CENTER_WINDOW).clamp(0.0, 1.0);
        let freq = BEACON_BASE_FREQ + centeredness * BEACON_FREQ_SWEEP;

        let rate = pulse_rate(magnitude, BEACON_PULSE_DEADZONE, BEACON_CENTER_WINDOW);
        let gate_open = self.gate.next(rate);
        let env = self.env.next(if gate_open { 1.0 } else { 0.0 });

        let filtered = self.lpf.process(triangle(self.phase.get()));
        self.phase.advance(freq);

        let sample = filtered * env * BEACON_VOLUME;

        // Widened pan exaggerates small bearing errors before the linear law.
        let (lg, rg) = pan_gains((pan * 2.0).clamp(-1.0, 1.0));
        *left += sample * lg;
        *right += sample * rg;
    }
}

impl Default for BeaconVoice {
    fn default() -> Self {
        Self::new()
    }
}
