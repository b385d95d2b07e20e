//! One-shot blip generator: a short shaped sine with a trapezoidal envelope.
//!
//! Two instances run independently — the 800 Hz lock blip and the 500 Hz
//! unlock blip. A blip only starts from Idle; arming is handled by the
//! renderer through the pending flags in `SharedParams`.

use super::{Phase, BLIP_VOLUME};

/// Lock confirmation tone.
pub const LOCK_BLIP_FREQ: f32 = 800.0;
/// Lock-lost tone.
pub const UNLOCK_BLIP_FREQ: f32 = 500.0;

/// ~1 ms linear rise.
pub const BLIP_ATTACK_SAMPLES: u32 = 44;
/// 20 ms hold at full level.
pub const BLIP_SUSTAIN_SAMPLES: u32 = 882;
/// ~2 ms linear fall.
pub const BLIP_RELEASE_SAMPLES: u32 = 88;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlipStage {
    Idle,
    Attack,
    Sustain,
    Release,
}

/// State machine for one blip voice.
#[derive(Debug)]
pub struct BlipVoice {
    freq: f32,
    phase: Phase,
    stage: BlipStage,
    /// Sample position within the current stage.
    pos: u32,
}

impl BlipVoice {
    pub fn new(freq: f32) -> Self {
        Self {
            freq,
            phase: Phase::default(),
            stage: BlipStage::Idle,
            pos: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.stage == BlipStage::Idle
    }

    /// Start the envelope from the top. Only call when idle.
    pub fn trigger(&mut self) {
        self.stage = BlipStage::Attack;
        self.pos = 0;
        self.phase.reset();
    }

    /// Cut a half-played blip and return to idle.
    pub fn reset(&mut self) {
        self.stage = BlipStage::Idle;
        self.pos = 0;
        self.phase.reset();
    }

    /// Render one mono sample; 0.0 while idle.
    #[inline]
    pub fn render(&mut self) -> f32 {
        let level = match self.stage {
            BlipStage::Idle => return 0.0,
            BlipStage::Attack => {
                let level = self.pos as f32 / BLIP_ATTACK_SAMPLES as f32;
                self.step(BLIP_ATTACK_SAMPLES, BlipStage::Sustain);
                level
            }
            BlipStage::Sustain => {
                self.step(BLIP_SUSTAIN_SAMPLES, BlipStage::Release);
                1.0
            }
            BlipStage::Release => {
                let level = 1.0 - self.pos as f32 / BLIP_RELEASE_SAMPLES as f32;
                self.step(BLIP_RELEASE_SAMPLES, BlipStage::Idle);
                level
            }
        };

        let sample = self.phase.get().sin() * level * BLIP_VOLUME;
        self.phase.advance(self.freq);
        sample
    }

    #[inline]
    fn step(&mut self, stage_len: u32, next: BlipStage) {
        self.pos += 1;
        if self.pos >= stage_len {
            self.stage = next;
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: u32 = BLIP_ATTACK_SAMPLES + BLIP_SUSTAIN_SAMPLES + BLIP_RELEASE_SAMPLES;

    #[test]
    fn idle_voice_is_silent() {
        let mut blip = BlipVoice::new(LOCK_BLIP_FREQ);
        for _ in 0..100 {
            assert_eq!(blip.render(), 0.0);
        }
        assert!(blip.is_idle());
    }

    #[test]
    fn envelope_runs_exactly_once_per_trigger() {
        let mut blip = BlipVoice::new(LOCK_BLIP_FREQ);
        blip.trigger();

        let mut active_samples = 0;
        for _ in 0..TOTAL * 2 {
            blip.render();
            if !blip.is_idle() {
                active_samples += 1;
            }
        }
        assert!(blip.is_idle());
        assert_eq!(active_samples, TOTAL - 1);
    }

    #[test]
    fn envelope_is_trapezoidal() {
        let mut blip = BlipVoice::new(LOCK_BLIP_FREQ);
        blip.trigger();

        let samples: Vec<f32> = (0..TOTAL).map(|_| blip.render()).collect();

        // Sustain plateau reaches the full blip amplitude at a sine peak.
        let sustain = &samples[BLIP_ATTACK_SAMPLES as usize
            ..(BLIP_ATTACK_SAMPLES + BLIP_SUSTAIN_SAMPLES) as usize];
        let peak = sustain.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > BLIP_VOLUME * 0.95, "peak={peak}");

        // Attack starts from silence and the release returns to it.
        assert_eq!(samples[0], 0.0);
        let tail = *samples.last().unwrap();
        assert!(tail.abs() < BLIP_VOLUME * 0.05, "tail={tail}");
    }

    #[test]
    fn bounded_by_blip_volume() {
        let mut blip = BlipVoice::new(UNLOCK_BLIP_FREQ);
        blip.trigger();
        for _ in 0..TOTAL {
            assert!(blip.render().abs() <= BLIP_VOLUME);
        }
    }
}
