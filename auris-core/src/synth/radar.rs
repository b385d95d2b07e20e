//! Terrain-radar voice: consumes queued beeps one at a time, each shaped by
//! an attack/sustain/release envelope and voiced by its material category.
//!
//! The phase accumulator restarts at zero for every beep and runs unwrapped
//! for the beep's bounded duration, so the non-harmonic 2.3× water partial
//! stays continuous.

use std::f32::consts::TAU;

use crate::queue::{Material, RadarBeep};

use super::{pan_gains, RADAR_BASE_VOLUME, SAMPLE_RATE_F};

/// ~2 ms rise.
pub const RADAR_ATTACK_SAMPLES: u32 = 88;
/// 20 ms hold.
pub const RADAR_SUSTAIN_SAMPLES: u32 = 882;
/// ~3 ms fall.
pub const RADAR_RELEASE_SAMPLES: u32 = 132;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RadarStage {
    Idle,
    Attack,
    Sustain,
    Release,
}

/// Base oscillator frequency for a material category (Hz).
fn base_frequency(material: Material) -> f32 {
    match material {
        Material::Default => 350.0,
        Material::Grass => 200.0,
        Material::Concrete => 400.0,
        Material::Wood => 300.0,
        Material::Metal => 600.0,
        Material::Water => 150.0,
        Material::Man => 800.0,
        Material::Glass => 700.0,
    }
}

/// Evaluate the material's waveform at an unwrapped phase (radians).
fn waveform(material: Material, phase: f32) -> f32 {
    // Cycle position for the piecewise shapes.
    let t = (phase / TAU).fract();
    match material {
        Material::Grass => phase.sin(),
        Material::Concrete => {
            if t < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Material::Wood => {
            if t < 0.5 {
                4.0 * t - 1.0
            } else {
                3.0 - 4.0 * t
            }
        }
        Material::Metal => 2.0 * t - 1.0,
        Material::Water => 0.7 * phase.sin() + 0.3 * (2.3 * phase).sin(),
        Material::Man => {
            if t < 0.25 {
                1.0
            } else {
                -0.3
            }
        }
        Material::Glass => 0.8 * phase.sin() + 0.2 * (2.0 * phase).sin(),
        Material::Default => phase.sin(),
    }
}

/// Audio-thread-private state of the radar voice.
#[derive(Debug)]
pub struct RadarVoice {
    phase: f32,
    stage: RadarStage,
    pos: u32,
    current: RadarBeep,
}

impl RadarVoice {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            stage: RadarStage::Idle,
            pos: 0,
            current: RadarBeep {
                pan: 0.0,
                volume: 0.0,
                material: Material::Default,
                epoch: 0,
            },
        }
    }

    /// Whether the envelope is ready for the next queued beep.
    pub fn is_idle(&self) -> bool {
        self.stage == RadarStage::Idle
    }

    /// Abandon any half-played beep and return to idle.
    pub fn reset(&mut self) {
        self.stage = RadarStage::Idle;
        self.pos = 0;
        self.phase = 0.0;
    }

    /// Begin playing a dequeued beep. Only call when idle.
    pub fn start(&mut self, beep: RadarBeep) {
        self.current = beep;
        self.phase = 0.0;
        self.pos = 0;
        self.stage = RadarStage::Attack;
    }

    /// Render one frame into the stereo accumulators; no-op while idle.
    #[inline]
    pub fn render(&mut self, left: &mut f32, right: &mut f32) {
        let level = match self.stage {
            RadarStage::Idle => return,
            RadarStage::Attack => {
                let level = self.pos as f32 / RADAR_ATTACK_SAMPLES as f32;
                self.step(RADAR_ATTACK_SAMPLES, RadarStage::Sustain);
                level
            }
            RadarStage::Sustain => {
                self.step(RADAR_SUSTAIN_SAMPLES, RadarStage::Release);
                1.0
            }
            RadarStage::Release => {
                let level = 1.0 - self.pos as f32 / RADAR_RELEASE_SAMPLES as f32;
                self.step(RADAR_RELEASE_SAMPLES, RadarStage::Idle);
                level
            }
        };

        let wave = waveform(self.current.material, self.phase);
        self.phase += TAU * base_frequency(self.current.material) / SAMPLE_RATE_F;

        let sample = wave * level * self.current.volume * RADAR_BASE_VOLUME;
        let (lg, rg) = pan_gains(self.current.pan);
        *left += sample * lg;
        *right += sample * rg;
    }

    #[inline]
    fn step(&mut self, stage_len: u32, next: RadarStage) {
        self.pos += 1;
        if self.pos >= stage_len {
            self.stage = next;
            self.pos = 0;
        }
    }
}

impl Default for RadarVoice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: u32 = RADAR_ATTACK_SAMPLES + RADAR_SUSTAIN_SAMPLES + RADAR_RELEASE_SAMPLES;

    fn beep(material: Material, pan: f32, volume: f32) -> RadarBeep {
        RadarBeep {
            pan,
            volume,
            material,
            epoch: 0,
        }
    }

    fn play_through(voice: &mut RadarVoice) -> Vec<(f32, f32)> {
        (0..TOTAL)
            .map(|_| {
                let (mut l, mut r) = (0.0, 0.0);
                voice.render(&mut l, &mut r);
                (l, r)
            })
            .collect()
    }

    #[test]
    fn idle_voice_writes_nothing() {
        let mut voice = RadarVoice::new();
        let (mut l, mut r) = (0.0, 0.0);
        voice.render(&mut l, &mut r);
        assert_eq!((l, r), (0.0, 0.0));
    }

    #[test]
    fn beep_returns_to_idle_after_envelope() {
        let mut voice = RadarVoice::new();
        voice.start(beep(Material::Metal, 0.0, 1.0));
        assert!(!voice.is_idle());
        play_through(&mut voice);
        assert!(voice.is_idle());
    }

    #[test]
    fn volume_scales_output() {
        let mut loud = RadarVoice::new();
        let mut quiet = RadarVoice::new();
        loud.start(beep(Material::Grass, 0.0, 0.9));
        quiet.start(beep(Material::Grass, 0.0, 0.5));

        let loud_peak = play_through(&mut loud)
            .iter()
            .map(|(l, _)| l.abs())
            .fold(0.0f32, f32::max);
        let quiet_peak = play_through(&mut quiet)
            .iter()
            .map(|(l, _)| l.abs())
            .fold(0.0f32, f32::max);
        assert!(loud_peak > quiet_peak);
        assert!(loud_peak <= 0.9 * RADAR_BASE_VOLUME + 1e-6);
    }

    #[test]
    fn pan_routes_the_beep() {
        let mut voice = RadarVoice::new();
        voice.start(beep(Material::Concrete, -1.0, 1.0));
        let frames = play_through(&mut voice);
        assert!(frames.iter().all(|(_, r)| *r == 0.0));
        assert!(frames.iter().any(|(l, _)| l.abs() > 0.0));
    }

    #[test]
    fn man_pulse_is_asymmetric() {
        // 25 %-duty pulse rides at +1 for a quarter cycle and -0.3 otherwise.
        assert_eq!(waveform(Material::Man, 0.1), 1.0);
        assert_eq!(waveform(Material::Man, TAU * 0.5), -0.3);
    }

    #[test]
    fn water_mixes_a_detuned_partial() {
        // At phase π the fundamental is zero but the 2.3× partial is not.
        let value = waveform(Material::Water, std::f32::consts::PI);
        assert!(value.abs() > 0.05, "value={value}");
    }

    #[test]
    fn material_frequencies_match_the_category_table() {
        assert_eq!(base_frequency(Material::Grass), 200.0);
        assert_eq!(base_frequency(Material::Concrete), 400.0);
        assert_eq!(base_frequency(Material::Wood), 300.0);
        assert_eq!(base_frequency(Material::Metal), 600.0);
        assert_eq!(base_frequency(Material::Water), 150.0);
        assert_eq!(base_frequency(Material::Man), 800.0);
        assert_eq!(base_frequency(Material::Glass), 700.0);
        assert_eq!(base_frequency(Material::Default), 350.0);
    }
}
