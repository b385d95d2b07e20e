//! The audio callback body.
//!
//! # Design constraints
//!
//! `Renderer::render` runs on the OS audio thread at elevated priority.
//! It **must not**:
//! - Allocate heap memory
//! - Block on a mutex or condvar
//! - Perform I/O or logging
//!
//! Everything it touches is either owned state or a lock-free slot in
//! `SharedParams`; the beep queue consumer is wait-free.
//!
//! # Buffer structure
//!
//! ```text
//! 1. shutdown set?            → zero the buffer, return
//! 2. snapshot atomics once    → aim, radar, beacon, epoch
//! 3. consume blip flags       → trigger idle machines, drop the rest
//! 4. per frame: mix gated voices into L/R, write interleaved
//! ```

use std::sync::Arc;

use crate::params::SharedParams;
use crate::queue::{BeepConsumer, Consumer, RadarBeep, BEEP_QUEUE_CAPACITY};

use super::aim::AimVoice;
use super::beacon::BeaconVoice;
use super::blip::{BlipVoice, LOCK_BLIP_FREQ, UNLOCK_BLIP_FREQ};
use super::radar::RadarVoice;
use super::CHANNEL_COUNT;

/// Owns all audio-thread-private state and produces interleaved stereo f32.
pub struct Renderer {
    params: Arc<SharedParams>,
    beeps: BeepConsumer,
    aim: AimVoice,
    lock_blip: BlipVoice,
    unlock_blip: BlipVoice,
    radar: RadarVoice,
    beacon: BeaconVoice,
    aim_was_active: bool,
    radar_was_active: bool,
    beacon_was_active: bool,
}

impl Renderer {
    pub fn new(params: Arc<SharedParams>, beeps: BeepConsumer) -> Self {
        Self {
            params,
            beeps,
            aim: AimVoice::new(),
            lock_blip: BlipVoice::new(LOCK_BLIP_FREQ),
            unlock_blip: BlipVoice::new(UNLOCK_BLIP_FREQ),
            radar: RadarVoice::new(),
            beacon: BeaconVoice::new(),
            aim_was_active: false,
            radar_was_active: false,
            beacon_was_active: false,
        }
    }

    /// Fill one interleaved stereo buffer at device cadence.
    pub fn render(&mut self, buffer: &mut [f32]) {
        if self.params.is_shutdown() {
            buffer.fill(0.0);
            return;
        }

        let aim = self.params.aim_snapshot();
        let radar_active = self
            .params
            .radar_active
            .load(std::sync::atomic::Ordering::Relaxed);
        let beacon_active = self
            .params
            .beacon_active
            .load(std::sync::atomic::Ordering::Relaxed);
        let beacon_pan = self.params.beacon_pan.load();
        let epoch = self.params.current_radar_epoch();

        // Voice state resets ride on activity edges: *_start commands cannot
        // touch audio-private state directly.
        if aim.active && !self.aim_was_active {
            self.aim.reset();
            self.lock_blip.reset();
            self.unlock_blip.reset();
        }
        self.aim_was_active = aim.active;
        if radar_active != self.radar_was_active {
            // A beep caught mid-envelope by radar_stop is abandoned, not
            // resumed on the next radar_start.
            self.radar.reset();
        }
        self.radar_was_active = radar_active;
        if beacon_active != self.beacon_was_active {
            self.beacon.reset();
        }
        self.beacon_was_active = beacon_active;

        // Pending blip flags are consumed once per buffer. An arm that lands
        // while the machine is mid-envelope is dropped, not queued.
        if self.params.take_blip() && self.lock_blip.is_idle() {
            self.lock_blip.trigger();
        }
        if self.params.take_unlock_blip() && self.unlock_blip.is_idle() {
            self.unlock_blip.trigger();
        }

        for frame in buffer.chunks_exact_mut(CHANNEL_COUNT) {
            let mut left = 0.0f32;
            let mut right = 0.0f32;

            if aim.active {
                self.aim.render(&aim, &mut left, &mut right);

                // Blips play whenever aim is active, muted or not.
                let blip = self.lock_blip.render() + self.unlock_blip.render();
                left += blip;
                right += blip;
            } else {
                // Radar and beacon are gated off while aim holds the stage.
                if radar_active {
                    if self.radar.is_idle() {
                        if let Some(beep) = self.next_current_beep(epoch) {
                            self.radar.start(beep);
                        }
                    }
                    self.radar.render(&mut left, &mut right);
                }
                if beacon_active {
                    self.beacon.render(beacon_pan, &mut left, &mut right);
                }
            }

            frame[0] = left;
            frame[1] = right;
        }
    }

    /// Pop until a beep of the current generation appears; stale beeps from
    /// before the last queue reset are discarded.
    #[inline]
    fn next_current_beep(&mut self, epoch: u32) -> Option<RadarBeep> {
        for _ in 0..BEEP_QUEUE_CAPACITY {
            let beep = self.beeps.try_pop()?;
            if beep.epoch == epoch {
                return Some(beep);
            }
        }
        None
    }
}
