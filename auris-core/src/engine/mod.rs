//! `FeedbackEngine` — the command-side half of the synthesizer.
//!
//! ## Lifecycle
//!
//! ```text
//! FeedbackEngine::new()
//!     └─► execute(aim_start | radar_start | beacon_start)
//!             └─► device opened lazily, voice parameters reset
//!     └─► execute(aim_update / radar_beep / …)   → lock-free stores
//!     └─► shutdown()                             → silence + pause, no teardown
//! ```
//!
//! ## Threading
//!
//! All methods run on the host command thread, which the host ABI
//! serialises externally. Communication with the audio callback is entirely
//! through `SharedParams` slots and the beep ring; the only blocking points
//! are the one-time device open and the screen-reader client calls.

use std::sync::{atomic, Arc};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::audio::AudioOutput;
use crate::command::{AimUpdate, Command, RadarBeepCommand, Status};
use crate::params::{SharedParams, PITCH_MAX, PITCH_MIN, THRESHOLD_MAX, THRESHOLD_MIN};
use crate::queue::{create_beep_ring, BeepProducer, Producer, RadarBeep};
use crate::speech::ScreenReader;
use crate::synth::renderer::Renderer;

/// Distance at which a radar beep fades to silence (metres).
pub const RADAR_AUDIBLE_RANGE: f32 = 100.0;

/// The top-level engine handle.
///
/// `FeedbackEngine` is `Send + Sync`; wrap it in whatever process-global
/// slot the host integration uses and call [`FeedbackEngine::execute`] for
/// each command line.
pub struct FeedbackEngine {
    params: Arc<SharedParams>,
    /// Producer half of the beep ring. The host serialises commands, but the
    /// lock keeps the engine `Sync` without widening the producer contract.
    beeps: Mutex<BeepProducer>,
    output: AudioOutput,
}

impl FeedbackEngine {
    /// Engine with a real (lazily opened) playback device.
    pub fn new() -> Self {
        let (beep_tx, beep_rx) = create_beep_ring();
        let params = Arc::new(SharedParams::new());
        let renderer = Renderer::new(Arc::clone(&params), beep_rx);
        Self {
            params,
            beeps: Mutex::new(beep_tx),
            output: AudioOutput::new(renderer),
        }
    }

    /// Engine with no device: the caller pulls frames from the returned
    /// [`Renderer`] manually. Used by the offline scenario renderer and the
    /// integration tests.
    pub fn offline() -> (Self, Renderer) {
        let (beep_tx, beep_rx) = create_beep_ring();
        let params = Arc::new(SharedParams::new());
        let renderer = Renderer::new(Arc::clone(&params), beep_rx);
        let engine = Self {
            params,
            beeps: Mutex::new(beep_tx),
            output: AudioOutput::offline(),
        };
        (engine, renderer)
    }

    /// Execute one decoded command and report its status.
    pub fn execute(&self, command: &Command<'_>, reader: &dyn ScreenReader) -> Status {
        match command {
            Command::Test => {
                if reader.is_running() {
                    Status::Ok
                } else {
                    Status::SpeechNotRunning
                }
            }
            Command::Speak(text) => self.announce(*text, |t| reader.speak(t)),
            Command::Braille(text) => self.announce(*text, |t| reader.braille(t)),
            Command::Cancel => match reader.cancel() {
                Ok(()) => Status::Ok,
                Err(e) => {
                    warn!("speech cancel failed: {e}");
                    Status::SpeechError
                }
            },
            Command::AimStart => self.aim_start(),
            Command::AimUpdate(update) => self.aim_update(update),
            Command::AimBlip => {
                self.params.arm_blip();
                Status::Ok
            }
            Command::AimUnlockBlip => {
                self.params.arm_unlock_blip();
                Status::Ok
            }
            Command::AimStop => {
                self.params.aim.active.store(false, atomic::Ordering::Relaxed);
                self.params.aim.muted.store(true, atomic::Ordering::Relaxed);
                Status::Ok
            }
            Command::RadarStart => self.radar_start(),
            Command::RadarBeep(beep) => self.radar_beep(beep),
            Command::RadarStop => {
                self.params
                    .radar_active
                    .store(false, atomic::Ordering::Relaxed);
                // Invalidate anything still queued.
                self.params.bump_radar_epoch();
                Status::Ok
            }
            Command::BeaconStart => self.beacon_start(),
            Command::BeaconUpdate { pan } => {
                self.params.beacon_pan.store(pan.clamp(-1.0, 1.0));
                Status::Ok
            }
            Command::BeaconStop => {
                self.params
                    .beacon_active
                    .store(false, atomic::Ordering::Relaxed);
                Status::Ok
            }
            Command::Unknown => Status::UnknownCommand,
        }
    }

    /// Process-detach path: silence the callback, mark every voice
    /// inactive, pause the device. The device object itself is left alive.
    pub fn shutdown(&self) {
        info!("engine shutdown requested");
        self.params.request_shutdown();
        self.params.aim.active.store(false, atomic::Ordering::Relaxed);
        self.params
            .radar_active
            .store(false, atomic::Ordering::Relaxed);
        self.params
            .beacon_active
            .store(false, atomic::Ordering::Relaxed);
        self.output.stop();
    }

    /// Shared state handle, for embedders that render offline.
    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    // ── Command handlers ─────────────────────────────────────────────────

    fn aim_start(&self) -> Status {
        if let Err(e) = self.output.ensure_started() {
            warn!("aim_start: audio init failed: {e}");
            return Status::AudioInitFailed;
        }
        self.params.aim.reset();
        info!("aim voice started");
        Status::Ok
    }

    fn aim_update(&self, update: &AimUpdate) -> Status {
        let aim = &self.params.aim;
        if update.pitch < 0.0 {
            // Negative pitch is the host's "hold fire" signal: mute and
            // leave every other slot as-is.
            aim.muted.store(true, atomic::Ordering::Relaxed);
            return Status::Ok;
        }

        aim.pan.store(update.pan.clamp(-1.0, 1.0));
        aim.pitch.store(update.pitch.clamp(PITCH_MIN, PITCH_MAX));
        aim.vert_error.store(update.vert_error.clamp(0.0, 1.0));
        aim.horiz_error.store(update.horiz_error.clamp(0.0, 1.0));
        if let Some(vt) = update.vert_threshold {
            aim.vert_threshold
                .store(vt.clamp(THRESHOLD_MIN, THRESHOLD_MAX));
        }
        if let Some(ht) = update.horiz_threshold {
            aim.horiz_threshold
                .store(ht.clamp(THRESHOLD_MIN, THRESHOLD_MAX));
        }
        aim.muted.store(false, atomic::Ordering::Relaxed);
        Status::Ok
    }

    fn radar_start(&self) -> Status {
        if let Err(e) = self.output.ensure_started() {
            warn!("radar_start: audio init failed: {e}");
            return Status::AudioInitFailed;
        }
        // New generation: whatever is still in the ring is stale.
        self.params.bump_radar_epoch();
        self.params
            .radar_active
            .store(true, atomic::Ordering::Relaxed);
        info!("radar voice started");
        Status::Ok
    }

    fn radar_beep(&self, beep: &RadarBeepCommand) -> Status {
        let Some(material) = beep.material else {
            // Material "none": the host asked for no sound.
            return Status::Ok;
        };

        let volume = (1.0 - beep.distance / RADAR_AUDIBLE_RANGE).clamp(0.0, 1.0);
        let entry = RadarBeep {
            pan: beep.pan.clamp(-1.0, 1.0),
            volume,
            material,
            epoch: self.params.current_radar_epoch(),
        };
        if self.beeps.lock().try_push(entry).is_err() {
            debug!("beep ring full, dropping newest");
        }
        Status::Ok
    }

    fn beacon_start(&self) -> Status {
        if let Err(e) = self.output.ensure_started() {
            warn!("beacon_start: audio init failed: {e}");
            return Status::AudioInitFailed;
        }
        self.params.beacon_pan.store(0.0);
        self.params
            .beacon_active
            .store(true, atomic::Ordering::Relaxed);
        info!("beacon voice started");
        Status::Ok
    }

    fn announce(&self, text: &str, call: impl FnOnce(&str) -> crate::error::Result<()>) -> Status {
        if text.is_empty() {
            return Status::EmptyText;
        }
        match call(text) {
            Ok(()) => Status::Ok,
            Err(e) => {
                warn!("screen reader call failed: {e}");
                Status::SpeechError
            }
        }
    }
}

impl Default for FeedbackEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_line;
    use crate::speech::NullScreenReader;

    /// Records calls; configurable liveness and failure code.
    struct MockReader {
        running: bool,
        fail_code: Option<i32>,
        spoken: Mutex<Vec<String>>,
    }

    impl MockReader {
        fn new(running: bool, fail_code: Option<i32>) -> Self {
            Self {
                running,
                fail_code,
                spoken: Mutex::new(Vec::new()),
            }
        }

        fn result(&self) -> crate::error::Result<()> {
            match self.fail_code {
                Some(code) => Err(crate::error::AurisError::SpeechClient { code }),
                None => Ok(()),
            }
        }
    }

    impl ScreenReader for MockReader {
        fn is_running(&self) -> bool {
            self.running
        }

        fn speak(&self, text: &str) -> crate::error::Result<()> {
            self.spoken.lock().push(text.to_string());
            self.result()
        }

        fn cancel(&self) -> crate::error::Result<()> {
            self.result()
        }

        fn braille(&self, text: &str) -> crate::error::Result<()> {
            self.spoken.lock().push(text.to_string());
            self.result()
        }
    }

    fn run(engine: &FeedbackEngine, line: &str) -> Status {
        engine.execute(&parse_line(line), &NullScreenReader)
    }

    #[test]
    fn test_command_reports_liveness() {
        let (engine, _renderer) = FeedbackEngine::offline();
        let live = MockReader::new(true, None);
        let dead = MockReader::new(false, None);
        assert_eq!(engine.execute(&Command::Test, &live), Status::Ok);
        assert_eq!(engine.execute(&Command::Test, &dead), Status::SpeechNotRunning);
    }

    #[test]
    fn speak_routes_text_and_maps_errors() {
        let (engine, _renderer) = FeedbackEngine::offline();

        let ok = MockReader::new(true, None);
        assert_eq!(engine.execute(&Command::Speak("contact left"), &ok), Status::Ok);
        assert_eq!(ok.spoken.lock().as_slice(), ["contact left"]);

        let failing = MockReader::new(true, Some(7));
        assert_eq!(
            engine.execute(&Command::Speak("contact left"), &failing),
            Status::SpeechError
        );

        assert_eq!(engine.execute(&Command::Speak(""), &ok), Status::EmptyText);
        assert_eq!(engine.execute(&Command::Braille(""), &ok), Status::EmptyText);
    }

    #[test]
    fn aim_start_resets_and_activates() {
        let (engine, _renderer) = FeedbackEngine::offline();
        assert_eq!(run(&engine, "aim_start"), Status::Ok);
        let snap = engine.params().aim_snapshot();
        assert!(snap.active);
        assert!(snap.muted);
        assert_eq!(snap.pitch, 550.0);
        assert_eq!(snap.vert_error, 1.0);
    }

    #[test]
    fn aim_update_clamps_and_unmutes() {
        let (engine, _renderer) = FeedbackEngine::offline();
        run(&engine, "aim_start");
        assert_eq!(run(&engine, "aim_update:-2.0,9999,1.5,-0.5,0.9,0.0001"), Status::Ok);

        let snap = engine.params().aim_snapshot();
        assert!(!snap.muted);
        assert_eq!(snap.pan, -1.0);
        assert_eq!(snap.pitch, PITCH_MAX);
        assert_eq!(snap.vert_error, 1.0);
        assert_eq!(snap.horiz_error, 0.0);
        assert_eq!(snap.vert_threshold, THRESHOLD_MAX);
        assert_eq!(snap.horiz_threshold, THRESHOLD_MIN);
    }

    #[test]
    fn negative_pitch_mutes_without_touching_other_slots() {
        let (engine, _renderer) = FeedbackEngine::offline();
        run(&engine, "aim_start");
        run(&engine, "aim_update:0.5,700,0.2,0.3");
        let before = engine.params().aim_snapshot();
        assert!(!before.muted);

        assert_eq!(run(&engine, "aim_update:-0.9,-1,0,0"), Status::Ok);
        let after = engine.params().aim_snapshot();
        assert!(after.muted);
        assert_eq!(after.pan, before.pan);
        assert_eq!(after.pitch, before.pitch);
        assert_eq!(after.vert_error, before.vert_error);
    }

    #[test]
    fn aim_stop_deactivates_and_mutes() {
        let (engine, _renderer) = FeedbackEngine::offline();
        run(&engine, "aim_start");
        run(&engine, "aim_update:0,550,0,0");
        assert_eq!(run(&engine, "aim_stop"), Status::Ok);
        let snap = engine.params().aim_snapshot();
        assert!(!snap.active);
        assert!(snap.muted);
    }

    #[test]
    fn radar_beep_maps_distance_to_volume() {
        let (engine, mut renderer) = FeedbackEngine::offline();
        run(&engine, "radar_start");
        run(&engine, "radar_beep:0,10,grass");
        run(&engine, "radar_beep:0,50,grass");

        // Both beeps fit in 4096 frames: the first occupies ~1102, then the
        // second is dequeued when the envelope returns to idle.
        let mut buf = vec![0.0f32; 4096 * 2];
        renderer.render(&mut buf);
        let left: Vec<f32> = buf.iter().step_by(2).copied().collect();

        let near_peak = left[..1000].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let mid_peak = left[1200..2200].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(near_peak > mid_peak, "near={near_peak} mid={mid_peak}");
        assert!(mid_peak > 0.0);
    }

    #[test]
    fn radar_beep_beyond_audible_range_is_silent() {
        let (engine, mut renderer) = FeedbackEngine::offline();
        run(&engine, "radar_start");
        run(&engine, "radar_beep:0,250,grass");

        let mut buf = vec![0.0f32; 4096];
        renderer.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn radar_none_material_enqueues_nothing() {
        let (engine, mut renderer) = FeedbackEngine::offline();
        run(&engine, "radar_start");
        assert_eq!(run(&engine, "radar_beep:0.5,10,none"), Status::Ok);

        let mut buf = vec![0.0f32; 2048];
        renderer.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn radar_stop_drains_queued_beeps() {
        let (engine, mut renderer) = FeedbackEngine::offline();
        run(&engine, "radar_start");
        run(&engine, "radar_beep:0,10,metal");
        run(&engine, "radar_stop");
        run(&engine, "radar_start");

        // Queue was drained by the epoch bump: nothing to play.
        let mut buf = vec![0.0f32; 4096];
        renderer.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn beacon_commands_drive_the_shared_slots() {
        let (engine, _renderer) = FeedbackEngine::offline();
        assert_eq!(run(&engine, "beacon_start"), Status::Ok);
        assert!(engine.params().beacon_active.load(atomic::Ordering::Relaxed));
        assert_eq!(engine.params().beacon_pan.load(), 0.0);

        run(&engine, "beacon_update:1.7");
        assert_eq!(engine.params().beacon_pan.load(), 1.0);

        run(&engine, "beacon_stop");
        assert!(!engine.params().beacon_active.load(atomic::Ordering::Relaxed));
    }

    #[test]
    fn unknown_command_status() {
        let (engine, _renderer) = FeedbackEngine::offline();
        assert_eq!(run(&engine, "warp_drive:9"), Status::UnknownCommand);
    }

    #[test]
    fn shutdown_silences_everything() {
        let (engine, mut renderer) = FeedbackEngine::offline();
        run(&engine, "aim_start");
        run(&engine, "aim_update:0,550,0,0");
        engine.shutdown();

        assert!(engine.params().is_shutdown());
        let mut buf = vec![0.1f32; 1024];
        renderer.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }
}
