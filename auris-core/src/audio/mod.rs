//! Audio output via the cpal backend.
//!
//! # Design constraints
//!
//! The output callback runs on an OS audio thread at elevated priority; its
//! entire body is [`Renderer::render`], which neither allocates nor locks.
//!
//! `cpal::Stream` is `!Send` on most platforms (COM on Windows, CoreAudio on
//! macOS), so the stream is built and held on a dedicated owner thread. The
//! blocking `*_start` caller learns the open outcome over a bounded(1)
//! channel, exactly one message per init attempt.
//!
//! # Teardown hazard
//!
//! On process detach the stream is paused but never dropped: the underlying
//! driver can deadlock when its device object is destroyed on the loader
//! unload path. The owner thread forgets the stream instead and lets the OS
//! reclaim it with the process.

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::error::{AurisError, Result};
use crate::synth::renderer::Renderer;

enum ControlMsg {
    Pause,
}

enum OutputState {
    /// No device yet; the first `*_start` command initialises it.
    Uninitialized,
    /// Stream built and playing on the owner thread.
    Running { control: Sender<ControlMsg> },
    /// Shutdown requested; the stream is paused and will never restart.
    Stopped,
    /// No device at all — frames are pulled manually by the embedder
    /// (offline rendering, tests).
    Offline,
}

/// Lazy-initialised playback device wrapper.
///
/// The transient "initializing" state of the lifecycle lives inside the
/// locked section of [`AudioOutput::ensure_started`]; externally the device
/// is uninitialised, running, or stopped.
pub struct AudioOutput {
    state: Mutex<OutputState>,
    /// Renderer waiting to move onto the owner thread at first start.
    pending: Mutex<Option<Renderer>>,
}

impl AudioOutput {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            state: Mutex::new(OutputState::Uninitialized),
            pending: Mutex::new(Some(renderer)),
        }
    }

    /// An output that never opens a device; `ensure_started` is a no-op.
    pub fn offline() -> Self {
        Self {
            state: Mutex::new(OutputState::Offline),
            pending: Mutex::new(None),
        }
    }

    /// Initialise and start the device on first use.
    ///
    /// Idempotent: already running (or offline, or stopped after shutdown)
    /// returns `Ok` without touching the device.
    ///
    /// # Errors
    /// Device enumeration or stream build/play failures; the caller reports
    /// them as "AUDIO_INIT_FAILED" and the state stays uninitialised so a
    /// later `*_start` may retry.
    pub fn ensure_started(&self) -> Result<()> {
        let mut state = self.state.lock();
        match &*state {
            OutputState::Running { .. } | OutputState::Stopped | OutputState::Offline => Ok(()),
            OutputState::Uninitialized => {
                let renderer = self.pending.lock().take().ok_or_else(|| {
                    AurisError::AudioDevice("renderer lost in a previous failed init".into())
                })?;
                match spawn_stream_owner(renderer) {
                    Ok(control) => {
                        *state = OutputState::Running { control };
                        Ok(())
                    }
                    Err((err, renderer)) => {
                        *self.pending.lock() = renderer;
                        Err(err)
                    }
                }
            }
        }
    }

    /// Pause playback and refuse any further starts. Never destroys the
    /// stream object.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if let OutputState::Running { control } = &*state {
            let _ = control.send(ControlMsg::Pause);
        }
        if !matches!(*state, OutputState::Offline) {
            *state = OutputState::Stopped;
        }
    }
}

/// Spawn the owner thread and wait for its open verdict.
///
/// On pre-build failures the renderer travels back so the next `*_start`
/// can retry with it.
#[cfg(feature = "audio-cpal")]
fn spawn_stream_owner(
    renderer: Renderer,
) -> std::result::Result<Sender<ControlMsg>, (AurisError, Option<Renderer>)> {
    let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
    let (control_tx, control_rx) = crossbeam_channel::unbounded();

    let spawned = std::thread::Builder::new()
        .name("auris-audio".into())
        .spawn(move || stream_owner(renderer, ready_tx, control_rx));
    if let Err(e) = spawned {
        return Err((AurisError::AudioDevice(e.to_string()), None));
    }

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(control_tx),
        Ok(Err((err, renderer))) => Err((err, renderer)),
        Err(_) => Err((
            AurisError::AudioDevice("audio owner thread died during init".into()),
            None,
        )),
    }
}

#[cfg(not(feature = "audio-cpal"))]
fn spawn_stream_owner(
    renderer: Renderer,
) -> std::result::Result<Sender<ControlMsg>, (AurisError, Option<Renderer>)> {
    Err((
        AurisError::AudioStream("compiled without audio-cpal feature".into()),
        Some(renderer),
    ))
}

/// Build the stream, report readiness, then hold the stream for the life of
/// the process, pausing on request.
#[cfg(feature = "audio-cpal")]
fn stream_owner(
    renderer: Renderer,
    ready_tx: Sender<std::result::Result<(), (AurisError, Option<Renderer>)>>,
    control_rx: crossbeam_channel::Receiver<ControlMsg>,
) {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{BufferSize, SampleRate, StreamConfig};
    use tracing::{error, info, warn};

    use crate::synth::{CHANNEL_COUNT, SAMPLE_RATE};

    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = ready_tx.send(Err((AurisError::NoOutputDevice, Some(renderer))));
        return;
    };
    let device_name = device.name().unwrap_or_else(|_| "<unnamed>".into());

    let config = StreamConfig {
        channels: CHANNEL_COUNT as u16,
        sample_rate: SampleRate(SAMPLE_RATE),
        buffer_size: BufferSize::Default,
    };

    let mut renderer = renderer;
    let stream = match device.build_output_stream(
        &config,
        move |data: &mut [f32], _info| renderer.render(data),
        |err| error!("audio stream error: {err}"),
        None,
    ) {
        Ok(stream) => stream,
        Err(e) => {
            // The renderer was consumed by the dropped callback closure.
            let _ = ready_tx.send(Err((AurisError::AudioStream(e.to_string()), None)));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err((AurisError::AudioStream(e.to_string()), None)));
        return;
    }

    info!(device = device_name.as_str(), "audio output running");
    let _ = ready_tx.send(Ok(()));

    while let Ok(msg) = control_rx.recv() {
        match msg {
            ControlMsg::Pause => {
                if let Err(e) = stream.pause() {
                    warn!("failed to pause audio stream: {e}");
                } else {
                    info!("audio output paused");
                }
            }
        }
    }

    // Control channel closed: the engine is gone. Deliberately leak the
    // stream — destroying the device here can deadlock the driver.
    std::mem::forget(stream);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::params::SharedParams;
    use crate::queue::create_beep_ring;

    fn offline_renderer() -> Renderer {
        let (_tx, rx) = create_beep_ring();
        Renderer::new(Arc::new(SharedParams::new()), rx)
    }

    #[test]
    fn offline_output_starts_without_a_device() {
        let output = AudioOutput::offline();
        assert!(output.ensure_started().is_ok());
        output.stop();
        assert!(output.ensure_started().is_ok());
    }

    #[test]
    fn start_after_shutdown_is_a_quiet_no_op() {
        let output = AudioOutput::new(offline_renderer());
        output.stop();
        assert!(output.ensure_started().is_ok());
    }
}
