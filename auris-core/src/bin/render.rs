//! Offline scenario renderer.
//!
//! Drives the engine with scripted command sequences and writes the output
//! to WAV files for audition — no audio device, no host. Useful when tuning
//! voice levels or checking a DSP change by ear.
//!
//! ```text
//! cargo run --bin render -- --out-dir target/scenarios [--seconds 3]
//! ```

use std::path::PathBuf;

use auris_core::command::parse_line;
use auris_core::engine::FeedbackEngine;
use auris_core::speech::NullScreenReader;
use auris_core::synth::{CHANNEL_COUNT, SAMPLE_RATE};

struct Args {
    out_dir: PathBuf,
    seconds: f32,
}

/// A named command script: (time offset in seconds, command line).
struct Scenario {
    name: &'static str,
    script: &'static [(f32, &'static str)],
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "aim_locked",
        script: &[
            (0.0, "aim_start"),
            (0.0, "aim_update:0,550,0,0,0.02,0.005"),
            (1.5, "aim_blip"),
        ],
    },
    Scenario {
        name: "aim_far_left",
        script: &[
            (0.0, "aim_start"),
            (0.0, "aim_update:-1,550,0.5,0.5,0.02,0.005"),
        ],
    },
    Scenario {
        name: "aim_closing_in",
        script: &[
            (0.0, "aim_start"),
            (0.0, "aim_update:0.6,550,0.38,0.6"),
            (1.0, "aim_update:0.15,550,0.2,0.15"),
            (2.0, "aim_update:0,550,0.01,0.002"),
            (2.5, "aim_blip"),
        ],
    },
    Scenario {
        name: "radar_materials",
        script: &[
            (0.0, "radar_start"),
            (0.0, "radar_beep:-0.8,10,grass"),
            (0.2, "radar_beep:-0.4,15,concrete"),
            (0.4, "radar_beep:0,20,wood"),
            (0.6, "radar_beep:0.4,25,metal"),
            (0.8, "radar_beep:0.8,30,water"),
            (1.0, "radar_beep:0,35,man"),
            (1.2, "radar_beep:-0.5,40,glass"),
            (1.4, "radar_beep:0.5,45,unknown_material"),
        ],
    },
    Scenario {
        name: "beacon_sweep",
        script: &[
            (0.0, "beacon_start"),
            (0.0, "beacon_update:0.5"),
            (1.0, "beacon_update:0.15"),
            (2.0, "beacon_update:0.0"),
        ],
    },
];

fn main() {
    if let Err(e) = run() {
        eprintln!("render failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| format!("cannot create {}: {e}", args.out_dir.display()))?;

    for scenario in SCENARIOS {
        let path = args.out_dir.join(format!("{}.wav", scenario.name));
        render_scenario(scenario, args.seconds, &path)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn render_scenario(scenario: &Scenario, seconds: f32, path: &std::path::Path) -> Result<(), String> {
    let (engine, mut renderer) = FeedbackEngine::offline();
    let reader = NullScreenReader;

    let spec = hound::WavSpec {
        channels: CHANNEL_COUNT as u16,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| format!("wav create: {e}"))?;

    // 512-frame buffers, command script applied at buffer granularity.
    const BUFFER_FRAMES: usize = 512;
    let total_frames = (seconds * SAMPLE_RATE as f32) as usize;
    let mut buf = vec![0.0f32; BUFFER_FRAMES * CHANNEL_COUNT];
    let mut script = scenario.script.iter().peekable();

    let mut frame = 0usize;
    while frame < total_frames {
        let now = frame as f32 / SAMPLE_RATE as f32;
        while let Some((at, line)) = script.peek() {
            if *at > now {
                break;
            }
            let status = engine.execute(&parse_line(line), &reader);
            if status != auris_core::Status::Ok {
                eprintln!("{}: `{line}` -> {status}", scenario.name);
            }
            script.next();
        }

        renderer.render(&mut buf);
        for sample in &buf {
            writer
                .write_sample(*sample)
                .map_err(|e| format!("wav write: {e}"))?;
        }
        frame += BUFFER_FRAMES;
    }

    writer.finalize().map_err(|e| format!("wav finalize: {e}"))?;
    Ok(())
}

fn parse_args() -> Result<Args, String> {
    let mut out_dir = PathBuf::from("target/scenarios");
    let mut seconds = 3.0f32;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--out-dir" => {
                let Some(v) = it.next() else {
                    return Err("missing value for --out-dir".into());
                };
                out_dir = PathBuf::from(v);
            }
            "--seconds" => {
                let Some(v) = it.next() else {
                    return Err("missing value for --seconds".into());
                };
                seconds = v
                    .parse::<f32>()
                    .map_err(|_| "invalid value for --seconds".to_string())?
                    .clamp(0.5, 30.0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Args { out_dir, seconds })
}
