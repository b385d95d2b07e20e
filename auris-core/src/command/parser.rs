//! Command-line decoding.
//!
//! Grammar: split once on `:` into verb and payload, then split the payload
//! on `,`. Numeric fields take the longest leading decimal prefix, the way
//! the host's C runtime reads them; anything unreadable becomes the field
//! default. `speak`/`braille` require the colon form — a bare `speak` is an
//! unknown command, matching the original bridge's prefix match.

use crate::params::DEFAULT_AIM_PITCH;
use crate::queue::Material;

use super::{AimUpdate, Command, RadarBeepCommand};

/// Decode one command line.
pub fn parse_line(line: &str) -> Command<'_> {
    let (verb, payload) = match line.split_once(':') {
        Some((verb, payload)) => (verb, Some(payload)),
        None => (line, None),
    };

    match verb {
        "test" => Command::Test,
        "cancel" => Command::Cancel,
        "speak" => match payload {
            Some(text) => Command::Speak(text),
            None => Command::Unknown,
        },
        "braille" => match payload {
            Some(text) => Command::Braille(text),
            None => Command::Unknown,
        },
        "aim_start" => Command::AimStart,
        "aim_update" => Command::AimUpdate(parse_aim_update(payload.unwrap_or(""))),
        "aim_blip" => Command::AimBlip,
        "aim_unlock_blip" => Command::AimUnlockBlip,
        "aim_stop" => Command::AimStop,
        "radar_start" => Command::RadarStart,
        "radar_beep" => Command::RadarBeep(parse_radar_beep(payload.unwrap_or(""))),
        "radar_stop" => Command::RadarStop,
        "beacon_start" => Command::BeaconStart,
        "beacon_update" => {
            let mut fields = payload.unwrap_or("").split(',');
            Command::BeaconUpdate {
                pan: float_field(&mut fields, 0.0),
            }
        }
        "beacon_stop" => Command::BeaconStop,
        _ => Command::Unknown,
    }
}

fn parse_aim_update(payload: &str) -> AimUpdate {
    let mut fields = payload.split(',');
    AimUpdate {
        pan: float_field(&mut fields, 0.0),
        pitch: float_field(&mut fields, DEFAULT_AIM_PITCH),
        vert_error: float_field(&mut fields, 1.0),
        horiz_error: float_field(&mut fields, 1.0),
        vert_threshold: optional_float_field(&mut fields),
        horiz_threshold: optional_float_field(&mut fields),
    }
}

fn parse_radar_beep(payload: &str) -> RadarBeepCommand {
    let mut fields = payload.split(',');
    let pan = float_field(&mut fields, 0.0);
    let distance = float_field(&mut fields, 0.0);
    let material = Material::from_name(fields.next().unwrap_or(""));
    RadarBeepCommand {
        pan,
        distance,
        material,
    }
}

fn float_field<'a>(fields: &mut impl Iterator<Item = &'a str>, default: f32) -> f32 {
    fields
        .next()
        .and_then(leading_float)
        .unwrap_or(default)
}

fn optional_float_field<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<f32> {
    fields.next().and_then(leading_float)
}

/// Parse the longest leading `[ws][±]digits[.digits]` prefix, or `None` if
/// no digit is present.
fn leading_float(field: &str) -> Option<f32> {
    let s = field.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || int_digits > 0 {
            end = frac_end;
        }
    }

    let prefix = &s[..end];
    if !prefix.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_verbs_decode() {
        assert_eq!(parse_line("test"), Command::Test);
        assert_eq!(parse_line("cancel"), Command::Cancel);
        assert_eq!(parse_line("aim_start"), Command::AimStart);
        assert_eq!(parse_line("aim_blip"), Command::AimBlip);
        assert_eq!(parse_line("aim_unlock_blip"), Command::AimUnlockBlip);
        assert_eq!(parse_line("aim_stop"), Command::AimStop);
        assert_eq!(parse_line("radar_start"), Command::RadarStart);
        assert_eq!(parse_line("radar_stop"), Command::RadarStop);
        assert_eq!(parse_line("beacon_start"), Command::BeaconStart);
        assert_eq!(parse_line("beacon_stop"), Command::BeaconStop);
    }

    #[test]
    fn unknown_verbs_and_bare_speak_are_rejected() {
        assert_eq!(parse_line("bogus"), Command::Unknown);
        assert_eq!(parse_line("speak"), Command::Unknown);
        assert_eq!(parse_line("braille"), Command::Unknown);
        assert_eq!(parse_line(""), Command::Unknown);
    }

    #[test]
    fn speak_payload_is_borrowed_verbatim() {
        assert_eq!(parse_line("speak:Enemy, 40 metres"), Command::Speak("Enemy, 40 metres"));
        assert_eq!(parse_line("speak:"), Command::Speak(""));
        assert_eq!(parse_line("braille:reload"), Command::Braille("reload"));
    }

    #[test]
    fn aim_update_full_payload() {
        let cmd = parse_line("aim_update:-0.25,880,0.3,0.1,0.02,0.005");
        assert_eq!(
            cmd,
            Command::AimUpdate(AimUpdate {
                pan: -0.25,
                pitch: 880.0,
                vert_error: 0.3,
                horiz_error: 0.1,
                vert_threshold: Some(0.02),
                horiz_threshold: Some(0.005),
            })
        );
    }

    #[test]
    fn aim_update_omitted_thresholds_stay_unset() {
        let cmd = parse_line("aim_update:0,550,0.5,0.5");
        match cmd {
            Command::AimUpdate(update) => {
                assert_eq!(update.vert_threshold, None);
                assert_eq!(update.horiz_threshold, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn aim_update_malformed_fields_substitute_defaults() {
        let cmd = parse_line("aim_update:junk,,x1,0.5");
        assert_eq!(
            cmd,
            Command::AimUpdate(AimUpdate {
                pan: 0.0,
                pitch: DEFAULT_AIM_PITCH,
                vert_error: 1.0,
                horiz_error: 0.5,
                vert_threshold: None,
                horiz_threshold: None,
            })
        );
    }

    #[test]
    fn aim_update_without_payload_is_all_defaults() {
        let cmd = parse_line("aim_update");
        assert_eq!(
            cmd,
            Command::AimUpdate(AimUpdate {
                pan: 0.0,
                pitch: DEFAULT_AIM_PITCH,
                vert_error: 1.0,
                horiz_error: 1.0,
                vert_threshold: None,
                horiz_threshold: None,
            })
        );
    }

    #[test]
    fn radar_beep_decodes_material() {
        let cmd = parse_line("radar_beep:0.5,10,metal");
        assert_eq!(
            cmd,
            Command::RadarBeep(RadarBeepCommand {
                pan: 0.5,
                distance: 10.0,
                material: Some(Material::Metal),
            })
        );
    }

    #[test]
    fn radar_beep_none_material_is_a_drop_marker() {
        let cmd = parse_line("radar_beep:0,25,none");
        match cmd {
            Command::RadarBeep(beep) => assert_eq!(beep.material, None),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn radar_beep_unknown_material_folds_to_default() {
        let cmd = parse_line("radar_beep:0,25,kevlar");
        match cmd {
            Command::RadarBeep(beep) => assert_eq!(beep.material, Some(Material::Default)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn beacon_update_reads_one_pan_field() {
        assert_eq!(parse_line("beacon_update:0.75"), Command::BeaconUpdate { pan: 0.75 });
        assert_eq!(parse_line("beacon_update"), Command::BeaconUpdate { pan: 0.0 });
    }

    #[test]
    fn leading_float_takes_the_numeric_prefix() {
        assert_eq!(leading_float("2.5abc"), Some(2.5));
        assert_eq!(leading_float("  -0.75"), Some(-0.75));
        assert_eq!(leading_float("+3"), Some(3.0));
        assert_eq!(leading_float("12."), Some(12.0));
        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("-.25x"), Some(-0.25));
        assert_eq!(leading_float(""), None);
        assert_eq!(leading_float("abc"), None);
        assert_eq!(leading_float("-"), None);
        assert_eq!(leading_float("."), None);
    }
}
