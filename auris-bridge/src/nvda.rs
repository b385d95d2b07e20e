//! Native screen-reader controller client.
//!
//! On Windows this links the NVDA controller client import library and
//! exposes its call triad through the engine's `ScreenReader` trait. Other
//! platforms get the core null client so the crate builds and tests
//! everywhere; the bridge is only ever deployed on the platform the host
//! runs on.

use auris_core::ScreenReader;

#[cfg(not(windows))]
use auris_core::NullScreenReader;

/// The process-wide screen-reader client used by command dispatch.
#[cfg(windows)]
pub fn client() -> &'static dyn ScreenReader {
    static CLIENT: NvdaScreenReader = NvdaScreenReader;
    &CLIENT
}

#[cfg(not(windows))]
pub fn client() -> &'static dyn ScreenReader {
    static CLIENT: NullScreenReader = NullScreenReader;
    &CLIENT
}

/// UTF-8 → NUL-terminated UTF-16, the encoding the controller client takes.
#[cfg_attr(not(windows), allow(dead_code))]
fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(windows)]
mod controller {
    #[link(name = "nvdaControllerClient")]
    extern "C" {
        pub fn nvdaController_testIfRunning() -> u32;
        pub fn nvdaController_speakText(text: *const u16) -> u32;
        pub fn nvdaController_cancelSpeech() -> u32;
        pub fn nvdaController_brailleMessage(text: *const u16) -> u32;
    }
}

#[cfg(windows)]
pub struct NvdaScreenReader;

#[cfg(windows)]
impl NvdaScreenReader {
    fn check(status: u32) -> auris_core::error::Result<()> {
        if status == 0 {
            Ok(())
        } else {
            Err(auris_core::AurisError::SpeechClient {
                code: status as i32,
            })
        }
    }
}

#[cfg(windows)]
impl ScreenReader for NvdaScreenReader {
    fn is_running(&self) -> bool {
        unsafe { controller::nvdaController_testIfRunning() == 0 }
    }

    fn speak(&self, text: &str) -> auris_core::error::Result<()> {
        let wide = to_wide(text);
        Self::check(unsafe { controller::nvdaController_speakText(wide.as_ptr()) })
    }

    fn cancel(&self) -> auris_core::error::Result<()> {
        Self::check(unsafe { controller::nvdaController_cancelSpeech() })
    }

    fn braille(&self, text: &str) -> auris_core::error::Result<()> {
        let wide = to_wide(text);
        Self::check(unsafe { controller::nvdaController_brailleMessage(wide.as_ptr()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wide_terminates_and_encodes_basic_text() {
        let wide = to_wide("Ok");
        assert_eq!(wide, vec![b'O' as u16, b'k' as u16, 0]);
    }

    #[test]
    fn to_wide_handles_non_ascii() {
        // "über" — ü is a single UTF-16 code unit.
        let wide = to_wide("über");
        assert_eq!(wide.len(), 5);
        assert_eq!(wide[0], 0x00FC);
        assert_eq!(*wide.last().unwrap(), 0);
    }

    #[test]
    fn to_wide_of_empty_text_is_just_the_terminator() {
        assert_eq!(to_wide(""), vec![0]);
    }

    #[test]
    fn stub_client_reports_absent_reader() {
        let client = client();
        assert!(cfg!(windows) || !client.is_running());
    }
}
