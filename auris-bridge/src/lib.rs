//! Host extension entry points.
//!
//! The game loads this library and calls three exported functions — a
//! version query, a string-command dispatcher and an argv-style variant —
//! plus the loader's process-detach notification. Everything funnels into
//! one process-global [`FeedbackEngine`].
//!
//! ## ABI contract
//!
//! - `extern "system"`: stdcall on 32-bit Windows, the platform C
//!   convention everywhere else.
//! - The host owns the output buffer; every write is NUL-terminated and
//!   truncated to the given size. Null pointers and non-positive sizes are
//!   tolerated as no-ops.
//! - No panic may cross the ABI: entry bodies run under `catch_unwind` and
//!   a panicking command reports an empty status.

mod logging;
mod nvda;

use std::ffi::{c_char, c_int, CStr};
use std::panic::catch_unwind;
use std::sync::OnceLock;

use auris_core::{parse_line, Command, FeedbackEngine, Status};
use tracing::error;

static ENGINE: OnceLock<FeedbackEngine> = OnceLock::new();

fn engine() -> &'static FeedbackEngine {
    ENGINE.get_or_init(FeedbackEngine::new)
}

fn dispatch(line: &str) -> Status {
    engine().execute(&parse_line(line), nvda::client())
}

/// Copy `value` into the caller's buffer, NUL-terminated, truncating to fit.
fn write_output(output: *mut c_char, output_size: c_int, value: &str) {
    if output.is_null() || output_size <= 0 {
        return;
    }
    let capacity = output_size as usize;
    let bytes = value.as_bytes();
    let len = bytes.len().min(capacity - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), output.cast::<u8>(), len);
        output.add(len).write(0);
    }
}

/// Version query: writes the crate version string.
#[no_mangle]
pub extern "system" fn RVExtensionVersion(output: *mut c_char, output_size: c_int) {
    logging::init();
    write_output(output, output_size, env!("CARGO_PKG_VERSION"));
}

/// String-command entry: `verb` or `verb:arg1,arg2,…` in, status out.
#[no_mangle]
pub extern "system" fn RVExtension(
    output: *mut c_char,
    output_size: c_int,
    function: *const c_char,
) {
    logging::init();
    let outcome = catch_unwind(|| {
        if function.is_null() {
            return None;
        }
        let line = unsafe { CStr::from_ptr(function) }.to_string_lossy();
        Some(dispatch(&line))
    });
    match outcome {
        Ok(Some(status)) => write_output(output, output_size, status.as_str()),
        Ok(None) => {}
        Err(_) => {
            error!("command handler panicked");
            write_output(output, output_size, "");
        }
    }
}

/// Argv-style entry. `speak` concatenates all arguments with single spaces;
/// every other verb delegates to the string entry semantics.
#[no_mangle]
pub extern "system" fn RVExtensionArgs(
    output: *mut c_char,
    output_size: c_int,
    function: *const c_char,
    args: *const *const c_char,
    arg_count: c_int,
) -> c_int {
    logging::init();
    let outcome = catch_unwind(|| {
        if function.is_null() {
            return None;
        }
        let verb = unsafe { CStr::from_ptr(function) }.to_string_lossy();

        if verb.as_ref() == "speak" && arg_count > 0 && !args.is_null() {
            let mut text = String::new();
            for i in 0..arg_count as usize {
                let arg = unsafe { *args.add(i) };
                if arg.is_null() {
                    continue;
                }
                let piece = unsafe { CStr::from_ptr(arg) }.to_string_lossy();
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&piece);
            }
            return Some(engine().execute(&Command::Speak(&text), nvda::client()));
        }

        Some(dispatch(&verb))
    });
    match outcome {
        Ok(Some(status)) => write_output(output, output_size, status.as_str()),
        Ok(None) => {}
        Err(_) => {
            error!("command handler panicked");
            write_output(output, output_size, "");
        }
    }
    0
}

/// Detach path: silence and pause audio without destroying the device.
///
/// Reachable from `DllMain` on Windows and callable directly by embedders
/// and tests.
pub fn process_detach() {
    if let Some(engine) = ENGINE.get() {
        engine.shutdown();
    }
}

#[cfg(windows)]
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(
    _module: *mut std::ffi::c_void,
    reason: u32,
    _reserved: *mut std::ffi::c_void,
) -> i32 {
    use windows_sys::Win32::System::SystemServices::DLL_PROCESS_DETACH;

    if reason == DLL_PROCESS_DETACH {
        process_detach();
    }
    1
}
