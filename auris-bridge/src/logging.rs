//! One-time tracing initialisation for the in-process extension.
//!
//! The host gives us no console, so on Windows log lines go through
//! `OutputDebugStringA`, where DebugView-style tools pick them up; other
//! platforms write to stderr. The filter comes from `RUST_LOG`, defaulting
//! to `info`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false);

        // try_init: a host-embedded subscriber may already be installed.
        #[cfg(windows)]
        let _ = builder.with_writer(debug_writer::MakeDebugWriter).try_init();
        #[cfg(not(windows))]
        let _ = builder.with_writer(std::io::stderr).try_init();
    });
}

#[cfg(windows)]
mod debug_writer {
    use std::io;

    use windows_sys::Win32::System::Diagnostics::Debug::OutputDebugStringA;

    /// Forwards each formatted log line to the debugger transport.
    pub struct DebugWriter;

    impl io::Write for DebugWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut line = Vec::with_capacity(buf.len() + 1);
            line.extend_from_slice(buf);
            line.push(0);
            unsafe { OutputDebugStringA(line.as_ptr()) };
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub struct MakeDebugWriter;

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for MakeDebugWriter {
        type Writer = DebugWriter;

        fn make_writer(&'a self) -> Self::Writer {
            DebugWriter
        }
    }
}
