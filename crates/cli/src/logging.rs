//! Tracing setup with an in-memory copy of the run log.
//!
//! The notification body embeds the full log of the run, so the fmt
//! layer writes to stderr and a shared buffer at the same time.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Shared capture of everything the fmt layer writes.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured log so far, as lossy UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            stderr: io::stderr(),
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Writes to stderr and the capture buffer.
pub struct TeeWriter {
    stderr: io::Stderr,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        self.stderr.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stderr.flush()
    }
}

/// Installs the global subscriber. The default level is info so the
/// captured log matches what the console shows; `-v` raises to debug,
/// `-vv` to trace. `RUST_LOG` wins when set.
pub fn init_logging(verbose: u8, capture: LogCapture) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(capture)
        // The captured stream lands in an HTML notification body.
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sees_what_the_writer_writes() {
        let capture = LogCapture::new();
        let mut writer = capture.make_writer();
        writer.write_all(b"visiting topic 1\n").unwrap();
        writer.write_all(b"topic liked\n").unwrap();

        let contents = capture.contents();
        assert!(contents.contains("visiting topic 1"));
        assert!(contents.contains("topic liked"));
    }

    #[test]
    fn clones_share_one_buffer() {
        let capture = LogCapture::new();
        let clone = capture.clone();
        clone.make_writer().write_all(b"shared").unwrap();
        assert_eq!(capture.contents(), "shared");
    }
}
