//! Stdout/stderr transport.

use super::Transport;
use parking_lot::Mutex;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

pub struct StreamTransport {
    stream: Stream,
    // Serializes interleaved writes from multiple sink threads; std's
    // stdout()/stderr() already lock per-call, but a single mutex avoids
    // torn lines when a formatter emits in more than one `write` call.
    lock: Mutex<()>,
}

impl StreamTransport {
    pub fn new(stream: Stream) -> Self {
        Self { stream, lock: Mutex::new(()) }
    }

    pub fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }
}

impl Transport for StreamTransport {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let _guard = self.lock.lock();
        match self.stream {
            Stream::Stdout => {
                let mut h = io::stdout().lock();
                h.write_all(bytes)?;
                h.write_all(b"\n")
            }
            Stream::Stderr => {
                let mut h = io::stderr().lock();
                h.write_all(bytes)?;
                h.write_all(b"\n")
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}
