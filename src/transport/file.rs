//! Plain-file transport: opens the path in append mode once at construction
//! and fails fast if that open doesn't succeed. A write error after that is
//! logged once, internally, and then silenced — a struggling disk should not
//! turn every subsequent log call into a storm of diagnostics.

use super::Transport;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct FileTransport {
    path: PathBuf,
    file: Mutex<File>,
    auto_flush: bool,
    warned: AtomicBool,
}

impl FileTransport {
    pub fn open(path: impl AsRef<Path>, auto_flush: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file: Mutex::new(file), auto_flush, warned: AtomicBool::new(false) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for FileTransport {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock();
        let result = file.write_all(bytes).and_then(|_| file.write_all(b"\n")).and_then(|_| {
            if self.auto_flush { file.flush() } else { Ok(()) }
        });
        if let Err(ref e) = result {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::error!(path = %self.path.display(), error = %e, "file sink write failed; further errors on this sink are suppressed");
            }
        } else {
            self.warned.store(false, Ordering::Relaxed);
        }
        result
    }

    fn flush(&self) -> io::Result<()> {
        self.file.lock().flush()
    }
}
