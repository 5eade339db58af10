//! POSIX syslog transport (`cfg(unix)` only). One transport instance holds
//! one open connection to the local syslog daemon, opened at construction
//! time (the equivalent of `openlog`) and closed when the transport is
//! dropped (`closelog`). Unlike the C `openlog`/`closelog` pair this crate
//! wraps, the connection isn't process-wide reference-counted state — each
//! `SyslogTransport` owns its own socket, so there's nothing to refcount.

use super::Transport;
use crate::level::Level;
use parking_lot::Mutex;
use std::io;
use syslog::{Facility, Formatter3164, Logger, LoggerBackend};

/// `ident` strings longer than this are truncated, mirroring traditional
/// POSIX `openlog` behavior on small fixed-size ident buffers.
const MAX_IDENT_LEN: usize = 32;

pub struct SyslogTransport {
    logger: Mutex<Logger<LoggerBackend, Formatter3164>>,
}

impl SyslogTransport {
    pub fn open(ident: &str, facility: Facility) -> Result<Self, String> {
        let mut truncated = ident.to_string();
        truncated.truncate(MAX_IDENT_LEN);
        let formatter = Formatter3164 { facility, hostname: None, process: truncated, pid: std::process::id() as i32 };
        let logger = syslog::unix(formatter).map_err(|e| format!("failed to open syslog: {e}"))?;
        Ok(Self { logger: Mutex::new(logger) })
    }

    fn write_at(&self, level: Level, message: &str) -> io::Result<()> {
        let mut logger = self.logger.lock();
        let result = match level {
            Level::Trace | Level::Debug => logger.debug(message),
            Level::Info => logger.info(message),
            Level::Warn => logger.warning(message),
            Level::Error => logger.err(message),
            Level::Fatal => logger.crit(message),
        };
        result.map_err(|e| io::Error::other(e.to_string()))
    }
}

impl Transport for SyslogTransport {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let message = String::from_utf8_lossy(bytes);
        self.write_at(Level::Info, &message)
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// A severity-aware write entry point; the generic [`Transport::write`]
/// always logs at `Info` because the trait carries no level information,
/// so sinks that want correct syslog severities call this directly.
pub trait SyslogWrite {
    fn write_leveled(&self, level: Level, bytes: &[u8]) -> io::Result<()>;
}

impl SyslogWrite for SyslogTransport {
    fn write_leveled(&self, level: Level, bytes: &[u8]) -> io::Result<()> {
        let message = String::from_utf8_lossy(bytes);
        self.write_at(level, &message)
    }
}
