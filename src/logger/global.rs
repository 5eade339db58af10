//! The process-wide logging facade, mirroring the `Log` singleton pattern
//! used by the reference implementation's global header: one logger
//! instance installed once at startup and reached from anywhere via free
//! functions, rather than threading a `&Logger` through every call site.

use super::Logger;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::template::Arg;
use once_cell::sync::OnceCell;
use std::sync::Arc;

static FACADE: OnceCell<Arc<Logger>> = OnceCell::new();

/// Install `logger` as the process-wide facade. Errors if a facade is
/// already installed, since re-initializing mid-process would silently
/// orphan whatever sinks the first logger owned.
pub fn init(logger: Logger) -> Result<()> {
    FACADE
        .set(Arc::new(logger))
        .map_err(|_| Error::InvalidConfiguration("the global logging facade was already initialized".to_string()))
}

fn facade() -> Result<&'static Arc<Logger>> {
    FACADE.get().ok_or(Error::FacadeNotInitialized)
}

pub fn is_initialized() -> bool {
    FACADE.get().is_some()
}

pub fn logger() -> Result<Arc<Logger>> {
    facade().cloned()
}

pub fn log(severity: Level, template: &str, args: &[Arg]) -> Result<()> {
    facade()?.log(severity, template, args, super::LogCall::default());
    Ok(())
}

pub fn trace(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Trace, template, args)
}
pub fn debug(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Debug, template, args)
}
pub fn info(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Info, template, args)
}
pub fn warn(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Warn, template, args)
}
pub fn error(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Error, template, args)
}
pub fn fatal(template: &str, args: &[Arg]) -> Result<()> {
    log(Level::Fatal, template, args)
}

pub fn flush() -> Result<()> {
    facade()?.flush();
    Ok(())
}

pub fn set_rate_limit(capacity: u32, refill_per_sec: f64) -> Result<()> {
    facade()?.set_rate_limit(capacity, refill_per_sec);
    Ok(())
}

#[cfg(test)]
mod tests {
    // `FACADE` is a process-wide `OnceCell`, so these tests share state with
    // every other test in the binary; they only assert properties that hold
    // regardless of initialization order elsewhere in the suite.
    use super::*;

    #[test]
    fn uninitialized_facade_calls_return_not_initialized_or_are_already_set() {
        match log(Level::Info, "x", &[]) {
            Ok(()) => assert!(is_initialized()),
            Err(Error::FacadeNotInitialized) => assert!(!is_initialized()),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
