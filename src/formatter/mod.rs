//! Record formatters: turn a bound [`Record`](crate::record::Record) into
//! the bytes a [`Transport`](crate::transport::Transport) writes (§4.6).

pub mod compact_json;
pub mod human;
pub mod json;
pub mod output_template;
pub mod xml;

use crate::record::Record;

/// Renders one record to its wire/display form.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record) -> Vec<u8>;
}

pub(crate) fn format_rfc3339(ts: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = ts.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
