//! HTTP transport: POSTs each formatted record as one JSON-lines-compatible
//! body to a configured endpoint (§6). URLs are validated before the
//! transport is constructed so a typo surfaces at configuration time, not on
//! the first log call.

use super::Transport;
use std::io;
use std::time::Duration;

/// A validated, split-apart HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Validate an absolute `http`/`https` URL per §6: a recognized scheme, a
/// host (bracketed IPv6 literals rejected), no CRLF anywhere, and a port in
/// `1..=65535` (defaulting to 80/443 when omitted).
pub fn validate_url(raw: &str) -> Result<ParsedUrl, String> {
    if raw.contains('\r') || raw.contains('\n') {
        return Err("URL may not contain CR or LF".to_string());
    }

    let (scheme, rest) = raw.split_once("://").ok_or_else(|| "URL is missing a scheme".to_string())?;
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(format!("unsupported scheme '{scheme}', expected http or https"));
    }

    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], rest[i..].to_string()),
        None => (rest, "/".to_string()),
    };
    if authority.is_empty() {
        return Err("URL is missing a host".to_string());
    }

    if authority.starts_with('[') {
        return Err("bracketed IPv6 literals are rejected".to_string());
    }
    let (host, port_str) = match authority.rsplit_once(':') {
        Some((h, p)) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => (h.to_string(), Some(p.to_string())),
        _ => (authority.to_string(), None),
    };
    if host.is_empty() {
        return Err("URL host is empty".to_string());
    }

    let port: u32 = match port_str {
        Some(p) => p.parse().map_err(|_| "invalid port".to_string())?,
        None => if scheme == "https" { 443 } else { 80 },
    };
    if port == 0 || port > 65535 {
        return Err(format!("port {port} is out of range 1..=65535"));
    }

    Ok(ParsedUrl { scheme, host, port: port as u16, path })
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            headers: Vec::new(),
            content_type: "application/json".to_string(),
            timeout: Duration::from_secs(5),
            retries: 2,
        }
    }
}

pub struct HttpTransport {
    agent: ureq::Agent,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, String> {
        validate_url(&config.url)?;
        let agent_config = ureq::config::Config::builder().timeout_global(Some(config.timeout)).build();
        Ok(Self { agent: ureq::Agent::new_with_config(agent_config), config })
    }
}

impl Transport for HttpTransport {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut last_err = None;
        for attempt in 0..=self.config.retries {
            let mut req = self.agent.post(&self.config.url).header("Content-Type", &self.config.content_type);
            for (k, v) in &self.config.headers {
                req = req.header(k, v);
            }
            match req.send(bytes) {
                Ok(_) => return Ok(()),
                Err(e) => {
                    last_err = Some(e);
                    if attempt < self.config.retries {
                        std::thread::sleep(Duration::from_millis(50 * 2u64.pow(attempt)));
                    }
                }
            }
        }
        Err(io::Error::other(format!(
            "http sink failed after {} attempts: {}",
            self.config.retries + 1,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
