//! Destination configuration consumed by the connection lifecycle.
//!
//! A [`Destination`] starts from compiled-in defaults and is then layered with
//! host-supplied overrides. Empty override values leave the default in place.
//! Once handed to a [`ConnectionManager`](super::ConnectionManager) the
//! destination is never mutated.

use std::{collections::BTreeMap, fmt, path::PathBuf};

use thiserror::Error;

/// Default collector hostname.
pub const DEFAULT_HOST: &str = "localhost";
/// Default collector TCP port.
pub const DEFAULT_PORT: u16 = 9020;

/// Errors raised while building configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `tcpport` value is not a port in `1..=65535`.
    #[error("invalid tcpport {0:?}: expected an integer between 1 and 65535")]
    InvalidPort(String),
    /// The `timestamps` value names no known timestamp style.
    #[error("invalid timestamps {0:?}: expected epoch, millis or iso8601")]
    InvalidTimestamps(String),
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A configuration file is not valid INI.
    #[error("{} is invalid: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    /// The requested section is absent from a configuration file.
    #[error("{} has no section [{section}]", .path.display())]
    MissingSection { path: PathBuf, section: String },
}

/// Remote collector and connection policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Destination {
    /// Hostname or IP address of the collector.
    pub host: String,
    /// TCP port of the collector.
    pub port: u16,
    /// Treat connect and write failures as transient.
    pub retry: bool,
    /// Wrap the connection in TLS.
    pub tls: bool,
    /// CA bundle used to verify the collector. `None` uses the system roots.
    pub ca_path: Option<PathBuf>,
    /// Token sent once per connection before any record.
    pub key: Option<String>,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            retry: false,
            tls: false,
            ca_path: None,
            key: None,
        }
    }
}

impl Destination {
    /// Target the given host and port with default policy.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Enable or disable retry semantics.
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable TLS.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Verify the collector against the CA bundle at `path`.
    ///
    /// An empty path selects the system trust store.
    pub fn with_ca_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.ca_path = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// Announce `key` on every fresh connection. An empty key disables the
    /// key phase.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = (!key.is_empty()).then_some(key);
        self
    }

    /// Layer host-supplied overrides over this destination.
    ///
    /// Recognised keys are `host`, `tcpport`, `retry`, `tls`, `cert` and
    /// `key`. Flags are enabled only by the exact value `"T"`. Unknown keys
    /// are ignored so that formatter options can share the same map.
    pub fn with_overrides(
        mut self,
        config: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            config
                .get(name)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
        };

        if let Some(host) = value("host") {
            self.host = host.to_owned();
        }
        if let Some(port) = value("tcpport") {
            self.port = parse_port(port)?;
        }
        if let Some(retry) = value("retry") {
            self.retry = retry == "T";
        }
        if let Some(tls) = value("tls") {
            self.tls = tls == "T";
        }
        if let Some(cert) = value("cert") {
            self.ca_path = Some(PathBuf::from(cert));
        }
        if let Some(key) = value("key") {
            self.key = Some(key.to_owned());
        }
        Ok(self)
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_owned())),
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("retry", &self.retry)
            .field("tls", &self.tls)
            .field("ca_path", &self.ca_path)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
