//! Host entry points.
//!
//! The host framework drives a writer through [`LogWriterBackend`]: one
//! `initialize`, any number of `write_record` calls, and a final `shutdown`.
//! Calls are serialised by the host; every method takes `&mut self`.

use std::collections::BTreeMap;

use crate::record::{Field, FieldValue};

mod tcp;

pub use tcp::TcpLogWriter;

/// Per-writer information supplied by the host at initialisation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterInfo {
    /// Name of the log stream this writer ships.
    pub path: String,
    /// Writer configuration overrides. Empty values mean "use the default".
    pub config: BTreeMap<String, String>,
}

impl WriterInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config: BTreeMap::new(),
        }
    }

    /// Add or replace one configuration value.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Add every pair from `entries`, replacing existing keys.
    pub fn with_entries<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Details of a rotation request.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationInfo {
    pub rotated_path: String,
    /// Network time the rotated interval opened.
    pub open: f64,
    /// Network time the rotated interval closed.
    pub close: f64,
    /// The host is shutting down.
    pub terminating: bool,
}

/// Trait implemented by log writer backends.
///
/// Methods returning `bool` report `false` when the writer has failed and
/// should not be called again.
pub trait LogWriterBackend: Send {
    /// Configure the writer for a stream with the given schema and open the
    /// connection.
    fn initialize(&mut self, info: &WriterInfo, fields: &[Field]) -> bool;

    /// Ship one record. `values` follows the schema given to `initialize`.
    fn write_record(&mut self, values: &[FieldValue]) -> bool;

    /// Toggle buffering.
    fn set_buffering(&mut self, enabled: bool) -> bool;

    /// Flush any buffered output.
    fn flush(&mut self, network_time: f64) -> bool;

    /// Rotate the output. Returns `true` once rotation has finished.
    fn rotate(&mut self, rotation: &RotationInfo) -> bool;

    /// Periodic liveness notification.
    fn heartbeat(&mut self, network_time: f64, current_time: f64) -> bool;

    /// Release the connection. Safe to call more than once.
    fn shutdown(&mut self, network_time: f64) -> bool;
}
