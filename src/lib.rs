//! Log writer that ships structured records to a remote collector over TCP,
//! optionally wrapped in TLS.
//!
//! The host framework drives a [`TcpLogWriter`] through the
//! [`LogWriterBackend`] trait. Each record is rendered by a
//! [`RecordFormatter`] (JSON by default), terminated with a newline, and
//! written to a single long-lived connection owned by a
//! [`ConnectionManager`]. Failures are reported through [`Diagnostics`].

pub mod connection;
pub mod diagnostics;
pub mod file_config;
pub mod formatter;
pub mod record;
pub mod writer;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use connection::{
    Attempt, ConfigError, ConnectError, ConnectionManager, DEFAULT_HOST, DEFAULT_PORT,
    Destination, SendOutcome, Severity, TlsContext, TlsError, WriteError, WriteSession,
    ensure_tls_initialized,
};
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use file_config::load_overrides;
pub use formatter::{FormatError, JsonFormatter, RecordFormatter, SharedFormatter, TimestampFormat};
pub use record::{Field, FieldValue};
pub use writer::{LogWriterBackend, RotationInfo, TcpLogWriter, WriterInfo};
