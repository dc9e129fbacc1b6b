//! Connection to the remote collector.
//!
//! [`ConnectionManager`] owns the single outbound TCP connection and runs the
//! establish sequence: resolve, socket open, connect, optional TLS handshake
//! with peer verification, and optional pre-shared-key announcement.
//! [`WriteSession`] sits on top of it and writes record payloads, classifying
//! failures as transient or fatal according to the destination's retry
//! policy. All I/O is blocking and runs on the caller's thread.

mod config;
mod error;
mod manager;
mod session;
mod tls;
mod transport;


pub use config::{ConfigError, DEFAULT_HOST, DEFAULT_PORT, Destination};
pub use error::{ConnectError, Severity, TlsError, WriteError};
pub use manager::{Attempt, ConnectionManager};
pub use session::{SendOutcome, WriteSession};
pub use tls::{TlsContext, ensure_tls_initialized, tls_initialized};
