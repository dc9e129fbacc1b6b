//! Failure taxonomy for connection establishment and record writes.
//!
//! The `Display` text of each variant is the message handed to the
//! diagnostics reporter.

use std::{io, net::SocketAddr, path::PathBuf};

use thiserror::Error;

/// How a failure affects the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// The connection stays absent; a later write may reconnect.
    Transient,
    /// The writer must be disabled.
    Fatal,
}

/// Failures raised while setting up TLS on a connected socket.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Error initialising TLS library: {0}")]
    Init(#[source] native_tls::Error),
    #[error("Error using TLS certificate {}: {source}", .path.display())]
    CertificateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error using TLS certificate {}: {source}", .path.display())]
    Certificate {
        path: PathBuf,
        #[source]
        source: native_tls::Error,
    },
    #[error("Error using TLS certificate {}: no certificates found", .path.display())]
    EmptyBundle { path: PathBuf },
    #[error("Error setting up TLS context: {0}")]
    Context(#[source] native_tls::Error),
    /// Handshake failed. Chain and hostname verification run inside the
    /// handshake, so verification failures land here with the backend's
    /// description of the failed check.
    #[error("Error completing TLS handshake: {0}")]
    Handshake(#[source] native_tls::Error),
    #[error("Error completing TLS handshake: handshake interrupted")]
    Interrupted,
    #[error("Error getting TLS certificate: {0}")]
    PeerCertificate(#[source] native_tls::Error),
    #[error("Error getting TLS certificate")]
    MissingPeerCertificate,
}

/// Failures raised while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Error resolving {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("Error resolving {host}: no addresses found")]
    NoAddress { host: String },
    #[error("Error opening socket: {0}")]
    Socket(#[source] io::Error),
    #[error("Error connecting to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error("Error sending key: {0}")]
    Key(#[source] io::Error),
}

impl ConnectError {
    /// Classify the failure under the given retry policy.
    ///
    /// Only connect failures are ever transient. An unresolvable host, a
    /// socket that cannot be opened, TLS problems and key failures will not
    /// fix themselves by reconnecting with the same parameters.
    pub fn severity(&self, retry: bool) -> Severity {
        match self {
            ConnectError::Connect { .. } if retry => Severity::Transient,
            _ => Severity::Fatal,
        }
    }
}

/// Failures raised while writing a record on an established connection.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Error sending data: {0}")]
    Plain(#[source] io::Error),
    #[error("Error sending TLS data: {0}")]
    Tls(#[source] io::Error),
}
