//! TLS primitives for the connection manager.
//!
//! Holds the process-wide initialisation guard, the trust configuration that
//! is reused across reconnects, and the handshake plus peer certificate check.

use std::{fs, net::TcpStream, path::Path};

use log::debug;
use native_tls::{Certificate, HandshakeError, TlsConnector, TlsStream};
use once_cell::sync::OnceCell;

use super::error::TlsError;

static TLS_BACKEND: OnceCell<()> = OnceCell::new();

/// Initialise the TLS backend once per process.
///
/// Safe to call any number of times; only the first successful call does
/// work. A failed initialisation is not cached so a later call retries it.
pub fn ensure_tls_initialized() -> Result<(), TlsError> {
    TLS_BACKEND
        .get_or_try_init(|| {
            TlsConnector::new().map_err(TlsError::Init)?;
            debug!("TLS backend initialised");
            Ok(())
        })
        .map(|_| ())
}

/// Report whether [`ensure_tls_initialized`] has completed.
pub fn tls_initialized() -> bool {
    TLS_BACKEND.get().is_some()
}

/// Client trust configuration.
pub struct TlsContext {
    connector: TlsConnector,
}

impl TlsContext {
    /// Build a context trusting the CA bundle at `ca_path`, or the system
    /// roots when no bundle is given.
    pub fn new(ca_path: Option<&Path>) -> Result<Self, TlsError> {
        ensure_tls_initialized()?;
        let mut builder = TlsConnector::builder();
        if let Some(path) = ca_path {
            for cert in load_bundle(path)? {
                builder.add_root_certificate(cert);
            }
            builder.disable_built_in_roots(true);
        }
        let connector = builder.build().map_err(TlsError::Context)?;
        Ok(Self { connector })
    }

    /// Run the client handshake over `stream`, presenting `domain` for SNI
    /// and hostname verification, then require a peer certificate.
    pub fn handshake(
        &self,
        domain: &str,
        stream: TcpStream,
    ) -> Result<TlsStream<TcpStream>, TlsError> {
        let mut stream = match self.connector.connect(domain, stream) {
            Ok(stream) => stream,
            Err(HandshakeError::Failure(err)) => return Err(TlsError::Handshake(err)),
            Err(HandshakeError::WouldBlock(_)) => return Err(TlsError::Interrupted),
        };
        let peer = stream.peer_certificate();
        match peer {
            Ok(Some(_)) => Ok(stream),
            Ok(None) => {
                let _ = stream.shutdown();
                Err(TlsError::MissingPeerCertificate)
            }
            Err(err) => {
                let _ = stream.shutdown();
                Err(TlsError::PeerCertificate(err))
            }
        }
    }
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TlsContext")
    }
}

/// Load every certificate from a PEM bundle.
fn load_bundle(path: &Path) -> Result<Vec<Certificate>, TlsError> {
    let bytes = fs::read(path).map_err(|source| TlsError::CertificateFile {
        path: path.to_owned(),
        source,
    })?;
    let certs = Certificate::stack_from_pem(&bytes).map_err(|source| TlsError::Certificate {
        path: path.to_owned(),
        source,
    })?;
    if certs.is_empty() {
        return Err(TlsError::EmptyBundle {
            path: path.to_owned(),
        });
    }
    Ok(certs)
}
