//! Connection lifecycle: establish and teardown.

use std::sync::Arc;

use log::{debug, info};

use crate::diagnostics::Diagnostics;

use super::{
    config::Destination,
    error::{ConnectError, Severity},
    tls::TlsContext,
    transport::{self, ActiveConnection},
};

/// Whether an establish call is the first attempt or a reconnect triggered by
/// a write while disconnected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

/// Owns the transport to the collector.
///
/// The connection is either absent or fully established: connected, TLS
/// handshaken and verified when TLS is enabled, and key announced when a key
/// is configured. Partially built connections never leave [`establish`].
///
/// [`establish`]: ConnectionManager::establish
pub struct ConnectionManager {
    destination: Destination,
    diagnostics: Arc<dyn Diagnostics>,
    tls: Option<TlsContext>,
    connection: Option<ActiveConnection>,
}

impl ConnectionManager {
    /// Create a disconnected manager for `destination`.
    pub fn new(destination: Destination, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            destination,
            diagnostics,
            tls: None,
            connection: None,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Report whether a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut ActiveConnection> {
        self.connection.as_mut()
    }

    /// Establish the connection.
    ///
    /// Returns `false` only for fatal failures, which are reported as errors.
    /// With retry enabled a refused or unreachable connect leaves the
    /// connection absent and returns `true`; the failure is reported as a
    /// warning on [`Attempt::Initial`] and only logged at debug level on
    /// [`Attempt::Retry`].
    pub fn establish(&mut self, attempt: Attempt) -> bool {
        if self.connection.is_some() {
            return true;
        }
        match self.open() {
            Ok(connection) => {
                match connection.peer_addr() {
                    Ok(addr) => info!("connected to {} ({addr})", self.destination.host),
                    Err(_) => info!("connected to {}", self.destination.host),
                }
                self.connection = Some(connection);
                true
            }
            Err(err) => match err.severity(self.destination.retry) {
                Severity::Transient => {
                    if attempt == Attempt::Initial {
                        self.diagnostics.warning(&err.to_string());
                    } else {
                        debug!("reconnect failed: {err}");
                    }
                    true
                }
                Severity::Fatal => {
                    self.diagnostics.error(&err.to_string());
                    false
                }
            },
        }
    }

    /// Close the connection if one is open. Idempotent; always succeeds.
    pub fn teardown(&mut self) -> bool {
        if let Some(connection) = self.connection.take() {
            debug!("closing connection to {}", self.destination.host);
            connection.close();
        }
        true
    }

    fn open(&mut self) -> Result<ActiveConnection, ConnectError> {
        let addr = transport::resolve(&self.destination.host, self.destination.port)?;
        let socket = transport::open_socket(&addr)?;
        let stream = transport::connect(socket, &addr)?;

        let mut connection = if self.destination.tls {
            // Built on first use and kept across reconnects.
            let context = match self.tls.take() {
                Some(context) => context,
                None => TlsContext::new(self.destination.ca_path.as_deref())?,
            };
            let handshake = context.handshake(&self.destination.host, stream);
            self.tls = Some(context);
            ActiveConnection::Tls(Box::new(handshake?))
        } else {
            ActiveConnection::PlainTcp(stream)
        };

        if let Some(key) = &self.destination.key
            && let Err(err) = connection.send_key(key)
        {
            connection.close();
            return Err(err);
        }
        Ok(connection)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("destination", &self.destination)
            .field("connection", &self.connection)
            .finish()
    }
}
