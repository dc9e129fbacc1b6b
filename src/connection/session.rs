//! Steady-state write path.

use log::debug;

use super::manager::{Attempt, ConnectionManager};

/// Result of handing one record payload to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The payload was written, or dropped while the connection recovers.
    Delivered,
    /// The writer has failed; no further records should be sent.
    SinkDisabled,
}

/// Writes record payloads over the managed connection and drives reconnects
/// when the retry policy allows them.
#[derive(Debug)]
pub struct WriteSession {
    manager: ConnectionManager,
}

impl WriteSession {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }

    /// Write one delimited record payload.
    ///
    /// Records are never queued. While disconnected with retry enabled the
    /// session attempts one reconnect and drops the record if that fails. A
    /// write failure with retry enabled runs a full teardown and reconnect
    /// cycle and drops the record.
    pub fn send(&mut self, payload: &[u8]) -> SendOutcome {
        let retry = self.manager.destination().retry;

        if !self.manager.is_connected() {
            if !retry {
                return SendOutcome::SinkDisabled;
            }
            self.manager.establish(Attempt::Retry);
            if !self.manager.is_connected() {
                debug!("dropping record; no connection to collector");
                return SendOutcome::Delivered;
            }
        }

        let Some(connection) = self.manager.connection_mut() else {
            return SendOutcome::Delivered;
        };
        let Err(err) = connection.write_all(payload) else {
            return SendOutcome::Delivered;
        };

        if retry {
            debug!("write failed, reconnecting: {err}");
            self.manager.teardown();
            self.manager.establish(Attempt::Initial);
            SendOutcome::Delivered
        } else {
            self.manager.diagnostics().error(&err.to_string());
            self.manager.teardown();
            SendOutcome::SinkDisabled
        }
    }

    /// Close the connection. See [`ConnectionManager::teardown`].
    pub fn close(&mut self) -> bool {
        self.manager.teardown()
    }
}
