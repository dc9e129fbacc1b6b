//! Diagnostics reporting for the writer.
//!
//! Warnings are informational. An error tells the host that the writer should
//! be considered permanently failed.

/// Sink for warnings and errors raised by the connection lifecycle.
pub trait Diagnostics: Send + Sync {
    /// Report a condition the writer recovered from.
    fn warning(&self, message: &str);
    /// Report a condition that disables the writer.
    fn error(&self, message: &str);
}

/// Reporter forwarding diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warning(&self, message: &str) {
        log::warn!(target: "tcplog", "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: "tcplog", "{message}");
    }
}
