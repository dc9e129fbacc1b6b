//! A diagnostics reporter that accumulates reports in memory for test
//! assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::diagnostics::Diagnostics;

/// One diagnostic report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    Warning(String),
    Error(String),
}

/// Reporter that stores every report it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingDiagnostics {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl CollectingDiagnostics {
    /// Create a new empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reporter as a shared trait object. Clones share storage.
    pub fn shared(&self) -> Arc<dyn Diagnostics> {
        Arc::new(self.clone())
    }

    /// Return a snapshot of all reports received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    /// Messages of all warnings received so far.
    pub fn warnings(&self) -> Vec<String> {
        self.reports
            .lock()
            .iter()
            .filter_map(|report| match report {
                Report::Warning(msg) => Some(msg.clone()),
                Report::Error(_) => None,
            })
            .collect()
    }

    /// Messages of all errors received so far.
    pub fn errors(&self) -> Vec<String> {
        self.reports
            .lock()
            .iter()
            .filter_map(|report| match report {
                Report::Error(msg) => Some(msg.clone()),
                Report::Warning(_) => None,
            })
            .collect()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warning(&self, message: &str) {
        self.reports.lock().push(Report::Warning(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.reports.lock().push(Report::Error(message.to_owned()));
    }
}
