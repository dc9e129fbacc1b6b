//! Helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

mod certificates;
mod collecting_diagnostics;
mod collector;

pub use certificates::TestCertificate;
pub use collecting_diagnostics::{CollectingDiagnostics, Report};
pub use collector::{CollectorServer, ServerEvent, ServerOptions, unused_port};
