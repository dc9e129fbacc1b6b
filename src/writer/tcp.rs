//! Writer shipping records to a TCP collector.

use std::sync::Arc;

use log::debug;

use crate::{
    connection::{
        Attempt, ConfigError, ConnectionManager, Destination, SendOutcome, WriteSession,
    },
    diagnostics::{Diagnostics, LogDiagnostics},
    formatter::{JsonFormatter, RecordFormatter, SharedFormatter, TimestampFormat},
    record::{Field, FieldValue},
};

use super::{LogWriterBackend, RotationInfo, WriterInfo};

/// Configuration key selecting the JSON timestamp style.
const TIMESTAMPS_KEY: &str = "timestamps";

struct ActiveStream {
    session: WriteSession,
    formatter: SharedFormatter,
    fields: Vec<Field>,
}

/// Log writer backend that formats each record, appends a newline and sends
/// it over a single TCP or TLS connection.
pub struct TcpLogWriter {
    defaults: Destination,
    diagnostics: Arc<dyn Diagnostics>,
    formatter: Option<SharedFormatter>,
    active: Option<ActiveStream>,
    buffer: Vec<u8>,
}

impl TcpLogWriter {
    /// Create a writer whose configuration overrides are layered over
    /// `defaults`. Diagnostics go to the `log` facade.
    pub fn new(defaults: Destination) -> Self {
        Self {
            defaults,
            diagnostics: Arc::new(LogDiagnostics),
            formatter: None,
            active: None,
            buffer: Vec::with_capacity(512),
        }
    }

    /// Report warnings and errors to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Format records with `formatter` instead of the JSON formatter.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: RecordFormatter + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    /// Destination in use since the last successful initialisation.
    pub fn destination(&self) -> Option<&Destination> {
        self.active
            .as_ref()
            .map(|active| active.session.manager().destination())
    }

    /// Report whether the writer currently holds a connection.
    pub fn is_connected(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.session.manager().is_connected())
    }

    fn formatter_for(&self, info: &WriterInfo) -> Result<SharedFormatter, ConfigError> {
        if let Some(formatter) = &self.formatter {
            return Ok(formatter.clone());
        }
        let timestamps = match info.config.get(TIMESTAMPS_KEY).filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse::<TimestampFormat>()
                .map_err(|()| ConfigError::InvalidTimestamps(value.clone()))?,
            None => TimestampFormat::default(),
        };
        Ok(SharedFormatter::new(JsonFormatter::new(timestamps)))
    }

    fn configure(&self, info: &WriterInfo) -> Result<(Destination, SharedFormatter), ConfigError> {
        let destination = self.defaults.clone().with_overrides(&info.config)?;
        let formatter = self.formatter_for(info)?;
        Ok((destination, formatter))
    }
}

impl Default for TcpLogWriter {
    fn default() -> Self {
        Self::new(Destination::default())
    }
}

impl LogWriterBackend for TcpLogWriter {
    fn initialize(&mut self, info: &WriterInfo, fields: &[Field]) -> bool {
        if let Some(mut previous) = self.active.take() {
            previous.session.close();
        }
        let (destination, formatter) = match self.configure(info) {
            Ok(configured) => configured,
            Err(err) => {
                self.diagnostics.error(&err.to_string());
                return false;
            }
        };
        debug!(
            "initialising writer for {:?} to {}:{}",
            info.path, destination.host, destination.port
        );
        let mut manager = ConnectionManager::new(destination, Arc::clone(&self.diagnostics));
        if !manager.establish(Attempt::Initial) {
            return false;
        }
        self.active = Some(ActiveStream {
            session: WriteSession::new(manager),
            formatter,
            fields: fields.to_vec(),
        });
        true
    }

    fn write_record(&mut self, values: &[FieldValue]) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        self.buffer.clear();
        if let Err(err) = active
            .formatter
            .describe(&active.fields, values, &mut self.buffer)
        {
            self.diagnostics
                .warning(&format!("Error formatting record: {err}"));
            return true;
        }
        self.buffer.push(b'\n');
        match active.session.send(&self.buffer) {
            SendOutcome::Delivered => true,
            SendOutcome::SinkDisabled => false,
        }
    }

    fn set_buffering(&mut self, _enabled: bool) -> bool {
        true
    }

    fn flush(&mut self, _network_time: f64) -> bool {
        true
    }

    fn rotate(&mut self, _rotation: &RotationInfo) -> bool {
        true
    }

    fn heartbeat(&mut self, _network_time: f64, _current_time: f64) -> bool {
        true
    }

    fn shutdown(&mut self, _network_time: f64) -> bool {
        match self.active.take() {
            Some(mut active) => active.session.close(),
            None => true,
        }
    }
}

impl std::fmt::Debug for TcpLogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpLogWriter")
            .field("defaults", &self.defaults)
            .field("destination", &self.destination())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{
        record::schema,
        test_utils::{CollectingDiagnostics, CollectorServer, ServerEvent, unused_port},
    };

    #[fixture]
    fn diagnostics() -> CollectingDiagnostics {
        CollectingDiagnostics::new()
    }

    fn writer(diagnostics: &CollectingDiagnostics) -> TcpLogWriter {
        TcpLogWriter::default().with_diagnostics(diagnostics.shared())
    }

    fn info_for(server: &CollectorServer) -> WriterInfo {
        WriterInfo::new("conn")
            .with_config("host", server.host())
            .with_config("tcpport", server.port().to_string())
    }

    #[test]
    fn writer_is_send() {
        assert_impl_all!(TcpLogWriter: Send);
    }

    #[rstest]
    fn write_before_initialize_fails(diagnostics: CollectingDiagnostics) {
        let mut writer = writer(&diagnostics);
        assert!(!writer.write_record(&[FieldValue::Unset]));
        assert!(diagnostics.reports().is_empty());
    }

    #[rstest]
    fn shutdown_is_safe_without_initialize(diagnostics: CollectingDiagnostics) {
        let mut writer = writer(&diagnostics);
        assert!(writer.shutdown(0.0));
        assert!(writer.shutdown(0.0));
    }

    #[rstest]
    fn invalid_port_fails_initialisation(diagnostics: CollectingDiagnostics) {
        let mut writer = writer(&diagnostics);
        let info = WriterInfo::new("conn").with_config("tcpport", "not-a-port");
        assert!(!writer.initialize(&info, &schema(["msg"])));
        let errors = diagnostics.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("tcpport"));
        assert!(writer.destination().is_none());
    }

    #[rstest]
    fn invalid_timestamps_fail_initialisation(diagnostics: CollectingDiagnostics) {
        let mut writer = writer(&diagnostics);
        let info = WriterInfo::new("conn").with_config(TIMESTAMPS_KEY, "fortnights");
        assert!(!writer.initialize(&info, &schema(["ts"])));
        assert!(diagnostics.errors()[0].contains("fortnights"));
    }

    #[rstest]
    fn stubs_report_success(diagnostics: CollectingDiagnostics) {
        let server = CollectorServer::plain();
        let mut writer = writer(&diagnostics);
        assert!(writer.initialize(&info_for(&server), &schema(["msg"])));
        assert!(writer.set_buffering(false));
        assert!(writer.flush(1.0));
        assert!(writer.heartbeat(1.0, 2.0));
        assert!(writer.rotate(&RotationInfo {
            rotated_path: "conn-rotated".into(),
            open: 0.0,
            close: 1.0,
            terminating: false,
        }));
        assert!(writer.is_connected());
        assert!(diagnostics.reports().is_empty());
    }

    #[rstest]
    fn format_errors_skip_the_record(diagnostics: CollectingDiagnostics) {
        let server = CollectorServer::plain();
        let mut writer = writer(&diagnostics);
        assert!(writer.initialize(&info_for(&server), &schema(["a", "b"])));
        assert!(writer.write_record(&[FieldValue::Count(1)]));
        assert!(writer.write_record(&[FieldValue::Count(1), FieldValue::Count(2)]));
        assert_eq!(server.next_line(), (0, r#"{"a":1,"b":2}"#.to_owned()));
        let warnings = diagnostics.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Error formatting record"));
    }

    #[rstest]
    fn timestamps_key_selects_style(diagnostics: CollectingDiagnostics) {
        let server = CollectorServer::plain();
        let mut writer = writer(&diagnostics);
        let info = info_for(&server).with_config(TIMESTAMPS_KEY, "millis");
        assert!(writer.initialize(&info, &schema(["ts"])));
        let ts = std::time::UNIX_EPOCH + std::time::Duration::from_millis(1_500);
        assert!(writer.write_record(&[FieldValue::Time(ts)]));
        assert_eq!(server.next_line().1, r#"{"ts":1500}"#);
    }

    #[rstest]
    fn reinitialising_replaces_the_connection(diagnostics: CollectingDiagnostics) {
        let first = CollectorServer::plain();
        let second = CollectorServer::plain();
        let mut writer = writer(&diagnostics);
        assert!(writer.initialize(&info_for(&first), &schema(["msg"])));
        assert!(writer.initialize(&info_for(&second), &schema(["msg"])));
        assert_eq!(
            first.wait_for(|e| matches!(e, ServerEvent::Closed(_))),
            ServerEvent::Closed(0)
        );
        assert!(writer.write_record(&[FieldValue::from("hello")]));
        assert_eq!(second.next_line(), (0, r#"{"msg":"hello"}"#.to_owned()));
    }

    #[rstest]
    fn shutdown_twice_after_connect(diagnostics: CollectingDiagnostics) {
        let server = CollectorServer::plain();
        let mut writer = writer(&diagnostics);
        assert!(writer.initialize(&info_for(&server), &schema(["msg"])));
        assert!(writer.shutdown(0.0));
        assert!(writer.shutdown(0.0));
        assert!(!writer.is_connected());
        assert!(!writer.write_record(&[FieldValue::from("late")]));
    }

    #[rstest]
    fn retry_without_collector_initialises(diagnostics: CollectingDiagnostics) {
        let mut writer = writer(&diagnostics);
        let info = WriterInfo::new("conn")
            .with_config("host", "127.0.0.1")
            .with_config("tcpport", unused_port().to_string())
            .with_config("retry", "T");
        assert!(writer.initialize(&info, &schema(["msg"])));
        assert!(!writer.is_connected());
        assert_eq!(diagnostics.warnings().len(), 1);
        assert!(diagnostics.errors().is_empty());
    }
}
