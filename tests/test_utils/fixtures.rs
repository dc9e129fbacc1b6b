//! Fixtures pairing a [`TcpLogWriter`] with the diagnostics collector it
//! reports to, so scenarios can assert both what reached the collector and
//! what the host was told.

use rstest::fixture;
use tcplog::{
    Field, TcpLogWriter, WriterInfo,
    record::schema,
    test_utils::{CollectingDiagnostics, CollectorServer},
};

/// Schema used by the scenario tests.
#[fixture]
pub fn fields() -> Vec<Field> {
    schema(["ts", "level", "msg"])
}

/// Return a writer reporting into a fresh diagnostics collector.
#[fixture]
pub fn writer_pair() -> (CollectingDiagnostics, TcpLogWriter) {
    let diagnostics = CollectingDiagnostics::new();
    let writer = TcpLogWriter::default().with_diagnostics(diagnostics.shared());
    (diagnostics, writer)
}

/// Writer configuration pointing at `server`.
pub fn info_for(server: &CollectorServer) -> WriterInfo {
    WriterInfo::new("conn")
        .with_config("host", server.host())
        .with_config("tcpport", server.port().to_string())
}
