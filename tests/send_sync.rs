//! Send/Sync guarantees for core types.

use rstest::rstest;
use static_assertions::assert_impl_all;
use tcplog::{
    ConnectionManager, Destination, JsonFormatter, LogDiagnostics, SharedFormatter, TcpLogWriter,
    TlsContext, WriteSession, test_utils::CollectingDiagnostics,
};

#[rstest]
fn writer_side_is_send() {
    assert_impl_all!(TcpLogWriter: Send);
    assert_impl_all!(ConnectionManager: Send);
    assert_impl_all!(WriteSession: Send);
    assert_impl_all!(TlsContext: Send, Sync);
}

#[rstest]
fn shared_components_are_send_sync() {
    assert_impl_all!(Destination: Send, Sync);
    assert_impl_all!(JsonFormatter: Send, Sync);
    assert_impl_all!(SharedFormatter: Send, Sync);
    assert_impl_all!(LogDiagnostics: Send, Sync);
    assert_impl_all!(CollectingDiagnostics: Send, Sync);
}
