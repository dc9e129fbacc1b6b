//! Failed establish attempts release every descriptor they open, however
//! many times the manager retries.
#![cfg(target_os = "linux")]

use std::fs;

use rstest::rstest;
use tcplog::{
    Attempt, ConnectionManager, Destination,
    test_utils::{CollectingDiagnostics, CollectorServer, ServerEvent, TestCertificate, unused_port},
};

const CYCLES: usize = 50;

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd")
        .expect("list open descriptors")
        .count()
}

/// Run `attempt` once to settle lazily opened process state, then check that
/// `CYCLES` further runs leave the descriptor count unchanged.
fn assert_released(label: &str, mut attempt: impl FnMut()) {
    attempt();
    let before = open_descriptors();
    for _ in 0..CYCLES {
        attempt();
    }
    assert_eq!(open_descriptors(), before, "{label} leaked descriptors");
}

// Kept as the only test in this binary so no other test opens descriptors
// while counting.
#[rstest]
fn failed_establish_releases_descriptors() {
    let diagnostics = CollectingDiagnostics::new();

    let refused = Destination::new("127.0.0.1", unused_port());
    let mut retrying = ConnectionManager::new(refused.clone().with_retry(true), diagnostics.shared());
    assert_released("refused connect with retry", || {
        assert!(retrying.establish(Attempt::Retry));
        assert!(!retrying.is_connected());
    });

    let mut failing = ConnectionManager::new(refused, diagnostics.shared());
    assert_released("refused connect without retry", || {
        assert!(!failing.establish(Attempt::Initial));
    });

    let served = TestCertificate::generate(&["127.0.0.1"]);
    let trusted = TestCertificate::generate(&["127.0.0.1"]);
    let server = CollectorServer::tls(served.acceptor());
    let ca = trusted.ca_file();
    let untrusted = Destination::new(server.host(), server.port())
        .with_tls(true)
        .with_ca_path(ca.path())
        .with_retry(true);
    let mut handshaking = ConnectionManager::new(untrusted, diagnostics.shared());
    assert_released("untrusted TLS handshake", || {
        assert!(!handshaking.establish(Attempt::Initial));
        assert!(matches!(
            server.wait_for(|e| matches!(e, ServerEvent::Closed(_))),
            ServerEvent::Closed(_)
        ));
    });

    assert!(diagnostics.warnings().is_empty());
    assert_eq!(diagnostics.errors().len(), 2 * (CYCLES + 1));
}
