//! Loopback collector servers that record what the writer sends.
//!
//! Every accepted connection is numbered from zero and served on its own
//! thread. Received lines are reported through [`ServerEvent`]s so tests can
//! assert which connection carried which bytes.

use std::{
    io::{BufRead, BufReader, Read},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::{Duration, Instant},
};

use native_tls::TlsAcceptor;
use socket2::SockRef;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Return a loopback port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    listener.local_addr().expect("listener has address").port()
}

/// Something observed by the collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    Connected(usize),
    /// One newline-terminated line, without the newline.
    Line(usize, String),
    HandshakeFailed(usize),
    Closed(usize),
}

/// Collector behaviour.
#[derive(Clone, Default)]
pub struct ServerOptions {
    /// Serve connections over TLS with this acceptor.
    pub tls: Option<TlsAcceptor>,
    /// Reset the first accepted connection (`SO_LINGER` of zero) without
    /// reading from it.
    pub reset_first: bool,
}

/// A collector listening on `127.0.0.1`.
pub struct CollectorServer {
    addr: SocketAddr,
    events: Receiver<ServerEvent>,
}

impl CollectorServer {
    /// Plain TCP collector on an ephemeral port.
    pub fn plain() -> Self {
        Self::spawn(ServerOptions::default())
    }

    /// TLS collector on an ephemeral port.
    pub fn tls(acceptor: TlsAcceptor) -> Self {
        Self::spawn(ServerOptions {
            tls: Some(acceptor),
            ..ServerOptions::default()
        })
    }

    /// Collector on an ephemeral port with the given behaviour.
    pub fn spawn(options: ServerOptions) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        Self::on_listener(listener, options)
    }

    /// Collector accepting from an existing listener.
    pub fn on_listener(listener: TcpListener, options: ServerOptions) -> Self {
        let addr = listener.local_addr().expect("listener has address");
        let (tx, events) = mpsc::channel();
        thread::spawn(move || accept_loop(listener, options, tx));
        Self { addr, events }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Wait for the next event.
    pub fn next_event(&self) -> ServerEvent {
        self.events
            .recv_timeout(EVENT_TIMEOUT)
            .expect("collector event within timeout")
    }

    /// Wait for the next received line, skipping other events.
    pub fn next_line(&self) -> (usize, String) {
        loop {
            if let ServerEvent::Line(conn, line) = self.next_event() {
                return (conn, line);
            }
        }
    }

    /// Wait for an event matching `predicate`, skipping others.
    pub fn wait_for(&self, predicate: impl Fn(&ServerEvent) -> bool) -> ServerEvent {
        loop {
            let event = self.next_event();
            if predicate(&event) {
                return event;
            }
        }
    }

    /// Collect every event observed within `window`.
    pub fn drain_for(&self, window: Duration) -> Vec<ServerEvent> {
        let deadline = Instant::now() + window;
        let mut seen = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => seen.push(event),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return seen,
            }
        }
    }
}

fn accept_loop(listener: TcpListener, options: ServerOptions, tx: Sender<ServerEvent>) {
    for (conn, stream) in listener.incoming().enumerate() {
        let Ok(stream) = stream else {
            continue;
        };
        if tx.send(ServerEvent::Connected(conn)).is_err() {
            return;
        }
        if options.reset_first && conn == 0 {
            let _ = SockRef::from(&stream).set_linger(Some(Duration::ZERO));
            drop(stream);
            let _ = tx.send(ServerEvent::Closed(conn));
            continue;
        }
        let tx = tx.clone();
        let tls = options.tls.clone();
        thread::spawn(move || serve(conn, stream, tls, tx));
    }
}

fn serve(conn: usize, stream: TcpStream, tls: Option<TlsAcceptor>, tx: Sender<ServerEvent>) {
    match tls {
        Some(acceptor) => match acceptor.accept(stream) {
            Ok(stream) => read_lines(conn, stream, &tx),
            Err(_) => {
                let _ = tx.send(ServerEvent::HandshakeFailed(conn));
            }
        },
        None => read_lines(conn, stream, &tx),
    }
    let _ = tx.send(ServerEvent::Closed(conn));
}

fn read_lines<R: Read>(conn: usize, stream: R, tx: &Sender<ServerEvent>) {
    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else {
            return;
        };
        if tx.send(ServerEvent::Line(conn, line)).is_err() {
            return;
        }
    }
}
