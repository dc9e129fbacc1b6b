//! Transport primitives for the connection manager.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
};

use native_tls::TlsStream;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::error::{ConnectError, WriteError};

/// Resolve `host:port`, keeping the first candidate address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConnectError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ConnectError::Resolve {
            host: host.to_owned(),
            source,
        })?;
    addrs.next().ok_or_else(|| ConnectError::NoAddress {
        host: host.to_owned(),
    })
}

/// Open a blocking stream socket for the address family of `addr`.
pub fn open_socket(addr: &SocketAddr) -> Result<Socket, ConnectError> {
    Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(ConnectError::Socket)
}

/// Connect `socket` to `addr`. The socket is closed on failure.
pub fn connect(socket: Socket, addr: &SocketAddr) -> Result<TcpStream, ConnectError> {
    socket
        .connect(&SockAddr::from(*addr))
        .map_err(|source| ConnectError::Connect {
            addr: *addr,
            source,
        })?;
    Ok(socket.into())
}

/// Active socket connection state.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl ActiveConnection {
    /// Address of the collector this connection talks to.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.peer_addr(),
            ActiveConnection::Tls(stream) => stream.get_ref().peer_addr(),
        }
    }

    /// Write a full buffer to the socket and flush it.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), WriteError> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream
                .write_all(buf)
                .and_then(|()| stream.flush())
                .map_err(WriteError::Plain),
            ActiveConnection::Tls(stream) => stream
                .write_all(buf)
                .and_then(|()| stream.flush())
                .map_err(WriteError::Tls),
        }
    }

    /// Send the pre-shared key followed by its newline delimiter.
    pub fn send_key(&mut self, key: &str) -> Result<(), ConnectError> {
        let mut line = Vec::with_capacity(key.len() + 1);
        line.extend_from_slice(key.as_bytes());
        line.push(b'\n');
        self.write_all(&line).map_err(|err| match err {
            WriteError::Plain(source) | WriteError::Tls(source) => ConnectError::Key(source),
        })
    }

    /// Shut the connection down. TLS sessions send close-notify first.
    /// Errors are ignored; the descriptors are released when `self` drops.
    pub fn close(self) {
        match self {
            ActiveConnection::PlainTcp(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            ActiveConnection::Tls(mut stream) => {
                let _ = stream.shutdown();
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
        }
    }
}

impl std::fmt::Debug for ActiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ActiveConnection::PlainTcp(_) => "PlainTcp",
            ActiveConnection::Tls(_) => "Tls",
        };
        f.debug_tuple(kind).field(&self.peer_addr().ok()).finish()
    }
}
