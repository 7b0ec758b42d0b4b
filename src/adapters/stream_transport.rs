//! Stream socket transport adapter.
//!
//! Implements [`Listener`] and [`Connection`] over `std::net` TCP
//! sockets: a single-client server that advertises a service name and
//! identifier in its endpoint description.
//!
//! ## Connection model
//!
//! 1. `bind()` binds the listener in non-blocking mode.
//! 2. `poll_accept()` tries one accept; when nobody is waiting it sleeps
//!    one poll interval and returns `Ok(None)`.
//! 3. Accepted streams are blocking with a read timeout of one poll
//!    interval, so `poll_read()` returns `Ok(None)` on an idle peer.
//! 4. `close()` shuts the socket down; further calls fail with
//!    [`TransportError::Closed`].

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::error::TransportError;
use crate::transport::{Connection, Listener};

/// Service identity advertised alongside the bound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub name: String,
    pub uuid: String,
}

// ───────────────────────────────────────────────────────────────
// Listener
// ───────────────────────────────────────────────────────────────

pub struct StreamListener {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    poll_interval: Duration,
    service: ServiceRecord,
}

impl StreamListener {
    /// Bind and advertise. Pass port `0` to let the OS pick one (see
    /// [`local_addr`](Self::local_addr)).
    pub fn bind(
        addr: &str,
        poll_interval: Duration,
        service: ServiceRecord,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind(e.kind()))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| TransportError::Bind(e.kind()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| TransportError::Bind(e.kind()))?;

        info!(
            "Service \"{}\" ({}) advertised on {}",
            service.name, service.uuid, local_addr
        );
        Ok(Self {
            listener: Some(listener),
            local_addr,
            poll_interval,
            service,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }
}

impl Listener for StreamListener {
    type Conn = StreamConnection;

    fn poll_accept(&mut self) -> Result<Option<StreamConnection>, TransportError> {
        let listener = self.listener.as_ref().ok_or(TransportError::Closed)?;
        match listener.accept() {
            Ok((stream, peer)) => match StreamConnection::new(stream, peer, self.poll_interval) {
                Ok(conn) => Ok(Some(conn)),
                Err(e) => {
                    // Only this peer is affected; keep listening.
                    warn!("Dropping connection from {peer}: {e}");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(self.poll_interval);
                Ok(None)
            }
            Err(e) => {
                // Back off before the caller retries, e.g. on fd exhaustion.
                thread::sleep(self.poll_interval);
                Err(TransportError::Accept(e.kind()))
            }
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{} ({}) at {}",
            self.service.name, self.service.uuid, self.local_addr
        )
    }

    fn close(&mut self) {
        if self.listener.take().is_some() {
            info!("Listener on {} closed", self.local_addr);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection
// ───────────────────────────────────────────────────────────────

pub struct StreamConnection {
    stream: Option<TcpStream>,
    peer: SocketAddr,
}

impl StreamConnection {
    fn new(stream: TcpStream, peer: SocketAddr, poll_interval: Duration) -> Result<Self, TransportError> {
        let setup = stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_read_timeout(Some(poll_interval)))
            .and_then(|()| stream.set_nodelay(true));
        setup.map_err(|e| TransportError::Accept(e.kind()))?;
        Ok(Self {
            stream: Some(stream),
            peer,
        })
    }
}

impl Connection for StreamConnection {
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        match stream.read(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::Read(e.kind())),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| TransportError::Write(e.kind()))
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone.
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
