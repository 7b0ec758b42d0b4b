//! Transport abstraction: a listener that hands out one stream
//! connection at a time.
//!
//! Both sides poll. `poll_accept` and `poll_read` return `Ok(None)` when
//! nothing arrived within the adapter's poll slice, so the dispatcher can
//! check the shutdown flag between waits. Concrete implementations live
//! in [`adapters`](crate::adapters).

use crate::error::TransportError;

/// Byte-oriented, connection-oriented channel to one peer.
pub trait Connection {
    /// Read one payload into `buf`.
    ///
    /// `Ok(Some(0))` means the peer closed the connection; `Ok(None)`
    /// means no data arrived within the poll slice.
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError>;

    /// Write the whole payload.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Human-readable peer address for the trace log.
    fn peer(&self) -> String;

    /// Tear the connection down. Idempotent.
    fn close(&mut self);
}

/// Advertised endpoint accepting stream connections.
pub trait Listener {
    type Conn: Connection;

    /// Accept a pending peer, or `Ok(None)` if none arrived in time.
    fn poll_accept(&mut self) -> Result<Option<Self::Conn>, TransportError>;

    /// Human-readable description of the advertised endpoint.
    fn endpoint(&self) -> String;

    /// Stop accepting. Later `poll_accept` calls fail with
    /// [`TransportError::Closed`].
    fn close(&mut self);
}
