//! Outbound application events.
//!
//! The dispatcher and the [`ServerContext`](super::service::ServerContext)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide where they go (log file, console).

use std::path::PathBuf;

use crate::model::Level;

/// Structured events emitted by the server core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The listener is waiting for a peer.
    Listening { endpoint: String },

    /// A peer connected.
    ConnectionAccepted { peer: String },

    /// A command payload was read from the peer.
    CommandReceived(String),

    /// A response payload was written to the peer.
    ResponseSent(String),

    /// The capture pipeline stored a new normalized artifact.
    ArtifactCaptured { id: String, path: PathBuf },

    /// An artifact was published and a reference obtained.
    ArtifactPublished { id: String, url: String },

    /// The classification engine picked a level.
    Classified { level: Level, score: f64 },

    /// A command handler failed; the peer gets an error payload.
    CommandFailed { command: String, reason: String },

    /// The connection ended (peer closed, transport error, or shutdown).
    ConnectionClosed { peer: String, reason: String },

    /// The loop is tearing down after an interrupt.
    ShuttingDown,
}
