//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering each application event as a
//! one-line trace through the `log` facade. A metrics or remote sink
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Listening { endpoint } => {
                info!("CONN | waiting for connection on {endpoint}");
            }
            AppEvent::ConnectionAccepted { peer } => {
                info!("CONN | accepted connection from {peer}");
            }
            AppEvent::CommandReceived(cmd) => {
                info!("CMD | received [{cmd}]");
            }
            AppEvent::ResponseSent(payload) => {
                info!("RESP | sent [{payload}]");
            }
            AppEvent::ArtifactCaptured { id, path } => {
                info!("CAPTURE | id={id} path={}", path.display());
            }
            AppEvent::ArtifactPublished { id, url } => {
                info!("PUBLISH | id={id} url={url}");
            }
            AppEvent::Classified { level, score } => {
                info!("CLASSIFY | level={level} ssim={score:.6}");
            }
            AppEvent::CommandFailed { command, reason } => {
                warn!("CMD | [{command}] failed: {reason}");
            }
            AppEvent::ConnectionClosed { peer, reason } => {
                info!("CONN | closed {peer} ({reason})");
            }
            AppEvent::ShuttingDown => {
                info!("SHUTDOWN | listener closed");
            }
        }
    }
}
