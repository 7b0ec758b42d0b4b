//! Server context — the hexagonal core.
//!
//! [`ServerContext`] owns the capture pipeline, the classification
//! engine, the publish collaborator and the session state. It is passed
//! explicitly to the dispatcher; there is no process-wide mutable state.
//!
//! ```text
//!  CameraPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │      ServerContext        │
//! PublishPort ◀── │ capture · SSIM · session  │
//!                 └──────────────────────────┘
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::capture::CapturePipeline;
use crate::classify::ClassificationEngine;
use crate::error::{DispatchError, NoArtifactError};
use crate::model::{CapturedArtifact, ExternalReference};
use crate::session::SessionState;

use super::commands::{Command, Response};
use super::events::AppEvent;
use super::ports::{CameraPort, EventSink, PublishPort};

/// Everything a command handler may touch.
pub struct ServerContext<C, P> {
    capture: CapturePipeline<C>,
    classifier: ClassificationEngine,
    publisher: P,
    content_type: String,
    session: SessionState,
    /// Keep superseded artifact files on disk instead of deleting them.
    retain_artifacts: bool,
}

impl<C: CameraPort, P: PublishPort> ServerContext<C, P> {
    pub fn new(
        capture: CapturePipeline<C>,
        classifier: ClassificationEngine,
        publisher: P,
        content_type: impl Into<String>,
        retain_artifacts: bool,
    ) -> Self {
        Self {
            capture,
            classifier,
            publisher,
            content_type: content_type.into(),
            session: SessionState::new(),
            retain_artifacts,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Run one command to completion and produce the payload for the peer.
    ///
    /// Errors carry their own [`Disposition`](crate::error::Disposition);
    /// the dispatcher maps them to an error payload.
    pub fn handle_command(
        &mut self,
        command: &Command,
        sink: &mut impl EventSink,
    ) -> Result<Response, DispatchError> {
        match command {
            Command::Click => self.click(sink),
            Command::SendResult => self.send_result(),
            Command::Analyze => self.analyze(sink),
            Command::Unsupported(raw) => {
                debug!("unsupported command {raw:?}");
                Ok(Response::not_supported())
            }
        }
    }

    /// Capture, publish, then commit both to the session. Nothing is
    /// recorded unless both steps succeed.
    fn click(&mut self, sink: &mut impl EventSink) -> Result<Response, DispatchError> {
        let artifact = self.capture.capture()?;
        sink.emit(&AppEvent::ArtifactCaptured {
            id: artifact.id().to_string(),
            path: artifact.path().to_path_buf(),
        });

        let url = match self.publisher.publish(artifact.path(), &self.content_type) {
            Ok(url) => url,
            Err(e) => {
                warn!("Publish of {} failed: {e}", artifact.path().display());
                discard(artifact.path());
                return Err(e.into());
            }
        };
        info!("Uploaded {} as {url}", artifact.id());

        let reference = ExternalReference::new(url.clone(), artifact.id());
        let id = artifact.id();
        if let Some(old) = self.session.record_capture(artifact) {
            self.supersede(&old);
        }
        if let Err(rejected) = self.session.record_reference(reference) {
            // record_capture just made `id` current, so this cannot happen.
            warn!("reference for {} rejected", rejected.artifact());
        }
        sink.emit(&AppEvent::ArtifactPublished {
            id: id.to_string(),
            url: url.clone(),
        });
        Ok(Response::new(url))
    }

    fn send_result(&self) -> Result<Response, DispatchError> {
        self.session
            .current_reference()
            .map(|r| Response::new(r.url()))
            .ok_or(DispatchError::NoResult(NoArtifactError))
    }

    fn analyze(&self, sink: &mut impl EventSink) -> Result<Response, DispatchError> {
        let artifact = self
            .session
            .current_artifact()
            .ok_or(DispatchError::NothingToAnalyze(NoArtifactError))?;
        let outcome = self.classifier.classify(artifact)?;
        sink.emit(&AppEvent::Classified {
            level: outcome.level,
            score: outcome.score,
        });
        Ok(Response::new(outcome.level.as_char().to_string()))
    }

    fn supersede(&self, old: &CapturedArtifact) {
        if self.retain_artifacts {
            debug!("retaining superseded artifact {}", old.path().display());
        } else {
            discard(old.path());
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn capture(&self) -> &CapturePipeline<C> {
        &self.capture
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove {}: {e}", path.display());
    }
}
