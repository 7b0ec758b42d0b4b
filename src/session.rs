//! Session state: the most recent artifact and the reference published
//! for it. Lives for the process lifetime, never persisted.
//!
//! A reference is only returned while it belongs to the current artifact;
//! recording a new capture drops the old reference.

use crate::model::{CapturedArtifact, ExternalReference};

#[derive(Debug, Default)]
pub struct SessionState {
    current_artifact: Option<CapturedArtifact>,
    current_reference: Option<ExternalReference>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `artifact` current. Returns the artifact it replaced.
    pub fn record_capture(&mut self, artifact: CapturedArtifact) -> Option<CapturedArtifact> {
        self.current_reference = None;
        self.current_artifact.replace(artifact)
    }

    /// Attach `reference` to the current artifact. Rejected (returned back)
    /// when it was produced for a different artifact.
    pub fn record_reference(
        &mut self,
        reference: ExternalReference,
    ) -> Result<(), ExternalReference> {
        match &self.current_artifact {
            Some(artifact) if artifact.id() == reference.artifact() => {
                self.current_reference = Some(reference);
                Ok(())
            }
            _ => Err(reference),
        }
    }

    pub fn current_artifact(&self) -> Option<&CapturedArtifact> {
        self.current_artifact.as_ref()
    }

    pub fn current_reference(&self) -> Option<&ExternalReference> {
        let artifact = self.current_artifact.as_ref()?;
        self.current_reference
            .as_ref()
            .filter(|r| r.artifact() == artifact.id())
    }
}
