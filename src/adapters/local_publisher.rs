//! Offline publish adapter: no upload, the reference is the artifact's
//! own `file://` URL. Used on bench rigs without network access.

use std::fs;
use std::path::Path;

use log::debug;

use crate::app::ports::PublishPort;
use crate::error::PublishError;

#[derive(Debug, Default)]
pub struct LocalPublisher;

impl LocalPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl PublishPort for LocalPublisher {
    fn publish(&mut self, artifact_path: &Path, content_type: &str) -> Result<String, PublishError> {
        let canonical = fs::canonicalize(artifact_path)
            .map_err(|e| PublishError::Io(format!("{}: {e}", artifact_path.display())))?;
        debug!("local publish of {} ({content_type})", canonical.display());
        Ok(format!("file://{}", canonical.display()))
    }
}
