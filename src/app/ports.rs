//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ServerContext (domain)
//! ```
//!
//! Driven adapters (camera, publish service, event sinks, config files)
//! implement these traits. The [`ServerContext`](super::service::ServerContext)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use std::path::Path;

use image::RgbImage;

use crate::config::ServerConfig;
use crate::error::{CaptureError, ConfigError, PublishError};

// ───────────────────────────────────────────────────────────────
// Camera port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Frame source. Opened once at startup and owned by the
/// [`CapturePipeline`](crate::capture::CapturePipeline).
pub trait CameraPort {
    /// Acquire one full-resolution frame.
    fn acquire_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

impl<T: CameraPort + ?Sized> CameraPort for Box<T> {
    fn acquire_frame(&mut self) -> Result<RgbImage, CaptureError> {
        (**self).acquire_frame()
    }
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → remote store)
// ───────────────────────────────────────────────────────────────

/// Uploads a stored artifact and hands back an opaque locator string.
/// Best-effort: no retry is attempted by callers.
pub trait PublishPort {
    fn publish(&mut self, artifact_path: &Path, content_type: &str) -> Result<String, PublishError>;
}

impl<T: PublishPort + ?Sized> PublishPort for Box<T> {
    fn publish(&mut self, artifact_path: &Path, content_type: &str) -> Result<String, PublishError> {
        (**self).publish(artifact_path, content_type)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the server configuration.
///
/// Implementations return [`ServerConfig::default()`] when no stored
/// configuration exists and an error when it exists but is unreadable.
/// Callers still run [`ServerConfig::validate`] on the result.
pub trait ConfigPort {
    fn load(&self) -> Result<ServerConfig, ConfigError>;
}
