//! Capture pipeline: hardware frame → normalized artifact on disk.
//!
//! ```text
//!  CameraPort ──▶ warm-up (first call only) ──▶ crop ROI ──▶ resize
//!            ──▶ fresh ArtifactId ──▶ PNG in artifact_dir ──▶ CapturedArtifact
//! ```
//!
//! Every artifact has the canonical `size`×`size` dimensions regardless
//! of what the camera delivers, so classification never sees variable
//! input.

pub mod imaging;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use image::ImageFormat;
use log::{debug, info};

use crate::app::ports::CameraPort;
use crate::config::{Roi, ServerConfig};
use crate::error::CaptureError;
use crate::model::{ArtifactId, CapturedArtifact};

/// Fixed parameters of the capture rig.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub roi: Roi,
    pub canonical_size: u32,
    pub warmup: Duration,
    pub artifact_dir: PathBuf,
    pub artifact_prefix: String,
}

impl CaptureSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            roi: config.roi,
            canonical_size: config.canonical_size,
            warmup: config.warmup(),
            artifact_dir: config.artifact_dir.clone(),
            artifact_prefix: config.artifact_prefix.clone(),
        }
    }
}

/// Owns the camera handle for the process lifetime.
pub struct CapturePipeline<C> {
    camera: C,
    settings: CaptureSettings,
    warmed_up: bool,
}

impl<C: CameraPort> CapturePipeline<C> {
    pub fn new(camera: C, settings: CaptureSettings) -> Self {
        Self {
            camera,
            settings,
            warmed_up: false,
        }
    }

    /// Acquire, normalize and persist one artifact.
    pub fn capture(&mut self) -> Result<CapturedArtifact, CaptureError> {
        if !self.warmed_up {
            if !self.settings.warmup.is_zero() {
                debug!("camera warm-up {:?}", self.settings.warmup);
                thread::sleep(self.settings.warmup);
            }
            self.warmed_up = true;
        }

        let frame = self.camera.acquire_frame()?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(CaptureError::EmptyFrame);
        }

        let size = self.settings.canonical_size;
        let pixels = imaging::normalize(&frame, &self.settings.roi, size);

        let id = ArtifactId::fresh();
        let path = self.artifact_path(id);
        pixels
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| CaptureError::Storage {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Picture taken ({}x{} frame), image saved to {}",
            frame.width(),
            frame.height(),
            path.display()
        );
        Ok(CapturedArtifact::new(id, pixels, path))
    }

    /// Storage location for an artifact id.
    pub fn artifact_path(&self, id: ArtifactId) -> PathBuf {
        self.settings
            .artifact_dir
            .join(format!("{}{}.png", self.settings.artifact_prefix, id))
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Whether the warm-up delay has already been spent.
    pub fn is_warmed_up(&self) -> bool {
        self.warmed_up
    }
}
