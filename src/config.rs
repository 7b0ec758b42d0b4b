//! Server configuration parameters
//!
//! Fixed operational parameters of the colorimetry rig: region of
//! interest, canonical artifact size, reference locations, service
//! identity. Values come from a JSON file (see
//! [`JsonFileConfig`](crate::adapters::config_file::JsonFileConfig));
//! any field left out takes its default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::ssim::WINDOW_SIZE;
use crate::error::ConfigError;

/// Number of reference patterns (levels 1..=5).
pub const REFERENCE_COUNT: usize = 5;

/// Rectangular region of interest in frame pixel coordinates.
///
/// Matches the fixed distance of the sample cuvette and the lighting rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    /// Left edge (column).
    pub x: u32,
    /// Top edge (row).
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for Roi {
    fn default() -> Self {
        Self {
            x: 800,
            y: 160,
            width: 200,
            height: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraKind {
    /// Spawn a still-capture program that writes one image to stdout.
    Command,
    /// Deterministic synthetic frames (bench setups without a sensor).
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub kind: CameraKind,
    pub program: String,
    pub args: Vec<String>,
    /// Arguments for a device check run once at startup (for example
    /// `["--list-cameras"]`). Unset means one trial acquisition.
    pub probe_args: Option<Vec<String>>,
    /// Frame size produced by the simulated camera.
    pub sim_width: u32,
    pub sim_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            kind: CameraKind::Command,
            program: "libcamera-still".into(),
            args: ["-n", "-t", "1", "-e", "png", "-o", "-"]
                .into_iter()
                .map(String::from)
                .collect(),
            probe_args: None,
            sim_width: 1280,
            sim_height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    /// Upload to the Filestack store API.
    Filestack,
    /// No upload; the reference is a `file://` URL of the artifact.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub kind: PublisherKind,
    /// Overridden by `FILESTACK_API_KEY` when set.
    pub api_key: String,
    pub endpoint: String,
    pub content_type: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::Filestack,
            api_key: String::new(),
            endpoint: "https://www.filestackapi.com/api/store/S3".into(),
            content_type: "image/png".into(),
        }
    }
}

/// Core server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // --- Service identity ---
    pub service_name: String,
    pub service_uuid: String,
    /// Address the stream listener binds to.
    pub bind_addr: String,

    // --- Wire ---
    /// Upper bound of a single command read, in bytes.
    pub read_buffer_size: usize,
    /// How often blocking waits re-check the interrupt flag (ms).
    pub poll_interval_ms: u64,

    // --- Capture ---
    pub roi: Roi,
    /// Edge length of the square normalized artifact.
    pub canonical_size: u32,
    /// Delay before the first acquisition after the camera opens (ms).
    pub warmup_ms: u64,
    pub artifact_dir: PathBuf,
    pub artifact_prefix: String,
    /// Keep superseded artifact files on disk.
    pub retain_artifacts: bool,
    pub camera: CameraConfig,

    // --- Classification ---
    /// Reference images; position `i` is level `i + 1`.
    pub reference_paths: Vec<PathBuf>,

    // --- Publish ---
    pub publisher: PublisherConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: "RaspiBtSrv".into(),
            service_uuid: "7be1fcb3-5776-42fb-91fd-2ee7b5bbb86d".into(),
            bind_addr: "0.0.0.0:4242".into(),

            read_buffer_size: 1024,
            poll_interval_ms: 100,

            roi: Roi::default(),
            canonical_size: 135,
            warmup_ms: 100,
            artifact_dir: PathBuf::from("/home/pi"),
            artifact_prefix: "colorimetry_test_sample_".into(),
            retain_artifacts: false,
            camera: CameraConfig::default(),

            reference_paths: (1..=REFERENCE_COUNT)
                .map(|l| {
                    PathBuf::from(format!(
                        "/home/pi/.virtualenvs/cv/colorimetry_sample_l{l}.png"
                    ))
                })
                .collect(),

            publisher: PublisherConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_buffer_size == 0 {
            return Err(ConfigError::ValidationFailed("read_buffer_size must be > 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if self.roi.width == 0 || self.roi.height == 0 {
            return Err(ConfigError::ValidationFailed("roi must have a non-zero area"));
        }
        if (self.canonical_size as usize) < WINDOW_SIZE {
            return Err(ConfigError::ValidationFailed(
                "canonical_size must be at least the SSIM window (7)",
            ));
        }
        if self.reference_paths.len() != REFERENCE_COUNT {
            return Err(ConfigError::ValidationFailed(
                "reference_paths must list exactly five images",
            ));
        }
        if self.camera.kind == CameraKind::Command && self.camera.program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("camera.program must not be empty"));
        }
        if self.publisher.kind == PublisherKind::Filestack && self.publisher.api_key.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "publisher.api_key is required for the filestack publisher",
            ));
        }
        Ok(())
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Apply `FILESTACK_API_KEY` if present.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("FILESTACK_API_KEY") {
            if !key.trim().is_empty() {
                self.publisher.api_key = key.trim().to_owned();
            }
        }
    }
}
