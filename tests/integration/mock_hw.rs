//! Mock camera, publisher and event sink for integration tests.
//!
//! The camera replays a scripted list of flat grey frames (or faults);
//! the reference set is five flat patches at grey 50, 100, 150, 200, 250,
//! so a frame of grey `50 * L` classifies as level `L`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colorimetry::app::events::AppEvent;
use colorimetry::app::ports::{CameraPort, EventSink, PublishPort};
use colorimetry::app::service::ServerContext;
use colorimetry::capture::{CapturePipeline, CaptureSettings};
use colorimetry::classify::ClassificationEngine;
use colorimetry::classify::reference::{ReferencePattern, ReferencePatternSet};
use colorimetry::config::Roi;
use colorimetry::error::{CaptureError, PublishError};
use colorimetry::model::Level;
use image::{GrayImage, Luma, Rgb, RgbImage};

pub const CANONICAL: u32 = 24;

// ── MockCamera ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum Shot {
    Grey(u8),
    Fault,
}

pub struct MockCamera {
    script: VecDeque<Shot>,
    /// Used once the script runs out.
    fallback: u8,
    pub acquisitions: usize,
}

#[allow(dead_code)]
impl MockCamera {
    pub fn new(script: impl IntoIterator<Item = Shot>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: 150,
            acquisitions: 0,
        }
    }

    pub fn greys(values: &[u8]) -> Self {
        Self::new(values.iter().copied().map(Shot::Grey))
    }
}

impl CameraPort for MockCamera {
    fn acquire_frame(&mut self) -> Result<RgbImage, CaptureError> {
        self.acquisitions += 1;
        match self.script.pop_front().unwrap_or(Shot::Grey(self.fallback)) {
            Shot::Grey(v) => Ok(RgbImage::from_pixel(96, 72, Rgb([v, v, v]))),
            Shot::Fault => Err(CaptureError::Hardware("mock sensor fault".into())),
        }
    }
}

// ── MockPublisher ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockPublisher {
    pub fail: bool,
    pub uploads: Vec<PathBuf>,
    pub content_types: Vec<String>,
}

impl PublishPort for MockPublisher {
    fn publish(&mut self, artifact_path: &Path, content_type: &str) -> Result<String, PublishError> {
        if self.fail {
            return Err(PublishError::Network("mock service unreachable".into()));
        }
        assert!(artifact_path.exists(), "publish called for a missing file");
        self.uploads.push(artifact_path.to_path_buf());
        self.content_types.push(content_type.to_owned());
        Ok(format!("https://cdn.mock/R{}", self.uploads.len()))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub fn reference_set() -> ReferencePatternSet {
    let patterns = (1..=5u8)
        .map(|l| {
            ReferencePattern::new(
                Level::new(l).unwrap(),
                GrayImage::from_pixel(CANONICAL, CANONICAL, Luma([l * 50])),
            )
        })
        .collect();
    ReferencePatternSet::from_patterns(patterns).unwrap()
}

pub fn settings(dir: &Path) -> CaptureSettings {
    CaptureSettings {
        roi: Roi {
            x: 16,
            y: 12,
            width: 48,
            height: 48,
        },
        canonical_size: CANONICAL,
        warmup: Duration::ZERO,
        artifact_dir: dir.to_path_buf(),
        artifact_prefix: "it_sample_".into(),
    }
}

pub fn context(dir: &Path, camera: MockCamera) -> ServerContext<MockCamera, MockPublisher> {
    context_with(dir, camera, false)
}

pub fn context_with(
    dir: &Path,
    camera: MockCamera,
    retain_artifacts: bool,
) -> ServerContext<MockCamera, MockPublisher> {
    ServerContext::new(
        CapturePipeline::new(camera, settings(dir)),
        ClassificationEngine::new(reference_set()),
        MockPublisher::default(),
        "image/png",
        retain_artifacts,
    )
}

/// Number of regular files in `dir`.
#[allow(dead_code)]
pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .count()
}
