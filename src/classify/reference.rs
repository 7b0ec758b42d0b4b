//! Reference pattern set: five calibration images, one per level.
//!
//! Loaded once at startup, converted to intensity and brought to the
//! canonical size, then shared read-only by every classification.

use std::path::{Path, PathBuf};

use image::GrayImage;
use image::imageops::{self, FilterType};
use log::{info, warn};

use crate::capture::imaging::to_intensity;
use crate::error::ReferenceError;
use crate::model::Level;

#[derive(Debug, Clone)]
pub struct ReferencePattern {
    level: Level,
    descriptor: GrayImage,
}

impl ReferencePattern {
    pub fn new(level: Level, descriptor: GrayImage) -> Self {
        Self { level, descriptor }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn descriptor(&self) -> &GrayImage {
        &self.descriptor
    }
}

/// Non-empty, level-unique, sorted by ascending level.
#[derive(Debug, Clone)]
pub struct ReferencePatternSet {
    patterns: Vec<ReferencePattern>,
}

impl ReferencePatternSet {
    pub fn from_patterns(mut patterns: Vec<ReferencePattern>) -> Result<Self, ReferenceError> {
        if patterns.is_empty() {
            return Err(ReferenceError::Empty);
        }
        patterns.sort_by_key(ReferencePattern::level);
        if let Some(pair) = patterns.windows(2).find(|p| p[0].level == p[1].level) {
            return Err(ReferenceError::DuplicateLevel(pair[0].level.get()));
        }
        Ok(Self { patterns })
    }

    /// Load `paths[i]` as level `i + 1`, resized to `size`×`size`.
    pub fn load(paths: &[PathBuf], size: u32) -> Result<Self, ReferenceError> {
        let mut patterns = Vec::with_capacity(paths.len());
        for (idx, path) in paths.iter().enumerate() {
            let raw_level = u8::try_from(idx + 1).unwrap_or(u8::MAX);
            let level = Level::new(raw_level).ok_or(ReferenceError::InvalidLevel(raw_level))?;
            let descriptor = load_descriptor(path, size)?;
            info!("Reference level {} loaded from {}", level, path.display());
            patterns.push(ReferencePattern::new(level, descriptor));
        }
        Self::from_patterns(patterns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferencePattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn load_descriptor(path: &Path, size: u32) -> Result<GrayImage, ReferenceError> {
    let img = image::open(path).map_err(|e| ReferenceError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let gray = to_intensity(&img.to_rgb8());
    if gray.dimensions() == (size, size) {
        return Ok(gray);
    }
    warn!(
        "Reference {} is {}x{}, resizing to {size}x{size}",
        path.display(),
        gray.width(),
        gray.height()
    );
    Ok(imageops::resize(&gray, size, size, FilterType::Triangle))
}
