//! Data model shared by capture, classification and the session.

use core::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;
use uuid::Uuid;

/// Ordinal severity level of a reference pattern, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` outside `1..=5`.
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Single-character wire form, `'1'..='5'`.
    pub const fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique identifier of one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A cropped, resized frame persisted to durable storage.
#[derive(Debug, Clone)]
pub struct CapturedArtifact {
    id: ArtifactId,
    pixels: RgbImage,
    path: PathBuf,
}

impl CapturedArtifact {
    pub fn new(id: ArtifactId, pixels: RgbImage, path: PathBuf) -> Self {
        Self { id, pixels, path }
    }

    pub fn id(&self) -> ArtifactId {
        self.id
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Locator returned by the publish collaborator, bound to the artifact
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    url: String,
    artifact: ArtifactId,
}

impl ExternalReference {
    pub fn new(url: impl Into<String>, artifact: ArtifactId) -> Self {
        Self {
            url: url.into(),
            artifact,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn artifact(&self) -> ArtifactId {
        self.artifact
    }
}
