//! Classification engine: score a captured artifact against every
//! reference pattern and pick the most similar level.

pub mod reference;
pub mod ssim;

use log::{debug, info};

use crate::capture::imaging::to_intensity;
use crate::error::ClassifyError;
use crate::model::{CapturedArtifact, Level};

use self::reference::ReferencePatternSet;

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub level: Level,
    pub score: f64,
    /// Every `(level, score)` pair, ascending by level.
    pub scores: Vec<(Level, f64)>,
}

pub struct ClassificationEngine {
    references: ReferencePatternSet,
}

impl ClassificationEngine {
    pub fn new(references: ReferencePatternSet) -> Self {
        Self { references }
    }

    pub fn references(&self) -> &ReferencePatternSet {
        &self.references
    }

    /// Highest SSIM wins; on an exact tie the lowest level is kept.
    pub fn classify(&self, artifact: &CapturedArtifact) -> Result<Classification, ClassifyError> {
        let probe = to_intensity(artifact.pixels());

        let mut scores = Vec::with_capacity(self.references.len());
        let mut best: Option<(Level, f64)> = None;
        for pattern in self.references.iter() {
            let score = ssim::mean_ssim(&probe, pattern.descriptor())?;
            debug!("level {} ssim {score:.6}", pattern.level());
            scores.push((pattern.level(), score));
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pattern.level(), score));
            }
        }

        let (level, score) = best.ok_or(ClassifyError::EmptyReferenceSet)?;
        info!("SSIM score: {score:.6}, level {level}");
        Ok(Classification {
            level,
            score,
            scores,
        })
    }
}
