//! Applicant profiles as the match engine consumes them.

mod normalizer;
mod states;

pub use normalizer::normalize;
pub use states::normalize_state;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-request applicant signals. Numeric fields are finite when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    pub gpa: Option<f64>,
    pub test_score: Option<f64>,
    /// Self-reported 0-100 strength rating for extracurriculars.
    pub extras_score: Option<f64>,
    pub state: Option<String>,
    pub race: Option<String>,
    pub gender: Option<String>,
    pub socioeconomic_status: Option<String>,
    #[serde(default)]
    pub preferred_regions: BTreeSet<String>,
}

impl ApplicantProfile {
    /// A profile is scoreable once it carries at least one finite academic metric.
    pub fn is_scoreable(&self) -> bool {
        [self.gpa, self.test_score]
            .into_iter()
            .flatten()
            .any(f64::is_finite)
    }

    pub fn ensure_scoreable(&self) -> Result<(), ValidationError> {
        if self.is_scoreable() {
            Ok(())
        } else {
            Err(ValidationError::NoScoreableMetric)
        }
    }
}

/// Rejections raised before a profile reaches the match engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("profile needs a numeric GPA or test score")]
    NoScoreableMetric,
    #[error("profile payload must be a JSON object")]
    NotAnObject,
    #[error("profile name is required")]
    MissingName,
    #[error("profile name must be at most {max} characters")]
    NameTooLong { max: usize },
}
