//! Profile-to-institution fit scoring.
//!
//! Two strategies sit behind [`MatchScorer`]: [`PercentileInterpolation`] places the
//! applicant on each metric's percentile curve and averages the placements, while
//! [`BandedScoring`] normalizes against the 10th/90th percentile band and adds
//! categorical bonuses. Neither formula is derived from the other.

mod banded;
mod interpolation;

pub use banded::BandedScoring;
pub use interpolation::{percentile_for, PercentileInterpolation};

use crate::catalog::InstitutionRecord;
use crate::profile::ApplicantProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fit of one profile against one institution. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub institution_id: String,
    pub name: String,
    pub match_score: u8,
    pub gpa_component_score: Option<u8>,
    pub test_score_component_score: Option<u8>,
    pub gpa_median: f64,
    pub test_score_median: f64,
}

impl MatchResult {
    fn for_institution(
        institution: &InstitutionRecord,
        match_score: f64,
        gpa_component: Option<f64>,
        test_score_component: Option<f64>,
    ) -> Self {
        Self {
            institution_id: institution.institution_id.clone(),
            name: institution.name.clone(),
            match_score: to_score(match_score),
            gpa_component_score: gpa_component.map(to_score),
            test_score_component_score: test_score_component.map(to_score),
            gpa_median: institution.gpa_median,
            test_score_median: institution.test_score_median,
        }
    }
}

/// Scoring strategy seam. Implementations are pure: the same inputs always give the
/// same result, and `None` means the institution cannot be scored for this profile.
pub trait MatchScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(
        &self,
        profile: &ApplicantProfile,
        institution: &InstitutionRecord,
    ) -> Option<MatchResult>;
}

/// Configurable choice between the two scorers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    Interpolation,
    Banded,
}

impl ScoringStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interpolation" | "percentile" => Some(Self::Interpolation),
            "banded" | "band" => Some(Self::Banded),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Interpolation => "interpolation",
            Self::Banded => "banded",
        }
    }

    pub fn scorer(self) -> Arc<dyn MatchScorer> {
        match self {
            Self::Interpolation => Arc::new(PercentileInterpolation),
            Self::Banded => Arc::new(BandedScoring),
        }
    }
}

/// Scores every institution, drops the unscoreable ones, and returns the best
/// `limit` results. Ties keep catalog order.
pub fn rank_matches<S>(
    scorer: &S,
    profile: &ApplicantProfile,
    institutions: &[InstitutionRecord],
    limit: usize,
) -> Vec<MatchResult>
where
    S: MatchScorer + ?Sized,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = institutions
        .iter()
        .filter_map(|institution| scorer.score(profile, institution))
        .collect();

    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    results.truncate(limit);
    results
}

/// Rounds a 0-100 value into the integer score range.
pub(crate) fn to_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AcademicPercentiles, Demographics, PercentileCurve};

    fn institution(name: &str, gpa: [Option<f64>; 5]) -> InstitutionRecord {
        InstitutionRecord {
            institution_id: name.to_string(),
            name: name.to_string(),
            normalized_name: name.to_lowercase(),
            academic_percentiles: AcademicPercentiles {
                gpa: PercentileCurve::from_rungs(gpa),
                test_score: PercentileCurve::default(),
            },
            gpa_median: gpa[2].unwrap_or(0.0),
            test_score_median: 0.0,
            state: None,
            region: None,
            is_public: None,
            demographics: Demographics::default(),
        }
    }

    fn profile(gpa: f64) -> ApplicantProfile {
        ApplicantProfile {
            gpa: Some(gpa),
            ..ApplicantProfile::default()
        }
    }

    #[test]
    fn rank_sorts_descending_and_keeps_ties_in_catalog_order() {
        let institutions = vec![
            institution("Reach", [Some(3.8), None, Some(3.9), None, Some(4.0)]),
            institution("Tie A", [Some(3.0), None, Some(3.5), None, Some(3.9)]),
            institution("Safety", [Some(2.5), None, Some(2.8), None, Some(3.0)]),
            institution("Tie B", [Some(3.0), None, Some(3.5), None, Some(3.9)]),
        ];

        let ranked = rank_matches(&PercentileInterpolation, &profile(3.5), &institutions, 10);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Safety", "Tie A", "Tie B", "Reach"]);
    }

    #[test]
    fn rank_respects_limit_and_excludes_unscoreable() {
        let institutions = vec![
            institution("Empty", [None; 5]),
            institution("A", [Some(3.0), None, Some(3.5), None, Some(3.9)]),
            institution("B", [Some(3.1), None, Some(3.6), None, Some(3.95)]),
        ];

        let ranked = rank_matches(&PercentileInterpolation, &profile(3.5), &institutions, 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.name != "Empty"));

        let limited = rank_matches(&PercentileInterpolation, &profile(3.5), &institutions, 1);
        assert_eq!(limited.len(), 1);
        assert!(rank_matches(&PercentileInterpolation, &profile(3.5), &institutions, 0).is_empty());
    }

    #[test]
    fn rank_is_idempotent() {
        let institutions = vec![
            institution("A", [Some(3.0), None, Some(3.5), None, Some(3.9)]),
            institution("B", [Some(3.3), Some(3.5), Some(3.7), None, Some(3.95)]),
        ];
        let scorer = ScoringStrategy::Interpolation.scorer();
        let first = rank_matches(scorer.as_ref(), &profile(3.6), &institutions, 5);
        let second = rank_matches(scorer.as_ref(), &profile(3.6), &institutions, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn strategy_parse_and_labels() {
        assert_eq!(ScoringStrategy::parse(" Banded "), Some(ScoringStrategy::Banded));
        assert_eq!(
            ScoringStrategy::parse("percentile"),
            Some(ScoringStrategy::Interpolation)
        );
        assert_eq!(ScoringStrategy::parse("fuzzy"), None);
        assert_eq!(ScoringStrategy::Banded.scorer().name(), "banded");
        assert_eq!(ScoringStrategy::default().label(), "interpolation");
    }

    #[test]
    fn to_score_clamps_and_rounds() {
        assert_eq!(to_score(-4.0), 0);
        assert_eq!(to_score(49.5), 50);
        assert_eq!(to_score(120.0), 100);
        assert_eq!(to_score(f64::NAN), 0);
    }
}
