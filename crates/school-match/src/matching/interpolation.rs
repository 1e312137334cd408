use super::{MatchResult, MatchScorer};
use crate::catalog::{InstitutionRecord, PercentileCurve};
use crate::profile::ApplicantProfile;

/// Places the applicant on each metric's percentile curve and averages the
/// placements that exist. Metrics without data are left out of the mean rather than
/// counted as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentileInterpolation;

impl MatchScorer for PercentileInterpolation {
    fn name(&self) -> &'static str {
        "interpolation"
    }

    fn score(
        &self,
        profile: &ApplicantProfile,
        institution: &InstitutionRecord,
    ) -> Option<MatchResult> {
        let curves = &institution.academic_percentiles;
        let gpa = profile
            .gpa
            .and_then(|value| percentile_for(value, &curves.gpa));
        let test_score = profile
            .test_score
            .and_then(|value| percentile_for(value, &curves.test_score));

        let available: Vec<f64> = [gpa, test_score].into_iter().flatten().collect();
        if available.is_empty() {
            return None;
        }
        let mean = available.iter().sum::<f64>() / available.len() as f64;

        Some(MatchResult::for_institution(
            institution,
            mean,
            gpa,
            test_score,
        ))
    }
}

/// Percentile (0-100) that `value` occupies on `curve`, or `None` when the curve has
/// no usable points.
///
/// Below the lowest point the percentile scales linearly from zero; between points
/// it is interpolated; above the highest point it grows by the relative overshoot
/// (`(value - last) / last`, in percentage points) up to 100.
pub fn percentile_for(value: f64, curve: &PercentileCurve) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }

    let points = curve.valid_points();
    let (first_percentile, first_value) = *points.first()?;

    if value <= first_value {
        let percentile = if first_value > 0.0 {
            first_percentile * (value.max(0.0) / first_value)
        } else if value >= first_value {
            first_percentile
        } else {
            0.0
        };
        return Some(percentile.clamp(0.0, 100.0));
    }

    for window in points.windows(2) {
        let (low_percentile, low_value) = window[0];
        let (high_percentile, high_value) = window[1];
        // Earlier windows already handled everything up to `low_value`.
        if value <= high_value {
            let position = (value - low_value) / (high_value - low_value);
            let percentile = low_percentile + position * (high_percentile - low_percentile);
            return Some(percentile.clamp(0.0, 100.0));
        }
    }

    let (last_percentile, last_value) = points[points.len() - 1];
    if last_value <= 0.0 {
        return Some(100.0);
    }
    let overshoot = (value - last_value) / last_value;
    let percentile = (last_percentile + overshoot * 100.0).clamp(last_percentile, 100.0);
    Some(percentile.clamp(0.0, 100.0))
}
