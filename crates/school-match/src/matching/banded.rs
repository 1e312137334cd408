use super::{MatchResult, MatchScorer};
use crate::catalog::{InstitutionRecord, PercentileCurve};
use crate::profile::{normalize_state, ApplicantProfile};

const ACADEMIC_WEIGHT: f64 = 0.4;
const IN_STATE_PUBLIC_BONUS: f64 = 0.10;
const DISADVANTAGED_BONUS: f64 = 0.05;
const UNDERREPRESENTED_BONUS: f64 = 0.05;
const EXTRAS_BONUS: f64 = 0.05;
const UNDERREPRESENTED_ENROLLMENT_FLOOR: f64 = 20.0;

const UNDERREPRESENTED_GROUPS: &[&str] = &[
    "black",
    "african american",
    "hispanic",
    "latino",
    "latina",
    "latinx",
    "native american",
    "american indian",
    "alaska native",
    "native hawaiian",
    "pacific islander",
];

/// Min-max placement inside the 10th-90th percentile band plus categorical bonuses.
///
/// Each available metric contributes `0.4 * band_position`. The weights are fixed and
/// not renormalized: an applicant with only one metric can reach at most 0.4 from
/// academics. That cap is a known simplification of this strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandedScoring;

impl MatchScorer for BandedScoring {
    fn name(&self) -> &'static str {
        "banded"
    }

    fn score(
        &self,
        profile: &ApplicantProfile,
        institution: &InstitutionRecord,
    ) -> Option<MatchResult> {
        let curves = &institution.academic_percentiles;
        let gpa = profile
            .gpa
            .and_then(|value| band_position(value, &curves.gpa));
        let test_score = profile
            .test_score
            .and_then(|value| band_position(value, &curves.test_score));

        if gpa.is_none() && test_score.is_none() {
            return None;
        }

        let academic: f64 = [gpa, test_score]
            .into_iter()
            .flatten()
            .map(|position| ACADEMIC_WEIGHT * position)
            .sum();
        let total = (academic + bonuses(profile, institution)).clamp(0.0, 1.0);

        Some(MatchResult::for_institution(
            institution,
            total * 100.0,
            gpa.map(|position| position * 100.0),
            test_score.map(|position| position * 100.0),
        ))
    }
}

/// Position of `value` inside the 10th-90th band, clamped to `[0, 1]`. Undefined when
/// either bound is missing or the band is empty.
fn band_position(value: f64, curve: &PercentileCurve) -> Option<f64> {
    let low = curve.value_at(10)?;
    let high = curve.value_at(90)?;
    let range = high - low;
    if !value.is_finite() || range <= 0.0 {
        return None;
    }
    Some(((value - low) / range).clamp(0.0, 1.0))
}

fn bonuses(profile: &ApplicantProfile, institution: &InstitutionRecord) -> f64 {
    let mut bonus = 0.0;

    let home_state = profile.state.as_deref().and_then(normalize_state);
    let institution_state = institution.state.as_deref().and_then(normalize_state);
    if institution.is_public == Some(true) {
        if let (Some(home), Some(school)) = (home_state, institution_state) {
            if home == school {
                bonus += IN_STATE_PUBLIC_BONUS;
            }
        }
    }

    if profile
        .socioeconomic_status
        .as_deref()
        .is_some_and(is_disadvantaged)
    {
        bonus += DISADVANTAGED_BONUS;
    }

    let enrollment = institution.demographics.underrepresented_percent();
    if profile.race.as_deref().is_some_and(is_underrepresented)
        && enrollment.is_some_and(|percent| percent >= UNDERREPRESENTED_ENROLLMENT_FLOOR)
    {
        bonus += UNDERREPRESENTED_BONUS;
    }

    if let Some(extras) = profile.extras_score.filter(|extras| extras.is_finite()) {
        bonus += extras.clamp(0.0, 100.0) / 100.0 * EXTRAS_BONUS;
    }

    bonus
}

fn is_disadvantaged(status: &str) -> bool {
    status.to_lowercase().contains("disadvantaged")
}

fn is_underrepresented(race: &str) -> bool {
    let lowered = race.to_lowercase();
    UNDERREPRESENTED_GROUPS
        .iter()
        .any(|group| lowered.contains(group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AcademicPercentiles, Demographics};

    fn institution() -> InstitutionRecord {
        InstitutionRecord {
            institution_id: "State U".to_string(),
            name: "State U".to_string(),
            normalized_name: "state u".to_string(),
            academic_percentiles: AcademicPercentiles {
                gpa: PercentileCurve::from_rungs([Some(3.0), None, Some(3.5), None, Some(4.0)]),
                test_score: PercentileCurve::from_rungs([
                    Some(500.0),
                    None,
                    Some(510.0),
                    None,
                    Some(520.0),
                ]),
            },
            gpa_median: 3.5,
            test_score_median: 510.0,
            state: Some("California".to_string()),
            region: Some("West".to_string()),
            is_public: Some(true),
            demographics: Demographics {
                race_hispanic: Some(15.0),
                race_black: Some(6.0),
                ..Demographics::default()
            },
        }
    }

    fn academic_profile() -> ApplicantProfile {
        ApplicantProfile {
            gpa: Some(3.5),
            test_score: Some(510.0),
            ..ApplicantProfile::default()
        }
    }

    #[test]
    fn weights_band_positions_without_bonuses() {
        let result = BandedScoring
            .score(&academic_profile(), &institution())
            .expect("scoreable");
        assert_eq!(result.gpa_component_score, Some(50));
        assert_eq!(result.test_score_component_score, Some(50));
        assert_eq!(result.match_score, 40);
        assert_eq!(result.gpa_median, 3.5);
        assert_eq!(result.test_score_median, 510.0);
    }

    #[test]
    fn missing_metric_caps_the_academic_base() {
        let profile = ApplicantProfile {
            gpa: Some(4.5),
            ..ApplicantProfile::default()
        };
        let result = BandedScoring.score(&profile, &institution()).expect("scoreable");
        assert_eq!(result.gpa_component_score, Some(100));
        assert_eq!(result.test_score_component_score, None);
        assert_eq!(result.match_score, 40);
    }

    #[test]
    fn applies_every_bonus() {
        let profile = ApplicantProfile {
            state: Some("ca".to_string()),
            race: Some("Hispanic/Latino".to_string()),
            socioeconomic_status: Some("Economically Disadvantaged".to_string()),
            extras_score: Some(100.0),
            ..academic_profile()
        };
        let result = BandedScoring.score(&profile, &institution()).expect("scoreable");
        assert_eq!(result.match_score, 65);
    }

    #[test]
    fn state_bonus_requires_public_institution() {
        let profile = ApplicantProfile {
            state: Some("CA".to_string()),
            ..academic_profile()
        };
        let mut private = institution();
        private.is_public = Some(false);

        assert_eq!(
            BandedScoring.score(&profile, &institution()).map(|r| r.match_score),
            Some(50)
        );
        assert_eq!(
            BandedScoring.score(&profile, &private).map(|r| r.match_score),
            Some(40)
        );
    }

    #[test]
    fn race_bonus_requires_enrollment_floor() {
        let profile = ApplicantProfile {
            race: Some("Black".to_string()),
            ..academic_profile()
        };
        let mut low_enrollment = institution();
        low_enrollment.demographics.race_hispanic = Some(5.0);

        assert_eq!(
            BandedScoring.score(&profile, &institution()).map(|r| r.match_score),
            Some(45)
        );
        assert_eq!(
            BandedScoring
                .score(&profile, &low_enrollment)
                .map(|r| r.match_score),
            Some(40)
        );
    }

    #[test]
    fn undefined_band_excludes_institution() {
        let mut flat = institution();
        flat.academic_percentiles.gpa =
            PercentileCurve::from_rungs([Some(3.5), None, None, None, Some(3.5)]);
        flat.academic_percentiles.test_score = PercentileCurve::default();

        assert!(BandedScoring.score(&academic_profile(), &flat).is_none());
    }

    #[test]
    fn missing_band_bound_leaves_metric_undefined() {
        let no_floor = PercentileCurve::from_rungs([None, Some(3.2), Some(3.5), None, Some(4.0)]);
        let no_ceiling = PercentileCurve::from_rungs([Some(3.0), None, Some(3.5), Some(3.8), None]);
        assert_eq!(band_position(3.5, &no_floor), None);
        assert_eq!(band_position(3.5, &no_ceiling), None);

        let mut gpa_only = institution();
        gpa_only.academic_percentiles.gpa = no_ceiling;
        let result = BandedScoring
            .score(&academic_profile(), &gpa_only)
            .expect("test score still scoreable");
        assert_eq!(result.gpa_component_score, None);
        assert_eq!(result.test_score_component_score, Some(50));
        assert_eq!(result.match_score, 20);

        gpa_only.academic_percentiles.test_score = no_floor;
        assert!(BandedScoring.score(&academic_profile(), &gpa_only).is_none());
    }

    #[test]
    fn lexicon_matches_substrings_case_insensitively() {
        assert!(is_underrepresented("Native Hawaiian or Other Pacific Islander"));
        assert!(!is_underrepresented("Asian"));
        assert!(is_disadvantaged("DISADVANTAGED"));
        assert!(!is_disadvantaged("Advantaged"));
    }
}
