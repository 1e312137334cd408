use serde::Serialize;

/// Percentile rungs every academic column set is published at.
pub const PERCENTILE_RUNGS: [u8; 5] = [10, 25, 50, 75, 90];

/// One `(percentile, value)` sample of a distribution. `value` is `None` when the
/// source cell could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentilePoint {
    pub percentile: u8,
    pub value: Option<f64>,
}

/// Percentile samples for one metric, always ordered ascending by percentile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PercentileCurve {
    points: Vec<PercentilePoint>,
}

impl PercentileCurve {
    pub fn new(mut points: Vec<PercentilePoint>) -> Self {
        points.sort_by_key(|point| point.percentile);
        Self { points }
    }

    /// Builds a curve from values aligned with [`PERCENTILE_RUNGS`].
    pub fn from_rungs(values: [Option<f64>; 5]) -> Self {
        Self::new(
            PERCENTILE_RUNGS
                .iter()
                .zip(values)
                .map(|(percentile, value)| PercentilePoint {
                    percentile: *percentile,
                    value,
                })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PercentilePoint] {
        &self.points
    }

    /// Points carrying a finite value, as `(percentile, value)` pairs.
    pub fn valid_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|point| match point.value {
                Some(value) if value.is_finite() => Some((f64::from(point.percentile), value)),
                _ => None,
            })
            .collect()
    }

    pub fn value_at(&self, percentile: u8) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.percentile == percentile)
            .and_then(|point| point.value)
            .filter(|value| value.is_finite())
    }

    pub fn is_empty(&self) -> bool {
        self.valid_points().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcademicPercentiles {
    pub gpa: PercentileCurve,
    #[serde(rename = "testScore")]
    pub test_score: PercentileCurve,
}

/// Incoming-class composition. Every field is optional because the demographic
/// table is optional and sparsely populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub race_hispanic: Option<f64>,
    pub race_black: Option<f64>,
    pub race_asian: Option<f64>,
    pub race_white: Option<f64>,
    pub race_other: Option<f64>,
    pub gender_women: Option<f64>,
    pub gender_men: Option<f64>,
    pub ses_disadvantaged: Option<f64>,
    pub ses_advantaged: Option<f64>,
    pub applicants: Option<f64>,
    pub interviewed: Option<f64>,
    pub accepted: Option<f64>,
}

impl Demographics {
    /// Summed under-represented enrollment share, `None` when no component is known.
    pub fn underrepresented_percent(&self) -> Option<f64> {
        let known: Vec<f64> = [self.race_hispanic, self.race_black, self.race_other]
            .into_iter()
            .flatten()
            .filter(|value| value.is_finite())
            .collect();
        if known.is_empty() {
            None
        } else {
            Some(known.iter().sum())
        }
    }
}

/// A cataloged institution. Built once by the loader and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionRecord {
    pub institution_id: String,
    pub name: String,
    #[serde(skip)]
    pub normalized_name: String,
    pub academic_percentiles: AcademicPercentiles,
    /// Display only; `0.0` when the source had no median.
    pub gpa_median: f64,
    /// Display only; `0.0` when the source had no median.
    pub test_score_median: f64,
    pub state: Option<String>,
    pub region: Option<String>,
    pub is_public: Option<bool>,
    pub demographics: Demographics,
}
