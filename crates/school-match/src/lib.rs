//! Admissions fit scoring: an institution catalog built from CSV tables, a
//! loosely-typed applicant profile normalizer, and the match engine that ranks one
//! against the other.

pub mod catalog;
pub mod config;
pub mod error;
pub mod intake;
pub mod matching;
pub mod profile;
pub mod telemetry;

use std::path::Path;

use catalog::{Catalog, CatalogLoadError, CatalogLoader, InstitutionRecord};
use matching::{MatchResult, PercentileInterpolation};
use profile::ApplicantProfile;

pub use profile::normalize as normalize_profile;

/// Loads the academic table and, when given, the positionally paired demographic table.
pub fn load_catalog<P: AsRef<Path>>(
    academics: P,
    demographics: Option<P>,
) -> Result<Catalog, CatalogLoadError> {
    CatalogLoader::from_paths(academics, demographics)
}

/// Uncapped search; callers page the result.
pub fn search_catalog<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a InstitutionRecord> {
    catalog.search(query)
}

pub fn find_by_id<'a>(catalog: &'a Catalog, id: &str) -> Option<&'a InstitutionRecord> {
    catalog.find_by_id(id)
}

/// Ranks with the default percentile interpolation scorer.
pub fn rank_matches(
    profile: &ApplicantProfile,
    institutions: &[InstitutionRecord],
    limit: usize,
) -> Vec<MatchResult> {
    matching::rank_matches(&PercentileInterpolation, profile, institutions, limit)
}
