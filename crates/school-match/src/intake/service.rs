use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::domain::{validate_submission, ProfileId, StoredProfile};
use super::repository::{ProfileRepository, RepositoryError};
use crate::catalog::{CatalogHandle, InstitutionRecord};
use crate::config::MatchingConfig;
use crate::matching::{rank_matches, MatchResult, MatchScorer};
use crate::profile::{normalize, ValidationError};

/// Service composing profile storage, the shared catalog, and the selected scorer.
pub struct IntakeService<R> {
    repository: Arc<R>,
    catalog: Arc<CatalogHandle>,
    scorer: Arc<dyn MatchScorer>,
    settings: MatchingConfig,
}

static PROFILE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_profile_id() -> ProfileId {
    let id = PROFILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProfileId(format!("profile-{id:06}"))
}

impl<R> IntakeService<R>
where
    R: ProfileRepository + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<CatalogHandle>, settings: MatchingConfig) -> Self {
        let scorer = settings.strategy.scorer();
        Self::with_scorer(repository, catalog, scorer, settings)
    }

    pub fn with_scorer(
        repository: Arc<R>,
        catalog: Arc<CatalogHandle>,
        scorer: Arc<dyn MatchScorer>,
        settings: MatchingConfig,
    ) -> Self {
        Self {
            repository,
            catalog,
            scorer,
            settings,
        }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Validate and store a raw intake payload.
    pub fn submit(&self, raw: Value) -> Result<StoredProfile, IntakeServiceError> {
        let payload = validate_submission(raw)?;
        let profile = StoredProfile {
            id: next_profile_id(),
            created_at: Utc::now(),
            payload,
        };

        let stored = self.repository.insert(profile)?;
        debug!(profile_id = %stored.id, "profile stored");
        Ok(stored)
    }

    pub fn get(&self, id: &ProfileId) -> Result<StoredProfile, IntakeServiceError> {
        let profile = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(profile)
    }

    /// Rank the catalog for an unsaved payload. A zero or missing limit falls back to
    /// the configured default.
    pub fn rank(
        &self,
        raw: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>, IntakeServiceError> {
        let profile = normalize(raw);
        profile.ensure_scoreable()?;

        let limit = limit
            .filter(|limit| *limit > 0)
            .unwrap_or(self.settings.default_limit);
        let catalog = self.catalog.snapshot();
        let matches = rank_matches(self.scorer.as_ref(), &profile, catalog.list(), limit);
        debug!(
            scorer = self.scorer.name(),
            institutions = catalog.len(),
            returned = matches.len(),
            "ranked catalog"
        );
        Ok(matches)
    }

    /// Rank the catalog for a stored profile.
    pub fn matches_for(
        &self,
        id: &ProfileId,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>, IntakeServiceError> {
        let stored = self.get(id)?;
        self.rank(&Value::Object(stored.payload), limit)
    }

    /// Search results capped at the configured page size.
    pub fn search(&self, query: &str) -> Vec<InstitutionRecord> {
        let catalog = self.catalog.snapshot();
        catalog
            .search(query)
            .into_iter()
            .take(self.settings.search_page_size)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<InstitutionRecord> {
        self.catalog.snapshot().find_by_id(id).cloned()
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
