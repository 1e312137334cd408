use metrics_exporter_prometheus::PrometheusHandle;
use school_match::catalog::CatalogHandle;
use school_match::config::CatalogConfig;
use school_match::intake::{ProfileId, ProfileRepository, RepositoryError, StoredProfile};
use school_match::matching::ScoringStrategy;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<CatalogHandle>,
    pub(crate) catalog_config: Arc<CatalogConfig>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    records: Arc<Mutex<HashMap<ProfileId, StoredProfile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn insert(&self, profile: StoredProfile) -> Result<StoredProfile, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("profile store poisoned".to_string()))?;
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<StoredProfile>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("profile store poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }
}

pub(crate) fn parse_strategy(raw: &str) -> Result<ScoringStrategy, String> {
    ScoringStrategy::parse(raw)
        .ok_or_else(|| format!("unknown strategy '{raw}' (expected interpolation or banded)"))
}
