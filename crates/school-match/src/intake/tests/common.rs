use std::collections::HashMap;
use std::io::{Cursor, Empty};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::catalog::{Catalog, CatalogHandle, CatalogLoader};
use crate::config::MatchingConfig;
use crate::intake::domain::{ProfileId, StoredProfile};
use crate::intake::repository::{ProfileRepository, RepositoryError};
use crate::intake::{match_router, IntakeService};

pub(super) const ACADEMICS: &str = "School,GPA P10,GPA P50 (Median),GPA P90,MCAT P10,MCAT P50 (Median),MCAT P90\n\
Harbor Medical School,3.6,3.8,3.95,510,515,520\n\
Prairie State School of Medicine,3.2,3.5,3.8,500,506,512\n\
Summit College of Medicine,3.0,3.3,3.6,495,500,506\n\
Coastal School,n/a,n/a,n/a,,,\n";

pub(super) fn catalog() -> Catalog {
    CatalogLoader::from_readers(Cursor::new(ACADEMICS), None::<Empty>).expect("fixture loads")
}

pub(super) fn settings() -> MatchingConfig {
    MatchingConfig {
        default_limit: 2,
        search_page_size: 2,
        ..MatchingConfig::default()
    }
}

pub(super) fn submission() -> Value {
    json!({
        "name": "Jordan Rivera",
        "undergrad": "UC Berkeley",
        "major": "Biology",
        "cumGPA": "3.6",
        "mcat": "508",
        "demographics": { "state": "CA", "preferredRegions": ["West"] }
    })
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<ProfileId, StoredProfile>>>,
}

impl ProfileRepository for MemoryRepository {
    fn insert(&self, profile: StoredProfile) -> Result<StoredProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<StoredProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ProfileRepository for UnavailableRepository {
    fn insert(&self, _profile: StoredProfile) -> Result<StoredProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn fetch(&self, _id: &ProfileId) -> Result<Option<StoredProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<IntakeService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = Arc::new(IntakeService::new(
        Arc::new(repository.clone()),
        Arc::new(CatalogHandle::new(catalog())),
        settings(),
    ));
    (service, repository)
}

pub(super) fn router() -> axum::Router {
    let (service, _) = build_service();
    match_router(service)
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
