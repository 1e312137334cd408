use super::domain::{ProfileId, StoredProfile};

/// Storage abstraction for saved profiles; durability is the implementor's concern.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, profile: StoredProfile) -> Result<StoredProfile, RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<StoredProfile>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
