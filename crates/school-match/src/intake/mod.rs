//! Profile intake, storage seam, and the HTTP surface for matching and catalog lookup.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{validate_submission, ProfileId, StoredProfile, MAX_NAME_LENGTH};
pub use repository::{ProfileRepository, RepositoryError};
pub use router::match_router;
pub use service::{IntakeService, IntakeServiceError};
