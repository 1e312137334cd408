use crate::profile::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const MAX_NAME_LENGTH: usize = 200;

/// Server-assigned profile identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A saved intake form. The payload is kept as submitted so later normalizer
/// changes apply to old profiles too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub id: ProfileId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Checks the intake form envelope and strips server-owned keys. Scoring fields are
/// not checked here; they stay loosely typed until matching.
pub fn validate_submission(raw: Value) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(mut payload) = raw else {
        return Err(ValidationError::NotAnObject);
    };

    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    payload.remove("id");
    payload.remove("createdAt");
    Ok(payload)
}
