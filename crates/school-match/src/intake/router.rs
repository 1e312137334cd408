use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::ProfileId;
use super::repository::ProfileRepository;
use super::service::IntakeService;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LimitQuery {
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub(crate) q: Option<String>,
}

/// Router builder exposing profile intake, matching, and catalog lookup endpoints.
pub fn match_router<R>(service: Arc<IntakeService<R>>) -> Router
where
    R: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/profiles", post(submit_handler::<R>))
        .route("/api/v1/profiles/:profile_id", get(profile_handler::<R>))
        .route(
            "/api/v1/profiles/:profile_id/matches",
            get(profile_matches_handler::<R>),
        )
        .route("/api/v1/matches", post(rank_handler::<R>))
        .route("/api/v1/institutions", get(search_handler::<R>))
        .route(
            "/api/v1/institutions/:institution_id",
            get(institution_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError>
where
    R: ProfileRepository + 'static,
{
    let profile = service.submit(payload)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": profile.id }))).into_response())
}

pub(crate) async fn profile_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Path(profile_id): Path<String>,
) -> Result<Json<Value>, AppError>
where
    R: ProfileRepository + 'static,
{
    let profile = service.get(&ProfileId(profile_id))?;
    Ok(Json(json!({ "profile": profile })))
}

pub(crate) async fn profile_matches_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Path(profile_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, AppError>
where
    R: ProfileRepository + 'static,
{
    let matches = service.matches_for(&ProfileId(profile_id), query.limit)?;
    Ok(Json(json!({ "scorer": service.scorer_name(), "matches": matches })))
}

pub(crate) async fn rank_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Query(query): Query<LimitQuery>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError>
where
    R: ProfileRepository + 'static,
{
    let matches = service.rank(&payload, query.limit)?;
    Ok(Json(json!({ "scorer": service.scorer_name(), "matches": matches })))
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let results = service.search(query.q.as_deref().unwrap_or_default());
    (StatusCode::OK, Json(json!({ "institutions": results }))).into_response()
}

pub(crate) async fn institution_handler<R>(
    State(service): State<Arc<IntakeService<R>>>,
    Path(institution_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    match service.find(&institution_id) {
        Some(institution) => {
            (StatusCode::OK, Json(json!({ "institution": institution }))).into_response()
        }
        None => {
            let payload = json!({
                "error": "institution not found",
                "institution_id": institution_id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}
