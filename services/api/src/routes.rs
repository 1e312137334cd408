use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use school_match::error::AppError;
use school_match::intake::{match_router, IntakeService, ProfileRepository};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn with_match_routes<R>(service: Arc<IntakeService<R>>) -> axum::Router
where
    R: ProfileRepository + 'static,
{
    match_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/reload",
            axum::routing::post(catalog_reload_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound. An empty catalog reports `degraded` but still
/// serves, since profile intake works without it.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    if !ready {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        );
    }

    let institutions = state.catalog.snapshot().len();
    let catalog_loaded = institutions > 0;
    let status = if catalog_loaded { "ready" } else { "degraded" };
    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "catalog_loaded": catalog_loaded,
            "institutions": institutions,
        })),
    )
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Rebuilds the catalog from the configured tables and swaps it in whole.
pub(crate) async fn catalog_reload_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let institutions = state
        .catalog
        .reload(&state.catalog_config)
        .map_err(|err| {
            warn!(error = %err, "catalog reload failed; keeping current catalog");
            AppError::from(err)
        })?;
    Ok(Json(json!({ "status": "reloaded", "institutions": institutions })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryProfileRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use school_match::catalog::{Catalog, CatalogHandle, CatalogLoader};
    use school_match::config::{CatalogConfig, MatchingConfig};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../crates/school-match/data")
    }

    fn state(catalog: Arc<CatalogHandle>, academics: PathBuf, ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            catalog,
            catalog_config: Arc::new(CatalogConfig {
                academics_path: academics,
                demographics_path: None,
            }),
        }
    }

    fn app(state: AppState) -> axum::Router {
        let service = Arc::new(IntakeService::new(
            Arc::new(InMemoryProfileRepository::default()),
            state.catalog.clone(),
            MatchingConfig::default(),
        ));
        with_match_routes(service).layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reports_degraded_until_catalog_loads() {
        let catalog = Arc::new(CatalogHandle::new(Catalog::empty()));
        let app = app(state(catalog, data_dir().join("academics.csv"), true));

        let response = app.clone().oneshot(request("GET", "/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["catalog_loaded"], false);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/v1/catalog/reload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["institutions"], 8);

        let response = app.oneshot(request("GET", "/ready")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["institutions"], 8);
    }

    #[tokio::test]
    async fn readiness_is_unavailable_before_bind() {
        let catalog = Arc::new(CatalogHandle::new(Catalog::empty()));
        let response = app(state(catalog, data_dir().join("academics.csv"), false))
            .oneshot(request("GET", "/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn failed_reload_keeps_current_catalog() {
        let loaded = CatalogHandle::new(
            CatalogLoader::from_paths(data_dir().join("academics.csv"), None).expect("fixture"),
        );
        let catalog = Arc::new(loaded);
        let app = app(state(catalog.clone(), data_dir().join("missing.csv"), true));

        let response = app
            .oneshot(request("POST", "/api/v1/catalog/reload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(catalog.snapshot().len(), 8);
    }

    #[tokio::test]
    async fn health_and_search_share_one_router() {
        let catalog = Arc::new(CatalogHandle::new(
            CatalogLoader::from_paths(data_dir().join("academics.csv"), None).expect("fixture"),
        ));
        let app = app(state(catalog, data_dir().join("academics.csv"), true));

        let response = app.clone().oneshot(request("GET", "/health")).await.unwrap();
        assert_eq!(json_body(response).await["status"], "ok");

        let response = app
            .oneshot(request("GET", "/api/v1/institutions?q=summit"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(
            body["institutions"][0]["institutionId"],
            "Summit College of Medicine"
        );
    }
}
