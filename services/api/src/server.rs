use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryProfileRepository};
use crate::routes::with_match_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use school_match::catalog::{Catalog, CatalogHandle, CatalogLoader};
use school_match::config::AppConfig;
use school_match::error::AppError;
use school_match::intake::IntakeService;
use school_match::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = match CatalogLoader::from_config(&config.catalog) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!(error = %err, "institution catalog failed to load; serving an empty catalog");
            Catalog::empty()
        }
    };
    let catalog = Arc::new(CatalogHandle::new(catalog));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
        catalog_config: Arc::new(config.catalog.clone()),
    };

    let repository = Arc::new(InMemoryProfileRepository::default());
    let service = Arc::new(IntakeService::new(
        repository,
        catalog,
        config.matching.clone(),
    ));
    let scorer = service.scorer_name();

    let app = with_match_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, scorer, "school match service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
