use crate::cli::ServeArgs;
use crate::infra::{AppState, FileSnapshotStore};
use crate::routes::with_allocation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use bto_core::allocation::AllocationEngine;
use bto_core::catalog::{read_catalog, CatalogSeeds};
use bto_core::config::AppConfig;
use bto_core::error::AppError;
use bto_core::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Resume from the last snapshot when one exists; otherwise seed the
    // catalog from the CSV files.
    let catalog = match read_catalog(&config.catalog.snapshot_path)? {
        Some(catalog) => {
            info!(path = %config.catalog.snapshot_path.display(), "resuming from catalog snapshot");
            catalog
        }
        None => {
            info!(
                users = %config.catalog.users_csv.display(),
                projects = %config.catalog.projects_csv.display(),
                "seeding catalog from CSV files"
            );
            CatalogSeeds::from_paths(&config.catalog.users_csv, &config.catalog.projects_csv)?
        }
    };

    let sink = Arc::new(FileSnapshotStore::new(config.catalog.snapshot_path.clone()));
    let engine = Arc::new(Mutex::new(AllocationEngine::new(catalog, sink)));

    let app = with_allocation_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "bto allocation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
