use bto_core::allocation::{Catalog, SnapshotError, SnapshotSink};
use bto_core::catalog::write_catalog;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot sink backed by a JSON file on disk. The engine calls it after
/// every successful command, so the file always holds the latest catalog.
pub(crate) struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotSink for FileSnapshotStore {
    fn persist(&self, catalog: &Catalog) -> Result<(), SnapshotError> {
        write_catalog(&self.path, catalog)
            .map_err(|err| SnapshotError::Unavailable(err.to_string()))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
