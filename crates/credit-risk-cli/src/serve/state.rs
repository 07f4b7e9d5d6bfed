use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use credit_risk_core::Predictor;

use super::metrics::ServerMetrics;

/// What the server currently predicts with.
pub enum Snapshot {
    Ready(Arc<Predictor>),
    /// Artifacts could not be loaded; every prediction reports this message.
    Unavailable(String),
}

impl Snapshot {
    pub fn load(preprocessor: &Path, model: &Path) -> Self {
        match Predictor::load(preprocessor, model) {
            Ok(predictor) => Snapshot::Ready(Arc::new(predictor)),
            Err(e) => {
                log::error!("Artifacts unavailable: {}", e);
                Snapshot::Unavailable(e.to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    preprocessor: PathBuf,
    model: PathBuf,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
    metrics: Arc<ServerMetrics>,
}

impl AppState {
    /// Load the artifacts once. The state is built even when loading fails.
    pub fn load(preprocessor: PathBuf, model: PathBuf) -> Self {
        let snapshot = Snapshot::load(&preprocessor, &model);
        Self::with_snapshot(preprocessor, model, snapshot)
    }

    pub fn with_snapshot(preprocessor: PathBuf, model: PathBuf, snapshot: Snapshot) -> Self {
        Self {
            preprocessor,
            model,
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            metrics: Arc::new(ServerMetrics::new()),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Counters survive reloads.
    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }

    /// Re-read both artifacts from disk and swap the snapshot. In-flight
    /// requests keep the snapshot they started with.
    pub fn reload(&self) {
        let fresh = Arc::new(Snapshot::load(&self.preprocessor, &self.model));
        if let Snapshot::Ready(predictor) = fresh.as_ref() {
            log::info!("Reloaded artifacts from run {}", predictor.run_id());
        }
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = fresh;
    }
}
