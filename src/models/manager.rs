//! Model store: fetch, load and cache the regressor once per process
//!
//! A failed load is cached as well, so a broken artifact is reported on
//! every request without re-downloading it each time. `reload` clears the
//! cache.

use crate::errors::{Result, SalesError};
use crate::models::client::{FetchOutcome, ModelFetcher, ProgressCallback};
use crate::models::regressor::{build_regressor, Regressor};
use crate::models::types::{ModelArtifact, ModelSummary};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Where the artifact comes from and what it must look like
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Remote location; `None` means local file only
    pub url: Option<String>,
    pub path: PathBuf,
    pub expected_features: usize,
    pub download_timeout: Duration,
}

/// Load state of the store
#[derive(Clone)]
pub enum ModelStatus {
    NotLoaded,
    /// A download or parse is in progress
    Loading,
    Ready(Arc<dyn Regressor>),
    Unavailable(String),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelStatus::NotLoaded => "not_loaded",
            ModelStatus::Loading => "loading",
            ModelStatus::Ready(_) => "ready",
            ModelStatus::Unavailable(_) => "unavailable",
        }
    }
}

impl fmt::Debug for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::NotLoaded => write!(f, "NotLoaded"),
            ModelStatus::Loading => write!(f, "Loading"),
            ModelStatus::Ready(model) => write!(f, "Ready({})", model.summary()),
            ModelStatus::Unavailable(reason) => write!(f, "Unavailable({})", reason),
        }
    }
}

/// Process-wide holder of the loaded regressor
///
/// `status` is only write-locked to publish a state change; `load_lock`
/// serialises the slow download and parse so readers never wait on it.
pub struct ModelStore {
    source: Option<ModelSource>,
    status: RwLock<ModelStatus>,
    load_lock: Mutex<()>,
    telemetry: TelemetryCollector,
}

impl ModelStore {
    /// Store that loads from `source` on first use
    pub fn new(source: ModelSource, telemetry: TelemetryCollector) -> Self {
        Self {
            source: Some(source),
            status: RwLock::new(ModelStatus::NotLoaded),
            load_lock: Mutex::new(()),
            telemetry,
        }
    }

    /// Store around an already-built regressor
    pub fn with_regressor(regressor: Arc<dyn Regressor>, telemetry: TelemetryCollector) -> Self {
        Self {
            source: None,
            status: RwLock::new(ModelStatus::Ready(regressor)),
            load_lock: Mutex::new(()),
            telemetry,
        }
    }

    pub async fn status(&self) -> ModelStatus {
        self.status.read().await.clone()
    }

    /// Loaded regressor, loading it on first call
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn Regressor>> {
        if let Some(model) = self.cached().await? {
            return Ok(model);
        }

        let _guard = self.load_lock.lock().await;
        // another request may have finished loading while we waited
        if let Some(model) = self.cached().await? {
            return Ok(model);
        }
        self.load_and_publish().await
    }

    /// Already-loaded regressor, or the cached failure; `None` if not settled yet
    async fn cached(&self) -> Result<Option<Arc<dyn Regressor>>> {
        match &*self.status.read().await {
            ModelStatus::Ready(model) => Ok(Some(Arc::clone(model))),
            ModelStatus::Unavailable(reason) => Err(SalesError::ModelNotLoaded(reason.clone())),
            ModelStatus::NotLoaded | ModelStatus::Loading => Ok(None),
        }
    }

    /// Caller must hold `load_lock`
    async fn load_and_publish(&self) -> Result<Arc<dyn Regressor>> {
        *self.status.write().await = ModelStatus::Loading;

        let started = Instant::now();
        let result = self.load(None).await;
        let mut status = self.status.write().await;
        match result {
            Ok(model) => {
                log::info!("Model loaded: {}", model.summary());
                self.telemetry.record(TelemetryEvent::ModelLoaded {
                    duration_ms: started.elapsed().as_millis() as u64,
                    timestamp: Instant::now(),
                });
                *status = ModelStatus::Ready(Arc::clone(&model));
                Ok(model)
            }
            Err(e) => {
                let reason = e.to_string();
                log::error!("Error loading model: {}", reason);
                self.telemetry.record(TelemetryEvent::ModelLoadFailed {
                    reason: reason.clone(),
                    timestamp: Instant::now(),
                });
                *status = ModelStatus::Unavailable(reason.clone());
                Err(SalesError::ModelNotLoaded(reason))
            }
        }
    }

    /// Regressor if loaded, without triggering a load
    pub async fn current(&self) -> Option<Arc<dyn Regressor>> {
        match &*self.status.read().await {
            ModelStatus::Ready(model) => Some(Arc::clone(model)),
            _ => None,
        }
    }

    /// Drop the cached model (or failure) and load again
    pub async fn reload(&self) -> Result<Arc<dyn Regressor>> {
        if self.source.is_none() {
            return self
                .current()
                .await
                .ok_or_else(|| SalesError::ModelNotLoaded("no model source configured".to_string()));
        }
        let _guard = self.load_lock.lock().await;
        self.load_and_publish().await
    }

    /// Download (when a URL is configured) and read the artifact
    pub async fn fetch_and_parse(&self, progress: Option<ProgressCallback>) -> Result<ModelArtifact> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| SalesError::ModelNotLoaded("no model source configured".to_string()))?;

        if let Some(url) = &source.url {
            let fetcher = ModelFetcher::new(source.download_timeout)?;
            if let FetchOutcome::Downloaded { bytes } =
                fetcher.download_if_needed(url, &source.path, false, progress).await?
            {
                self.telemetry.record(TelemetryEvent::ModelDownloaded {
                    bytes,
                    timestamp: Instant::now(),
                });
            }
        } else if !source.path.exists() {
            return Err(SalesError::ModelNotLoaded(format!(
                "model file {} not found and no download URL configured",
                source.path.display()
            )));
        }

        let text = tokio::fs::read_to_string(&source.path).await?;
        let artifact = ModelArtifact::from_json(&text)?;
        if artifact.n_features != source.expected_features {
            // "expected" is what the model was fitted on, "actual" what the form builds
            return Err(SalesError::FeatureMismatch {
                expected: artifact.n_features,
                actual: source.expected_features,
            });
        }
        Ok(artifact)
    }

    async fn load(&self, progress: Option<ProgressCallback>) -> Result<Arc<dyn Regressor>> {
        let artifact = self.fetch_and_parse(progress).await?;
        build_regressor(&artifact)
    }

    /// Summary of the loaded model, if any
    pub async fn summary(&self) -> Option<ModelSummary> {
        self.current().await.map(|model| model.summary())
    }
}
