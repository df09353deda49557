//! Model artifact handling
//!
//! This module covers everything between the object-storage bucket and a
//! callable regressor:
//! - Artifact format and validation (`types`)
//! - The `Regressor` seam and its evaluators (`regressor`)
//! - Streaming download of the artifact (`client`)
//! - Load-once caching of the regressor (`manager`)

pub mod client;
pub mod manager;
pub mod regressor;
pub mod types;

// Re-export key types for convenience
pub use client::{DownloadProgress, FetchOutcome, ModelFetcher, ProgressCallback, DEFAULT_MODEL_URL};
pub use manager::{ModelSource, ModelStatus, ModelStore};
pub use regressor::{build_regressor, Regressor};
pub use types::{ModelArtifact, ModelSummary};
