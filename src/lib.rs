//! salescast - Rossmann daily sales prediction
//!
//! A thin serving and debugging layer over a pre-trained regression model.
//!
//! # Architecture
//!
//! - **models**: artifact download, parsing and load-once caching
//! - **features**: form inputs and the fixed 13-column feature vector
//! - **predict**: predictions plus one-field sensitivity probes
//! - **diagnostics** / **doctor**: offline checks of the model and deployment
//! - **web**: server-rendered pages and a small JSON API

pub mod errors;
pub mod features;
pub mod models;
pub mod predict;

// Re-export commonly used types
pub use errors::{Result, SalesError};
pub use features::{FeatureVector, StoreInputs};
pub use predict::{PredictionReport, SalesPredictor};

// Operator tooling
pub mod cli;
pub mod diagnostics;
pub mod doctor;
pub mod telemetry;

// Browser UI
pub mod web;

/// Crate version reported by `/api/health`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
