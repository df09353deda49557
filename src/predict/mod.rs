//! Prediction and sensitivity probes
//!
//! - `predictor`: runs the regressor for a form submission
//! - `probes`: one-field perturbations and their reporting rule
//! - `format`: currency rendering

pub mod format;
pub mod predictor;
pub mod probes;

pub use format::{format_currency, format_delta};
pub use predictor::{PredictionReport, SalesPredictor};
pub use probes::{ProbeResult, ProbeSettings};
