//! Prediction service shared by the CLI and the web UI

use crate::errors::Result;
use crate::features::{FeatureVector, StoreInputs};
use crate::models::{ModelStore, Regressor};
use crate::predict::probes::{perturb, plan_probes, significant, ProbeResult, ProbeSettings};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Prediction plus the probes that moved it
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub prediction: f64,
    pub features: FeatureVector,
    pub probes: Vec<ProbeResult>,
}

/// Runs the regressor held by a [`ModelStore`]
#[derive(Clone)]
pub struct SalesPredictor {
    store: Arc<ModelStore>,
    settings: ProbeSettings,
    telemetry: TelemetryCollector,
}

impl SalesPredictor {
    pub fn new(store: Arc<ModelStore>, settings: ProbeSettings, telemetry: TelemetryCollector) -> Self {
        Self {
            store,
            settings,
            telemetry,
        }
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Predicted daily sales for one feature row
    pub async fn predict_sales(&self, features: &FeatureVector) -> Result<f64> {
        let model = match self.store.ensure_loaded().await {
            Ok(model) => model,
            Err(e) => {
                self.telemetry.prediction_failed(e.to_string());
                return Err(e);
            }
        };
        self.predict_with(model.as_ref(), features)
    }

    fn predict_with(&self, model: &dyn Regressor, features: &FeatureVector) -> Result<f64> {
        match model.predict(features.as_slice()) {
            Ok(value) => {
                self.telemetry.prediction_served();
                Ok(value)
            }
            Err(e) => {
                log::warn!("Prediction failed: {}", e);
                self.telemetry.prediction_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate inputs, predict, then run the sensitivity probes
    pub async fn predict_with_probes(&self, inputs: &StoreInputs) -> Result<PredictionReport> {
        inputs.validate()?;
        let features = FeatureVector::from_inputs(inputs);
        let model = self.store.ensure_loaded().await.map_err(|e| {
            self.telemetry.prediction_failed(e.to_string());
            e
        })?;
        let prediction = self.predict_with(model.as_ref(), &features)?;
        log::debug!("Predicted {:.2} for {}", prediction, features);

        let mut probes = Vec::new();
        for probe in plan_probes(inputs, &self.settings) {
            let probed = perturb(&features, &probe);
            let outcome = match self.predict_with(model.as_ref(), &probed) {
                Ok(value) => significant(&probe, prediction, value, self.settings.min_delta),
                Err(e) => {
                    log::warn!("Probe '{}' skipped: {}", probe.label, e);
                    None
                }
            };
            self.telemetry.record(TelemetryEvent::ProbeEvaluated {
                label: probe.label.clone(),
                reported: outcome.is_some(),
                timestamp: Instant::now(),
            });
            probes.extend(outcome);
        }

        Ok(PredictionReport {
            prediction,
            features,
            probes,
        })
    }
}
