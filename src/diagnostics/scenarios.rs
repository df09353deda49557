//! Fixed-scenario model check
//!
//! Runs a handful of hand-picked rows and flags a model whose output never
//! changes, the usual symptom of a broken export or a mis-trained estimator.

use crate::errors::Result;
use crate::features::vector::{CUSTOMERS, DAY_OF_WEEK, PROMO, STORE_TYPE_B};
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::models::{ModelSummary, Regressor};
use serde::Serialize;

/// Monday, no customers, no promotion, January 1st, store type a, assortment a
pub const REFERENCE_ROW: [f64; FEATURE_COUNT] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];

/// Likely reasons for a model that predicts the same value everywhere
pub const CONSTANT_PREDICTION_CAUSES: [&str; 4] = [
    "Model was trained on a very small dataset",
    "Model is overfitting to a single value",
    "Feature scaling issues",
    "Model type issue (e.g., using a classifier instead of regressor)",
];

/// Named input row
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub prediction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Every scenario produced this value
    Constant { value: f64 },
    Varies { min: f64, max: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelCheck {
    pub outcomes: Vec<ScenarioOutcome>,
    pub verdict: Verdict,
    pub summary: ModelSummary,
}

impl ModelCheck {
    pub fn is_constant(&self) -> bool {
        matches!(self.verdict, Verdict::Constant { .. })
    }
}

pub fn reference_vector() -> FeatureVector {
    FeatureVector::new(REFERENCE_ROW)
}

/// The five standard scenarios
pub fn standard_scenarios() -> Vec<Scenario> {
    let base = reference_vector();
    vec![
        Scenario {
            name: "Default values",
            features: base,
        },
        Scenario {
            name: "High customers (1000)",
            features: base.with(CUSTOMERS, 1000.0),
        },
        Scenario {
            name: "With promo (50%)",
            features: base.with(PROMO, 0.5),
        },
        Scenario {
            name: "Store type b",
            features: base.with(STORE_TYPE_B, 1.0),
        },
        Scenario {
            name: "Weekend with 500 customers",
            features: base.with(DAY_OF_WEEK, 7.0).with(CUSTOMERS, 500.0),
        },
    ]
}

/// Classify a set of predictions
pub fn classify(predictions: &[f64]) -> Option<Verdict> {
    let first = *predictions.first()?;
    if predictions.iter().all(|p| *p == first) {
        return Some(Verdict::Constant { value: first });
    }
    let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
    let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Verdict::Varies { min, max })
}

/// Run the standard scenarios against a model
pub fn check_model(model: &dyn Regressor) -> Result<ModelCheck> {
    let mut outcomes = Vec::new();
    for scenario in standard_scenarios() {
        let prediction = model.predict(scenario.features.as_slice())?;
        log::debug!("{} -> {}", scenario.name, prediction);
        outcomes.push(ScenarioOutcome {
            name: scenario.name,
            prediction,
        });
    }

    let predictions: Vec<f64> = outcomes.iter().map(|o| o.prediction).collect();
    let verdict = classify(&predictions).unwrap_or(Verdict::Constant { value: f64::NAN });

    Ok(ModelCheck {
        outcomes,
        verdict,
        summary: model.summary(),
    })
}
