//! Sensitivity probes
//!
//! Each probe re-runs the model with a single feature nudged and reports the
//! change against the base prediction. Probes only fire for inputs below the
//! probe target, and only changes larger than `min_delta` are reported.

use crate::features::vector::{COMPETITION_DISTANCE, CUSTOMERS, PROMO};
use crate::features::{FeatureVector, StoreInputs};
use crate::predict::format::{format_currency, format_delta};
use serde::{Deserialize, Serialize};

/// Probe targets and reporting threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub customers_target: u32,
    pub competition_target: u32,
    /// Promo fraction (0-1) tried when no promotion is set
    pub promo_target: f64,
    pub min_delta: f64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            customers_target: 1000,
            competition_target: 1000,
            promo_target: 0.5,
            min_delta: 1.0,
        }
    }
}

/// One perturbation to try
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub label: String,
    pub feature: usize,
    pub value: f64,
}

/// A probe whose effect cleared the reporting threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub label: String,
    pub value: f64,
    pub delta: f64,
}

impl ProbeResult {
    /// `More customers (1000): $6,100.00 ($+850.00)`
    pub fn describe(&self) -> String {
        format!(
            "{}: {} ({})",
            self.label,
            format_currency(self.value),
            format_delta(self.delta)
        )
    }
}

/// Probes applicable to these inputs, in display order
pub fn plan_probes(inputs: &StoreInputs, settings: &ProbeSettings) -> Vec<Probe> {
    let mut probes = Vec::new();

    if inputs.customers < settings.customers_target {
        probes.push(Probe {
            label: format!("More customers ({})", settings.customers_target),
            feature: CUSTOMERS,
            value: f64::from(settings.customers_target),
        });
    }

    if inputs.competition_distance < settings.competition_target {
        probes.push(Probe {
            label: format!("More competition ({}km)", settings.competition_target),
            feature: COMPETITION_DISTANCE,
            value: f64::from(settings.competition_target),
        });
    }

    if inputs.promo_percent == 0 {
        probes.push(Probe {
            label: format!("With {}% promo", (settings.promo_target * 100.0).round()),
            feature: PROMO,
            value: settings.promo_target,
        });
    }

    probes
}

/// Keep a probe outcome only if it moved the prediction enough
pub fn significant(probe: &Probe, base: f64, value: f64, min_delta: f64) -> Option<ProbeResult> {
    let delta = value - base;
    (delta.abs() > min_delta).then(|| ProbeResult {
        label: probe.label.clone(),
        value,
        delta,
    })
}

/// Apply a probe to the base vector
pub fn perturb(base: &FeatureVector, probe: &Probe) -> FeatureVector {
    base.with(probe.feature, probe.value)
}
