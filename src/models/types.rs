//! Serialized model artifact
//!
//! The artifact is a JSON export of a fitted scikit-learn style regressor.
//! Two estimator families are understood: linear models (intercept plus
//! coefficients) and tree ensembles (random forests average their trees,
//! boosted ensembles sum them on top of a base score).

use crate::errors::{Result, SalesError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Artifact schema version this build understands
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Top-level artifact document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,

    /// Width of the input row the estimator was fitted on
    pub n_features: usize,

    /// Training column names, if the exporter recorded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,

    /// Estimator class name (e.g. "RandomForestRegressor")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimator: Option<String>,

    /// Hyper-parameters as exported, shown by the debug tools
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,

    #[serde(flatten)]
    pub model: ModelSpec,
}

/// Estimator body, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeSpec>,
    },
}

/// How tree outputs combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Bagged ensembles (random forest, extra trees)
    #[default]
    Mean,
    /// Boosted ensembles; learning rate is already folded into leaf values
    Sum,
}

/// One decision tree as a flat node array rooted at index 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

/// Tree node; split rows with `x[feature] <= threshold` go left
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    /// Parse and validate an artifact from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text)
            .map_err(|e| SalesError::ModelFormat(format!("not a model artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, parse and validate an artifact file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Structural checks; a validated artifact always evaluates to a finite
    /// number for finite input of the right width
    pub fn validate(&self) -> Result<()> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(SalesError::ModelFormat(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }
        if self.n_features == 0 {
            return Err(SalesError::ModelFormat("n_features must be at least 1".to_string()));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(SalesError::ModelFormat(format!(
                    "{} feature names for {} features",
                    names.len(),
                    self.n_features
                )));
            }
        }

        match &self.model {
            ModelSpec::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != self.n_features {
                    return Err(SalesError::ModelFormat(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        self.n_features
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(SalesError::ModelFormat("non-finite linear weight".to_string()));
                }
            }
            ModelSpec::TreeEnsemble {
                base_score, trees, ..
            } => {
                if trees.is_empty() {
                    return Err(SalesError::ModelFormat("tree ensemble has no trees".to_string()));
                }
                if !base_score.is_finite() {
                    return Err(SalesError::ModelFormat("non-finite base_score".to_string()));
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(self.n_features)
                        .map_err(|reason| SalesError::ModelFormat(format!("tree {}: {}", index, reason)))?;
                }
            }
        }
        Ok(())
    }

    /// Short name for the estimator family
    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::Linear { .. } => "linear",
            ModelSpec::TreeEnsemble { .. } => "tree_ensemble",
        }
    }
}

impl TreeSpec {
    /// Children must point forward so every path reaches a leaf
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                NodeSpec::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            index, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", index));
                    }
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", index, child));
                        }
                    }
                }
                NodeSpec::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", index));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Human-oriented description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub kind: String,
    pub estimator: Option<String>,
    pub n_features: usize,
    pub n_trees: Option<usize>,
    pub params: Vec<(String, String)>,
}

impl ModelSummary {
    pub fn from_artifact(artifact: &ModelArtifact) -> Self {
        let n_trees = match &artifact.model {
            ModelSpec::TreeEnsemble { trees, .. } => Some(trees.len()),
            ModelSpec::Linear { .. } => None,
        };
        Self {
            kind: artifact.kind().to_string(),
            estimator: artifact.estimator.clone(),
            n_features: artifact.n_features,
            n_trees,
            params: artifact
                .params
                .iter()
                .map(|(k, v)| (k.clone(), render_param(v)))
                .collect(),
        }
    }

    /// Parameter listing, or a note when the export carried none
    pub fn params_display(&self) -> String {
        if self.params.is_empty() {
            return "No parameters recorded".to_string();
        }
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn render_param(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} features",
            self.estimator.as_deref().unwrap_or(&self.kind),
            self.n_features
        )?;
        if let Some(trees) = self.n_trees {
            write!(f, ", {} trees", trees)?;
        }
        write!(f, ")")
    }
}
