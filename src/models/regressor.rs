//! The regressor seam
//!
//! Everything outside this module treats the model as an opaque
//! `predict(row) -> scalar` function. The concrete evaluators below only
//! replay what the exported estimator already learned.

use crate::errors::{Result, SalesError};
use crate::models::types::{Aggregation, ModelArtifact, ModelSpec, ModelSummary, NodeSpec};
use std::sync::Arc;

/// A fitted single-output regression model
pub trait Regressor: Send + Sync {
    /// Width of the input row
    fn n_features(&self) -> usize;

    /// Evaluate one row whose width has already been checked
    fn predict_row(&self, row: &[f64]) -> f64;

    /// Description for debug output
    fn summary(&self) -> ModelSummary;

    /// Predict a single row
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features() {
            return Err(SalesError::FeatureMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        Ok(self.predict_row(features))
    }
}

/// Intercept plus weighted sum
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Vec<f64>,
    summary: ModelSummary,
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn summary(&self) -> ModelSummary {
        self.summary.clone()
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Bagged or boosted decision trees
#[derive(Debug, Clone)]
pub struct TreeEnsembleRegressor {
    n_features: usize,
    aggregation: Aggregation,
    base_score: f64,
    trees: Vec<Tree>,
    summary: ModelSummary,
}

impl Regressor for TreeEnsembleRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.evaluate(row)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        self.base_score + combined
    }

    fn summary(&self) -> ModelSummary {
        self.summary.clone()
    }
}

/// Turn a validated artifact into an evaluator
pub fn build_regressor(artifact: &ModelArtifact) -> Result<Arc<dyn Regressor>> {
    artifact.validate()?;
    let summary = ModelSummary::from_artifact(artifact);

    let regressor: Arc<dyn Regressor> = match &artifact.model {
        ModelSpec::Linear {
            intercept,
            coefficients,
        } => Arc::new(LinearRegressor {
            intercept: *intercept,
            coefficients: coefficients.clone(),
            summary,
        }),
        ModelSpec::TreeEnsemble {
            aggregation,
            base_score,
            trees,
        } => Arc::new(TreeEnsembleRegressor {
            n_features: artifact.n_features,
            aggregation: *aggregation,
            base_score: *base_score,
            trees: trees
                .iter()
                .map(|tree| Tree {
                    nodes: tree
                        .nodes
                        .iter()
                        .map(|node| match *node {
                            NodeSpec::Split {
                                feature,
                                threshold,
                                left,
                                right,
                            } => Node::Split {
                                feature,
                                threshold,
                                left,
                                right,
                            },
                            NodeSpec::Leaf { value } => Node::Leaf(value),
                        })
                        .collect(),
                })
                .collect(),
            summary,
        }),
    };
    Ok(regressor)
}
