//! Shared fixtures for integration tests

#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Router};
use salescast::cli::Config;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Two-tree forest:
/// - tree 1 splits on customers at 500 (3000 / 7000)
/// - tree 2 splits on promo at 0.25 (4000 / 6000)
pub const FOREST_ARTIFACT: &str = r#"{
    "format_version": 1,
    "n_features": 13,
    "estimator": "RandomForestRegressor",
    "params": {"n_estimators": 2, "max_depth": 1},
    "kind": "tree_ensemble",
    "aggregation": "mean",
    "trees": [
        {"nodes": [
            {"feature": 1, "threshold": 500.0, "left": 1, "right": 2},
            {"value": 3000.0},
            {"value": 7000.0}
        ]},
        {"nodes": [
            {"feature": 2, "threshold": 0.25, "left": 1, "right": 2},
            {"value": 4000.0},
            {"value": 6000.0}
        ]}
    ]
}"#;

pub fn linear_artifact(intercept: f64, coefficients: &[f64]) -> String {
    serde_json::json!({
        "format_version": 1,
        "n_features": coefficients.len(),
        "estimator": "LinearRegression",
        "kind": "linear",
        "intercept": intercept,
        "coefficients": coefficients,
    })
    .to_string()
}

/// Serve `body` at `/model.json`; returns the URL and a hit counter
pub async fn serve_artifact(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().route(
        "/model.json",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    );
    (spawn(router).await, hits)
}

/// Serve `body` at `/model.json`, holding every response back by `delay`
pub async fn serve_artifact_after(delay: Duration, body: &'static str) -> String {
    let router = Router::new().route(
        "/model.json",
        get(move || async move {
            tokio::time::sleep(delay).await;
            body
        }),
    );
    spawn(router).await
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/model.json", addr)
}

/// Config pointing the model at `dir/model.json` and `url`
pub fn config_for(dir: &Path, url: &str) -> Config {
    let mut config = Config::default();
    config.model.path = dir.join("model.json").to_string_lossy().into_owned();
    config.model.url = url.to_string();
    config.model.download_timeout_secs = 10;
    config
}

/// URL nothing listens on
pub const DEAD_URL: &str = "http://127.0.0.1:9/model.json";
