//! Browser UI and JSON API
//!
//! Pages are rendered server-side; the JSON routes expose the same
//! prediction path for scripts and health probes.

pub mod handlers;
pub mod pages;

use crate::cli::Config;
use crate::predict::SalesPredictor;
use crate::telemetry::TelemetryCollector;
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: SalesPredictor,
    pub telemetry: TelemetryCollector,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(predictor: SalesPredictor, telemetry: TelemetryCollector, config: Config) -> Self {
        Self {
            predictor,
            telemetry,
            config: Arc::new(config),
        }
    }
}

/// One log line per request
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(handlers::home_handler))
        .route("/predict", get(handlers::predict_page_handler))
        .route("/about", get(handlers::about_handler))
        .route("/analysis", get(handlers::analysis_handler))
        // JSON API
        .route("/api/predict", post(handlers::api_predict_handler))
        .route("/api/health", get(handlers::health_handler))
        .route("/api/reload", post(handlers::reload_handler))
        .layer(cors)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_regressor, ModelArtifact, ModelSource, ModelStore};
    use crate::predict::ProbeSettings;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Sales = 1500 + 4*customers
    fn ready_state() -> AppState {
        let text = r#"{"format_version": 1, "n_features": 13, "kind": "linear",
            "intercept": 1500,
            "coefficients": [0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]}"#;
        let model = build_regressor(&ModelArtifact::from_json(text).unwrap()).unwrap();
        let telemetry = TelemetryCollector::new();
        let store = Arc::new(ModelStore::with_regressor(model, telemetry.clone()));
        let predictor = SalesPredictor::new(store, ProbeSettings::default(), telemetry.clone());
        AppState::new(predictor, telemetry, Config::default())
    }

    fn missing_model_state(dir: &std::path::Path) -> AppState {
        let telemetry = TelemetryCollector::new();
        let source = ModelSource {
            url: None,
            path: dir.join("absent.json"),
            expected_features: 13,
            download_timeout: Duration::from_secs(1),
        };
        let store = Arc::new(ModelStore::new(source, telemetry.clone()));
        let predictor = SalesPredictor::new(store, ProbeSettings::default(), telemetry.clone());
        AppState::new(predictor, telemetry, Config::default())
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_home_page() {
        let response = create_router(ready_state())
            .oneshot(get_request("/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Rossmann Sales Prediction"));
        assert!(html.contains("Predict Sales"));
    }

    #[tokio::test]
    async fn test_predict_page_shows_result_and_probes() {
        let response = create_router(ready_state())
            .oneshot(get_request(
                "/predict?day_of_week=2&customers=250&store_type=a&assortment=a&promo=0&competition_distance=0&month=5&day=7",
            ))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Predicted Sales: $2,500.00"));
        assert!(html.contains("More customers (1000): $5,500.00 ($+3,000.00)"));
        assert!(!html.contains("More competition"));
        assert!(!html.contains("With 50% promo"));
    }

    #[tokio::test]
    async fn test_predict_page_invalid_input() {
        let response = create_router(ready_state())
            .oneshot(get_request("/predict?month=14"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Invalid input for month"));
        assert!(!html.contains("Predicted Sales:"));
    }

    #[tokio::test]
    async fn test_static_pages() {
        for (uri, needle) in [("/about", "About This Project"), ("/analysis", "Read the full article")] {
            let response = create_router(ready_state())
                .oneshot(get_request(uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(body_text(response).await.contains(needle));
        }
    }

    #[tokio::test]
    async fn test_api_predict() {
        let body = r#"{"day_of_week": 1, "customers": 2000, "promo_percent": 20,
            "competition_distance": 5000, "month": 1, "day": 1}"#;
        let response = create_router(ready_state())
            .oneshot(json_request("/api/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let parsed: handlers::PredictResponse =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(parsed.prediction, 9500.0);
        assert_eq!(parsed.features.len(), 13);
        assert_eq!(parsed.feature_names[1], "Customers");
        assert!(parsed.probes.is_empty());
    }

    #[tokio::test]
    async fn test_api_predict_rejects_invalid() {
        let body = r#"{"day_of_week": 1, "promo_percent": 150, "month": 1, "day": 1}"#;
        let response = create_router(ready_state())
            .oneshot(json_request("/api/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_api_predict_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"day_of_week": 3, "month": 6, "day": 1}"#;
        let response = create_router(missing_model_state(dir.path()))
            .oneshot(json_request("/api/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let error: handlers::ErrorResponse =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert!(error.error.contains("not found"));
    }

    #[tokio::test]
    async fn test_home_warns_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_router(missing_model_state(dir.path()))
            .oneshot(get_request("/"))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Model not loaded"));
        assert!(!html.contains("<form"));
    }

    #[tokio::test]
    async fn test_health_reports_counters() {
        let state = ready_state();
        state.telemetry.prediction_served();
        let response = create_router(state)
            .oneshot(get_request("/api/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model"], "ready");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["telemetry"]["predictions_served"], 1);
    }

    #[tokio::test]
    async fn test_reload_without_source_keeps_model() {
        let response = create_router(ready_state())
            .oneshot(json_request("/api/reload", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_failure_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let response = create_router(missing_model_state(dir.path()))
            .oneshot(json_request("/api/reload", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
