//! Route handlers for the HTML pages and the JSON API

use crate::errors::{Result, SalesError};
use crate::features::{Assortment, DayOfWeek, StoreInputs, StoreType, FEATURE_NAMES};
use crate::predict::ProbeResult;
use crate::telemetry::TelemetryStats;
use crate::web::pages::{self, HomeView};
use crate::web::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Error body for the JSON API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for an error surfaced by the API
pub fn status_for(err: &SalesError) -> StatusCode {
    if err.is_client_error() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }
    match err {
        SalesError::ModelNotLoaded(_)
        | SalesError::DownloadFailed { .. }
        | SalesError::ModelFormat(_)
        | SalesError::HttpError(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: SalesError) -> ApiError {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Raw query string of the prediction form
///
/// Kept as strings so a bad value re-renders the form with a message
/// instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub day_of_week: Option<String>,
    pub customers: Option<String>,
    pub store_type: Option<String>,
    pub assortment: Option<String>,
    pub promo: Option<String>,
    pub promo2: Option<String>,
    pub school_holiday: Option<String>,
    pub competition_distance: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &Option<String>, default: T) -> Result<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(text) => text
            .parse()
            .map_err(|_| SalesError::invalid_input(field, format!("'{}' is not a valid number", text))),
    }
}

fn checkbox(raw: &Option<String>) -> bool {
    matches!(raw.as_deref(), Some("on" | "true" | "1"))
}

/// Parsed value, or `default` with the first failure remembered in `error`
fn keep<T>(parsed: Result<T>, default: T, error: &mut Option<SalesError>) -> T {
    parsed.unwrap_or_else(|e| {
        error.get_or_insert(e);
        default
    })
}

impl FormQuery {
    /// Apply the submitted fields over `defaults`
    pub fn to_inputs(&self, defaults: StoreInputs) -> Result<StoreInputs> {
        match self.merge(defaults) {
            (inputs, None) => Ok(inputs),
            (_, Some(e)) => Err(e),
        }
    }

    /// Like [`FormQuery::to_inputs`], but always returns inputs to show in the form
    ///
    /// Fields that fail to parse keep their default; out-of-range numbers are
    /// kept as submitted. The first problem found is returned alongside.
    pub fn merge(&self, defaults: StoreInputs) -> (StoreInputs, Option<SalesError>) {
        let mut error = None;
        let day_of_week = parse_number("day_of_week", &self.day_of_week, defaults.day_of_week.number())
            .and_then(DayOfWeek::try_from);
        let store_type = self
            .store_type
            .as_deref()
            .map_or(Ok(defaults.store_type), StoreType::parse);
        let assortment = self
            .assortment
            .as_deref()
            .map_or(Ok(defaults.assortment), Assortment::parse);

        let inputs = StoreInputs {
            day_of_week: keep(day_of_week, defaults.day_of_week, &mut error),
            customers: keep(
                parse_number("customers", &self.customers, defaults.customers),
                defaults.customers,
                &mut error,
            ),
            store_type: keep(store_type, defaults.store_type, &mut error),
            assortment: keep(assortment, defaults.assortment, &mut error),
            promo_percent: keep(
                parse_number("promo", &self.promo, defaults.promo_percent),
                defaults.promo_percent,
                &mut error,
            ),
            promo2: checkbox(&self.promo2),
            school_holiday: checkbox(&self.school_holiday),
            competition_distance: keep(
                parse_number("competition_distance", &self.competition_distance, defaults.competition_distance),
                defaults.competition_distance,
                &mut error,
            ),
            month: keep(parse_number("month", &self.month, defaults.month), defaults.month, &mut error),
            day: keep(parse_number("day", &self.day, defaults.day), defaults.day, &mut error),
        };

        let error = error.or_else(|| inputs.validate().err());
        (inputs, error)
    }
}

/// `GET /`
pub async fn home_handler(State(state): State<AppState>) -> Html<String> {
    let mut view = HomeView {
        inputs: StoreInputs::today(),
        ..Default::default()
    };
    if let Err(e) = state.predictor.store().ensure_loaded().await {
        view.model_error = Some(e.to_string());
    }
    Html(pages::home_page(&view))
}

/// `GET /predict?...`
pub async fn predict_page_handler(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Html<String> {
    let (inputs, input_error) = query.merge(StoreInputs::today());
    let mut view = HomeView {
        inputs,
        ..Default::default()
    };

    match input_error {
        None => match state.predictor.predict_with_probes(&view.inputs).await {
            Ok(report) => view.report = Some(report),
            Err(SalesError::ModelNotLoaded(reason)) => view.model_error = Some(reason),
            Err(e) => view.error = Some(e.to_string()),
        },
        Some(e) => {
            log::debug!("Rejected form input: {}", e);
            // a missing model outranks a typo in the form
            if let Err(model_err) = state.predictor.store().ensure_loaded().await {
                view.model_error = Some(model_err.to_string());
            }
            view.error = Some(e.to_string());
        }
    }

    Html(pages::home_page(&view))
}

pub async fn about_handler() -> Html<String> {
    Html(pages::about_page())
}

pub async fn analysis_handler() -> Html<String> {
    Html(pages::analysis_page())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
    pub probes: Vec<ProbeResult>,
}

/// `POST /api/predict`
pub async fn api_predict_handler(
    State(state): State<AppState>,
    Json(inputs): Json<StoreInputs>,
) -> std::result::Result<Json<PredictResponse>, ApiError> {
    let report = state
        .predictor
        .predict_with_probes(&inputs)
        .await
        .map_err(api_error)?;

    Ok(Json(PredictResponse {
        prediction: report.prediction,
        features: report.features.as_slice().to_vec(),
        feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        probes: report.probes,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
    pub telemetry: TelemetryStats,
}

/// `GET /api/health`; never triggers a model load
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_status = state.predictor.store().status().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: model_status.label().to_string(),
        version: crate::VERSION.to_string(),
        telemetry: state.telemetry.get_stats(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub model: String,
}

/// `POST /api/reload`
pub async fn reload_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<ReloadResponse>, ApiError> {
    log::info!("Reloading model");
    let model = state.predictor.store().reload().await.map_err(api_error)?;
    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        model: model.summary().to_string(),
    }))
}
