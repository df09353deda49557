//! Integration tests for salescast
//!
//! Exercises download, load, prediction and diagnostics together against a
//! local HTTP server; nothing here touches the real bucket.

mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use clap::Parser;
use salescast::{
    cli::Args,
    diagnostics::{check_model, run_sweep, Verdict},
    doctor::{Doctor, HealthStatus},
    features::StoreInputs,
    models::{ModelStatus, ModelStore},
    predict::SalesPredictor,
    telemetry::TelemetryCollector,
    SalesError,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn inputs() -> StoreInputs {
    StoreInputs::defaults_for(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
}

#[tokio::test]
async fn test_download_then_predict_with_probes() {
    let (url, hits) = common::serve_artifact(StatusCode::OK, common::FOREST_ARTIFACT).await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::config_for(dir.path(), &url);

    let telemetry = TelemetryCollector::new();
    let store = Arc::new(ModelStore::new(config.model_source(), telemetry.clone()));
    let predictor = SalesPredictor::new(store, config.probes.clone(), telemetry.clone());

    let report = predictor.predict_with_probes(&inputs()).await.unwrap();
    assert_eq!(report.prediction, 3500.0);

    let described: Vec<String> = report.probes.iter().map(|p| p.describe()).collect();
    assert_eq!(
        described,
        vec![
            "More customers (1000): $5,500.00 ($+2,000.00)".to_string(),
            "With 50% promo: $4,500.00 ($+1,000.00)".to_string(),
        ]
    );

    assert!(dir.path().join("model.json").is_file());
    assert!(!dir.path().join("model.json.part").exists());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let stats = telemetry.get_stats();
    assert_eq!(stats.downloads, 1);
    assert_eq!(stats.model_loads, 1);
    assert_eq!(stats.predictions_served, 4);
    assert_eq!(stats.probes_evaluated, 3);
    assert_eq!(stats.probes_reported, 2);
}

#[tokio::test]
async fn test_model_is_loaded_once() {
    let (url, hits) = common::serve_artifact(StatusCode::OK, common::FOREST_ARTIFACT).await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::config_for(dir.path(), &url);
    let store = ModelStore::new(config.model_source(), TelemetryCollector::new());

    let first = store.ensure_loaded().await.unwrap();
    let second = store.ensure_loaded().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_status_readable_while_download_in_flight() {
    let url = common::serve_artifact_after(Duration::from_millis(1500), common::FOREST_ARTIFACT).await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::config_for(dir.path(), &url);
    let store = Arc::new(ModelStore::new(config.model_source(), TelemetryCollector::new()));

    let loader = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.ensure_loaded().await.map(|model| model.n_features()) }
    });

    // every read must come back well before the artifact does
    let mut status = ModelStatus::NotLoaded;
    for _ in 0..50 {
        status = tokio::time::timeout(Duration::from_millis(200), store.status())
            .await
            .expect("status() waited on the download");
        if matches!(status, ModelStatus::Loading) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status.label(), "loading");
    assert!(store.current().await.is_none());
    assert!(store.summary().await.is_none());

    assert_eq!(loader.await.unwrap().unwrap(), 13);
    assert!(store.status().await.is_ready());
}

#[tokio::test]
async fn test_failed_download_is_cached_until_reload() {
    let (url, hits) = common::serve_artifact(StatusCode::NOT_FOUND, "missing").await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::config_for(dir.path(), &url);
    let store = ModelStore::new(config.model_source(), TelemetryCollector::new());

    assert!(matches!(
        store.ensure_loaded().await,
        Err(SalesError::ModelNotLoaded(_))
    ));
    assert!(store.ensure_loaded().await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(matches!(store.status().await, ModelStatus::Unavailable(_)));
    assert!(!dir.path().join("model.json").exists());

    assert!(store.reload().await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_feature_count_mismatch_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("model.json"),
        common::linear_artifact(10.0, &[1.0, 2.0, 3.0]),
    )
    .unwrap();
    let config = common::config_for(dir.path(), common::DEAD_URL);
    let store = ModelStore::new(config.model_source(), TelemetryCollector::new());

    match store.ensure_loaded().await {
        Err(SalesError::ModelNotLoaded(reason)) => assert!(reason.contains("expects 3 features, got 13")),
        other => panic!("expected load failure, got {:?}", other.map(|m| m.summary())),
    }
}

#[tokio::test]
async fn test_debug_and_sweep_on_forest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.json"), common::FOREST_ARTIFACT).unwrap();
    let config = common::config_for(dir.path(), common::DEAD_URL);
    let store = ModelStore::new(config.model_source(), TelemetryCollector::new());
    let model = store.ensure_loaded().await.unwrap();

    let check = check_model(model.as_ref()).unwrap();
    assert_eq!(check.verdict, Verdict::Varies { min: 3500.0, max: 5500.0 });
    assert_eq!(check.summary.to_string(), "RandomForestRegressor (13 features, 2 trees)");
    assert_eq!(check.summary.params_display(), "max_depth=1, n_estimators=2");

    let sections = run_sweep(model.as_ref()).unwrap();
    let customers: Vec<f64> = sections[0].points.iter().map(|p| p.prediction).collect();
    assert_eq!(customers, vec![3500.0, 3500.0, 3500.0, 5500.0, 5500.0]);
    let promo: Vec<f64> = sections[1].points.iter().map(|p| p.prediction).collect();
    assert_eq!(promo, vec![3500.0, 3500.0, 4500.0, 4500.0, 4500.0]);
}

#[tokio::test]
async fn test_constant_model_flagged_by_debug_and_doctor() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("model.json"),
        common::linear_artifact(4200.0, &[0.0; 13]),
    )
    .unwrap();
    let config = common::config_for(dir.path(), common::DEAD_URL);

    let store = ModelStore::new(config.model_source(), TelemetryCollector::new());
    let model = store.ensure_loaded().await.unwrap();
    assert_eq!(
        check_model(model.as_ref()).unwrap().verdict,
        Verdict::Constant { value: 4200.0 }
    );

    let checks = Doctor::new(config).run_diagnostics().await;
    let variance = checks
        .iter()
        .find(|c| c.name == "Prediction Variance")
        .unwrap();
    assert!(matches!(variance.status, HealthStatus::Warn(_)));
    assert!(Doctor::overall_status(&checks));
}

#[tokio::test]
async fn test_invalid_inputs_never_reach_the_model() {
    let telemetry = TelemetryCollector::new();
    let dir = tempfile::tempdir().unwrap();
    let config = common::config_for(dir.path(), common::DEAD_URL);
    let store = Arc::new(ModelStore::new(config.model_source(), telemetry.clone()));
    let predictor = SalesPredictor::new(Arc::clone(&store), config.probes.clone(), telemetry);

    let mut form = inputs();
    form.day = 32;
    assert!(matches!(
        predictor.predict_with_probes(&form).await,
        Err(SalesError::InvalidInput { .. })
    ));
    assert!(matches!(store.status().await, ModelStatus::NotLoaded));
}

#[tokio::test]
async fn test_doctor_reports_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    std::fs::write(&model_path, common::FOREST_ARTIFACT).unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[server]\nport = 0\n\n[model]\npath = {:?}\nurl = {:?}\n",
            model_path.to_string_lossy(),
            common::DEAD_URL
        ),
    )
    .unwrap();

    let args = Args::try_parse_from([
        "salescast",
        "doctor",
        "--config",
        config_path.to_str().unwrap(),
    ])
    .unwrap();
    assert!(args.resolve_config().is_err());

    let checks = Doctor::new(args.unchecked_config().unwrap()).run_diagnostics().await;
    let config_check = checks.iter().find(|c| c.name == "Configuration").unwrap();
    assert!(matches!(&config_check.status, HealthStatus::Fail(msg) if msg.contains("server.port")));
    assert!(!Doctor::overall_status(&checks));
}
