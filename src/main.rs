//! salescast - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use salescast::{
    cli::{Args, Commands, Config, PredictArgs, Verbosity},
    diagnostics,
    doctor::Doctor,
    models::{
        DownloadProgress, FetchOutcome, ModelArtifact, ModelFetcher, ModelStore, ModelSummary,
        ProgressCallback, Regressor,
    },
    predict::{format_currency, SalesPredictor},
    telemetry::{TelemetryCollector, TelemetryDisplay},
    web::{self, AppState},
};
use std::sync::Arc;
use std::time::Duration;

fn init_logging(verbosity: Verbosity) {
    // RUST_LOG wins over the -v/-q flags
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    init_logging(verbosity);

    // doctor reports invalid settings as a failed check instead of aborting
    let config = match &args.command {
        Some(Commands::Doctor) => args.unchecked_config()?,
        _ => args.resolve_config()?,
    };
    if !config.display.color_output {
        colored::control::set_override(false);
    }

    let telemetry = TelemetryCollector::new();

    match &args.command {
        Some(Commands::Serve { .. }) => {
            run_server(config, telemetry.clone()).await?;
        }
        Some(Commands::Predict(predict)) => {
            run_predict(&config, predict, telemetry.clone()).await?;
        }
        Some(Commands::Debug) => {
            let model = load_model(&config, telemetry.clone()).await?;
            let check = diagnostics::check_model(model.as_ref())?;
            diagnostics::print_model_check(&check);
        }
        Some(Commands::Sweep) => {
            let model = load_model(&config, telemetry.clone()).await?;
            let sections = diagnostics::run_sweep(model.as_ref())?;
            diagnostics::print_sweep(&sections);
        }
        Some(Commands::Doctor) => {
            run_doctor(config).await;
        }
        Some(Commands::Fetch { force }) => {
            run_fetch(&config, *force, verbosity).await?;
        }
        Some(Commands::Config) => {
            show_config(&args, &config)?;
        }
        None => {
            println!("salescast v{} - Rossmann sales prediction", salescast::VERSION);
            println!("\nUsage:");
            println!("  salescast serve               Start the web UI");
            println!("  salescast predict [OPTIONS]   Predict sales from the command line");
            println!("  salescast debug               Check the model with fixed scenarios");
            println!("  salescast sweep               Vary each input over a range");
            println!("  salescast doctor              Deployment health checks");
            println!("  salescast fetch [--force]     Download the model artifact");
            println!("  salescast config              Show configuration");
            println!("\nExample:");
            println!("  salescast predict --customers 600 --store-type c --promo 20");
            println!();
        }
    }

    TelemetryDisplay::new(telemetry, verbosity).display_summary();
    Ok(())
}

async fn load_model(config: &Config, telemetry: TelemetryCollector) -> Result<Arc<dyn Regressor>> {
    let store = ModelStore::new(config.model_source(), telemetry);
    let model = store
        .ensure_loaded()
        .await
        .context("Model not available. Please check model download or upload.")?;
    Ok(model)
}

async fn run_server(config: Config, telemetry: TelemetryCollector) -> Result<()> {
    let store = Arc::new(ModelStore::new(config.model_source(), telemetry.clone()));

    // Load up front so the first page view is fast; failures are shown in the UI
    match store.ensure_loaded().await {
        Ok(model) => log::info!("Serving {}", model.summary()),
        Err(e) => log::warn!("Starting without a model: {}", e),
    }

    let predictor = SalesPredictor::new(store, config.probes.clone(), telemetry.clone());
    let state = AppState::new(predictor, telemetry, config);
    println!(
        "{} http://{}",
        "salescast listening on".green(),
        state.config.bind_addr()
    );
    web::serve(state).await
}

async fn run_predict(config: &Config, predict: &PredictArgs, telemetry: TelemetryCollector) -> Result<()> {
    let inputs = predict.to_inputs()?;
    let store = Arc::new(ModelStore::new(config.model_source(), telemetry.clone()));
    let predictor = SalesPredictor::new(store, config.probes.clone(), telemetry);

    let report = predictor.predict_with_probes(&inputs).await?;

    println!(
        "{}",
        format!("Predicted Sales: {}", format_currency(report.prediction))
            .green()
            .bold()
    );
    if report.probes.is_empty() {
        println!("No probe moved the prediction by more than {}", format_currency(config.probes.min_delta));
    } else {
        println!("\nWhat's affecting this prediction:");
        for probe in &report.probes {
            println!("  - {}", probe.describe());
        }
    }
    log::debug!("Feature values: {}", report.features);
    Ok(())
}

async fn run_doctor(config: Config) {
    let checks = Doctor::new(config).run_diagnostics().await;
    Doctor::display_results(&checks);

    if !Doctor::overall_status(&checks) {
        std::process::exit(1);
    }
}

async fn run_fetch(config: &Config, force: bool, verbosity: Verbosity) -> Result<()> {
    let path = config.model_path();
    let fetcher = ModelFetcher::new(Duration::from_secs(config.model.download_timeout_secs))?;

    let progress = if verbosity.show_progress() && config.display.show_progress_bars {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .context("invalid progress template")?
                .progress_chars("=> "),
        );
        pb.set_message("Downloading model file from cloud storage...");
        Some(pb)
    } else {
        None
    };

    let callback = progress.clone().map(|pb| {
        Box::new(move |p: &DownloadProgress| {
            if let Some(total) = p.total {
                pb.set_length(total);
            }
            pb.set_position(p.downloaded);
        }) as ProgressCallback
    });

    let outcome = fetcher
        .download_if_needed(&config.model.url, &path, force, callback)
        .await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match outcome? {
        FetchOutcome::AlreadyPresent => {
            println!("{} already exists (use --force to download again)", path.display());
        }
        FetchOutcome::Downloaded { bytes } => {
            println!("{} ({} bytes)", "Model file downloaded successfully.".green(), bytes);
        }
    }

    let artifact = ModelArtifact::from_path(&path)?;
    println!("Model: {}", ModelSummary::from_artifact(&artifact));
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    println!("\nsalescast configuration\n");

    match &args.config {
        Some(path) => println!("Config file:      {}", path.display()),
        None => match Config::default_path() {
            Some(path) if path.exists() => println!("Config file:      {}", path.display()),
            _ => println!("Config file:      (built-in defaults)"),
        },
    }
    println!("Verbosity:        {}", args.verbosity().as_str());
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
