//! Command-line argument parsing for salescast
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::cli::config::Config;
use crate::errors::Result;
use crate::features::{Assortment, DayOfWeek, StoreInputs, StoreType};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// salescast - Rossmann daily sales prediction UI and model debugging tools
#[derive(Parser, Debug)]
#[command(name = "salescast")]
#[command(version)]
#[command(about = "Serve and debug a pre-trained Rossmann sales regressor", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Local model artifact path (overrides config)
    #[arg(long, global = true)]
    pub model_path: Option<PathBuf>,

    /// Model artifact download URL (overrides config)
    #[arg(long, global = true)]
    pub model_url: Option<String>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web UI
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Predict sales for one set of inputs and show sensitivity probes
    Predict(PredictArgs),

    /// Check that the model responds to its inputs
    Debug,

    /// Sweep each input over a range of values
    Sweep,

    /// Run health checks on configuration and model
    Doctor,

    /// Download the model artifact
    Fetch {
        /// Download even if the file exists
        #[arg(long)]
        force: bool,
    },

    /// Display current configuration
    Config,
}

/// Form fields as command-line options
#[derive(ClapArgs, Debug, Clone)]
pub struct PredictArgs {
    /// Day of week (1 = Monday ... 7 = Sunday)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=7))]
    pub day_of_week: u8,

    /// Number of customers
    #[arg(long, default_value_t = 0)]
    pub customers: u32,

    /// Store type
    #[arg(long, default_value = "a", value_parser = ["a", "b", "c", "d"])]
    pub store_type: String,

    /// Assortment level
    #[arg(long, default_value = "a", value_parser = ["a", "b", "c"])]
    pub assortment: String,

    /// Promotion intensity in percent
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub promo: u8,

    /// Store takes part in the continuing promotion
    #[arg(long)]
    pub promo2: bool,

    /// Schools are closed
    #[arg(long)]
    pub school_holiday: bool,

    /// Distance to the nearest competitor
    #[arg(long, default_value_t = 0)]
    pub competition_distance: u32,

    /// Month (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Day of month (defaults to today)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: Option<u32>,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Load the config file, apply command-line overrides and validate
    pub fn resolve_config(&self) -> Result<Config> {
        let config = self.unchecked_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Args::resolve_config`] minus validation, for `doctor`
    pub fn unchecked_config(&self) -> Result<Config> {
        let mut config = Config::read(self.config.clone())?;
        if let Some(path) = &self.model_path {
            config.model.path = path.to_string_lossy().into_owned();
        }
        if let Some(url) = &self.model_url {
            config.model.url = url.clone();
        }
        if let Some(Commands::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        Ok(config)
    }
}

impl PredictArgs {
    /// Convert to form inputs, filling month and day from today
    pub fn to_inputs(&self) -> Result<StoreInputs> {
        let mut inputs = StoreInputs::today();
        inputs.day_of_week = DayOfWeek::try_from(self.day_of_week)?;
        inputs.customers = self.customers;
        inputs.store_type = StoreType::parse(&self.store_type)?;
        inputs.assortment = Assortment::parse(&self.assortment)?;
        inputs.promo_percent = self.promo;
        inputs.promo2 = self.promo2;
        inputs.school_holiday = self.school_holiday;
        inputs.competition_distance = self.competition_distance;
        if let Some(month) = self.month {
            inputs.month = month;
        }
        if let Some(day) = self.day {
            inputs.day = day;
        }
        inputs.validate()?;
        Ok(inputs)
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default `env_logger` filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
