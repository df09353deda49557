//! Telemetry for salescast
//!
//! Counts model loads, predictions and sensitivity probes. The web layer
//! exposes a snapshot on `/api/health`; the CLI prints a summary.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Number of events kept for `recent_events`
const EVENT_HISTORY: usize = 256;

/// Events listed in the `-vv` session summary
const EVENTS_SHOWN: usize = 10;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    ModelLoaded {
        duration_ms: u64,
        timestamp: Instant,
    },
    ModelLoadFailed {
        reason: String,
        timestamp: Instant,
    },
    ModelDownloaded {
        bytes: u64,
        timestamp: Instant,
    },
    PredictionServed {
        timestamp: Instant,
    },
    PredictionFailed {
        reason: String,
        timestamp: Instant,
    },
    ProbeEvaluated {
        label: String,
        reported: bool,
        timestamp: Instant,
    },
}

impl TelemetryEvent {
    /// One-line description for the session summary
    pub fn describe(&self) -> String {
        match self {
            TelemetryEvent::ModelLoaded { duration_ms, .. } => format!("model loaded in {} ms", duration_ms),
            TelemetryEvent::ModelLoadFailed { reason, .. } => format!("model load failed: {}", reason),
            TelemetryEvent::ModelDownloaded { bytes, .. } => format!("downloaded {} bytes", bytes),
            TelemetryEvent::PredictionServed { .. } => "prediction served".to_string(),
            TelemetryEvent::PredictionFailed { reason, .. } => format!("prediction failed: {}", reason),
            TelemetryEvent::ProbeEvaluated { label, reported, .. } => {
                let outcome = if *reported { "reported" } else { "below threshold" };
                format!("probe '{}' {}", label, outcome)
            }
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            TelemetryEvent::ModelLoaded { timestamp, .. }
            | TelemetryEvent::ModelLoadFailed { timestamp, .. }
            | TelemetryEvent::ModelDownloaded { timestamp, .. }
            | TelemetryEvent::PredictionServed { timestamp }
            | TelemetryEvent::PredictionFailed { timestamp, .. }
            | TelemetryEvent::ProbeEvaluated { timestamp, .. } => *timestamp,
        }
    }
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetryStats {
    pub model_loads: usize,
    pub model_load_failures: usize,
    pub downloads: usize,
    pub bytes_downloaded: u64,
    pub predictions_served: usize,
    pub prediction_failures: usize,
    pub probes_evaluated: usize,
    pub probes_reported: usize,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(EVENT_HISTORY))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::ModelLoaded { .. } => stats.model_loads += 1,
                TelemetryEvent::ModelLoadFailed { .. } => stats.model_load_failures += 1,
                TelemetryEvent::ModelDownloaded { bytes, .. } => {
                    stats.downloads += 1;
                    stats.bytes_downloaded += bytes;
                }
                TelemetryEvent::PredictionServed { .. } => stats.predictions_served += 1,
                TelemetryEvent::PredictionFailed { .. } => stats.prediction_failures += 1,
                TelemetryEvent::ProbeEvaluated { reported, .. } => {
                    stats.probes_evaluated += 1;
                    if *reported {
                        stats.probes_reported += 1;
                    }
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() == EVENT_HISTORY {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn prediction_served(&self) {
        self.record(TelemetryEvent::PredictionServed {
            timestamp: Instant::now(),
        });
    }

    pub fn prediction_failed(&self, reason: impl Into<String>) {
        self.record(TelemetryEvent::PredictionFailed {
            reason: reason.into(),
            timestamp: Instant::now(),
        });
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }

    /// Share of prediction calls that succeeded
    pub fn prediction_success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.predictions_served + stats.prediction_failures;
        if total == 0 {
            1.0
        } else {
            stats.predictions_served as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal summary of a telemetry collector
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: crate::cli::Verbosity,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector, verbosity: crate::cli::Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.verbosity.show_events() {
            return;
        }
        let stats = self.collector.get_stats();

        println!("\nSession Summary");
        println!("─────────────────────────────────────");
        println!("Duration:          {:?}", self.collector.elapsed());
        println!("Model loads:       {}", stats.model_loads);
        println!("Predictions:       {}", stats.predictions_served);
        println!("Success rate:      {:.1}%", self.collector.prediction_success_rate() * 100.0);
        println!("Probes evaluated:  {}", stats.probes_evaluated);

        if self.verbosity == crate::cli::Verbosity::VeryVerbose {
            let recent = self.collector.recent_events(EVENTS_SHOWN);
            if !recent.is_empty() {
                println!("\nRecent events:");
                for line in self.event_lines(&recent) {
                    println!("  {}", line);
                }
            }
        }
        println!();
    }

    /// Events prefixed with their offset from the session start
    fn event_lines(&self, events: &[TelemetryEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| {
                let offset = event
                    .timestamp()
                    .saturating_duration_since(self.collector.start_time);
                format!("+{:>7.3}s  {}", offset.as_secs_f64(), event.describe())
            })
            .collect()
    }
}
