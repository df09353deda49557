//! Offline model diagnostics
//!
//! `debug` runs the standard scenarios and warns about constant output,
//! `sweep` varies one field at a time over the reference row.

pub mod scenarios;
pub mod sweep;

pub use scenarios::{check_model, ModelCheck, Verdict, CONSTANT_PREDICTION_CAUSES};
pub use sweep::{run_sweep, SweepSection};

use crate::predict::format_currency;
use colored::Colorize;

/// Print a scenario check the way `salescast debug` shows it
pub fn print_model_check(check: &ModelCheck) {
    println!("{}", "Model debug".bold());
    println!("{}", "=".repeat(50));
    println!("Model: {}", check.summary);
    println!("Parameters: {}", check.summary.params_display());
    println!();

    for outcome in &check.outcomes {
        println!("{:<30} {}", outcome.name, format_currency(outcome.prediction));
    }
    println!();

    match check.verdict {
        Verdict::Constant { value } => {
            println!(
                "{}",
                format!("WARNING: All predictions are identical ({})", format_currency(value))
                    .yellow()
                    .bold()
            );
            println!("This suggests the model might not be working correctly.");
            println!("Possible causes:");
            for cause in CONSTANT_PREDICTION_CAUSES {
                println!("  - {}", cause);
            }
        }
        Verdict::Varies { min, max } => {
            println!(
                "{}",
                format!(
                    "Predictions vary from {} to {}",
                    format_currency(min),
                    format_currency(max)
                )
                .green()
            );
        }
    }
}

/// Print every sweep section
pub fn print_sweep(sections: &[SweepSection]) {
    for section in sections {
        println!("\n{}", section.title.bold());
        for point in &section.points {
            println!("  {:<28} {}", point.label, format_currency(point.prediction));
        }
    }
    println!();
}
