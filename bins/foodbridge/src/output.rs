//! Terminal output utilities

use foodbridge_geo::DistanceUnit;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

const FEET_PER_MILE: f64 = 5280.0;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }
}

/// Human distance text for a listing card.
///
/// Below one unit the distance is shown in feet or metres.
pub fn format_distance(distance: Option<f64>, unit: DistanceUnit) -> String {
    let Some(d) = distance.filter(|d| d.is_finite() && *d >= 0.0) else {
        return "Unknown distance".to_string();
    };
    match unit {
        DistanceUnit::Miles if d < 1.0 => format!("{:.0} ft away", d * FEET_PER_MILE),
        DistanceUnit::Kilometers if d < 1.0 => format!("{:.0} m away", d * 1000.0),
        _ => format!("{:.1} {} away", d, unit.abbreviation()),
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Spinner for a registry round trip
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
