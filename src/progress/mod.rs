//! Live progress estimation for phases with timing history.
//!
//! - [`estimator`] - pure state machine driven by tick/log/step-complete events
//! - [`transport`] - log sink that renders the estimator with indicatif

pub mod estimator;
pub mod transport;

pub use estimator::{remaining_label, ProgressBarState, ProgressEstimator, ProgressFrame};
pub use transport::{ProgressBarSink, TICK_INTERVAL};

use console::Term;

/// Minimum summed historical duration before a bar is worth showing.
pub const ACTIVATION_THRESHOLD_MS: f64 = 2500.0;

/// Whether a phase with these historical averages gets a progress bar.
pub fn should_activate(averages: &[(String, f64)]) -> bool {
    let total: f64 = averages.iter().map(|(_, ms)| ms).sum();
    !averages.is_empty() && total > ACTIVATION_THRESHOLD_MS
}

/// Hide the terminal cursor (`\x1B[?25l`).
pub fn hide_cursor() {
    Term::stderr().hide_cursor().ok();
}

/// Show the terminal cursor (`\x1B[?25h`). Safe to call repeatedly.
pub fn show_cursor() {
    Term::stderr().show_cursor().ok();
}
