use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Spinner reporting which phase of a run is active. Hidden automatically
/// when stderr is not a terminal.
pub(crate) fn phase_spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}
