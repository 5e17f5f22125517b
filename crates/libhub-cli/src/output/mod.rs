//! Terminal output formatting and utilities.
//!
//! Human-readable lines go through [`OutputHandler`]; with `--json` the
//! commands print a single JSON document on stdout instead.

pub mod colors;
pub mod errors;

use libhub_config::{ColorChoice, OutputFormat};
use serde::Serialize;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
    format: OutputFormat,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new(color: ColorChoice, format: OutputFormat) -> Self {
        Self {
            colors: colors::ColorSupport::from_choice(color),
            format,
        }
    }

    /// Check if results should be printed as JSON
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Color helpers for callers that build their own lines
    pub fn colors(&self) -> &colors::ColorSupport {
        &self.colors
    }

    /// Print `value` as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new(ColorChoice::Auto, OutputFormat::Text)
    }
}
