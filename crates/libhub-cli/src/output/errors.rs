//! Error message formatting with actionable suggestions.

use super::colors::ColorSupport;
use libhub_config::ConfigError;
use libhub_registry::RegistryError;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    /// Use explicit color support instead of detecting it
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with its cause chain and the first suggestion
    /// any error in the chain offers
    pub fn format_error(&self, error: &anyhow::Error) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        for cause in error.chain().skip(1) {
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&cause.to_string());
            output.push('\n');
        }

        if let Some(suggestion) = suggestion(error) {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn suggestion(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<RegistryError>() {
            err.suggestion()
        } else if let Some(err) = cause.downcast_ref::<ConfigError>() {
            err.suggestion()
        } else {
            None
        }
    })
}
