//! Configuration parsing for libhub
//!
//! This crate handles parsing and validation of `libhub.toml` files and
//! layers the global file, the project file, environment variables and
//! command line flags into one [`HubToml`].

pub mod error;
pub mod merge;
pub mod toml;

// Re-export main types
pub use error::ConfigError;
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource, LoadedConfig, CONFIG_FILE};
pub use self::toml::{
    ColorChoice, DependencyEntry, HubSection, HubToml, LogSection, OutputFormat, OutputSection,
};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
