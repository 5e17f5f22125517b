//! # libhub
//!
//! Command line front end for the libhub library registry.
//!
//! Every invocation loads configuration, builds a fresh hub from the
//! configured library files, applies the configured dependency edges and
//! then runs a single command against it.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use libhub_config::{ConfigLayering, ConfigLoader, LoadedConfig, LogSection};
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Register, look up and connect versioned libraries
#[derive(Parser)]
#[command(name = "libhub", version, about = "Semantic-version library registry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Library file to import (name, version, registrant per row)
    #[arg(short = 'f', long = "file", value_name = "FILE", global = true)]
    pub files: Vec<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Ignore libhub.toml and the global configuration file
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every registered library
    List,
    /// Find the latest version matching a specification
    Lookup {
        name: String,
        /// Version specification, e.g. 1.2.0, ~1.2.0, ^1.2.0 or +1.2.0
        spec: String,
    },
    /// Make a library depend on the best match for a specification
    Depend {
        library: String,
        version: String,
        dependency: String,
        spec: String,
        /// Record the edge in libhub.toml
        #[arg(long)]
        save: bool,
    },
    /// Remove a dependency edge
    Undepend {
        library: String,
        version: String,
        dependency: String,
        dependency_version: String,
    },
    /// List the registrants of everything a library requires
    Contacts {
        library: String,
        version: String,
        /// Only follow this many dependency edges
        #[arg(long)]
        level: Option<usize>,
    },
    /// Validate configuration and library files
    Check,
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_panic_handler();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;

    let overrides = cli_overrides(&cli);
    let config = if cli.no_config {
        LoadedConfig {
            config: ConfigLayering::merge_configs(
                None,
                None,
                &ConfigLayering::collect_env_overrides(),
                &overrides,
            )?,
            project_path: None,
            sources: Vec::new(),
        }
    } else {
        ConfigLoader::new(cwd.clone()).load(&overrides)?
    };

    setup_logging(&config.config.log);
    info!("Starting libhub v{}", env!("CARGO_PKG_VERSION"));

    let ctx = CommandContext::new(cwd, config, cli.files);
    commands::dispatch_command(cli.command, &ctx)
}

/// Translate global flags into configuration overrides
fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if cli.verbose {
        overrides.insert("log".to_string(), "debug".to_string());
    }
    if cli.json {
        overrides.insert("format".to_string(), "json".to_string());
    }
    overrides
}

fn setup_logging(log: &LogSection) {
    let level = log.level().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "libhub={level},libhub_core={level},libhub_registry={level},libhub_config={level}"
        ))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if log.json() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("libhub encountered an unexpected error: {}", panic_info);
        eprintln!("libhub crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/libhub/libhub/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
