//! Command implementations and dispatch logic.
//!
//! Every command receives a [`CommandContext`] and loads its own hub from
//! the configured library files through [`CommandContext::load_hub`].

use anyhow::Context;
use camino::Utf8PathBuf;
use libhub_config::{DependencyEntry, LoadedConfig};
use libhub_registry::{import_file, Hub, ImportReport, RegistryError};
use tracing::{info, warn};

pub mod check;
pub mod contacts;
pub mod depend;
pub mod list;
pub mod lookup;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub config: LoadedConfig,
    /// Library files given with `--file`
    pub files: Vec<Utf8PathBuf>,
}

/// A hub built from the configured files
pub struct LoadedHub {
    pub hub: Hub,
    /// One report per imported file, in import order
    pub imports: Vec<(Utf8PathBuf, ImportReport)>,
    /// Configured dependency entries the hub refused
    pub rejected: Vec<(DependencyEntry, RegistryError)>,
}

impl LoadedHub {
    /// Check if every row and every configured edge was accepted
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.imports.iter().all(|(_, report)| report.is_clean())
    }
}

impl CommandContext {
    /// Create a new command context
    pub fn new(cwd: Utf8PathBuf, config: LoadedConfig, files: Vec<Utf8PathBuf>) -> Self {
        let settings = &config.config.output;
        let output = OutputHandler::new(settings.color(), settings.format());
        Self {
            cwd,
            output,
            config,
            files,
        }
    }

    /// Configured sources followed by `--file` arguments
    pub fn library_files(&self) -> Vec<Utf8PathBuf> {
        self.config
            .config
            .hub
            .sources
            .iter()
            .chain(&self.files)
            .map(|path| {
                if path.is_relative() {
                    self.cwd.join(path)
                } else {
                    path.clone()
                }
            })
            .collect()
    }

    /// Import every library file and apply the configured dependencies.
    ///
    /// Skipped rows and refused edges are warnings. A file that cannot be
    /// read is an error.
    pub fn load_hub(&self) -> anyhow::Result<LoadedHub> {
        let mut hub = Hub::new();
        let mut imports = Vec::new();

        for path in self.library_files() {
            let report = import_file(&mut hub, &path)
                .with_context(|| format!("Failed to import libraries from {}", path))?;
            for row in &report.skipped {
                self.output
                    .warn(&format!("{}:{}: skipped row: {}", path, row.line, row.reason));
            }
            imports.push((path, report));
        }

        let mut rejected = Vec::new();
        for entry in &self.config.config.dependencies {
            if let Err(err) =
                hub.add_dependency(&entry.library, &entry.version, &entry.dependency, &entry.spec)
            {
                warn!(dependency = %entry, error = %err.report(), "Skipping configured dependency");
                self.output.warn(&format!(
                    "Skipping configured dependency {}: {}",
                    entry,
                    err.report()
                ));
                rejected.push((entry.clone(), err));
            }
        }

        info!(libraries = hub.len(), files = imports.len(), "Loaded hub");
        Ok(LoadedHub {
            hub,
            imports,
            rejected,
        })
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            info!("Listing libraries");
            list::execute(ctx)
        },
        Commands::Lookup { name, spec } => {
            info!("Looking up {} {}", name, spec);
            lookup::execute(&name, &spec, ctx)
        },
        Commands::Depend {
            library,
            version,
            dependency,
            spec,
            save,
        } => {
            info!("Adding dependency {} {} to {}@{}", dependency, spec, library, version);
            let entry = DependencyEntry {
                library,
                version,
                dependency,
                spec,
            };
            depend::add(&entry, save, ctx)
        },
        Commands::Undepend {
            library,
            version,
            dependency,
            dependency_version,
        } => {
            info!(
                "Removing dependency {}@{} from {}@{}",
                dependency, dependency_version, library, version
            );
            depend::remove(&library, &version, &dependency, &dependency_version, ctx)
        },
        Commands::Contacts {
            library,
            version,
            level,
        } => {
            info!("Collecting contacts for {}@{} (level: {:?})", library, version, level);
            contacts::execute(&library, &version, level, ctx)
        },
        Commands::Check => {
            info!("Checking configuration");
            check::execute(ctx)
        },
        Commands::Version => {
            info!("Showing version information");
            show_version(ctx)
        },
    }
}

fn show_version(ctx: &CommandContext) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build_date = env!("LIBHUB_BUILD_DATE");
    let target = env!("LIBHUB_TARGET");
    let rustc = env!("LIBHUB_RUSTC_VERSION");

    if ctx.output.is_json() {
        return ctx.output.json(&serde_json::json!({
            "version": version,
            "built": build_date,
            "target": target,
            "rustc": rustc,
        }));
    }

    ctx.output
        .line(&ctx.output.colors().bold(&format!("libhub v{}", version)));
    ctx.output.info(&format!("Built: {}", build_date));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", rustc));
    Ok(())
}

/// Suggest a registered name close to `input`
pub fn suggest_similar_name<'a>(
    input: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for name in names {
        let distance = edit_distance(input, name);
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(name);
        }
    }

    best_match
}

/// Calculate edit distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows of the Levenshtein matrix
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}
