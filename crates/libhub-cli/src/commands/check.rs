//! `libhub check` command implementation.
//!
//! Loads everything a normal run loads and fails if any library row or
//! configured dependency was rejected.

use serde::Serialize;

use super::CommandContext;
use libhub_config::ConfigSource;

#[derive(Serialize)]
struct FileSummary {
    path: String,
    registered: usize,
    skipped: Vec<String>,
}

#[derive(Serialize)]
struct CheckSummary {
    config_files: Vec<String>,
    libraries: usize,
    files: Vec<FileSummary>,
    rejected_dependencies: Vec<String>,
}

/// Execute the `libhub check` command
pub fn execute(ctx: &CommandContext) -> anyhow::Result<()> {
    let loaded = ctx.load_hub()?;

    let summary = CheckSummary {
        config_files: ctx
            .config
            .sources
            .iter()
            .filter_map(|source| match source {
                ConfigSource::Global(path) | ConfigSource::Project(path) => Some(path.to_string()),
                _ => None,
            })
            .collect(),
        libraries: loaded.hub.len(),
        files: loaded
            .imports
            .iter()
            .map(|(path, report)| FileSummary {
                path: path.to_string(),
                registered: report.registered,
                skipped: report
                    .skipped
                    .iter()
                    .map(|row| format!("line {}: {}", row.line, row.reason))
                    .collect(),
            })
            .collect(),
        rejected_dependencies: loaded
            .rejected
            .iter()
            .map(|(entry, err)| format!("{}: {}", entry, err.report()))
            .collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&summary)?;
    } else {
        if summary.config_files.is_empty() {
            ctx.output.info("No configuration file found");
        }
        for path in &summary.config_files {
            ctx.output.info(&format!("Configuration: {}", path));
        }
        for file in &summary.files {
            ctx.output.info(&format!(
                "{}: {} registered, {} skipped",
                file.path,
                file.registered,
                file.skipped.len()
            ));
        }
    }

    if !loaded.is_clean() {
        let problems = summary
            .files
            .iter()
            .map(|file| file.skipped.len())
            .sum::<usize>()
            + summary.rejected_dependencies.len();
        anyhow::bail!("Found {} problem(s) in the configured libraries", problems);
    }

    if !ctx.output.is_json() {
        ctx.output.success(&format!(
            "{} libraries and {} configured dependencies are valid",
            summary.libraries,
            ctx.config.config.dependencies.len()
        ));
    }
    Ok(())
}
