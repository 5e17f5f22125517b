//! `libhub lookup` command implementation.
//!
//! Prints the latest registered version of a library that satisfies a
//! version specification. Finding nothing is not an error.

use anyhow::Context;

use super::{suggest_similar_name, CommandContext};

/// Execute the `libhub lookup` command
pub fn execute(name: &str, spec: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let loaded = ctx.load_hub()?;
    let found = loaded
        .hub
        .lookup(name, spec)
        .with_context(|| format!("Failed to look up {} {}", name, spec))?;

    if ctx.output.is_json() {
        return ctx.output.json(&found);
    }

    match found {
        Some(library) => ctx.output.line(&library.to_string()),
        None if loaded.hub.versions(name).is_empty() => {
            ctx.output.warn(&format!("No library named '{}' is registered", name));
            if let Some(similar) = suggest_similar_name(name, loaded.hub.names()) {
                ctx.output.info(&format!("Did you mean '{}'?", similar));
            }
        },
        None => {
            ctx.output
                .warn(&format!("No version of {} satisfies {}", name, spec));
        },
    }
    Ok(())
}
