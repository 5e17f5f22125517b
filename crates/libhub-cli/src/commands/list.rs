//! `libhub list` command implementation.

use super::CommandContext;

/// Execute the `libhub list` command
pub fn execute(ctx: &CommandContext) -> anyhow::Result<()> {
    let loaded = ctx.load_hub()?;
    let libraries: Vec<_> = loaded.hub.libraries().collect();

    if ctx.output.is_json() {
        return ctx.output.json(&libraries);
    }

    if libraries.is_empty() {
        ctx.output.info("No libraries registered");
        return Ok(());
    }

    for library in &libraries {
        ctx.output.line(&library.to_string());
    }
    ctx.output.info(&format!("{} libraries", libraries.len()));
    Ok(())
}
