//! `libhub contacts` command implementation.

use anyhow::Context;

use super::CommandContext;

/// Execute the `libhub contacts` command
pub fn execute(
    library: &str,
    version: &str,
    level: Option<usize>,
    ctx: &CommandContext,
) -> anyhow::Result<()> {
    let loaded = ctx.load_hub()?;
    let contacts = loaded
        .hub
        .contacts(library, version, level)
        .with_context(|| format!("Failed to collect contacts for {}@{}", library, version))?;

    if ctx.output.is_json() {
        return ctx.output.json(&contacts);
    }

    if contacts.is_empty() {
        ctx.output.info(&format!("{}@{} requires no other libraries", library, version));
        return Ok(());
    }

    for contact in &contacts {
        ctx.output.line(contact);
    }
    Ok(())
}
