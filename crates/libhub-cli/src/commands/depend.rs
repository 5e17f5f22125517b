//! `libhub depend` and `libhub undepend` command implementations.

use anyhow::Context;
use libhub_config::DependencyEntry;
use libhub_core::Version;
use libhub_registry::Hub;

use super::CommandContext;

/// Execute the `libhub depend` command
pub fn add(entry: &DependencyEntry, save: bool, ctx: &CommandContext) -> anyhow::Result<()> {
    let mut loaded = ctx.load_hub()?;
    loaded
        .hub
        .add_dependency(&entry.library, &entry.version, &entry.dependency, &entry.spec)
        .with_context(|| format!("Failed to add dependency {}", entry))?;

    if save {
        let path = ctx.config.save_path(&ctx.cwd);
        libhub_config::toml::save_dependency(&path, entry)
            .with_context(|| format!("Failed to save dependency to {}", path))?;
        if !ctx.output.is_json() {
            ctx.output.success(&format!("Saved {} to {}", entry, path));
        }
    }

    show(&loaded.hub, &entry.library, &entry.version, ctx)
}

/// Execute the `libhub undepend` command
pub fn remove(
    library: &str,
    version: &str,
    dependency: &str,
    dependency_version: &str,
    ctx: &CommandContext,
) -> anyhow::Result<()> {
    let mut loaded = ctx.load_hub()?;
    loaded
        .hub
        .remove_dependency(library, version, dependency, dependency_version)
        .with_context(|| {
            format!(
                "Failed to remove dependency {}@{} from {}@{}",
                dependency, dependency_version, library, version
            )
        })?;

    let configured = ctx.config.config.dependencies.iter().any(|entry| {
        entry.library == library && entry.version == version && entry.dependency == dependency
    });
    if configured && !ctx.output.is_json() {
        ctx.output.info(&format!(
            "The dependency on {} is configured in libhub.toml and returns on the next run",
            dependency
        ));
    }

    show(&loaded.hub, library, version, ctx)
}

/// Print the library after its dependencies changed
fn show(hub: &Hub, name: &str, version: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let library = version
        .parse::<Version>()
        .ok()
        .and_then(|version| hub.get(name, &version))
        .with_context(|| format!("{}@{} disappeared from the hub", name, version))?;

    if ctx.output.is_json() {
        return ctx.output.json(library);
    }

    ctx.output.success(&library.to_string());
    Ok(())
}
