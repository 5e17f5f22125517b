//! libhub.toml configuration parsing and serialization

use camino::{Utf8Path, Utf8PathBuf};
use libhub_core::{Version, VersionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use toml_edit::{value, ArrayOfTables, DocumentMut, Item, Table};

use crate::{ConfigError, ConfigResult};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log levels accepted in `[log] level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete libhub.toml configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HubToml {
    /// Where libraries are loaded from
    #[serde(default)]
    pub hub: HubSection,

    /// Dependency edges applied after loading
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,

    /// Terminal output settings
    #[serde(default)]
    pub output: OutputSection,

    /// Logging settings
    #[serde(default)]
    pub log: LogSection,
}

/// `[hub]` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HubSection {
    /// Library files to import, in order
    #[serde(default)]
    pub sources: Vec<Utf8PathBuf>,
}

/// One `[[dependencies]]` entry: `library@version` depends on the
/// latest `dependency` matching `spec`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub library: String,
    pub version: String,
    pub dependency: String,
    pub spec: String,
}

/// `[output]` section
///
/// Keys left out of a file stay `None` so a lower layer can supply them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl OutputSection {
    /// Effective color choice
    pub fn color(&self) -> ColorChoice {
        self.color.unwrap_or_default()
    }

    /// Effective output format
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Overlay the keys `upper` sets
    pub fn merge(&mut self, upper: OutputSection) {
        self.color = upper.color.or(self.color);
        self.format = upper.format.or(self.format);
    }
}

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Emit log lines as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl LogSection {
    /// Effective log level, `warn` when no layer sets one
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Whether log lines are JSON
    pub fn json(&self) -> bool {
        self.json.unwrap_or(false)
    }

    /// Overlay the keys `upper` sets
    pub fn merge(&mut self, upper: LogSection) {
        if upper.level.is_some() {
            self.level = upper.level;
        }
        self.json = upper.json.or(self.json);
    }
}

impl FromStr for ColorChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(ConfigError::validation(
                "output.color",
                format!("expected auto, always or never, found '{}'", other),
            )),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::validation(
                "output.format",
                format!("expected text or json, found '{}'", other),
            )),
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} -> {} {}",
            self.library, self.version, self.dependency, self.spec
        )
    }
}

impl DependencyEntry {
    /// Parse the exact version of the receiving library
    pub fn parsed_version(&self) -> ConfigResult<Version> {
        self.version.parse().map_err(|e| {
            ConfigError::validation(
                format!("dependencies.{}.version", self.library),
                format!("'{}' is not a version: {}", self.version, e),
            )
        })
    }

    /// Parse the specification selecting the dependency
    pub fn parsed_spec(&self) -> ConfigResult<VersionSpec> {
        self.spec.parse().map_err(|e| {
            ConfigError::validation(
                format!("dependencies.{}.spec", self.library),
                format!("'{}' is not a version specification: {}", self.spec, e),
            )
        })
    }
}

impl HubToml {
    /// Make relative source paths relative to `base`
    pub fn resolve_sources(&mut self, base: &Utf8Path) {
        for source in &mut self.hub.sources {
            if source.is_relative() {
                *source = base.join(&*source);
            }
        }
    }
}

/// Parse TOML string to HubToml configuration
pub fn parse_hub_toml(content: &str) -> ConfigResult<HubToml> {
    parse_named(content, "libhub.toml")
}

fn parse_named(content: &str, file: &str) -> ConfigResult<HubToml> {
    let config: HubToml = ::toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| position(content, span.start))
            .unwrap_or((0, 0));
        ConfigError::TomlParse {
            file: file.to_string(),
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// 1-based line and column of a byte offset
fn position(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    (line, column)
}

/// Serialize HubToml to TOML string
pub fn serialize_hub_toml(config: &HubToml) -> ConfigResult<String> {
    ::toml::to_string_pretty(config)
        .map_err(|e| ConfigError::validation("libhub.toml", format!("serialization failed: {}", e)))
}

/// Validate configuration values that serde cannot check
pub fn validate_config(config: &HubToml) -> ConfigResult<()> {
    let level = config.log.level();
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::validation(
            "log.level",
            format!(
                "'{}' is not one of {}",
                level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    for entry in &config.dependencies {
        validate_dependency_entry(entry)?;
    }

    Ok(())
}

fn validate_dependency_entry(entry: &DependencyEntry) -> ConfigResult<()> {
    if entry.library.trim().is_empty() {
        return Err(ConfigError::validation(
            "dependencies.library",
            "library name must not be empty",
        ));
    }
    if entry.dependency.trim().is_empty() {
        return Err(ConfigError::validation(
            format!("dependencies.{}.dependency", entry.library),
            "dependency name must not be empty",
        ));
    }
    entry.parsed_version()?;
    entry.parsed_spec()?;
    Ok(())
}

/// Load and parse libhub.toml from file path
///
/// Relative `[hub] sources` are resolved against the file's directory.
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<HubToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::io(format!("Failed to read {}", path), e))?;

    let mut config = parse_named(&content, path.as_str())?;
    if let Some(dir) = path.parent() {
        config.resolve_sources(dir);
    }
    Ok(config)
}

/// Append a `[[dependencies]]` entry to a TOML document, keeping the
/// rest of the document's formatting
pub fn append_dependency(content: &str, entry: &DependencyEntry) -> ConfigResult<String> {
    validate_dependency_entry(entry)?;

    let mut document = content.parse::<DocumentMut>().map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| position(content, span.start))
            .unwrap_or((0, 0));
        ConfigError::TomlParse {
            file: "libhub.toml".to_string(),
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    let dependencies = document
        .entry("dependencies")
        .or_insert(Item::ArrayOfTables(ArrayOfTables::new()))
        .as_array_of_tables_mut()
        .ok_or_else(|| {
            ConfigError::validation("dependencies", "expected an array of [[dependencies]] tables")
        })?;

    let mut table = Table::new();
    table["library"] = value(entry.library.as_str());
    table["version"] = value(entry.version.as_str());
    table["dependency"] = value(entry.dependency.as_str());
    table["spec"] = value(entry.spec.as_str());
    dependencies.push(table);

    Ok(document.to_string())
}

/// Append a dependency entry to the file at `path`, creating it if needed
pub fn save_dependency(path: &Utf8Path, entry: &DependencyEntry) -> ConfigResult<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::io(format!("Failed to read {}", path), e)),
    };

    let updated = append_dependency(&content, entry)?;
    std::fs::write(path, updated)
        .map_err(|e| ConfigError::io(format!("Failed to write {}", path), e))
}
