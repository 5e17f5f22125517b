//! Configuration layering, file discovery, and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use tracing::debug;

use crate::toml::{validate_config, HubToml};
use crate::{ConfigError, ConfigResult};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "libhub.toml";

/// Prefix shared by all environment overrides
const ENV_PREFIX: &str = "LIBHUB_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Location of the per-user configuration file
    global_path: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project libhub.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Result of loading every configuration layer
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: HubToml,
    /// The project file that was found, if any
    pub project_path: Option<Utf8PathBuf>,
    /// Layers that contributed, lowest priority first
    pub sources: Vec<ConfigSource>,
}

impl LoadedConfig {
    /// Where `--save` writes new dependency entries
    pub fn save_path(&self, cwd: &Utf8Path) -> Utf8PathBuf {
        self.project_path
            .clone()
            .unwrap_or_else(|| cwd.join(CONFIG_FILE))
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            global_path: Self::default_global_path(),
        }
    }

    /// Use `path` as the global configuration file instead of the one in
    /// the home directory
    pub fn with_global_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    /// `~/.libhub/config.toml`, when the home directory is known
    pub fn default_global_path() -> Option<Utf8PathBuf> {
        let home = dirs::home_dir()?;
        let home = Utf8PathBuf::try_from(home).ok()?;
        Some(home.join(".libhub").join("config.toml"))
    }

    /// Load every layer and merge them
    pub fn load(&self, cli_overrides: &HashMap<String, String>) -> ConfigResult<LoadedConfig> {
        let mut sources = Vec::new();

        let global = self.load_global_config()?;
        if let (Some(_), Some(path)) = (&global, &self.global_path) {
            sources.push(ConfigSource::Global(path.clone()));
        }

        let project = self.load_project_config()?;
        let project_path = match &project {
            Some((_, ConfigSource::Project(path))) => Some(path.clone()),
            _ => None,
        };
        if let Some((_, source)) = &project {
            sources.push(source.clone());
        }

        let env_overrides = ConfigLayering::collect_env_overrides();
        sources.extend(
            env_overrides
                .keys()
                .map(|key| ConfigSource::Environment(key.clone())),
        );
        if !cli_overrides.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let config = ConfigLayering::merge_configs(
            global,
            project.map(|(config, _)| config),
            &env_overrides,
            cli_overrides,
        )?;

        Ok(LoadedConfig {
            config,
            project_path,
            sources,
        })
    }

    /// Load the nearest project configuration, if there is one
    pub fn load_project_config(&self) -> ConfigResult<Option<(HubToml, ConfigSource)>> {
        match self.resolve_config_path(CONFIG_FILE) {
            Some(path) => {
                debug!(%path, "Loading project configuration");
                let config = crate::toml::load_from_file(&path)?;
                Ok(Some((config, ConfigSource::Project(path))))
            },
            None => Ok(None),
        }
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(filename);
            if config_path.is_file() {
                return Some(config_path);
            }
            current = dir.parent();
        }

        None
    }

    /// Load global configuration
    pub fn load_global_config(&self) -> ConfigResult<Option<HubToml>> {
        match &self.global_path {
            Some(path) if path.is_file() => {
                debug!(%path, "Loading global configuration");
                crate::toml::load_from_file(path).map(Some)
            },
            _ => Ok(None),
        }
    }
}

impl ConfigLayering {
    /// Merge multiple configuration layers
    ///
    /// Sources and dependency entries accumulate, global first. Output and
    /// log keys set by the project file override the global ones.
    pub fn merge_configs(
        global_config: Option<HubToml>,
        project_config: Option<HubToml>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<HubToml> {
        let mut merged = match (global_config, project_config) {
            (Some(mut global), Some(project)) => {
                global.hub.sources.extend(project.hub.sources);
                global.dependencies.extend(project.dependencies);
                global.output.merge(project.output);
                global.log.merge(project.log);
                global
            },
            (Some(config), None) | (None, Some(config)) => config,
            (None, None) => HubToml::default(),
        };

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        validate_config(&merged)?;
        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut HubToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "LIBHUB_SOURCES" => {
                    for path in std::env::split_paths(value) {
                        let path = Utf8PathBuf::try_from(path).map_err(|e| {
                            ConfigError::validation(key.as_str(), format!("non UTF-8 path: {}", e))
                        })?;
                        if !path.as_str().is_empty() {
                            config.hub.sources.push(path);
                        }
                    }
                },
                "LIBHUB_LOG" => config.log.level = Some(value.clone()),
                "LIBHUB_LOG_JSON" => config.log.json = Some(parse_flag(key, value)?),
                "LIBHUB_COLOR" => config.output.color = Some(value.parse()?),
                "LIBHUB_FORMAT" => config.output.format = Some(value.parse()?),
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut HubToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "log" => config.log.level = Some(value.clone()),
                "log_json" => config.log.json = Some(parse_flag(key, value)?),
                "color" => config.output.color = Some(value.parse()?),
                "format" => config.output.format = Some(value.parse()?),
                _ => {},
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn parse_flag(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::validation(
            key,
            format!("expected a boolean, found '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toml::{ColorChoice, DependencyEntry, OutputFormat};
    use tempfile::TempDir;

    fn temp_path(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    fn config_with(source: &str, library: &str) -> HubToml {
        let mut config = HubToml::default();
        config.hub.sources.push(Utf8PathBuf::from(source));
        config.dependencies.push(DependencyEntry {
            library: library.to_string(),
            version: "1.0.0".to_string(),
            dependency: "log".to_string(),
            spec: "^1.0.0".to_string(),
        });
        config
    }

    #[test]
    fn test_resolve_config_path_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE), "").unwrap();

        let loader = ConfigLoader::new(nested);
        assert_eq!(loader.resolve_config_path(CONFIG_FILE), Some(root.join(CONFIG_FILE)));
    }

    #[test]
    fn test_load_without_any_file() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(temp_path(&temp_dir)).with_global_path(None);

        assert!(loader.load_project_config().unwrap().is_none());
        assert!(loader.load_global_config().unwrap().is_none());
    }

    #[test]
    fn test_load_layers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_path(&temp_dir);
        let global_path = root.join("global.toml");
        std::fs::write(&global_path, "[hub]\nsources = [\"shared.csv\"]\n[log]\nlevel = \"info\"\n")
            .unwrap();
        let project = root.join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join(CONFIG_FILE), "[hub]\nsources = [\"local.csv\"]\n").unwrap();

        let loader = ConfigLoader::new(project.clone()).with_global_path(Some(global_path.clone()));
        let cli = HashMap::from([("format".to_string(), "json".to_string())]);
        let loaded = loader.load(&cli).unwrap();

        assert_eq!(
            loaded.config.hub.sources,
            vec![root.join("shared.csv"), project.join("local.csv")]
        );
        // The project file has no [log] section, so the global level stays.
        assert_eq!(loaded.config.log.level(), "info");
        assert_eq!(loaded.config.output.format(), OutputFormat::Json);
        assert_eq!(loaded.project_path, Some(project.join(CONFIG_FILE)));
        assert_eq!(loaded.sources[0], ConfigSource::Global(global_path));
        assert!(loaded.sources.contains(&ConfigSource::CommandLine));
        assert_eq!(loaded.save_path(&root), project.join(CONFIG_FILE));
    }

    #[test]
    fn test_save_path_defaults_to_cwd() {
        let loaded = LoadedConfig {
            config: HubToml::default(),
            project_path: None,
            sources: Vec::new(),
        };
        let cwd = Utf8PathBuf::from("/work");
        assert_eq!(loaded.save_path(&cwd), cwd.join(CONFIG_FILE));
    }

    #[test]
    fn test_merge_configs() {
        let global = config_with("global.csv", "shared");
        let mut project = config_with("project.csv", "app");
        project.output.color = Some(ColorChoice::Never);

        let env_overrides = HashMap::from([
            ("LIBHUB_LOG".to_string(), "debug".to_string()),
            ("LIBHUB_FORMAT".to_string(), "json".to_string()),
        ]);
        let cli_overrides = HashMap::from([("color".to_string(), "always".to_string())]);

        let merged = ConfigLayering::merge_configs(
            Some(global),
            Some(project),
            &env_overrides,
            &cli_overrides,
        )
        .unwrap();

        assert_eq!(
            merged.hub.sources,
            vec![Utf8PathBuf::from("global.csv"), Utf8PathBuf::from("project.csv")]
        );
        let libraries: Vec<&str> = merged.dependencies.iter().map(|d| d.library.as_str()).collect();
        assert_eq!(libraries, vec!["shared", "app"]);
        assert_eq!(merged.log.level(), "debug");
        assert_eq!(merged.output.format(), OutputFormat::Json);
        // CLI flags have the highest priority
        assert_eq!(merged.output.color(), ColorChoice::Always);
    }

    #[test]
    fn test_project_without_sections_keeps_global_settings() {
        let global = crate::toml::parse_hub_toml(
            "[output]\ncolor = \"never\"\n[log]\nlevel = \"error\"\njson = true\n",
        )
        .unwrap();
        let project = crate::toml::parse_hub_toml(
            "[hub]\nsources = [\"a.csv\"]\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let merged = ConfigLayering::merge_configs(
            Some(global),
            Some(project),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(merged.output.color(), ColorChoice::Never);
        assert_eq!(merged.output.format(), OutputFormat::Json);
        assert_eq!(merged.log.level(), "error");
        assert!(merged.log.json());
        assert_eq!(merged.hub.sources, vec![Utf8PathBuf::from("a.csv")]);
    }

    #[test]
    fn test_env_sources_are_appended() {
        let joined = std::env::join_paths(["one.csv", "two.csv"]).unwrap();
        let env_overrides = HashMap::from([(
            "LIBHUB_SOURCES".to_string(),
            joined.into_string().unwrap(),
        )]);

        let merged = ConfigLayering::merge_configs(
            None,
            Some(config_with("base.csv", "app")),
            &env_overrides,
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(
            merged.hub.sources,
            vec![
                Utf8PathBuf::from("base.csv"),
                Utf8PathBuf::from("one.csv"),
                Utf8PathBuf::from("two.csv"),
            ]
        );
    }

    #[test]
    fn test_invalid_override_values() {
        let bad_color = HashMap::from([("LIBHUB_COLOR".to_string(), "purple".to_string())]);
        assert!(ConfigLayering::merge_configs(None, None, &bad_color, &HashMap::new()).is_err());

        let bad_flag = HashMap::from([("log_json".to_string(), "maybe".to_string())]);
        assert!(ConfigLayering::merge_configs(None, None, &HashMap::new(), &bad_flag).is_err());

        let bad_level = HashMap::from([("LIBHUB_LOG".to_string(), "chatty".to_string())]);
        assert!(matches!(
            ConfigLayering::merge_configs(None, None, &bad_level, &HashMap::new()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_collect_env_overrides() {
        std::env::set_var("LIBHUB_TEST_COLLECT", "1");
        std::env::set_var("NOT_LIBHUB_TEST_COLLECT", "ignored");

        let overrides = ConfigLayering::collect_env_overrides();

        assert!(overrides.contains_key("LIBHUB_TEST_COLLECT"));
        assert!(!overrides.contains_key("NOT_LIBHUB_TEST_COLLECT"));

        std::env::remove_var("LIBHUB_TEST_COLLECT");
        std::env::remove_var("NOT_LIBHUB_TEST_COLLECT");
    }
}
