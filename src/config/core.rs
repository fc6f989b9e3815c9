use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::Serialize;
use std::path::Path;

use super::FactorizerConfig;
use super::overrides::filter_unset;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "FACTORIZER_";

/// Layered configuration source
///
/// Priority, lowest first: embedded defaults, user config, repo config,
/// `--config` file, `FACTORIZER_*` environment, CLI flags.
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));
        figment = merge_any_format(figment, &Self::user_config_base_path());
        figment = merge_any_format(figment, "factorizer");

        if let Some(path) = custom_config {
            let path = Path::new(path);
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            tracing::trace!("CONFIG LOAD: Using custom config {}", path.display());
            figment = merge_file(figment, path);
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(cli) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(filter_unset(cli)));
        }

        Ok(ConfigLoader { figment })
    }

    /// Typed view of the merged configuration
    pub fn extract(&self) -> Result<FactorizerConfig> {
        self.figment
            .extract()
            .context("Failed to parse factorizer configuration")
    }

    fn user_config_base_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/factorizer/config"),
            Err(_) => "~/.config/factorizer/config".to_string(),
        }
    }
}

/// Merge `<base>.toml`, `<base>.json`, `<base>.yaml` and `<base>.yml` when present
fn merge_any_format(figment: Figment, base: &str) -> Figment {
    figment
        .merge(Toml::file(format!("{base}.toml")))
        .merge(Json::file(format!("{base}.json")))
        .merge(Yaml::file(format!("{base}.yaml")))
        .merge(Yaml::file(format!("{base}.yml")))
}

/// Merge a single file, picking the parser from its extension (TOML by default)
fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::parallel::Strategy;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults_match_struct_defaults() {
        let config: FactorizerConfig = Figment::from(Toml::string(DEFAULT_CONFIG))
            .extract()
            .unwrap();
        assert_eq!(config, FactorizerConfig::default());
    }

    #[test]
    fn test_config_loads_defaults() {
        let loader = ConfigLoader::load(None, None::<&()>).expect("Should load default config");
        let config = loader.extract().unwrap();
        assert!(config.progress.refresh_ms > 0);
    }

    #[test]
    fn test_custom_toml_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[run]\nstrategy = \"stream\"\nworkers = 6\n").unwrap();

        let config = ConfigLoader::load(path.to_str(), None::<&()>)
            .unwrap()
            .extract()
            .unwrap();
        assert_eq!(config.run.strategy, Strategy::Stream);
        assert_eq!(config.run.workers, 6);
    }

    #[test]
    fn test_custom_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "output:\n  format: json\n  list: true\n").unwrap();

        let config = ConfigLoader::load(path.to_str(), None::<&()>)
            .unwrap()
            .extract()
            .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.list);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let result = ConfigLoader::load(Some("does/not/exist.toml"), None::<&()>);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_win_and_unset_flags_do_not() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(&path, r#"{"run": {"strategy": "unbounded", "workers": 3}}"#).unwrap();

        let overrides = json!({
            "run": { "strategy": null, "workers": 9 },
            "progress": { "enabled": null }
        });
        let config = ConfigLoader::load(path.to_str(), Some(overrides))
            .unwrap()
            .extract()
            .unwrap();

        assert_eq!(config.run.strategy, Strategy::Unbounded);
        assert_eq!(config.run.workers, 9);
        assert!(config.progress.enabled);
    }

    #[test]
    fn test_invalid_strategy_rejected_on_extract() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[run]\nstrategy = \"quantum\"\n").unwrap();

        let loader = ConfigLoader::load(path.to_str(), None::<&()>).unwrap();
        assert!(loader.extract().is_err());
    }
}
