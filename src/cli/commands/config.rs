//! Configuration command implementations

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};

use crate::config::FactorizerConfig;

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

pub async fn execute(cmd: ConfigCommands, config_path: Option<&str>) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => {
            let config = FactorizerConfig::load(config_path, None::<&()>)?;
            print!("{}", render(&config, format)?);
            Ok(())
        }
    }
}

fn render(config: &FactorizerConfig, format: ConfigFormat) -> Result<String> {
    let rendered = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("Failed to render TOML")?,
        ConfigFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(config).context("Failed to render JSON")?;
            json.push('\n');
            json
        }
        ConfigFormat::Yaml => serde_yml::to_string(config).context("Failed to render YAML")?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let config = FactorizerConfig::default();

        let toml = render(&config, ConfigFormat::Toml).unwrap();
        assert!(toml.contains("[run]"));
        assert!(toml.contains("strategy = \"pool\""));

        let json = render(&config, ConfigFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["progress"]["refresh_ms"], 100);

        let yaml = render(&config, ConfigFormat::Yaml).unwrap();
        assert!(yaml.contains("format: text"));
    }

    #[test]
    fn test_rendered_toml_round_trips() {
        let config = FactorizerConfig::default();
        let toml = render(&config, ConfigFormat::Toml).unwrap();
        let parsed: FactorizerConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }
}
