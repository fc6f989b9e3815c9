//! Configuration management for Factorizer
//!
//! Settings are merged from several layers with `figment` (see
//! [`ConfigLoader`]) and then extracted into the typed [`FactorizerConfig`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::parallel::Strategy;

mod core;
mod overrides;

pub use self::core::ConfigLoader;
pub use overrides::filter_unset;

/// Main configuration structure for Factorizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FactorizerConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Defaults applied to every classification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Strategy used when the command line does not pick one
    pub strategy: Strategy,

    /// Pool capacity (0 = available cores + 1)
    pub workers: usize,
}

/// Defaults for the interactive `watch` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Strategy used when `watch` is not given one
    pub strategy: Strategy,
}

/// Live progress display for the interactive mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub enabled: bool,

    /// Spinner tick interval in milliseconds
    pub refresh_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print every prime and composite after a run
    #[serde(default)]
    pub list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Pool,
            workers: 0,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Stream,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_ms: 100,
        }
    }
}

impl RunConfig {
    /// Pool capacity to request, `None` when the default should be used
    pub fn capacity(&self) -> Option<usize> {
        (self.workers > 0).then_some(self.workers)
    }
}

impl FactorizerConfig {
    /// Load the merged configuration
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        ConfigLoader::load(custom_config, cli_overrides)?.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_zero_means_default_capacity() {
        let mut run = RunConfig::default();
        assert_eq!(run.capacity(), None);
        run.workers = 4;
        assert_eq!(run.capacity(), Some(4));
    }

    #[test]
    fn test_watch_defaults_to_stream_independently_of_run() {
        let config = FactorizerConfig::default();
        assert_eq!(config.watch.strategy, Strategy::Stream);
        assert_eq!(config.run.strategy, Strategy::Pool);
    }
}
