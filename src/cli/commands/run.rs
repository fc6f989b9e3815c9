use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{print_listing, print_report_json, print_report_text};
use crate::cli::Output;
use crate::config::{FactorizerConfig, OutputFormat};
use crate::engine::{ClassifyRequest, classify_range};
use crate::parallel::Strategy;
use crate::sink::ResultSink;

#[derive(Args)]
pub struct RunArgs {
    /// First integer of the range (inclusive)
    #[arg(short, long, default_value = "2", allow_negative_numbers = true)]
    pub start: i64,

    /// Last integer of the range (inclusive)
    #[arg(short, long, allow_negative_numbers = true)]
    pub end: i64,

    /// Execution strategy (defaults to run.strategy from config)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Worker pool capacity for the pool strategy
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print every prime and composite after the run
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(args: RunArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let overrides = json!({
        "run": { "strategy": args.strategy },
        "output": {
            "format": args.format,
            "list": args.list.then_some(true)
        }
    });
    let config = FactorizerConfig::load(config_path, Some(overrides))?;

    let request = build_request(&args, &config);
    tracing::debug!("run request: {:?}", request);

    let sink = ResultSink::new();
    let report = classify_range(&request, &sink, None)?;

    match config.output.format {
        OutputFormat::Json => print_report_json(&report, &sink, config.output.list)?,
        OutputFormat::Text => {
            print_report_text(&report, output);
            if config.output.list {
                print_listing(&sink, output);
            }
        }
    }

    Ok(())
}

/// An explicit `--workers` is passed through as-is (so 0 is rejected); the
/// config value uses 0 to mean "default capacity".
fn build_request(args: &RunArgs, config: &FactorizerConfig) -> ClassifyRequest {
    ClassifyRequest {
        lo: args.start,
        hi: args.end,
        strategy: config.run.strategy,
        capacity: args.workers.or_else(|| config.run.capacity()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(workers: Option<usize>) -> RunArgs {
        RunArgs {
            start: 2,
            end: 50,
            strategy: None,
            workers,
            format: None,
            list: false,
        }
    }

    #[test]
    fn test_explicit_workers_take_priority() {
        let mut config = FactorizerConfig::default();
        config.run.workers = 3;

        assert_eq!(build_request(&args(Some(7)), &config).capacity, Some(7));
        assert_eq!(build_request(&args(None), &config).capacity, Some(3));
    }

    #[test]
    fn test_config_zero_workers_means_default() {
        let config = FactorizerConfig::default();
        let request = build_request(&args(None), &config);
        assert_eq!(request.capacity, None);
        assert_eq!(request.strategy, Strategy::Pool);
    }

    #[test]
    fn test_explicit_zero_workers_is_kept_for_validation() {
        let config = FactorizerConfig::default();
        let request = build_request(&args(Some(0)), &config);
        assert_eq!(request.capacity, Some(0));
        assert!(request.validate().is_err());
    }
}
