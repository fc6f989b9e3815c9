use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::Output;
use crate::config::{FactorizerConfig, OutputFormat};
use crate::engine::{ClassifyRequest, RunReport, classify_range};
use crate::parallel::Strategy;
use crate::sink::ResultSink;

#[derive(Args)]
pub struct CompareArgs {
    /// First integer of the range (inclusive)
    #[arg(short, long, default_value = "2", allow_negative_numbers = true)]
    pub start: i64,

    /// Last integer of the range (inclusive)
    #[arg(short, long, allow_negative_numbers = true)]
    pub end: i64,

    /// Worker pool capacity for the pool strategy
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Strategies to leave out (e.g. unbounded for very large ranges)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub skip: Vec<Strategy>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct Comparison {
    consistent: bool,
    runs: Vec<RunReport>,
}

pub async fn execute(args: CompareArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let overrides = serde_json::json!({ "output": { "format": args.format } });
    let config = FactorizerConfig::load(config_path, Some(overrides))?;

    let strategies: Vec<Strategy> = Strategy::ALL
        .into_iter()
        .filter(|s| !args.skip.contains(s))
        .collect();
    if strategies.is_empty() {
        anyhow::bail!("Every strategy was skipped; nothing to compare");
    }

    let capacity = args.workers.or_else(|| config.run.capacity());
    let comparison = compare(args.start, args.end, capacity, &strategies)?;

    match config.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
        OutputFormat::Text => print_table(&comparison, output),
    }

    if !comparison.consistent {
        anyhow::bail!("Strategies disagreed on the final results");
    }
    Ok(())
}

/// Run each strategy on a fresh sink and check that the final contents agree
fn compare(lo: i64, hi: i64, capacity: Option<usize>, strategies: &[Strategy]) -> Result<Comparison> {
    let mut runs = Vec::with_capacity(strategies.len());
    let mut reference: Option<ResultSink> = None;
    let mut consistent = true;

    for &strategy in strategies {
        let request = ClassifyRequest {
            lo,
            hi,
            strategy,
            capacity,
        };
        let sink = ResultSink::new();
        let report = classify_range(&request, &sink, None)?;
        tracing::info!("{strategy} finished in {:?}", report.elapsed);

        match &reference {
            Some(expected) => {
                if expected.primes() != sink.primes() || expected.nonprimes() != sink.nonprimes() {
                    tracing::error!("{strategy} disagrees with {}", strategies[0]);
                    consistent = false;
                }
            }
            None => reference = Some(sink),
        }
        runs.push(report);
    }

    Ok(Comparison { consistent, runs })
}

fn print_table(comparison: &Comparison, output: &Output) {
    output.header("Strategy comparison");
    if !output.is_quiet() {
        println!(
            "  {:<12} {:>8} {:>12} {:>10} {:>10}",
            "strategy", "workers", "runtime ms", "primes", "nonprimes"
        );
    }
    output.separator();

    for run in &comparison.runs {
        if output.is_quiet() {
            break;
        }
        let workers = run
            .workers
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} {:>8} {:>12} {:>10} {:>10}",
            run.strategy.name(),
            workers,
            run.elapsed.as_millis(),
            run.primes,
            run.nonprimes
        );
    }

    output.blank_line();
    if comparison.consistent {
        output.success("All strategies produced identical results");
    } else {
        output.error("Strategies produced different results");
    }
}
