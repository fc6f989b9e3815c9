//! Command implementations for the Factorizer CLI
//!
//! Each command is organized into its own module. Helpers shared by the
//! range-running commands live here.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::cli::Output;
use crate::engine::RunReport;
use crate::factor::DivisorList;
use crate::sink::ResultSink;

pub mod compare;
pub mod config;
pub mod prompt;
pub mod run;
pub mod version;
pub mod watch;

/// JSON shape for a single run, with the sink contents when requested
#[derive(Serialize)]
struct RunDocument<'a> {
    report: &'a RunReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    primes: Option<BTreeSet<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonprimes: Option<BTreeMap<u64, DivisorList>>,
}

pub(crate) fn print_report_json(report: &RunReport, sink: &ResultSink, list: bool) -> Result<()> {
    let document = RunDocument {
        report,
        primes: list.then(|| sink.primes()),
        nonprimes: list.then(|| sink.nonprimes()),
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

pub(crate) fn print_report_text(report: &RunReport, output: &Output) {
    let workers = report
        .workers
        .map(|w| format!(" ({w} workers)"))
        .unwrap_or_default();
    let headline = format!(
        "Classified [{}, {}] with {}{}",
        report.lo, report.hi, report.strategy, workers
    );

    if report.cancelled {
        output.warning(&format!("{headline}: cancelled before completion"));
    } else {
        output.success(&headline);
    }

    output.table_row("Runtime", &format!("{} ms", report.elapsed.as_millis()));
    output.table_row("Primes", &report.primes.to_string());
    output.table_row("Nonprimes", &report.nonprimes.to_string());
    output.verbose(&format!("run id {}", report.run_id));

    if report.failed > 0 {
        output.warning(&format!(
            "{} integers could not be classified and were left out",
            report.failed
        ));
    }
}

/// Print every prime and every composite with its divisors
pub(crate) fn print_listing(sink: &ResultSink, output: &Output) {
    output.header("Primes");
    let primes: Vec<String> = sink.primes().iter().map(u64::to_string).collect();
    if !primes.is_empty() {
        output.list_item(&primes.join(", "));
    }

    output.header("Nonprimes");
    for (n, divisors) in sink.nonprimes() {
        let divisors: Vec<String> = divisors.iter().map(u64::to_string).collect();
        output.list_item(&format!("{n}: [{}]", divisors.join(", ")));
    }
}
