//! Line-mode request loop
//!
//! Repeatedly asks for an upper bound, an execution mode and (for the pool) a
//! capacity, classifies `[2, bound]` into a sink that is reset before every
//! request, and prints the runtime and counts. `-1` or end of input exits.

use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::cli::Output;
use crate::config::FactorizerConfig;
use crate::engine::{ClassifyRequest, classify_range};
use crate::parallel::Strategy;
use crate::sink::ResultSink;

const EXIT_SENTINEL: i64 = -1;

#[derive(Args)]
pub struct PromptArgs {
    /// Print every prime and composite after each run
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(args: PromptArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = FactorizerConfig::load(config_path, None::<&()>)?;
    output.verbose("reading requests from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let session = PromptSession {
        default_capacity: config.run.capacity(),
        list: args.list || config.output.list,
    };
    session.run(stdin.lock(), &mut stdout)
}

struct PromptSession {
    /// Capacity used when the user answers 0
    default_capacity: Option<usize>,
    list: bool,
}

impl PromptSession {
    fn run<R: BufRead, W: Write>(&self, mut input: R, out: &mut W) -> Result<()> {
        let sink = ResultSink::new();

        loop {
            sink.reset();

            let Some(limit) = ask::<i64, _, _>(
                &mut input,
                out,
                "Please enter number to calculate primes up to (-1 to exit): ",
            )?
            else {
                return Ok(());
            };
            if limit == EXIT_SENTINEL {
                return Ok(());
            }

            let Some(strategy) = ask::<Strategy, _, _>(
                &mut input,
                out,
                "Enter execution mode (1 - sequential, 2 - unbounded, 3 - pool, 4 - stream): ",
            )?
            else {
                return Ok(());
            };

            let mut request = ClassifyRequest::new(2, limit, strategy);
            if strategy == Strategy::Pool {
                let Some(capacity) = ask::<usize, _, _>(
                    &mut input,
                    out,
                    "Enter thread pool capacity (0 for number of cores + 1): ",
                )?
                else {
                    return Ok(());
                };
                request.capacity = if capacity == 0 {
                    self.default_capacity
                } else {
                    Some(capacity)
                };
            }

            match classify_range(&request, &sink, None) {
                Ok(report) => {
                    writeln!(out, "Runtime: {}ms", report.elapsed.as_millis())?;
                    writeln!(out, "Prime list size: {}", report.primes)?;
                    writeln!(out, "Nonprime list size: {}", report.nonprimes)?;
                    if self.list {
                        self.write_listing(&sink, out)?;
                    }
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
    }

    fn write_listing<W: Write>(&self, sink: &ResultSink, out: &mut W) -> Result<()> {
        let primes: Vec<String> = sink.primes().iter().map(u64::to_string).collect();
        writeln!(out, "Primes: {}", primes.join(", "))?;
        for (n, divisors) in sink.nonprimes() {
            writeln!(out, "{n}: {divisors:?}")?;
        }
        Ok(())
    }
}

/// Ask until the answer parses; `None` on end of input
fn ask<T, R, W>(input: &mut R, out: &mut W, question: &str) -> Result<Option<T>>
where
    T: FromStr,
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{question}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        match line.trim().parse::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(out, "Invalid input '{}', try again", line.trim())?,
        }
    }
}
