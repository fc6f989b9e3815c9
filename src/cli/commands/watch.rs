//! Interactive classification with a live prime counter
//!
//! The run executes on a blocking thread while the async side waits for
//! Ctrl-C. Pressing it flips the cancellation token; workers stop publishing
//! and the completion hook still fires so the display is closed properly.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use super::{print_listing, print_report_text};
use crate::cli::Output;
use crate::config::FactorizerConfig;
use crate::engine::{ClassifyRequest, RangeRun};
use crate::parallel::{CancellationToken, PrimeProgress, Strategy};
use crate::sink::ResultSink;

#[derive(Args)]
pub struct WatchArgs {
    /// First integer of the range (inclusive)
    #[arg(short, long, allow_negative_numbers = true)]
    pub start: i64,

    /// Last integer of the range (inclusive)
    #[arg(short, long, allow_negative_numbers = true)]
    pub end: i64,

    /// Execution strategy (defaults to `watch.strategy` from config)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Worker pool capacity for the pool strategy
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Disable the live progress display
    #[arg(long)]
    pub no_progress: bool,

    /// Print every prime and composite after the run
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(args: WatchArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = FactorizerConfig::load(config_path, None::<&()>)?;
    let strategy = args.strategy.unwrap_or(config.watch.strategy);

    let request = ClassifyRequest {
        lo: args.start,
        hi: args.end,
        strategy,
        capacity: args.workers.or_else(|| config.run.capacity()),
    };
    // Fail fast, before any display is drawn
    request.validate()?;

    let show_progress = config.progress.enabled
        && !args.no_progress
        && !output.is_quiet()
        && atty::is(atty::Stream::Stderr);
    let progress = if show_progress {
        PrimeProgress::new(&format!("[{}, {}]", args.start, args.end), config.progress.refresh_ms)
    } else {
        PrimeProgress::hidden()
    };

    if strategy == Strategy::Sequential {
        output.warning("sequential runs do not observe cancellation; Ctrl-C will not stop them");
    }

    let token = CancellationToken::new();
    let signal_task = tokio::spawn(cancel_on_ctrl_c(token.clone()));

    let sink = {
        let progress = progress.clone();
        Arc::new(ResultSink::with_progress(move |count| progress.update(count)))
    };

    let report = {
        let sink = sink.clone();
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || {
            RangeRun::new(request, &sink)
                .token(token)
                .on_complete(move |report| {
                    if report.cancelled {
                        progress.abandon(format!("Primes: {} (cancelled)", report.primes));
                    } else {
                        progress.finish(format!("Primes: {}", report.primes));
                    }
                })
                .run()
        })
        .await??
    };

    signal_task.abort();

    print_report_text(&report, output);
    if args.list || config.output.list {
        print_listing(&sink, output);
    }

    Ok(())
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            if token.cancel() {
                tracing::info!("cancellation requested; waiting for in-flight tasks");
            }
        }
        Err(e) => tracing::warn!("could not listen for Ctrl-C: {e}"),
    }
}
