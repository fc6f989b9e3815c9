//! Version command implementation
//!
//! Prints the package version together with the concurrency the strategies
//! will see on this machine.

use crate::cli::Output;
use crate::parallel::default_pool_workers;
use anyhow::Result;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    output.header(&format!("{name} v{version}"));
    output.table_row("Description", description);
    output.blank_line();

    output.table_row("CPU cores", &num_cpus::get().to_string());
    output.table_row("Default pool size", &default_pool_workers().to_string());
    output.table_row("Stream threads", &rayon::current_num_threads().to_string());
    output.table_row("Target", std::env::consts::ARCH);
    output.table_row(
        "Profile",
        if cfg!(debug_assertions) { "debug" } else { "release" },
    );

    Ok(())
}
