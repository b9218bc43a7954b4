//! Score bench entry point
//!
//! Run with:
//! ```bash
//! SCORE_STORE=memory BENCH_WRITERS=64 cargo run -p score-bench --release
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use score_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

use score_bench::BenchConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Bench failed");
        eprintln!("score-bench: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let bench = BenchConfig::from_env()?;
    info!(
        app = %config.app.name,
        store = ?config.store,
        users = bench.users,
        writers = bench.writers,
        events_per_writer = bench.events_per_writer,
        "Configuration loaded"
    );

    let report = score_bench::run(&config, &bench).await?;
    info!(
        events = report.committed,
        rejected = report.rejected,
        elapsed_ms = report.elapsed.as_millis() as u64,
        events_per_sec = report.throughput(),
        "Bench finished, every score row matches the ledger"
    );
    Ok(())
}
