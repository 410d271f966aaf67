//! Economy Metrics CLI
//!
//! Command-line interface for aggregating transfer transactions.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ingest transactions.csv
//! cargo run -- --database metrics.db simulate --count 10000 --seed 7
//! cargo run -- report balances --date 2024-01-01 > balances.csv
//! cargo run -- report recent --account 1000000000000001
//! ```
//!
//! Aggregates are kept in the SQLite database given by `--database` (or
//! `ECONOMY_DB`, also read from a `.env` file). Reports are written to stdout;
//! logs go to stderr and are filtered with `RUST_LOG` (default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, database unavailable, invalid option, etc.)

use economy_metrics::cli;
use std::process;

fn main() {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = cli::parse_args();

    let mut output = std::io::stdout();
    if let Err(e) = cli::run(&args, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
