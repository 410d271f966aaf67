use crate::core::RECENT_ACTIVITY_LIMIT;
use crate::types::AccountId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Aggregate transfer transactions into per-group and per-account metrics
#[derive(Parser, Debug)]
#[command(name = "economy-metrics")]
#[command(about = "Aggregate transfer transactions into group and account metrics", long_about = None)]
pub struct CliArgs {
    /// SQLite database holding the aggregates
    #[arg(
        long = "database",
        value_name = "PATH",
        env = "ECONOMY_DB",
        default_value = "economy.db",
        help = "SQLite database file, or ':memory:' for a throwaway store"
    )]
    pub database: PathBuf,

    /// Recent-activity entries kept per account
    #[arg(
        long = "window-size",
        value_name = "N",
        default_value_t = RECENT_ACTIVITY_LIMIT,
        help = "Recent-activity entries kept per account"
    )]
    pub window_size: usize,

    /// How long to wait on a locked database
    #[arg(
        long = "busy-timeout-ms",
        value_name = "MS",
        default_value_t = 5000,
        help = "Milliseconds to wait for a locked database before failing"
    )]
    pub busy_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Aggregate transactions from a CSV file
    Ingest {
        #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
        input_file: PathBuf,

        #[arg(
            long = "max-retries",
            value_name = "N",
            default_value_t = 0,
            help = "Extra attempts for a transaction that failed to process"
        )]
        max_retries: u32,
    },

    /// Aggregate randomly generated transactions
    Simulate {
        #[arg(long = "count", value_name = "N", default_value_t = 1000)]
        count: usize,

        #[arg(long = "seed", value_name = "SEED", default_value_t = 42)]
        seed: u64,

        #[arg(
            long = "start",
            value_name = "TIMESTAMP",
            help = "Timestamp of the first transaction (default: now)"
        )]
        start: Option<String>,
    },

    /// Print an aggregate table as CSV
    Report {
        #[arg(value_name = "KIND")]
        kind: ReportKind,

        #[arg(long = "date", value_name = "YYYY-MM-DD")]
        date: Option<String>,

        #[arg(long = "account", value_name = "ID")]
        account: Option<AccountId>,
    },
}

/// Aggregate tables that can be reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Transfers,
    Balances,
    Recent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::defaults(&["program", "report", "transfers"], "economy.db", 20, 5000)]
    #[case::memory(&["program", "--database", ":memory:", "report", "balances"], ":memory:", 20, 5000)]
    #[case::all_options(
        &["program", "--database", "x.db", "--window-size", "5", "--busy-timeout-ms", "10", "report", "transfers"],
        "x.db",
        5,
        10
    )]
    fn test_global_options(
        #[case] args: &[&str],
        #[case] database: &str,
        #[case] window_size: usize,
        #[case] busy_timeout_ms: u64,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.database, PathBuf::from(database));
        assert_eq!(parsed.window_size, window_size);
        assert_eq!(parsed.busy_timeout_ms, busy_timeout_ms);
    }

    #[rstest]
    #[case::ingest(
        &["program", "ingest", "input.csv"],
        Command::Ingest { input_file: PathBuf::from("input.csv"), max_retries: 0 }
    )]
    #[case::ingest_retries(
        &["program", "ingest", "--max-retries", "3", "input.csv"],
        Command::Ingest { input_file: PathBuf::from("input.csv"), max_retries: 3 }
    )]
    #[case::simulate_defaults(
        &["program", "simulate"],
        Command::Simulate { count: 1000, seed: 42, start: None }
    )]
    #[case::simulate(
        &["program", "simulate", "--count", "10", "--seed", "7", "--start", "2024-01-01"],
        Command::Simulate { count: 10, seed: 7, start: Some("2024-01-01".to_string()) }
    )]
    #[case::report_recent(
        &["program", "report", "recent", "--account", "10"],
        Command::Report { kind: ReportKind::Recent, date: None, account: Some(10) }
    )]
    #[case::report_dated(
        &["program", "report", "balances", "--date", "2024-01-01"],
        Command::Report { kind: ReportKind::Balances, date: Some("2024-01-01".to_string()), account: None }
    )]
    fn test_subcommand_parsing(#[case] args: &[&str], #[case] expected: Command) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.command, expected);
    }

    #[rstest]
    #[case::missing_command(&["program"])]
    #[case::missing_input(&["program", "ingest"])]
    #[case::invalid_report(&["program", "report", "accounts"])]
    #[case::invalid_window(&["program", "--window-size", "-1", "report", "transfers"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
