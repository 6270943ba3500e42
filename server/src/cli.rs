//! # CLI Interface
//!
//! Defines the command-line argument structure for `tally-server` using
//! `clap` derive. Every `run` flag can also come from a `TALLY_*`
//! environment variable.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::str::FromStr;

use tally_ledger::config::{DEFAULT_HTTP_PORT, DEFAULT_MAX_BODY_BYTES, DEFAULT_METRICS_PORT};

use crate::logging::LogFormat;

/// Tally transaction API server.
///
/// Serves the create/read transaction API over HTTP and exposes
/// Prometheus metrics on a separate port.
#[derive(Parser, Debug)]
#[command(
    name = "tally-server",
    about = "Tally transaction API server",
    version,
    propagate_version = true
)]
pub struct TallyCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API and metrics servers.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind both listeners on.
    #[arg(long, env = "TALLY_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port for the transaction API.
    #[arg(long, short = 'p', env = "TALLY_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "TALLY_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Maximum number of transactions to keep in memory.
    ///
    /// When omitted, the store is bounded only by available memory. Once the
    /// limit is reached, creates fail with HTTP 500 until the process restarts.
    #[arg(long, env = "TALLY_MAX_TRANSACTIONS")]
    pub max_transactions: Option<usize>,

    /// Maximum accepted request body size, in bytes.
    #[arg(long, env = "TALLY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TALLY_LOG_FORMAT", default_value = "pretty", value_parser = LogFormat::from_str)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        TallyCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = TallyCli::try_parse_from(["tally-server", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.port, DEFAULT_HTTP_PORT);
        assert_eq!(args.metrics_port, DEFAULT_METRICS_PORT);
        assert_eq!(args.max_transactions, None);
        assert_eq!(args.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = TallyCli::try_parse_from([
            "tally-server",
            "run",
            "--host",
            "127.0.0.1",
            "--port",
            "3004",
            "--max-transactions",
            "1000",
            "--log-format",
            "JSON",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.host.to_string(), "127.0.0.1");
        assert_eq!(args.port, 3004);
        assert_eq!(args.max_transactions, Some(1000));
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(TallyCli::try_parse_from(["tally-server", "run", "--log-format", "xml"]).is_err());
    }
}
