/*!
 * Command Line
 * Coordinator arguments
 */

use crate::core::config::{ConfigResult, CoordinatorSettings, RunConfig};
use crate::core::limits::{
    DEFAULT_LAUNCH_INTERVAL_SECS, DEFAULT_MAX_CONCURRENT, DEFAULT_TOTAL_WORKERS,
    DEFAULT_WORKER_BUDGET_SECS,
};
use clap::Parser;
use std::path::PathBuf;

/// Numbers are parsed signed so that zero and negative values are reported by
/// validation with a clear message instead of by the parser.
#[derive(Parser, Debug, Clone)]
#[command(name = "oss")]
#[command(about = "Launch workers against a shared simulated clock", long_about = None)]
pub struct Cli {
    /// Number of total workers to launch
    #[arg(
        short = 'n',
        value_name = "PROC",
        default_value_t = DEFAULT_TOTAL_WORKERS,
        allow_negative_numbers = true
    )]
    pub total: i64,

    /// Max number of simultaneous workers
    #[arg(
        short = 's',
        value_name = "SIMUL",
        default_value_t = DEFAULT_MAX_CONCURRENT,
        allow_negative_numbers = true
    )]
    pub simultaneous: i64,

    /// Simulated time each worker runs (float, seconds)
    #[arg(
        short = 't',
        value_name = "SECONDS",
        default_value_t = DEFAULT_WORKER_BUDGET_SECS,
        allow_negative_numbers = true
    )]
    pub time_limit: f64,

    /// Min simulated interval between launches (float, seconds)
    #[arg(
        short = 'i',
        value_name = "SECONDS",
        default_value_t = DEFAULT_LAUNCH_INTERVAL_SECS,
        allow_negative_numbers = true
    )]
    pub interval: f64,

    /// Worker executable (default: `worker` next to this binary)
    #[arg(long, env = "OSS_WORKER_PATH")]
    pub worker: Option<PathBuf>,

    /// Real-time safety timeout in seconds
    #[arg(long, env = "OSS_TIMEOUT_SECS", default_value_t = 60.0, allow_negative_numbers = true)]
    pub timeout: f64,

    /// Simulated seconds between process table reports
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub report_interval: f64,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress periodic process table reports
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn run_config(&self) -> ConfigResult<RunConfig> {
        RunConfig::new(self.total, self.simultaneous, self.time_limit, self.interval)
    }

    pub fn settings(&self) -> ConfigResult<CoordinatorSettings> {
        CoordinatorSettings::from_secs(self.report_interval, self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigError;
    use crate::clock::SimTime;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["oss"]).unwrap();
        let config = cli.run_config().unwrap();
        assert_eq!(config.total_workers, 5);
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.worker_budget, SimTime::new(3, 0));
        assert_eq!(config.launch_interval, SimTime::new(0, 100_000_000));
        assert!(!cli.json);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "oss", "-n", "7", "-s", "3", "-t", "1.25", "-i", "0.5", "-q",
        ])
        .unwrap();
        let config = cli.run_config().unwrap();
        assert_eq!(config.total_workers, 7);
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.worker_budget, SimTime::new(1, 250_000_000));
        assert!(cli.quiet);
    }

    #[test]
    fn test_negative_reaches_validation() {
        let cli = Cli::try_parse_from(["oss", "-n", "-3"]).unwrap();
        assert!(matches!(
            cli.run_config(),
            Err(ConfigError::NonPositiveCount { value: -3, .. })
        ));
    }

    #[test]
    fn test_non_numeric_is_parse_error() {
        assert!(Cli::try_parse_from(["oss", "-n", "many"]).is_err());
        assert!(Cli::try_parse_from(["oss", "--bogus"]).is_err());
    }
}
