/*!
 * Run Configuration
 *
 * Validated, immutable parameters of one coordinator run
 */

use crate::clock::SimTime;
use crate::core::limits::{REPORT_INTERVAL_NANOS, SAFETY_TIMEOUT, TICK_NANOS};
use crate::core::types::Nanos;
use miette::Diagnostic;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors, detected before any resource is acquired
#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum ConfigError {
    #[error("{field} must be a positive integer, got {value}")]
    #[diagnostic(code(config::non_positive_count), help("Use -h for help."))]
    NonPositiveCount { field: &'static str, value: i64 },

    #[error("{field} must be a positive number of seconds, got {value}")]
    #[diagnostic(code(config::non_positive_duration), help("Use -h for help."))]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("{field} is below one nanosecond: {value}")]
    #[diagnostic(
        code(config::below_resolution),
        help("The simulated clock counts whole nanoseconds.")
    )]
    BelowResolution { field: &'static str, value: f64 },

    #[error("{field} is too large: {value}")]
    #[diagnostic(code(config::out_of_range))]
    OutOfRange { field: &'static str, value: String },
}

/// Parameters of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Workers to launch over the whole run
    pub total_workers: u32,
    /// Maximum workers alive at once
    pub max_concurrent: u32,
    /// Simulated time each worker runs before exiting
    pub worker_budget: SimTime,
    /// Minimum simulated time between two launches
    pub launch_interval: SimTime,
}

impl RunConfig {
    /// Validate raw user input
    ///
    /// Counts arrive signed and durations as fractional seconds so that zero
    /// and negative values are reported here rather than by the parser.
    pub fn new(
        total_workers: i64,
        max_concurrent: i64,
        worker_budget_secs: f64,
        launch_interval_secs: f64,
    ) -> ConfigResult<Self> {
        Ok(Self {
            total_workers: positive_count("total workers (-n)", total_workers)?,
            max_concurrent: positive_count("simultaneous workers (-s)", max_concurrent)?,
            worker_budget: positive_duration("time limit (-t)", worker_budget_secs)?,
            launch_interval: positive_duration("launch interval (-i)", launch_interval_secs)?,
        })
    }
}

fn positive_count(field: &'static str, value: i64) -> ConfigResult<u32> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveCount { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
        field,
        value: value.to_string(),
    })
}

fn positive_duration(field: &'static str, value: f64) -> ConfigResult<SimTime> {
    if !(value > 0.0) {
        return Err(ConfigError::NonPositiveDuration { field, value });
    }
    if value >= f64::from(u32::MAX) {
        return Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
        });
    }
    let time = SimTime::from_secs_f64(value);
    if time == SimTime::ZERO {
        return Err(ConfigError::BelowResolution { field, value });
    }
    Ok(time)
}

/// Coordinator loop settings that are not part of the run's semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSettings {
    /// Simulated time added per tick
    pub tick: Nanos,
    /// Simulated time between table reports
    pub report_interval: Nanos,
    /// Real time after which the run is forcibly terminated
    pub safety_timeout: Duration,
}

impl CoordinatorSettings {
    /// Validate user-supplied report interval (simulated) and safety timeout (real)
    pub fn from_secs(report_interval_secs: f64, safety_timeout_secs: f64) -> ConfigResult<Self> {
        let report_interval = positive_duration("report interval", report_interval_secs)?;
        let timeout = positive_duration("safety timeout", safety_timeout_secs)?;
        Ok(Self::default()
            .with_report_interval(report_interval)
            .with_safety_timeout(Duration::new(
                u64::from(timeout.seconds),
                timeout.nanoseconds,
            )))
    }

    pub fn with_report_interval(mut self, interval: SimTime) -> Self {
        self.report_interval = interval.as_nanos();
        self
    }

    pub fn with_safety_timeout(mut self, timeout: Duration) -> Self {
        self.safety_timeout = timeout;
        self
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            tick: TICK_NANOS,
            report_interval: REPORT_INTERVAL_NANOS,
            safety_timeout: SAFETY_TIMEOUT,
        }
    }
}
