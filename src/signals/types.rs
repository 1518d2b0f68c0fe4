/*!
 * Signal Types
 * Shutdown reasons and signal setup errors
 */

use nix::errno::Errno;
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Signal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Failed to install handler for {signal}: {source}")]
    InstallFailed {
        signal: Signal,
        #[source]
        source: Errno,
    },

    #[error("Invalid safety timeout: {0}")]
    InvalidTimeout(String),
}

/// Why a coordinator run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    /// Every worker was launched and reaped
    Completed,
    /// SIGINT or SIGTERM was received
    Interrupted,
    /// The real-time safety timer fired
    TimedOut,
    /// Cancelled programmatically through a shutdown token
    Requested,
}

impl ShutdownReason {
    /// Reason recorded for a delivered signal
    pub fn from_signal(signal: Signal) -> Self {
        match signal {
            Signal::SIGALRM => ShutdownReason::TimedOut,
            _ => ShutdownReason::Interrupted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Completed => "completed",
            ShutdownReason::Interrupted => "interrupted",
            ShutdownReason::TimedOut => "timed_out",
            ShutdownReason::Requested => "requested",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_signal() {
        assert_eq!(ShutdownReason::from_signal(Signal::SIGALRM), ShutdownReason::TimedOut);
        assert_eq!(ShutdownReason::from_signal(Signal::SIGINT), ShutdownReason::Interrupted);
        assert_eq!(ShutdownReason::from_signal(Signal::SIGTERM), ShutdownReason::Interrupted);
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&ShutdownReason::TimedOut).unwrap();
        assert_eq!(json, "\"timed_out\"");
        assert_eq!(ShutdownReason::TimedOut.to_string(), "timed_out");
    }
}
