/*!
 * Coordinator State
 */

use serde::Serialize;
use std::fmt;

/// Lifecycle of one coordinator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// Launching workers
    Running,
    /// Every worker launched; waiting for the rest to exit
    Draining,
    /// Finished or cancelled; no further ticks
    Terminated,
}

impl CoordinatorState {
    /// State after a launch brought the launched count to `launched`
    pub fn after_launch(self, launched: u32, total: u32) -> Self {
        match self {
            CoordinatorState::Running if launched >= total => CoordinatorState::Draining,
            other => other,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, CoordinatorState::Terminated)
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinatorState::Running => "running",
            CoordinatorState::Draining => "draining",
            CoordinatorState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
