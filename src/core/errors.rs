/*!
 * Error Types
 * Run-level error aggregating every subsystem, rendered with miette
 */

use crate::core::config::ConfigError;
use crate::ipc::shm::ShmError;
use crate::process::types::ProcessError;
use crate::signals::types::SignalError;
use miette::Diagnostic;
use thiserror::Error;

/// Result of a coordinator run
pub type OssResult<T> = Result<T, OssError>;

/// Any failure that ends a run with a non-zero exit status
#[derive(Error, Debug, Diagnostic)]
pub enum OssError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Shared clock failure: {0}")]
    #[diagnostic(
        code(oss::shared_memory),
        help("Check /dev/shm for stale oss-clock segments and available space.")
    )]
    SharedMemory(#[from] ShmError),

    #[error("Worker failure: {0}")]
    #[diagnostic(
        code(oss::process),
        help("Check that the worker executable exists and is runnable (see --worker).")
    )]
    Process(#[from] ProcessError),

    #[error("Signal setup failure: {0}")]
    #[diagnostic(code(oss::signal))]
    Signal(#[from] SignalError),
}

impl OssError {
    /// Error raised before any resource was acquired
    pub fn is_config(&self) -> bool {
        matches!(self, OssError::Config(_))
    }
}
