/*!
 * Shutdown Token
 * Cancellation flag checked once per coordinator tick
 */

use super::handler;
use super::types::ShutdownReason;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot cancellation flag
///
/// Clones share the same flag. A token created with [`ShutdownToken::process`]
/// is also cancelled by the process signal handlers.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
    observe_signals: bool,
}

impl ShutdownToken {
    /// Token cancelled only through [`cancel`](Self::cancel)
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also observes SIGINT, SIGTERM and SIGALRM
    pub fn process() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            observe_signals: true,
        }
    }

    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
            || (self.observe_signals && handler::shutdown_requested())
    }

    /// Why the token is cancelled, if it is
    pub fn reason(&self) -> Option<ShutdownReason> {
        if self.observe_signals {
            if let Some(signal) = handler::last_signal() {
                return Some(ShutdownReason::from_signal(signal));
            }
        }
        if self.requested.load(Ordering::SeqCst) {
            return Some(ShutdownReason::Requested);
        }
        None
    }
}
