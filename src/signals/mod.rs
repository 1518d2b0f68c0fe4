/*!
 * Signals Module
 * Shutdown requests from the operating system and the safety timer
 */

pub mod handler;
pub mod token;
pub mod types;

// Re-export public API
pub use handler::{
    arm_safety_timer, clear_pending, disarm_safety_timer, install_handlers, last_signal,
    shutdown_requested, SHUTDOWN_SIGNALS,
};
pub use token::ShutdownToken;
pub use types::{ShutdownReason, SignalError, SignalResult};
