/*!
 * Process Signal Handlers
 *
 * SIGINT, SIGTERM and SIGALRM only record that they arrived. The coordinator
 * loop observes the record at the top of its next tick.
 */

use super::types::{SignalError, SignalResult};
use nix::libc::c_int;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::alarm;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;
use tracing::{debug, info};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static LAST_SIGNAL: AtomicI32 = AtomicI32::new(0);

/// Signals that request shutdown
pub const SHUTDOWN_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGALRM];

extern "C" fn on_shutdown_signal(signal: c_int) {
    // Async-signal-safe: atomic stores only
    LAST_SIGNAL.store(signal, Ordering::Relaxed);
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Install the shutdown handlers for this process
pub fn install_handlers() -> SignalResult<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_shutdown_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in SHUTDOWN_SIGNALS {
        // SAFETY: the handler only performs atomic stores
        unsafe { sigaction(signal, &action) }
            .map_err(|source| SignalError::InstallFailed { signal, source })?;
    }
    debug!(signals = ?SHUTDOWN_SIGNALS, "Shutdown handlers installed");
    Ok(())
}

/// Whether a shutdown signal has arrived
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Most recent shutdown signal, if any
pub fn last_signal() -> Option<Signal> {
    if !shutdown_requested() {
        return None;
    }
    Signal::try_from(LAST_SIGNAL.load(Ordering::Relaxed)).ok()
}

/// Forget any recorded signal
pub fn clear_pending() {
    SHUTDOWN_REQUESTED.store(false, Ordering::SeqCst);
    LAST_SIGNAL.store(0, Ordering::Relaxed);
}

/// Arm the real-time safety timer; delivers SIGALRM after `timeout`
///
/// Sub-second timeouts round up to one second.
pub fn arm_safety_timer(timeout: Duration) -> SignalResult<()> {
    if timeout.is_zero() {
        return Err(SignalError::InvalidTimeout("timeout must be positive".into()));
    }
    let mut secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 {
        secs += 1;
    }
    let secs = u32::try_from(secs)
        .map_err(|_| SignalError::InvalidTimeout(format!("{}s exceeds the alarm range", secs)))?;

    if let Some(previous) = alarm::set(secs) {
        debug!(remaining_secs = previous, "Replaced pending safety timer");
    }
    info!(timeout_secs = secs, "Safety timer armed");
    Ok(())
}

/// Cancel a pending safety timer
pub fn disarm_safety_timer() {
    if let Some(remaining) = alarm::cancel() {
        debug!(remaining_secs = remaining, "Safety timer cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_signal_sets_flag() {
        clear_pending();
        install_handlers().unwrap();
        assert!(!shutdown_requested());

        raise(Signal::SIGTERM).unwrap();
        assert!(shutdown_requested());
        assert_eq!(last_signal(), Some(Signal::SIGTERM));

        clear_pending();
        assert!(!shutdown_requested());
        assert_eq!(last_signal(), None);
    }

    #[test]
    #[serial]
    fn test_alarm_is_recorded() {
        clear_pending();
        install_handlers().unwrap();

        raise(Signal::SIGALRM).unwrap();
        assert_eq!(last_signal(), Some(Signal::SIGALRM));
        clear_pending();
    }

    #[test]
    #[serial]
    fn test_safety_timer_validation() {
        assert!(matches!(
            arm_safety_timer(Duration::ZERO),
            Err(SignalError::InvalidTimeout(_))
        ));

        install_handlers().unwrap();
        arm_safety_timer(Duration::from_secs(3600)).unwrap();
        disarm_safety_timer();
        assert!(!shutdown_requested());
    }
}
