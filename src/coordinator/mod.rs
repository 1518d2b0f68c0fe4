/*!
 * Coordinator
 *
 * Tick-driven control loop. Each tick, in order:
 * 1. observe the shutdown token
 * 2. advance the simulated clock
 * 3. emit a table report if the report interval elapsed
 * 4. reap every exited worker
 * 5. terminate if all workers were launched and none is running
 * 6. attempt one launch
 *
 * The loop is single-threaded and never blocks, except while evicting workers
 * during shutdown.
 */

mod report;
mod state;

pub use report::{write_table, RunSummary};
pub use state::CoordinatorState;

use crate::clock::{SimClock, SimTime};
use crate::core::config::{CoordinatorSettings, RunConfig};
use crate::core::errors::OssResult;
use crate::monitoring::span_run;
use crate::process::{
    LaunchAdmission, ProcessExecutor, ProcessTable, Reaper, RunCounters, WorkerLauncher,
};
use crate::signals::{ShutdownReason, ShutdownToken};
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Owns the clock, the process table and the launcher for one run
pub struct Coordinator<L: WorkerLauncher = ProcessExecutor> {
    config: RunConfig,
    settings: CoordinatorSettings,
    clock: SimClock,
    launcher: L,
    token: ShutdownToken,
    table: ProcessTable,
    reaper: Reaper,
    admission: LaunchAdmission,
    counters: RunCounters,
    state: CoordinatorState,
    reason: Option<ShutdownReason>,
    last_report: SimTime,
    report_out: Option<Box<dyn Write>>,
    peak_running: u32,
    evicted: u32,
    ticks: u64,
}

impl<L: WorkerLauncher> Coordinator<L> {
    pub fn new(config: RunConfig, clock: SimClock, launcher: L, token: ShutdownToken) -> Self {
        Self {
            config,
            settings: CoordinatorSettings::default(),
            clock,
            launcher,
            token,
            table: ProcessTable::new(),
            reaper: Reaper::new(),
            admission: LaunchAdmission::new(),
            counters: RunCounters::default(),
            state: CoordinatorState::Running,
            reason: None,
            last_report: SimTime::ZERO,
            report_out: None,
            peak_running: 0,
            evicted: 0,
            ticks: 0,
        }
    }

    pub fn with_settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Write periodic table reports to `out`
    pub fn with_report_output(mut self, out: Box<dyn Write>) -> Self {
        self.report_out = Some(out);
        self
    }

    /// Run until completion or cancellation, then release the clock
    ///
    /// The shared segment is released on every path, including errors.
    pub fn run(mut self) -> OssResult<RunSummary> {
        let span = span_run(&self.config, self.clock.handle());
        let _guard = span.enter();
        info!(
            total = self.config.total_workers,
            ceiling = self.config.max_concurrent,
            budget = %self.config.worker_budget,
            interval = %self.config.launch_interval,
            "Coordinator loop started"
        );

        let outcome = loop {
            match self.tick() {
                Ok(Some(reason)) => break Ok(reason),
                Ok(None) => {}
                Err(e) => break Err(e),
            }
        };

        if let Err(ref e) = outcome {
            error!(error = %e, "Run aborted");
            self.evict_remaining();
            self.state = CoordinatorState::Terminated;
        }

        let released = self.clock.release();
        if let Err(ref e) = released {
            warn!(error = %e, "Failed to release shared clock");
        }
        let reason = outcome?;
        released?;

        let summary = self.summary(reason);
        info!(
            reason = %summary.reason,
            launched = summary.launched,
            reaped = summary.reaped,
            total_secs = summary.totals.as_secs_f64(),
            "Coordinator terminated"
        );
        Ok(summary)
    }

    /// Execute one tick
    ///
    /// Returns the shutdown reason once the run has terminated.
    pub fn tick(&mut self) -> OssResult<Option<ShutdownReason>> {
        if self.state.is_terminated() {
            return Ok(self.reason);
        }

        if self.token.is_cancelled() {
            let reason = self.token.reason().unwrap_or(ShutdownReason::Requested);
            info!(%reason, now = %self.clock.snapshot(), "Shutdown requested");
            self.evict_remaining();
            return Ok(Some(self.terminate(reason)));
        }

        let now = self.clock.advance(self.settings.tick)?;
        self.ticks += 1;

        if now.elapsed_since(self.last_report).as_nanos() >= self.settings.report_interval {
            self.emit_report(now);
            self.last_report = now;
        }

        let reaped = self.reaper.drain(&mut self.launcher, &mut self.table, now)?;
        self.counters.running = self.counters.running.saturating_sub(reaped.len() as u32);

        if self.counters.launched >= self.config.total_workers && self.counters.running == 0 {
            return Ok(Some(self.terminate(ShutdownReason::Completed)));
        }

        let launched = self.admission.try_launch(
            &self.config,
            &mut self.table,
            now,
            &mut self.counters,
            &mut self.launcher,
            self.clock.handle(),
        )?;
        if launched.is_some() {
            self.peak_running = self.peak_running.max(self.counters.running);
            let next = self
                .state
                .after_launch(self.counters.launched, self.config.total_workers);
            if next != self.state {
                debug!(from = %self.state, to = %next, "State transition");
                self.state = next;
            }
        }

        Ok(None)
    }

    fn terminate(&mut self, reason: ShutdownReason) -> ShutdownReason {
        debug!(
            from = %self.state,
            to = %CoordinatorState::Terminated,
            %reason,
            "State transition"
        );
        self.state = CoordinatorState::Terminated;
        self.reason = Some(reason);
        reason
    }

    fn evict_remaining(&mut self) {
        if self.table.is_empty() {
            return;
        }
        let now = self.clock.snapshot();
        let evicted = self.reaper.evict_all(&mut self.launcher, &mut self.table, now);
        let count = evicted.len() as u32;
        self.evicted += count;
        self.counters.running = self.counters.running.saturating_sub(count);
        info!(evicted = count, "Evicted running workers");
    }

    fn emit_report(&mut self, now: SimTime) {
        let Some(out) = self.report_out.as_mut() else {
            return;
        };
        if let Err(e) = write_table(out.as_mut(), std::process::id(), now, &self.table) {
            warn!(error = %e, "Failed to write process table report; reports disabled");
            self.report_out = None;
        }
    }

    fn summary(&self, reason: ShutdownReason) -> RunSummary {
        RunSummary {
            pid: std::process::id(),
            reason,
            launched: self.counters.launched,
            reaped: self.reaper.reaped(),
            evicted: self.evicted,
            peak_running: self.peak_running,
            ticks: self.ticks,
            final_time: self.clock.snapshot(),
            totals: self.reaper.totals(),
            config: self.config.clone(),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn now(&self) -> SimTime {
        self.clock.snapshot()
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn reaper(&self) -> &Reaper {
        &self.reaper
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorkerId;
    use crate::process::{ExitKind, ProcessResult, WorkerExit, WorkerRequest};
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Output whose reader has gone away
    struct ClosedPipe {
        attempts: Arc<AtomicUsize>,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Workers exit exactly when their budget elapses
    #[derive(Default)]
    struct BudgetLauncher {
        next: WorkerId,
        deadlines: BTreeMap<WorkerId, SimTime>,
    }

    impl WorkerLauncher for BudgetLauncher {
        fn spawn(&mut self, request: &WorkerRequest) -> ProcessResult<WorkerId> {
            self.next += 1;
            self.deadlines
                .insert(self.next, request.issued_at.plus(request.budget));
            Ok(self.next)
        }

        fn try_reap(&mut self, now: SimTime) -> ProcessResult<Option<WorkerExit>> {
            let due = self
                .deadlines
                .iter()
                .find(|(_, deadline)| **deadline <= now)
                .map(|(worker, _)| *worker);
            Ok(due.map(|worker| {
                self.deadlines.remove(&worker);
                WorkerExit {
                    worker,
                    status: ExitKind::Exited(0),
                }
            }))
        }

        fn terminate(&mut self, worker: WorkerId) -> ProcessResult<WorkerExit> {
            self.deadlines.remove(&worker);
            Ok(WorkerExit {
                worker,
                status: ExitKind::Signaled(15),
            })
        }
    }

    fn coordinator(total: i64, ceiling: i64, budget: f64) -> Coordinator<BudgetLauncher> {
        let config = RunConfig::new(total, ceiling, budget, 0.1).unwrap();
        Coordinator::new(config, SimClock::local(), BudgetLauncher::default(), ShutdownToken::new())
    }

    #[test]
    fn test_first_launch_at_interval() {
        let mut coord = coordinator(1, 1, 1.0);
        for _ in 0..99 {
            assert_eq!(coord.tick().unwrap(), None);
        }
        assert_eq!(coord.counters().launched, 0);

        coord.tick().unwrap();
        assert_eq!(coord.now(), SimTime::new(0, 100_000_000));
        assert_eq!(coord.counters().launched, 1);
        assert_eq!(coord.state(), CoordinatorState::Draining);
    }

    #[test]
    fn test_terminated_tick_is_idempotent() {
        let mut coord = coordinator(1, 1, 0.01);
        let reason = loop {
            if let Some(reason) = coord.tick().unwrap() {
                break reason;
            }
        };
        assert_eq!(reason, ShutdownReason::Completed);
        let now = coord.now();
        assert_eq!(coord.tick().unwrap(), Some(ShutdownReason::Completed));
        assert_eq!(coord.now(), now);
    }

    #[test]
    fn test_cancel_before_first_tick() {
        let coord = coordinator(3, 1, 1.0);
        coord.token.cancel();
        let summary = coord.run().unwrap();
        assert_eq!(summary.reason, ShutdownReason::Requested);
        assert_eq!(summary.launched, 0);
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn test_report_output_dropped_after_write_error() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut coord = coordinator(1, 1, 2.0).with_report_output(Box::new(ClosedPipe {
            attempts: attempts.clone(),
        }));

        // Three report intervals elapse
        for _ in 0..1600 {
            assert_eq!(coord.tick().unwrap(), None);
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(coord.report_out.is_none());
        assert_eq!(coord.counters().launched, 1);
    }
}
