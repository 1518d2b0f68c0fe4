/*!
 * Process Tests
 * Real worker processes against a real shared clock
 *
 * Serialized: the executor reaps with waitpid(-1), which collects any child
 * of the test process.
 */

use oss_kernel::process::{ExitKind, ProcessExecutor, WorkerLauncher, WorkerRequest};
use oss_kernel::{
    ClockSegment, Coordinator, RunConfig, ShutdownReason, ShutdownToken, SimClock, SimTime,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};

fn executor() -> ProcessExecutor {
    ProcessExecutor::new(env!("CARGO_BIN_EXE_worker")).with_output(false)
}

fn request(budget: SimTime, segment: &str) -> WorkerRequest {
    WorkerRequest {
        budget,
        segment: Some(segment.to_string()),
        issued_at: SimTime::ZERO,
    }
}

/// Poll until a worker exits or the deadline passes
fn wait_for_exit(executor: &mut ProcessExecutor, timeout: Duration) -> Option<(u32, ExitKind)> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if let Some(exit) = executor.try_reap(SimTime::ZERO).unwrap() {
            return Some((exit.worker, exit.status));
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
#[serial]
fn test_nothing_to_reap() {
    let mut executor = executor();
    assert_eq!(executor.try_reap(SimTime::ZERO).unwrap(), None);
}

#[test]
#[serial]
fn test_worker_exits_at_deadline() {
    let segment = ClockSegment::create().unwrap();
    let mut executor = executor();

    let worker = executor
        .spawn(&request(SimTime::new(2, 500_000_000), segment.name()))
        .unwrap();

    // Give the worker time to attach at zero, then step past its deadline
    thread::sleep(Duration::from_millis(200));
    assert_eq!(executor.try_reap(SimTime::ZERO).unwrap(), None);
    for tenths in 1..=30u32 {
        segment
            .publish(SimTime::new(tenths / 10, (tenths % 10) * 100_000_000))
            .unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    let exit = wait_for_exit(&mut executor, Duration::from_secs(10));
    assert_eq!(exit, Some((worker, ExitKind::Exited(0))));
    segment.release().unwrap();
}

#[test]
#[serial]
fn test_worker_attach_failure_exits_non_zero() {
    let mut executor = executor();
    let worker = executor
        .spawn(&request(SimTime::new(1, 0), "/oss-clock-missing-segment"))
        .unwrap();

    let (reaped, status) = wait_for_exit(&mut executor, Duration::from_secs(10)).unwrap();
    assert_eq!(reaped, worker);
    assert!(!status.is_success());
}

#[test]
#[serial]
fn test_terminate_running_worker() {
    let segment = ClockSegment::create().unwrap();
    let mut executor = executor();
    let worker = executor
        .spawn(&request(SimTime::new(1000, 0), segment.name()))
        .unwrap();
    thread::sleep(Duration::from_millis(100));

    let exit = executor.terminate(worker).unwrap();
    assert_eq!(exit.worker, worker);
    assert_eq!(exit.status, ExitKind::Signaled(15));
    segment.release().unwrap();
}

#[test]
#[serial]
fn test_full_run_with_real_workers() {
    let config = RunConfig::new(3, 2, 0.05, 0.01).unwrap();
    let clock = SimClock::shared(ClockSegment::create().unwrap()).unwrap();
    let name = clock.handle().unwrap().to_string();

    let summary = Coordinator::new(config, clock, executor(), ShutdownToken::new())
        .run()
        .unwrap();

    assert_eq!(summary.reason, ShutdownReason::Completed);
    assert_eq!(summary.launched, 3);
    assert_eq!(summary.reaped, 3);
    assert_eq!(summary.evicted, 0);
    assert!(summary.peak_running <= 2);
    // A worker counts its budget from when it attaches, never earlier than launch
    assert!(summary.totals.as_secs_f64() >= 0.15);
    assert!(ClockSegment::attach(&name).is_err());
}

#[test]
#[serial]
fn test_cancelled_run_evicts_workers() {
    let config = RunConfig::new(4, 2, 100_000.0, 0.001).unwrap();
    let clock = SimClock::shared(ClockSegment::create().unwrap()).unwrap();
    let name = clock.handle().unwrap().to_string();
    let token = ShutdownToken::new();

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            token.cancel();
        })
    };

    let summary = Coordinator::new(config, clock, executor(), token)
        .run()
        .unwrap();
    canceller.join().unwrap();

    assert_eq!(summary.reason, ShutdownReason::Requested);
    assert_eq!(summary.launched, 2);
    assert_eq!(summary.evicted, 2);
    assert!(ClockSegment::attach(&name).is_err());
    assert_eq!(
        oss_kernel::process::ProcessExecutor::new("unused")
            .try_reap(SimTime::ZERO)
            .unwrap(),
        None
    );
}
