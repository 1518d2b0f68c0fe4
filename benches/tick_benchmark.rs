/*!
 * Tick Benchmarks
 *
 * Measures the per-tick hot path: clock advance, shared publish, table scans
 * and a full coordinator tick with an idle launcher.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oss_kernel::core::types::WorkerId;
use oss_kernel::process::{
    ExitKind, ProcessResult, ProcessTable, WorkerExit, WorkerLauncher, WorkerRequest,
};
use oss_kernel::{ClockSegment, Coordinator, RunConfig, ShutdownToken, SimClock, SimTime};

/// Launcher whose workers never exit
#[derive(Default)]
struct IdleLauncher {
    next: WorkerId,
}

impl WorkerLauncher for IdleLauncher {
    fn spawn(&mut self, _request: &WorkerRequest) -> ProcessResult<WorkerId> {
        self.next += 1;
        Ok(self.next)
    }

    fn try_reap(&mut self, _now: SimTime) -> ProcessResult<Option<WorkerExit>> {
        Ok(None)
    }

    fn terminate(&mut self, worker: WorkerId) -> ProcessResult<WorkerExit> {
        Ok(WorkerExit {
            worker,
            status: ExitKind::Signaled(15),
        })
    }
}

/// Benchmark: advance a local clock by one tick
fn bench_clock_advance(c: &mut Criterion) {
    let mut clock = SimClock::local();
    c.bench_function("tick/clock_advance_local", |b| {
        b.iter(|| black_box(clock.advance(black_box(1_000_000))))
    });
}

/// Benchmark: advance and publish to a shared segment
fn bench_clock_publish(c: &mut Criterion) {
    let segment = match ClockSegment::create() {
        Ok(segment) => segment,
        Err(e) => {
            eprintln!("skipping shared clock benchmark: {}", e);
            return;
        }
    };
    let reader = ClockSegment::attach(segment.name()).ok();
    let mut clock = match SimClock::shared(segment) {
        Ok(clock) => clock,
        Err(_) => return,
    };

    c.bench_function("tick/clock_advance_shared", |b| {
        b.iter(|| black_box(clock.advance(black_box(1_000_000))))
    });
    if let Some(reader) = reader {
        c.bench_function("tick/segment_read", |b| b.iter(|| black_box(reader.read())));
    }
}

/// Benchmark: allocate/find with different occupancy levels
fn bench_table_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/table_scan");

    for occupied in [0usize, 10, 19, 20].iter() {
        let mut table: ProcessTable = ProcessTable::new();
        for slot in 0..*occupied {
            let _ = table.occupy(slot, slot as WorkerId + 1, SimTime::ZERO);
        }

        group.bench_with_input(BenchmarkId::new("allocate", occupied), occupied, |b, _| {
            b.iter(|| black_box(table.allocate()))
        });
        group.bench_with_input(BenchmarkId::new("find_missing", occupied), occupied, |b, _| {
            b.iter(|| black_box(table.find(black_box(9999))))
        });
    }

    group.finish();
}

/// Benchmark: a full coordinator tick with a saturated table
fn bench_coordinator_tick(c: &mut Criterion) {
    let config = match RunConfig::new(i64::from(u32::MAX - 1), 20, 1_000_000.0, 0.001) {
        Ok(config) => config,
        Err(_) => return,
    };
    let mut coord = Coordinator::new(
        config,
        SimClock::local(),
        IdleLauncher::default(),
        ShutdownToken::new(),
    );

    c.bench_function("tick/coordinator_tick", |b| b.iter(|| black_box(coord.tick())));
}

criterion_group!(
    benches,
    bench_clock_advance,
    bench_clock_publish,
    bench_table_scan,
    bench_coordinator_tick,
);

criterion_main!(benches);
