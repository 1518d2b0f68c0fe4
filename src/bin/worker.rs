/*!
 * Worker
 *
 * Attaches to the coordinator's clock, runs until its simulated budget has
 * elapsed, then exits. Usage: `worker <SECONDS> <NANOSECONDS> <SEGMENT>`.
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use nix::unistd::getppid;
use std::io::{self, Write};
use tracing::debug;

use oss_kernel::monitoring::init_tracing_with_default;
use oss_kernel::{ClockSegment, SimTime};

const SEPARATOR: &str = "----------------------------------------";

#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(about = "Run until the shared simulated clock passes a deadline", long_about = None)]
struct Args {
    /// Whole seconds of the simulated budget
    seconds: u32,

    /// Residual nanoseconds of the simulated budget
    nanoseconds: u32,

    /// Shared memory object holding the clock
    segment: String,
}

fn main() -> Result<()> {
    init_tracing_with_default("warn");
    let args = Args::parse();

    let segment = ClockSegment::attach(&args.segment)
        .with_context(|| format!("failed to attach to clock segment {}", args.segment))?;

    let pid = std::process::id();
    let ppid = getppid();
    let budget = SimTime::new(args.seconds, args.nanoseconds);
    let start = segment.read();
    let deadline = start.plus(budget);
    debug!(pid, segment = %args.segment, %start, %deadline, "Worker attached");

    let mut progress = Progress::new(io::stdout().lock(), pid, ppid.as_raw(), deadline);
    progress.started(budget, start);

    let mut last_printed = start.seconds;
    loop {
        // Fields are read independently; a torn read only delays the check
        let now = segment.read();

        if now >= deadline {
            progress.finished(now);
            break;
        }

        if now.seconds > last_printed {
            progress.elapsed(now, now.seconds - start.seconds);
            last_printed = now.seconds;
        }

        if getppid() != ppid {
            bail!("coordinator {} exited before the deadline", ppid);
        }
        std::thread::yield_now();
    }

    segment.release().context("failed to detach from clock segment")?;
    Ok(())
}

/// Progress lines on stdout
///
/// Output is best-effort: once a write fails (for example a closed pipe) the
/// worker stops printing but still runs to its deadline.
struct Progress<W: Write> {
    out: Option<W>,
    pid: u32,
    ppid: i32,
    deadline: SimTime,
}

impl<W: Write> Progress<W> {
    fn new(out: W, pid: u32, ppid: i32, deadline: SimTime) -> Self {
        Self {
            out: Some(out),
            pid,
            ppid,
            deadline,
        }
    }

    fn started(&mut self, budget: SimTime, start: SimTime) {
        let block = format!(
            "Worker PID: {}, PPID: {}\n\
             Interval: {} seconds, {} nanoseconds\n\
             Start Time: {} seconds, {} nanoseconds\n\
             Termination Time: {} seconds, {} nanoseconds\n\
             {}\n",
            self.pid,
            self.ppid,
            budget.seconds,
            budget.nanoseconds,
            start.seconds,
            start.nanoseconds,
            self.deadline.seconds,
            self.deadline.nanoseconds,
            SEPARATOR
        );
        self.emit(&block);
    }

    fn elapsed(&mut self, now: SimTime, seconds: u32) {
        let block = format!(
            "{}{} seconds have passed since starting.\n{}\n",
            self.status(now),
            seconds,
            SEPARATOR
        );
        self.emit(&block);
    }

    fn finished(&mut self, now: SimTime) {
        let block = format!("{}Terminating...\n", self.status(now));
        self.emit(&block);
    }

    fn status(&self, now: SimTime) -> String {
        format!(
            "Worker PID: {} PPID: {}\n\
             Current Time: {} seconds, {} nanoseconds\n\
             Termination Time: {} seconds, {} nanoseconds\n",
            self.pid,
            self.ppid,
            now.seconds,
            now.nanoseconds,
            self.deadline.seconds,
            self.deadline.nanoseconds
        )
    }

    fn emit(&mut self, block: &str) {
        let Some(out) = self.out.as_mut() else {
            return;
        };
        if let Err(e) = out.write_all(block.as_bytes()).and_then(|()| out.flush()) {
            debug!(error = %e, "Progress output closed");
            self.out = None;
        }
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.out.is_none()
    }
}
