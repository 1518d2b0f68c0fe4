/*!
 * Coordinator Reports
 *
 * Periodic process table dumps and the end-of-run summary, written in the
 * plain-text layout operators already parse.
 */

use crate::clock::{RunTotals, SimTime};
use crate::core::config::RunConfig;
use crate::process::ProcessTable;
use crate::signals::ShutdownReason;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Write the coordinator pid, the clock and every table slot
pub fn write_table<W: Write + ?Sized, const N: usize>(
    out: &mut W,
    pid: u32,
    now: SimTime,
    table: &ProcessTable<N>,
) -> io::Result<()> {
    writeln!(out, "OSS PID: {}", pid)?;
    writeln!(out, "Seconds: {}", now.seconds)?;
    writeln!(out, "Nanoseconds: {}", now.nanoseconds)?;
    writeln!(out, "- - - Process Table - - -")?;
    writeln!(out, "Entry | Occupied | PID | StartSeconds | StartNano")?;
    for (slot, entry) in table.entries().iter().enumerate() {
        match entry.occupant() {
            Some(o) => writeln!(
                out,
                "{} 1 {} {} {}",
                slot, o.worker, o.started.seconds, o.started.nanoseconds
            )?,
            None => writeln!(out, "{} 0 0 0 0", slot)?,
        }
    }
    out.flush()
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub pid: u32,
    pub reason: ShutdownReason,
    pub launched: u32,
    /// Workers whose slot was reclaimed, evictions included
    pub reaped: u32,
    pub evicted: u32,
    pub peak_running: u32,
    pub ticks: u64,
    pub final_time: SimTime,
    pub totals: RunTotals,
    pub config: RunConfig,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OSS PID: {} Terminating ({})", self.pid, self.reason)?;
        writeln!(
            f,
            "{} workers were launched and {} terminated",
            self.launched, self.reaped
        )?;
        if self.evicted > 0 {
            writeln!(f, "{} workers were stopped at shutdown", self.evicted)?;
        }
        write!(
            f,
            "Workers ran for a combined time of {} seconds {} nanoseconds.",
            self.totals.seconds, self.totals.nanoseconds
        )
    }
}
