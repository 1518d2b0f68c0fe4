/*!
 * Process Executor
 * Spawns worker processes and collects their exits from the OS
 */

use super::traits::WorkerLauncher;
use super::types::{ExitKind, ProcessError, ProcessResult, WorkerExit, WorkerRequest};
use crate::clock::SimTime;
use crate::core::types::WorkerId;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Launches the worker executable as child processes of this process
///
/// Exits are collected with `waitpid(-1, WNOHANG)`, so any child of the
/// current process is reported, not only workers started here.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    inherit_output: bool,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        info!(program = %program.display(), "Process executor initialized");
        Self {
            program,
            inherit_output: true,
        }
    }

    /// Discard worker stdout instead of sharing the coordinator's
    pub fn with_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Default worker location: `worker` next to the running executable
    pub fn default_program() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        Some(exe.parent()?.join("worker"))
    }

    fn spawn_error(&self, reason: impl Into<String>) -> ProcessError {
        ProcessError::SpawnFailed {
            program: self.program.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl WorkerLauncher for ProcessExecutor {
    fn spawn(&mut self, request: &WorkerRequest) -> ProcessResult<WorkerId> {
        let args = request
            .args()
            .ok_or_else(|| self.spawn_error("clock is not shared with other processes"))?;

        let stdout = if self.inherit_output {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        // Exits are collected through waitpid, not the Child handle
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e.to_string()))?;

        let worker = child.id();
        debug!(
            worker_id = worker,
            budget_s = request.budget.seconds,
            budget_ns = request.budget.nanoseconds,
            "Spawned worker process"
        );
        Ok(worker)
    }

    fn try_reap(&mut self, _now: SimTime) -> ProcessResult<Option<WorkerExit>> {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => return Ok(None),
                Ok(status) => {
                    if let Some(exit) = exit_from_status(status) {
                        return Ok(Some(exit));
                    }
                    // Stop/continue notifications are not exits
                }
                Err(Errno::ECHILD) => return Ok(None),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ProcessError::ReapFailed(e.to_string())),
            }
        }
    }

    fn terminate(&mut self, worker: WorkerId) -> ProcessResult<WorkerExit> {
        let pid = Pid::from_raw(worker as i32);
        match kill(pid, Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => warn!(worker_id = worker, "Worker already gone"),
            Err(e) => {
                return Err(ProcessError::SignalFailed {
                    worker,
                    reason: e.to_string(),
                })
            }
        }

        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some(exit) = exit_from_status(status) {
                        info!(worker_id = worker, status = ?exit.status, "Terminated worker");
                        return Ok(exit);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    return Err(ProcessError::SignalFailed {
                        worker,
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

fn exit_from_status(status: WaitStatus) -> Option<WorkerExit> {
    match status {
        WaitStatus::Exited(pid, code) => Some(WorkerExit {
            worker: pid.as_raw() as WorkerId,
            status: ExitKind::Exited(code),
        }),
        WaitStatus::Signaled(pid, signal, _) => Some(WorkerExit {
            worker: pid.as_raw() as WorkerId,
            status: ExitKind::Signaled(signal as i32),
        }),
        _ => None,
    }
}
