/*!
 * OSS - Main Entry Point
 *
 * Creates the shared clock, launches workers under the configured limits and
 * prints a summary when the run ends.
 */

use clap::Parser;
use miette::Report;
use std::io::{self, ErrorKind, Write};
use std::process::ExitCode;
use tracing::{error, info, warn};

use oss_kernel::cli::Cli;
use oss_kernel::process::ProcessExecutor;
use oss_kernel::signals::{arm_safety_timer, disarm_safety_timer, install_handlers};
use oss_kernel::{
    init_tracing, ClockSegment, Coordinator, OssResult, RunSummary, ShutdownToken, SimClock,
};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => match print_summary(&summary, cli.json) {
            Ok(()) => ExitCode::SUCCESS,
            // Nobody is reading the summary; the run itself succeeded
            Err(e) if e.kind() == ErrorKind::BrokenPipe => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "Failed to write summary");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            let mut stderr = io::stderr().lock();
            let _ = if e.is_config() {
                writeln!(stderr, "oss: {}\nUse -h for help.", e)
            } else {
                writeln!(stderr, "{:?}", Report::new(e))
            };
            ExitCode::FAILURE
        }
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        let json = summary.to_json().map_err(io::Error::other)?;
        writeln!(stdout, "{}", json)?;
    } else {
        writeln!(stdout, "{}", summary)?;
    }
    stdout.flush()
}

fn run(cli: &Cli) -> OssResult<RunSummary> {
    // Validation happens before any resource is acquired
    let config = cli.run_config()?;
    let settings = cli.settings()?;

    info!(
        pid = std::process::id(),
        ppid = nix::unistd::getppid().as_raw(),
        "OSS starting"
    );
    info!(
        n = config.total_workers,
        s = config.max_concurrent,
        t = config.worker_budget.as_secs_f64(),
        i = config.launch_interval.as_secs_f64(),
        "Called with"
    );

    let program = cli
        .worker
        .clone()
        .or_else(ProcessExecutor::default_program)
        .unwrap_or_else(|| "worker".into());
    let launcher = ProcessExecutor::new(program);
    if !launcher.program().is_file() {
        warn!(
            worker = %launcher.program().display(),
            "Worker executable not found; launches will fail"
        );
    }

    install_handlers()?;
    arm_safety_timer(settings.safety_timeout)?;

    let segment = ClockSegment::create()?;
    info!(segment = segment.name(), "Shared clock created");
    let clock = SimClock::shared(segment)?;

    let mut coordinator = Coordinator::new(config, clock, launcher, ShutdownToken::process())
        .with_settings(settings);
    if !cli.quiet {
        coordinator = coordinator.with_report_output(Box::new(std::io::stdout()));
    }

    let result = coordinator.run();
    disarm_safety_timer();
    result
}
