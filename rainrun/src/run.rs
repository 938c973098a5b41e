use anyhow::Context as _;
use rainrun_core::Thresholds;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::exit_codes::ExitCode;
use crate::launch::LaunchConfig;
use crate::output;
use crate::report::evaluate;
use crate::run_error::RunError;
use crate::supervisor::{Supervisor, round_secs, tail_lines};

pub fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);
    let launch = LaunchConfig::from(&args.launch);

    let supervisor = Supervisor::new(args.poll_interval)
        .startup_grace(args.startup_grace)
        .timeout(args.timeout);

    let result = supervisor.run(launch.command())?;
    info!(
        elapsed = %humantime::format_duration(round_secs(result.elapsed)),
        peak_rss_mb = result.peak_rss_bytes / (1024 * 1024),
        "benchmark finished"
    );
    if !result.status.success() && !result.stderr.is_empty() {
        warn!("benchmark stderr (tail):\n{}", tail_lines(&result.stderr, 12));
    }

    if let Some(path) = &args.save_report {
        std::fs::write(path, &result.stdout)
            .with_context(|| format!("save report to `{}`", path.display()))
            .map_err(RunError::RuntimeError)?;
        info!(path = %path.display(), "saved raw report");
    }

    evaluate(
        &result.stdout,
        &Thresholds::from(args.thresholds),
        out.as_ref(),
    )
}
