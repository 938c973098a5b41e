use rainrun_core::{ReportParser, Thresholds, validate};
use tracing::{info, warn};

use crate::exit_codes::ExitCode;
use crate::output::OutputFormatter;
use crate::run_error::RunError;

/// Parses a Rain report, prints it and maps the verdicts to an exit code.
pub(crate) fn evaluate(
    text: &str,
    thresholds: &Thresholds,
    out: &dyn OutputFormatter,
) -> Result<ExitCode, RunError> {
    let tracks = ReportParser::new()?.parse(text)?;

    out.print_report(&tracks, thresholds)
        .map_err(RunError::RuntimeError)?;

    if tracks.is_empty() {
        warn!("report contains no track with final results");
    }

    let mut failed = 0usize;
    for t in &tracks {
        let v = validate(t, thresholds);
        if v.is_acceptable() {
            info!(track = %t.name, "track passed");
        } else {
            failed += 1;
            warn!(
                track = %t.name,
                pct_overhead_ops = v.pct_overhead_ops,
                overhead_ok = v.pct_overhead_ops_acceptable,
                pct_ops_failed = v.pct_ops_failed,
                failed_ok = v.pct_failed_ops_acceptable,
                response_time_ok = v.op_response_time_targets_met,
                "track failed validation"
            );
        }
    }

    Ok(ExitCode::from_verdicts(tracks.len(), failed))
}
