use serde::Serialize;

use crate::summary::TrackSummary;

pub const DEFAULT_MAX_PCT_OVERHEAD_OPS: f64 = 5.0;
pub const DEFAULT_MAX_PCT_FAILED_OPS: f64 = 5.0;

/// Acceptance limits; both are inclusive upper bounds in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub max_pct_overhead_ops: f64,
    pub max_pct_failed_ops: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_pct_overhead_ops: DEFAULT_MAX_PCT_OVERHEAD_OPS,
            max_pct_failed_ops: DEFAULT_MAX_PCT_FAILED_OPS,
        }
    }
}

/// Per-operation response-time targets.
///
/// Its verdict feeds [`TrackValidation::op_response_time_targets_met`].
pub trait ResponseTimeCheck {
    fn targets_met(&self, summary: &TrackSummary) -> bool;
}

/// No response-time targets configured; always met.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResponseTimeTargets;

impl ResponseTimeCheck for NoResponseTimeTargets {
    fn targets_met(&self, _summary: &TrackSummary) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackValidation {
    pub track_name: String,
    /// 0.0 when the Little's Law estimate is not positive.
    pub pct_overhead_ops: f64,
    pub pct_overhead_ops_acceptable: bool,
    /// 0.0 when the track completed no operations.
    pub pct_ops_failed: f64,
    pub pct_failed_ops_acceptable: bool,
    pub op_response_time_targets_met: bool,
}

impl TrackValidation {
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.pct_overhead_ops_acceptable
            && self.pct_failed_ops_acceptable
            && self.op_response_time_targets_met
    }
}

#[must_use]
pub fn validate(summary: &TrackSummary, thresholds: &Thresholds) -> TrackValidation {
    validate_with(summary, thresholds, &NoResponseTimeTargets)
}

#[must_use]
pub fn validate_with(
    summary: &TrackSummary,
    thresholds: &Thresholds,
    response_time: &dyn ResponseTimeCheck,
) -> TrackValidation {
    let (pct_overhead_ops, pct_overhead_ops_acceptable) =
        overhead(summary, thresholds.max_pct_overhead_ops);
    let (pct_ops_failed, pct_failed_ops_acceptable) =
        failed(summary, thresholds.max_pct_failed_ops);

    TrackValidation {
        track_name: summary.name.clone(),
        pct_overhead_ops,
        pct_overhead_ops_acceptable,
        pct_ops_failed,
        pct_failed_ops_acceptable,
        op_response_time_targets_met: response_time.targets_met(summary),
    }
}

fn overhead(summary: &TrackSummary, max_pct: f64) -> (f64, bool) {
    let littles = summary.littles_estimate_ops_per_sec;
    if littles.is_nan() || littles <= 0.0 {
        return (0.0, false);
    }

    let pct = ((littles - summary.effective_load_ops_per_sec) / littles) * 100.0;
    (pct, pct <= max_pct)
}

fn failed(summary: &TrackSummary, max_pct: f64) -> (f64, bool) {
    let total = summary.total_operations();
    if total == 0 {
        return (0.0, false);
    }

    let pct = (summary.operations_failed as f64 / total as f64) * 100.0;
    (pct, pct <= max_pct)
}
