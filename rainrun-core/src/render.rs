use std::fmt::Write as _;

use crate::summary::TrackSummary;
use crate::validate::{Thresholds, validate};

const TRACK_WIDTH: usize = 20;
const NUM_WIDTH: usize = 11;

const NUMERIC_HEADERS: [&str; 9] = [
    "eff-ops/s",
    "ltl-ops/s",
    "eff-reqs/s",
    "%ovh-ops",
    "avg-resp(s)",
    "avg-users",
    "succeeded",
    "failed",
    "%failed",
];

/// Fixed-width table validated against the default thresholds.
#[must_use]
pub fn render(summaries: &[TrackSummary]) -> String {
    render_with(summaries, &Thresholds::default())
}

/// Fixed-width table: one header line, then one line per track.
///
/// Each line is validated against `thresholds` as it is rendered.
#[must_use]
pub fn render_with(summaries: &[TrackSummary], thresholds: &Thresholds) -> String {
    let mut out = String::new();
    push_header(&mut out);
    for s in summaries {
        push_row(&mut out, s, thresholds);
    }
    out
}

fn push_header(out: &mut String) {
    let mut line = format!("{:<TRACK_WIDTH$}", "track");
    for h in NUMERIC_HEADERS {
        write!(line, " {h:>NUM_WIDTH$}").ok();
    }
    write!(line, " {:<6}", "passed").ok();
    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_row(out: &mut String, s: &TrackSummary, thresholds: &Thresholds) {
    let v = validate(s, thresholds);

    let mut line = format!("{:<TRACK_WIDTH$}", s.name);
    for f in [
        s.effective_load_ops_per_sec,
        s.littles_estimate_ops_per_sec,
        s.effective_load_reqs_per_sec,
        v.pct_overhead_ops,
        s.average_op_response_time_sec,
        s.average_users,
    ] {
        write!(line, " {f:>NUM_WIDTH$.4}").ok();
    }
    write!(
        line,
        " {:>NUM_WIDTH$} {:>NUM_WIDTH$} {:>NUM_WIDTH$.4} {:<6}",
        s.operations_successful,
        s.operations_failed,
        v.pct_ops_failed,
        passed_label(v.is_acceptable())
    )
    .ok();

    out.push_str(line.trim_end());
    out.push('\n');
}

fn passed_label(acceptable: bool) -> &'static str {
    if acceptable { "True" } else { "False" }
}
