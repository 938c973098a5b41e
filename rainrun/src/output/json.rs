use serde::Serialize;
use std::io::Write as _;

use anyhow::Context as _;
use rainrun_core::{Thresholds, TrackSummary, validate};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_report(
        &self,
        tracks: &[TrackSummary],
        thresholds: &Thresholds,
    ) -> anyhow::Result<()> {
        let report = build_report(tracks, thresholds);
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report).context("serialize report")?;
        writeln!(stdout).context("write report")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonReport<'a> {
    pub thresholds: &'a Thresholds,
    pub tracks: Vec<JsonTrack<'a>>,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonTrack<'a> {
    #[serde(flatten)]
    pub summary: &'a TrackSummary,
    pub pct_overhead_ops: f64,
    pub pct_overhead_ops_acceptable: bool,
    pub pct_ops_failed: f64,
    pub pct_failed_ops_acceptable: bool,
    pub op_response_time_targets_met: bool,
    pub acceptable: bool,
}

pub(crate) fn build_report<'a>(
    tracks: &'a [TrackSummary],
    thresholds: &'a Thresholds,
) -> JsonReport<'a> {
    let tracks: Vec<JsonTrack<'a>> = tracks
        .iter()
        .map(|summary| {
            let v = validate(summary, thresholds);
            JsonTrack {
                summary,
                pct_overhead_ops: v.pct_overhead_ops,
                pct_overhead_ops_acceptable: v.pct_overhead_ops_acceptable,
                pct_ops_failed: v.pct_ops_failed,
                pct_failed_ops_acceptable: v.pct_failed_ops_acceptable,
                op_response_time_targets_met: v.op_response_time_targets_met,
                acceptable: v.is_acceptable(),
            }
        })
        .collect();

    let passed = !tracks.is_empty() && tracks.iter().all(|t| t.acceptable);
    JsonReport {
        thresholds,
        tracks,
        passed,
    }
}
