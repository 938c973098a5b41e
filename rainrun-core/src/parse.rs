use regex::Regex;
use tracing::debug;

use crate::Result;
use crate::extract::MetricExtractor;
use crate::metric::Metric;
use crate::summary::TrackSummary;

const TRACK_START: &str = r"\[TRACK: ([^\]\r\n]+)\] starting load scheduler";

/// Turns a Rain benchmark log into one [`TrackSummary`] per finished track.
#[derive(Debug, Clone)]
pub struct ReportParser {
    track_start: Regex,
}

impl ReportParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            track_start: Regex::new(TRACK_START)?,
        })
    }

    /// Distinct track names in order of their first "starting load scheduler" line.
    #[must_use]
    pub fn track_names<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in self.track_start.captures_iter(text) {
            if let Some(name) = caps.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Summaries for every track that reached its "Final results" block.
    ///
    /// Tracks that started but never printed final results are skipped. A
    /// track whose results block is present but incomplete or malformed
    /// fails the whole parse.
    pub fn parse(&self, text: &str) -> Result<Vec<TrackSummary>> {
        let names = self.track_names(text);
        debug!(tracks = names.len(), "discovered tracks");

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            match parse_track(text, name)? {
                Some(summary) => out.push(summary),
                None => debug!(track = name, "no final results; skipping track"),
            }
        }
        Ok(out)
    }
}

/// Convenience wrapper around [`ReportParser::parse`].
pub fn parse_report(text: &str) -> Result<Vec<TrackSummary>> {
    ReportParser::new()?.parse(text)
}

fn parse_track(text: &str, name: &str) -> Result<Option<TrackSummary>> {
    let ex = MetricExtractor::new(name)?;
    let Some(from) = ex.final_results_offset(text) else {
        return Ok(None);
    };

    Ok(Some(TrackSummary {
        name: name.to_string(),
        offered_load_ops_per_sec: ex.extract(text, Metric::OfferedLoadOps, from)?,
        effective_load_ops_per_sec: ex.extract(text, Metric::EffectiveLoadOps, from)?,
        littles_estimate_ops_per_sec: ex.extract(text, Metric::LittlesEstimateOps, from)?,
        effective_load_reqs_per_sec: ex.extract(text, Metric::EffectiveLoadReqs, from)?,
        operations_successful: ex.extract_count(text, Metric::OperationsSuccessful, from)?,
        operations_failed: ex.extract_count(text, Metric::OperationsFailed, from)?,
        average_op_response_time_sec: ex.extract(text, Metric::AverageOpResponseTime, from)?,
        average_users: ex.extract(text, Metric::AverageUsers, from)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parser() -> ReportParser {
        ReportParser::new().unwrap_or_else(|e| panic!("{e}"))
    }

    fn results_block(track: &str, effective: f64, failed: u64) -> String {
        format!(
            "[SCOREBOARD TRACK: {track}] Final results\n\
             [SCOREBOARD TRACK: {track}] Offered load (ops/sec)             : 100.0000\n\
             [SCOREBOARD TRACK: {track}] Effective load (ops/sec)           : {effective:.4}\n\
             [SCOREBOARD TRACK: {track}] Little's Law Estimate (ops/sec)    : 100.0000\n\
             [SCOREBOARD TRACK: {track}] Effective load (requests/sec)      : 210.5000\n\
             [SCOREBOARD TRACK: {track}] Operations successfully completed  : 9500\n\
             [SCOREBOARD TRACK: {track}] Operations failed                  : {failed}\n\
             [SCOREBOARD TRACK: {track}] Average operation response time (s) : 0.0421\n\
             [SCOREBOARD TRACK: {track}] Average number of users            : 4.0000\n"
        )
    }

    #[test]
    fn track_names_are_distinct_and_ordered() {
        let text = "[TRACK: b] starting load scheduler\n\
                    [TRACK: a] starting load scheduler\n\
                    [TRACK: b] starting load scheduler\n";
        assert_eq!(parser().track_names(text), vec!["b", "a"]);
    }

    #[test]
    fn unfinished_tracks_are_skipped() {
        let text = format!(
            "[TRACK: done] starting load scheduler\n\
             [TRACK: truncated] starting load scheduler\n{}",
            results_block("done", 96.0, 5)
        );
        let out = parser().parse(&text).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "done");
        assert_eq!(out[0].effective_load_ops_per_sec, 96.0);
        assert_eq!(out[0].operations_failed, 5);
    }

    #[test]
    fn results_without_start_marker_are_ignored() {
        let text = results_block("orphan", 96.0, 5);
        let out = parser().parse(&text).unwrap_or_else(|e| panic!("{e}"));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_metric_fails_instead_of_defaulting() {
        let block = results_block("t", 96.0, 5)
            .lines()
            .filter(|l| !l.contains("Average number of users"))
            .collect::<Vec<_>>()
            .join("\n");
        let text = format!("[TRACK: t] starting load scheduler\n{block}\n");

        match parser().parse(&text) {
            Err(Error::MetricNotFound { track, metric }) => {
                assert_eq!(track, "t");
                assert_eq!(metric, Metric::AverageUsers);
            }
            other => panic!("expected MetricNotFound, got {other:?}"),
        }
    }

    #[test]
    fn substring_track_names_do_not_contaminate() {
        // AB's block sits between A's marker and A's metric lines.
        let a = results_block("A", 96.0, 5);
        let mut a_lines = a.lines();
        let a_marker = a_lines.next().unwrap_or_default();
        let a_rest = a_lines.collect::<Vec<_>>().join("\n");

        let text = format!(
            "[TRACK: A] starting load scheduler\n\
             [TRACK: AB] starting load scheduler\n\
             {a_marker}\n{}{a_rest}\n",
            results_block("AB", 50.0, 500)
        );

        let out = parser().parse(&text).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "A");
        assert_eq!(out[0].effective_load_ops_per_sec, 96.0);
        assert_eq!(out[0].operations_failed, 5);
        assert_eq!(out[1].name, "AB");
        assert_eq!(out[1].effective_load_ops_per_sec, 50.0);
        assert_eq!(out[1].operations_failed, 500);
    }

    #[test]
    fn metrics_before_final_results_are_ignored() {
        let text = format!(
            "[TRACK: t] starting load scheduler\n\
             [SCOREBOARD TRACK: t] Operations failed : 9999\n\
             {}",
            results_block("t", 96.0, 5)
        );
        let out = parser().parse(&text).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out[0].operations_failed, 5);
    }
}
