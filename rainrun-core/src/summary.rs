use serde::Serialize;

/// Final metrics of one load track, as reported by the scoreboard.
///
/// Built in one step by [`ReportParser`](crate::ReportParser) from a single
/// "Final results" block; there is no partially populated state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub name: String,
    pub offered_load_ops_per_sec: f64,
    pub effective_load_ops_per_sec: f64,
    pub littles_estimate_ops_per_sec: f64,
    pub effective_load_reqs_per_sec: f64,
    pub operations_successful: u64,
    pub operations_failed: u64,
    pub average_op_response_time_sec: f64,
    pub average_users: f64,
}

impl TrackSummary {
    #[must_use]
    pub fn total_operations(&self) -> u64 {
        self.operations_successful
            .saturating_add(self.operations_failed)
    }
}
