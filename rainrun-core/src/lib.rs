//! Parsing and acceptance checks for Rain benchmark reports.
//!
//! The pipeline is text in, [`TrackSummary`] list out, then a
//! [`TrackValidation`] per summary and an optional fixed-width table.

mod error;
mod extract;
mod metric;
mod parse;
mod render;
mod summary;
mod validate;

pub use error::{Error, Result};
pub use extract::MetricExtractor;
pub use metric::{Metric, NumericKind};
pub use parse::{ReportParser, parse_report};
pub use render::{render, render_with};
pub use summary::TrackSummary;
pub use validate::{
    DEFAULT_MAX_PCT_FAILED_OPS, DEFAULT_MAX_PCT_OVERHEAD_OPS, NoResponseTimeTargets,
    ResponseTimeCheck, Thresholds, TrackValidation, validate, validate_with,
};
