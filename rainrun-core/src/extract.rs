use regex::Regex;
use strum::IntoEnumIterator;

use crate::metric::{Metric, NumericKind};
use crate::{Error, Result};

// <label> <ws>* : <ws>* <signed decimal, optional fraction or leading dot, optional exponent>
const VALUE_TAIL: &str = r"\s*:\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)";

/// Locates metric values inside one track's scoreboard output.
///
/// Every search starts at a caller-supplied byte offset (normally the track's
/// "Final results" marker), so values printed earlier in the stream, or
/// under another track's prefix, are never picked up.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    track: String,
    final_results: Regex,
    metric_line: Regex,
}

impl MetricExtractor {
    pub fn new(track: &str) -> Result<Self> {
        let prefix = regex::escape(&format!("[SCOREBOARD TRACK: {track}]"));
        let labels = Metric::iter()
            .map(|m| regex::escape(&m.to_string()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            track: track.to_string(),
            final_results: Regex::new(&format!(r"{prefix}[ \t]*Final results"))?,
            metric_line: Regex::new(&format!(r"{prefix}[ \t]*({labels}){VALUE_TAIL}"))?,
        })
    }

    #[must_use]
    pub fn track(&self) -> &str {
        &self.track
    }

    /// Byte offset of the first "Final results" marker for this track.
    #[must_use]
    pub fn final_results_offset(&self, text: &str) -> Option<usize> {
        self.final_results.find(text).map(|m| m.start())
    }

    /// Matched numeric text of the first `metric` line at or after `from`.
    pub fn find_raw<'t>(&self, text: &'t str, metric: Metric, from: usize) -> Result<&'t str> {
        let not_found = || Error::MetricNotFound {
            track: self.track.clone(),
            metric,
        };

        let region = text.get(from..).ok_or_else(not_found)?;
        let label = metric.to_string();

        self.metric_line
            .captures_iter(region)
            .find(|caps| caps.get(1).is_some_and(|l| l.as_str() == label))
            .and_then(|caps| caps.get(2))
            .map(|v| v.as_str())
            .ok_or_else(not_found)
    }

    pub fn extract(&self, text: &str, metric: Metric, from: usize) -> Result<f64> {
        let raw = self.find_raw(text, metric, from)?;
        raw.parse::<f64>()
            .map_err(|_| self.invalid(metric, raw, NumericKind::Float))
    }

    /// Like [`extract`](Self::extract) but for operation counts.
    ///
    /// A value written with a fraction or exponent is accepted only when it
    /// denotes a whole, non-negative number that fits in `u64`.
    pub fn extract_count(&self, text: &str, metric: Metric, from: usize) -> Result<u64> {
        let raw = self.find_raw(text, metric, from)?;
        parse_count(raw).ok_or_else(|| self.invalid(metric, raw, NumericKind::Count))
    }

    fn invalid(&self, metric: Metric, raw: &str, kind: NumericKind) -> Error {
        Error::InvalidNumericFormat {
            track: self.track.clone(),
            metric,
            raw: raw.to_string(),
            kind,
        }
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }

    let v = raw.parse::<f64>().ok()?;
    // 2^64; anything at or above it does not fit.
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v >= 18_446_744_073_709_551_616.0 {
        return None;
    }
    Some(v as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(track: &str) -> MetricExtractor {
        MetricExtractor::new(track).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn accepts_every_value_shape() {
        let ex = extractor("t");
        let cases = [
            ("12", 12.0),
            ("-3.5", -3.5),
            ("+0.25", 0.25),
            (".5", 0.5),
            ("7.", 7.0),
            ("1.5e3", 1500.0),
            ("2E-2", 0.02),
        ];
        for (raw, want) in cases {
            let text = format!("[SCOREBOARD TRACK: t] Average number of users : {raw}\n");
            let got = ex
                .extract(&text, Metric::AverageUsers, 0)
                .unwrap_or_else(|e| panic!("{raw}: {e}"));
            assert_eq!(got, want, "{raw}");
        }
    }

    #[test]
    fn whitespace_around_colon_may_vary() {
        let ex = extractor("t");
        let text = "[SCOREBOARD TRACK: t] Operations failed\t  :\t\t42\n";
        let got = ex.extract_count(text, Metric::OperationsFailed, 0);
        assert_eq!(got.ok(), Some(42));
    }

    #[test]
    fn search_starts_at_offset() {
        let ex = extractor("t");
        let text = "[SCOREBOARD TRACK: t] Average number of users : 1.0\n\
                    [SCOREBOARD TRACK: t] Final results\n\
                    [SCOREBOARD TRACK: t] Average number of users : 2.0\n";
        let from = ex
            .final_results_offset(text)
            .unwrap_or_else(|| panic!("marker not found"));
        let got = ex.extract(text, Metric::AverageUsers, from);
        assert_eq!(got.ok(), Some(2.0));
    }

    #[test]
    fn missing_metric_is_not_found() {
        let ex = extractor("t");
        let text = "[SCOREBOARD TRACK: t] Final results\n";
        match ex.extract(text, Metric::OfferedLoadOps, 0) {
            Err(Error::MetricNotFound { track, metric }) => {
                assert_eq!(track, "t");
                assert_eq!(metric, Metric::OfferedLoadOps);
            }
            other => panic!("expected MetricNotFound, got {other:?}"),
        }
    }

    #[test]
    fn offset_past_end_is_not_found() {
        let ex = extractor("t");
        let text = "[SCOREBOARD TRACK: t] Average number of users : 1.0\n";
        assert!(matches!(
            ex.extract(text, Metric::AverageUsers, text.len() + 10),
            Err(Error::MetricNotFound { .. })
        ));
    }

    #[test]
    fn counts_reject_fractions_and_negatives() {
        let ex = extractor("t");
        for raw in ["12.5", "-3", "1e30"] {
            let text = format!("[SCOREBOARD TRACK: t] Operations successfully completed : {raw}\n");
            match ex.extract_count(&text, Metric::OperationsSuccessful, 0) {
                Err(Error::InvalidNumericFormat { raw: got, kind, .. }) => {
                    assert_eq!(got, raw);
                    assert_eq!(kind, NumericKind::Count);
                }
                other => panic!("{raw}: expected InvalidNumericFormat, got {other:?}"),
            }
        }
    }

    #[test]
    fn counts_accept_whole_float_forms() {
        assert_eq!(parse_count("1200"), Some(1200));
        assert_eq!(parse_count("1.2e3"), Some(1200));
        assert_eq!(parse_count("7.0"), Some(7));
        assert_eq!(parse_count("+5"), Some(5));
    }

    #[test]
    fn track_names_are_matched_literally() {
        let ex = extractor("a.b(c)+");
        let text = "[SCOREBOARD TRACK: axb(c)] Average number of users : 9\n\
                    [SCOREBOARD TRACK: a.b(c)+] Average number of users : 3\n";
        assert_eq!(ex.extract(text, Metric::AverageUsers, 0).ok(), Some(3.0));
    }
}
