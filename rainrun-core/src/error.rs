use crate::metric::{Metric, NumericKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("track `{track}`: metric `{metric}` not found after its final results marker")]
    MetricNotFound { track: String, metric: Metric },

    #[error("track `{track}`: metric `{metric}` has value `{raw}` which is not a valid {kind}")]
    InvalidNumericFormat {
        track: String,
        metric: Metric,
        raw: String,
        kind: NumericKind,
    },

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// The track whose summary could not be built, if the error is tied to one.
    #[must_use]
    pub fn track(&self) -> Option<&str> {
        match self {
            Self::MetricNotFound { track, .. } | Self::InvalidNumericFormat { track, .. } => {
                Some(track)
            }
            Self::Pattern(_) => None,
        }
    }

    #[must_use]
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Self::MetricNotFound { metric, .. } | Self::InvalidNumericFormat { metric, .. } => {
                Some(*metric)
            }
            Self::Pattern(_) => None,
        }
    }
}
