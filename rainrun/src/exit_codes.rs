#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// One or more tracks failed validation.
    TracksFailed = 10,

    /// The report contained no track that reached its final results.
    NoTrackResults = 11,

    /// A track's final results block was incomplete or unparseable.
    MalformedReport = 20,

    /// Invalid CLI flags or an unreadable report path.
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, benchmark timeout).
    RuntimeError = 40,

    /// The benchmark process could not be launched or exited during startup.
    LaunchFailed = 41,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_verdicts(tracks: usize, failed: usize) -> Self {
        match (tracks, failed) {
            (0, _) => Self::NoTrackResults,
            (_, 0) => Self::Success,
            _ => Self::TracksFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_map_to_exit_codes() {
        assert_eq!(ExitCode::from_verdicts(0, 0), ExitCode::NoTrackResults);
        assert_eq!(ExitCode::from_verdicts(3, 0), ExitCode::Success);
        assert_eq!(ExitCode::from_verdicts(3, 1), ExitCode::TracksFailed);
        assert_eq!(ExitCode::TracksFailed.as_i32(), 10);
    }
}
