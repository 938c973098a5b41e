use crate::exit_codes::ExitCode;
use crate::supervisor::SupervisorError;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    MalformedReport(anyhow::Error),
    LaunchFailed(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::MalformedReport(_) => ExitCode::MalformedReport,
            Self::LaunchFailed(_) => ExitCode::LaunchFailed,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e)
            | Self::MalformedReport(e)
            | Self::LaunchFailed(e)
            | Self::RuntimeError(e) => e,
        }
    }
}

impl From<rainrun_core::Error> for RunError {
    fn from(err: rainrun_core::Error) -> Self {
        Self::MalformedReport(anyhow::Error::new(err).context("malformed benchmark report"))
    }
}

impl From<SupervisorError> for RunError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::Spawn { .. } | SupervisorError::FailedToStart { .. } => {
                Self::LaunchFailed(anyhow::Error::new(err))
            }
            SupervisorError::TimedOut(_) | SupervisorError::Io { .. } => {
                Self::RuntimeError(anyhow::Error::new(err))
            }
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.anyhow())
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
