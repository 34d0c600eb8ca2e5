use crate::command::CommandParseError;
use crate::sample_buffer::SampleError;
use crate::status::StatusError;
use crate::transport::TransportError;
use std::time::Duration;

/// Everything that can go wrong while talking to the potentiostat.
#[derive(Debug, thiserror::Error)]
pub enum PotentiostatError {
    /// The port could not be opened, failed mid-transfer or was already closed.
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    /// The deadline for an awaited sentinel line (`waiting_for`) expired.
    #[error("Timeout: no {waiting_for} line after {elapsed:?}")]
    Timeout {
        waiting_for: &'static str,
        elapsed: Duration,
    },

    #[error(transparent)]
    MalformedStatus(#[from] StatusError),

    #[error(transparent)]
    MalformedData(SampleError),

    #[error(transparent)]
    CapacityExceeded(SampleError),

    #[error(transparent)]
    InvalidCommand(#[from] CommandParseError),
}

impl From<SampleError> for PotentiostatError {
    fn from(error: SampleError) -> Self {
        match error {
            SampleError::Malformed { .. } => Self::MalformedData(error),
            SampleError::CapacityExceeded { .. } => Self::CapacityExceeded(error),
        }
    }
}

impl PotentiostatError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, PotentiostatError>;
