//! Error types for ferrowalk

use std::time::Duration;

use thiserror::Error;

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for simulation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Simulation parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No report arrived before the receive deadline
    #[error("Receive timed out after {0:?}")]
    Timeout(Duration),

    /// Every walker has gone away while reports are still outstanding
    #[error("All peers hung up before every walker reported")]
    PeersGone,

    /// A report arrived from a rank outside the worker range
    #[error("Report from rank {0}, which is not a worker rank")]
    UnexpectedSender(i32),

    /// A worker rank reported twice
    #[error("Duplicate report from rank {0}")]
    DuplicateReport(i32),

    /// The result table was read before every worker reported
    #[error("Result table incomplete: {received} of {expected} reports")]
    Incomplete {
        /// Reports recorded so far
        received: usize,
        /// Reports required
        expected: usize,
    },
}

impl Error {
    /// Whether this error means the one-report-per-worker protocol was broken.
    ///
    /// These never happen with a correct, fixed group and always abort the
    /// coordinator.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedSender(_) | Error::DuplicateReport(_) | Error::Incomplete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_violations_are_classified() {
        assert!(Error::UnexpectedSender(0).is_protocol_violation());
        assert!(Error::DuplicateReport(3).is_protocol_violation());
        assert!(Error::Incomplete {
            received: 1,
            expected: 2
        }
        .is_protocol_violation());
        assert!(!Error::PeersGone.is_protocol_violation());
        assert!(!Error::Timeout(Duration::from_millis(5)).is_protocol_violation());
    }

    #[test]
    fn messages_name_the_rank() {
        assert_eq!(
            Error::DuplicateReport(2).to_string(),
            "Duplicate report from rank 2"
        );
        assert_eq!(
            Error::UnexpectedSender(0).to_string(),
            "Report from rank 0, which is not a worker rank"
        );
    }

    #[test]
    fn hang_up_does_not_blame_a_rank() {
        let msg = Error::PeersGone.to_string();
        assert!(!msg.contains("Rank 0"), "{msg}");
        assert!(msg.contains("hung up"));
    }
}
