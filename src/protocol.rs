//! Roles and the report message.
//!
//! Rank 0 coordinates; every other rank walks. Walkers send exactly one
//! [`TerminationReport`] to [`COORDINATOR_RANK`] under [`REPORT_TAG`], and
//! nothing else travels on the group.

use std::fmt;

/// Rank that collects the reports.
pub const COORDINATOR_RANK: i32 = 0;

/// Tag reserved for termination reports.
pub const REPORT_TAG: i32 = 0;

/// The part a rank plays in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Collects and prints every walker's report.
    Coordinator,
    /// Simulates one walk and reports it.
    Walker,
}

impl Role {
    /// Role assigned to `rank`.
    pub fn of(rank: i32) -> Self {
        if rank == COORDINATOR_RANK {
            Role::Coordinator
        } else {
            Role::Walker
        }
    }
}

/// Number of steps a walker took before stopping.
///
/// A walk that leaves the domain on step `k` reports `k`; a walk that never
/// leaves reports `max_steps`. The two are indistinguishable when a walk
/// leaves on exactly its last permitted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminationReport(u32);

impl TerminationReport {
    /// Wrap a step count.
    pub fn new(steps: u32) -> Self {
        TerminationReport(steps)
    }

    /// The step count carried on the wire.
    pub fn steps(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TerminationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_zero_coordinates() {
        assert_eq!(Role::of(0), Role::Coordinator);
        assert_eq!(Role::of(1), Role::Walker);
        assert_eq!(Role::of(17), Role::Walker);
    }
}
