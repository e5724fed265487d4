//! The process group a run executes on.
//!
//! [`ProcessGroup`] is everything the walker and coordinator roles need from
//! the group: their identity, agreement on the base seed, and the one report
//! message. [`MpiGroup`] provides it over an MPI communicator, where the
//! launcher (`mpirun`, `srun`, ...) decides how many processes exist and
//! which rank each one is.

use std::thread;
use std::time::{Duration, Instant};

use mpi::traits::*;

use crate::error::{Error, Result};
use crate::protocol::{TerminationReport, COORDINATOR_RANK, REPORT_TAG};

/// Interval between polls while a bounded receive waits.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A fixed group of ranks exchanging termination reports.
pub trait ProcessGroup {
    /// Rank of the calling process, in `0..size()`.
    fn rank(&self) -> i32;

    /// Number of processes in the group.
    fn size(&self) -> i32;

    /// Agree on the base seed: every rank gets the coordinator's `proposed`.
    ///
    /// Must be called by every rank, before either role starts.
    fn share_seed(&self, proposed: u64) -> u64;

    /// Send `report` to the coordinator under the reserved report tag.
    fn send_report(&self, report: TerminationReport) -> Result<()>;

    /// Receive the next report from any sender, returning the sender's rank.
    ///
    /// Blocks until one arrives. With a `timeout`, fails with
    /// [`Error::Timeout`] once it has elapsed.
    fn receive_report(&self, timeout: Option<Duration>) -> Result<(i32, TerminationReport)>;
}

/// [`ProcessGroup`] over an MPI communicator.
///
/// # Example
///
/// ```no_run
/// use ferrowalk::{MpiGroup, ProcessGroup};
///
/// let universe = mpi::initialize().expect("MPI already initialized");
/// let group = MpiGroup::new(universe.world());
/// println!("rank {} of {}", group.rank(), group.size());
/// ```
pub struct MpiGroup<C> {
    world: C,
}

impl<C: Communicator> MpiGroup<C> {
    /// Wrap `world`.
    pub fn new(world: C) -> Self {
        MpiGroup { world }
    }

    /// The underlying communicator.
    pub fn communicator(&self) -> &C {
        &self.world
    }
}

impl<C: Communicator> ProcessGroup for MpiGroup<C> {
    fn rank(&self) -> i32 {
        self.world.rank()
    }

    fn size(&self) -> i32 {
        self.world.size()
    }

    fn share_seed(&self, proposed: u64) -> u64 {
        let mut seed = proposed;
        self.world
            .process_at_rank(COORDINATOR_RANK)
            .broadcast_into(&mut seed);
        seed
    }

    fn send_report(&self, report: TerminationReport) -> Result<()> {
        // MPI errors abort the job under the default error handler.
        self.world
            .process_at_rank(COORDINATOR_RANK)
            .send_with_tag(&report.steps(), REPORT_TAG);
        Ok(())
    }

    fn receive_report(&self, timeout: Option<Duration>) -> Result<(i32, TerminationReport)> {
        let Some(timeout) = timeout else {
            let (steps, status) = self.world.any_process().receive_with_tag::<u32>(REPORT_TAG);
            return Ok((status.source_rank(), TerminationReport::new(steps)));
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.world.any_process().immediate_probe_with_tag(REPORT_TAG) {
                let source = status.source_rank();
                let (steps, _) = self
                    .world
                    .process_at_rank(source)
                    .receive_with_tag::<u32>(REPORT_TAG);
                return Ok((source, TerminationReport::new(steps)));
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// In-memory group for exercising the roles without an MPI launcher.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// One rank's view: a queue of reports waiting for it, and a record of
    /// what it sent.
    pub(crate) struct ScriptedGroup {
        rank: i32,
        size: i32,
        inbox: RefCell<VecDeque<(i32, u32)>>,
        pub(crate) sent: RefCell<Vec<TerminationReport>>,
    }

    impl ScriptedGroup {
        pub(crate) fn new(rank: i32, size: i32) -> Self {
            ScriptedGroup {
                rank,
                size,
                inbox: RefCell::new(VecDeque::new()),
                sent: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn with_arrivals<I>(rank: i32, size: i32, arrivals: I) -> Self
        where
            I: IntoIterator<Item = (i32, u32)>,
        {
            let group = ScriptedGroup::new(rank, size);
            group.inbox.borrow_mut().extend(arrivals);
            group
        }
    }

    impl ProcessGroup for ScriptedGroup {
        fn rank(&self) -> i32 {
            self.rank
        }

        fn size(&self) -> i32 {
            self.size
        }

        fn share_seed(&self, proposed: u64) -> u64 {
            proposed
        }

        fn send_report(&self, report: TerminationReport) -> Result<()> {
            self.sent.borrow_mut().push(report);
            Ok(())
        }

        fn receive_report(&self, timeout: Option<Duration>) -> Result<(i32, TerminationReport)> {
            match self.inbox.borrow_mut().pop_front() {
                Some((source, steps)) => Ok((source, TerminationReport::new(steps))),
                None => Err(timeout.map_or(Error::PeersGone, Error::Timeout)),
            }
        }
    }
}
