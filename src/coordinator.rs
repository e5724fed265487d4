//! Collection of walker reports on rank 0.
//!
//! The coordinator accepts reports in whatever order walkers finish, files
//! each one under its sender's rank, and only once every worker has reported
//! produces a [`Report`] in ascending rank order.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::comm::ProcessGroup;
use crate::error::{Error, Result};
use crate::protocol::TerminationReport;

/// Reports received so far, one slot per worker rank `1..=num_workers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    slots: Vec<Option<TerminationReport>>,
    received: usize,
}

impl ResultTable {
    /// An empty table for `num_workers` workers.
    pub fn new(num_workers: usize) -> Self {
        ResultTable {
            slots: vec![None; num_workers],
            received: 0,
        }
    }

    /// Fill a table from `(rank, steps)` arrivals, in the order given.
    pub fn from_arrivals<I>(num_workers: usize, arrivals: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, u32)>,
    {
        let mut table = ResultTable::new(num_workers);
        for (rank, steps) in arrivals {
            table.record(rank, TerminationReport::new(steps))?;
        }
        Ok(table)
    }

    /// File `report` under worker `rank`.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedSender`] if `rank` is not a worker rank of this
    /// table, [`Error::DuplicateReport`] if `rank` already reported. The table
    /// is left unchanged in both cases.
    pub fn record(&mut self, rank: i32, report: TerminationReport) -> Result<()> {
        let slot = self
            .slot_index(rank)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(Error::UnexpectedSender(rank))?;
        if slot.is_some() {
            return Err(Error::DuplicateReport(rank));
        }
        *slot = Some(report);
        self.received += 1;
        Ok(())
    }

    /// Report filed for `rank`, if any.
    pub fn get(&self, rank: i32) -> Option<TerminationReport> {
        self.slot_index(rank)
            .and_then(|i| self.slots.get(i))
            .copied()
            .flatten()
    }

    /// Number of worker slots.
    pub fn num_workers(&self) -> usize {
        self.slots.len()
    }

    /// Number of reports filed.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Whether every worker has reported.
    pub fn is_complete(&self) -> bool {
        self.received == self.slots.len()
    }

    /// The rank-ordered report of a full table.
    ///
    /// # Errors
    ///
    /// [`Error::Incomplete`] if some worker has not reported yet.
    pub fn to_report(&self) -> Result<Report> {
        if !self.is_complete() {
            return Err(Error::Incomplete {
                received: self.received,
                expected: self.slots.len(),
            });
        }
        let entries = self
            .slots
            .iter()
            .zip(1i32..)
            .filter_map(|(slot, rank)| slot.map(|report| (rank, report)))
            .collect();
        Ok(Report { entries })
    }

    fn slot_index(&self, rank: i32) -> Option<usize> {
        usize::try_from(rank)
            .ok()
            .filter(|&r| r >= 1 && r <= self.slots.len())
            .map(|r| r - 1)
    }
}

/// Where the coordinator is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for reports; fewer than `num_workers` filed.
    Collecting,
    /// All reports filed; the report is being assembled.
    Reporting,
    /// Report handed off.
    Done,
}

/// Rank 0's side of the protocol.
pub struct Coordinator<'a, G> {
    group: &'a G,
    table: ResultTable,
    phase: Phase,
    timeout: Option<Duration>,
}

impl<'a, G: ProcessGroup> Coordinator<'a, G> {
    /// A coordinator expecting one report from every other rank of `group`.
    pub fn new(group: &'a G) -> Self {
        let num_workers = usize::try_from(group.size() - 1).unwrap_or(0);
        Coordinator {
            group,
            table: ResultTable::new(num_workers),
            phase: Phase::Collecting,
            timeout: None,
        }
    }

    /// Give up with [`Error::Timeout`] if any single receive waits longer
    /// than `timeout`. Without this the coordinator waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports filed so far.
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Receive reports from any sender until every worker has reported.
    ///
    /// Blocks on each receive. Calling it again after collection finished is
    /// a no-op.
    pub fn collect(&mut self) -> Result<()> {
        while !self.table.is_complete() {
            let (source, report) = self.group.receive_report(self.timeout)?;
            self.table.record(source, report)?;
            debug!(
                source,
                steps = report.steps(),
                received = self.table.received(),
                expected = self.table.num_workers(),
                "report received"
            );
        }
        if self.phase == Phase::Collecting {
            self.phase = Phase::Reporting;
        }
        Ok(())
    }

    /// Collect every report and assemble them in rank order, moving to
    /// [`Phase::Done`].
    ///
    /// After the first success the phase stays `Done` and later calls return
    /// the same report.
    pub fn finish(&mut self) -> Result<Report> {
        self.collect()?;
        let report = self.table.to_report()?;
        if self.phase != Phase::Done {
            self.phase = Phase::Done;
            info!(workers = report.num_workers(), "all walkers reported");
        }
        Ok(report)
    }
}

/// Run the coordinator role on `group` and return the rank-ordered report.
pub fn run<G: ProcessGroup>(group: &G, timeout: Option<Duration>) -> Result<Report> {
    info!(workers = group.size() - 1, "coordinator collecting");
    Coordinator::new(group).with_timeout(timeout).finish()
}

/// Every walker's result, in ascending rank order.
///
/// Its `Display` form is the console output of a run: one line per worker,
/// then one summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    entries: Vec<(i32, TerminationReport)>,
}

impl Report {
    /// `(rank, report)` pairs, ranks ascending from 1.
    pub fn entries(&self) -> &[(i32, TerminationReport)] {
        &self.entries
    }

    /// Number of walkers reported.
    pub fn num_workers(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, report) in &self.entries {
            writeln!(f, "Rank {rank}: Walker finished in {report} steps.")?;
        }
        writeln!(
            f,
            "Controller: All {} walkers have finished.",
            self.entries.len()
        )
    }
}
