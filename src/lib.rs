//! # ferrowalk
//!
//! Parallel bounded random walks over an MPI process group.
//!
//! A run is a fixed group of `P` processes started by an MPI launcher, which
//! also decides each one's rank. Rank 0 coordinates; ranks `1..P`
//! each simulate one walk on the integers, starting at the origin and
//! stopping when they leave `[-w, w]` or exhaust their step budget, and send
//! the step count to rank 0. The coordinator takes the reports in whatever
//! order they arrive and prints them in rank order.
//!
//! The crate provides:
//! - The [`ProcessGroup`] seam, implemented over MPI by [`MpiGroup`]
//! - The walker ([`walker`]) and coordinator ([`coordinator`]) roles
//! - Explicit run configuration ([`SimulationParams`], [`RunConfig`])
//!
//! ## Quick Start
//!
//! Run under a launcher, e.g. `mpirun -n 4 ./program`:
//!
//! ```no_run
//! use ferrowalk::{MpiGroup, Outcome, ProcessGroup, RunConfig, SimulationParams};
//!
//! fn main() -> Result<(), ferrowalk::Error> {
//!     let universe = mpi::initialize().expect("MPI already initialized");
//!     let group = MpiGroup::new(universe.world());
//!
//!     let seed = group.share_seed(2024);
//!     let config = RunConfig::new(SimulationParams::new(3, 100)?, seed);
//!
//!     if let Outcome::Reported(report) = ferrowalk::run_rank(&group, &config)? {
//!         print!("{report}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod comm;
pub mod coordinator;
mod error;
mod params;
mod protocol;
pub mod walker;

pub use comm::{MpiGroup, ProcessGroup};
pub use coordinator::{Coordinator, Phase, Report, ResultTable};
pub use error::{Error, Result};
pub use params::{RunConfig, SimulationParams};
pub use protocol::{Role, TerminationReport, COORDINATOR_RANK, REPORT_TAG};

/// What a rank produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The coordinator's rank-ordered report.
    Reported(Report),
    /// A walker's own termination report, already sent.
    Walked(TerminationReport),
}

/// Play the role assigned to this rank.
pub fn run_rank<G: ProcessGroup>(group: &G, config: &RunConfig) -> Result<Outcome> {
    match Role::of(group.rank()) {
        Role::Coordinator => {
            coordinator::run(group, config.collect_timeout).map(Outcome::Reported)
        }
        Role::Walker => walker::run(group, config).map(Outcome::Walked),
    }
}
