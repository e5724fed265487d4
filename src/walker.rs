//! Bounded random walk simulated by every non-zero rank.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::comm::ProcessGroup;
use crate::error::Result;
use crate::params::{RunConfig, SimulationParams};
use crate::protocol::TerminationReport;

/// One unit move along the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move to `position - 1`.
    Left,
    /// Move to `position + 1`.
    Right,
}

impl Step {
    /// Signed displacement of this step.
    pub fn delta(self) -> i64 {
        match self {
            Step::Left => -1,
            Step::Right => 1,
        }
    }
}

/// Supplier of successive steps.
///
/// [`RandomSteps`] is the one used in real runs; the others pin the step
/// sequence down.
pub trait StepSource {
    /// Draw the next step.
    fn next_step(&mut self) -> Step;
}

/// Uniform steps drawn from a random number generator.
#[derive(Debug, Clone)]
pub struct RandomSteps<R> {
    rng: R,
}

impl<R: Rng> RandomSteps<R> {
    /// Draw steps from `rng`.
    pub fn new(rng: R) -> Self {
        RandomSteps { rng }
    }
}

impl RandomSteps<StdRng> {
    /// Steps for `rank`, seeded from `base` via [`rank_seed`].
    pub fn for_rank(base: u64, rank: i32) -> Self {
        RandomSteps::new(StdRng::seed_from_u64(rank_seed(base, rank)))
    }
}

impl<R: Rng> StepSource for RandomSteps<R> {
    fn next_step(&mut self) -> Step {
        if self.rng.gen::<bool>() {
            Step::Right
        } else {
            Step::Left
        }
    }
}

/// Always the same step.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub Step);

impl StepSource for Constant {
    fn next_step(&mut self) -> Step {
        self.0
    }
}

/// Right, left, right, left, ... never more than one away from the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alternating {
    next: Option<Step>,
}

impl StepSource for Alternating {
    fn next_step(&mut self) -> Step {
        let step = self.next.unwrap_or(Step::Right);
        self.next = Some(match step {
            Step::Left => Step::Right,
            Step::Right => Step::Left,
        });
        step
    }
}

/// Derive a rank's seed from the run's base seed.
///
/// SplitMix64 finaliser over `base + rank`, so ranks that differ by one get
/// unrelated streams.
pub fn rank_seed(base: u64, rank: i32) -> u64 {
    let mut z = base.wrapping_add(u64::from(rank as u32).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Walk from the origin until the position leaves the domain or the step
/// budget runs out.
pub fn simulate<S: StepSource>(params: &SimulationParams, steps: &mut S) -> TerminationReport {
    let mut position: i64 = 0;
    for step_index in 0..params.max_steps() {
        position += steps.next_step().delta();
        if !params.contains(position) {
            return TerminationReport::new(step_index + 1);
        }
    }
    TerminationReport::new(params.max_steps())
}

/// Run the walker role on `group`: simulate one walk and send its report to
/// the coordinator.
///
/// The send is the only side effect. Its failure is returned, never retried.
pub fn run<G: ProcessGroup>(group: &G, config: &RunConfig) -> Result<TerminationReport> {
    let rank = group.rank();
    let mut steps = RandomSteps::for_rank(config.seed, rank);

    let started = Instant::now();
    let report = simulate(&config.params, &mut steps);
    debug!(
        rank,
        steps = report.steps(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "walk finished"
    );

    group.send_report(report)?;
    debug!(rank, "report sent");
    Ok(report)
}
