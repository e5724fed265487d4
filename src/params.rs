//! Run configuration shared by every rank.

use std::time::Duration;

use crate::error::{Error, Result};

/// Bounds of a single walk.
///
/// Built once at process start and handed to the role by reference.
///
/// # Example
///
/// ```
/// use ferrowalk::SimulationParams;
///
/// let params = SimulationParams::new(3, 100).unwrap();
/// assert_eq!(params.domain_half_width(), 3);
/// assert_eq!(params.max_steps(), 100);
/// assert!(SimulationParams::new(3, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    domain_half_width: u32,
    max_steps: u32,
}

impl SimulationParams {
    /// Validate and build the parameters.
    ///
    /// A half-width of zero is allowed: every walk then leaves the domain on
    /// its first step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `max_steps` is zero.
    pub fn new(domain_half_width: u32, max_steps: u32) -> Result<Self> {
        if max_steps == 0 {
            return Err(Error::InvalidParameter(
                "max_steps must be at least 1".into(),
            ));
        }
        Ok(SimulationParams {
            domain_half_width,
            max_steps,
        })
    }

    /// The walk stays inside `[-domain_half_width, domain_half_width]`.
    pub fn domain_half_width(&self) -> u32 {
        self.domain_half_width
    }

    /// Upper bound on simulated steps.
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Whether `position` lies inside the domain.
    pub fn contains(&self, position: i64) -> bool {
        position.unsigned_abs() <= u64::from(self.domain_half_width)
    }
}

/// Everything a rank needs to play its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Walk bounds.
    pub params: SimulationParams,
    /// Base seed of the run, the same on every rank; each walker mixes in
    /// its rank.
    pub seed: u64,
    /// Bound on each coordinator receive. `None` waits indefinitely.
    pub collect_timeout: Option<Duration>,
}

impl RunConfig {
    /// A configuration with no timeout.
    pub fn new(params: SimulationParams, seed: u64) -> Self {
        RunConfig {
            params,
            seed,
            collect_timeout: None,
        }
    }

    /// Bound each coordinator receive by `timeout`.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = Some(timeout);
        self
    }
}
