//! Command-line entry point for ferrowalk.
//!
//! Every process of the run executes this binary; the MPI launcher decides
//! how many there are and which rank each one is. Rank 0 prints the
//! rank-ordered report on stdout.
//!
//! ```bash
//! mpirun -n 4 ferrowalk 3 100
//! RUST_LOG=ferrowalk=debug mpirun -n 8 ferrowalk --seed 7 10 1000
//! ```

// The report goes to stdout, diagnostics to stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ferrowalk::{MpiGroup, Outcome, ProcessGroup, RunConfig, SimulationParams, COORDINATOR_RANK};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parallel bounded random walks: rank 0 coordinates, every other rank walks.
#[derive(Parser, Debug)]
#[command(name = "ferrowalk", version, about)]
struct Cli {
    /// Half-width of the domain; walks stay inside [-w, w]
    domain_half_width: u32,

    /// Step budget of each walk
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    max_steps: u32,

    /// Base seed for reproducible runs; each walker mixes in its rank
    #[arg(long, env = "FERROWALK_SEED")]
    seed: Option<u64>,

    /// Abort if the coordinator waits longer than this for any one report
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log per-walk and per-report detail to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let Some(universe) = mpi::initialize() else {
        eprintln!("error: MPI could not be initialized");
        return ExitCode::FAILURE;
    };
    let group = MpiGroup::new(universe.world());

    // Every rank sees the same arguments, so every rank fails alike.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return ExitCode::from(usage_exit_code(&err, group.rank())),
    };
    init_tracing(cli.verbose);

    ExitCode::from(conclude(run(&group, &cli)))
}

/// Print the usage diagnostic once, from rank 0, and pick the exit status
/// every rank returns.
fn usage_exit_code(err: &clap::Error, rank: i32) -> u8 {
    if rank == COORDINATOR_RANK {
        // Nothing better to do if stderr is gone.
        let _ = err.print();
    }
    u8::try_from(err.exit_code()).unwrap_or(2)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ferrowalk=debug"
    } else {
        "ferrowalk=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run<G: ProcessGroup>(group: &G, cli: &Cli) -> Result<Outcome> {
    let params = SimulationParams::new(cli.domain_half_width, cli.max_steps)
        .context("invalid simulation parameters")?;

    // Drawn on every rank, but only the coordinator's survives the broadcast.
    let seed = group.share_seed(cli.seed.unwrap_or_else(rand::random));
    let mut config = RunConfig::new(params, seed);
    if let Some(ms) = cli.timeout_ms {
        config = config.with_collect_timeout(Duration::from_millis(ms));
    }

    let rank = group.rank();
    if rank == COORDINATOR_RANK {
        info!(
            np = group.size(),
            domain_half_width = params.domain_half_width(),
            max_steps = params.max_steps(),
            seed,
            "starting run"
        );
    }
    ferrowalk::run_rank(group, &config).with_context(|| format!("rank {rank} failed"))
}

/// Print what this rank owes the console and map its outcome to an exit
/// status.
fn conclude(outcome: Result<Outcome>) -> u8 {
    match outcome {
        Ok(Outcome::Reported(report)) => {
            print!("{report}");
            0
        }
        Ok(Outcome::Walked(_)) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ferrowalk::TerminationReport;

    /// A group in which nobody ever answers.
    struct Unanswered {
        rank: i32,
        size: i32,
    }

    impl ProcessGroup for Unanswered {
        fn rank(&self) -> i32 {
            self.rank
        }

        fn size(&self) -> i32 {
            self.size
        }

        fn share_seed(&self, proposed: u64) -> u64 {
            proposed
        }

        fn send_report(&self, _report: TerminationReport) -> ferrowalk::Result<()> {
            Ok(())
        }

        fn receive_report(
            &self,
            timeout: Option<Duration>,
        ) -> ferrowalk::Result<(i32, TerminationReport)> {
            Err(timeout.map_or(ferrowalk::Error::PeersGone, ferrowalk::Error::Timeout))
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ferrowalk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_arguments_parse() {
        let cli = cli(&["3", "100", "--seed", "9"]);
        assert_eq!(cli.domain_half_width, 3);
        assert_eq!(cli.max_steps, 100);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.timeout_ms, None);
    }

    #[test]
    fn missing_or_malformed_arguments_exit_non_zero() {
        for args in [
            &["ferrowalk"][..],
            &["ferrowalk", "3"],
            &["ferrowalk", "three", "100"],
            &["ferrowalk", "-3", "100"],
            &["ferrowalk", "3", "0"],
            &["ferrowalk", "3", "10", "extra"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_ne!(err.exit_code(), 0, "{args:?}");
            // Walkers stay quiet but still fail.
            assert_ne!(usage_exit_code(&err, 2), 0, "{args:?}");
        }
    }

    #[test]
    fn launcher_owns_the_group_size() {
        assert!(Cli::try_parse_from(["ferrowalk", "3", "10", "-n", "4"]).is_err());
        assert!(Cli::try_parse_from(["ferrowalk", "3", "10", "--np", "4"]).is_err());
    }

    #[test]
    fn help_exits_zero() {
        let err = Cli::try_parse_from(["ferrowalk", "--help"]).unwrap_err();
        assert_eq!(err.exit_code(), 0);
        assert_eq!(usage_exit_code(&err, 1), 0);
    }

    #[test]
    fn walker_run_exits_zero() {
        let group = Unanswered { rank: 1, size: 4 };
        let outcome = run(&group, &cli(&["3", "100", "--seed", "1"]));
        assert!(matches!(outcome, Ok(Outcome::Walked(_))));
        assert_eq!(conclude(outcome), 0);
    }

    #[test]
    fn lone_coordinator_exits_zero() {
        let group = Unanswered { rank: 0, size: 1 };
        let outcome = run(&group, &cli(&["3", "100"]));
        assert!(matches!(&outcome, Ok(Outcome::Reported(r)) if r.num_workers() == 0));
        assert_eq!(conclude(outcome), 0);
    }

    #[test]
    fn failed_coordinator_exits_non_zero() {
        let group = Unanswered { rank: 0, size: 3 };
        let outcome = run(&group, &cli(&["3", "100", "--timeout-ms", "5"]));
        let err = outcome.as_ref().unwrap_err();
        assert!(format!("{err:#}").contains("rank 0 failed"));
        assert_eq!(conclude(outcome), 1);

        let outcome = run(&group, &cli(&["3", "100"]));
        assert_eq!(conclude(outcome), 1);
    }
}
