//! Grid and Gravity Puzzle Solver
//!
//! Solves two puzzles from their text inputs: the minimal heat loss through a
//! grid under run-length limits, and the settling and support analysis of
//! falling bricks. Either run can be watched step by step in an interactive
//! 3D viewer while the engine works on a background thread.

mod visualization;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser, Subcommand};
use log::{error, info, warn};

use gridfall::error::{ModelError, SearchError};
use gridfall::frames::{ChannelSink, NullSink, StepSink};
use gridfall::input::read_input;
use gridfall::pathfinder::RunLimits;
use gridfall::{Analysis, BrickPuzzle, CancelToken, Error, HeatLossPuzzle, PuzzleOps};

/// Frames buffered between the solver thread and the viewer.
///
/// Memory stays bounded on both sides of the channel: the solver drops new
/// frames while the queue is full, and the viewer keeps only its latest
/// steps, dropping the oldest. Heat-loss searches also thin their frames by
/// grid size unless `--every` is given.
const FRAME_QUEUE_CAPACITY: usize = 4096;

/// Solves grid path and brick stacking puzzles and visualizes the search.
#[derive(Parser)]
#[command(name = "gridfall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Find the minimal heat loss from the top-left to the bottom-right cell.
    HeatLoss {
        /// Grid of digits, one row per line.
        input: PathBuf,
        /// Use runs of 4 to 10 cells instead of 1 to 3.
        #[arg(long)]
        ultra: bool,
        /// Override the shortest allowed run.
        #[arg(long)]
        min_run: Option<usize>,
        /// Override the longest allowed run.
        #[arg(long)]
        max_run: Option<usize>,
        /// Watch the search in the 3D viewer.
        #[arg(long)]
        show: bool,
        /// Only send every n-th search step to the viewer [default: scales
        /// with the grid size].
        #[arg(long)]
        every: Option<usize>,
    },
    /// Settle falling bricks and find which ones can be removed safely.
    Bricks {
        /// One brick per line as `x,y,z~x,y,z`.
        input: PathBuf,
        /// Re-simulate every removal instead of using support relations.
        #[arg(long)]
        brute_force: bool,
        /// Watch the bricks settle in the 3D viewer.
        #[arg(long)]
        show: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // no subcommand: show usage
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {}", e);
        }
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Builds the requested puzzle and solves it, with or without the viewer.
fn run(command: Command) -> anyhow::Result<()> {
    let (puzzle, show): (Box<dyn PuzzleOps + Send>, bool) = match command {
        Command::HeatLoss {
            input,
            ultra,
            min_run,
            max_run,
            show,
            every,
        } => {
            let base = if ultra {
                RunLimits::ULTRA_CRUCIBLE
            } else {
                RunLimits::CRUCIBLE
            };
            let limits = RunLimits::new(
                min_run.unwrap_or(base.min()),
                max_run.unwrap_or(base.max()),
            )?;
            let text = read_input(&input).with_context(|| format!("reading {}", input.display()))?;
            let mut puzzle = HeatLossPuzzle::parse(&text, limits)?;
            if let Some(every) = every {
                puzzle = puzzle.with_frame_every(every);
            }
            (Box::new(puzzle) as Box<dyn PuzzleOps + Send>, show)
        }
        Command::Bricks {
            input,
            brute_force,
            show,
        } => {
            let analysis = if brute_force {
                Analysis::BruteForce
            } else {
                Analysis::SupportGraph
            };
            let text = read_input(&input).with_context(|| format!("reading {}", input.display()))?;
            let puzzle = BrickPuzzle::parse(&text, analysis)?;
            (Box::new(puzzle) as Box<dyn PuzzleOps + Send>, show)
        }
    };

    if show {
        run_with_viewer(puzzle)
    } else {
        solve_and_print(puzzle.as_ref(), &mut NullSink, &CancelToken::new())
    }
}

/// Solves the puzzle and prints its answers.
fn solve_and_print(
    puzzle: &dyn PuzzleOps,
    sink: &mut dyn StepSink,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    info!("solving {}", puzzle.name());
    match puzzle.solve(sink, cancel) {
        Ok(answers) => {
            for answer in answers {
                println!("{}", answer);
            }
            Ok(())
        }
        Err(Error::Search(SearchError::Cancelled)) | Err(Error::Model(ModelError::Cancelled)) => {
            info!("viewer closed, {} cancelled", puzzle.name());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Runs the solver on a worker thread and the viewer on this one.
///
/// Closing the viewer cancels a solver that is still running.
fn run_with_viewer(puzzle: Box<dyn PuzzleOps + Send>) -> anyhow::Result<()> {
    let (mut sink, frames) = ChannelSink::bounded(FRAME_QUEUE_CAPACITY);
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let title = puzzle.name().to_string();

    let worker = thread::spawn(move || {
        let result = solve_and_print(puzzle.as_ref(), &mut sink, &worker_cancel);
        if sink.dropped() > 0 {
            warn!("{} frames were dropped", sink.dropped());
        }
        result
    });

    println!("Controls: Left/Right step, Up/Down zoom, R reset, P play");
    visualization::display(frames, &title);

    cancel.cancel();
    worker
        .join()
        .map_err(|_| anyhow!("solver thread panicked"))?
}
