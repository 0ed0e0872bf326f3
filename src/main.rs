use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use crossgrid::errors::ConfigError;
use crossgrid::metric::{DensityAndIntersectionMetric, DensityMetric, Metric};
use crossgrid::render::TextRenderer;
use crossgrid::solver::{Solver, SolverError};
use crossgrid::word_list::WordList;

/// Scoring metric selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricKind {
    /// Fill density of the bounding box
    Density,
    /// Weighted blend of density and intersections per area
    Blend,
}

/// Crossword-style grid generator
#[derive(Parser, Debug)]
#[command(
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about,
    long_about = None
)]
struct Cli {
    /// Path to the word list file (one word per line)
    words_file: String,

    /// Maximum tolerated score gap between the best solution found so far and
    /// a branch still allowed to continue; lower discards more branches
    #[arg(short = 'q', long, default_value_t = 4.4)]
    quality_threshold: f64,

    /// Maximum number of solutions to collect
    #[arg(short = 'n', long, default_value_t = 1)]
    max_solutions: usize,

    /// Scoring metric
    #[arg(short, long, value_enum, default_value = "density")]
    metric: MetricKind,

    /// Density weight for the blend metric
    #[arg(long, default_value_t = 100.0)]
    density_weight: f64,

    /// Intersection weight for the blend metric
    #[arg(long, default_value_t = 100.0)]
    intersection_weight: f64,

    /// Explore candidate branches on worker threads
    #[arg(short, long)]
    parallel: bool,
}

/// Entry point of the crossgrid CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    // Set up logging
    let debug_enabled = std::env::var("CROSSGRID_DEBUG").is_ok();
    crossgrid::log::init_logger(debug_enabled);

    log::info!("Starting crossgrid");

    if let Err(e) = try_main() {
        // Print the error message to stderr, with detailed formatting where available
        if let Some(solver_err) = e.downcast_ref::<SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else if let Some(config_err) = e.downcast_ref::<ConfigError>() {
            eprintln!("Error: {}", config_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        // Exit explicitly with a nonzero code so scripts can detect failure
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Core application logic for the crossgrid CLI.
///
/// Steps:
/// 1. Parse CLI arguments with Clap.
/// 2. Load the word list from disk.
/// 3. Search for grid arrangements of the words.
/// 4. Print each solution's ordinal and canonical hash on stdout, then render
///    the best grid.
/// 5. Print performance metrics (timings, counts) on stderr.
///
/// Returns `Ok(())` on success or an error (e.g., invalid configuration,
/// missing word-list file) which bubbles up to [`main`].
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // 1. Load the word list from disk
    let t_load = Instant::now();
    let word_list = WordList::load_from_path(&cli.words_file)?;
    let load_secs = t_load.elapsed().as_secs_f64();

    // 2. Build the configured metric; weight validation happens here
    let metric: Box<dyn Metric> = match cli.metric {
        MetricKind::Density => Box::new(DensityMetric),
        MetricKind::Blend => Box::new(DensityAndIntersectionMetric::new(
            cli.density_weight,
            cli.intersection_weight,
        )?),
    };

    // 3. Search for arrangements
    let mut solver = Solver::new(
        word_list.words,
        cli.max_solutions,
        cli.quality_threshold,
        metric,
    )?;

    let t_solve = Instant::now();
    if cli.parallel {
        solver.find_solutions_parallel();
    } else {
        solver.find_solutions();
    }
    let solve_secs = t_solve.elapsed().as_secs_f64();

    // 4. Print each solution's canonical hash, then render the best grid
    for (i, grid) in solver.solutions().iter().enumerate() {
        println!("=== Solution #{} ===", i + 1);
        println!("{}", grid.hash());
    }

    match solver.best() {
        Some(best) => {
            println!();
            let mut renderer = TextRenderer::new(std::io::stdout().lock());
            best.render(&mut renderer);
        }
        None => println!("No arrangement satisfies the placement rules."),
    }

    // 5. Print diagnostics (word count, timings, number of results) to stderr
    eprintln!(
        "Loaded {} words in {load_secs:.3}s; searched in {solve_secs:.3}s ({} solutions).",
        solver.words().len(),
        solver.solutions().len()
    );

    Ok(())
}
