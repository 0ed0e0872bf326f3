//! Backtracking placement search over a preprocessed word list.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with two variants, both raised at
//! construction time:
//!
//! - S001: `Config` (Invalid search configuration (wraps [`ConfigError`]))
//! - S002: `BlankWord` (Word list contains a blank entry)
//!
//! Each error has a `code()`, optional `help()`, and `display_detailed()`
//! method. An exhaustive search that finds no arrangement is a normal
//! outcome, not an error: `solutions()` is empty and `best()` is `None`.
//!
//! # Examples
//!
//! ```
//! use crossgrid::metric::DensityMetric;
//! use crossgrid::solver::Solver;
//!
//! let words = vec!["ROOM".to_string(), "OMEGA".to_string()];
//! let mut solver = Solver::new(words, 5, 100.0, Box::new(DensityMetric))?;
//! solver.find_solutions();
//!
//! for (i, grid) in solver.solutions().iter().enumerate() {
//!     println!("#{}: {}", i + 1, grid.hash());
//! }
//! # Ok::<(), crossgrid::solver::SolverError>(())
//! ```

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use rayon::prelude::*;

use crate::errors::{format_error_with_code_and_help, ConfigError};
use crate::grid::Grid;
use crate::metric::Metric;

/// Depth at which the parallel search dispatches candidate branches to worker
/// tasks: the children of the first-word grid (the first state with at least
/// one word placed). Deeper levels run sequentially inside their worker.
const PARALLEL_DISPATCH_DEPTH: usize = 1;

/// Unified error type for solver construction.
///
/// Consolidates configuration validation and word-list validation so callers
/// only need to handle a single `Result<_, SolverError>`.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// Invalid search configuration (threshold, solution cap, metric weights).
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The word list contains an entry that is blank after trimming. The word
    /// source is expected to hand over non-blank tokens; the violation is
    /// reported rather than assumed impossible.
    #[error("word list entry {index} is blank")]
    BlankWord { index: usize },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::Config(_) => "S001",
            SolverError::BlankWord { .. } => "S002",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::Config(_) => None, // ConfigError carries its own help
            SolverError::BlankWord { .. } => {
                Some("Filter blank lines out of the word source before handing it to the solver")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::Config(config_err) => {
                // delegate to ConfigError's detailed display
                format!("{}\n  caused by: {}", self.code(), config_err.display_detailed())
            }
            SolverError::BlankWord { .. } => {
                format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
            }
        }
    }
}

/// Exhaustive backtracking search: places every word of a preprocessed list
/// onto a shared grid, deduplicating structurally identical branches and
/// pruning branches that score too far below the best completed solution.
pub struct Solver {
    words: Vec<String>,
    quality_threshold: f64,
    max_solutions: usize,
    metric: Box<dyn Metric>,
    solutions: Vec<Grid>,
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("words", &self.words)
            .field("quality_threshold", &self.quality_threshold)
            .field("max_solutions", &self.max_solutions)
            .field("metric", &"<dyn Metric>")
            .field("solutions", &self.solutions)
            .finish()
    }
}

impl Solver {
    /// Build a solver over `words`.
    ///
    /// Words are trimmed, uppercased, and reordered descending by
    /// crossability (the sum over a word's letters of how often each letter
    /// appears elsewhere in the list), so well-connected words are placed
    /// first and dead branches surface early.
    ///
    /// # Errors
    ///
    /// - [`SolverError::Config`] if `max_solutions` is 0 or
    ///   `quality_threshold` is negative or not finite.
    /// - [`SolverError::BlankWord`] if any word is blank after trimming.
    pub fn new(
        words: Vec<String>,
        max_solutions: usize,
        quality_threshold: f64,
        metric: Box<dyn Metric>,
    ) -> Result<Self, SolverError> {
        if max_solutions < 1 {
            return Err(ConfigError::InvalidMaxSolutions { value: max_solutions }.into());
        }
        if !quality_threshold.is_finite() || quality_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold { value: quality_threshold }.into());
        }
        if let Some(index) = words.iter().position(|w| w.trim().is_empty()) {
            return Err(SolverError::BlankWord { index });
        }

        Ok(Self {
            words: preprocess_words(&words),
            quality_threshold,
            max_solutions,
            metric,
            solutions: Vec::new(),
        })
    }

    /// The preprocessed word list, in placement order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Completed solutions, sorted by score descending with the canonical
    /// hash as tie-break. Empty until a `find_solutions*` call, and empty
    /// after one when no arrangement satisfies the placement rules.
    #[must_use]
    pub fn solutions(&self) -> &[Grid] {
        &self.solutions
    }

    /// The highest-scoring solution, or `None` when there are no solutions.
    #[must_use]
    pub fn best(&self) -> Option<&Grid> {
        self.solutions.first()
    }

    /// Run the sequential depth-first search.
    ///
    /// The seen-hash set and the best score are global to the whole search:
    /// a branch is abandoned when its grid hash was already reached anywhere
    /// (cross-branch memoization), or when its score trails the best
    /// completed solution found so far by more than the quality threshold.
    pub fn find_solutions(&mut self) {
        self.solutions.clear();

        let mut search = SequentialSearch {
            words: &self.words,
            metric: self.metric.as_ref(),
            quality_threshold: self.quality_threshold,
            max_solutions: self.max_solutions,
            seen: HashSet::new(),
            best_score: 0.0,
            solutions: Vec::new(),
        };
        search.explore(Grid::new(), 0);

        debug!(
            "search explored {} distinct grids, kept {} solutions",
            search.seen.len(),
            search.solutions.len()
        );

        let mut solutions = search.solutions;
        sort_solutions(&mut solutions);
        self.solutions = solutions;
    }

    /// Run the search with candidate branches dispatched to worker tasks.
    ///
    /// The seen set, best score, solution list, and cancellation signal are
    /// shared across workers; the final ordering is identical to the
    /// sequential mode (score descending, canonical hash tie-break).
    pub fn find_solutions_parallel(&mut self) {
        self.solutions.clear();

        let shared = SharedSearch {
            words: &self.words,
            metric: self.metric.as_ref(),
            quality_threshold: self.quality_threshold,
            max_solutions: self.max_solutions,
            seen: Mutex::new(HashSet::new()),
            best_bits: AtomicU64::new(0.0_f64.to_bits()),
            solutions: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
        };
        shared.explore(&Grid::new(), 0);

        let mut solutions = shared.solutions.into_inner().unwrap_or_else(PoisonError::into_inner);
        sort_solutions(&mut solutions);
        self.solutions = solutions;
    }
}

/// Deterministic final ordering: score descending, canonical hash ascending.
/// Identical inputs produce an identical solutions list whether the search
/// ran sequentially or in parallel.
fn sort_solutions(solutions: &mut [Grid]) {
    solutions.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.hash().cmp(&b.hash()))
    });
}

/// State of one sequential search run. `seen` and `best_score` are shared by
/// every branch of the recursion, not threaded per call: the pruning check
/// always compares against the true maximum over all completed solutions.
struct SequentialSearch<'a> {
    words: &'a [String],
    metric: &'a dyn Metric,
    quality_threshold: f64,
    max_solutions: usize,
    seen: HashSet<String>,
    best_score: f64,
    solutions: Vec<Grid>,
}

impl SequentialSearch<'_> {
    fn explore(&mut self, mut grid: Grid, index: usize) {
        if self.solutions.len() >= self.max_solutions {
            return;
        }

        if !self.seen.insert(grid.hash()) {
            return;
        }

        let score = grid.evaluate(self.metric);

        if index > 0 && self.best_score - score > self.quality_threshold {
            debug!(
                "pruned branch at depth {index}: score {score:.3} trails best {:.3}",
                self.best_score
            );
            return;
        }

        if index >= self.words.len() {
            if score > self.best_score {
                info!("new best solution: score {score:.3}");
                self.best_score = score;
            }
            self.solutions.push(grid);
            return;
        }

        for candidate in grid.positions_list(&self.words[index]) {
            let mut next = grid.clone();
            let placed = next.place_word(&candidate);
            debug_assert!(placed, "positions_list must only yield placeable candidates");
            self.explore(next, index + 1);
        }
    }
}

/// State shared by all workers of one parallel search run. Only these four
/// structures are synchronized; no lock is held across a recursive call.
struct SharedSearch<'a> {
    words: &'a [String],
    metric: &'a dyn Metric,
    quality_threshold: f64,
    max_solutions: usize,
    seen: Mutex<HashSet<String>>,
    /// Best completed score as `f64` bits. Metric scores are non-negative,
    /// so the bit patterns order the same way the floats do and a monotonic
    /// integer max implements a monotonic float max.
    best_bits: AtomicU64,
    solutions: Mutex<Vec<Grid>>,
    cancelled: AtomicBool,
}

impl SharedSearch<'_> {
    fn best_score(&self) -> f64 {
        f64::from_bits(self.best_bits.load(Ordering::SeqCst))
    }

    /// Raise the shared best score to `score` if it is an improvement; the
    /// update is visible to every worker's next pruning check.
    fn raise_best(&self, score: f64) {
        let raised = self.best_bits.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
            (score > f64::from_bits(bits)).then_some(score.to_bits())
        });
        if raised.is_ok() {
            info!("new best solution: score {score:.3}");
        }
    }

    fn explore(&self, grid: &Grid, index: usize) {
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }

        if !lock(&self.seen).insert(grid.hash()) {
            return;
        }

        let mut grid = grid.clone();
        let score = grid.evaluate(self.metric);

        if index > 0 && self.best_score() - score > self.quality_threshold {
            return;
        }

        if index >= self.words.len() {
            self.raise_best(score);

            let mut solutions = lock(&self.solutions);
            if solutions.len() < self.max_solutions {
                solutions.push(grid);
                if solutions.len() >= self.max_solutions {
                    // cap reached: tell outstanding workers to stop spawning
                    self.cancelled.store(true, Ordering::SeqCst);
                }
            }
            return;
        }

        let candidates = grid.positions_list(&self.words[index]);
        if index == PARALLEL_DISPATCH_DEPTH {
            candidates.into_par_iter().for_each(|candidate| {
                if self.cancelled.load(Ordering::SeqCst) {
                    return;
                }
                let mut next = grid.clone();
                let placed = next.place_word(&candidate);
                debug_assert!(placed, "positions_list must only yield placeable candidates");
                self.explore(&next, index + 1);
            });
        } else {
            for candidate in candidates {
                let mut next = grid.clone();
                let placed = next.place_word(&candidate);
                debug_assert!(placed, "positions_list must only yield placeable candidates");
                self.explore(&next, index + 1);
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trim and uppercase every word, then order the list descending by
/// crossability so words sharing common letters with many others are placed
/// first. The sort is stable: ties keep input order, for determinism.
fn preprocess_words(words: &[String]) -> Vec<String> {
    let mut processed: Vec<String> = words.iter().map(|w| w.trim().to_uppercase()).collect();
    let freq = letter_frequency(&processed);
    processed.sort_by_key(|w| Reverse(cross_score(w, &freq)));
    processed
}

/// Per-letter occurrence counts across the whole word list.
fn letter_frequency(words: &[String]) -> HashMap<char, usize> {
    let mut freq = HashMap::new();
    for word in words {
        for ch in word.chars() {
            *freq.entry(ch).or_insert(0) += 1;
        }
    }
    freq
}

/// Sum over the word's letters of `(global frequency of that letter - 1)`:
/// how many chances each letter has to cross some other word.
fn cross_score(word: &str, freq: &HashMap<char, usize>) -> usize {
    word.chars().map(|ch| freq.get(&ch).copied().unwrap_or(1) - 1).sum()
}
