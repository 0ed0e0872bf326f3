//! Sparse letter grid: placement validation, geometry statistics, and the
//! canonical hash used for cross-branch deduplication.
//!
//! A grid is a mapping from [`Point`] to an uppercase letter, plus the ordered
//! list of [`Placement`]s that produced it. Cells are canonically "empty" when
//! their key is absent from the map *or* their value is the [`FILLER`]
//! sentinel: [`Grid::remove_word`] overwrites vacated cells with the filler
//! rather than deleting them, and every consumer (validation, geometry,
//! hashing, equality, rendering) looks through filler cells as if they were
//! absent.
//!
//! Grids are copy-on-branch snapshots: the solver never mutates a shared grid,
//! it clones the parent and applies one more placement per branch. `Clone` is
//! the deep copy.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::metric::Metric;
use crate::render::GridRenderer;

/// Character written into vacated cells by [`Grid::remove_word`] and emitted
/// for unoccupied cells in hashes and rendered output.
pub const FILLER: char = '.';

/// Separator appended after each row of the canonical hash.
const ROW_SEPARATOR: char = '|';
/// Separator between the cell block and the word list in the canonical hash.
const WORD_SEPARATOR: char = '#';

/// Integer coordinate on the unbounded plane. `x` grows rightward, `y` grows
/// downward. The derived `Ord` is lexicographic `(x, y)`, which fixes the
/// deterministic traversal order used by [`Grid::positions_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis a word runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Per-letter step for this direction.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
        }
    }

    /// Offsets of the two neighbors perpendicular to this direction.
    fn perpendicular_offsets(self) -> [(i32, i32); 2] {
        match self {
            Direction::Horizontal => [(0, -1), (0, 1)],
            Direction::Vertical => [(-1, 0), (1, 0)],
        }
    }
}

/// A word bound to an origin point and a direction: one candidate or applied
/// occupation of the cells `origin + i * delta(direction)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub word: String,
    pub origin: Point,
    pub direction: Direction,
}

impl Placement {
    #[must_use]
    pub fn new(word: impl Into<String>, origin: Point, direction: Direction) -> Self {
        Self { word: word.into(), origin, direction }
    }

    /// Number of cells this placement occupies.
    fn len(&self) -> i32 {
        self.word.chars().count() as i32
    }

    /// The occupied cells in word order, paired with their letters.
    fn cells(&self) -> impl Iterator<Item = (Point, char)> + '_ {
        let (dx, dy) = self.direction.delta();
        self.word.chars().enumerate().map(move |(i, ch)| {
            let i = i as i32;
            (Point::new(self.origin.x + i * dx, self.origin.y + i * dy), ch)
        })
    }
}

/// Bounding box of the occupied cells.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

/// Sparse letter surface plus the placements applied to it (insertion order =
/// solving order) and the score cached by the last [`Grid::evaluate`] call.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: HashMap<Point, char>,
    placements: Vec<Placement>,
    score: f64,
}

/// Equality is over the occupied-cell maps only (same points, same letters);
/// placement history and the cached score are not compared.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.occupied_count() == other.occupied_count()
            && self.occupied_cells().all(|(p, ch)| other.letter(p) == Some(ch))
    }
}

impl Grid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The letter at `p`, or `None` if the cell is empty (absent or filler).
    fn letter(&self, p: Point) -> Option<char> {
        self.cells.get(&p).copied().filter(|&ch| ch != FILLER)
    }

    fn has(&self, x: i32, y: i32) -> bool {
        self.letter(Point::new(x, y)).is_some()
    }

    fn occupied_cells(&self) -> impl Iterator<Item = (Point, char)> + '_ {
        self.cells.iter().filter(|(_, &ch)| ch != FILLER).map(|(&p, &ch)| (p, ch))
    }

    fn occupied_count(&self) -> usize {
        self.occupied_cells().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_cells().next().is_none()
    }

    /// Placements currently applied, in solving order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Score cached by the last [`Grid::evaluate`] call.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for (p, _) in self.occupied_cells() {
            bounds = Some(match bounds {
                None => Bounds { min_x: p.x, max_x: p.x, min_y: p.y, max_y: p.y },
                Some(b) => Bounds {
                    min_x: b.min_x.min(p.x),
                    max_x: b.max_x.max(p.x),
                    min_y: b.min_y.min(p.y),
                    max_y: b.max_y.max(p.y),
                },
            });
        }
        bounds
    }

    /// Center of the bounding box (integer division; `(0, 0)` for an empty grid).
    fn center(&self) -> (i32, i32) {
        match self.bounds() {
            Some(b) => (b.min_x + (b.max_x - b.min_x) / 2, b.min_y + (b.max_y - b.min_y) / 2),
            None => (0, 0),
        }
    }

    /// Bounding-box width x height of the occupied cells; 0 if empty.
    #[must_use]
    pub fn area(&self) -> u64 {
        match self.bounds() {
            Some(b) => (b.max_x - b.min_x + 1) as u64 * (b.max_y - b.min_y + 1) as u64,
            None => 0,
        }
    }

    /// Occupied-cell count divided by [`Grid::area`]; 0.0 if empty.
    #[must_use]
    pub fn density(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.occupied_count() as f64 / self.area() as f64
    }

    /// Count of cells that have both an occupied horizontal neighbor (left or
    /// right) and an occupied vertical neighbor (up or down).
    #[must_use]
    pub fn intersections(&self) -> usize {
        self.occupied_cells()
            .filter(|(p, _)| {
                let horiz = self.has(p.x - 1, p.y) || self.has(p.x + 1, p.y);
                let vert = self.has(p.x, p.y - 1) || self.has(p.x, p.y + 1);
                horiz && vert
            })
            .count()
    }

    /// Whether `placement` satisfies every placement invariant against the
    /// current grid:
    ///
    /// 1. the cell before its start and the cell after its end are empty
    ///    (no word may be directly extended);
    /// 2. every occupied target cell carries the same letter and has empty
    ///    parallel neighbors, every empty target cell has empty perpendicular
    ///    neighbors;
    /// 3. once the grid is non-empty, at least one target cell intersects an
    ///    existing letter. The first word on an empty grid is always
    ///    acceptable.
    #[must_use]
    pub fn can_place(&self, placement: &Placement) -> bool {
        if self.is_extension(placement) {
            return false;
        }

        let grid_not_empty = !self.is_empty();
        let mut has_intersection = false;

        let (dx, dy) = placement.direction.delta();
        for (p, ch) in placement.cells() {
            if let Some(existing) = self.letter(p) {
                if existing != ch || self.parallel_conflict(p, dx, dy) {
                    return false;
                }
                has_intersection = true;
            } else if self.perpendicular_conflict(p, placement.direction) {
                return false;
            }
        }

        !(grid_not_empty && !has_intersection)
    }

    /// True when the cell immediately before the placement's start or
    /// immediately after its end is occupied.
    fn is_extension(&self, placement: &Placement) -> bool {
        let (dx, dy) = placement.direction.delta();
        let len = placement.len();
        let before = Point::new(placement.origin.x - dx, placement.origin.y - dy);
        let after = Point::new(placement.origin.x + dx * len, placement.origin.y + dy * len);
        self.letter(before).is_some() || self.letter(after).is_some()
    }

    /// True when either cell adjacent to `p` along the placement's own axis is
    /// occupied. Checked at intersection cells: an occupied parallel neighbor
    /// would mean the crossing word is being extended through `p`.
    fn parallel_conflict(&self, p: Point, dx: i32, dy: i32) -> bool {
        self.has(p.x - dx, p.y - dy) || self.has(p.x + dx, p.y + dy)
    }

    /// True when either cell perpendicular to `dir` at `p` is occupied.
    /// Checked at empty target cells: writing a letter there would form an
    /// unintended side-by-side word.
    fn perpendicular_conflict(&self, p: Point, dir: Direction) -> bool {
        dir.perpendicular_offsets()
            .iter()
            .any(|(ox, oy)| self.has(p.x + ox, p.y + oy))
    }

    /// Apply `placement` if [`Grid::can_place`] accepts it, writing every
    /// letter and recording the placement. Returns whether it was applied.
    pub fn place_word(&mut self, placement: &Placement) -> bool {
        if !self.can_place(placement) {
            return false;
        }
        for (p, ch) in placement.cells() {
            self.cells.insert(p, ch);
        }
        self.placements.push(placement.clone());
        true
    }

    /// Overwrite the placement's cells with the filler sentinel and drop its
    /// record, so the canonical hash never names a removed word. The cells
    /// stay present in the map; they read as empty everywhere.
    pub fn remove_word(&mut self, placement: &Placement) {
        for (p, _) in placement.cells() {
            self.cells.insert(p, FILLER);
        }
        self.placements.retain(|applied| applied != placement);
    }

    /// Enumerate candidate placements for `word`.
    ///
    /// On an empty grid there is exactly one candidate: horizontal at the
    /// origin. Otherwise, for every occupied point in ascending `(x, y)` order
    /// and every letter index, the horizontal and vertical placements aligning
    /// that letter onto the point are generated, filtered through
    /// [`Grid::can_place`], and stably sorted descending by
    /// [`Grid::position_score`] (ties keep generation order).
    #[must_use]
    pub fn positions_list(&self, word: &str) -> Vec<Placement> {
        if self.is_empty() {
            return vec![Placement::new(word, Point::new(0, 0), Direction::Horizontal)];
        }

        let mut points: Vec<Point> = self.occupied_cells().map(|(p, _)| p).collect();
        points.sort_unstable();

        let len = word.chars().count() as i32;
        let mut placements = Vec::new();
        for point in points {
            for i in 0..len {
                let horizontal =
                    Placement::new(word, Point::new(point.x - i, point.y), Direction::Horizontal);
                if self.can_place(&horizontal) {
                    placements.push(horizontal);
                }

                let vertical =
                    Placement::new(word, Point::new(point.x, point.y - i), Direction::Vertical);
                if self.can_place(&vertical) {
                    placements.push(vertical);
                }
            }
        }

        placements.sort_by_key(|p| Reverse(self.position_score(p)));
        placements
    }

    /// 10 per target cell that already holds a matching letter, minus the
    /// Manhattan distance from the placement's origin to the bounding-box
    /// center. Higher is better.
    fn position_score(&self, placement: &Placement) -> i32 {
        let mut score = 0;
        for (p, _) in placement.cells() {
            if self.letter(p).is_some() {
                score += 10;
            }
        }

        let (cx, cy) = self.center();
        score - ((placement.origin.x - cx).abs() + (placement.origin.y - cy).abs())
    }

    /// Score this grid under `metric`, caching and returning the value.
    pub fn evaluate(&mut self, metric: &dyn Metric) -> f64 {
        self.score = metric.evaluate(self);
        self.score
    }

    /// A copy translated so the bounding box's minimum corner sits at `(0, 0)`.
    /// An empty grid normalizes to an empty copy (filler residue is dropped).
    #[must_use]
    pub fn normalize(&self) -> Grid {
        let Some(b) = self.bounds() else {
            return Grid { cells: HashMap::new(), placements: self.placements.clone(), score: self.score };
        };

        let cells = self
            .occupied_cells()
            .map(|(p, ch)| (Point::new(p.x - b.min_x, p.y - b.min_y), ch))
            .collect();

        let placements = self
            .placements
            .iter()
            .map(|p| {
                Placement::new(
                    p.word.clone(),
                    Point::new(p.origin.x - b.min_x, p.origin.y - b.min_y),
                    p.direction,
                )
            })
            .collect();

        Grid { cells, placements, score: self.score }
    }

    /// Canonical representation for deduplication and equality testing.
    ///
    /// The normalized grid is emitted row-major (`0..=max_y` x `0..=max_x`),
    /// one letter or [`FILLER`] per cell, `'|'` after each row; if any words
    /// have been placed, a `'#'` separator is followed by the words sorted
    /// lexicographically and comma-joined. Two grids that are translations of
    /// one another, built via different placement orders, hash identically.
    /// An empty grid hashes to the empty string.
    #[must_use]
    pub fn hash(&self) -> String {
        let Some(b) = self.bounds() else {
            return String::new();
        };

        let norm = self.normalize();
        let (max_x, max_y) = (b.max_x - b.min_x, b.max_y - b.min_y);

        let mut out = String::with_capacity(((max_x + 2) * (max_y + 1)) as usize);
        for y in 0..=max_y {
            for x in 0..=max_x {
                out.push(norm.letter(Point::new(x, y)).unwrap_or(FILLER));
            }
            out.push(ROW_SEPARATOR);
        }

        if !norm.placements.is_empty() {
            let mut words: Vec<&str> = norm.placements.iter().map(|p| p.word.as_str()).collect();
            words.sort_unstable();
            out.push(WORD_SEPARATOR);
            out.push_str(&words.join(","));
        }

        out
    }

    /// Drive `renderer` over the bounding box: one `draw_cell` per cell
    /// (filler for empty), a `'\n'` cell past each row's last column, then
    /// `finish`. An empty grid only signals completion.
    pub fn render(&self, renderer: &mut dyn GridRenderer) {
        let Some(b) = self.bounds() else {
            renderer.finish();
            return;
        };

        for y in b.min_y..=b.max_y {
            for x in b.min_x..=b.max_x {
                renderer.draw_cell(x, y, self.letter(Point::new(x, y)).unwrap_or(FILLER));
            }
            renderer.draw_cell(b.max_x + 1, y, '\n');
        }

        renderer.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(word: &str, x: i32, y: i32, direction: Direction) -> Placement {
        Placement::new(word, Point::new(x, y), direction)
    }

    #[test]
    fn test_can_place_on_empty_grid() {
        let g = Grid::new();
        assert!(g.can_place(&placement("ROOM", 0, 0, Direction::Horizontal)));
        assert!(g.can_place(&placement("ROOM", -7, 13, Direction::Vertical)));
    }

    #[test]
    fn test_can_place_rejects_letter_conflict() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ALL", 0, 0, Direction::Vertical)));

        // 'R' of ROOM collides with 'A' of ALL at the origin
        assert!(!g.can_place(&placement("ROOM", 0, 0, Direction::Horizontal)));
    }

    #[test]
    fn test_can_place_accepts_correct_intersection() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("OMEGA", 0, 0, Direction::Horizontal)));

        // ROOM's second letter lands on OMEGA's 'O'
        assert!(g.can_place(&placement("ROOM", 0, -1, Direction::Vertical)));
    }

    #[test]
    fn test_can_place_rejects_perpendicular_neighbor() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("XENON", 0, 1, Direction::Horizontal)));

        // every cell of this row has an occupied neighbor directly below
        assert!(!g.can_place(&placement("ROOM", 0, 0, Direction::Horizontal)));
    }

    #[test]
    fn test_can_place_rejects_occupied_cell_before_start() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("X", -1, 0, Direction::Horizontal)));

        assert!(!g.can_place(&placement("ROOM", 0, 0, Direction::Horizontal)));
    }

    #[test]
    fn test_can_place_rejects_occupied_cell_after_end() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("X", 4, 0, Direction::Horizontal)));

        assert!(!g.can_place(&placement("ROOM", 0, 0, Direction::Horizontal)));
    }

    #[test]
    fn test_can_place_requires_intersection_once_nonempty() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));

        // far away, conflict-free, but touches nothing
        assert!(!g.can_place(&placement("DOG", 0, 5, Direction::Horizontal)));
    }

    #[test]
    fn test_place_word_records_placement() {
        let mut g = Grid::new();
        let p = placement("ROOM", 0, 0, Direction::Horizontal);
        assert!(g.place_word(&p));

        assert_eq!(g.placements(), &[p]);
    }

    #[test]
    fn test_remove_word_leaves_empty_grid() {
        let mut g = Grid::new();
        let p = placement("ROOM", 0, 0, Direction::Horizontal);
        assert!(g.place_word(&p));
        g.remove_word(&p);

        // filler cells stay in the map but read as empty everywhere
        assert!(g.is_empty());
        assert_eq!(g.area(), 0);
        assert_eq!(g.density(), 0.0);
        assert_eq!(g.hash(), "");
        assert_eq!(g, Grid::new());
    }

    #[test]
    fn test_geometry_of_crossed_words() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));
        assert!(g.place_word(&placement("OMEGA", 1, 0, Direction::Vertical)));

        // 4 + 5 letters sharing one cell, in a 4x5 box
        assert_eq!(g.area(), 20);
        assert!((g.density() - 8.0 / 20.0).abs() < f64::EPSILON);
        assert_eq!(g.intersections(), 1);
    }

    #[test]
    fn test_hash_is_translation_invariant() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ATTRIBUTE", 20, 20, Direction::Vertical)));
        assert!(g.place_word(&placement("ATTITUDE", 20, 20, Direction::Horizontal)));

        assert_eq!(g.hash(), g.normalize().hash());
    }

    #[test]
    fn test_hash_ignores_placement_order() {
        let mut g1 = Grid::new();
        assert!(g1.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));
        assert!(g1.place_word(&placement("OMEGA", 1, 0, Direction::Vertical)));

        // same shape reached word-by-word in the opposite order, elsewhere on
        // the plane
        let mut g2 = Grid::new();
        assert!(g2.place_word(&placement("OMEGA", 5, 3, Direction::Vertical)));
        assert!(g2.place_word(&placement("ROOM", 4, 3, Direction::Horizontal)));

        assert_eq!(g1.hash(), g2.hash());
        assert_eq!(g1, g2.normalize());
    }

    #[test]
    fn test_hash_lists_words_sorted() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));
        assert!(g.place_word(&placement("OMEGA", 1, 0, Direction::Vertical)));

        let hash = g.hash();
        assert!(hash.ends_with("#OMEGA,ROOM"));
    }

    #[test]
    fn test_hash_single_word() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ALPHA", 0, 0, Direction::Horizontal)));

        assert_eq!(g.hash(), "ALPHA|#ALPHA");
    }

    #[test]
    fn test_empty_grid_hashes_to_empty_string() {
        assert_eq!(Grid::new().hash(), "");
    }

    #[test]
    fn test_positions_list_on_empty_grid() {
        let g = Grid::new();
        let candidates = g.positions_list("ROOM");

        assert_eq!(candidates, vec![placement("ROOM", 0, 0, Direction::Horizontal)]);
    }

    #[test]
    fn test_positions_list_prefers_central_intersections() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));

        // OMEGA can only hook onto ROOM vertically: through either 'O', or
        // through 'M' via its second letter. The 'O' at x=1 sits on the
        // bounding-box center, so it sorts first.
        let candidates = g.positions_list("OMEGA");
        assert_eq!(
            candidates,
            vec![
                placement("OMEGA", 1, 0, Direction::Vertical),
                placement("OMEGA", 2, 0, Direction::Vertical),
                placement("OMEGA", 3, -1, Direction::Vertical),
            ]
        );
    }

    #[test]
    fn test_positions_list_empty_when_no_letters_shared() {
        let mut g = Grid::new();
        assert!(g.place_word(&placement("CAT", 0, 0, Direction::Horizontal)));

        assert!(g.positions_list("DOG").is_empty());
    }

    #[test]
    fn test_equality_ignores_history_and_score() {
        let mut g1 = Grid::new();
        assert!(g1.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));

        let mut g2 = Grid::new();
        assert!(g2.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));
        g2.evaluate(&crate::metric::DensityMetric);

        assert_eq!(g1, g2);
    }

    #[test]
    fn test_normalize_empty_grid() {
        let g = Grid::new();
        let norm = g.normalize();

        assert!(norm.is_empty());
        assert_eq!(norm, g);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut g1 = Grid::new();
        assert!(g1.place_word(&placement("ROOM", 0, 0, Direction::Horizontal)));

        let g2 = g1.clone();
        assert!(g1.place_word(&placement("OMEGA", 1, 0, Direction::Vertical)));

        assert_ne!(g1, g2);
        assert_eq!(g2.placements().len(), 1);
    }
}
