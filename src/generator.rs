//! Randomized depth-first maze carving.
//!
//! The backtracker walks from a random cell, knocking down the wall to a
//! random uncarved neighbour until every cell has been reached, and
//! backtracks along its path when it hits a dead end. The result is a
//! spanning tree. A second pass then opens a few random walls so the maze
//! has loops.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::grid::MazeGrid;

/// Fraction of `rows * columns` walls opened after the tree is complete.
pub const DEFAULT_EXTRA_PASSAGE_RATIO: f64 = 0.1;
/// Largest accepted extra-passage ratio: one extra wall per cell.
pub const MAX_EXTRA_PASSAGE_RATIO: f64 = 1.0;

/// What a generation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    pub carves: usize,
    pub backtracks: usize,
    pub extra_passages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backtracker {
    pub extra_passage_ratio: f64,
}

impl Default for Backtracker {
    fn default() -> Self {
        Self {
            extra_passage_ratio: DEFAULT_EXTRA_PASSAGE_RATIO,
        }
    }
}

impl Backtracker {
    pub fn new(extra_passage_ratio: f64) -> Self {
        Self {
            extra_passage_ratio,
        }
    }

    /// Number of extra passages injected for a grid of `cells` cells. The
    /// ratio is clamped to `0..=MAX_EXTRA_PASSAGE_RATIO`; NaN counts as zero.
    pub fn extra_passages_for(&self, cells: usize) -> usize {
        let ratio = if self.extra_passage_ratio.is_nan() {
            0.0
        } else {
            self.extra_passage_ratio.clamp(0.0, MAX_EXTRA_PASSAGE_RATIO)
        };
        (ratio * cells as f64).floor() as usize
    }

    /// Carves a spanning tree over `grid` and then injects extra passages.
    ///
    /// `grid` must be freshly built: every cell closed and uncarved.
    pub fn generate(&self, grid: &mut MazeGrid, rng: &mut impl Rng) -> GenerationStats {
        let total = grid.len();
        let mut current = grid.random_location(rng);
        grid.mark_carved(current);
        let mut moves = vec![current];
        let mut carves = 0;
        let mut backtracks = 0;

        while carves < total - 1 {
            let good_neighbours = grid.neighbours(current, true);
            if let Some(&dir) = good_neighbours.choose(rng) {
                current = grid.carve_between(current, dir);
                moves.push(current);
                carves += 1;
            } else {
                moves.pop();
                current = *moves
                    .last()
                    .expect("backtracker emptied its path before carving every cell");
                backtracks += 1;
            }
        }

        let extra_passages = self.add_random_passages(grid, self.extra_passages_for(total), rng);

        info!(
            rows = grid.rows(),
            columns = grid.columns(),
            carves,
            extra_passages,
            "maze generated"
        );
        GenerationStats {
            carves,
            backtracks,
            extra_passages,
        }
    }

    /// Opens the wall between `count` random cells and a random neighbour,
    /// whether or not it is already open. Returns how many were attempted.
    fn add_random_passages(&self, grid: &mut MazeGrid, count: usize, rng: &mut impl Rng) -> usize {
        let mut opened = 0;
        for _ in 0..count {
            let loc = grid.random_location(rng);
            let neighbours = grid.neighbours(loc, false);
            if let Some(&dir) = neighbours.choose(rng) {
                grid.carve_between(loc, dir);
                opened += 1;
            }
        }
        debug!(requested = count, opened, "extra passages injected");
        opened
    }
}
