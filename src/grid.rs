use std::collections::VecDeque;

use rand::Rng;

use crate::cell::Cell;
use crate::direction::Direction;
use crate::error::MazeError;

/// A `(row, column)` grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub row: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    pub fn manhattan(self, other: Location) -> usize {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

/// Dense `rows x columns` table of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl MazeGrid {
    /// Builds a grid of closed, uncarved cells.
    pub fn new(rows: usize, columns: usize) -> Result<Self, MazeError> {
        if rows == 0 || columns == 0 {
            return Err(MazeError::InvalidDimensions { rows, columns });
        }
        let mut cells = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(Cell::new(Location::new(row, column)));
            }
        }
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, loc: Location) -> bool {
        loc.row < self.rows && loc.column < self.columns
    }

    fn index(&self, loc: Location) -> usize {
        loc.row * self.columns + loc.column
    }

    /// Cell at `loc`. Panics when `loc` is outside the grid.
    pub fn cell(&self, loc: Location) -> &Cell {
        assert!(
            self.contains(loc),
            "location {loc:?} outside {}x{} grid",
            self.rows,
            self.columns
        );
        &self.cells[self.index(loc)]
    }

    fn cell_mut(&mut self, loc: Location) -> &mut Cell {
        assert!(
            self.contains(loc),
            "location {loc:?} outside {}x{} grid",
            self.rows,
            self.columns
        );
        let idx = self.index(loc);
        &mut self.cells[idx]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Neighbouring location across `dir`, if it stays in bounds.
    pub fn adjacent(&self, loc: Location, dir: Direction) -> Option<Location> {
        let (dr, dc) = dir.offset();
        let row = loc.row.checked_add_signed(dr)?;
        let column = loc.column.checked_add_signed(dc)?;
        let next = Location::new(row, column);
        self.contains(next).then_some(next)
    }

    /// Neighbouring location across `dir`.
    ///
    /// Callers must have filtered `dir` through [`Self::neighbours`] or an
    /// open-path check; crossing the grid edge panics.
    pub fn neighbour(&self, loc: Location, dir: Direction) -> Location {
        self.adjacent(loc, dir).unwrap_or_else(|| {
            panic!(
                "no neighbour {dir:?} of {loc:?} in {}x{} grid",
                self.rows, self.columns
            )
        })
    }

    pub fn random_location(&self, rng: &mut impl Rng) -> Location {
        Location::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.columns))
    }

    /// Directions from `loc` that lead to an in-bounds cell. With
    /// `uncarved_only` the neighbour must not have been carved yet.
    pub fn neighbours(&self, loc: Location, uncarved_only: bool) -> Vec<Direction> {
        let mut dirs = Vec::new();
        for dir in Direction::ALL {
            if let Some(next) = self.adjacent(loc, dir) {
                if !uncarved_only || !self.cell(next).is_carved() {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }

    /// Removes the wall between `loc` and its neighbour across `dir` on both
    /// sides and marks the neighbour carved. Returns the neighbour.
    pub fn carve_between(&mut self, loc: Location, dir: Direction) -> Location {
        let next = self.neighbour(loc, dir);
        self.cell_mut(loc).carve_passage(dir);
        let cell = self.cell_mut(next);
        cell.carve_passage(dir.opposite());
        cell.mark_carved();
        next
    }

    pub(crate) fn mark_carved(&mut self, loc: Location) {
        self.cell_mut(loc).mark_carved();
    }

    /// Open sides of the cell at `loc`.
    pub fn open_directions(&self, loc: Location) -> Vec<Direction> {
        self.cell(loc).paths()
    }

    /// Cells reachable from `start` through open walls, indexed row-major.
    pub fn reachable_from(&self, start: Location) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        let mut q = VecDeque::new();
        seen[self.index(start)] = true;
        q.push_back(start);
        while let Some(loc) = q.pop_front() {
            for dir in self.open_directions(loc) {
                let Some(next) = self.adjacent(loc, dir) else {
                    continue;
                };
                let idx = self.index(next);
                if !seen[idx] {
                    seen[idx] = true;
                    q.push_back(next);
                }
            }
        }
        seen
    }

    pub fn is_fully_connected(&self) -> bool {
        self.reachable_from(Location::new(0, 0)).iter().all(|r| *r)
    }

    /// Number of interior walls that are open, counting each shared wall once.
    pub fn open_wall_pairs(&self) -> usize {
        let mut count = 0;
        for cell in &self.cells {
            let loc = cell.location();
            for dir in [Direction::Bottom, Direction::Right] {
                if self.adjacent(loc, dir).is_some() && !cell.has_wall(dir) {
                    count += 1;
                }
            }
        }
        count
    }

    /// True when every shared wall agrees on both sides.
    pub fn walls_are_paired(&self) -> bool {
        self.cells.iter().all(|cell| {
            Direction::ALL.into_iter().all(|dir| {
                match self.adjacent(cell.location(), dir) {
                    Some(next) => cell.has_wall(dir) == self.cell(next).has_wall(dir.opposite()),
                    None => true,
                }
            })
        })
    }
}
