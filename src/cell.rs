use crate::direction::Direction;
use crate::grid::Location;

/// One grid position: four wall flags plus the generator's carved marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    location: Location,
    walls: [bool; 4],
    carved: bool,
}

impl Cell {
    /// A fresh cell with all four walls present.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            walls: [true; 4],
            carved: false,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn row(&self) -> usize {
        self.location.row
    }

    pub fn column(&self) -> usize {
        self.location.column
    }

    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls[dir.index()]
    }

    /// Removes the wall on one side. Removing an absent wall is a no-op.
    ///
    /// Only [`crate::grid::MazeGrid::carve_between`] should call this, so
    /// that the neighbour's matching wall goes with it.
    pub(crate) fn carve_passage(&mut self, dir: Direction) {
        self.walls[dir.index()] = false;
    }

    pub fn is_carved(&self) -> bool {
        self.carved
    }

    pub(crate) fn mark_carved(&mut self) {
        self.carved = true;
    }

    /// Sides that still have a wall.
    pub fn borders(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.has_wall(*d))
            .collect()
    }

    /// Sides that are open.
    pub fn paths(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| !self.has_wall(*d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_is_closed_and_uncarved() {
        let cell = Cell::new(Location::new(2, 3));
        assert_eq!(cell.row(), 2);
        assert_eq!(cell.column(), 3);
        assert_eq!(cell.borders().len(), 4);
        assert!(cell.paths().is_empty());
        assert!(!cell.is_carved());
    }

    #[test]
    fn carving_twice_is_harmless() {
        let mut cell = Cell::new(Location::new(0, 0));
        cell.carve_passage(Direction::Right);
        cell.carve_passage(Direction::Right);
        assert_eq!(cell.paths(), vec![Direction::Right]);
        assert_eq!(
            cell.borders(),
            vec![Direction::Top, Direction::Bottom, Direction::Left]
        );
    }
}
