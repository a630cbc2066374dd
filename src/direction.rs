/// One side of a maze cell.
///
/// `Top` points towards row 0, `Left` towards column 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Grid offset as `(row, column)`.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Top => (-1, 0),
            Direction::Bottom => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Direction::Top => 0,
            Direction::Bottom => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn opposite_offsets_cancel() {
        for dir in Direction::ALL {
            let (dr, dc) = dir.offset();
            let (or, oc) = dir.opposite().offset();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 4];
        for dir in Direction::ALL {
            assert!(!seen[dir.index()]);
            seen[dir.index()] = true;
        }
    }
}
