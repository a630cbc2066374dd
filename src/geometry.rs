//! Grid-to-pixel geometry.
//!
//! [`Geometry`] is a pure function of the grid dimensions and the playable
//! area size. [`MazeLayout`] materialises it into one thin border strip per
//! present wall, and is rebuilt from scratch whenever the area changes.

use tracing::debug;

use crate::direction::Direction;
use crate::grid::{Location, MazeGrid};
use crate::mask::{Mask, Shape};

/// Default border thickness as a fraction of the cell width.
pub const DEFAULT_BORDER_FACTOR: f32 = 0.05;

/// A 2D point or displacement in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height of a pixel region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    pub fn scaled(&self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Vec2, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_degenerate()
    }

    /// Strict overlap test; touching edges and empty rectangles do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Cell-to-pixel conversion for one grid shape and one playable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    rows: usize,
    columns: usize,
    area: Size,
    border_factor: f32,
}

impl Geometry {
    pub fn new(rows: usize, columns: usize, area: Size, border_factor: f32) -> Self {
        Self {
            rows,
            columns,
            area,
            border_factor,
        }
    }

    pub fn area(&self) -> Size {
        self.area
    }

    pub fn border_factor(&self) -> f32 {
        self.border_factor
    }

    pub fn cell_size(&self) -> Size {
        Size::new(
            self.area.width / self.columns as f32,
            self.area.height / self.rows as f32,
        )
    }

    pub fn border_thickness(&self) -> f32 {
        self.border_factor * self.cell_size().width
    }

    pub fn cell_rect(&self, loc: Location) -> Rect {
        let cell = self.cell_size();
        Rect::new(
            loc.column as f32 * cell.width,
            loc.row as f32 * cell.height,
            cell.width,
            cell.height,
        )
    }

    pub fn cell_center(&self, loc: Location) -> Vec2 {
        self.cell_rect(loc).center()
    }

    /// Strip along one edge of the cell at `loc`.
    pub fn border_rect(&self, loc: Location, side: Direction) -> Rect {
        let cell = self.cell_rect(loc);
        let t = self.border_thickness();
        match side {
            Direction::Top => Rect::new(cell.x, cell.y, cell.width, t),
            Direction::Bottom => Rect::new(cell.x, cell.bottom() - t, cell.width, t),
            Direction::Left => Rect::new(cell.x, cell.y, t, cell.height),
            Direction::Right => Rect::new(cell.right() - t, cell.y, t, cell.height),
        }
    }

    /// Cell containing pixel `p`, clamped to the grid. `None` while the
    /// area is degenerate.
    pub fn cell_at(&self, p: Vec2) -> Option<Location> {
        if self.area.is_degenerate() || !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let cell = self.cell_size();
        let column = (p.x / cell.width).floor().max(0.0) as usize;
        let row = (p.y / cell.height).floor().max(0.0) as usize;
        Some(Location::new(
            row.min(self.rows - 1),
            column.min(self.columns - 1),
        ))
    }
}

/// One present wall of one cell. The owning cell is referenced by location.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub cell: Location,
    pub side: Direction,
    pub rect: Rect,
    pub mask: Mask,
}

/// Materialised border strips for the current playable area.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeLayout {
    geometry: Geometry,
    borders: Vec<Border>,
}

impl MazeLayout {
    pub fn new(grid: &MazeGrid, area: Size, border_factor: f32) -> Self {
        let mut layout = Self {
            geometry: Geometry::new(grid.rows(), grid.columns(), area, border_factor),
            borders: Vec::new(),
        };
        layout.recompute(grid, area);
        layout
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn borders(&self) -> &[Border] {
        &self.borders
    }

    /// Rebuilds every cell's border strips for `area`.
    ///
    /// Only walls present in `grid` are materialised, so strips for walls
    /// removed since the last call are dropped. Returns the number dropped.
    pub fn recompute(&mut self, grid: &MazeGrid, area: Size) -> usize {
        let border_factor = self.geometry.border_factor;
        self.geometry = Geometry::new(grid.rows(), grid.columns(), area, border_factor);
        let previous = std::mem::take(&mut self.borders);

        for cell in grid.cells() {
            for side in cell.borders() {
                let rect = self.geometry.border_rect(cell.location(), side);
                let mask = Mask::for_shape(Shape::Filled, rect.width, rect.height);
                self.borders.push(Border {
                    cell: cell.location(),
                    side,
                    rect,
                    mask,
                });
            }
        }

        let dropped = previous
            .iter()
            .filter(|b| !grid.cell(b.cell).has_wall(b.side))
            .count();
        let cell = self.geometry.cell_size();
        debug!(
            width = area.width,
            height = area.height,
            cell_width = cell.width,
            cell_height = cell.height,
            borders = self.borders.len(),
            dropped,
            "maze layout recomputed"
        );
        dropped
    }
}
