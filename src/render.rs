use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use honeymaze::runner::Sprite;
use honeymaze::world::Drawable;

/// Terminal columns per raster cell.
pub const CELL_W: usize = 2;
/// Playable-area pixels covered by one raster cell along each axis.
pub const PX_PER_CELL: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Glyph {
    Empty,
    Wall,
    Player(u8),
    Agent,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Glyph {
    fn cell(self) -> Cell {
        let color = match self {
            Glyph::Empty => Color::Reset,
            Glyph::Wall => Color::DarkYellow,
            Glyph::Player(0) => Color::Yellow,
            Glyph::Player(_) => Color::Magenta,
            Glyph::Agent => Color::Red,
            Glyph::Target => Color::Green,
        };
        Cell { glyph: self, color }
    }

    fn text(self) -> &'static str {
        match self {
            Glyph::Empty => "  ",
            Glyph::Wall => "██",
            Glyph::Player(0) => "🐻",
            Glyph::Player(_) => "🐷",
            Glyph::Agent => "🐝",
            Glyph::Target => "🍯",
        }
    }
}

fn glyph_for(sprite: Sprite) -> Glyph {
    match sprite {
        Sprite::Border => Glyph::Wall,
        Sprite::Player(index) => Glyph::Player(index),
        Sprite::Agent => Glyph::Agent,
        Sprite::Target => Glyph::Target,
    }
}

/// Rasterises the draw list onto a `width x height` character grid.
///
/// Borders fill every raster cell they touch. Other sprites occupy the
/// single cell holding their centre, later drawables on top.
pub fn raster(width: usize, height: usize, drawables: &[Drawable]) -> Vec<Cell> {
    let mut cells = vec![Glyph::Empty.cell(); width * height];
    for d in drawables {
        let glyph = glyph_for(d.sprite);
        if d.sprite == Sprite::Border {
            if d.rect.is_empty() {
                continue;
            }
            let (x0, x1) = span(d.rect.x, d.rect.right(), width);
            let (y0, y1) = span(d.rect.y, d.rect.bottom(), height);
            for y in y0..y1 {
                for x in x0..x1 {
                    cells[y * width + x] = glyph.cell();
                }
            }
        } else {
            let c = d.rect.center();
            if !(c.x.is_finite() && c.y.is_finite()) || c.x < 0.0 || c.y < 0.0 {
                continue;
            }
            let (x, y) = ((c.x / PX_PER_CELL) as usize, (c.y / PX_PER_CELL) as usize);
            if x < width && y < height {
                cells[y * width + x] = glyph.cell();
            }
        }
    }
    cells
}

fn span(start: f32, end: f32, limit: usize) -> (usize, usize) {
    let first = (start / PX_PER_CELL).floor().max(0.0) as usize;
    let last = ((end / PX_PER_CELL).ceil().max(0.0) as usize).min(limit);
    (first.min(last), last)
}

/// Diffing terminal renderer: only cells that changed since the previous
/// frame are redrawn.
pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![Glyph::Empty.cell(); width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render(
        &mut self,
        stdout: &mut Stdout,
        drawables: &[Drawable],
        hud: &str,
    ) -> io::Result<()> {
        let needed_h = (self.height + 1) as u16;
        let needed_w = (self.width * CELL_W) as u16;

        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if self.width == 0 || self.height == 0 || term_w < needed_w || term_h < needed_h {
            if !self.needs_full {
                stdout.queue(Clear(ClearType::All))?;
            }
            let msg = format!(
                "Terminal too small for the maze. Current: {}x{} (q to quit).",
                term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud.to_string();
        }

        let cells = raster(self.width, self.height, drawables);
        for (idx, cell) in cells.into_iter().enumerate() {
            if self.needs_full || cell != self.last[idx] {
                self.last[idx] = cell;
                self.draw_cell(stdout, idx % self.width, idx / self.width, cell)?;
            }
        }
        self.needs_full = false;

        stdout.flush()?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = cell.glyph.text();
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                stdout.queue(Print(' '))?;
            }
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeymaze::geometry::Rect;

    fn drawable(sprite: Sprite, rect: Rect) -> Drawable {
        Drawable { rect, sprite }
    }

    #[test]
    fn borders_fill_touched_cells() {
        let cells = raster(4, 2, &[drawable(Sprite::Border, Rect::new(0.0, 14.0, 64.0, 3.0))]);
        for x in 0..4 {
            assert_eq!(cells[x].glyph, Glyph::Wall);
            assert_eq!(cells[4 + x].glyph, Glyph::Wall);
        }
    }

    #[test]
    fn sprites_land_on_their_center() {
        let drawables = [
            drawable(Sprite::Border, Rect::new(0.0, 0.0, 64.0, 2.0)),
            drawable(Sprite::Target, Rect::new(30.0, 18.0, 10.0, 10.0)),
            drawable(Sprite::Player(0), Rect::new(0.0, 0.0, 14.0, 14.0)),
        ];
        let cells = raster(4, 2, &drawables);
        assert_eq!(cells[0].glyph, Glyph::Player(0));
        assert_eq!(cells[1].glyph, Glyph::Wall);
        assert_eq!(cells[4 + 2].glyph, Glyph::Target);
        assert_eq!(cells[4 + 3].glyph, Glyph::Empty);
    }

    #[test]
    fn empty_and_offscreen_drawables_are_skipped() {
        let drawables = [
            drawable(Sprite::Border, Rect::new(0.0, 0.0, 0.0, 0.0)),
            drawable(Sprite::Agent, Rect::new(500.0, 500.0, 10.0, 10.0)),
        ];
        assert!(raster(2, 2, &drawables).iter().all(|c| c.glyph == Glyph::Empty));
    }

    #[test]
    fn every_glyph_fills_its_columns() {
        let glyphs = [
            Glyph::Empty,
            Glyph::Wall,
            Glyph::Player(0),
            Glyph::Player(1),
            Glyph::Agent,
            Glyph::Target,
        ];
        for glyph in glyphs {
            assert!(UnicodeWidthStr::width(glyph.text()) <= CELL_W);
        }
    }
}
