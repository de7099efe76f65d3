//! Canvas: the drawing capability the frame renderer calls into.
//!
//! Everything is character cells. Callers hand in floating point screen
//! positions; they are rounded to the nearest cell. Anything outside the
//! canvas is silently clipped.

pub mod terminal;

use kurbo::Point;

use crate::types::{Cell, CellChange, Style};

pub use terminal::TerminalCanvas;

pub trait Canvas {
    fn size(&self) -> (u16, u16);

    /// Write one cell; off-canvas coordinates are ignored.
    fn put(&mut self, x: i32, y: i32, ch: char, style: Style);

    /// Replace the whole canvas with a prepared layer.
    fn blit(&mut self, layer: &Grid);

    fn text(&mut self, x: i32, y: i32, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i as i32, y, ch, style);
        }
    }

    fn plot(&mut self, at: Point, ch: char, style: Style) {
        let (x, y) = cell_of(at);
        self.put(x, y, ch, style);
    }

    /// Straight line between two points. With `dotted`, every other cell
    /// is skipped.
    fn line(&mut self, from: Point, to: Point, ch: char, style: Style, dotted: bool) {
        for (i, (x, y)) in cells_between(cell_of(from), cell_of(to)).enumerate() {
            if !dotted || i % 2 == 0 {
                self.put(x, y, ch, style);
            }
        }
    }

    fn polyline(&mut self, points: &[Point], ch: char, style: Style) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], ch, style, false);
        }
    }
}

/// Nearest cell to a screen position.
pub fn cell_of(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Bresenham walk from `a` to `b`, both ends included.
pub fn cells_between(a: (i32, i32), b: (i32, i32)) -> impl Iterator<Item = (i32, i32)> {
    let (mut x, mut y) = a;
    let dx = (b.0 - a.0).abs();
    let dy = -(b.1 - a.1).abs();
    let sx = (b.0 - a.0).signum();
    let sy = (b.1 - a.1).signum();
    let mut err = dx + dy;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let here = (x, y);
        if here == b {
            done = true;
            return Some(here);
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        Some(here)
    })
}

/// Fixed-size cell grid; the in-memory canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![Cell::default(); width as usize]; height as usize],
        }
    }

    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Self {
        let height = cells.len() as u16;
        let width = cells.first().map_or(0, |row| row.len() as u16);
        Grid {
            width,
            height,
            cells,
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.cells.get(y as usize)?.get(x as usize)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn apply(&mut self, changes: &[CellChange]) {
        for change in changes {
            if let Some(cell) = self
                .cells
                .get_mut(change.y as usize)
                .and_then(|row| row.get_mut(change.x as usize))
            {
                *cell = change.cell;
            }
        }
    }

    /// Cell-level changes that turn `self` into `next`.
    pub fn diff(&self, next: &Grid) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in self.cells.iter().zip(next.cells.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: *next_cell,
                    });
                }
            }
        }
        changes
    }

    /// Plain text of each row, trailing blanks trimmed.
    pub fn lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>().trim_end().to_string())
            .collect()
    }
}

impl Canvas for Grid {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn put(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = self
            .cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = Cell { ch, style };
        }
    }

    fn blit(&mut self, layer: &Grid) {
        if layer.size() == self.size() {
            self.cells.clone_from(&layer.cells);
            return;
        }
        for (y, row) in layer.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                self.put(x as i32, y as i32, cell.ch, cell.style);
            }
        }
    }
}
