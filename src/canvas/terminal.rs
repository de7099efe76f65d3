//! Terminal canvas: draws into a back buffer and flushes only the cells
//! that changed since the last present.

use std::io::{self, Write};

use anyhow::{Result, bail};
use crossterm::{cursor, execute, queue, style, terminal};

use super::{Canvas, Grid};
use crate::error::ReplayError;
use crate::types::{Cell, Color, NamedColor, Style};

pub struct TerminalCanvas<W: Write> {
    out: W,
    /// Rows reserved above the canvas (menu bar).
    offset_y: u16,
    back: Grid,
    front: Option<Grid>,
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, width: u16, height: u16, offset_y: u16) -> Self {
        TerminalCanvas {
            out,
            offset_y,
            back: Grid::new(width, height),
            front: None,
        }
    }

    /// Forget what is on screen so the next present repaints everything.
    pub fn invalidate(&mut self) {
        self.front = None;
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Push the back buffer to the terminal.
    pub fn present(&mut self) -> Result<()> {
        match &self.front {
            Some(front) => {
                for change in front.diff(&self.back) {
                    print_cell(&mut self.out, change.x, change.y + self.offset_y, &change.cell)?;
                }
            }
            None => {
                for (y, row) in self.back.rows().iter().enumerate() {
                    queue!(self.out, cursor::MoveTo(0, y as u16 + self.offset_y))?;
                    for cell in row {
                        let cs = to_content_style(&cell.style);
                        queue!(
                            self.out,
                            style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                        )?;
                    }
                }
            }
        }
        self.out.flush()?;
        self.front = Some(self.back.clone());
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn size(&self) -> (u16, u16) {
        self.back.size()
    }

    fn put(&mut self, x: i32, y: i32, ch: char, style: Style) {
        self.back.put(x, y, ch, style);
    }

    fn blit(&mut self, layer: &Grid) {
        self.back.blit(layer);
    }
}

/// Run `body` on the alternate screen in raw mode, restoring the terminal
/// on exit (even on error). The terminal must fit the canvas plus a menu
/// row and a status row.
pub fn fullscreen<T>(
    need_w: u16,
    need_h: u16,
    body: impl FnOnce(&mut io::Stdout) -> Result<T>,
) -> Result<T> {
    let (term_w, term_h) = terminal::size().map_err(ReplayError::Terminal)?;
    if term_w < need_w || term_h < need_h + 2 {
        bail!(
            "Terminal too small: need {}x{}, have {}x{}",
            need_w,
            need_h + 2,
            term_w,
            term_h,
        );
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(terminal::ClearType::All),
    )?;

    let result = body(&mut stdout);

    // Always restore terminal state.
    let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

pub(crate) fn print_cell<W: Write>(out: &mut W, x: u16, y: u16, cell: &Cell) -> Result<()> {
    let cs = to_content_style(&cell.style);
    queue!(
        out,
        cursor::MoveTo(x, y),
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch)),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
