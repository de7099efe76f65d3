//! Player: replays an exported `PlayablePresentation` in the terminal.
//!
//! The artifact is treated as an immutable visual script: the player only
//! rebuilds grids from full and diff frames and pushes them to the screen.
//! It auto-advances every `interval_ms` and honours the same key bindings
//! as the live viewer.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::debug;

use crate::canvas::terminal::{TerminalCanvas, fullscreen};
use crate::canvas::{Canvas, Grid};
use crate::config::{Command, KeyBindings};
use crate::menubar::{render_menubar, render_status};
use crate::types::{Frame, PlayablePresentation};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

pub struct Player {
    presentation: PlayablePresentation,
    keys: KeyBindings,
    current_frame: usize,
    grid: Grid,
    paused: bool,
}

impl Player {
    pub fn new(presentation: PlayablePresentation, keys: KeyBindings) -> Self {
        let grid = Grid::new(presentation.contract.width, presentation.contract.height);
        let mut player = Player {
            presentation,
            keys,
            current_frame: 0,
            grid,
            paused: false,
        };
        player.rebuild_grid(0);
        player
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn last_frame(&self) -> usize {
        self.presentation.frames.len().saturating_sub(1)
    }

    /// Play the presentation in the terminal.
    pub fn play(&mut self) -> Result<()> {
        let contract = self.presentation.contract;
        fullscreen(contract.width, contract.height, |stdout| self.run_loop(stdout))
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let contract = self.presentation.contract;
        let interval = Duration::from_millis(self.presentation.interval_ms.max(1));
        let mut canvas = TerminalCanvas::new(stdout.lock(), contract.width, contract.height, CANVAS_OFFSET);

        render_menubar(canvas.writer(), &self.keys)?;
        self.render(&mut canvas)?;
        let mut next_tick = Instant::now() + interval;

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let Some(command) = self.keys.command(&key) else {
                            continue;
                        };
                        if !self.handle(command) {
                            break;
                        }
                        if command == Command::Restart {
                            next_tick = Instant::now() + interval;
                        }
                        self.render(&mut canvas)?;
                    }
                    Event::Resize(_, _) => {
                        render_menubar(canvas.writer(), &self.keys)?;
                        canvas.invalidate();
                        self.render(&mut canvas)?;
                    }
                    _ => {}
                }
                continue;
            }

            if self.advance() {
                self.render(&mut canvas)?;
            }
            next_tick = Instant::now() + interval;
        }

        Ok(())
    }

    /// Apply one operator command. Returns `false` when the player should quit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::TogglePause => self.paused = !self.paused,
            Command::Restart => {
                self.rebuild_grid(0);
                self.paused = false;
            }
            Command::StepForward if self.paused => {
                if self.current_frame < self.last_frame() {
                    self.apply_frame(self.current_frame + 1);
                }
            }
            Command::StepBack if self.paused => {
                if self.current_frame > 0 {
                    self.rebuild_grid(self.current_frame - 1);
                }
            }
            Command::StepForward | Command::StepBack => {}
        }
        debug!(frame = self.current_frame, paused = self.paused, ?command, "player command");
        true
    }

    /// Timer tick: move to the next frame unless paused or at the end.
    pub fn advance(&mut self) -> bool {
        if self.paused || self.current_frame >= self.last_frame() {
            return false;
        }
        self.apply_frame(self.current_frame + 1);
        true
    }

    // -----------------------------------------------------------------------
    // Grid management
    // -----------------------------------------------------------------------

    fn apply_frame(&mut self, index: usize) {
        match self.presentation.frames.get(index) {
            Some(Frame::Full { cells }) => self.grid = Grid::from_cells(cells.clone()),
            Some(Frame::Diff { changes }) => self.grid.apply(changes),
            None => return,
        }
        self.current_frame = index;
    }

    fn rebuild_grid(&mut self, target: usize) {
        let contract = self.presentation.contract;
        self.grid = Grid::new(contract.width, contract.height);
        for index in 0..=target.min(self.last_frame()) {
            self.apply_frame(index);
        }
        self.current_frame = target.min(self.last_frame());
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    /// Status bar text: frame counter, run state and markers on this frame.
    pub fn status(&self) -> String {
        let total = self.presentation.frames.len();
        let state = if self.paused {
            "paused"
        } else if self.current_frame >= self.last_frame() {
            "end"
        } else {
            "playing"
        };
        let mut status = format!(" Frame {}/{} | {state}", self.current_frame + 1, total);
        for marker in self.presentation.markers_at(self.current_frame) {
            status.push_str(" | ");
            status.push_str(&marker.label);
        }
        status
    }

    fn render<W: Write>(&self, canvas: &mut TerminalCanvas<W>) -> Result<()> {
        canvas.blit(&self.grid);
        canvas.present()?;
        let status_y = self.presentation.contract.height + CANVAS_OFFSET;
        render_status(canvas.writer(), status_y, &self.status())
    }
}
