//! Viewer: live interactive playback of a loaded replay.
//!
//! Owns the terminal loop: every `tick_ms` the playback advances one
//! frame; key presses pause, restart, step or quit. Drawing goes through
//! the `Scene` into a `TerminalCanvas`, which only flushes changed cells,
//! so redrawing a paused frame costs nothing on screen.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::canvas::terminal::{TerminalCanvas, fullscreen};
use crate::config::{Command, KeyBindings};
use crate::engine::Replay;
use crate::engine::playback::{Mode, PauseCause, Playback};
use crate::menubar::{render_menubar, render_status};
use crate::scene::Scene;

const CANVAS_OFFSET: u16 = 1;

pub struct Viewer<'r> {
    scene: Scene<'r>,
    playback: Playback<'r>,
    keys: KeyBindings,
    tick: Duration,
}

impl<'r> Viewer<'r> {
    pub fn new(replay: &'r Replay, scene: Scene<'r>, keys: KeyBindings, tick_ms: u64) -> Self {
        Viewer {
            scene,
            playback: Playback::new(replay),
            keys,
            tick: Duration::from_millis(tick_ms.max(1)),
        }
    }

    pub fn playback(&self) -> &Playback<'r> {
        &self.playback
    }

    /// Run until the operator quits. The terminal is restored on exit.
    pub fn run(&mut self) -> Result<()> {
        let (width, height) = self.scene.background().size();
        fullscreen(width, height, |stdout| self.run_loop(stdout))
    }

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let (width, height) = self.scene.background().size();
        let mut canvas = TerminalCanvas::new(stdout.lock(), width, height, CANVAS_OFFSET);

        render_menubar(canvas.writer(), &self.keys)?;
        self.draw(&mut canvas)?;
        let mut next_tick = Instant::now() + self.tick;

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
                            next_tick = Instant::now() + self.tick;
                        }
                        self.draw(&mut canvas)?;
                    }
                    Event::Resize(_, _) => {
                        render_menubar(canvas.writer(), &self.keys)?;
                        canvas.invalidate();
                        self.draw(&mut canvas)?;
                    }
                    _ => {}
                }
                continue;
            }

            self.playback.tick();
            self.draw(&mut canvas)?;
            next_tick = Instant::now() + self.tick;
        }

        info!(cursor = self.playback.cursor(), "viewer closed");
        Ok(())
    }

    /// Apply one operator command. Returns `false` on quit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::TogglePause => {
                self.playback.toggle_pause();
            }
            Command::Restart => self.playback.restart(),
            Command::StepForward => {
                self.playback.step_forward();
            }
            Command::StepBack => {
                self.playback.step_back();
            }
        }
        debug!(?command, cursor = self.playback.cursor(), mode = ?self.playback.mode(), "viewer command");
        true
    }

    /// Status bar below the canvas.
    pub fn status(&self) -> String {
        let total = self.playback_len();
        let state = match self.playback.mode() {
            Mode::Playing => "playing".to_string(),
            Mode::Paused(PauseCause::User) => "paused".to_string(),
            Mode::Paused(PauseCause::Decided(outcome)) => outcome.banner().to_string(),
            Mode::Finished => "end".to_string(),
        };
        format!(" Frame {}/{} | {state}", self.playback.cursor() + 1, total)
    }

    fn playback_len(&self) -> usize {
        self.scene.replay().history().len()
    }

    fn draw<W: Write>(&mut self, canvas: &mut TerminalCanvas<W>) -> Result<()> {
        let snapshot = self.playback.frame();
        self.scene.draw(canvas, snapshot);
        canvas.present()?;
        let (_, height) = self.scene.background().size();
        let status = self.status();
        render_status(canvas.writer(), height + CANVAS_OFFSET, &status)
    }
}
