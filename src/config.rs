//! Replay configuration: canvas geometry, timing, palette and key bindings.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::graph::NodeId;
use crate::engine::layout::Viewport;
use crate::error::{ReplayError, ReplayResult};
use crate::types::{Color, NamedColor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Canvas width in terminal cells.
    pub width: u16,
    /// Canvas height in terminal cells.
    pub height: u16,
    pub padding: u16,
    /// Time between frames, for the live viewer and exported artifacts.
    pub tick_ms: u64,
    pub start_a: NodeId,
    pub start_b: NodeId,
    /// Delay of agent B when the history does not carry one.
    pub default_delay: u32,
    pub palette: Palette,
    pub key_bindings: KeyBindings,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            width: 120,
            height: 40,
            padding: 3,
            tick_ms: 500,
            start_a: 0,
            start_b: 49,
            default_delay: 3,
            palette: Palette::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub edge: Color,
    pub node: Color,
    pub label: Color,
    pub exit: Color,
    pub agent_a: Color,
    pub agent_a_moving: Color,
    pub agent_b: Color,
    pub agent_b_moving: Color,
    pub text: Color,
    pub caught: Color,
    pub escaped: Color,
    pub paused: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            edge: Color::rgb(110, 110, 110),
            node: Color::Named(NamedColor::White),
            label: Color::rgb(170, 170, 170),
            exit: Color::rgb(0, 200, 0),
            agent_a: Color::rgb(255, 0, 0),
            agent_a_moving: Color::rgb(255, 150, 150),
            agent_b: Color::rgb(40, 90, 255),
            agent_b_moving: Color::rgb(150, 150, 255),
            text: Color::Named(NamedColor::White),
            caught: Color::rgb(255, 0, 0),
            escaped: Color::rgb(0, 200, 0),
            paused: Color::Named(NamedColor::Yellow),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub pause: String,
    pub restart: String,
    pub quit: String,
    pub step_forward: String,
    pub step_back: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            pause: "Space".into(),
            restart: "r".into(),
            quit: "q".into(),
            step_forward: "Right".into(),
            step_back: "Left".into(),
        }
    }
}

impl ReplayConfig {
    /// Load the config. An explicit path must exist and parse; the default
    /// location is optional and falls back to defaults when broken.
    pub fn load(path: Option<&Path>) -> ReplayResult<Self> {
        if let Some(path) = path {
            let json = std::fs::read_to_string(path).map_err(|e| ReplayError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            return serde_json::from_str(&json).map_err(|e| ReplayError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }

        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    debug!(path = %config_path.display(), "loaded config");
                    Ok(config)
                }
                Err(e) => {
                    warn!(path = %config_path.display(), "invalid config ({e}), using defaults");
                    Ok(Self::default())
                }
            },
            Err(_) => Ok(Self::default()),
        }
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("chase-replay");
        path.push("config.json");
        path
    }

    pub fn validate(&self) -> ReplayResult<()> {
        let invalid = |message: String| ReplayError::Config {
            path: PathBuf::from("<resolved>"),
            message,
        };
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms must be positive".into()));
        }
        if self.width <= 2 * self.padding || self.height <= 2 * self.padding {
            return Err(invalid(format!(
                "canvas {}x{} leaves no room inside padding {}",
                self.width, self.height, self.padding
            )));
        }
        Ok(())
    }

    /// Target area for the coordinate mapper.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: f64::from(self.width),
            height: f64::from(self.height),
            padding: f64::from(self.padding),
        }
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(ch) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return match ch.chars().next() {
            Some(c) => event.code == KeyCode::Char(c),
            None => false,
        };
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Home" => event.code == KeyCode::Home,
        "End" => event.code == KeyCode::End,
        s => {
            if let Some(rest) = s.strip_prefix('F') {
                if let Ok(n) = rest.parse::<u8>() {
                    return event.code == KeyCode::F(n);
                }
            }
            match s.chars().next() {
                // Letters match either case so caps lock does not get in the way.
                Some(c) => match event.code {
                    KeyCode::Char(pressed) => pressed.eq_ignore_ascii_case(&c),
                    _ => false,
                },
                None => false,
            }
        }
    }
}

/// User intent decoded from a key press, shared by the viewer and player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Restart,
    Quit,
    StepForward,
    StepBack,
}

impl KeyBindings {
    pub fn command(&self, event: &KeyEvent) -> Option<Command> {
        if event.code == KeyCode::Esc
            || (event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Some(Command::Quit);
        }
        [
            (&self.pause, Command::TogglePause),
            (&self.restart, Command::Restart),
            (&self.quit, Command::Quit),
            (&self.step_forward, Command::StepForward),
            (&self.step_back, Command::StepBack),
        ]
        .into_iter()
        .find(|(binding, _)| matches_binding(binding, event))
        .map(|(_, command)| command)
    }
}
