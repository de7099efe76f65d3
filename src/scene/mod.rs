//! Scene: composes one frame onto a canvas.
//!
//! The static layer (edges, nodes, labels, exits) is rasterized once at
//! construction because the graph and layout never change. Each frame then
//! blits it and draws the dynamic layer on top: trails, agent markers and
//! status text.

use crate::canvas::{Canvas, Grid, cell_of};
use crate::config::{Palette, ReplayConfig};
use crate::engine::Replay;
use crate::engine::history::{AgentId, Outcome, StepRecord};
use crate::engine::playback::{AgentStatus, AgentView, Mode, PauseCause, Snapshot};
use crate::types::{Color, Style};

const EDGE_CH: char = '·';
const NODE_CH: char = 'o';
const EXIT_CH: char = '◎';
const TRAIL_CH: char = '•';

/// Marker glyphs for eight headings, counter-clockwise from screen right.
const ARROWS: [char; 8] = ['→', '↗', '↑', '↖', '←', '↙', '↓', '↘'];

/// Longest planned route printed in the status block.
const ROUTE_PREVIEW: usize = 10;

/// Marker glyph for a heading in degrees.
pub fn arrow_for(heading: f64) -> char {
    let sector = (heading / 45.0).round().rem_euclid(8.0) as usize;
    ARROWS[sector % 8]
}

/// Short status of one agent, e.g. `Car B: Waiting (2)`.
pub fn status_line(agent: &AgentView) -> String {
    let label = agent.agent.label();
    match agent.status {
        AgentStatus::AtNode(_) => format!("{label}: At Node"),
        AgentStatus::OnEdge { .. } => format!("{label}: On Edge"),
        AgentStatus::Waiting { remaining } => format!("{label}: Waiting ({remaining})"),
    }
}

fn edge_line(agent: &AgentView) -> String {
    let label = agent.agent.label();
    match agent.status {
        AgentStatus::OnEdge { from, to } => format!("{label} Edge: ({from} -> {to})"),
        AgentStatus::Waiting { .. } => format!("{label} Edge: Waiting"),
        AgentStatus::AtNode(_) => format!("{label} Edge: ---"),
    }
}

/// Remaining planned route, from the agent's current node onwards. A path
/// that does not contain the current node is shown whole.
fn route_line(agent: AgentId, record: &StepRecord) -> Option<String> {
    let state = record.agent(agent);
    let path = &state.planned_path;
    let path = match path.iter().position(|&n| n == state.pos) {
        Some(at) => &path[at..],
        None => &path[..],
    };
    if path.is_empty() {
        return None;
    }
    let mut route = path
        .iter()
        .take(ROUTE_PREVIEW)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" → ");
    if path.len() > ROUTE_PREVIEW {
        route.push_str(" …");
    }
    Some(format!("{} Route: {route}", agent.label()))
}

pub struct Scene<'r> {
    replay: &'r Replay,
    palette: Palette,
    background: Grid,
}

impl<'r> Scene<'r> {
    pub fn new(replay: &'r Replay, config: &ReplayConfig) -> Self {
        let background = Self::static_layer(replay, config);
        Scene {
            replay,
            palette: config.palette.clone(),
            background,
        }
    }

    pub fn replay(&self) -> &'r Replay {
        self.replay
    }

    pub fn background(&self) -> &Grid {
        &self.background
    }

    fn static_layer(replay: &Replay, config: &ReplayConfig) -> Grid {
        let palette = &config.palette;
        let layout = replay.layout();
        let mut grid = Grid::new(config.width, config.height);

        let edge_style = Style::fg(palette.edge).dim();
        for (from, to, _) in replay.graph().edges() {
            if let (Some(a), Some(b)) = (layout.get(from), layout.get(to)) {
                grid.line(a, b, EDGE_CH, edge_style, true);
            }
        }

        let label_style = Style::fg(palette.label);
        for (node, at) in layout.iter() {
            let (x, y) = cell_of(at);
            grid.put(x, y, NODE_CH, Style::fg(palette.node));
            grid.text(x + 1, y, &node.to_string(), label_style);
        }

        let exit_style = Style::fg(palette.exit).bold();
        for &node in replay.exits() {
            if let Some(at) = layout.get(node) {
                let (x, y) = cell_of(at);
                grid.put(x, y, EXIT_CH, exit_style);
                grid.text(x + 1, y, &node.to_string(), exit_style);
            }
        }

        grid
    }

    fn agent_color(&self, agent: &AgentView) -> Color {
        let moving = agent.status.in_transit();
        match (agent.agent, moving) {
            (AgentId::A, false) => self.palette.agent_a,
            (AgentId::A, true) => self.palette.agent_a_moving,
            (AgentId::B, false) => self.palette.agent_b,
            (AgentId::B, true) => self.palette.agent_b_moving,
        }
    }

    fn trail_color(&self, agent: AgentId) -> Color {
        match agent {
            AgentId::A => self.palette.agent_a,
            AgentId::B => self.palette.agent_b,
        }
    }

    /// Draw one frame: background, trails, markers, status.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, snapshot: Snapshot<'_>) {
        let view = snapshot.view;
        canvas.blit(&self.background);

        for agent in AgentId::ALL {
            if snapshot.trails.drawable(agent) {
                let style = Style::fg(self.trail_color(agent));
                canvas.polyline(snapshot.trails.points(agent), TRAIL_CH, style);
            }
        }

        for agent in &view.agents {
            if agent.visible() {
                let style = Style::fg(self.agent_color(agent)).bold();
                canvas.plot(agent.position, arrow_for(agent.heading), style);
            }
        }

        self.draw_status(canvas, snapshot);
    }

    fn draw_status<C: Canvas + ?Sized>(&self, canvas: &mut C, snapshot: Snapshot<'_>) {
        let view = snapshot.view;
        let record = self.replay.history().frame(view.index);
        let text = Style::fg(self.palette.text);
        let mut y = 0;
        let mut line = |canvas: &mut C, s: &str, style: Style| {
            canvas.text(1, y, s, style);
            y += 1;
        };

        line(canvas, &format!("Step: {}", view.step), text.bold());
        for agent in &view.agents {
            line(canvas, &status_line(agent), Style::fg(self.agent_color(agent)));
            line(canvas, &format!("{} Pos: {}", agent.agent.label(), agent.node), text);
            line(canvas, &edge_line(agent), text);
            if agent.visible() {
                if let Some(route) = record.and_then(|r| route_line(agent.agent, r)) {
                    line(canvas, &route, text.dim());
                }
            }
        }

        match (view.outcome, snapshot.mode) {
            (Some(outcome), _) => {
                let color = match outcome {
                    Outcome::Caught => self.palette.caught,
                    Outcome::Escaped => self.palette.escaped,
                };
                line(canvas, outcome.banner(), Style::fg(color).bold());
            }
            (None, Mode::Paused(PauseCause::User)) => {
                line(
                    canvas,
                    "PAUSED (Space to resume, R to restart)",
                    Style::fg(self.palette.paused).bold(),
                );
            }
            _ => {}
        }

        if let Some(record) = record {
            for event in &record.log_events {
                line(canvas, &format!("» {event}"), text.dim());
            }
        }
    }
}
