//! Playback state machine: cursor, run mode, trails and last headings.
//!
//! A frame is *entered* the first time it is requested: both agents are
//! placed, headings are updated and trails grow. Requesting the same frame
//! again returns the stored view untouched, so paused redraws are idempotent.

use kurbo::Point;
use tracing::debug;

use super::Replay;
use super::graph::NodeId;
use super::history::{AgentId, Outcome};
use super::interpolate::{Placement, place};
use super::trail::Trails;

const DEFAULT_HEADING: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseCause {
    /// Toggled by the operator; can be resumed.
    User,
    /// Frozen on a decisive frame; resuming has no effect.
    Decided(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Playing,
    Paused(PauseCause),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    AtNode(NodeId),
    OnEdge { from: NodeId, to: NodeId },
    /// Held back by the delay; `remaining` steps until it starts moving.
    Waiting { remaining: u32 },
}

impl AgentStatus {
    pub fn in_transit(&self) -> bool {
        matches!(self, AgentStatus::OnEdge { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub agent: AgentId,
    pub node: NodeId,
    pub position: Point,
    /// Current heading, or the last known one while parked.
    pub heading: f64,
    pub status: AgentStatus,
}

impl AgentView {
    pub fn visible(&self) -> bool {
        !matches!(self.status, AgentStatus::Waiting { .. })
    }
}

/// Everything dynamic about one entered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub index: usize,
    /// Step number as logged (0 for the synthesized frame).
    pub step: u32,
    pub agents: [AgentView; 2],
    pub outcome: Option<Outcome>,
}

impl FrameView {
    pub fn agent(&self, agent: AgentId) -> &AgentView {
        &self.agents[agent.index()]
    }
}

/// Borrowed state handed to the frame renderer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub view: &'a FrameView,
    pub trails: &'a Trails,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub struct Playback<'r> {
    replay: &'r Replay,
    cursor: usize,
    mode: Mode,
    trails: Trails,
    headings: [f64; 2],
    view: Option<FrameView>,
}

impl<'r> Playback<'r> {
    pub fn new(replay: &'r Replay) -> Self {
        Playback {
            replay,
            cursor: 0,
            mode: Mode::Playing,
            trails: Trails::default(),
            headings: [DEFAULT_HEADING; 2],
            view: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn trails(&self) -> &Trails {
        &self.trails
    }

    pub fn headings(&self) -> [f64; 2] {
        self.headings
    }

    pub fn is_playing(&self) -> bool {
        self.mode == Mode::Playing
    }

    /// The frame at the cursor, entering it if this is the first request.
    pub fn frame(&mut self) -> Snapshot<'_> {
        let view = match self.view.take() {
            Some(view) if view.index == self.cursor => view,
            _ => self.enter(self.cursor),
        };
        let view = self.view.insert(view);
        Snapshot {
            view,
            trails: &self.trails,
            mode: self.mode,
        }
    }

    /// One timer tick: while playing, move to the next frame and enter it.
    /// Returns whether the cursor moved.
    pub fn tick(&mut self) -> bool {
        self.frame();
        if self.mode != Mode::Playing || self.cursor >= self.replay.history().last_index() {
            return false;
        }
        self.cursor += 1;
        self.frame();
        true
    }

    /// Flip between playing and a user pause. Decisive pauses and the
    /// finished state are left alone.
    pub fn toggle_pause(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Playing => Mode::Paused(PauseCause::User),
            Mode::Paused(PauseCause::User) => Mode::Playing,
            other => other,
        };
        debug!(mode = ?self.mode, cursor = self.cursor, "toggled pause");
        self.mode
    }

    /// Back to the opening frame with empty trails and default headings.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.mode = Mode::Playing;
        self.trails.clear();
        self.headings = [DEFAULT_HEADING; 2];
        self.view = None;
        debug!("restarted playback");
    }

    /// Enter the next frame regardless of the run mode. The offline recorder
    /// uses this to cover every step, including those after a decisive frame.
    pub fn advance(&mut self) -> bool {
        self.frame();
        if self.cursor >= self.replay.history().last_index() {
            return false;
        }
        self.cursor += 1;
        self.frame();
        true
    }

    /// Manual single step while paused by the operator.
    pub fn step_forward(&mut self) -> bool {
        if self.mode != Mode::Paused(PauseCause::User)
            || self.cursor >= self.replay.history().last_index()
        {
            return false;
        }
        self.frame();
        self.cursor += 1;
        self.frame();
        true
    }

    /// Manual step back while stopped. Trails and headings are rebuilt by
    /// replaying from the opening frame, so they match a straight play.
    pub fn step_back(&mut self) -> bool {
        if self.mode == Mode::Playing || self.cursor == 0 {
            return false;
        }
        let target = self.cursor - 1;
        self.restart();
        for index in 0..=target {
            self.cursor = index;
            self.frame();
        }
        self.mode = Mode::Paused(PauseCause::User);
        true
    }

    fn enter(&mut self, index: usize) -> FrameView {
        let replay = self.replay;
        let history = replay.history();
        let index = index.min(history.last_index());
        let record = &history.frames()[index];

        let agents = AgentId::ALL.map(|agent| {
            let state = record.agent(agent);
            let waiting = match agent {
                AgentId::A => None,
                AgentId::B => history.waiting(index),
            };

            let (placement, status) = match waiting {
                Some(remaining) => {
                    let start = replay.starts().of(agent);
                    let placement = Placement {
                        position: replay.layout().get(start).unwrap_or(Point::ORIGIN),
                        heading: None,
                    };
                    (placement, AgentStatus::Waiting { remaining })
                }
                None => {
                    let placement = place(state, replay.layout(), replay.graph());
                    let status = match state.edge() {
                        Some((from, to)) => AgentStatus::OnEdge { from, to },
                        None => AgentStatus::AtNode(state.pos),
                    };
                    (placement, status)
                }
            };

            let slot = &mut self.headings[agent.index()];
            if let Some(heading) = placement.heading {
                *slot = heading;
            }
            if waiting.is_none() {
                self.trails.append(agent, placement.position);
            }

            AgentView {
                agent,
                node: state.pos,
                position: placement.position,
                heading: *slot,
                status,
            }
        });

        let outcome = record.outcome();
        if let Some(outcome) = outcome {
            self.mode = Mode::Paused(PauseCause::Decided(outcome));
            debug!(index, ?outcome, "decisive frame");
        } else if index == history.last_index() {
            self.mode = Mode::Finished;
            debug!(index, "reached the end of the history");
        }

        FrameView {
            index,
            step: record.step,
            agents,
            outcome,
        }
    }
}
