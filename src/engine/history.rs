//! Simulation history: the step log and the synthesized opening frame.
//!
//! The log starts after the first move has already been committed, so a
//! zeroth frame with both agents parked on their start nodes is prepended
//! before playback.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::graph::{NodeId, read_json};
use crate::error::ReplayResult;

/// One agent's state in one step record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub pos: NodeId,
    #[serde(default)]
    pub edge_from: Option<NodeId>,
    #[serde(default)]
    pub edge_to: Option<NodeId>,
    #[serde(default)]
    pub progress: f64,
    #[serde(rename = "Dijkstra_path", default)]
    pub planned_path: Vec<NodeId>,
    /// Only present on the first record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
}

impl AgentState {
    pub fn parked(node: NodeId, planned_path: Vec<NodeId>) -> Self {
        AgentState {
            pos: node,
            edge_from: None,
            edge_to: None,
            progress: 0.0,
            planned_path,
            delay: None,
        }
    }

    /// The directed edge being traversed, if both endpoints are known.
    pub fn edge(&self) -> Option<(NodeId, NodeId)> {
        self.edge_from.zip(self.edge_to)
    }

    pub fn in_transit(&self) -> bool {
        self.edge().is_some()
    }
}

/// One log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u32,
    #[serde(rename = "carA")]
    pub agent_a: AgentState,
    #[serde(rename = "carB")]
    pub agent_b: AgentState,
    #[serde(default)]
    pub caught: bool,
    #[serde(default)]
    pub reached: bool,
    #[serde(default)]
    pub log_events: Vec<String>,
}

impl StepRecord {
    pub fn agent(&self, agent: AgentId) -> &AgentState {
        match agent {
            AgentId::A => &self.agent_a,
            AgentId::B => &self.agent_b,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.caught {
            Some(Outcome::Caught)
        } else if self.reached {
            Some(Outcome::Escaped)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    A,
    B,
}

impl AgentId {
    pub const ALL: [AgentId; 2] = [AgentId::A, AgentId::B];

    pub fn index(self) -> usize {
        match self {
            AgentId::A => 0,
            AgentId::B => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentId::A => "Car A",
            AgentId::B => "Car B",
        }
    }
}

/// How a chase ended on a decisive frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Caught,
    Escaped,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::Caught => "CAUGHT!",
            Outcome::Escaped => "ESCAPED!",
        }
    }
}

/// Start nodes of both agents, indexed by `AgentId::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartNodes(pub [NodeId; 2]);

impl StartNodes {
    pub fn of(&self, agent: AgentId) -> NodeId {
        self.0[agent.index()]
    }
}

/// The step log with the synthesized frame at index 0.
#[derive(Debug, Clone)]
pub struct History {
    frames: Vec<StepRecord>,
    delay: u32,
}

impl History {
    pub fn load(path: &Path) -> ReplayResult<Vec<StepRecord>> {
        let records: Vec<StepRecord> = read_json(path)?;
        info!(path = %path.display(), records = records.len(), "loaded history");
        Ok(records)
    }

    /// Prepend the synthesized frame and resolve the delay of agent B.
    pub fn new(records: Vec<StepRecord>, starts: StartNodes, default_delay: u32) -> Self {
        let delay = records
            .first()
            .and_then(|r| r.agent_b.delay)
            .unwrap_or(default_delay);

        let opening_path = |agent: AgentId| {
            let start = starts.of(agent);
            let mut path = records
                .first()
                .map(|r| r.agent(agent).planned_path.clone())
                .unwrap_or_default();
            if path.first() != Some(&start) {
                path.insert(0, start);
            }
            path
        };

        let opening = StepRecord {
            step: 0,
            agent_a: AgentState::parked(starts.of(AgentId::A), opening_path(AgentId::A)),
            agent_b: AgentState::parked(starts.of(AgentId::B), opening_path(AgentId::B)),
            caught: false,
            reached: false,
            log_events: Vec::new(),
        };

        let mut frames = Vec::with_capacity(records.len() + 1);
        frames.push(opening);
        frames.extend(records);

        History { frames, delay }
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn frame(&self, index: usize) -> Option<&StepRecord> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[StepRecord] {
        &self.frames
    }

    /// Number of frames including the synthesized one; never zero.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn last_index(&self) -> usize {
        self.frames.len() - 1
    }

    /// Steps agent B still has to wait at `index`, or `None` once it moves.
    /// The synthesized frame is never gated.
    pub fn waiting(&self, index: usize) -> Option<u32> {
        if index == 0 {
            return None;
        }
        let step = self.frames.get(index)?.step;
        (step < self.delay).then(|| self.delay - step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STARTS: StartNodes = StartNodes([0, 49]);

    fn record(step: u32, a_path: Vec<NodeId>) -> StepRecord {
        StepRecord {
            step,
            agent_a: AgentState::parked(1, a_path),
            agent_b: AgentState::parked(49, Vec::new()),
            caught: false,
            reached: false,
            log_events: Vec::new(),
        }
    }

    #[test]
    fn parses_a_log_record() {
        let rec: StepRecord = serde_json::from_value(json!({
            "step": 1,
            "carA": { "pos": 0, "edge_from": 0, "edge_to": 1, "progress": 2.5, "Dijkstra_path": [0, 1, 4] },
            "carB": { "pos": 49, "edge_from": null, "edge_to": null, "progress": 0, "Dijkstra_path": [], "delay": 5 },
            "caught": false,
            "reached": false,
            "log_events": ["A left 0"]
        }))
        .unwrap();

        assert_eq!(rec.agent_a.edge(), Some((0, 1)));
        assert_eq!(rec.agent_a.planned_path, vec![0, 1, 4]);
        assert!(!rec.agent_b.in_transit());
        assert_eq!(rec.agent_b.delay, Some(5));
        assert_eq!(rec.log_events, vec!["A left 0".to_string()]);
    }

    #[test]
    fn half_specified_edge_is_stationary() {
        let mut state = AgentState::parked(3, Vec::new());
        state.edge_from = Some(3);
        assert!(!state.in_transit());
    }

    #[test]
    fn synthesized_frame_reinserts_start_node() {
        let history = History::new(vec![record(1, vec![1, 2, 5])], STARTS, 3);
        let opening = history.frame(0).unwrap();
        assert_eq!(opening.step, 0);
        assert_eq!(opening.agent_a.pos, 0);
        assert_eq!(opening.agent_a.planned_path, vec![0, 1, 2, 5]);
        assert_eq!(opening.agent_b.pos, 49);
        assert!(!opening.agent_a.in_transit());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn synthesized_frame_keeps_path_that_already_starts_at_start() {
        let history = History::new(vec![record(1, vec![0, 2])], STARTS, 3);
        assert_eq!(history.frame(0).unwrap().agent_a.planned_path, vec![0, 2]);
    }

    #[test]
    fn delay_comes_from_first_record_or_default() {
        let mut first = record(1, vec![]);
        first.agent_b.delay = Some(6);
        assert_eq!(History::new(vec![first], STARTS, 3).delay(), 6);
        assert_eq!(History::new(vec![record(1, vec![])], STARTS, 3).delay(), 3);
        assert_eq!(History::new(Vec::new(), STARTS, 4).delay(), 4);
    }

    #[test]
    fn empty_log_still_has_the_opening_frame() {
        let history = History::new(Vec::new(), STARTS, 3);
        assert_eq!(history.len(), 1);
        assert_eq!(history.last_index(), 0);
        assert_eq!(history.frame(0).unwrap().agent_a.planned_path, vec![0]);
    }

    #[test]
    fn waiting_counts_down_to_the_delay() {
        let records = (1..=4).map(|s| record(s, vec![])).collect();
        let history = History::new(records, STARTS, 3);
        assert_eq!(history.waiting(0), None);
        assert_eq!(history.waiting(1), Some(2));
        assert_eq!(history.waiting(2), Some(1));
        assert_eq!(history.waiting(3), None);
        assert_eq!(history.waiting(4), None);
    }

    #[test]
    fn opening_frame_is_exempt_even_with_a_zero_step_record() {
        let history = History::new(vec![record(0, vec![])], STARTS, 3);
        assert_eq!(history.waiting(0), None);
        assert_eq!(history.waiting(1), Some(3));
    }
}
