//! Engine: turns a step log into continuous on-screen state.
//!
//! `Replay` holds everything immutable for a run: the graph, the mapped
//! screen layout, the history with its synthesized opening frame, the
//! delay and the start nodes. `Playback` walks it frame by frame.
//!
//! The engine never deals with terminals, ANSI codes, or grids.

pub mod graph;
pub mod history;
pub mod interpolate;
pub mod layout;
pub mod playback;
pub mod trail;

#[cfg(test)]
pub(crate) mod tests;

use std::path::Path;

use tracing::info;

use crate::config::ReplayConfig;
use crate::error::{ReplayError, ReplayResult};
use graph::{Graph, LoadedGraph, NodeId};
use history::{AgentId, History, StartNodes, StepRecord};
use layout::ScreenLayout;

#[derive(Debug, Clone)]
pub struct Replay {
    graph: Graph,
    layout: ScreenLayout,
    exits: Vec<NodeId>,
    history: History,
    starts: StartNodes,
}

impl Replay {
    /// Load both input documents. Either one missing aborts the run.
    pub fn load(graph_path: &Path, history_path: &Path, config: &ReplayConfig) -> ReplayResult<Self> {
        let loaded = LoadedGraph::load(graph_path)?;
        let records = History::load(history_path)?;
        Self::new(loaded, records, config)
    }

    pub fn new(
        loaded: LoadedGraph,
        records: Vec<StepRecord>,
        config: &ReplayConfig,
    ) -> ReplayResult<Self> {
        let layout = ScreenLayout::map(&loaded.positions, config.viewport());
        let starts = StartNodes([config.start_a, config.start_b]);

        for agent in AgentId::ALL {
            let start = starts.of(agent);
            if !layout.contains(start) {
                return Err(ReplayError::unknown_node(
                    start,
                    format!("start node of {}", agent.label()),
                ));
            }
        }
        for record in &records {
            for agent in AgentId::ALL {
                let pos = record.agent(agent).pos;
                if !layout.contains(pos) {
                    return Err(ReplayError::unknown_node(
                        pos,
                        format!("{} at step {}", agent.label(), record.step),
                    ));
                }
            }
        }

        let history = History::new(records, starts, config.default_delay);
        info!(
            frames = history.len(),
            delay = history.delay(),
            "prepared replay"
        );

        Ok(Replay {
            graph: loaded.graph,
            layout,
            exits: loaded.exits,
            history,
            starts,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn exits(&self) -> &[NodeId] {
        &self.exits
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn starts(&self) -> StartNodes {
        self.starts
    }
}
