//! Agent interpolator: continuous screen position and heading of an agent.

use kurbo::Point;
use tracing::debug;

use super::graph::Graph;
use super::history::AgentState;
use super::layout::ScreenLayout;
use crate::error::{ReplayError, ReplayResult};

/// Where an agent is drawn. `heading` is in degrees, counter-clockwise from
/// screen right, and only present while the agent is on an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub heading: Option<f64>,
}

/// Heading of the vector `from → to` in screen space. The y-delta is negated
/// because screen y grows downwards.
pub fn heading(from: Point, to: Point) -> f64 {
    let d = to - from;
    (-d.y).atan2(d.x).to_degrees()
}

/// Position along `from → to` after travelling `progress` out of `weight`.
/// Progress outside `[0, weight]` is clamped, not rejected.
pub fn along_edge(from: Point, to: Point, progress: f64, weight: f64) -> Point {
    let t = (progress / weight).clamp(0.0, 1.0);
    from.lerp(to, t)
}

/// Strict interpolation: any inconsistency between the agent state and the
/// graph is reported.
pub fn try_place(
    state: &AgentState,
    layout: &ScreenLayout,
    graph: &Graph,
) -> ReplayResult<Placement> {
    let parked = layout
        .get(state.pos)
        .ok_or_else(|| ReplayError::unknown_node(state.pos, "agent position"))?;
    let Some((from, to)) = state.edge() else {
        return Ok(Placement {
            position: parked,
            heading: None,
        });
    };

    let weight = graph
        .weight(from, to)
        .ok_or_else(|| ReplayError::inconsistency(format!("edge {from} -> {to} is not in the graph")))?;
    if weight.is_nan() || weight <= 0.0 {
        return Err(ReplayError::inconsistency(format!(
            "edge {from} -> {to} has non-positive weight {weight}"
        )));
    }
    let (Some(p_from), Some(p_to)) = (layout.get(from), layout.get(to)) else {
        return Err(ReplayError::inconsistency(format!(
            "edge {from} -> {to} has an endpoint without a position"
        )));
    };

    Ok(Placement {
        position: along_edge(p_from, p_to, state.progress, weight),
        heading: Some(heading(p_from, p_to)),
    })
}

/// Lenient interpolation used during playback: a data inconsistency falls
/// back to the parked position at `state.pos` with no heading.
///
/// `state.pos` must have a screen position; `Replay::new` checks this for
/// every record up front.
pub fn place(state: &AgentState, layout: &ScreenLayout, graph: &Graph) -> Placement {
    match try_place(state, layout, graph) {
        Ok(placement) => placement,
        Err(err) => {
            debug!(%err, node = state.pos, "falling back to parked position");
            Placement {
                position: layout.get(state.pos).unwrap_or(Point::ORIGIN),
                heading: None,
            }
        }
    }
}
