//! Trail accumulator: visited screen positions per agent.

use kurbo::Point;

use super::history::AgentId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trails {
    points: [Vec<Point>; 2],
}

impl Trails {
    /// Append unless `position` repeats the agent's last point.
    pub fn append(&mut self, agent: AgentId, position: Point) {
        let trail = &mut self.points[agent.index()];
        if trail.last() != Some(&position) {
            trail.push(position);
        }
    }

    pub fn points(&self, agent: AgentId) -> &[Point] {
        &self.points[agent.index()]
    }

    /// Whether the trail is long enough to draw as a polyline.
    pub fn drawable(&self, agent: AgentId) -> bool {
        self.points(agent).len() >= 2
    }

    pub fn clear(&mut self) {
        for trail in &mut self.points {
            trail.clear();
        }
    }
}
