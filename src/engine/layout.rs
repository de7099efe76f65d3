//! Coordinate mapper: rescales layout coordinates onto the canvas.
//!
//! Layout space has "up" as increasing y; the canvas grows downwards, so the
//! vertical axis is flipped. Computed once, immutable afterwards.

use std::collections::BTreeMap;

use kurbo::Point;

use super::graph::NodeId;

/// Output geometry for the mapping, in canvas cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

/// Linear map of `val` from `[min_val, max_val]` onto `[min_out, max_out]`.
/// A degenerate input range maps everything to `min_out`.
fn scale(val: f64, min_val: f64, max_val: f64, min_out: f64, max_out: f64) -> f64 {
    if max_val == min_val {
        return min_out;
    }
    (val - min_val) * (max_out - min_out) / (max_val - min_val) + min_out
}

/// Node id → screen position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenLayout {
    points: BTreeMap<NodeId, Point>,
}

impl ScreenLayout {
    pub fn map(positions: &BTreeMap<NodeId, [f64; 2]>, viewport: Viewport) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in positions.values() {
            for axis in 0..2 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let Viewport {
            width,
            height,
            padding,
        } = viewport;
        let points = positions
            .iter()
            .map(|(&node, &[x, y])| {
                let sx = scale(x, min[0], max[0], padding, width - padding);
                let sy = scale(y, min[1], max[1], height - padding, padding);
                (node, Point::new(sx, sy))
            })
            .collect();

        ScreenLayout { points }
    }

    pub fn get(&self, node: NodeId) -> Option<Point> {
        self.points.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.points.contains_key(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.points.iter().map(|(&n, &p)| (n, p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 100.0,
        height: 50.0,
        padding: 5.0,
    };

    fn positions(list: &[(NodeId, [f64; 2])]) -> BTreeMap<NodeId, [f64; 2]> {
        list.iter().copied().collect()
    }

    #[test]
    fn extremes_land_on_padded_bounds_with_flipped_y() {
        let layout = ScreenLayout::map(
            &positions(&[(0, [-3.0, 10.0]), (1, [7.0, 20.0]), (2, [2.0, 15.0])]),
            VIEW,
        );
        assert_eq!(layout.get(0), Some(Point::new(5.0, 45.0)));
        assert_eq!(layout.get(1), Some(Point::new(95.0, 5.0)));
        assert_eq!(layout.get(2), Some(Point::new(50.0, 25.0)));
    }

    #[test]
    fn degenerate_axis_maps_to_minimum_output() {
        let layout = ScreenLayout::map(&positions(&[(0, [1.0, 4.0]), (1, [1.0, 8.0])]), VIEW);
        assert_eq!(layout.get(0).unwrap().x, 5.0);
        assert_eq!(layout.get(1).unwrap().x, 5.0);

        let single = ScreenLayout::map(&positions(&[(3, [2.0, 2.0])]), VIEW);
        assert_eq!(single.get(3), Some(Point::new(5.0, 45.0)));
    }

    #[test]
    fn mapping_is_monotonic() {
        let raw: Vec<(NodeId, [f64; 2])> = (0..20)
            .map(|i| {
                let f = i as f64;
                (i, [f * 1.7 - 4.0, (f * 0.9).sin() * 10.0])
            })
            .collect();
        let layout = ScreenLayout::map(&positions(&raw), VIEW);

        for &(a, pa) in &raw {
            for &(b, pb) in &raw {
                let (sa, sb) = (layout.get(a).unwrap(), layout.get(b).unwrap());
                if pa[0] < pb[0] {
                    assert!(sa.x <= sb.x);
                }
                if pa[1] < pb[1] {
                    assert!(sa.y >= sb.y);
                }
            }
        }
    }

    #[test]
    fn empty_layout_is_empty() {
        let layout = ScreenLayout::map(&BTreeMap::new(), VIEW);
        assert!(layout.is_empty());
        assert_eq!(layout.get(0), None);
    }
}
