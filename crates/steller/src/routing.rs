//! Edge polylines computed from final node boxes.

use crate::geometry::{Point, Rect, clip_to_border};
use crate::placement::PlacementStrategy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub source: usize,
    pub target: usize,
    pub points: Vec<Point>,
}

impl EdgeRoute {
    /// Consecutive point pairs of the polyline.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Routes every edge in input order. The style follows the placement: vertical connectors for
/// flows, orthogonal elbows for trees, horizontal connectors for timelines, border-clipped
/// straight lines otherwise.
pub fn route_edges(
    strategy: PlacementStrategy,
    rects: &[Rect],
    edges: &[(usize, usize)],
) -> Vec<EdgeRoute> {
    edges
        .iter()
        .map(|&(source, target)| {
            let (a, b) = (&rects[source], &rects[target]);
            let points = if source == target {
                self_loop(a)
            } else {
                match strategy {
                    PlacementStrategy::Flow => vertical(a, b),
                    PlacementStrategy::Hierarchical => elbow(a, b),
                    PlacementStrategy::Timeline => horizontal(a, b),
                    _ => straight(a, b),
                }
            };
            EdgeRoute {
                source,
                target,
                points,
            }
        })
        .collect()
}

fn straight(a: &Rect, b: &Rect) -> Vec<Point> {
    vec![clip_to_border(a, b.center()), clip_to_border(b, a.center())]
}

fn vertical(a: &Rect, b: &Rect) -> Vec<Point> {
    let (ca, cb) = (a.center(), b.center());
    if b.y >= a.bottom() {
        vec![Point::new(ca.x, a.bottom()), Point::new(cb.x, b.y)]
    } else if b.bottom() <= a.y {
        // Back edge: leave from the top, enter from the bottom.
        vec![Point::new(ca.x, a.y), Point::new(cb.x, b.bottom())]
    } else {
        straight(a, b)
    }
}

fn elbow(a: &Rect, b: &Rect) -> Vec<Point> {
    if b.y < a.bottom() {
        return straight(a, b);
    }
    let (ca, cb) = (a.center(), b.center());
    let mid_y = (a.bottom() + b.y) / 2.0;
    let mut points = vec![Point::new(ca.x, a.bottom()), Point::new(ca.x, mid_y)];
    if (ca.x - cb.x).abs() > 1e-9 {
        points.push(Point::new(cb.x, mid_y));
    }
    points.push(Point::new(cb.x, b.y));
    points
}

fn horizontal(a: &Rect, b: &Rect) -> Vec<Point> {
    let (ca, cb) = (a.center(), b.center());
    if b.x >= a.right() {
        vec![Point::new(a.right(), ca.y), Point::new(b.x, cb.y)]
    } else if b.right() <= a.x {
        vec![Point::new(a.x, ca.y), Point::new(b.right(), cb.y)]
    } else {
        straight(a, b)
    }
}

fn self_loop(a: &Rect) -> Vec<Point> {
    let c = a.center();
    let reach = (a.height / 2.0).min(24.0);
    let (top, bottom) = (c.y - a.height / 4.0, c.y + a.height / 4.0);
    vec![
        Point::new(a.right(), top),
        Point::new(a.right() + reach, top),
        Point::new(a.right() + reach, bottom),
        Point::new(a.right(), bottom),
    ]
}
