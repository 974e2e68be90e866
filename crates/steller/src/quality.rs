//! Layout scoring. The composite score gates acceptance and feeds the adaptation history.

use crate::config::LayoutConfig;
use crate::geometry::{Rect, bounding_box, gaps, overlap_area, segments_intersect};
use crate::routing::EdgeRoute;
use crate::spatial::overlap_pairs;
use serde::{Deserialize, Serialize};

/// Ratios and sub-scores are in `[0, 1]`; `composite_score` is in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub overlap_count: usize,
    pub overlap_area: f64,
    /// Bounding box area of all nodes over canvas area.
    pub canvas_utilization: f64,
    pub edge_crossings: usize,
    /// Smallest separation between any two boxes (the larger of the two axis gaps). `None` with
    /// fewer than two nodes.
    pub min_spacing: Option<f64>,
    pub symmetry_score: f64,
    pub readability_score: f64,
    pub composite_score: f64,
}

impl QualityMetrics {
    pub fn is_acceptable(&self, threshold: f64) -> bool {
        self.overlap_count == 0 && self.composite_score >= threshold
    }
}

pub fn assess(rects: &[Rect], routes: &[EdgeRoute], config: &LayoutConfig) -> QualityMetrics {
    let tuning = &config.tuning;
    let n = rects.len();

    let pairs = overlap_pairs(rects, config.margin, config.spatial_index_threshold);
    let overlap_area: f64 = pairs
        .iter()
        .map(|&(i, j)| overlap_area(&rects[i], &rects[j], config.margin))
        .sum();

    let canvas_area = config.canvas_width * config.canvas_height;
    let canvas_utilization = match bounding_box(rects) {
        Some(bb) if canvas_area > 0.0 => (bb.area() / canvas_area).clamp(0.0, 1.0),
        _ => 0.0,
    };

    let edge_crossings = count_crossings(routes);
    let min_spacing = min_spacing(rects);
    let symmetry_score = symmetry(rects, config);
    let readability_score = readability(edge_crossings, routes.len(), min_spacing, config.margin);

    let overlap_freedom = if n == 0 {
        1.0
    } else {
        1.0 - (pairs.len() as f64 / n as f64).min(1.0)
    };
    let target = tuning.utilization_target;
    let utilization = if target > 0.0 {
        (1.0 - (canvas_utilization - target).abs() / target).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let w = &tuning.quality_weights;
    let weight_sum = w.overlap_freedom + w.utilization + w.balance + w.readability;
    let weighted = w.overlap_freedom * overlap_freedom
        + w.utilization * utilization
        + w.balance * symmetry_score
        + w.readability * readability_score;
    let composite_score = if weight_sum > 0.0 {
        (100.0 * weighted / weight_sum).clamp(0.0, 100.0)
    } else {
        0.0
    };

    QualityMetrics {
        overlap_count: pairs.len(),
        overlap_area,
        canvas_utilization,
        edge_crossings,
        min_spacing,
        symmetry_score,
        readability_score,
        composite_score,
    }
}

/// Number of edge pairs whose polylines intersect. Edges sharing an endpoint never count.
pub fn count_crossings(routes: &[EdgeRoute]) -> usize {
    let mut crossings = 0;
    for (i, a) in routes.iter().enumerate() {
        for b in &routes[i + 1..] {
            let shared = a.source == b.source
                || a.source == b.target
                || a.target == b.source
                || a.target == b.target;
            if shared {
                continue;
            }
            let hit = a
                .segments()
                .any(|(p, q)| b.segments().any(|(r, s)| segments_intersect(p, q, r, s)));
            if hit {
                crossings += 1;
            }
        }
    }
    crossings
}

fn min_spacing(rects: &[Rect]) -> Option<f64> {
    let mut best: Option<f64> = None;
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            let (gx, gy) = gaps(a, b);
            let spacing = gx.max(gy);
            if best.is_none_or(|v| spacing < v) {
                best = Some(spacing);
            }
        }
    }
    best
}

/// 1 when the area-weighted centroid sits on the canvas center, falling to 0 at a corner.
fn symmetry(rects: &[Rect], config: &LayoutConfig) -> f64 {
    let total: f64 = rects.iter().map(Rect::area).sum();
    if total <= 0.0 {
        return 1.0;
    }
    let (sx, sy) = rects.iter().fold((0.0, 0.0), |(sx, sy), r| {
        let c = r.center();
        (sx + c.x * r.area(), sy + c.y * r.area())
    });
    let half_w = config.canvas_width / 2.0;
    let half_h = config.canvas_height / 2.0;
    let dx = (sx / total - half_w) / half_w;
    let dy = (sy / total - half_h) / half_h;
    (1.0 - ((dx * dx + dy * dy) / 2.0).sqrt()).clamp(0.0, 1.0)
}

fn readability(crossings: usize, edges: usize, min_spacing: Option<f64>, margin: f64) -> f64 {
    let crossing = 1.0 / (1.0 + crossings as f64 / edges.max(1) as f64);
    let spacing = match min_spacing {
        None => 1.0,
        Some(s) => (s / (2.0 * margin).max(1.0)).clamp(0.0, 1.0),
    };
    0.5 * crossing + 0.5 * spacing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn route(source: usize, target: usize, a: (f64, f64), b: (f64, f64)) -> EdgeRoute {
        EdgeRoute {
            source,
            target,
            points: vec![Point::new(a.0, a.1), Point::new(b.0, b.1)],
        }
    }

    #[test]
    fn empty_layout_is_acceptable() {
        let cfg = LayoutConfig::default();
        let q = assess(&[], &[], &cfg);
        assert_eq!(q.overlap_count, 0);
        assert_eq!(q.min_spacing, None);
        assert!(q.is_acceptable(cfg.quality_threshold), "{q:?}");
    }

    #[test]
    fn overlaps_are_counted_and_block_acceptance() {
        let cfg = LayoutConfig::default();
        let rects = [Rect::new(900.0, 500.0, 100.0, 50.0), Rect::new(950.0, 500.0, 100.0, 50.0)];
        let q = assess(&rects, &[], &cfg);
        assert_eq!(q.overlap_count, 1);
        assert!(q.overlap_area > 0.0);
        assert!(q.min_spacing.is_some_and(|s| s < 0.0));
        assert!(!q.is_acceptable(0.0));
    }

    #[test]
    fn crossings_skip_shared_endpoints() {
        let routes = [
            route(0, 1, (0.0, 0.0), (10.0, 10.0)),
            route(2, 3, (0.0, 10.0), (10.0, 0.0)),
            route(0, 4, (0.0, 0.0), (5.0, 0.0)),
        ];
        assert_eq!(count_crossings(&routes), 1);
    }

    #[test]
    fn centered_layout_is_balanced() {
        let cfg = LayoutConfig::default();
        let centered = [Rect::new(910.0, 510.0, 100.0, 60.0)];
        let corner = [Rect::new(0.0, 0.0, 100.0, 60.0)];
        let a = assess(&centered, &[], &cfg);
        let b = assess(&corner, &[], &cfg);
        assert!((a.symmetry_score - 1.0).abs() < 1e-9);
        assert!(b.symmetry_score < 0.2);
        assert!(a.composite_score > b.composite_score);
    }
}
