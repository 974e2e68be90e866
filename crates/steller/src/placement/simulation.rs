use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::graph::Topology;
use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

/// Golden angle in radians, for sunflower seeding.
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// Walk order for seeding: BFS over undirected neighbors starting at the highest-degree node of
/// each component, so adjacent nodes start next to each other on the ring.
fn seed_order(topo: &Topology) -> Vec<usize> {
    let n = topo.len();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while let Some(start) = topo.highest_degree((0..n).filter(|&v| !seen[v])) {
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for w in topo.neighbors(v) {
                if !seen[w] {
                    seen[w] = true;
                    queue.push_back(w);
                }
            }
        }
    }
    order
}

/// Deterministic starting positions for the force-directed resolver: a ring when it has room for
/// every node, a sunflower spiral otherwise.
pub(super) fn seed(topo: &Topology, sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let n = topo.len();
    let mut rects: Vec<Rect> = sizes
        .iter()
        .map(|&(w, h)| Rect::new(0.0, 0.0, w, h))
        .collect();
    if n == 0 {
        return rects;
    }

    let (px, py, aw, ah) = config.inner_extent();
    let (cx, cy) = (px + aw / 2.0, py + ah / 2.0);
    let (max_w, max_h) = sizes
        .iter()
        .fold((0.0f64, 0.0f64), |(w, h), &(nw, nh)| (w.max(nw), h.max(nh)));
    let max_radius = ((aw - max_w).min(ah - max_h) / 2.0).max(0.0);

    let order = seed_order(topo);
    if n == 1 {
        rects[order[0]].set_center(cx, cy);
        return rects;
    }

    // A chord at least this long clears the margin whatever its direction.
    let footprint = (max_w + config.margin).hypot(max_h + config.margin) * 1.05;
    let wanted = (footprint / (2.0 * (PI / n as f64).sin())).max(config.ideal_edge_length / 2.0);
    if wanted <= max_radius {
        for (slot, &v) in order.iter().enumerate() {
            let angle = -PI / 2.0 + TAU * slot as f64 / n as f64;
            rects[v].set_center(cx + wanted * angle.cos(), cy + wanted * angle.sin());
        }
    } else {
        // Sunflower stretched to the canvas aspect ratio.
        let rx = (aw - max_w).max(0.0) / 2.0;
        let ry = (ah - max_h).max(0.0) / 2.0;
        for (slot, &v) in order.iter().enumerate() {
            let r = ((slot as f64 + 0.5) / n as f64).sqrt();
            let angle = slot as f64 * GOLDEN_ANGLE;
            rects[v].set_center(cx + rx * r * angle.cos(), cy + ry * r * angle.sin());
        }
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DiagramType, Graph, Node};
    use crate::spatial::brute_force_pairs;

    fn ring(n: usize) -> Topology {
        let mut g = Graph::new(DiagramType::Network);
        for i in 0..n {
            g.add_node(Node::new(format!("r{i}")));
        }
        for i in 0..n {
            g.add_edge(format!("r{i}"), format!("r{}", (i + 1) % n));
        }
        Topology::new(&g)
    }

    #[test]
    fn small_rings_seed_without_overlap() {
        let cfg = LayoutConfig::default();
        let t = ring(10);
        let rects = seed(&t, &vec![(cfg.default_node_width, cfg.default_node_height); 10], &cfg);
        assert!(brute_force_pairs(&rects, cfg.margin).is_empty());
    }

    #[test]
    fn seed_order_walks_neighbors_first() {
        let t = ring(6);
        let order = seed_order(&t);
        assert_eq!(order.len(), 6);
        assert_eq!(order[0], 0);
        assert!(order[1..3].contains(&1) && order[1..3].contains(&5));
    }

    #[test]
    fn large_graphs_use_the_spiral_inside_the_canvas() {
        let cfg = LayoutConfig::default();
        let t = ring(80);
        let rects = seed(&t, &vec![(cfg.default_node_width, cfg.default_node_height); 80], &cfg);
        for r in &rects {
            assert!(r.is_finite());
        }
    }
}
