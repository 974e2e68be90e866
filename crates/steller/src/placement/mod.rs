//! Initial placement strategies, keyed by diagram type.

mod grid;
mod simulation;
mod tree;

use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::graph::{DiagramType, Topology};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Single column, top to bottom.
    Flow,
    /// Single row filling the canvas width.
    Timeline,
    /// Two columns at 25% / 75% of the width.
    Comparison,
    /// Near-square uniform grid.
    ConceptGrid,
    /// Depth levels top to bottom, siblings spread under their parent.
    Hierarchical,
    /// Circular seeding refined by the phased force-directed resolver.
    Simulation,
}

impl PlacementStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Timeline => "timeline",
            Self::Comparison => "comparison",
            Self::ConceptGrid => "concept-grid",
            Self::Hierarchical => "hierarchical",
            Self::Simulation => "simulation",
        }
    }

    /// Closed-form placements: identical input always yields identical positions.
    pub fn is_deterministic_grid(self) -> bool {
        matches!(
            self,
            Self::Flow | Self::Timeline | Self::Comparison | Self::ConceptGrid
        )
    }

    pub(crate) fn for_diagram(diagram_type: DiagramType, topo: &Topology) -> Self {
        match diagram_type {
            DiagramType::Flow => Self::Flow,
            DiagramType::Tree => Self::Hierarchical,
            DiagramType::Timeline => Self::Timeline,
            DiagramType::Network => Self::Simulation,
            DiagramType::Comparison => Self::Comparison,
            DiagramType::ConceptGrid => Self::ConceptGrid,
            DiagramType::Auto => Self::infer(topo),
        }
    }

    fn infer(topo: &Topology) -> Self {
        if topo.edges.is_empty() {
            return Self::ConceptGrid;
        }
        if topo.has_cycle() {
            return Self::Simulation;
        }
        let n = topo.len();
        let max_in = (0..n).map(|v| topo.in_adj[v].len()).max().unwrap_or(0);
        let max_out = (0..n).map(|v| topo.out_adj[v].len()).max().unwrap_or(0);
        match (max_in, max_out) {
            (0..=1, 0..=1) => Self::Flow,
            (0..=1, _) => Self::Hierarchical,
            _ => Self::Simulation,
        }
    }
}

impl std::fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes initial boxes for every node. `sizes[i]` is node `i`'s `(width, height)`.
///
/// The result always lies inside the canvas; overlaps are left to the resolver.
pub(crate) fn place(
    strategy: PlacementStrategy,
    topo: &Topology,
    sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Vec<Rect> {
    let mut rects = match strategy {
        PlacementStrategy::Flow => grid::flow(&flow_order(topo), sizes, config),
        PlacementStrategy::Timeline => grid::timeline(sizes, config),
        PlacementStrategy::Comparison => grid::comparison(sizes, config),
        PlacementStrategy::ConceptGrid => grid::concept_grid(sizes, config),
        PlacementStrategy::Hierarchical => tree::hierarchical(topo, sizes, config),
        PlacementStrategy::Simulation => simulation::seed(topo, sizes, config),
    };
    for r in &mut rects {
        r.clamp_into(config.canvas_width, config.canvas_height);
    }
    rects
}

/// Topological order with the nodes of any cycle appended in input order.
fn flow_order(topo: &Topology) -> Vec<usize> {
    let mut order = topo.topological_order();
    if order.len() < topo.len() {
        let mut placed = vec![false; topo.len()];
        for &v in &order {
            placed[v] = true;
        }
        order.extend((0..topo.len()).filter(|&v| !placed[v]));
    }
    order
}

/// Deterministic lattice cell for node `idx`, used to recover from non-finite coordinates.
pub(crate) fn lattice_slot(idx: usize, count: usize, size: (f64, f64), config: &LayoutConfig) -> Rect {
    let cols = (count.max(1) as f64).sqrt().ceil() as usize;
    let rows = count.max(1).div_ceil(cols);
    let cell_w = config.canvas_width / cols as f64;
    let cell_h = config.canvas_height / rows as f64;
    let (col, row) = (idx % cols, idx / cols);
    let mut r = Rect::new(0.0, 0.0, size.0, size.1);
    r.set_center(cell_w * (col as f64 + 0.5), cell_h * (row as f64 + 0.5));
    r.clamp_into(config.canvas_width, config.canvas_height);
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Node};

    fn graph(n: usize, edges: &[(usize, usize)]) -> Graph {
        let mut g = Graph::new(DiagramType::Auto);
        for i in 0..n {
            g.add_node(Node::new(format!("v{i}")));
        }
        for &(s, t) in edges {
            g.add_edge(format!("v{s}"), format!("v{t}"));
        }
        g
    }

    #[test]
    fn auto_infers_from_structure() {
        let infer = |g: &Graph| PlacementStrategy::for_diagram(DiagramType::Auto, &Topology::new(g));
        assert_eq!(infer(&graph(3, &[])), PlacementStrategy::ConceptGrid);
        assert_eq!(infer(&graph(3, &[(0, 1), (1, 2)])), PlacementStrategy::Flow);
        assert_eq!(
            infer(&graph(4, &[(0, 1), (0, 2), (2, 3)])),
            PlacementStrategy::Hierarchical
        );
        assert_eq!(
            infer(&graph(3, &[(0, 1), (1, 2), (2, 0)])),
            PlacementStrategy::Simulation
        );
        assert_eq!(
            infer(&graph(3, &[(0, 2), (1, 2)])),
            PlacementStrategy::Simulation
        );
    }

    #[test]
    fn flow_order_appends_cycle_members() {
        let g = graph(4, &[(0, 1), (2, 3), (3, 2)]);
        assert_eq!(flow_order(&Topology::new(&g)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn every_strategy_stays_in_bounds() {
        let cfg = LayoutConfig::default();
        let g = graph(30, &[(0, 1), (1, 2), (2, 0), (3, 4)]);
        let topo = Topology::new(&g);
        let sizes = vec![(cfg.default_node_width, cfg.default_node_height); 30];
        for strategy in [
            PlacementStrategy::Flow,
            PlacementStrategy::Timeline,
            PlacementStrategy::Comparison,
            PlacementStrategy::ConceptGrid,
            PlacementStrategy::Hierarchical,
            PlacementStrategy::Simulation,
        ] {
            let rects = place(strategy, &topo, &sizes, &cfg);
            assert_eq!(rects.len(), 30);
            for r in &rects {
                assert!(
                    r.within(cfg.canvas_width, cfg.canvas_height),
                    "{strategy}: {r:?} escapes the canvas"
                );
            }
        }
    }

    #[test]
    fn lattice_slots_are_distinct() {
        let cfg = LayoutConfig::default();
        let a = lattice_slot(0, 9, (10.0, 10.0), &cfg);
        let b = lattice_slot(4, 9, (10.0, 10.0), &cfg);
        assert_ne!((a.x, a.y), (b.x, b.y));
    }
}
