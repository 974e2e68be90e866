//! Structural complexity scoring used to pick how hard the resolver works.

use crate::config::{LayoutConfig, TuningConfig};
use crate::geometry::{Rect, bounding_box};
use crate::graph::Graph;
use crate::resolve::ResolutionStrategy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexityCategory {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::VeryComplex => "very-complex",
        }
    }

    pub fn from_score(score: f64, tuning: &TuningConfig) -> Self {
        if score >= tuning.very_complex_threshold {
            Self::VeryComplex
        } else if score >= tuning.complex_threshold {
            Self::Complex
        } else if score >= tuning.moderate_threshold {
            Self::Moderate
        } else {
            Self::Simple
        }
    }

    /// Default resolution strategy for the category.
    pub fn default_strategy(self) -> ResolutionStrategy {
        match self {
            Self::Simple => ResolutionStrategy::GridSnap,
            Self::Moderate => ResolutionStrategy::ForceDirected,
            Self::Complex | Self::VeryComplex => ResolutionStrategy::Adaptive,
        }
    }

    /// Fraction of `max_iterations` the resolver may use.
    pub fn effort(self, tuning: &TuningConfig) -> f64 {
        let e = match self {
            Self::Simple => tuning.simple_effort,
            Self::Moderate => tuning.moderate_effort,
            Self::Complex => tuning.complex_effort,
            Self::VeryComplex => tuning.very_complex_effort,
        };
        e.clamp(0.0, 1.0)
    }
}

impl std::fmt::Display for ComplexityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual factors, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexityFactors {
    pub node_count: f64,
    pub edge_density: f64,
    pub overlap_severity: f64,
    pub spatial_spread: f64,
    pub size_variance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub factors: ComplexityFactors,
    /// Weighted total in `[0, 100]`.
    pub score: f64,
    pub category: ComplexityCategory,
}

impl ComplexityScore {
    /// Raises the category to at least `floor`, keeping the factors and score.
    pub fn at_least(mut self, floor: ComplexityCategory) -> Self {
        self.category = self.category.max(floor);
        self
    }
}

pub fn classify(
    graph: &Graph,
    rects: &[Rect],
    current_overlaps: usize,
    config: &LayoutConfig,
) -> ComplexityScore {
    let tuning = &config.tuning;
    let n = graph.nodes.len();
    if n == 0 {
        return ComplexityScore {
            factors: ComplexityFactors::default(),
            score: 0.0,
            category: ComplexityCategory::Simple,
        };
    }
    let nf = n as f64;

    let large = tuning.large_graph_threshold.max(1) as f64;
    let node_count = ((1.0 + nf).ln() / (1.0 + large).ln()).min(1.0);

    // Average degree against a reference that never exceeds the complete graph's.
    let reference = tuning.dense_degree.min(nf - 1.0);
    let avg_degree = 2.0 * graph.edges.len() as f64 / nf;
    let edge_density = if reference > 0.0 {
        (avg_degree / reference).min(1.0)
    } else {
        0.0
    };

    let overlap_severity = (current_overlaps as f64 / nf).min(1.0);

    let canvas_area = config.canvas_width * config.canvas_height;
    let spatial_spread = match bounding_box(rects) {
        Some(bb) if canvas_area > 0.0 => 1.0 - (bb.area() / canvas_area).clamp(0.0, 1.0),
        _ => 0.0,
    };

    let size_variance = {
        let areas: Vec<f64> = rects.iter().map(Rect::area).collect();
        let mean = areas.iter().sum::<f64>() / nf;
        if mean > 0.0 {
            let var = areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / nf;
            (var.sqrt() / mean).min(1.0)
        } else {
            0.0
        }
    };

    let factors = ComplexityFactors {
        node_count,
        edge_density,
        overlap_severity,
        spatial_spread,
        size_variance,
    };
    let w = &tuning.complexity_weights;
    let weight_sum = w.node_count
        + w.edge_density
        + w.overlap_severity
        + w.spatial_spread
        + w.size_variance;
    let weighted = w.node_count * node_count
        + w.edge_density * edge_density
        + w.overlap_severity * overlap_severity
        + w.spatial_spread * spatial_spread
        + w.size_variance * size_variance;
    let score = if weight_sum > 0.0 {
        (100.0 * weighted / weight_sum).clamp(0.0, 100.0)
    } else {
        0.0
    };

    ComplexityScore {
        factors,
        score,
        category: ComplexityCategory::from_score(score, tuning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DiagramType, Node};

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new(DiagramType::Network);
        for i in 0..n {
            g.add_node(Node::new(format!("k{i}")));
        }
        for i in 0..n {
            for j in (i + 1)..n {
                g.add_edge(format!("k{i}"), format!("k{j}"));
            }
        }
        g
    }

    #[test]
    fn empty_graph_is_simple() {
        let s = classify(&Graph::default(), &[], 0, &LayoutConfig::default());
        assert_eq!(s.category, ComplexityCategory::Simple);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn clumped_dense_overlapping_graph_is_very_complex() {
        let cfg = LayoutConfig::default();
        let g = complete(60);
        let rects: Vec<Rect> = (0..60)
            .map(|i| Rect::new(10.0 + i as f64, 10.0, 40.0 + (i % 7) as f64 * 60.0, 30.0))
            .collect();
        let s = classify(&g, &rects, 500, &cfg);
        assert_eq!(s.factors.node_count, 1.0);
        assert_eq!(s.factors.edge_density, 1.0);
        assert_eq!(s.factors.overlap_severity, 1.0);
        assert!(s.score >= cfg.tuning.very_complex_threshold, "score {}", s.score);
        assert_eq!(s.category, ComplexityCategory::VeryComplex);
    }

    #[test]
    fn factors_stay_in_unit_range() {
        let cfg = LayoutConfig::default();
        let g = complete(3);
        let rects = vec![Rect::new(0.0, 0.0, 10.0, 10.0); 3];
        let s = classify(&g, &rects, 3, &cfg);
        for f in [
            s.factors.node_count,
            s.factors.edge_density,
            s.factors.overlap_severity,
            s.factors.spatial_spread,
            s.factors.size_variance,
        ] {
            assert!((0.0..=1.0).contains(&f), "factor {f}");
        }
        assert!((0.0..=100.0).contains(&s.score));
    }

    #[test]
    fn category_floor_and_mapping() {
        let tuning = TuningConfig::default();
        assert_eq!(ComplexityCategory::from_score(10.0, &tuning), ComplexityCategory::Simple);
        assert_eq!(ComplexityCategory::from_score(30.0, &tuning), ComplexityCategory::Moderate);
        assert_eq!(ComplexityCategory::from_score(60.0, &tuning), ComplexityCategory::Complex);
        let s = ComplexityScore {
            factors: ComplexityFactors::default(),
            score: 5.0,
            category: ComplexityCategory::Simple,
        };
        assert_eq!(
            s.at_least(ComplexityCategory::Moderate).category,
            ComplexityCategory::Moderate
        );
        assert_eq!(
            ComplexityCategory::Simple.default_strategy(),
            ResolutionStrategy::GridSnap
        );
    }
}
