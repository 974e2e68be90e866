#![forbid(unsafe_code)]

//! Adaptive zero-overlap layout for small concept graphs.
//!
//! Given a graph of sized nodes, a diagram type and a [`LayoutConfig`], `steller` places every
//! node inside the canvas so that no two boxes come closer than the configured margin, or says
//! so explicitly through [`LayoutResult::zero_overlap_guarantee`] and a warning.

pub mod complexity;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod placement;
pub mod quality;
pub mod resolve;
pub mod routing;
pub mod spatial;

mod rng;

pub use complexity::{ComplexityCategory, ComplexityFactors, ComplexityScore, classify};
pub use config::{LayoutConfig, TuningConfig};
pub use engine::{
    LayoutDiagnostics, LayoutEdge, LayoutEngine, LayoutNode, LayoutResult, generate_layout,
};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use graph::{DiagramType, Edge, Graph, Node};
pub use history::{AdaptationHistory, HistoryEntry};
pub use placement::PlacementStrategy;
pub use quality::QualityMetrics;
pub use resolve::{ResolutionStrategy, ResolveOutcome, Resolver, ResolverState};

/// One-shot layout using the graph's own diagram type and no adaptation history.
pub fn layout(graph: &Graph, config: &LayoutConfig) -> Result<LayoutResult> {
    generate_layout(
        graph,
        graph.diagram_type,
        config,
        &mut AdaptationHistory::disabled(),
    )
}
