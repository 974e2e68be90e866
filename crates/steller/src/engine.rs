//! The public layout pipeline: validate, place, classify, resolve, route, score, enhance.

use crate::complexity::{ComplexityCategory, ComplexityScore, classify};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect, bounding_box};
use crate::graph::{DiagramType, Graph, Topology};
use crate::history::{AdaptationHistory, HistoryEntry};
use crate::placement::{PlacementStrategy, lattice_slot, place};
use crate::quality::{QualityMetrics, assess};
use crate::resolve::{PhaseReport, ResolutionStrategy, Resolver, ResolverState, reset_warning};
use crate::routing::route_edges;
use crate::spatial::overlap_pairs;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Final box of one node. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDiagnostics {
    /// `<placement>+<resolution>`, e.g. `simulation+phased-force`.
    pub algorithm_used: String,
    pub placement: PlacementStrategy,
    pub resolution: ResolutionStrategy,
    pub complexity: ComplexityScore,
    pub resolver_state: ResolverState,
    pub iterations_used: usize,
    pub iteration_budget: usize,
    pub phases: Vec<PhaseReport>,
    pub initial_overlaps: usize,
    pub history_biased: bool,
    pub fallback_used: bool,
    pub enhancement_applied: bool,
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub quality: QualityMetrics,
    pub zero_overlap_guarantee: bool,
    pub warnings: Vec<String>,
    pub diagnostics: LayoutDiagnostics,
}

impl LayoutResult {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn history_entry(&self, primary_converged: bool) -> HistoryEntry {
        HistoryEntry {
            category: self.diagnostics.complexity.category,
            strategy: self.diagnostics.resolution,
            quality: self.quality,
            converged: primary_converged,
        }
    }
}

/// Lays out `graph` as `diagram_type`, consulting and then extending `history`.
///
/// Fails only on invalid input; an incomplete resolution still returns a layout, with
/// `zero_overlap_guarantee == false` and a warning.
pub fn generate_layout(
    graph: &Graph,
    diagram_type: DiagramType,
    config: &LayoutConfig,
    history: &mut AdaptationHistory,
) -> Result<LayoutResult> {
    let (result, primary_converged) = run_pipeline(graph, diagram_type, config, |category| {
        history.preferred_strategy(category, &config.tuning)
    })?;
    history.record(result.history_entry(primary_converged));
    Ok(result)
}

fn run_pipeline(
    graph: &Graph,
    diagram_type: DiagramType,
    config: &LayoutConfig,
    bias: impl Fn(ComplexityCategory) -> Option<ResolutionStrategy>,
) -> Result<(LayoutResult, bool)> {
    let start = Instant::now();
    graph.validate(config)?;

    let topo = Topology::new(graph);
    let sizes: Vec<(f64, f64)> = graph.nodes.iter().map(|n| n.size(config)).collect();
    let placement = PlacementStrategy::for_diagram(diagram_type, &topo);
    let mut rects = if graph.nodes.is_empty() {
        Vec::new()
    } else {
        place(placement, &topo, &sizes, config)
    };

    let initial_overlaps = overlap_pairs(&rects, config.margin, config.spatial_index_threshold).len();
    let mut complexity = classify(graph, &rects, initial_overlaps, config);
    if placement == PlacementStrategy::Simulation {
        complexity = complexity.at_least(ComplexityCategory::Moderate);
    }

    let biased = if placement == PlacementStrategy::Simulation {
        None
    } else {
        bias(complexity.category).filter(|s| *s != ResolutionStrategy::Phased)
    };
    let strategy = match (placement, biased) {
        (PlacementStrategy::Simulation, _) => ResolutionStrategy::Phased,
        (_, Some(s)) => s,
        (_, None) => complexity.category.default_strategy(),
    };
    let effort = complexity.category.effort(&config.tuning);
    let budget = (config.max_iterations as f64 * effort).ceil() as usize;
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        placement = %placement,
        category = %complexity.category,
        score = complexity.score,
        strategy = %strategy,
        budget,
        initial_overlaps,
        "layout plan"
    );

    let resolver = Resolver::new(config)
        .with_budget(budget)
        .with_strength(0.5 + 0.5 * effort);
    let outcome = resolver.run(strategy, &mut rects, &topo.edges);
    let primary_converged = outcome.converged();
    let mut iterations_used = outcome.iterations;
    let mut resolver_state = outcome.state;
    let mut warnings = outcome.warnings;

    let mut routes = route_edges(placement, &rects, &topo.edges);
    let mut quality = assess(&rects, &routes, config);

    // The composite score gates the primary result: anything short of acceptable gets one
    // grid-snap retry, and the retry is kept only if it scores better.
    let mut fallback_used = false;
    let accepted = quality.is_acceptable(config.quality_threshold);
    let retry_from = if accepted {
        None
    } else if !primary_converged {
        Some(rects.clone())
    } else if placement.is_deterministic_grid() {
        // Already a lattice; a grid-snap retry would reproduce it.
        None
    } else {
        Some(lattice_layout(&rects, config))
    };
    if let Some(mut candidate) = retry_from {
        fallback_used = true;
        let retry = Resolver::new(config).run(ResolutionStrategy::GridSnap, &mut candidate, &topo.edges);
        iterations_used += retry.iterations;
        let candidate_routes = route_edges(placement, &candidate, &topo.edges);
        let candidate_quality = assess(&candidate, &candidate_routes, config);
        let better = candidate_quality.overlap_count < quality.overlap_count
            || (candidate_quality.overlap_count == quality.overlap_count
                && candidate_quality.composite_score > quality.composite_score);
        tracing::debug!(
            strategy = %strategy,
            primary = quality.composite_score,
            fallback = candidate_quality.composite_score,
            adopted = better,
            "grid-snap fallback"
        );
        if better {
            // Warnings describe the layout that is returned, not the one that was discarded.
            warnings.clear();
            if outcome.reset_nodes > 0 && !primary_converged {
                warnings.push(reset_warning(outcome.reset_nodes));
            }
            let retry_converged = retry.converged();
            warnings.extend(retry.warnings);
            if retry_converged && !primary_converged {
                warnings.push(format!("{strategy} left overlaps; grid-snap fallback resolved them"));
            }
            rects = candidate;
            routes = candidate_routes;
            quality = candidate_quality;
            resolver_state = retry.state;
        }
    }

    let mut enhancement_applied = false;
    if config.enhance {
        if let Some(centered) = center_in_canvas(&rects, config) {
            let centered_routes = route_edges(placement, &centered, &topo.edges);
            let centered_quality = assess(&centered, &centered_routes, config);
            let in_bounds = centered
                .iter()
                .all(|r| r.within(config.canvas_width, config.canvas_height));
            if in_bounds
                && centered_quality.overlap_count <= quality.overlap_count
                && centered_quality.composite_score >= quality.composite_score
            {
                rects = centered;
                routes = centered_routes;
                quality = centered_quality;
                enhancement_applied = true;
            }
        }
    }

    let zero_overlap_guarantee = quality.overlap_count == 0;
    if !zero_overlap_guarantee {
        tracing::warn!(overlaps = quality.overlap_count, "layout finished with overlapping nodes");
        warnings.push(format!(
            "layout still has {} overlapping node pair(s)",
            quality.overlap_count
        ));
    }
    if quality.composite_score < config.quality_threshold {
        warnings.push(format!(
            "quality score {:.1} is below the acceptance threshold {:.1}",
            quality.composite_score, config.quality_threshold
        ));
    }

    let nodes = graph
        .nodes
        .iter()
        .zip(&rects)
        .map(|(node, r)| LayoutNode {
            id: node.id.clone(),
            label: node.display_label().to_string(),
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        })
        .collect();
    let edges = graph
        .edges
        .iter()
        .zip(routes)
        .map(|(edge, route)| LayoutEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone(),
            points: route.points,
        })
        .collect();

    let diagnostics = LayoutDiagnostics {
        algorithm_used: format!("{placement}+{strategy}"),
        placement,
        resolution: strategy,
        complexity,
        resolver_state,
        iterations_used,
        iteration_budget: resolver.budget(),
        phases: outcome.phases,
        initial_overlaps,
        history_biased: biased.is_some(),
        fallback_used,
        enhancement_applied,
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    tracing::debug!(
        algorithm = %diagnostics.algorithm_used,
        state = resolver_state.as_str(),
        iterations = iterations_used,
        composite = quality.composite_score,
        "layout finished"
    );

    let result = LayoutResult {
        nodes,
        edges,
        quality,
        zero_overlap_guarantee,
        warnings,
        diagnostics,
    };
    Ok((result, primary_converged))
}

/// Every node moved to its cell of a near-square lattice over the canvas, in input order.
fn lattice_layout(rects: &[Rect], config: &LayoutConfig) -> Vec<Rect> {
    rects
        .iter()
        .enumerate()
        .map(|(idx, r)| lattice_slot(idx, rects.len(), (r.width, r.height), config))
        .collect()
}

/// Translates the whole layout so its bounding box is centered in the canvas. `None` when the
/// layout is empty or already centered to within half a unit.
fn center_in_canvas(rects: &[Rect], config: &LayoutConfig) -> Option<Vec<Rect>> {
    let bb = bounding_box(rects)?;
    let c = bb.center();
    let dx = config.canvas_width / 2.0 - c.x;
    let dy = config.canvas_height / 2.0 - c.y;
    if dx.abs() < 0.5 && dy.abs() < 0.5 {
        return None;
    }
    Some(
        rects
            .iter()
            .map(|r| {
                let mut r = *r;
                r.translate(dx, dy);
                r
            })
            .collect(),
    )
}

/// A reusable engine that owns its config and a shared adaptation history. Layout calls take
/// `&self` and may run concurrently from several threads.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    history: Mutex<AdaptationHistory>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        let config = LayoutConfig::default();
        let history = Mutex::new(AdaptationHistory::new(config.history_capacity));
        Self { config, history }
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let history = Mutex::new(AdaptationHistory::new(config.history_capacity));
        Ok(Self { config, history })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `graph` using its own diagram type.
    pub fn layout(&self, graph: &Graph) -> Result<LayoutResult> {
        self.layout_as(graph, graph.diagram_type)
    }

    pub fn layout_as(&self, graph: &Graph, diagram_type: DiagramType) -> Result<LayoutResult> {
        // Work from a snapshot so the lock is never held across a layout.
        let snapshot = self.lock_history().clone();
        let (result, primary_converged) =
            run_pipeline(graph, diagram_type, &self.config, |category| {
                snapshot.preferred_strategy(category, &self.config.tuning)
            })?;
        self.lock_history()
            .record(result.history_entry(primary_converged));
        Ok(result)
    }

    /// Copy of the current history.
    pub fn history(&self) -> AdaptationHistory {
        self.lock_history().clone()
    }

    pub fn clear_history(&mut self) {
        self.history
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn lock_history(&self) -> MutexGuard<'_, AdaptationHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
