//! Iterative overlap resolution.
//!
//! Deterministic placements usually need little help, so they go through a single generic loop
//! driven by one [`ResolutionStrategy`]. The simulation placement runs the three-phase
//! force-directed schedule in [`phased`]. Either way the run ends in [`ResolverState::Converged`]
//! only when no pair of boxes is closer than the margin.

mod phased;
mod push;
mod snap;
mod spiral;

use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::placement::lattice_slot;
use crate::spatial::overlap_pairs;
use serde::{Deserialize, Serialize};

/// Extra clearance added on top of the exact separation so rounding never leaves a pair a hair
/// closer than the margin.
pub(crate) const SEPARATION_SLACK: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Move offending nodes to the nearest free cell of a lattice sized for the largest node.
    GridSnap,
    /// Symmetric pairwise pushes along the center-to-center vector.
    ForceDirected,
    /// Walk an Archimedean spiral around each offending node until it finds free space.
    Spiral,
    /// Pushes, escalating to spiral and then grid-snap when progress stalls.
    Adaptive,
    /// Separation, structure formation and fine adjustment with edge attraction.
    Phased,
}

impl ResolutionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GridSnap => "grid-snap",
            Self::ForceDirected => "force-directed",
            Self::Spiral => "spiral",
            Self::Adaptive => "adaptive",
            Self::Phased => "phased-force",
        }
    }

    /// Next stronger strategy in the generic loop, if any.
    pub fn escalate(self) -> Self {
        match self {
            Self::GridSnap => Self::ForceDirected,
            Self::ForceDirected => Self::Adaptive,
            other => other,
        }
    }
}

impl std::fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverState {
    Separation,
    StructureFormation,
    FineAdjustment,
    Converged,
    BudgetExhausted,
}

impl ResolverState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Separation => "separation",
            Self::StructureFormation => "structure-formation",
            Self::FineAdjustment => "fine-adjustment",
            Self::Converged => "converged",
            Self::BudgetExhausted => "budget-exhausted",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::BudgetExhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: ResolverState,
    pub iterations: usize,
    /// Whether the phase ended on a convergence check rather than on its budget.
    pub settled_early: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub strategy: ResolutionStrategy,
    pub state: ResolverState,
    pub iterations: usize,
    pub remaining_overlaps: usize,
    pub phases: Vec<PhaseReport>,
    /// Nodes whose coordinates became non-finite and were reset to a lattice slot.
    pub reset_nodes: usize,
    pub warnings: Vec<String>,
}

impl ResolveOutcome {
    pub fn converged(&self) -> bool {
        self.state == ResolverState::Converged
    }
}

/// Runs one resolution strategy over an arena of boxes.
///
/// `budget` bounds the number of iterations. Boxes are kept inside the canvas after every
/// iteration.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    config: &'a LayoutConfig,
    budget: usize,
    strength: f64,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            budget: config.max_iterations,
            strength: 1.0,
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Scales push step sizes; values are clamped to `(0, 1]`.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = if strength.is_finite() && strength > 0.0 {
            strength.min(1.0)
        } else {
            1.0
        };
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Resolves overlaps in `rects`. `edges` (index pairs) only matter for
    /// [`ResolutionStrategy::Phased`].
    pub fn run(
        &self,
        strategy: ResolutionStrategy,
        rects: &mut [Rect],
        edges: &[(usize, usize)],
    ) -> ResolveOutcome {
        let mut ctx = Context::new(self.config, rects.len());
        let outcome = match strategy {
            ResolutionStrategy::Phased => phased::run(self, &mut ctx, rects, edges),
            other => self.run_generic(other, &mut ctx, rects),
        };
        debug_assert!(outcome.state.is_terminal(), "resolver stopped in {:?}", outcome.state);
        if outcome.state == ResolverState::BudgetExhausted {
            tracing::warn!(
                strategy = %strategy,
                iterations = outcome.iterations,
                remaining = outcome.remaining_overlaps,
                "iteration budget exhausted with overlaps remaining"
            );
        } else {
            tracing::debug!(
                strategy = %strategy,
                iterations = outcome.iterations,
                "overlap resolution converged"
            );
        }
        outcome
    }

    fn run_generic(
        &self,
        strategy: ResolutionStrategy,
        ctx: &mut Context<'_>,
        rects: &mut [Rect],
    ) -> ResolveOutcome {
        let cfg = self.config;
        let period = cfg.convergence_check_period.max(1);
        let mut iterations = 0usize;
        let mut since_check = 0.0f64;
        // Adaptive escalation: 0 = pushes, 1 = spiral pass due, 2 = grid-snap pass due.
        let mut escalation = 0u8;
        let mut overlaps_at_check = usize::MAX;

        let (state, remaining) = loop {
            ctx.sanitize(rects);
            let pairs = ctx.overlaps(rects);
            if pairs.is_empty() {
                break (ResolverState::Converged, 0);
            }
            if iterations >= self.budget {
                break (ResolverState::BudgetExhausted, pairs.len());
            }
            iterations += 1;

            let moved = match strategy {
                ResolutionStrategy::GridSnap => snap::snap_offenders(rects, &pairs, cfg),
                ResolutionStrategy::Spiral => spiral::place_offenders(rects, &pairs, cfg),
                ResolutionStrategy::ForceDirected | ResolutionStrategy::Phased => {
                    push::push_pairs(rects, &pairs, self.strength, cfg)
                }
                ResolutionStrategy::Adaptive => match escalation {
                    0 => push::push_pairs(rects, &pairs, self.strength, cfg),
                    1 => {
                        escalation = 0;
                        spiral::place_offenders(rects, &pairs, cfg)
                    }
                    _ => {
                        escalation = 0;
                        snap::snap_offenders(rects, &pairs, cfg)
                    }
                },
            };
            since_check += moved;

            if iterations.is_multiple_of(period) {
                let stalled = since_check < cfg.convergence_epsilon || pairs.len() >= overlaps_at_check;
                if strategy == ResolutionStrategy::Adaptive && stalled {
                    ctx.stalls += 1;
                    escalation = if ctx.stalls % 2 == 1 { 1 } else { 2 };
                    tracing::debug!(iterations, overlaps = pairs.len(), escalation, "resolver stalled");
                }
                overlaps_at_check = pairs.len();
                since_check = 0.0;
            }
        };

        ResolveOutcome {
            strategy,
            state,
            iterations,
            remaining_overlaps: remaining,
            phases: Vec::new(),
            reset_nodes: ctx.reset_count(),
            warnings: ctx.finish(state, remaining),
        }
    }
}

/// Per-run scratch state shared by the strategies.
pub(crate) struct Context<'a> {
    config: &'a LayoutConfig,
    count: usize,
    reset: Vec<bool>,
    stalls: usize,
}

impl<'a> Context<'a> {
    fn new(config: &'a LayoutConfig, count: usize) -> Self {
        Self {
            config,
            count,
            reset: vec![false; count],
            stalls: 0,
        }
    }

    pub(crate) fn overlaps(&self, rects: &[Rect]) -> Vec<(usize, usize)> {
        overlap_pairs(rects, self.config.margin, self.config.spatial_index_threshold)
    }

    /// Resets boxes with non-finite coordinates to their lattice slot.
    pub(crate) fn sanitize(&mut self, rects: &mut [Rect]) {
        for (idx, r) in rects.iter_mut().enumerate() {
            if r.is_finite() {
                continue;
            }
            let slot = lattice_slot(idx, self.count, (r.width, r.height), self.config);
            tracing::warn!(node = idx, x = r.x, y = r.y, "non-finite position reset to lattice slot");
            *r = slot;
            self.reset[idx] = true;
        }
    }

    fn reset_count(&self) -> usize {
        self.reset.iter().filter(|r| **r).count()
    }

    fn finish(&self, state: ResolverState, remaining: usize) -> Vec<String> {
        let mut warnings = Vec::new();
        let resets = self.reset_count();
        if resets > 0 {
            warnings.push(reset_warning(resets));
        }
        if state == ResolverState::BudgetExhausted {
            warnings.push(format!(
                "iteration budget exhausted with {remaining} overlapping pair(s) remaining"
            ));
        }
        warnings
    }
}

pub(crate) fn reset_warning(resets: usize) -> String {
    format!("{resets} node position(s) became non-finite and were reset to a fallback grid cell")
}

/// Clamps every box into the canvas.
pub(crate) fn clamp_all(rects: &mut [Rect], config: &LayoutConfig) {
    for r in rects {
        r.clamp_into(config.canvas_width, config.canvas_height);
    }
}

/// Nodes to relocate for a set of overlapping pairs: the later node of each pair, so earlier
/// (input-order) nodes stay anchored. Sorted, deduplicated.
pub(crate) fn offenders(pairs: &[(usize, usize)]) -> Vec<usize> {
    let mut out: Vec<usize> = pairs.iter().map(|&(_, j)| j).collect();
    out.sort_unstable();
    out.dedup();
    out
}
