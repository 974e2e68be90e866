//! Three-phase force-directed schedule for simulation layouts.
//!
//! Each iteration applies bounded spring/repulsion forces, then pushes any overlapping pair apart
//! at full strength. Repulsion is measured between box borders rather than centers so wide nodes
//! push as hard as narrow ones.

use super::push::{push_direction, push_pairs};
use super::{Context, PhaseReport, ResolveOutcome, ResolutionStrategy, Resolver, ResolverState, clamp_all};
use crate::config::{LayoutConfig, PhaseForces};
use crate::geometry::{Rect, clip_to_border, overlaps};
use crate::spatial::pairs_within;

/// Cooling schedule: the step cap falls linearly from the full value to this fraction.
const FINAL_TEMPERATURE: f64 = 0.2;

pub(super) fn run(
    resolver: &Resolver<'_>,
    ctx: &mut Context<'_>,
    rects: &mut [Rect],
    edges: &[(usize, usize)],
) -> ResolveOutcome {
    let cfg = resolver.config;
    let tuning = &cfg.tuning;
    let period = cfg.convergence_check_period.max(1);
    let total_share = tuning.phase_share_total();
    let schedule = [
        (ResolverState::Separation, tuning.separation),
        (ResolverState::StructureFormation, tuning.structure_formation),
        (ResolverState::FineAdjustment, tuning.fine_adjustment),
    ];

    // The cleanup reserve is never spent by the force phases.
    let budget = resolver.budget();
    let reserve = ((budget as f64) * tuning.cleanup_share).ceil() as usize;
    let phase_total = budget.saturating_sub(reserve);

    let mut iterations = 0usize;
    let mut phases = Vec::with_capacity(schedule.len());
    let mut converged = false;

    for (phase, forces) in schedule {
        let share = (forces.budget_share / total_share).clamp(0.0, 1.0);
        let phase_budget = ((phase_total as f64) * share).floor() as usize;
        let phase_budget = phase_budget.min(phase_total.saturating_sub(iterations));
        let mut used = 0usize;
        // Force motion only: the overlap pushes below would otherwise keep a crowded phase from
        // ever looking settled.
        let mut since_check = 0.0;
        let mut settled = false;

        while used < phase_budget {
            ctx.sanitize(rects);
            used += 1;
            iterations += 1;
            let progress = used as f64 / phase_budget as f64;
            let temperature = 1.0 - (1.0 - FINAL_TEMPERATURE) * progress;

            since_check += apply_forces(rects, edges, &forces, temperature, cfg);
            let pairs = ctx.overlaps(rects);
            push_pairs(rects, &pairs, 1.0, cfg);

            if used.is_multiple_of(period) {
                if since_check < cfg.convergence_epsilon {
                    settled = true;
                    break;
                }
                since_check = 0.0;
            }
        }

        tracing::debug!(
            phase = phase.as_str(),
            iterations = used,
            budget = phase_budget,
            settled,
            "phase finished"
        );
        phases.push(PhaseReport {
            phase,
            iterations: used,
            settled_early: settled,
        });

        if settled && ctx.overlaps(rects).is_empty() {
            converged = true;
            break;
        }
    }

    // Separation-only cleanup with the reserve plus whatever the phases left unused.
    let mut remaining = 0;
    let mut cleanup = 0usize;
    if !converged {
        loop {
            ctx.sanitize(rects);
            let pairs = ctx.overlaps(rects);
            if pairs.is_empty() {
                converged = true;
                break;
            }
            if iterations >= budget {
                remaining = pairs.len();
                break;
            }
            iterations += 1;
            cleanup += 1;
            push_pairs(rects, &pairs, 1.0, cfg);
        }
        tracing::debug!(iterations = cleanup, reserve, converged, "cleanup finished");
    }

    let state = if converged {
        ResolverState::Converged
    } else {
        ResolverState::BudgetExhausted
    };
    ResolveOutcome {
        strategy: ResolutionStrategy::Phased,
        state,
        iterations,
        remaining_overlaps: remaining,
        phases,
        reset_nodes: ctx.reset_count(),
        warnings: ctx.finish(state, remaining),
    }
}

/// One bounded force step. Returns the total displacement applied.
fn apply_forces(
    rects: &mut [Rect],
    edges: &[(usize, usize)],
    forces: &PhaseForces,
    temperature: f64,
    config: &LayoutConfig,
) -> f64 {
    let n = rects.len();
    if n == 0 {
        return 0.0;
    }
    let tuning = &config.tuning;
    let ideal = config.ideal_edge_length.max(1.0);
    let mut disp = vec![(0.0f64, 0.0f64); n];

    if forces.repulsion > 0.0 {
        let range = ideal * tuning.repulsion_range_factor;
        let min_dist = ideal / 10.0;
        for (i, j) in pairs_within(rects, range, config.spatial_index_threshold) {
            let (ux, uy) = push_direction(&rects[i], &rects[j], i, j, config.seed);
            let dist = if overlaps(&rects[i], &rects[j], 0.0) {
                min_dist
            } else {
                let pa = clip_to_border(&rects[i], rects[j].center());
                let pb = clip_to_border(&rects[j], rects[i].center());
                (pb.x - pa.x).hypot(pb.y - pa.y).max(min_dist)
            };
            let f = tuning.repulsion_constant * forces.repulsion / (dist * dist);
            disp[i].0 -= ux * f;
            disp[i].1 -= uy * f;
            disp[j].0 += ux * f;
            disp[j].1 += uy * f;
        }
    }

    if forces.attraction > 0.0 {
        for &(s, t) in edges {
            if s == t {
                continue;
            }
            let cs = rects[s].center();
            let ct = rects[t].center();
            let (dx, dy) = (ct.x - cs.x, ct.y - cs.y);
            let d = dx.hypot(dy);
            if d < 1e-9 {
                continue;
            }
            let f = forces.attraction * (d - ideal);
            let (ux, uy) = (dx / d, dy / d);
            disp[s].0 += ux * f;
            disp[s].1 += uy * f;
            disp[t].0 -= ux * f;
            disp[t].1 -= uy * f;
        }

        let (cx, cy) = (config.canvas_width / 2.0, config.canvas_height / 2.0);
        for (r, d) in rects.iter().zip(disp.iter_mut()) {
            let c = r.center();
            d.0 += (cx - c.x) * tuning.gravity;
            d.1 += (cy - c.y) * tuning.gravity;
        }
    }

    let limit = forces.max_step * temperature;
    let mut moved = 0.0;
    for (r, (dx, dy)) in rects.iter_mut().zip(disp) {
        let len = dx.hypot(dy);
        if !len.is_finite() || len < 1e-12 {
            continue;
        }
        let scale = if len > limit { limit / len } else { 1.0 };
        let (x0, y0) = (r.x, r.y);
        r.translate(dx * scale, dy * scale);
        r.clamp_into(config.canvas_width, config.canvas_height);
        moved += (r.x - x0).hypot(r.y - y0);
    }
    clamp_all(rects, config);
    moved
}
