use super::offenders;
use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::spatial::SpatialIndex;
use std::f64::consts::TAU;

/// Angular steps per turn of the spiral.
const STEPS_PER_TURN: usize = 24;

/// Relocates each offender (the later node of an overlapping pair) to the first in-bounds spot on
/// an Archimedean spiral around its current center that overlaps nothing. Returns the total
/// distance moved.
pub(super) fn place_offenders(rects: &mut [Rect], pairs: &[(usize, usize)], config: &LayoutConfig) -> f64 {
    let mut index = SpatialIndex::build(rects, config.margin);
    let mut moved = 0.0;
    for v in offenders(pairs) {
        index.remove(v);
        let current = rects[v];
        if index.overlapping(&current, None).is_empty() {
            index.insert(v, current);
            continue;
        }
        let target = match spiral_search(&current, &index, config) {
            Some(r) => r,
            None => {
                tracing::debug!(node = v, "spiral search found no free spot");
                current
            }
        };
        moved += (target.x - current.x).hypot(target.y - current.y);
        rects[v] = target;
        index.insert(v, target);
    }
    moved
}

fn spiral_search(rect: &Rect, index: &SpatialIndex, config: &LayoutConfig) -> Option<Rect> {
    let origin = rect.center();
    // One turn advances the radius by roughly the node's smaller side plus the margin.
    let pitch = (rect.width.min(rect.height) + config.margin).max(1.0);
    let max_radius = config.canvas_width.hypot(config.canvas_height);
    let mut step = 1usize;
    loop {
        let theta = TAU * step as f64 / STEPS_PER_TURN as f64;
        let radius = pitch * theta / TAU;
        if radius > max_radius {
            return None;
        }
        let mut candidate = *rect;
        candidate.set_center(origin.x + radius * theta.cos(), origin.y + radius * theta.sin());
        // Spots that need clamping are off the spiral; skip them rather than distort it.
        if candidate.within(config.canvas_width, config.canvas_height)
            && index.overlapping(&candidate, None).is_empty()
        {
            return Some(candidate);
        }
        step += 1;
    }
}
