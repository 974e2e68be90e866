use super::{SEPARATION_SLACK, offenders};
use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::spatial::SpatialIndex;

/// Moves the later node of each overlapping pair to the nearest lattice cell where it no longer
/// overlaps anything. The lattice pitch fits the largest node plus the margin, so two boxes in
/// different cells never collide. Returns the total distance moved.
pub(super) fn snap_offenders(rects: &mut [Rect], pairs: &[(usize, usize)], config: &LayoutConfig) -> f64 {
    let (max_w, max_h) = rects
        .iter()
        .fold((0.0f64, 0.0f64), |(w, h), r| (w.max(r.width), h.max(r.height)));
    let pitch_x = max_w + config.margin + SEPARATION_SLACK;
    let pitch_y = max_h + config.margin + SEPARATION_SLACK;
    if pitch_x <= 0.0 || pitch_y <= 0.0 {
        return 0.0;
    }
    let cols = ((config.canvas_width - max_w) / pitch_x).floor().max(0.0) as i64 + 1;
    let rows = ((config.canvas_height - max_h) / pitch_y).floor().max(0.0) as i64 + 1;

    let mut index = SpatialIndex::build(rects, config.margin);
    let mut moved = 0.0;
    for v in offenders(pairs) {
        index.remove(v);
        let current = rects[v];
        if index.overlapping(&current, None).is_empty() {
            // An earlier snap already cleared it.
            index.insert(v, current);
            continue;
        }
        let c = current.center();
        let home_col = ((c.x - max_w / 2.0) / pitch_x).round() as i64;
        let home_row = ((c.y - max_h / 2.0) / pitch_y).round() as i64;

        let slot = nearest_free_cell(cols, rows, (home_col, home_row), |col, row| {
            let mut candidate = current;
            candidate.set_center(
                col as f64 * pitch_x + max_w / 2.0,
                row as f64 * pitch_y + max_h / 2.0,
            );
            candidate.clamp_into(config.canvas_width, config.canvas_height);
            index.overlapping(&candidate, None).is_empty().then_some(candidate)
        });
        let target = match slot {
            Some(r) => r,
            None => {
                tracing::debug!(node = v, "no free lattice cell; leaving node in place");
                current
            }
        };
        moved += (target.x - current.x).hypot(target.y - current.y);
        rects[v] = target;
        index.insert(v, target);
    }
    moved
}

/// Rings of cells at growing Chebyshev distance from `home`, scanned row-major within a ring.
fn nearest_free_cell(
    cols: i64,
    rows: i64,
    home: (i64, i64),
    mut accept: impl FnMut(i64, i64) -> Option<Rect>,
) -> Option<Rect> {
    let home = (home.0.clamp(0, cols - 1), home.1.clamp(0, rows - 1));
    let max_ring = cols.max(rows);
    for ring in 0..=max_ring {
        let mut best: Option<(f64, Rect)> = None;
        for row in (home.1 - ring)..=(home.1 + ring) {
            for col in (home.0 - ring)..=(home.0 + ring) {
                let on_ring = (row - home.1).abs() == ring || (col - home.0).abs() == ring;
                if !on_ring || col < 0 || row < 0 || col >= cols || row >= rows {
                    continue;
                }
                if let Some(r) = accept(col, row) {
                    let d = ((col - home.0) as f64).hypot((row - home.1) as f64);
                    if best.as_ref().is_none_or(|(bd, _)| d < *bd) {
                        best = Some((d, r));
                    }
                }
            }
        }
        if let Some((_, r)) = best {
            return Some(r);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::brute_force_pairs;

    #[test]
    fn snapping_clears_a_stack_in_one_pass() {
        let cfg = LayoutConfig::default();
        let mut rects = vec![Rect::new(700.0, 400.0, 120.0, 40.0); 5];
        let pairs = brute_force_pairs(&rects, cfg.margin);
        snap_offenders(&mut rects, &pairs, &cfg);
        assert!(brute_force_pairs(&rects, cfg.margin).is_empty());
        // Node 0 is never an offender.
        assert_eq!(rects[0], Rect::new(700.0, 400.0, 120.0, 40.0));
    }

    #[test]
    fn nearest_cell_prefers_home() {
        let hit = nearest_free_cell(5, 5, (2, 2), |c, r| Some(Rect::new(c as f64, r as f64, 1.0, 1.0)));
        assert_eq!(hit, Some(Rect::new(2.0, 2.0, 1.0, 1.0)));
        let none = nearest_free_cell(3, 3, (0, 0), |_, _| None);
        assert_eq!(none, None);
    }
}
