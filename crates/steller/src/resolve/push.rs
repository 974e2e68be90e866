use super::{SEPARATION_SLACK, clamp_all};
use crate::config::LayoutConfig;
use crate::geometry::{Rect, overlaps, separation_along};
use crate::rng::jitter_direction;

/// Pushes every listed pair apart along the line between their centers.
///
/// Pairs are processed in order and positions update in place, so a later pair sees the effect
/// of earlier pushes. Each box of a pair moves half the required separation (times `strength`).
/// Returns the total distance moved.
pub(super) fn push_pairs(
    rects: &mut [Rect],
    pairs: &[(usize, usize)],
    strength: f64,
    config: &LayoutConfig,
) -> f64 {
    let mut moved = 0.0;
    for &(i, j) in pairs {
        if !overlaps(&rects[i], &rects[j], config.margin) {
            continue;
        }
        let (ux, uy) = push_direction(&rects[i], &rects[j], i, j, config.seed);
        let need = separation_along(&rects[i], &rects[j], config.margin, ux, uy);
        let half = need * strength / 2.0 + SEPARATION_SLACK;

        let before = (rects[i].x, rects[i].y, rects[j].x, rects[j].y);
        rects[i].translate(-ux * half, -uy * half);
        rects[j].translate(ux * half, uy * half);
        rects[i].clamp_into(config.canvas_width, config.canvas_height);
        rects[j].clamp_into(config.canvas_width, config.canvas_height);

        // A box pinned against the canvas edge cannot take its half; hand it to the other one.
        let short = half * 2.0
            - ((rects[i].x - before.0).hypot(rects[i].y - before.1)
                + (rects[j].x - before.2).hypot(rects[j].y - before.3));
        if short > 1e-9 {
            rects[j].translate(ux * short, uy * short);
            rects[i].translate(-ux * short, -uy * short);
            rects[i].clamp_into(config.canvas_width, config.canvas_height);
            rects[j].clamp_into(config.canvas_width, config.canvas_height);
        }

        moved += (rects[i].x - before.0).hypot(rects[i].y - before.1)
            + (rects[j].x - before.2).hypot(rects[j].y - before.3);
    }
    clamp_all(rects, config);
    moved
}

/// Unit vector from `a`'s center toward `b`'s, or a seeded jitter direction when they coincide.
pub(crate) fn push_direction(a: &Rect, b: &Rect, i: usize, j: usize, seed: u64) -> (f64, f64) {
    let ca = a.center();
    let cb = b.center();
    let (dx, dy) = (cb.x - ca.x, cb.y - ca.y);
    let len = dx.hypot(dy);
    if len < 1e-9 {
        jitter_direction(seed, i, j)
    } else {
        (dx / len, dy / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_push_separates_a_free_pair() {
        let cfg = LayoutConfig::default();
        let mut rects = vec![
            Rect::new(500.0, 500.0, 100.0, 50.0),
            Rect::new(540.0, 510.0, 100.0, 50.0),
        ];
        let moved = push_pairs(&mut rects, &[(0, 1)], 1.0, &cfg);
        assert!(moved > 0.0);
        assert!(!overlaps(&rects[0], &rects[1], cfg.margin));
    }

    #[test]
    fn coincident_pair_uses_jitter() {
        let cfg = LayoutConfig::default();
        let mut rects = vec![Rect::new(800.0, 400.0, 100.0, 50.0); 2];
        push_pairs(&mut rects, &[(0, 1)], 1.0, &cfg);
        assert!(!overlaps(&rects[0], &rects[1], cfg.margin));
        let again = {
            let mut r = vec![Rect::new(800.0, 400.0, 100.0, 50.0); 2];
            push_pairs(&mut r, &[(0, 1)], 1.0, &cfg);
            r
        };
        assert_eq!(rects, again);
    }

    #[test]
    fn pinned_box_hands_its_share_to_the_partner() {
        let cfg = LayoutConfig::default();
        let mut rects = vec![
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(20.0, 0.0, 100.0, 50.0),
        ];
        push_pairs(&mut rects, &[(0, 1)], 1.0, &cfg);
        assert_eq!(rects[0].x, 0.0);
        assert!(!overlaps(&rects[0], &rects[1], cfg.margin));
    }
}
