//! Axis-aligned box primitives shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Top-left anchored rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn set_center(&mut self, cx: f64, cy: f64) {
        self.x = cx - self.width / 2.0;
        self.y = cy - self.height / 2.0;
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Moves the box into `[0, canvas_w - width] x [0, canvas_h - height]`.
    pub fn clamp_into(&mut self, canvas_w: f64, canvas_h: f64) {
        self.x = self.x.clamp(0.0, (canvas_w - self.width).max(0.0));
        self.y = self.y.clamp(0.0, (canvas_h - self.height).max(0.0));
    }

    pub fn within(&self, canvas_w: f64, canvas_h: f64) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= canvas_w + EPS
            && self.bottom() <= canvas_h + EPS
    }
}

/// Gap between two boxes along each axis; negative when they interpenetrate on that axis.
pub fn gaps(a: &Rect, b: &Rect) -> (f64, f64) {
    let gap_x = (b.x - a.right()).max(a.x - b.right());
    let gap_y = (b.y - a.bottom()).max(a.y - b.bottom());
    (gap_x, gap_y)
}

/// True iff the boxes are closer than `margin` on both axes.
pub fn overlaps(a: &Rect, b: &Rect, margin: f64) -> bool {
    let (gap_x, gap_y) = gaps(a, b);
    gap_x < margin && gap_y < margin
}

/// Area of the intersection of the margin-expanded boxes, zero when they do not overlap.
pub fn overlap_area(a: &Rect, b: &Rect, margin: f64) -> f64 {
    let (gap_x, gap_y) = gaps(a, b);
    let depth_x = margin - gap_x;
    let depth_y = margin - gap_y;
    if depth_x > 0.0 && depth_y > 0.0 {
        depth_x * depth_y
    } else {
        0.0
    }
}

/// Total relative travel along the unit vector `(ux, uy)` (pointing from `a` to `b`) that makes
/// the pair clear `margin` on at least one axis. Zero if they already do.
pub fn separation_along(a: &Rect, b: &Rect, margin: f64, ux: f64, uy: f64) -> f64 {
    let ca = a.center();
    let cb = b.center();
    let need_x = (a.width + b.width) / 2.0 + margin;
    let need_y = (a.height + b.height) / 2.0 + margin;
    let dx = cb.x - ca.x;
    let dy = cb.y - ca.y;

    let mut best = f64::INFINITY;
    if ux.abs() > 1e-9 {
        // Moving along +u grows dx in the sign of ux.
        let s = (need_x - dx * ux.signum()) / ux.abs();
        best = best.min(s);
    }
    if uy.abs() > 1e-9 {
        let s = (need_y - dy * uy.signum()) / uy.abs();
        best = best.min(s);
    }
    if best.is_finite() { best.max(0.0) } else { 0.0 }
}

pub fn bounding_box<'a, I: IntoIterator<Item = &'a Rect>>(rects: I) -> Option<Rect> {
    let mut it = rects.into_iter();
    let first = it.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        (first.x, first.y, first.right(), first.bottom());
    for r in it {
        min_x = min_x.min(r.x);
        min_y = min_y.min(r.y);
        max_x = max_x.max(r.right());
        max_y = max_y.max(r.bottom());
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Point where the ray from `rect`'s center towards `toward` leaves the box.
pub fn clip_to_border(rect: &Rect, toward: Point) -> Point {
    let c = rect.center();
    let dx = toward.x - c.x;
    let dy = toward.y - c.y;
    if dx == 0.0 && dy == 0.0 {
        return c;
    }
    let mut t_x = f64::INFINITY;
    let mut t_y = f64::INFINITY;
    if dx != 0.0 {
        t_x = (rect.width / 2.0) / dx.abs();
    }
    if dy != 0.0 {
        t_y = (rect.height / 2.0) / dy.abs();
    }
    let t = t_x.min(t_y).min(1.0);
    Point::new(c.x + t * dx, c.y + t * dy)
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: Point, a: Point, b: Point, eps: f64) -> bool {
    p.x >= a.x.min(b.x) - eps
        && p.x <= a.x.max(b.x) + eps
        && p.y >= a.y.min(b.y) - eps
        && p.y <= a.y.max(b.y) + eps
}

/// Proper or touching intersection of segments `ab` and `cd`.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let eps = 1e-9;
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    let crosses = ((o1 > eps && o2 < -eps) || (o1 < -eps && o2 > eps))
        && ((o3 > eps && o4 < -eps) || (o3 < -eps && o4 > eps));
    if crosses {
        return true;
    }
    (o1.abs() <= eps && on_segment(c, a, b, eps))
        || (o2.abs() <= eps && on_segment(d, a, b, eps))
        || (o3.abs() <= eps && on_segment(a, c, d, eps))
        || (o4.abs() <= eps && on_segment(b, c, d, eps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_gap_is_exclusive() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(15.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b, 5.0), "exactly `margin` apart is not an overlap");
        assert!(overlaps(&a, &b, 5.1));
        assert_eq!(overlap_area(&a, &b, 5.0), 0.0);
    }

    #[test]
    fn boxes_apart_on_one_axis_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(2.0, 40.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b, 10.0));
        assert_eq!(overlap_area(&a, &b, 10.0), 0.0);
    }

    #[test]
    fn overlap_area_includes_margin() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        // Penetration is 5 on each axis, plus a margin of 2.
        assert!((overlap_area(&a, &b, 2.0) - 49.0).abs() < 1e-12);
        assert!((overlap_area(&a, &b, 0.0) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn separation_along_clears_the_cheaper_axis() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(4.0, 0.0, 10.0, 10.0);
        let s = separation_along(&a, &b, 1.0, 1.0, 0.0);
        assert!((s - 7.0).abs() < 1e-12, "got {s}");

        let mut moved = b;
        moved.translate(s, 0.0);
        assert!(!overlaps(&a, &moved, 1.0 - 1e-9));
    }

    #[test]
    fn clip_to_border_stops_on_the_box_edge() {
        let r = Rect::new(0.0, 0.0, 20.0, 10.0);
        let close = |p: Point, x: f64, y: f64| (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9;
        let p = clip_to_border(&r, Point::new(110.0, 5.0));
        assert!(close(p, 20.0, 5.0), "got {p:?}");
        let p = clip_to_border(&r, Point::new(10.0, -100.0));
        assert!(close(p, 10.0, 0.0), "got {p:?}");
    }

    #[test]
    fn segment_intersection_cases() {
        let p = Point::new;
        assert!(segments_intersect(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 1.0), p(10.0, 1.0)));
        assert!(segments_intersect(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0), p(5.0, 5.0)));
    }

    #[test]
    fn clamp_keeps_box_inside_canvas() {
        let mut r = Rect::new(-5.0, 95.0, 10.0, 10.0);
        r.clamp_into(100.0, 100.0);
        assert_eq!((r.x, r.y), (0.0, 90.0));
        assert!(r.within(100.0, 100.0));
    }
}
