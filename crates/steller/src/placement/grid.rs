//! Closed-form row/column placements: flow, timeline, comparison and concept grid.
//!
//! Every function centers each node on a computed anchor. Nothing here depends on anything but
//! the node sizes and the config, so runs are bit-for-bit reproducible.

use crate::config::LayoutConfig;
use crate::geometry::Rect;

fn max_dims(sizes: &[(f64, f64)]) -> (f64, f64) {
    sizes
        .iter()
        .fold((0.0f64, 0.0f64), |(w, h), &(nw, nh)| (w.max(nw), h.max(nh)))
}

fn centered(size: (f64, f64), cx: f64, cy: f64) -> Rect {
    let mut r = Rect::new(0.0, 0.0, size.0, size.1);
    r.set_center(cx, cy);
    r
}

/// Centers of `count` slots of pitch `pitch` centered on `mid`.
fn centered_run(count: usize, pitch: f64, mid: f64) -> impl Iterator<Item = f64> {
    let span = pitch * count.saturating_sub(1) as f64;
    let start = mid - span / 2.0;
    (0..count).map(move |i| start + pitch * i as f64)
}

/// Evenly spread `count` centers so the outermost boxes (of extent `item`) touch both ends of
/// `[lo, lo + len]`. A single item sits in the middle.
fn spread(count: usize, item: f64, lo: f64, len: f64) -> Vec<f64> {
    if count <= 1 {
        return vec![lo + len / 2.0; count];
    }
    let first = lo + item / 2.0;
    let step = (len - item).max(0.0) / (count - 1) as f64;
    (0..count).map(|i| first + step * i as f64).collect()
}

/// How many items of extent `item` separated by `gap` fit in `len`.
fn fit_count(len: f64, item: f64, gap: f64) -> usize {
    (((len + gap) / (item + gap)).floor() as usize).max(1)
}

/// Single column in `order`, fixed vertical spacing; wraps into extra columns when the canvas is
/// too short.
pub(super) fn flow(order: &[usize], sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let mut rects = vec![Rect::new(0.0, 0.0, 0.0, 0.0); sizes.len()];
    if order.is_empty() {
        return rects;
    }
    let (px, py, aw, ah) = config.inner_extent();
    let (max_w, max_h) = max_dims(sizes);
    let gap = 2.0 * config.margin;

    let n = order.len();
    let rows_fit = fit_count(ah, max_h, gap);
    let columns = n.div_ceil(rows_fit);
    let rows = n.div_ceil(columns);

    let mut pitch_y = max_h + gap;
    if rows > 1 && pitch_y * (rows - 1) as f64 + max_h > ah {
        pitch_y = (ah - max_h).max(0.0) / (rows - 1) as f64;
    }
    let mut pitch_x = max_w + gap;
    if columns > 1 && pitch_x * (columns - 1) as f64 + max_w > aw {
        pitch_x = (aw - max_w).max(0.0) / (columns - 1) as f64;
    }

    let xs: Vec<f64> = centered_run(columns, pitch_x, px + aw / 2.0).collect();
    let ys: Vec<f64> = centered_run(rows, pitch_y, py + ah / 2.0).collect();
    for (slot, &v) in order.iter().enumerate() {
        let (col, row) = (slot / rows, slot % rows);
        rects[v] = centered(sizes[v], xs[col], ys[row]);
    }
    rects
}

/// Single row filling the canvas width evenly; wraps into extra rows when the row is too
/// crowded.
pub(super) fn timeline(sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let n = sizes.len();
    if n == 0 {
        return Vec::new();
    }
    let (px, py, aw, ah) = config.inner_extent();
    let (max_w, max_h) = max_dims(sizes);
    let gap = config.margin;

    let per_row = fit_count(aw, max_w, gap).min(n);
    let rows = n.div_ceil(per_row);
    let per_row = n.div_ceil(rows);

    let mut pitch_y = max_h + 2.0 * gap;
    if rows > 1 && pitch_y * (rows - 1) as f64 + max_h > ah {
        pitch_y = (ah - max_h).max(0.0) / (rows - 1) as f64;
    }
    let ys: Vec<f64> = centered_run(rows, pitch_y, py + ah / 2.0).collect();

    let mut rects = Vec::with_capacity(n);
    for (row, &cy) in ys.iter().enumerate() {
        let start = row * per_row;
        let end = (start + per_row).min(n);
        let xs = spread(end - start, max_w, px, aw);
        for (i, &cx) in xs.iter().enumerate() {
            rects.push(centered(sizes[start + i], cx, cy));
        }
    }
    rects
}

/// First half of the nodes in a column at 25% of the width, the rest at 75%. Each column spreads
/// its nodes evenly over the height.
pub(super) fn comparison(sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let n = sizes.len();
    let (_, py, _, ah) = config.inner_extent();
    let left = n.div_ceil(2);
    let columns = [
        (0..left, config.canvas_width * 0.25),
        (left..n, config.canvas_width * 0.75),
    ];

    let mut rects = vec![Rect::new(0.0, 0.0, 0.0, 0.0); n];
    for (range, cx) in columns {
        let count = range.len();
        for (k, v) in range.enumerate() {
            let cy = py + ah * (k + 1) as f64 / (count + 1) as f64;
            rects[v] = centered(sizes[v], cx, cy);
        }
    }
    rects
}

/// `ceil(sqrt(n))` columns of uniform cells, nodes centered in their cell, row-major.
pub(super) fn concept_grid(sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let n = sizes.len();
    if n == 0 {
        return Vec::new();
    }
    let (px, py, aw, ah) = config.inner_extent();
    let columns = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(columns);
    let cell_w = aw / columns as f64;
    let cell_h = ah / rows as f64;

    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let (col, row) = (i % columns, i / columns);
            centered(
                size,
                px + cell_w * (col as f64 + 0.5),
                py + cell_h * (row as f64 + 0.5),
            )
        })
        .collect()
}
