//! Uniform-grid spatial index for overlap candidate search.
//!
//! Every box is registered in each cell its rectangle touches. A query walks the cells covered by
//! the query box grown by the margin, so any box closer than the margin is always a candidate.

use crate::geometry::{Rect, overlaps};
use rustc_hash::FxHashMap;

type Cell = (i64, i64);

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    margin: f64,
    cells: FxHashMap<Cell, Vec<usize>>,
    entries: FxHashMap<usize, Rect>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64, margin: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            margin: margin.max(0.0),
            cells: FxHashMap::default(),
            entries: FxHashMap::default(),
        }
    }

    /// Builds an index over `rects` (ids are slice positions) with a cell size derived from the
    /// largest node dimension plus the margin.
    pub fn build(rects: &[Rect], margin: f64) -> Self {
        let largest = rects
            .iter()
            .map(|r| r.width.max(r.height))
            .fold(0.0f64, f64::max);
        let mut index = Self::new(largest + margin, margin);
        for (id, r) in rects.iter().enumerate() {
            index.insert(id, *r);
        }
        index
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cell_range(&self, r: &Rect, grow: f64) -> (i64, i64, i64, i64) {
        let q = |v: f64| (v / self.cell_size).floor() as i64;
        (
            q(r.x - grow),
            q(r.right() + grow),
            q(r.y - grow),
            q(r.bottom() + grow),
        )
    }

    pub fn insert(&mut self, id: usize, rect: Rect) {
        if self.entries.contains_key(&id) {
            self.remove(id);
        }
        if !rect.is_finite() {
            return;
        }
        let (x0, x1, y0, y1) = self.cell_range(&rect, 0.0);
        for gx in x0..=x1 {
            for gy in y0..=y1 {
                self.cells.entry((gx, gy)).or_default().push(id);
            }
        }
        self.entries.insert(id, rect);
    }

    pub fn remove(&mut self, id: usize) -> Option<Rect> {
        let rect = self.entries.remove(&id)?;
        let (x0, x1, y0, y1) = self.cell_range(&rect, 0.0);
        for gx in x0..=x1 {
            for gy in y0..=y1 {
                if let Some(bucket) = self.cells.get_mut(&(gx, gy)) {
                    bucket.retain(|&other| other != id);
                    if bucket.is_empty() {
                        self.cells.remove(&(gx, gy));
                    }
                }
            }
        }
        Some(rect)
    }

    pub fn update(&mut self, id: usize, rect: Rect) {
        self.insert(id, rect);
    }

    /// Ids registered in any cell touched by `rect` grown by the margin. Sorted, deduplicated.
    pub fn query_near(&self, rect: &Rect) -> Vec<usize> {
        if !rect.is_finite() {
            return Vec::new();
        }
        let (x0, x1, y0, y1) = self.cell_range(rect, self.margin);
        let mut out: Vec<usize> = Vec::new();
        for gx in x0..=x1 {
            for gy in y0..=y1 {
                if let Some(bucket) = self.cells.get(&(gx, gy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Registered boxes that actually overlap `rect`, excluding `skip`.
    pub fn overlapping(&self, rect: &Rect, skip: Option<usize>) -> Vec<usize> {
        self.query_near(rect)
            .into_iter()
            .filter(|&id| Some(id) != skip)
            .filter(|id| {
                self.entries
                    .get(id)
                    .is_some_and(|other| overlaps(rect, other, self.margin))
            })
            .collect()
    }
}

/// All overlapping pairs `(i, j)` with `i < j`, in ascending order.
///
/// Uses the grid index when `rects.len() > threshold`; both paths return the same list.
pub fn overlap_pairs(rects: &[Rect], margin: f64, threshold: usize) -> Vec<(usize, usize)> {
    if rects.len() <= threshold {
        brute_force_pairs(rects, margin)
    } else {
        indexed_pairs(rects, margin)
    }
}

pub fn brute_force_pairs(rects: &[Rect], margin: f64) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if overlaps(&rects[i], &rects[j], margin) {
                out.push((i, j));
            }
        }
    }
    out
}

pub fn indexed_pairs(rects: &[Rect], margin: f64) -> Vec<(usize, usize)> {
    let index = SpatialIndex::build(rects, margin);
    let mut out = Vec::new();
    for (i, r) in rects.iter().enumerate() {
        for j in index.query_near(r) {
            if j > i && overlaps(r, &rects[j], margin) {
                out.push((i, j));
            }
        }
    }
    out
}

/// Pairs whose boxes are within `range` of each other on both axes (a looser neighborhood than
/// an overlap). Used for repulsion.
pub(crate) fn pairs_within(rects: &[Rect], range: f64, threshold: usize) -> Vec<(usize, usize)> {
    overlap_pairs(rects, range, threshold)
}
