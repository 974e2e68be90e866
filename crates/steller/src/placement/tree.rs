//! Hierarchical placement: depth levels top to bottom, each subtree owning a horizontal band
//! proportional to its leaf count.

use crate::config::LayoutConfig;
use crate::geometry::Rect;
use crate::graph::Topology;
use std::collections::VecDeque;

/// Spanning forest extracted from a possibly cyclic graph.
#[derive(Debug, Clone, Default)]
pub(super) struct TreeLevels {
    pub(super) roots: Vec<usize>,
    pub(super) children: Vec<Vec<usize>>,
    pub(super) depth: Vec<usize>,
    /// Roots that had to be picked because nothing else reached them.
    pub(super) synthetic_roots: Vec<usize>,
}

/// BFS from every zero-in-degree node. A node reached twice keeps its first parent; the second
/// visit ends that branch. Anything unreached gets the highest-degree unreached node as a
/// synthetic root, repeated until the whole graph is covered.
pub(super) fn assign_levels(topo: &Topology) -> TreeLevels {
    let n = topo.len();
    let mut levels = TreeLevels {
        roots: Vec::new(),
        children: vec![Vec::new(); n],
        depth: vec![0; n],
        synthetic_roots: Vec::new(),
    };
    let mut visited = vec![false; n];

    let natural: Vec<usize> = (0..n).filter(|&v| topo.in_adj[v].is_empty()).collect();
    for root in natural {
        bfs_from(topo, root, &mut visited, &mut levels);
    }

    while let Some(root) = topo.highest_degree((0..n).filter(|&v| !visited[v])) {
        tracing::debug!(root, "no unambiguous root; using synthetic root");
        levels.synthetic_roots.push(root);
        bfs_from(topo, root, &mut visited, &mut levels);
    }
    levels
}

fn bfs_from(topo: &Topology, root: usize, visited: &mut [bool], levels: &mut TreeLevels) {
    if visited[root] {
        return;
    }
    visited[root] = true;
    levels.roots.push(root);
    levels.depth[root] = 0;

    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        for &w in &topo.out_adj[v] {
            if visited[w] {
                continue;
            }
            visited[w] = true;
            levels.depth[w] = levels.depth[v] + 1;
            levels.children[v].push(w);
            queue.push_back(w);
        }
    }
}

fn leaf_counts(levels: &TreeLevels) -> Vec<usize> {
    let n = levels.children.len();
    let mut leaves = vec![1usize; n];
    // Post-order over the forest without recursion.
    let mut stack: Vec<(usize, bool)> = levels.roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((v, expanded)) = stack.pop() {
        if expanded {
            let sum: usize = levels.children[v].iter().map(|&c| leaves[c]).sum();
            leaves[v] = sum.max(1);
            continue;
        }
        stack.push((v, true));
        for &c in levels.children[v].iter().rev() {
            stack.push((c, false));
        }
    }
    leaves
}

pub(super) fn hierarchical(topo: &Topology, sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<Rect> {
    let n = topo.len();
    if n == 0 {
        return Vec::new();
    }
    let levels = assign_levels(topo);
    let leaves = leaf_counts(&levels);
    let (px, py, aw, ah) = config.inner_extent();

    // Horizontal bands: roots split the full width, children split their parent's band.
    let mut band: Vec<(f64, f64)> = vec![(px, aw); n];
    let total: usize = levels.roots.iter().map(|&r| leaves[r]).sum();
    let mut cursor = px;
    let mut queue: VecDeque<usize> = VecDeque::new();
    for &r in &levels.roots {
        let width = aw * leaves[r] as f64 / total.max(1) as f64;
        band[r] = (cursor, width);
        cursor += width;
        queue.push_back(r);
    }
    while let Some(v) = queue.pop_front() {
        let (start, width) = band[v];
        let mut cursor = start;
        for &c in &levels.children[v] {
            let w = width * leaves[c] as f64 / leaves[v] as f64;
            band[c] = (cursor, w);
            cursor += w;
            queue.push_back(c);
        }
    }

    // Vertical levels, centered as a block.
    let max_h = sizes.iter().map(|s| s.1).fold(0.0f64, f64::max);
    let depth_count = levels.depth.iter().copied().max().unwrap_or(0) + 1;
    let mut pitch = max_h + 2.0 * config.margin.max(20.0);
    if depth_count > 1 && pitch * (depth_count - 1) as f64 + max_h > ah {
        pitch = (ah - max_h).max(0.0) / (depth_count - 1) as f64;
    }
    let block = pitch * (depth_count - 1) as f64;
    let top = py + ah / 2.0 - block / 2.0;

    (0..n)
        .map(|v| {
            let (start, width) = band[v];
            let mut r = Rect::new(0.0, 0.0, sizes[v].0, sizes[v].1);
            r.set_center(start + width / 2.0, top + pitch * levels.depth[v] as f64);
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DiagramType, Graph, Node};

    fn topo(n: usize, edges: &[(usize, usize)]) -> Topology {
        let mut g = Graph::new(DiagramType::Tree);
        for i in 0..n {
            g.add_node(Node::new(format!("t{i}")));
        }
        for &(s, t) in edges {
            g.add_edge(format!("t{s}"), format!("t{t}"));
        }
        Topology::new(&g)
    }

    #[test]
    fn binary_tree_levels_and_bands() {
        let t = topo(7, &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)]);
        let levels = assign_levels(&t);
        assert_eq!(levels.roots, vec![0]);
        assert!(levels.synthetic_roots.is_empty());
        assert_eq!(levels.depth, vec![0, 1, 1, 2, 2, 2, 2]);
        assert_eq!(leaf_counts(&levels), vec![4, 2, 2, 1, 1, 1, 1]);

        let cfg = LayoutConfig::default();
        let rects = hierarchical(&t, &vec![(100.0, 40.0); 7], &cfg);
        let cx = |i: usize| rects[i].center().x;
        // Parent sits midway between its children.
        assert!((cx(1) - (cx(3) + cx(4)) / 2.0).abs() < 1e-9);
        assert!((cx(0) - (cx(1) + cx(2)) / 2.0).abs() < 1e-9);
        assert!(rects[0].y < rects[1].y && rects[1].y < rects[3].y);
    }

    #[test]
    fn cycle_without_roots_uses_highest_degree_node() {
        // 0 -> 1 -> 2 -> 0 plus 1 -> 3 -> 1: node 1 has the highest degree.
        let t = topo(4, &[(0, 1), (1, 2), (2, 0), (1, 3), (3, 1)]);
        let levels = assign_levels(&t);
        assert_eq!(levels.synthetic_roots, vec![1]);
        assert_eq!(levels.roots, vec![1]);
        assert_eq!(levels.depth[1], 0);
        assert_eq!(levels.depth[2], 1);
        assert_eq!(levels.depth[3], 1);
        assert_eq!(levels.depth[0], 2);
    }

    #[test]
    fn unreachable_cycle_gets_its_own_root() {
        // Tree 0 -> 1 plus a detached cycle 2 <-> 3.
        let t = topo(4, &[(0, 1), (2, 3), (3, 2)]);
        let levels = assign_levels(&t);
        assert_eq!(levels.roots, vec![0, 2]);
        assert_eq!(levels.synthetic_roots, vec![2]);
        assert_eq!(levels.depth, vec![0, 1, 0, 1]);
    }

    #[test]
    fn diamond_keeps_first_parent() {
        let t = topo(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let levels = assign_levels(&t);
        assert_eq!(levels.children[1], vec![3]);
        assert!(levels.children[2].is_empty());
    }
}
