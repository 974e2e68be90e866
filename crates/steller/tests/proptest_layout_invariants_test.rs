use proptest::prelude::*;
use steller::spatial::{brute_force_pairs, indexed_pairs, overlap_pairs};
use steller::{DiagramType, Graph, LayoutConfig, Node, Rect};

const DIAGRAM_TYPES: [DiagramType; 7] = [
    DiagramType::Flow,
    DiagramType::Tree,
    DiagramType::Timeline,
    DiagramType::Network,
    DiagramType::Comparison,
    DiagramType::ConceptGrid,
    DiagramType::Auto,
];

fn arb_graph() -> impl Strategy<Value = Graph> {
    (
        0usize..DIAGRAM_TYPES.len(),
        prop::collection::vec((20.0f64..220.0, 20.0f64..90.0), 0..24),
        prop::collection::vec((any::<usize>(), any::<usize>()), 0..40),
    )
        .prop_map(|(ty, sizes, raw_edges)| {
            let mut g = Graph::new(DIAGRAM_TYPES[ty]);
            for (i, (w, h)) in sizes.iter().enumerate() {
                g.add_node(Node::new(format!("v{i}")).with_size(*w, *h));
            }
            let n = sizes.len();
            if n > 0 {
                for (s, t) in raw_edges {
                    g.add_edge(format!("v{}", s % n), format!("v{}", t % n));
                }
            }
            g
        })
}

fn arb_rects() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec(
        (0.0f64..600.0, 0.0f64..400.0, 1.0f64..120.0, 1.0f64..60.0),
        0..80,
    )
    .prop_map(|v| v.into_iter().map(|(x, y, w, h)| Rect::new(x, y, w, h)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn layouts_are_in_bounds_and_overlap_free_or_warned(g in arb_graph()) {
        let config = LayoutConfig::default();
        let result = steller::layout(&g, &config).unwrap();
        prop_assert_eq!(result.nodes.len(), g.nodes.len());
        prop_assert_eq!(result.edges.len(), g.edges.len());

        let rects: Vec<Rect> = result.nodes.iter().map(|n| n.rect()).collect();
        for r in &rects {
            prop_assert!(r.within(config.canvas_width, config.canvas_height), "{:?}", r);
        }
        let overlaps = brute_force_pairs(&rects, config.margin);
        prop_assert_eq!(result.zero_overlap_guarantee, overlaps.is_empty());
        if !result.zero_overlap_guarantee {
            prop_assert!(!result.warnings.is_empty());
        }
    }

    #[test]
    fn indexed_detection_matches_brute_force(rects in arb_rects(), margin in 0.0f64..40.0) {
        let brute = brute_force_pairs(&rects, margin);
        prop_assert_eq!(&indexed_pairs(&rects, margin), &brute);
        prop_assert_eq!(&overlap_pairs(&rects, margin, 0), &brute);
    }
}
