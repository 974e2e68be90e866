use steller::spatial::brute_force_pairs;
use steller::{LayoutConfig, Rect, ResolutionStrategy, Resolver, ResolverState};

fn coincident(n: usize) -> Vec<Rect> {
    vec![Rect::new(880.0, 510.0, 160.0, 60.0); n]
}

fn assert_separated(rects: &[Rect], config: &LayoutConfig) {
    assert!(brute_force_pairs(rects, config.margin).is_empty());
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            let (ca, cb) = (a.center(), b.center());
            assert!((ca.x - cb.x).hypot(ca.y - cb.y) >= config.margin);
        }
        assert!(a.within(config.canvas_width, config.canvas_height));
    }
}

#[test]
fn ten_coincident_nodes_are_separated_by_every_strategy() {
    let config = LayoutConfig::default();
    let ring: Vec<(usize, usize)> = (0..10).map(|i| (i, (i + 1) % 10)).collect();
    for strategy in [
        ResolutionStrategy::GridSnap,
        ResolutionStrategy::ForceDirected,
        ResolutionStrategy::Spiral,
        ResolutionStrategy::Adaptive,
        ResolutionStrategy::Phased,
    ] {
        let mut rects = coincident(10);
        let outcome = Resolver::new(&config).run(strategy, &mut rects, &ring);
        assert_eq!(outcome.state, ResolverState::Converged, "{strategy}: {outcome:?}");
        assert!(outcome.iterations <= config.max_iterations, "{strategy}");
        assert_eq!(outcome.remaining_overlaps, 0);
        assert_separated(&rects, &config);
    }
}

#[test]
fn resolution_is_reproducible_for_a_fixed_seed() {
    let config = LayoutConfig::default();
    let run = |seed: u64| {
        let cfg = LayoutConfig { seed, ..config.clone() };
        let mut rects = coincident(6);
        Resolver::new(&cfg).run(ResolutionStrategy::ForceDirected, &mut rects, &[]);
        rects
    };
    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}

#[test]
fn impossible_packing_exhausts_the_budget_and_says_so() {
    let config = LayoutConfig {
        canvas_width: 300.0,
        canvas_height: 100.0,
        max_iterations: 40,
        ..LayoutConfig::default()
    };
    let mut rects = vec![Rect::new(0.0, 0.0, 120.0, 80.0); 6];
    let outcome = Resolver::new(&config).run(ResolutionStrategy::Adaptive, &mut rects, &[]);
    assert_eq!(outcome.state, ResolverState::BudgetExhausted);
    assert!(outcome.remaining_overlaps > 0);
    assert_eq!(outcome.iterations, 40);
    assert!(outcome.warnings.iter().any(|w| w.contains("budget")));
    for r in &rects {
        assert!(r.within(config.canvas_width, config.canvas_height));
    }
}

#[test]
fn crowded_network_layout_falls_back_and_warns() {
    let config = LayoutConfig {
        canvas_width: 400.0,
        canvas_height: 200.0,
        max_iterations: 30,
        ..LayoutConfig::default()
    };
    let mut g = steller::Graph::new(steller::DiagramType::Network);
    for i in 0..12 {
        g.add_node(steller::Node::new(format!("n{i}")).with_size(120.0, 60.0));
    }
    let result = steller::layout(&g, &config).unwrap();
    assert!(!result.zero_overlap_guarantee);
    assert!(result.diagnostics.fallback_used);
    assert!(!result.warnings.is_empty());
    assert!(result.quality.overlap_count > 0);
}
