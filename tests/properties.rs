//! Randomized and order-independence properties from spec §8: Euler's
//! formula for Voronoi diagrams, and idempotence of the cell-to-edge
//! mapping under insertion order.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use sweepline_voronoi::{SweepLine, Voronoi};

fn convex_hull_count(points: &[(i64, i64)]) -> usize {
    // Andrew's monotone chain; only used to compute h for the Euler
    // check, not part of the crate's own algorithm.
    let mut pts = points.to_vec();
    pts.sort();
    pts.dedup();
    if pts.len() < 3 {
        return pts.len();
    }

    let cross = |o: (i64, i64), a: (i64, i64), b: (i64, i64)| -> i64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut lower = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.len() + upper.len()
}

/// Invariant 6: V = 2n - 5 - h, within tolerance, for random
/// non-degenerate site sets.
#[test]
fn euler_formula_holds_within_tolerance_for_random_sites() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let n = 30;
        let mut coords = HashSet::new();
        let mut points = Vec::new();
        while points.len() < n {
            let x = rng.gen_range(0, 10_000);
            let y = rng.gen_range(0, 10_000);
            if coords.insert((x, y)) {
                points.push((x, y));
            }
        }

        let mut vmap = Voronoi::new(10_000, 10_000);
        for &(x, y) in &points {
            vmap.add_site(x, y).unwrap();
        }
        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);

        let mut vertices = HashSet::new();
        for cell in vmap.cells() {
            for &edge_key in vmap.cell(cell).unwrap().edges() {
                let edge = vmap.edge(edge_key).unwrap();
                if let (Some(a), Some(b)) = (edge.a, edge.b) {
                    vertices.insert((a.x, a.y));
                    vertices.insert((b.x, b.y));
                }
            }
        }

        let h = convex_hull_count(&points) as i64;
        let expected = 2 * n as i64 - 5 - h;
        let actual = vertices.len() as i64;
        assert!(
            (actual - expected).abs() <= h + 4,
            "n={} h={} expected~{} actual={}",
            n,
            h,
            expected,
            actual
        );
    }
}

/// Invariant 7: the cell-to-edge-count mapping doesn't depend on the
/// order sites were added in.
#[test]
fn cell_edge_counts_are_independent_of_insertion_order() {
    let sites = [
        (100, 100),
        (300, 100),
        (200, 300),
        (500, 150),
        (150, 400),
        (400, 400),
    ];

    let mut baseline_counts: Vec<usize> = {
        let mut vmap = Voronoi::new(1000, 1000);
        for &(x, y) in &sites {
            vmap.add_site(x, y).unwrap();
        }
        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);
        vmap.organize_all();
        let mut counts: Vec<usize> = vmap
            .cells()
            .map(|c| vmap.cell(c).unwrap().edges().len())
            .collect();
        counts.sort_unstable();
        counts
    };
    baseline_counts.sort_unstable();

    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let mut shuffled = sites;
        shuffled.shuffle(&mut rng);

        let mut vmap = Voronoi::new(1000, 1000);
        for &(x, y) in &shuffled {
            vmap.add_site(x, y).unwrap();
        }
        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);
        vmap.organize_all();

        let mut counts: Vec<usize> = vmap
            .cells()
            .map(|c| vmap.cell(c).unwrap().edges().len())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, baseline_counts);
    }
}
