/// End-to-end integration tests: build scenarios → solve → evaluate metrics.
use quadmap::{Point2, SolverConfig};
use quadmap_bench::catalog::{self, Category, Expectation};
use quadmap_bench::metrics;
use quadmap_bench::quads::{self, Rng};
use quadmap_bench::report::{self, FullReport};

#[test]
fn every_catalog_scenario_meets_its_expectation() {
    let config = SolverConfig::default();
    let reports: Vec<_> = catalog::all_scenarios()
        .iter()
        .map(|s| report::scenario_report(s, &metrics::evaluate(s, &config), 0.0))
        .collect();
    let failures: Vec<_> = reports
        .iter()
        .filter(|r| !r.passed)
        .map(|r| format!("{} (expected {}, got {})", r.name, r.expected, r.outcome))
        .collect();
    assert!(failures.is_empty(), "failing scenarios: {failures:?}");
    assert!(FullReport::from_scenarios(reports).all_passed());
}

#[test]
fn solvable_scenarios_are_inverse_consistent() {
    let config = SolverConfig::default();
    for s in catalog::all_scenarios() {
        if let Expectation::Solves { .. } = s.expect {
            let result = metrics::evaluate(&s, &config);
            assert_eq!(
                result.inverse_consistent,
                Some(true),
                "{} is not inverse consistent",
                s.name
            );
        }
    }
}

#[test]
fn perspective_scenarios_recover_the_generator() {
    let config = SolverConfig::default();
    for s in catalog::scenarios_for_category(Category::Perspective) {
        let result = metrics::evaluate(&s, &config);
        assert_eq!(result.known_match, Some(true), "{}", s.name);
        assert!(result.max_residual < 1e-6, "{}: {}", s.name, result.max_residual);
    }
}

#[test]
fn jumbled_reference_matches_baseline_labels() {
    let (p, q) = catalog::reference_pair();
    let solver = quadmap::Solver::default();
    let baseline = solver.solve(&p, &q).unwrap();
    for s in catalog::scenarios_for_category(Category::Jumbled) {
        let sol = solver.solve(&s.from, &s.to).unwrap();
        assert_eq!(sol.from, baseline.from, "{}", s.name);
        assert_eq!(sol.to, baseline.to, "{}", s.name);
    }
}

#[test]
fn reference_pair_lands_on_exact_targets() {
    let (p, q) = catalog::reference_pair();
    let sol = quadmap::perspective_transform(&p, &q).unwrap();
    for (src, dst) in p.iter().zip(&q) {
        let got = sol.homography.apply(*src).unwrap();
        assert!(got.distance(dst) < 1e-9, "{src:?} -> {got:?}, want {dst:?}");
    }
    assert!((sol.s - 11.0 / 13.0).abs() < 1e-12);
    assert!((sol.t - 0.5).abs() < 1e-12);
}

#[test]
fn random_pairs_round_trip_at_many_scales() {
    let solver = quadmap::Solver::default();
    let mut rng = Rng::new(4242);
    for i in 0..200 {
        let radius = 10f64.powi(i % 4);
        let a = quads::random_convex_quadrilateral(&mut rng, Point2::ORIGIN, radius);
        let center = Point2::new(radius, -radius);
        let b = quads::random_convex_quadrilateral(&mut rng, center, radius);
        let sol = solver
            .solve(&quads::jumble(&a, &mut rng), &quads::jumble(&b, &mut rng))
            .unwrap_or_else(|e| panic!("pair {i} at radius {radius}: {e}"));
        assert!(
            sol.max_residual() < 1e-7 * radius,
            "pair {i}: residual {}",
            sol.max_residual()
        );
    }
}

#[test]
fn arbitrary_pairs_solve_accurately_or_fail_typed() {
    let solver = quadmap::Solver::default();
    let mut rng = Rng::new(9001);
    let mut solved = 0;
    for i in 0..2000 {
        let magnitude = [1.0, 10.0, 100.0, 1e3, 1e5][i % 5];
        let from = quads::random_quadrilateral(&mut rng, magnitude);
        let to = quads::random_quadrilateral(&mut rng, magnitude);
        match solver.solve(&from, &to) {
            Ok(sol) => {
                solved += 1;
                assert!(sol.homography.matrix.is_finite(), "pair {i}");
                let worst = sol.max_residual();
                assert!(
                    worst <= 1e-6 * magnitude,
                    "pair {i} at magnitude {magnitude}: residual {worst}, s={}, t={}",
                    sol.s,
                    sol.t
                );
            }
            Err(err) => assert!(
                ["non_convex_input", "singular_matrix", "degenerate_input"]
                    .contains(&err.kind()),
                "pair {i}: {err}"
            ),
        }
    }
    assert!(solved > 0);
}

#[test]
fn darts_fail_as_non_convex() {
    let solver = quadmap::Solver::default();
    let (p, _) = catalog::reference_pair();
    let mut rng = Rng::new(77);
    for _ in 0..50 {
        let dart = quads::random_dart(&mut rng, Point2::new(3.0, 3.0), 5.0);
        let err = solver.solve(&p, &dart).unwrap_err();
        assert_eq!(err.kind(), "non_convex_input");
        assert_eq!(err.role(), quadmap::QuadRole::To);
    }
}
