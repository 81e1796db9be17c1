/// Pre-defined scenarios for solver accuracy and failure-mode evaluation.
use quadmap::matrix::Matrix3;
use quadmap::Point2;

use crate::quads::{self, Rng};

/// A category of scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Baseline,
    Jumbled,
    Swapped,
    Identity,
    Perspective,
    Random,
    NonConvex,
    Degenerate,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Baseline,
            Category::Jumbled,
            Category::Swapped,
            Category::Identity,
            Category::Perspective,
            Category::Random,
            Category::NonConvex,
            Category::Degenerate,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Baseline => "baseline",
            Category::Jumbled => "jumbled",
            Category::Swapped => "swapped",
            Category::Identity => "identity",
            Category::Perspective => "perspective",
            Category::Random => "random",
            Category::NonConvex => "non-convex",
            Category::Degenerate => "degenerate",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::all().iter().find(|c| c.name() == name).copied()
    }
}

/// What a scenario should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// A homography reproducing every target corner within `max_residual`.
    Solves { max_residual: f64 },
    /// A failure of the given [`SolveError::kind`](quadmap::SolveError::kind).
    Fails { kind: &'static str },
}

/// A single solver scenario: two corner sets and the expected outcome.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub from: [Point2; 4],
    pub to: [Point2; 4],
    pub expect: Expectation,
    /// Ground-truth transform when the target was generated from one.
    pub known: Option<Matrix3>,
    /// Solve with the corners taken in the given order.
    pub keep_order: bool,
}

impl Scenario {
    fn solves(
        name: String,
        description: String,
        category: Category,
        from: [Point2; 4],
        to: [Point2; 4],
        max_residual: f64,
    ) -> Self {
        Self {
            name,
            description,
            category,
            from,
            to,
            expect: Expectation::Solves { max_residual },
            known: None,
            keep_order: false,
        }
    }

    fn fails(
        name: String,
        description: String,
        category: Category,
        from: [Point2; 4],
        to: [Point2; 4],
        kind: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            category,
            from,
            to,
            expect: Expectation::Fails { kind },
            known: None,
            keep_order: false,
        }
    }
}

/// The corner pair the solver was first checked against.
pub fn reference_pair() -> ([Point2; 4], [Point2; 4]) {
    (
        [
            Point2::new(2.0, 1.0),
            Point2::new(6.0, 2.0),
            Point2::new(4.0, 5.0),
            Point2::new(1.0, 4.0),
        ],
        [
            Point2::new(1.0, 2.0),
            Point2::new(6.0, 1.0),
            Point2::new(5.0, 4.0),
            Point2::new(2.0, 5.0),
        ],
    )
}

/// Build the full catalog.
pub fn all_scenarios() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(baseline_scenarios());
    scenarios.extend(jumbled_scenarios());
    scenarios.extend(swapped_scenarios());
    scenarios.extend(identity_scenarios());
    scenarios.extend(perspective_scenarios());
    scenarios.extend(random_scenarios());
    scenarios.extend(non_convex_scenarios());
    scenarios.extend(degenerate_scenarios());
    scenarios
}

/// Filter scenarios by category.
pub fn scenarios_for_category(category: Category) -> Vec<Scenario> {
    all_scenarios()
        .into_iter()
        .filter(|s| s.category == category)
        .collect()
}

fn baseline_scenarios() -> Vec<Scenario> {
    let (p, q) = reference_pair();
    vec![
        Scenario::solves(
            "baseline-reference".into(),
            "Reference pair p -> q".into(),
            Category::Baseline,
            p,
            q,
            1e-3,
        ),
        Scenario::solves(
            "baseline-unit-square".into(),
            "Unit square onto the reference target".into(),
            Category::Baseline,
            quads::square(1.0),
            q,
            1e-6,
        ),
        Scenario::solves(
            "baseline-trapezoid".into(),
            "Document-style trapezoid onto a 400x400 page".into(),
            Category::Baseline,
            [
                Point2::new(108.3, 80.2),
                Point2::new(377.3, 41.4),
                Point2::new(459.8, 251.8),
                Point2::new(193.3, 330.0),
            ],
            quads::square(400.0),
            1e-6,
        ),
    ]
}

fn jumbled_scenarios() -> Vec<Scenario> {
    let (p, q) = reference_pair();
    (0..6u64)
        .map(|seed| {
            let mut rng = Rng::new(seed);
            Scenario::solves(
                format!("jumbled-reference-{seed}"),
                format!("Reference pair with corners shuffled (seed {seed})"),
                Category::Jumbled,
                quads::jumble(&p, &mut rng),
                quads::jumble(&q, &mut rng),
                1e-3,
            )
        })
        .collect()
}

fn swapped_scenarios() -> Vec<Scenario> {
    let (p, q) = reference_pair();
    let mut out = vec![Scenario::solves(
        "swapped-reference".into(),
        "Reference pair solved q -> p".into(),
        Category::Swapped,
        q,
        p,
        1e-3,
    )];
    out.extend((0..4u64).map(|seed| {
        let mut rng = Rng::new(100 + seed);
        let a = quads::random_convex_quadrilateral(&mut rng, Point2::new(0.0, 0.0), 10.0);
        let b = quads::random_convex_quadrilateral(&mut rng, Point2::new(3.0, -2.0), 7.0);
        Scenario::solves(
            format!("swapped-random-{seed}"),
            format!("Random convex pair solved in reverse (seed {seed})"),
            Category::Swapped,
            b,
            a,
            1e-6,
        )
    }));
    out
}

fn identity_scenarios() -> Vec<Scenario> {
    let (p, _) = reference_pair();
    let mut rng = Rng::new(7);
    let r = quads::random_convex_quadrilateral(&mut rng, Point2::new(50.0, 50.0), 30.0);
    vec![
        Scenario::solves(
            "identity-reference".into(),
            "Reference quadrilateral onto itself".into(),
            Category::Identity,
            p,
            p,
            1e-9,
        ),
        Scenario::solves(
            "identity-random".into(),
            "Random convex quadrilateral onto itself".into(),
            Category::Identity,
            r,
            r,
            1e-9,
        ),
    ]
}

fn perspective_scenarios() -> Vec<Scenario> {
    (0..8u64)
        .map(|seed| {
            let mut rng = Rng::new(200 + seed);
            let h = quads::random_homography(&mut rng, 100.0);
            let from = quads::square(100.0);
            let to = from.map(|p| h.apply_unchecked(p));
            // Corners stay paired by index so the recovered transform must
            // equal the generating one.
            let mut s = Scenario::solves(
                format!("perspective-known-{seed}"),
                format!("Square through a known homography (seed {seed})"),
                Category::Perspective,
                from,
                to,
                1e-6,
            );
            s.known = Some(h.matrix);
            s.keep_order = true;
            s
        })
        .collect()
}

fn random_scenarios() -> Vec<Scenario> {
    (0..16u64)
        .map(|seed| {
            let mut rng = Rng::new(300 + seed);
            let scale = 10f64.powi((seed % 4) as i32);
            let a = quads::random_convex_quadrilateral(&mut rng, Point2::new(0.0, 0.0), scale);
            let center = Point2::new(rng.range(-scale, scale), rng.range(-scale, scale));
            let b = quads::random_convex_quadrilateral(&mut rng, center, scale);
            Scenario::solves(
                format!("random-convex-{seed}"),
                format!("Random convex pair at scale {scale} (seed {seed})"),
                Category::Random,
                a,
                b,
                1e-6 * scale,
            )
        })
        .collect()
}

fn non_convex_scenarios() -> Vec<Scenario> {
    let (p, q) = reference_pair();
    let mut out: Vec<Scenario> = (0..4u64)
        .map(|seed| {
            let mut rng = Rng::new(400 + seed);
            let dart = quads::random_dart(&mut rng, Point2::new(2.0, 2.0), 8.0);
            let (from, to, side) = if seed % 2 == 0 {
                (dart, q, "source")
            } else {
                (p, dart, "target")
            };
            Scenario::fails(
                format!("non-convex-dart-{seed}"),
                format!("Dart-shaped {side} with one corner inside (seed {seed})"),
                Category::NonConvex,
                from,
                to,
                "non_convex_input",
            )
        })
        .collect();
    out.push(Scenario::fails(
        "non-convex-fixed".into(),
        "Corner (1,1) inside the triangle (0,0), (4,0), (0,4)".into(),
        Category::NonConvex,
        [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 4.0),
        ],
        q,
        "non_convex_input",
    ));
    out
}

fn degenerate_scenarios() -> Vec<Scenario> {
    let (p, _) = reference_pair();
    vec![
        Scenario::fails(
            "degenerate-collinear".into(),
            "All four target corners on one line".into(),
            Category::Degenerate,
            p,
            [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 2.0),
                Point2::new(3.0, 3.0),
            ],
            "degenerate_input",
        ),
        Scenario::fails(
            "degenerate-coincident".into(),
            "Source corners all at one point".into(),
            Category::Degenerate,
            [Point2::new(5.0, 5.0); 4],
            p,
            "degenerate_input",
        ),
        Scenario::fails(
            "degenerate-sliver".into(),
            "Source collapsed below the collinearity tolerance".into(),
            Category::Degenerate,
            [
                Point2::new(0.0, 0.0),
                Point2::new(0.05, 0.0),
                Point2::new(0.05, 0.05),
                Point2::new(0.0, 0.05),
            ],
            p,
            "singular_matrix",
        ),
    ]
}
