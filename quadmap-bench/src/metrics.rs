/// Solver quality metrics: corner residuals, inverse consistency, ground-truth match.
use std::time::Instant;

use quadmap::matrix::Matrix3;
use quadmap::{PerspectiveSolution, SolveError, Solver, SolverConfig};
use serde::{Deserialize, Serialize};

use crate::catalog::{Expectation, Scenario};

/// Relative tolerance for comparing transforms up to scale.
pub const MATRIX_TOLERANCE: f64 = 1e-6;

/// Result of running the solver on a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Whether the solver produced a transform.
    pub solved: bool,
    /// [`SolveError::kind`] of the failure, if any.
    pub error_kind: Option<String>,
    /// Display form of the failure, if any.
    pub error: Option<String>,
    /// Per-corner distance between `H * from.vXY` and `to.vXY`.
    pub residuals: Option<[f64; 4]>,
    /// Maximum corner residual (0 when unsolved).
    pub max_residual: f64,
    /// Mean corner residual (0 when unsolved).
    pub mean_residual: f64,
    /// Convexity scalars of the solved pair.
    pub s: Option<f64>,
    pub t: Option<f64>,
    /// Whether solving the swapped pair gave a scalar multiple of the inverse.
    pub inverse_consistent: Option<bool>,
    /// Whether the transform equals the generating one up to scale.
    pub known_match: Option<bool>,
    /// Solve time in microseconds.
    pub solve_time_us: u64,
}

/// Solver used for a scenario: `base` with the scenario's ordering mode.
pub fn solver_for(scenario: &Scenario, base: &SolverConfig) -> Solver {
    let mut config = base.clone();
    if scenario.keep_order {
        config.canonicalize = false;
    }
    Solver::new(config)
}

/// Run the solver on a scenario and measure the outcome.
pub fn evaluate(scenario: &Scenario, base: &SolverConfig) -> ScenarioResult {
    let solver = solver_for(scenario, base);

    let start = Instant::now();
    let outcome = solver.solve(&scenario.from, &scenario.to);
    let solve_time_us = start.elapsed().as_micros() as u64;

    match outcome {
        Ok(solution) => solved(&solver, scenario, &solution, solve_time_us),
        Err(err) => failed(&err, solve_time_us),
    }
}

/// Whether a result meets the scenario's expectation.
///
/// `threshold` overrides the scenario's residual bound when positive.
pub fn meets_expectation(scenario: &Scenario, result: &ScenarioResult, threshold: f64) -> bool {
    match &scenario.expect {
        Expectation::Solves { max_residual } => {
            let bound = if threshold > 0.0 {
                threshold
            } else {
                *max_residual
            };
            result.solved
                && result.max_residual <= bound
                && result.inverse_consistent != Some(false)
                && result.known_match != Some(false)
        }
        Expectation::Fails { kind } => result.error_kind.as_deref() == Some(*kind),
    }
}

fn solved(
    solver: &Solver,
    scenario: &Scenario,
    solution: &PerspectiveSolution,
    solve_time_us: u64,
) -> ScenarioResult {
    let residuals = solution.residuals();
    let max_residual = residuals.iter().cloned().fold(0.0_f64, f64::max);
    let mean_residual = residuals.iter().sum::<f64>() / residuals.len() as f64;

    let matrix = &solution.homography.matrix;
    let inverse_consistent = Some(inverse_consistent(solver, scenario, matrix));
    let known_match = scenario
        .known
        .map(|known| matrix.is_scalar_multiple_of(&known, MATRIX_TOLERANCE));

    ScenarioResult {
        solved: true,
        error_kind: None,
        error: None,
        residuals: Some(residuals),
        max_residual,
        mean_residual,
        s: Some(solution.s),
        t: Some(solution.t),
        inverse_consistent,
        known_match,
        solve_time_us,
    }
}

fn failed(err: &SolveError, solve_time_us: u64) -> ScenarioResult {
    ScenarioResult {
        solved: false,
        error_kind: Some(err.kind().to_string()),
        error: Some(err.to_string()),
        residuals: None,
        max_residual: 0.0,
        mean_residual: 0.0,
        s: None,
        t: None,
        inverse_consistent: None,
        known_match: None,
        solve_time_us,
    }
}

/// Solve `to -> from` and compare against the inverse of `forward`.
///
/// Corner labels depend only on each quadrilateral, so the swapped solve
/// pairs the same corners. The adjugate stands in for the inverse since
/// both agree up to scale.
fn inverse_consistent(solver: &Solver, scenario: &Scenario, forward: &Matrix3) -> bool {
    match solver.solve(&scenario.to, &scenario.from) {
        Ok(back) => back
            .homography
            .matrix
            .is_scalar_multiple_of(&forward.adjugate(), MATRIX_TOLERANCE),
        Err(_) => false,
    }
}
