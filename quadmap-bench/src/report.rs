/// Report generation: terminal, JSON output for scenario results.
use crate::catalog::{Expectation, Scenario};
use crate::metrics::{self, ScenarioResult};

/// Summary of a single scenario run.
#[derive(Debug, serde::Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub category: String,
    pub passed: bool,
    /// `"solve"` or the expected error kind.
    pub expected: String,
    /// `"solved"` or the error kind actually produced.
    pub outcome: String,
    pub max_residual: f64,
    pub mean_residual: f64,
    pub inverse_consistent: Option<bool>,
    pub known_match: Option<bool>,
    pub solve_time_us: u64,
    /// Residual bound applied; absent for expected failures.
    pub threshold: Option<f64>,
}

/// Full report across all scenarios.
#[derive(Debug, serde::Serialize)]
pub struct FullReport {
    pub scenarios: Vec<ScenarioReport>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl FullReport {
    pub fn from_scenarios(scenarios: Vec<ScenarioReport>) -> Self {
        let total = scenarios.len();
        let passed = scenarios.iter().filter(|s| s.passed).count();
        let failed = total - passed;
        Self {
            scenarios,
            total,
            passed,
            failed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Print a terminal table summarizing results.
pub fn print_terminal(report: &FullReport) {
    println!(
        "{:<30} {:<18} {:<18} {:>10} {:>5} {:>5} {:>6}",
        "Scenario", "Expected", "Outcome", "MaxResid", "Inv", "Known", "Status"
    );
    println!("{}", "-".repeat(98));

    for s in &report.scenarios {
        let status = if s.passed { "PASS" } else { "FAIL" };
        println!(
            "{:<30} {:<18} {:<18} {:>10.2e} {:>5} {:>5} {:>6}",
            truncate(&s.name, 30),
            truncate(&s.expected, 18),
            truncate(&s.outcome, 18),
            s.max_residual,
            flag(s.inverse_consistent),
            flag(s.known_match),
            status,
        );
    }

    println!("{}", "-".repeat(98));
    println!(
        "Total: {} | Passed: {} | Failed: {}",
        report.total, report.passed, report.failed
    );
}

/// Render report as JSON.
pub fn to_json(report: &FullReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Build a ScenarioReport from a scenario, its result, and a threshold
/// override (ignored unless positive).
pub fn scenario_report(
    scenario: &Scenario,
    result: &ScenarioResult,
    threshold: f64,
) -> ScenarioReport {
    let (expected, bound) = match &scenario.expect {
        Expectation::Solves { max_residual } => (
            "solve".to_string(),
            Some(if threshold > 0.0 { threshold } else { *max_residual }),
        ),
        Expectation::Fails { kind } => (kind.to_string(), None),
    };
    let outcome = match &result.error_kind {
        Some(kind) => kind.clone(),
        None => "solved".to_string(),
    };

    ScenarioReport {
        name: scenario.name.clone(),
        category: scenario.category.name().to_string(),
        passed: metrics::meets_expectation(scenario, result, threshold),
        expected,
        outcome,
        max_residual: result.max_residual,
        mean_residual: result.mean_residual,
        inverse_consistent: result.inverse_consistent,
        known_match: result.known_match,
        solve_time_us: result.solve_time_us,
        threshold: bound,
    }
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "NO",
        None => "-",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
