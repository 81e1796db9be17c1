use clap::{Parser, Subcommand};
use log::{debug, info};
use rayon::prelude::*;

use quadmap::{Point2, Solver, SolverConfig};

use quadmap_bench::catalog::{self, Category, Scenario};
use quadmap_bench::metrics;
use quadmap_bench::quads::{self, Rng};
use quadmap_bench::report::{self, FullReport};

#[derive(Parser)]
#[command(name = "quadmap-bench", about = "Quadrilateral homography test harness")]
struct Cli {
    /// Log solver internals to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run test scenarios and output results.
    Run {
        /// Filter by category name.
        #[arg(long)]
        category: Option<String>,
        /// Filter by scenario name pattern (substring match).
        #[arg(long)]
        scenario: Option<String>,
        /// Output format: terminal, json.
        #[arg(long, default_value = "terminal")]
        format: String,
        /// Max corner residual pass threshold (0 uses each scenario's own).
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
        /// Only show failures.
        #[arg(long)]
        quiet: bool,
    },
    /// List available scenarios.
    List {
        /// Filter by category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Run all scenarios and exit with code 1 on any failure.
    Regression {
        /// Filter by category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Solve a single pair and print every intermediate quantity.
    Explore {
        /// Source corners, four `x,y` pairs.
        #[arg(
            long,
            num_args = 4,
            value_parser = parse_point,
            allow_hyphen_values = true,
            requires = "to"
        )]
        from: Vec<Point2>,
        /// Destination corners, four `x,y` pairs.
        #[arg(
            long,
            num_args = 4,
            value_parser = parse_point,
            allow_hyphen_values = true,
            requires = "from"
        )]
        to: Vec<Point2>,
        /// Generate a random convex pair from this seed when no corners are given.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Radius of generated quadrilaterals.
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
        /// Anchor point for corner ordering.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        anchor: Option<Point2>,
        /// Output format: terminal, json.
        #[arg(long, default_value = "terminal")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Run {
            category,
            scenario,
            format,
            threshold,
            quiet,
        } => cmd_run(category, scenario, &format, threshold, quiet),
        Command::List { category } => cmd_list(category),
        Command::Regression { category } => cmd_regression(category),
        Command::Explore {
            from,
            to,
            seed,
            radius,
            anchor,
            format,
        } => cmd_explore(from, to, seed, radius, anchor, &format),
    }
}

fn parse_point(s: &str) -> Result<Point2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Point2::new(x, y))
}

fn filter_scenarios(category: Option<String>, scenario: Option<String>) -> Vec<Scenario> {
    let mut scenarios = if let Some(cat_name) = &category {
        let cat =
            Category::from_name(cat_name).unwrap_or_else(|| panic!("unknown category: {cat_name}"));
        catalog::scenarios_for_category(cat)
    } else {
        catalog::all_scenarios()
    };

    if let Some(pattern) = &scenario {
        scenarios.retain(|s| s.name.contains(pattern.as_str()));
    }

    scenarios
}

fn run_all(scenarios: &[Scenario], threshold: f64) -> Vec<report::ScenarioReport> {
    let config = SolverConfig::default();
    scenarios
        .par_iter()
        .map(|s| {
            let result = metrics::evaluate(s, &config);
            debug!("{}: {:?}", s.name, result);
            report::scenario_report(s, &result, threshold)
        })
        .collect()
}

fn cmd_run(
    category: Option<String>,
    scenario: Option<String>,
    format: &str,
    threshold: f64,
    quiet: bool,
) {
    let scenarios = filter_scenarios(category, scenario);
    info!("running {} scenarios", scenarios.len());

    let mut reports = run_all(&scenarios, threshold);
    if quiet {
        reports.retain(|r| !r.passed);
    }

    let full = FullReport::from_scenarios(reports);

    match format {
        "json" => println!("{}", report::to_json(&full)),
        _ => report::print_terminal(&full),
    }
}

fn cmd_list(category: Option<String>) {
    let scenarios = filter_scenarios(category, None);
    println!("{:<30} {:<13} Description", "Name", "Category");
    println!("{}", "-".repeat(80));
    for s in &scenarios {
        println!("{:<30} {:<13} {}", s.name, s.category.name(), s.description);
    }
    println!("\nTotal: {} scenarios", scenarios.len());
}

fn cmd_regression(category: Option<String>) {
    let scenarios = filter_scenarios(category, None);
    let full = FullReport::from_scenarios(run_all(&scenarios, 0.0));
    report::print_terminal(&full);

    if !full.all_passed() {
        std::process::exit(1);
    }
}

fn cmd_explore(
    from: Vec<Point2>,
    to: Vec<Point2>,
    seed: u64,
    radius: f64,
    anchor: Option<Point2>,
    format: &str,
) {
    let (from, to) = match (<[Point2; 4]>::try_from(from), <[Point2; 4]>::try_from(to)) {
        (Ok(from), Ok(to)) => (from, to),
        _ => {
            let mut rng = Rng::new(seed);
            let from = quads::random_convex_quadrilateral(&mut rng, Point2::ORIGIN, radius);
            let center = Point2::new(rng.range(-radius, radius), rng.range(-radius, radius));
            let to = quads::random_convex_quadrilateral(&mut rng, center, radius);
            (from, to)
        }
    };

    let mut config = SolverConfig::default();
    if let Some(anchor) = anchor {
        config.anchor = anchor;
    }
    let solver = Solver::new(config);

    let start = std::time::Instant::now();
    let outcome = solver.solve(&from, &to);
    let elapsed = start.elapsed();

    match format {
        "json" => {
            let value = match &outcome {
                Ok(solution) => serde_json::json!({
                    "input": { "from": from, "to": to },
                    "solution": solution,
                    "residuals": solution.residuals(),
                    "solve_time_us": elapsed.as_micros() as u64,
                }),
                Err(err) => serde_json::json!({
                    "input": { "from": from, "to": to },
                    "error": { "kind": err.kind(), "role": err.role(), "message": err.to_string() },
                }),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&value)
                    .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
            );
        }
        _ => {
            println!("from: {}", fmt_corners(&from));
            println!("to:   {}", fmt_corners(&to));
            println!();
            match &outcome {
                Ok(solution) => {
                    println!("ordered from: {}", fmt_corners(&solution.from.points()));
                    println!("ordered to:   {}", fmt_corners(&solution.to.points()));
                    println!("s = {:.6}, t = {:.6}", solution.s, solution.t);
                    println!("H =");
                    for row in &solution.homography.matrix.data {
                        println!("  [{:>14.6e} {:>14.6e} {:>14.6e}]", row[0], row[1], row[2]);
                    }
                    let residuals = solution.residuals();
                    println!(
                        "residuals: {:.2e} {:.2e} {:.2e} {:.2e}",
                        residuals[0], residuals[1], residuals[2], residuals[3]
                    );
                }
                Err(err) => println!("failed ({}): {err}", err.kind()),
            }
            println!("Solve time: {:.1} us", elapsed.as_secs_f64() * 1e6);
        }
    }
}

fn fmt_corners(points: &[Point2; 4]) -> String {
    points
        .iter()
        .map(|p| format!("({:.4}, {:.4})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}
