use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use quadmap::{PerspectiveSolution, Point2, Quadrilateral, SolveError, Solver, SolverConfig};

/// Solve the perspective transform between two quadrilaterals
#[derive(Parser)]
#[command(name = "quadmap", version)]
struct Args {
    /// Source corners, four `x,y` pairs in any order
    #[arg(long, num_args = 4, value_parser = parse_point, allow_hyphen_values = true)]
    from: Vec<Point2>,

    /// Destination corners, four `x,y` pairs in any order
    #[arg(long, num_args = 4, value_parser = parse_point, allow_hyphen_values = true)]
    to: Vec<Point2>,

    /// JSON file with `from`, `to` and optional `apply` point lists
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    input: Option<PathBuf>,

    /// Solver config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Anchor point for corner ordering, overrides the config
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    anchor: Option<Point2>,

    /// Take corners as v00, v10, v11, v01 without reordering
    #[arg(long)]
    keep_order: bool,

    /// Input and output use y-down coordinates in a frame of this height
    #[arg(long)]
    flip_y: Option<f64>,

    /// Extra points to map through the solved transform
    #[arg(long = "apply", value_parser = parse_point, allow_hyphen_values = true)]
    apply: Vec<Point2>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log solver details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize)]
struct InputFile {
    from: [[f64; 2]; 4],
    to: [[f64; 2]; 4],
    #[serde(default)]
    apply: Vec<[f64; 2]>,
}

#[derive(Serialize)]
struct OutputResult {
    homography: [[f64; 3]; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<[[f64; 3]; 3]>,
    from: OutputQuad,
    to: OutputQuad,
    s: f64,
    t: f64,
    residuals: [f64; 4],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mapped: Vec<OutputMapped>,
}

#[derive(Serialize)]
struct OutputQuad {
    v00: [f64; 2],
    v10: [f64; 2],
    v11: [f64; 2],
    v01: [f64; 2],
}

#[derive(Serialize)]
struct OutputMapped {
    point: [f64; 2],
    /// `None` when the point maps to infinity.
    image: Option<[f64; 2]>,
}

#[derive(Serialize)]
struct OutputError {
    kind: &'static str,
    role: quadmap::QuadRole,
    message: String,
}

/// Coordinate conversion between the caller's frame and the solver's y-up frame.
#[derive(Clone, Copy)]
struct Frame {
    flip_height: Option<f64>,
}

impl Frame {
    fn to_solver(self, p: Point2) -> Point2 {
        match self.flip_height {
            Some(h) => p.flip_y(h),
            None => p,
        }
    }

    /// Flipping is its own inverse.
    fn from_solver(self, p: Point2) -> Point2 {
        self.to_solver(p)
    }

    fn quad(self, q: &Quadrilateral) -> OutputQuad {
        OutputQuad {
            v00: self.from_solver(q.v00).into(),
            v10: self.from_solver(q.v10).into(),
            v11: self.from_solver(q.v11).into(),
            v01: self.from_solver(q.v01).into(),
        }
    }
}

fn parse_point(s: &str) -> Result<Point2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Point2::new(x, y))
}

fn corners(points: &[Point2], name: &str) -> Result<[Point2; 4]> {
    points
        .try_into()
        .with_context(|| format!("--{name} needs exactly 4 points, got {}", points.len()))
}

fn load_config(args: &Args) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            SolverConfig::from_toml(&text)
                .with_context(|| format!("invalid config: {}", path.display()))?
        }
        None => SolverConfig::default(),
    };
    if let Some(anchor) = args.anchor {
        config.anchor = anchor;
    }
    if args.keep_order {
        config.canonicalize = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_points(args: &Args) -> Result<([Point2; 4], [Point2; 4], Vec<Point2>)> {
    if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display()))?;
        let input: InputFile = serde_json::from_str(&text)
            .with_context(|| format!("invalid input JSON: {}", path.display()))?;
        let mut apply: Vec<Point2> = input.apply.into_iter().map(Point2::from).collect();
        apply.extend(args.apply.iter().copied());
        return Ok((
            input.from.map(Point2::from),
            input.to.map(Point2::from),
            apply,
        ));
    }
    if args.from.is_empty() || args.to.is_empty() {
        bail!("either --input or both --from and --to are required");
    }
    Ok((
        corners(&args.from, "from")?,
        corners(&args.to, "to")?,
        args.apply.clone(),
    ))
}

fn render(solution: &PerspectiveSolution, frame: Frame, extra: &[Point2]) -> OutputResult {
    let mapped = extra
        .iter()
        .map(|&p| OutputMapped {
            point: p.into(),
            image: solution
                .homography
                .apply(frame.to_solver(p))
                .map(|q| frame.from_solver(q).into()),
        })
        .collect();

    OutputResult {
        homography: solution.homography.matrix.data,
        normalized: solution.homography.normalized().map(|h| h.matrix.data),
        from: frame.quad(&solution.from),
        to: frame.quad(&solution.to),
        s: solution.s,
        t: solution.t,
        residuals: solution.residuals(),
        mapped,
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&args)?;
    debug!("solver config: {config:?}");
    let (from, to, extra) = load_points(&args)?;

    let frame = Frame {
        flip_height: args.flip_y,
    };
    let from = from.map(|p| frame.to_solver(p));
    let to = to.map(|p| frame.to_solver(p));

    let solver = Solver::new(config);
    match solver.solve(&from, &to) {
        Ok(solution) => {
            info!(
                "solved: s = {}, t = {}, max residual = {:e}",
                solution.s,
                solution.t,
                solution.max_residual()
            );
            print_json(&render(&solution, frame, &extra), args.pretty)
        }
        Err(err) => {
            report_failure(&err, args.pretty)?;
            std::process::exit(2);
        }
    }
}

fn report_failure(err: &SolveError, pretty: bool) -> Result<()> {
    eprintln!("error: {err}");
    let out = OutputError {
        kind: err.kind(),
        role: err.role(),
        message: err.to_string(),
    };
    print_json(&serde_json::json!({ "error": out }), pretty)
}
