mod prompt;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use env_logger::Builder;

use lpplot_core::{
    Analysis, ConstraintError, ConstraintInput, ObjectiveSpec, PlotConfig, SolveResult, SolveStatus, ViewWindow,
    WindowConfig, analyze,
};
use lpplot_solver::{LpSolver, Solver, VertexSolver};
use prompt::{MAX_CONSTRAINTS, MIN_CONSTRAINTS, Prompter};

#[derive(Parser)]
#[command(name = "lpplot", version)]
#[command(about = "Solve a two-variable linear program and plot its feasible region", long_about = None)]
struct Cli {
    /// Objective, e.g. "max 3x + 5y". Without it the problem is read interactively
    #[arg(short, long)]
    objective: Option<String>,

    /// Constraint, e.g. "x + 2y <= 14" (repeat 2 to 4 times)
    #[arg(short = 'c', long = "constraint", requires = "objective")]
    constraints: Vec<String>,

    /// Where to write the SVG plot
    #[arg(long, default_value = "lp_plot.svg")]
    output: PathBuf,

    /// LP method used for the solve
    #[arg(short, long, value_enum, default_value_t = Method::Simplex)]
    method: Method,

    /// Output format for the result
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    format: Format,

    /// Samples per axis for the feasible region
    #[arg(long, default_value_t = 400)]
    resolution: usize,

    /// Plot width in pixels
    #[arg(long, default_value_t = 1000)]
    width: usize,

    /// Plot height in pixels
    #[arg(long, default_value_t = 800)]
    height: usize,

    /// Factor applied to the largest intercept when sizing the axes
    #[arg(long, default_value_t = 1.5)]
    margin: f64,

    /// Smallest axis extent before the margin is applied
    #[arg(long, default_value_t = 10.0)]
    floor: f64,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    /// Two-phase tableau simplex
    Simplex,
    /// Enumerate the vertices of the plane region
    Vertex,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    objective: &'a ObjectiveSpec,
    result: &'a SolveResult,
    issues: &'a [ConstraintError],
    window: &'a ViewWindow,
    output: &'a PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .init();

    if !(cli.margin.is_finite() && cli.margin >= 1.0) {
        bail!("--margin must be a finite number of at least 1, got {}", cli.margin);
    }
    if !(cli.floor.is_finite() && cli.floor > 0.0) {
        bail!("--floor must be a finite positive number, got {}", cli.floor);
    }

    let (objective, inputs) = match &cli.objective {
        Some(objective) => from_flags(objective, &cli.constraints)?,
        None => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());
            prompter.say("Welcome to the Linear Programming Solver with Feasible Region Plotter!")?;
            let objective = prompter.objective()?;
            let inputs = prompter.constraints()?;
            (objective, inputs)
        }
    };

    let solver: Box<dyn LpSolver> = match cli.method {
        Method::Simplex => Box::new(Solver::new()),
        Method::Vertex => Box::new(VertexSolver::new()),
    };
    let config = PlotConfig::default()
        .with_resolution(cli.resolution)
        .with_size(cli.width, cli.height)
        .with_window(WindowConfig::default().with_margin(cli.margin).with_floor(cli.floor));

    log::info!("solving {} with {} constraints", objective.banner(), inputs.len());
    let analysis = analyze(&objective, &inputs, &config, solver.as_ref());

    analysis
        .save_svg(&cli.output, &config)
        .with_context(|| format!("Writing plot to {}", cli.output.display()))?;

    match cli.format {
        Format::Pretty => print_pretty(&analysis, &cli),
        Format::Json => {
            let report = Report {
                objective: &analysis.objective,
                result: &analysis.result,
                issues: &analysis.formulation.issues,
                window: &analysis.window,
                output: &cli.output,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn from_flags(objective: &str, constraints: &[String]) -> Result<(ObjectiveSpec, Vec<ConstraintInput>)> {
    let count = constraints.len();
    if !(MIN_CONSTRAINTS..=MAX_CONSTRAINTS).contains(&count) {
        bail!("expected {MIN_CONSTRAINTS} to {MAX_CONSTRAINTS} constraints, got {count}");
    }

    let objective = lpplot_core::Parser::parse_objective(objective)
        .with_context(|| format!("Parsing objective `{objective}`"))?;
    let inputs = constraints
        .iter()
        .enumerate()
        .map(|(i, text)| {
            lpplot_core::Parser::parse_constraint(text)
                .with_context(|| format!("Parsing constraint {}: `{text}`", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((objective, inputs))
}

fn print_pretty(analysis: &Analysis, cli: &Cli) {
    for issue in &analysis.formulation.issues {
        println!("{issue}");
    }

    println!("{}", analysis.objective.banner());
    println!("Method: {}", analysis.result.method);

    match (analysis.result.status, analysis.result.optimum) {
        (SolveStatus::Optimal, Some(optimum)) => {
            println!("Status: OPTIMAL");
            println!("Optimal point: x = {:.2}, y = {:.2}", optimum.x, optimum.y);
            println!("Optimal value: Z = {:.2}", optimum.objective_value);
        }
        (SolveStatus::Infeasible, _) => {
            println!("Status: INFEASIBLE");
            println!("No solution exists that satisfies all constraints.");
        }
        (SolveStatus::Unbounded, _) => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        _ => {
            println!("Status: ERROR");
            println!("Solver encountered an error.");
        }
    }

    println!("Plot saved to {}", cli.output.display());
}
