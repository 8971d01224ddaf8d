//! WASM bindings for lpplot
//!
//! Problems come in as text (`max 3x + 5y`, `x + 2y <= 14`) and results go
//! back as plain JavaScript objects or an SVG string.

use wasm_bindgen::prelude::*;

use crate::formulate::ConstraintError;
use crate::invoke::SolveResult;
use crate::model::{ConstraintInput, ObjectiveSpec};
use crate::parser::Parser;
use crate::pipeline::{Analysis, PlotConfig, analyze};
use lpplot_solver::Solver;

#[derive(serde::Serialize)]
struct SolveOutput {
    result: SolveResult,
    issues: Vec<String>,
}

fn run(objective: &str, constraints: &[String]) -> Result<(Analysis, PlotConfig), JsValue> {
    let objective: ObjectiveSpec =
        Parser::parse_objective(objective).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let inputs = constraints
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Parser::parse_constraint(c)
                .map_err(|e| JsValue::from_str(&format!("Constraint {}: {e}", i + 1)))
        })
        .collect::<Result<Vec<ConstraintInput>, JsValue>>()?;

    let config = PlotConfig::default();
    Ok((analyze(&objective, &inputs, &config, &Solver::new()), config))
}

/// Solve and return `{ result, issues }`
#[wasm_bindgen]
pub fn solve(objective: &str, constraints: Vec<String>) -> Result<JsValue, JsValue> {
    let (analysis, _) = run(objective, &constraints)?;
    let output = SolveOutput {
        result: analysis.result,
        issues: analysis
            .formulation
            .issues
            .iter()
            .map(ConstraintError::to_string)
            .collect(),
    };
    serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solve and render the feasible-region plot as an SVG document
#[wasm_bindgen]
pub fn plot_svg(objective: &str, constraints: Vec<String>) -> Result<String, JsValue> {
    let (analysis, config) = run(objective, &constraints)?;
    analysis
        .to_svg(&config)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
