use lpplot_solver::LpProblem;
use thiserror::Error;

use crate::model::{Constraint, ConstraintInput, ObjectiveSpec, Relation, Sense};

/// Why a constraint was left out of the formulation. Neither case is fatal:
/// the row is dropped and the rest of the problem is still solved.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("Invalid sign in constraint {}: `{token}` (expected <= or >=). Skipping.", .index + 1)]
    Malformed { index: usize, token: String },
    #[error("Constraint {} has no non-zero coefficient. Skipping.", .index + 1)]
    Degenerate { index: usize },
}

impl ConstraintError {
    /// Zero-based position of the offending constraint in the input.
    pub fn index(&self) -> usize {
        match self {
            ConstraintError::Malformed { index, .. } | ConstraintError::Degenerate { index } => *index,
        }
    }
}

/// A validated constraint together with its position in the user's input.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedConstraint {
    pub index: usize,
    pub constraint: Constraint,
}

/// The canonical problem handed to the LP primitive, plus what was kept and
/// what was dropped on the way.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub sense: Sense,
    pub problem: LpProblem,
    pub accepted: Vec<IndexedConstraint>,
    pub issues: Vec<ConstraintError>,
}

impl Formulation {
    pub fn constraints(&self) -> Vec<Constraint> {
        self.accepted.iter().map(|c| c.constraint).collect()
    }

    /// `(a, b, rhs)` for every row of the problem, all in `<=` form.
    pub fn inequalities(&self) -> Vec<(f64, f64, f64)> {
        self.problem
            .constraints
            .iter()
            .map(|row| (row.coefficients[0], row.coefficients[1], row.rhs))
            .collect()
    }
}

/// Build the minimisation problem for `objective` over `inputs`.
///
/// The cost vector is negated for maximisation, `>=` rows are negated into
/// `<=` rows, and `-x <= 0`, `-y <= 0` are always appended even when the
/// user already supplied non-negativity.
pub fn formulate(objective: &ObjectiveSpec, inputs: &[ConstraintInput]) -> Formulation {
    let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
    let cost = match objective.sense {
        Sense::Maximize => vec![-objective.coeff_x, -objective.coeff_y],
        Sense::Minimize => vec![objective.coeff_x, objective.coeff_y],
    };
    problem.set_cost(cost);

    let mut accepted = Vec::new();
    let mut issues = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        let Some(relation) = Relation::from_token(&input.relation) else {
            let issue = ConstraintError::Malformed {
                index,
                token: input.relation.clone(),
            };
            log::warn!("{issue}");
            issues.push(issue);
            continue;
        };

        let constraint = Constraint::new(input.coeff_x, input.coeff_y, relation, input.rhs);
        if constraint.is_degenerate() {
            let issue = ConstraintError::Degenerate { index };
            log::warn!("{issue}");
            issues.push(issue);
            continue;
        }

        let (a, b, rhs) = constraint.canonical();
        problem.add_constraint(format!("constraint_{}", index + 1), vec![a, b], rhs);
        accepted.push(IndexedConstraint { index, constraint });
    }

    problem.add_constraint("x_nonneg", vec![-1.0, 0.0], 0.0);
    problem.add_constraint("y_nonneg", vec![0.0, -1.0], 0.0);

    log::debug!(
        "formulated {} rows from {} constraints ({} dropped)",
        problem.num_constraints(),
        inputs.len(),
        issues.len()
    );

    Formulation {
        sense: objective.sense,
        problem,
        accepted,
        issues,
    }
}
