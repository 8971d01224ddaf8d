use lpplot_solver::{LpSolver, SolutionStatus};

use crate::formulate::Formulation;
use crate::model::{FEASIBILITY_TOLERANCE, Sense};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The primitive gave up (iteration limit or a problem it cannot take)
    Failed,
}

/// Optimal vertex with the objective value in the caller's sense (max or min).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    pub x: f64,
    pub y: f64,
    pub objective_value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Present exactly when `status` is `Optimal`
    pub optimum: Option<Optimum>,
    /// Name of the primitive that produced the result
    pub method: String,
}

impl SolveResult {
    pub fn success(&self) -> bool {
        self.optimum.is_some()
    }

    pub fn x(&self) -> Option<f64> {
        self.optimum.map(|o| o.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.optimum.map(|o| o.y)
    }

    pub fn objective_value(&self) -> Option<f64> {
        self.optimum.map(|o| o.objective_value)
    }
}

/// Run `solver` on the formulated problem and translate its answer back to
/// the caller's objective sense.
pub fn solve(formulation: &Formulation, solver: &dyn LpSolver) -> SolveResult {
    let solution = solver.solve(&formulation.problem);
    log::info!("{} solver: {}", solver.name(), solution.status);

    let status = match solution.status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::Infeasible => SolveStatus::Infeasible,
        SolutionStatus::Unbounded => SolveStatus::Unbounded,
        SolutionStatus::Error => SolveStatus::Failed,
    };

    let optimum = match (status, solution.values.as_slice()) {
        (SolveStatus::Optimal, &[x, y]) => {
            let objective_value = match formulation.sense {
                Sense::Maximize => -solution.objective_value,
                Sense::Minimize => solution.objective_value,
            };
            Some(Optimum { x, y, objective_value })
        }
        _ => None,
    };

    let status = match (status, optimum) {
        (SolveStatus::Optimal, None) => {
            log::warn!("{} solver reported an optimum without a 2-D point", solver.name());
            SolveStatus::Failed
        }
        (status, _) => status,
    };

    if let Some(o) = optimum {
        for c in &formulation.accepted {
            let scale = 1.0 + c.constraint.rhs.abs();
            if !c.constraint.holds(o.x, o.y, FEASIBILITY_TOLERANCE * scale) {
                log::warn!(
                    "optimum ({}, {}) violates constraint {}: {}",
                    o.x,
                    o.y,
                    c.index + 1,
                    c.constraint
                );
            }
        }
    }

    SolveResult {
        status,
        optimum,
        method: solver.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulate::formulate;
    use crate::model::{ConstraintInput, ObjectiveSpec};
    use lpplot_solver::{LpProblem, Solution, Solver, VertexSolver};

    fn scenario_one() -> Vec<ConstraintInput> {
        vec![
            ConstraintInput::new(1.0, 2.0, "<=", 14.0),
            ConstraintInput::new(3.0, -1.0, ">=", 0.0),
            ConstraintInput::new(1.0, -1.0, "<=", 2.0),
        ]
    }

    /// Reports a fixed minimisation value so the sign handling is observable.
    struct Fixed(Solution);

    impl LpSolver for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, _problem: &LpProblem) -> Solution {
            self.0.clone()
        }
    }

    #[test]
    fn test_scenario_one_maximize() {
        let objective = ObjectiveSpec::maximize(3.0, 5.0);
        let formulation = formulate(&objective, &scenario_one());
        let result = solve(&formulation, &Solver::new());

        assert!(result.success());
        let o = result.optimum.unwrap();
        assert!((o.x - 6.0).abs() < 1e-6, "x = {}", o.x);
        assert!((o.y - 4.0).abs() < 1e-6, "y = {}", o.y);
        assert!((o.objective_value - 38.0).abs() < 1e-6, "z = {}", o.objective_value);
        assert!((objective.evaluate(o.x, o.y) - o.objective_value).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_one_agrees_with_independent_solve() {
        let objective = ObjectiveSpec::maximize(3.0, 5.0);
        let formulation = formulate(&objective, &scenario_one());
        let simplex = solve(&formulation, &Solver::new());
        let vertex = solve(&formulation, &VertexSolver::new());

        assert_eq!(vertex.status, SolveStatus::Optimal);
        let (a, b) = (simplex.objective_value().unwrap(), vertex.objective_value().unwrap());
        assert!((a - b).abs() < 1e-6, "simplex {a} vs vertex {b}");
        assert_eq!(vertex.method, "vertex");
    }

    #[test]
    fn test_maximize_value_is_negated_back() {
        let formulation = formulate(
            &ObjectiveSpec::maximize(1.0, 1.0),
            &[ConstraintInput::new(1.0, 1.0, "<=", 4.0)],
        );
        let result = solve(&formulation, &Fixed(Solution::optimal(vec![1.0, 3.0], -4.0, 1)));
        assert_eq!(result.objective_value(), Some(4.0));

        let formulation = formulate(
            &ObjectiveSpec::minimize(1.0, 1.0),
            &[ConstraintInput::new(1.0, 1.0, "<=", 4.0)],
        );
        let result = solve(&formulation, &Fixed(Solution::optimal(vec![0.0, 0.0], 0.0, 0)));
        assert_eq!(result.objective_value(), Some(0.0));
    }

    #[test]
    fn test_scenario_two_contradiction_is_not_success() {
        let inputs = vec![
            ConstraintInput::new(1.0, 0.0, ">=", 5.0),
            ConstraintInput::new(1.0, 0.0, "<=", 2.0),
        ];
        let formulation = formulate(&ObjectiveSpec::maximize(1.0, 1.0), &inputs);

        for solver in [&Solver::new() as &dyn LpSolver, &VertexSolver::new()] {
            let result = solve(&formulation, solver);
            assert!(!result.success());
            assert_eq!(result.status, SolveStatus::Infeasible);
            assert_eq!(result.x(), None);
            assert_eq!(result.objective_value(), None);
        }
    }

    #[test]
    fn test_unbounded_is_not_success() {
        let inputs = vec![
            ConstraintInput::new(1.0, -1.0, "<=", 2.0),
            ConstraintInput::new(1.0, 1.0, ">=", 1.0),
        ];
        let formulation = formulate(&ObjectiveSpec::maximize(1.0, 1.0), &inputs);
        let result = solve(&formulation, &Solver::new());

        assert_eq!(result.status, SolveStatus::Unbounded);
        assert!(!result.success());
    }

    #[test]
    fn test_optimum_without_point_is_failure() {
        let formulation = formulate(
            &ObjectiveSpec::minimize(1.0, 1.0),
            &[ConstraintInput::new(1.0, 1.0, "<=", 4.0)],
        );
        let result = solve(&formulation, &Fixed(Solution::optimal(vec![1.0], 1.0, 1)));
        assert_eq!(result.status, SolveStatus::Failed);
        assert!(!result.success());
    }
}
