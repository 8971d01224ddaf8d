mod problem;
mod simplex;
mod solution;
mod vertex;

pub use problem::{Inequality, LpProblem, ShapeError};
pub use simplex::Solver;
pub use solution::{Solution, SolutionStatus};
pub use vertex::VertexSolver;

/// A minimisation LP primitive: `min c·v` subject to `A v <= b`, `v >= 0`.
///
/// Implementations never fail outright; infeasible, unbounded and
/// numerically hopeless problems come back as a non-optimal status.
pub trait LpSolver {
    /// Short identifier used in logs and on the command line.
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &LpProblem) -> Solution;
}
