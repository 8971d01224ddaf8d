use crate::LpSolver;
use crate::problem::LpProblem;
use crate::solution::Solution;

/// Two-phase tableau simplex for `min c·v, A v <= b, v >= 0`.
///
/// Pivoting follows Bland's rule (lowest eligible index enters, ties in the
/// ratio test leave by lowest basic index), so the non-negativity rows that
/// make most 2-D problems degenerate cannot make it cycle.
pub struct Solver {
    /// Maximum pivots (both phases together) before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Phase 1: minimise the sum of artificial variables. A positive minimum
    /// means the rows admit no non-negative point.
    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> PhaseResult {
        let art_start = tableau.n_vars + tableau.n_slack;
        let width = tableau.width() - 1;
        let mut costs = vec![0.0; width];
        for cost in costs.iter_mut().skip(art_start) {
            *cost = 1.0;
        }
        tableau.set_objective(&costs);

        match self.optimize(tableau, width, iterations) {
            PhaseResult::Optimal => {}
            // The phase 1 objective is bounded below by zero
            PhaseResult::Unbounded | PhaseResult::Infeasible => return PhaseResult::Infeasible,
            PhaseResult::IterationLimit => return PhaseResult::IterationLimit,
        }

        let infeasibility = -tableau.objective_rhs();
        if infeasibility > self.tolerance * (1.0 + tableau.rhs_scale) {
            log::debug!("phase 1 ended with artificial sum {infeasibility:e}");
            return PhaseResult::Infeasible;
        }

        // Artificials still basic sit at zero; pivot them out where the row allows
        for row in 0..tableau.n_rows() {
            if tableau.basic_vars[row] < art_start {
                continue;
            }
            let replacement = (0..art_start).find(|&col| tableau.data[row][col].abs() > self.tolerance);
            if let Some(col) = replacement {
                tableau.pivot(row, col);
                *iterations += 1;
            }
        }

        PhaseResult::Optimal
    }

    /// Primal simplex over the current objective row. Only columns below
    /// `allowed` may enter the basis.
    fn optimize(&self, tableau: &mut Tableau, allowed: usize, iterations: &mut usize) -> PhaseResult {
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, allowed) else {
                return PhaseResult::Optimal;
            };
            if *iterations >= self.max_iterations {
                return PhaseResult::IterationLimit;
            }
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return PhaseResult::Unbounded;
            };
            tableau.pivot(pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, allowed: usize) -> Option<usize> {
        let obj_row = tableau.n_rows();
        (0..allowed).find(|&col| tableau.data[obj_row][col] < -self.tolerance)
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.width() - 1;

        let mut best: Option<(usize, f64)> = None;
        for row in 0..tableau.n_rows() {
            let val = tableau.data[row][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[row][rhs_col] / val;
            best = match best {
                None => Some((row, ratio)),
                Some((best_row, best_ratio)) => {
                    if ratio < best_ratio - self.tolerance {
                        Some((row, ratio))
                    } else if ratio <= best_ratio + self.tolerance
                        && tableau.basic_vars[row] < tableau.basic_vars[best_row]
                    {
                        Some((row, ratio))
                    } else {
                        Some((best_row, best_ratio))
                    }
                }
            };
        }

        best.map(|(row, _)| row)
    }
}

impl LpSolver for Solver {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn solve(&self, problem: &LpProblem) -> Solution {
        if let Err(e) = problem.validate() {
            log::warn!("simplex: rejecting malformed problem: {e}");
            return Solution::error(0);
        }

        let mut tableau = Tableau::build(problem);
        let mut iterations = 0;

        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                PhaseResult::Optimal => {}
                PhaseResult::Infeasible | PhaseResult::Unbounded => {
                    return Solution::infeasible(iterations);
                }
                PhaseResult::IterationLimit => return Solution::error(iterations),
            }
        }

        let mut costs = vec![0.0; tableau.width() - 1];
        costs[..tableau.n_vars].copy_from_slice(&problem.cost);
        tableau.set_objective(&costs);

        let allowed = tableau.n_vars + tableau.n_slack;
        match self.optimize(&mut tableau, allowed, &mut iterations) {
            PhaseResult::Optimal => {}
            PhaseResult::Unbounded => return Solution::unbounded(iterations),
            PhaseResult::Infeasible => return Solution::infeasible(iterations),
            PhaseResult::IterationLimit => {
                log::warn!("simplex: iteration limit of {} reached", self.max_iterations);
                return Solution::error(iterations);
            }
        }

        let values: Vec<f64> = tableau
            .values()
            .into_iter()
            .map(|v| if v.abs() < self.tolerance { 0.0 } else { v })
            .collect();
        let objective_value = problem.evaluate(&values);
        log::debug!("simplex: optimum {values:?} = {objective_value} after {iterations} pivots");
        Solution::optimal(values, objective_value, iterations)
    }
}

/// Dense tableau. Rows `0..m` are constraints, row `m` holds reduced costs
/// with `-z` in the right-hand-side column.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    rhs_scale: f64,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let n_rows = problem.num_constraints();
        let n_slack = n_rows;
        let n_artificial = problem.constraints.iter().filter(|c| c.rhs < 0.0).count();
        let width = n_vars + n_slack + n_artificial + 1;

        let mut data = vec![vec![0.0; width]; n_rows + 1];
        let mut basic_vars = vec![0; n_rows];
        let mut artificial_idx = n_vars + n_slack;
        let mut rhs_scale: f64 = 0.0;

        for (i, row) in problem.constraints.iter().enumerate() {
            // Keep the right-hand side non-negative; a flipped row needs an artificial
            let sign = if row.rhs < 0.0 { -1.0 } else { 1.0 };
            for (j, &coef) in row.coefficients.iter().enumerate() {
                data[i][j] = sign * coef;
            }
            data[i][n_vars + i] = sign;
            data[i][width - 1] = sign * row.rhs;
            rhs_scale = rhs_scale.max(row.rhs.abs());

            if sign < 0.0 {
                data[i][artificial_idx] = 1.0;
                basic_vars[i] = artificial_idx;
                artificial_idx += 1;
            } else {
                basic_vars[i] = n_vars + i;
            }
        }

        Self {
            data,
            basic_vars,
            n_vars,
            n_slack,
            n_artificial,
            rhs_scale,
        }
    }

    fn n_rows(&self) -> usize {
        self.data.len() - 1
    }

    fn width(&self) -> usize {
        self.data[0].len()
    }

    fn objective_rhs(&self) -> f64 {
        self.data[self.n_rows()][self.width() - 1]
    }

    /// Install `costs` as the objective row and price out the basic columns.
    fn set_objective(&mut self, costs: &[f64]) {
        let obj_row = self.n_rows();
        let width = self.width();
        for (j, cost) in costs.iter().enumerate() {
            self.data[obj_row][j] = *cost;
        }
        self.data[obj_row][width - 1] = 0.0;

        for row in 0..obj_row {
            let basic_cost = costs[self.basic_vars[row]];
            if basic_cost == 0.0 {
                continue;
            }
            for j in 0..width {
                self.data[obj_row][j] -= basic_cost * self.data[row][j];
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.width();
        self.basic_vars[row] = col;

        let pivot_val = self.data[row][col];
        for j in 0..width {
            self.data[row][j] /= pivot_val;
        }

        for i in 0..self.data.len() {
            if i == row {
                continue;
            }
            let factor = self.data[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..width {
                self.data[i][j] -= factor * self.data[row][j];
            }
        }
    }

    fn values(&self) -> Vec<f64> {
        let rhs_col = self.width() - 1;
        let mut values = vec![0.0; self.n_vars];
        for (row, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[row][rhs_col];
            }
        }
        values
    }
}

enum PhaseResult {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
}
