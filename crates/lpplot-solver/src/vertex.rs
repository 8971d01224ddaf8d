use crate::LpSolver;
use crate::problem::LpProblem;
use crate::solution::Solution;

type Row = ([f64; 2], f64);

/// Exhaustive vertex enumeration for two-variable problems.
///
/// Every pair of boundary lines (including the axes) is intersected, the
/// feasible intersections are scored, and the best one wins. The region lies
/// in the first quadrant, so it is either empty or has a vertex; unboundedness
/// is decided separately by testing the candidate recession rays.
pub struct VertexSolver {
    tolerance: f64,
}

impl Default for VertexSolver {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl VertexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    fn admits(&self, rows: &[Row], point: [f64; 2]) -> bool {
        rows.iter().all(|(a, b)| {
            let scale = 1.0 + b.abs() + (a[0].abs() + a[1].abs()) * (point[0].abs() + point[1].abs());
            dot(*a, point) <= b + self.tolerance * scale
        })
    }

    fn intersect(&self, (a1, b1): Row, (a2, b2): Row) -> Option<[f64; 2]> {
        let det = a1[0] * a2[1] - a1[1] * a2[0];
        if det.abs() <= self.tolerance {
            return None;
        }
        let x = (b1 * a2[1] - a1[1] * b2) / det;
        let y = (a1[0] * b2 - b1 * a2[0]) / det;
        (x.is_finite() && y.is_finite()).then_some([x, y])
    }

    /// Extreme rays of the recession cone `{d : A d <= 0}` lie along the
    /// boundary directions, so those are the only directions worth testing.
    fn improving_ray(&self, rows: &[Row], cost: [f64; 2]) -> Option<[f64; 2]> {
        let mut candidates = vec![[1.0, 0.0], [0.0, 1.0]];
        for (a, _) in rows {
            let norm = (a[0] * a[0] + a[1] * a[1]).sqrt();
            if norm > self.tolerance {
                candidates.push([a[1] / norm, -a[0] / norm]);
                candidates.push([-a[1] / norm, a[0] / norm]);
            }
        }

        candidates.into_iter().find(|&d| {
            rows.iter().all(|(a, _)| dot(*a, d) <= self.tolerance) && dot(cost, d) < -self.tolerance
        })
    }
}

impl LpSolver for VertexSolver {
    fn name(&self) -> &'static str {
        "vertex"
    }

    fn solve(&self, problem: &LpProblem) -> Solution {
        if let Err(e) = problem.validate() {
            log::warn!("vertex: rejecting malformed problem: {e}");
            return Solution::error(0);
        }
        if problem.num_variables() != 2 {
            log::warn!(
                "vertex: enumeration needs exactly 2 variables, got {}",
                problem.num_variables()
            );
            return Solution::error(0);
        }

        let cost = [problem.cost[0], problem.cost[1]];
        let mut rows: Vec<Row> = problem
            .constraints
            .iter()
            .map(|row| ([row.coefficients[0], row.coefficients[1]], row.rhs))
            .collect();
        rows.push(([-1.0, 0.0], 0.0));
        rows.push(([0.0, -1.0], 0.0));

        let mut iterations = 0;
        let mut best: Option<([f64; 2], f64)> = None;
        for i in 0..rows.len() {
            for j in (i + 1)..rows.len() {
                iterations += 1;
                let Some(point) = self.intersect(rows[i], rows[j]) else {
                    continue;
                };
                if !self.admits(&rows, point) {
                    continue;
                }
                let value = dot(cost, point);
                if best.is_none_or(|(_, best_value)| value < best_value - self.tolerance) {
                    best = Some((point, value));
                }
            }
        }

        let Some((point, value)) = best else {
            return Solution::infeasible(iterations);
        };
        if let Some(ray) = self.improving_ray(&rows, cost) {
            log::debug!("vertex: objective decreases without bound along {ray:?}");
            return Solution::unbounded(iterations);
        }

        let values = point
            .iter()
            .map(|v| if v.abs() < self.tolerance { 0.0 } else { *v })
            .collect();
        Solution::optimal(values, value, iterations)
    }
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}
