/// A minimisation problem in inequality form:
///
/// ```text
/// minimise    c · v
/// subject to  A v <= b
///             v >= 0
/// ```
///
/// Every row is a `<=` inequality. Callers that start from `>=` rows or a
/// maximisation objective must negate before handing the problem over.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Cost vector `c`, one entry per variable
    pub cost: Vec<f64>,
    /// Rows of `A v <= b`
    pub constraints: Vec<Inequality>,
}

/// One row `coefficients · v <= rhs`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Inequality {
    /// Name/label for the row (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Right-hand side value
    pub rhs: f64,
}

impl Inequality {
    /// Left-hand side evaluated at `values`. Missing values count as zero.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            cost: vec![0.0; n],
            constraints: Vec::new(),
        }
    }

    pub fn set_cost(&mut self, cost: Vec<f64>) {
        self.cost = cost;
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, rhs: f64) {
        self.constraints.push(Inequality {
            name: name.into(),
            coefficients,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value `c · v`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.cost.iter().zip(values).map(|(c, v)| c * v).sum()
    }

    /// Check that the cost vector and every row have one entry per variable.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ShapeError::NoVariables);
        }
        if self.cost.len() != n {
            return Err(ShapeError::CostLength {
                expected: n,
                found: self.cost.len(),
            });
        }
        for row in &self.constraints {
            if row.coefficients.len() != n {
                return Err(ShapeError::RowLength {
                    row: row.name.clone(),
                    expected: n,
                    found: row.coefficients.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("problem has no variables")]
    NoVariables,
    #[error("cost vector has {found} entries, expected {expected}")]
    CostLength { expected: usize, found: usize },
    #[error("row {row} has {found} coefficients, expected {expected}")]
    RowLength {
        row: String,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_shape() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_cost(vec![1.0, 2.0]);
        problem.add_constraint("sum", vec![1.0, 1.0], 4.0);
        assert_eq!(problem.validate(), Ok(()));

        problem.add_constraint("short", vec![1.0], 4.0);
        assert!(matches!(
            problem.validate(),
            Err(ShapeError::RowLength { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_lhs_and_evaluate() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_cost(vec![3.0, 5.0]);
        problem.add_constraint("c1", vec![1.0, 2.0], 14.0);
        assert!((problem.constraints[0].lhs(&[6.0, 4.0]) - 14.0).abs() < 1e-12);
        assert!((problem.evaluate(&[6.0, 4.0]) - 38.0).abs() < 1e-12);
    }
}
