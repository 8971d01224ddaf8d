use std::fmt;

/// Slack allowed when testing whether a point satisfies a constraint.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Coefficients at or below this magnitude are treated as zero.
pub const DEGENERACY_TOLERANCE: f64 = 1e-6;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
}

impl Relation {
    /// Accepts exactly `<=` and `>=` (surrounding whitespace ignored).
    pub fn from_token(token: &str) -> Option<Relation> {
        match token.trim() {
            "<=" => Some(Relation::Le),
            ">=" => Some(Relation::Ge),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl Sense {
    /// `max` means maximise; anything else minimises.
    pub fn from_token(token: &str) -> Sense {
        if token.trim().eq_ignore_ascii_case("max") {
            Sense::Maximize
        } else {
            Sense::Minimize
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => f.write_str("Maximize"),
            Sense::Minimize => f.write_str("Minimize"),
        }
    }
}

/// A constraint as collected from the user, before the relation token has
/// been checked.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintInput {
    pub coeff_x: f64,
    pub coeff_y: f64,
    pub relation: String,
    pub rhs: f64,
}

impl ConstraintInput {
    pub fn new(coeff_x: f64, coeff_y: f64, relation: impl Into<String>, rhs: f64) -> Self {
        Self {
            coeff_x,
            coeff_y,
            relation: relation.into(),
            rhs,
        }
    }
}

/// `coeff_x * x + coeff_y * y (<= | >=) rhs`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub coeff_x: f64,
    pub coeff_y: f64,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(coeff_x: f64, coeff_y: f64, relation: Relation, rhs: f64) -> Self {
        Self {
            coeff_x,
            coeff_y,
            relation,
            rhs,
        }
    }

    pub fn le(coeff_x: f64, coeff_y: f64, rhs: f64) -> Self {
        Self::new(coeff_x, coeff_y, Relation::Le, rhs)
    }

    pub fn ge(coeff_x: f64, coeff_y: f64, rhs: f64) -> Self {
        Self::new(coeff_x, coeff_y, Relation::Ge, rhs)
    }

    pub fn lhs(&self, x: f64, y: f64) -> f64 {
        self.coeff_x * x + self.coeff_y * y
    }

    /// Whether `(x, y)` satisfies the inequality, allowing `tolerance` slack.
    pub fn holds(&self, x: f64, y: f64, tolerance: f64) -> bool {
        let lhs = self.lhs(x, y);
        match self.relation {
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
        }
    }

    /// Both coefficients negligible: the row says nothing about `x` or `y`.
    pub fn is_degenerate(&self) -> bool {
        self.coeff_x.abs() <= DEGENERACY_TOLERANCE && self.coeff_y.abs() <= DEGENERACY_TOLERANCE
    }

    /// The same half-plane as `(a, b, rhs)` with `a x + b y <= rhs`.
    pub fn canonical(&self) -> (f64, f64, f64) {
        match self.relation {
            Relation::Le => (self.coeff_x, self.coeff_y, self.rhs),
            Relation::Ge => (-self.coeff_x, -self.coeff_y, -self.rhs),
        }
    }

    /// `|rhs / coeff_x|`, if the boundary crosses the x axis at all.
    pub fn x_intercept(&self) -> Option<f64> {
        intercept(self.rhs, self.coeff_x)
    }

    /// `|rhs / coeff_y|`, if the boundary crosses the y axis at all.
    pub fn y_intercept(&self) -> Option<f64> {
        intercept(self.rhs, self.coeff_y)
    }
}

fn intercept(rhs: f64, coeff: f64) -> Option<f64> {
    if coeff.abs() <= DEGENERACY_TOLERANCE {
        return None;
    }
    let value = (rhs / coeff).abs();
    value.is_finite().then_some(value)
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            linear(self.coeff_x, self.coeff_y),
            self.relation.symbol(),
            self.rhs
        )
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveSpec {
    pub coeff_x: f64,
    pub coeff_y: f64,
    pub sense: Sense,
}

impl ObjectiveSpec {
    pub fn new(coeff_x: f64, coeff_y: f64, sense: Sense) -> Self {
        Self {
            coeff_x,
            coeff_y,
            sense,
        }
    }

    pub fn maximize(coeff_x: f64, coeff_y: f64) -> Self {
        Self::new(coeff_x, coeff_y, Sense::Maximize)
    }

    pub fn minimize(coeff_x: f64, coeff_y: f64) -> Self {
        Self::new(coeff_x, coeff_y, Sense::Minimize)
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.coeff_x * x + self.coeff_y * y
    }

    /// `Maximize Z = 3x + 5y`
    pub fn banner(&self) -> String {
        format!("{} Z = {}", self.sense, linear(self.coeff_x, self.coeff_y))
    }
}

/// `3x + 5y`, `3x - 5y`: the sign of the y term is pulled out.
pub(crate) fn linear(coeff_x: f64, coeff_y: f64) -> String {
    let sign = if coeff_y.is_sign_negative() && coeff_y != 0.0 { "-" } else { "+" };
    format!("{}x {} {}y", coeff_x, sign, coeff_y.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_tokens() {
        assert_eq!(Relation::from_token("<="), Some(Relation::Le));
        assert_eq!(Relation::from_token(" >= "), Some(Relation::Ge));
        assert_eq!(Relation::from_token("<"), None);
        assert_eq!(Relation::from_token("="), None);
        assert_eq!(Relation::from_token("=<"), None);
    }

    #[test]
    fn test_sense_tokens() {
        assert_eq!(Sense::from_token("max"), Sense::Maximize);
        assert_eq!(Sense::from_token(" MAX "), Sense::Maximize);
        assert_eq!(Sense::from_token("min"), Sense::Minimize);
        assert_eq!(Sense::from_token("anything"), Sense::Minimize);
    }

    #[test]
    fn test_sign_flip_preserves_half_plane() {
        let original = Constraint::ge(3.0, -1.0, 0.5);
        let (a, b, rhs) = original.canonical();
        let flipped = Constraint::le(a, b, rhs);

        for i in -20..=20 {
            for j in -20..=20 {
                let (x, y) = (i as f64 * 0.37, j as f64 * 0.41);
                assert_eq!(
                    original.holds(x, y, 0.0),
                    flipped.holds(x, y, 0.0),
                    "disagreement at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_intercepts() {
        let c = Constraint::le(2.0, 0.0, -8.0);
        assert_eq!(c.x_intercept(), Some(4.0));
        assert_eq!(c.y_intercept(), None);
        assert!(!c.is_degenerate());
        assert!(Constraint::le(0.0, 1e-9, 5.0).is_degenerate());
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::le(1.0, 2.0, 14.0).to_string(), "1x + 2y <= 14");
        assert_eq!(Constraint::ge(3.0, -1.0, 0.0).to_string(), "3x - 1y >= 0");
        assert_eq!(ObjectiveSpec::maximize(3.0, 5.0).banner(), "Maximize Z = 3x + 5y");
        assert_eq!(ObjectiveSpec::minimize(-2.5, -1.0).banner(), "Minimize Z = -2.5x - 1y");
    }
}
