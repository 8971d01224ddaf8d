use crate::model::Constraint;

/// Parameters of the window-sizing heuristic.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Factor applied to the largest intercept
    pub margin: f64,
    /// Smallest intercept considered, so the window never collapses
    pub floor: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            margin: 1.5,
            floor: 10.0,
        }
    }
}

impl WindowConfig {
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }
}

/// The visible rectangle `[0, x_max] x [0, y_max]`. Both bounds are
/// strictly positive and finite.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x_max: f64,
    pub y_max: f64,
}

impl ViewWindow {
    /// `max(|rhs / coeff| over constraints, floor) * margin`, per axis.
    pub fn from_constraints(constraints: &[Constraint], config: &WindowConfig) -> Self {
        let mut x_extent = config.floor;
        let mut y_extent = config.floor;
        for c in constraints {
            if let Some(x) = c.x_intercept() {
                x_extent = x_extent.max(x);
            }
            if let Some(y) = c.y_intercept() {
                y_extent = y_extent.max(y);
            }
        }

        let window = Self {
            x_max: widen(x_extent, config.margin),
            y_max: widen(y_extent, config.margin),
        };
        log::debug!("view window {} x {}", window.x_max, window.y_max);
        window
    }

    /// Grow (never shrink) so that `(x, y)` sits strictly inside.
    pub fn include_point(&mut self, x: f64, y: f64, config: &WindowConfig) {
        if x.is_finite() {
            self.x_max = self.x_max.max(widen(x, config.margin));
        }
        if y.is_finite() {
            self.y_max = self.y_max.max(widen(y, config.margin));
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.x_max).contains(&x) && (0.0..=self.y_max).contains(&y)
    }

    pub fn is_valid(&self) -> bool {
        self.x_max.is_finite() && self.y_max.is_finite() && self.x_max > 0.0 && self.y_max > 0.0
    }
}

/// `extent * margin`, saturating at `f64::MAX` so the window stays finite.
fn widen(extent: f64, margin: f64) -> f64 {
    (extent * margin).min(f64::MAX)
}

/// `n` evenly spaced samples of `[0, max]`, both ends included.
pub fn linspace(max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| max * (i as f64 / (n - 1) as f64)).collect(),
    }
}

/// True when `(x, y)` satisfies every constraint and both non-negativity
/// bounds, each within `tolerance`.
pub fn is_feasible(constraints: &[Constraint], x: f64, y: f64, tolerance: f64) -> bool {
    if x < -tolerance || y < -tolerance {
        return false;
    }
    constraints.iter().all(|c| c.holds(x, y, tolerance))
}

/// Feasibility sampled on a regular grid over a view window. Row `r` holds
/// the samples at `y = ys[r]`, column `c` those at `x = xs[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibilityGrid {
    window: ViewWindow,
    xs: Vec<f64>,
    ys: Vec<f64>,
    cells: Vec<bool>,
}

impl FeasibilityGrid {
    pub fn sample(
        constraints: &[Constraint],
        window: ViewWindow,
        resolution: usize,
        tolerance: f64,
    ) -> Self {
        let resolution = resolution.max(2);
        let xs = linspace(window.x_max, resolution);
        let ys = linspace(window.y_max, resolution);

        let mut cells = Vec::with_capacity(xs.len() * ys.len());
        for &y in &ys {
            for &x in &xs {
                cells.push(is_feasible(constraints, x, y, tolerance));
            }
        }

        let grid = Self {
            window,
            xs,
            ys,
            cells,
        };
        log::debug!(
            "sampled {}x{} grid, {} feasible points",
            grid.columns(),
            grid.rows(),
            grid.feasible_count()
        );
        grid
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn columns(&self) -> usize {
        self.xs.len()
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn is_feasible(&self, column: usize, row: usize) -> bool {
        self.cells[row * self.columns() + column]
    }

    pub fn feasible_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.feasible_count() == 0
    }

    /// Maximal runs of feasible columns in `row`, as half-open `[start, end)`.
    pub fn runs(&self, row: usize) -> Vec<(usize, usize)> {
        let columns = self.columns();
        let cells = &self.cells[row * columns..(row + 1) * columns];

        let mut runs = Vec::new();
        let mut start = None;
        for (column, &feasible) in cells.iter().enumerate() {
            match (feasible, start) {
                (true, None) => start = Some(column),
                (false, Some(s)) => {
                    runs.push((s, column));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, columns));
        }
        runs
    }
}
