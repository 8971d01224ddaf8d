use std::path::Path;

use lpplot_solver::LpSolver;

use crate::boundary::boundary_lines;
use crate::compose::{DrawingSurface, Plot, RenderError, compose};
use crate::formulate::{Formulation, formulate};
use crate::invoke::{SolveResult, solve};
use crate::model::{ConstraintInput, FEASIBILITY_TOLERANCE, ObjectiveSpec};
use crate::region::{FeasibilityGrid, ViewWindow, WindowConfig};
use crate::svg::SvgSurface;

/// Knobs for sampling and drawing the feasible region.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotConfig {
    /// Samples per axis, for both the region grid and sloped boundaries
    pub resolution: usize,
    pub tolerance: f64,
    pub window: WindowConfig,
    pub width: usize,
    pub height: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            resolution: 400,
            tolerance: FEASIBILITY_TOLERANCE,
            window: WindowConfig::default(),
            width: 1000,
            height: 800,
        }
    }
}

impl PlotConfig {
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Everything produced for one problem: what was solved, how, and the
/// figure describing it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub objective: ObjectiveSpec,
    pub formulation: Formulation,
    pub result: SolveResult,
    pub window: ViewWindow,
    pub plot: Plot,
}

/// Formulate, solve and lay out the plot for one problem.
///
/// The window is sized from the accepted constraints and then grown so an
/// optimum far from the intercepts stays visible.
pub fn analyze(
    objective: &ObjectiveSpec,
    inputs: &[ConstraintInput],
    config: &PlotConfig,
    solver: &dyn LpSolver,
) -> Analysis {
    let formulation = formulate(objective, inputs);
    let result = solve(&formulation, solver);

    let constraints = formulation.constraints();
    let mut window = ViewWindow::from_constraints(&constraints, &config.window);
    if let Some(optimum) = result.optimum {
        window.include_point(optimum.x, optimum.y, &config.window);
    }

    let region = FeasibilityGrid::sample(&constraints, window, config.resolution, config.tolerance);
    let boundaries = boundary_lines(&formulation.accepted, &window, config.resolution);
    let plot = compose(objective, region, boundaries, &result);

    Analysis {
        objective: *objective,
        formulation,
        result,
        window,
        plot,
    }
}

impl Analysis {
    pub fn render(&self, surface: &mut dyn DrawingSurface) -> Result<(), RenderError> {
        self.plot.render(surface)
    }

    pub fn to_svg(&self, config: &PlotConfig) -> Result<String, RenderError> {
        let mut surface = SvgSurface::new(config.width, config.height);
        self.render(&mut surface)?;
        Ok(surface.finish())
    }

    pub fn save_svg(&self, path: impl AsRef<Path>, config: &PlotConfig) -> Result<(), RenderError> {
        let mut surface = SvgSurface::new(config.width, config.height);
        self.render(&mut surface)?;
        surface.save(path)
    }
}
