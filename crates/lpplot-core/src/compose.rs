use thiserror::Error;

use crate::boundary::BoundarySegment;
use crate::invoke::SolveResult;
use crate::model::ObjectiveSpec;
use crate::region::{FeasibilityGrid, ViewWindow};

/// Colour as `0xRRGGBBAA`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const BLACK: Rgba = Rgba(0x000000ff);
    pub const GRID: Rgba = Rgba(0xb0b0b0b3);
    pub const REGION: Rgba = Rgba(0x0080004d);
    pub const MARKER: Rgba = Rgba(0xff0000ff);
    pub const ANNOTATION: Rgba = Rgba(0x008000ff);
    pub const SUPTITLE: Rgba = Rgba(0x00008bff);

    /// Line colours, cycled in constraint order.
    pub const PALETTE: [Rgba; 4] = [
        Rgba(0x1f77b4ff),
        Rgba(0xff7f0eff),
        Rgba(0x2ca02cff),
        Rgba(0xd62728ff),
    ];
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("view window {x_max} x {y_max} cannot be drawn")]
    InvalidWindow { x_max: f64, y_max: f64 },
    #[error("drawing surface used before begin()")]
    NotStarted,
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// The drawing engine the composer targets. Coordinates are in data space;
/// the surface owns the mapping to its own canvas.
pub trait DrawingSurface {
    /// Start a figure showing `window`, with axis labels.
    fn begin(&mut self, window: &ViewWindow, x_label: &str, y_label: &str) -> Result<(), RenderError>;

    /// Translucent overlay over every feasible grid cell.
    fn fill_region(&mut self, grid: &FeasibilityGrid, color: Rgba) -> Result<(), RenderError>;

    fn polyline(&mut self, points: &[(f64, f64)], color: Rgba, label: &str) -> Result<(), RenderError>;

    fn marker(&mut self, at: (f64, f64), color: Rgba, annotation: &[String]) -> Result<(), RenderError>;

    fn titles(&mut self, suptitle: &str, title: &str) -> Result<(), RenderError>;

    fn legend(&mut self, entries: &[LegendEntry]) -> Result<(), RenderError>;
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Patch,
    Line,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgba,
    pub swatch: Swatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub label: String,
    pub color: Rgba,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub annotation: Vec<String>,
}

/// A fully composed figure, independent of any drawing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub window: ViewWindow,
    pub suptitle: String,
    pub title: String,
    pub region: FeasibilityGrid,
    pub lines: Vec<PlotLine>,
    pub marker: Option<Marker>,
    pub legend: Vec<LegendEntry>,
}

pub const FEASIBLE_REGION_LABEL: &str = "Feasible Region";
pub const NO_SOLUTION_TITLE: &str = "No feasible solution found";

/// Assemble the figure: shaded region, one line per boundary, and the
/// optimum with its annotation when the solve succeeded.
///
/// The legend lists the feasible region first and then the constraints in
/// input order.
pub fn compose(
    objective: &ObjectiveSpec,
    region: FeasibilityGrid,
    boundaries: Vec<BoundarySegment>,
    result: &SolveResult,
) -> Plot {
    let mut legend = vec![LegendEntry {
        label: FEASIBLE_REGION_LABEL.to_string(),
        color: Rgba::REGION,
        swatch: Swatch::Patch,
    }];

    let mut lines = Vec::with_capacity(boundaries.len());
    for (i, segment) in boundaries.into_iter().enumerate() {
        let color = Rgba::PALETTE[i % Rgba::PALETTE.len()];
        legend.push(LegendEntry {
            label: segment.label.clone(),
            color,
            swatch: Swatch::Line,
        });
        lines.push(PlotLine {
            label: segment.label,
            color,
            points: segment.points,
        });
    }

    let (marker, title) = match result.optimum {
        Some(o) => (
            Some(Marker {
                x: o.x,
                y: o.y,
                annotation: vec![
                    "Optimal Point".to_string(),
                    format!("x={:.2}, y={:.2}", o.x, o.y),
                    format!("Z={:.2}", o.objective_value),
                ],
            }),
            format!("Optimal Solution: Z = {:.2}", o.objective_value),
        ),
        None => (None, NO_SOLUTION_TITLE.to_string()),
    };

    Plot {
        window: region.window(),
        suptitle: objective.banner(),
        title,
        region,
        lines,
        marker,
        legend,
    }
}

impl Plot {
    /// Draw onto `surface`: region, lines, marker, titles, legend.
    pub fn render(&self, surface: &mut dyn DrawingSurface) -> Result<(), RenderError> {
        if !self.window.is_valid() {
            return Err(RenderError::InvalidWindow {
                x_max: self.window.x_max,
                y_max: self.window.y_max,
            });
        }

        surface.begin(&self.window, "x", "y")?;
        surface.fill_region(&self.region, Rgba::REGION)?;
        for line in &self.lines {
            surface.polyline(&line.points, line.color, &line.label)?;
        }
        if let Some(marker) = &self.marker {
            surface.marker((marker.x, marker.y), Rgba::MARKER, &marker.annotation)?;
        }
        surface.titles(&self.suptitle, &self.title)?;
        surface.legend(&self.legend)
    }
}

/// Clip the segment `a -> b` to the window (Liang-Barsky).
pub fn clip_segment(window: &ViewWindow, a: (f64, f64), b: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, a.0),
        (dx, window.x_max - a.0),
        (-dy, a.1),
        (dy, window.y_max - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Tick positions at 1/2/5 x 10^k steps, about `target` of them on `[0, max]`.
pub fn ticks(max: f64, target: usize) -> Vec<f64> {
    if !(max.is_finite() && max > 0.0) || target == 0 {
        return vec![0.0];
    }
    let raw = max / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let count = (max / step + 1e-9).floor() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::boundary_lines;
    use crate::formulate::formulate;
    use crate::invoke::{Optimum, SolveStatus, solve};
    use crate::model::{ConstraintInput, FEASIBILITY_TOLERANCE};
    use crate::region::WindowConfig;
    use lpplot_solver::Solver;

    /// Records every call so the drawing order can be asserted.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl DrawingSurface for Recorder {
        fn begin(&mut self, window: &ViewWindow, x_label: &str, y_label: &str) -> Result<(), RenderError> {
            self.calls.push(format!("begin {} {} {x_label} {y_label}", window.x_max, window.y_max));
            Ok(())
        }

        fn fill_region(&mut self, grid: &FeasibilityGrid, _color: Rgba) -> Result<(), RenderError> {
            self.calls.push(format!("region {}", grid.feasible_count()));
            Ok(())
        }

        fn polyline(&mut self, _points: &[(f64, f64)], _color: Rgba, label: &str) -> Result<(), RenderError> {
            self.calls.push(format!("line {label}"));
            Ok(())
        }

        fn marker(&mut self, at: (f64, f64), _color: Rgba, annotation: &[String]) -> Result<(), RenderError> {
            self.calls.push(format!("marker {:.2} {:.2} {}", at.0, at.1, annotation.join("|")));
            Ok(())
        }

        fn titles(&mut self, suptitle: &str, title: &str) -> Result<(), RenderError> {
            self.calls.push(format!("titles {suptitle} / {title}"));
            Ok(())
        }

        fn legend(&mut self, entries: &[LegendEntry]) -> Result<(), RenderError> {
            let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            self.calls.push(format!("legend {}", labels.join(", ")));
            Ok(())
        }
    }

    fn plot_for(objective: &ObjectiveSpec, inputs: &[ConstraintInput]) -> Plot {
        let formulation = formulate(objective, inputs);
        let result = solve(&formulation, &Solver::new());
        let constraints = formulation.constraints();
        let window = ViewWindow::from_constraints(&constraints, &WindowConfig::default());
        let grid = FeasibilityGrid::sample(&constraints, window, 40, FEASIBILITY_TOLERANCE);
        let boundaries = boundary_lines(&formulation.accepted, &window, 40);
        compose(objective, grid, boundaries, &result)
    }

    #[test]
    fn test_compose_optimal() {
        let plot = plot_for(
            &ObjectiveSpec::maximize(3.0, 5.0),
            &[
                ConstraintInput::new(1.0, 2.0, "<=", 14.0),
                ConstraintInput::new(3.0, -1.0, ">=", 0.0),
                ConstraintInput::new(1.0, -1.0, "<=", 2.0),
            ],
        );

        assert_eq!(plot.suptitle, "Maximize Z = 3x + 5y");
        assert_eq!(plot.title, "Optimal Solution: Z = 38.00");
        let marker = plot.marker.as_ref().unwrap();
        assert_eq!(marker.annotation, vec!["Optimal Point", "x=6.00, y=4.00", "Z=38.00"]);

        let labels: Vec<&str> = plot.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Feasible Region",
                "Constraint 1: 1x + 2y <= 14",
                "Constraint 2: 3x - 1y >= 0",
                "Constraint 3: 1x - 1y <= 2",
            ]
        );
        assert_eq!(plot.legend[0].swatch, Swatch::Patch);
        assert_eq!(plot.lines[1].color, Rgba::PALETTE[1]);
    }

    #[test]
    fn test_compose_infeasible() {
        let plot = plot_for(
            &ObjectiveSpec::minimize(1.0, 1.0),
            &[
                ConstraintInput::new(1.0, 0.0, ">=", 5.0),
                ConstraintInput::new(1.0, 0.0, "<=", 2.0),
            ],
        );

        assert_eq!(plot.title, NO_SOLUTION_TITLE);
        assert!(plot.marker.is_none());
        assert!(plot.region.is_empty());
        assert_eq!(plot.legend.len(), 3);
    }

    #[test]
    fn test_render_order() {
        let objective = ObjectiveSpec::maximize(1.0, 1.0);
        let grid = FeasibilityGrid::sample(&[], ViewWindow { x_max: 15.0, y_max: 15.0 }, 4, FEASIBILITY_TOLERANCE);
        let result = SolveResult {
            status: SolveStatus::Optimal,
            optimum: Some(Optimum {
                x: 1.0,
                y: 2.0,
                objective_value: 3.0,
            }),
            method: "test".to_string(),
        };
        let segment = BoundarySegment {
            index: 0,
            label: "Constraint 1: 1x + 1y <= 3".to_string(),
            kind: crate::boundary::BoundaryKind::Sloped,
            points: vec![(0.0, 3.0), (3.0, 0.0)],
        };
        let plot = compose(&objective, grid, vec![segment], &result);

        let mut recorder = Recorder::default();
        plot.render(&mut recorder).unwrap();
        assert_eq!(
            recorder.calls,
            vec![
                "begin 15 15 x y",
                "region 16",
                "line Constraint 1: 1x + 1y <= 3",
                "marker 1.00 2.00 Optimal Point|x=1.00, y=2.00|Z=3.00",
                "titles Maximize Z = 1x + 1y / Optimal Solution: Z = 3.00",
                "legend Feasible Region, Constraint 1: 1x + 1y <= 3",
            ]
        );
    }

    #[test]
    fn test_render_rejects_invalid_window() {
        let mut plot = plot_for(
            &ObjectiveSpec::maximize(1.0, 1.0),
            &[
                ConstraintInput::new(1.0, 1.0, "<=", 4.0),
                ConstraintInput::new(1.0, 0.0, "<=", 3.0),
            ],
        );
        plot.window.x_max = f64::INFINITY;
        let mut recorder = Recorder::default();
        assert!(matches!(plot.render(&mut recorder), Err(RenderError::InvalidWindow { .. })));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_clip_segment() {
        let window = ViewWindow { x_max: 10.0, y_max: 10.0 };
        assert_eq!(clip_segment(&window, (1.0, 1.0), (2.0, 2.0)), Some(((1.0, 1.0), (2.0, 2.0))));
        assert_eq!(clip_segment(&window, (0.0, 20.0), (10.0, 0.0)), Some(((5.0, 10.0), (10.0, 0.0))));
        assert_eq!(clip_segment(&window, (-5.0, 5.0), (5.0, 5.0)), Some(((0.0, 5.0), (5.0, 5.0))));
        assert_eq!(clip_segment(&window, (0.0, 12.0), (10.0, 11.0)), None);
        assert_eq!(clip_segment(&window, (11.0, 0.0), (11.0, 10.0)), None);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(15.0, 10), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);
        assert_eq!(ticks(21.0, 10), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert_eq!(ticks(1.5, 3), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(ticks(f64::NAN, 10), vec![0.0]);
    }
}
