use crate::formulate::IndexedConstraint;
use crate::model::{Constraint, DEGENERACY_TOLERANCE};
use crate::region::{ViewWindow, linspace};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// `y` solved pointwise across the x range
    Sloped,
    /// `x = rhs / coeff_x` across the full y range
    Vertical,
}

/// Where one constraint holds with equality, as a polyline over the window.
/// Sloped lines may leave the window vertically; clipping is the drawing
/// surface's job.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySegment {
    /// Zero-based position of the constraint in the user's input
    pub index: usize,
    pub label: String,
    pub kind: BoundaryKind,
    pub points: Vec<(f64, f64)>,
}

/// Polyline for `constraint`, or `None` when both coefficients are
/// negligible.
pub fn boundary_line(
    constraint: &Constraint,
    window: &ViewWindow,
    samples: usize,
) -> Option<(BoundaryKind, Vec<(f64, f64)>)> {
    let Constraint {
        coeff_x: a,
        coeff_y: b,
        rhs,
        ..
    } = *constraint;

    if b.abs() > DEGENERACY_TOLERANCE {
        let points = linspace(window.x_max, samples.max(2))
            .into_iter()
            .map(|x| (x, (rhs - a * x) / b))
            .collect();
        Some((BoundaryKind::Sloped, points))
    } else if a.abs() > DEGENERACY_TOLERANCE {
        let x = rhs / a;
        Some((BoundaryKind::Vertical, vec![(x, 0.0), (x, window.y_max)]))
    } else {
        None
    }
}

/// One segment per drawable constraint, in input order.
pub fn boundary_lines(
    constraints: &[IndexedConstraint],
    window: &ViewWindow,
    samples: usize,
) -> Vec<BoundarySegment> {
    let mut segments = Vec::with_capacity(constraints.len());
    for c in constraints {
        let Some((kind, points)) = boundary_line(&c.constraint, window, samples) else {
            log::warn!("constraint {} is degenerate; no boundary drawn", c.index + 1);
            continue;
        };
        segments.push(BoundarySegment {
            index: c.index,
            label: format!("Constraint {}: {}", c.index + 1, c.constraint),
            kind,
            points,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FEASIBILITY_TOLERANCE;
    use crate::region::{FeasibilityGrid, WindowConfig};

    fn indexed(constraints: &[Constraint]) -> Vec<IndexedConstraint> {
        constraints
            .iter()
            .enumerate()
            .map(|(index, &constraint)| IndexedConstraint { index, constraint })
            .collect()
    }

    #[test]
    fn test_sloped_line_satisfies_equality() {
        let c = Constraint::le(1.0, 2.0, 14.0);
        let window = ViewWindow { x_max: 21.0, y_max: 15.0 };
        let (kind, points) = boundary_line(&c, &window, 50).unwrap();

        assert_eq!(kind, BoundaryKind::Sloped);
        assert_eq!(points.len(), 50);
        assert_eq!(points[0], (0.0, 7.0));
        assert!((points[49].0 - 21.0).abs() < 1e-12);
        for (x, y) in points {
            assert!((c.lhs(x, y) - 14.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_vertical_line() {
        let c = Constraint::ge(2.0, 0.0, 10.0);
        let window = ViewWindow { x_max: 15.0, y_max: 12.0 };
        let (kind, points) = boundary_line(&c, &window, 50).unwrap();

        assert_eq!(kind, BoundaryKind::Vertical);
        assert_eq!(points, vec![(5.0, 0.0), (5.0, 12.0)]);
    }

    #[test]
    fn test_near_vertical_uses_vertical_branch() {
        let c = Constraint::le(1.0, 1e-9, 3.0);
        let window = ViewWindow { x_max: 15.0, y_max: 15.0 };
        let (kind, _) = boundary_line(&c, &window, 50).unwrap();
        assert_eq!(kind, BoundaryKind::Vertical);
    }

    #[test]
    fn test_degenerate_is_skipped() {
        let window = ViewWindow { x_max: 15.0, y_max: 15.0 };
        assert!(boundary_line(&Constraint::le(0.0, 0.0, 5.0), &window, 50).is_none());

        let constraints = indexed(&[Constraint::le(0.0, 0.0, 5.0), Constraint::le(1.0, 1.0, 4.0)]);
        let segments = boundary_lines(&constraints, &window, 50);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[0].label, "Constraint 2: 1x + 1y <= 4");
    }

    #[test]
    fn test_labels_follow_input_order() {
        let window = ViewWindow { x_max: 15.0, y_max: 15.0 };
        let constraints = indexed(&[
            Constraint::le(1.0, 2.0, 14.0),
            Constraint::ge(3.0, -1.0, 0.0),
            Constraint::le(1.0, -1.0, 2.0),
        ]);
        let labels: Vec<String> = boundary_lines(&constraints, &window, 10)
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Constraint 1: 1x + 2y <= 14",
                "Constraint 2: 3x - 1y >= 0",
                "Constraint 3: 1x - 1y <= 2",
            ]
        );
    }

    #[test]
    fn test_grid_and_boundaries_agree() {
        // Any grid point ruled out by exactly one constraint must lie on the
        // far side of that constraint's rendered line.
        let constraints = vec![
            Constraint::le(1.0, 2.0, 14.0),
            Constraint::ge(3.0, -1.0, 0.0),
            Constraint::le(1.0, 0.0, 9.0),
        ];
        let window = ViewWindow::from_constraints(&constraints, &WindowConfig::default());
        let grid = FeasibilityGrid::sample(&constraints, window, 80, FEASIBILITY_TOLERANCE);

        let mut checked = 0;
        for (row, &y) in grid.ys().iter().enumerate() {
            for (column, &x) in grid.xs().iter().enumerate() {
                if grid.is_feasible(column, row) {
                    continue;
                }
                let violated: Vec<&Constraint> = constraints
                    .iter()
                    .filter(|c| !c.holds(x, y, FEASIBILITY_TOLERANCE))
                    .collect();
                let [c] = violated.as_slice() else {
                    continue;
                };
                checked += 1;

                let (kind, points) = boundary_line(c, &window, 2).unwrap();
                // Signed offset from the line, positive where the constraint fails
                let offset = match kind {
                    BoundaryKind::Sloped => {
                        let line_y = (c.rhs - c.coeff_x * x) / c.coeff_y;
                        (y - line_y) * c.coeff_y
                    }
                    BoundaryKind::Vertical => (x - points[0].0) * c.coeff_x,
                };
                let offset = match c.relation {
                    crate::model::Relation::Le => offset,
                    crate::model::Relation::Ge => -offset,
                };
                assert!(offset > -FEASIBILITY_TOLERANCE, "({x}, {y}) is on the feasible side of {c}");
            }
        }
        assert!(checked > 0);
    }
}
