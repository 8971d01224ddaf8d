pub mod boundary;
pub mod compose;
pub mod formulate;
pub mod invoke;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod region;
pub mod svg;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use boundary::{BoundaryKind, BoundarySegment, boundary_line, boundary_lines};
pub use compose::{DrawingSurface, LegendEntry, Plot, RenderError, Rgba, compose};
pub use formulate::{ConstraintError, Formulation, IndexedConstraint, formulate};
pub use invoke::{Optimum, SolveResult, SolveStatus, solve};
pub use lexer::{Lexer, Token, TokenKind};
pub use model::{Constraint, ConstraintInput, ObjectiveSpec, Relation, Sense};
pub use parser::{ParseError, Parser};
pub use pipeline::{Analysis, PlotConfig, analyze};
pub use region::{FeasibilityGrid, ViewWindow, WindowConfig};
pub use svg::SvgSurface;
