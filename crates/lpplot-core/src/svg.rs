//! SVG drawing surface on top of the `layout` crate's SVG writer.

use std::path::Path;

use layout::backends::svg::SVGWriter;
use layout::core::color::Color;
use layout::core::format::RenderBackend;
use layout::core::geometry::Point;
use layout::core::style::StyleAttr;

use crate::compose::{DrawingSurface, LegendEntry, RenderError, Rgba, Swatch, clip_segment, ticks};
use crate::region::{FeasibilityGrid, ViewWindow};

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 90.0;
const MARGIN_BOTTOM: f64 = 70.0;
const FONT_SIZE: usize = 14;
const CHAR_WIDTH: f64 = 0.6;

/// Maps the view window onto the canvas, y axis pointing up.
#[derive(Debug, Clone, Copy)]
struct Frame {
    window: ViewWindow,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn to_canvas(&self, (x, y): (f64, f64)) -> Point {
        Point::new(
            self.left + x / self.window.x_max * self.width,
            self.top + (1.0 - y / self.window.y_max) * self.height,
        )
    }
}

pub struct SvgSurface {
    writer: SVGWriter,
    width: f64,
    height: f64,
    frame: Option<Frame>,
}

impl SvgSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            writer: SVGWriter::new(),
            width: width as f64,
            height: height as f64,
            frame: None,
        }
    }

    pub fn finish(self) -> String {
        self.writer.finalize()
    }

    pub fn save(self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        std::fs::write(path, self.finish())?;
        Ok(())
    }

    fn frame(&self) -> Result<Frame, RenderError> {
        self.frame.ok_or(RenderError::NotStarted)
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba, width: usize) {
        let look = style(color, width, None);
        self.writer.draw_line(from, to, &look, None);
    }

    /// Left-aligned text whose baseline box starts at `xy`.
    fn text_from(&mut self, xy: Point, text: &str, color: Rgba, font_size: usize) {
        let center = Point::new(xy.x + text_width(text, font_size) / 2.0, xy.y);
        let mut look = style(color, 1, None);
        look.font_size = font_size;
        self.writer.draw_text(center, text, &look);
    }

    fn text_centered(&mut self, xy: Point, text: &str, color: Rgba, font_size: usize) {
        let mut look = style(color, 1, None);
        look.font_size = font_size;
        self.writer.draw_text(xy, text, &look);
    }
}

impl DrawingSurface for SvgSurface {
    fn begin(&mut self, window: &ViewWindow, x_label: &str, y_label: &str) -> Result<(), RenderError> {
        if !window.is_valid() {
            return Err(RenderError::InvalidWindow {
                x_max: window.x_max,
                y_max: window.y_max,
            });
        }
        let frame = Frame {
            window: *window,
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };
        self.frame = Some(frame);

        let background = style(Rgba(0xffffffff), 0, Some(Rgba(0xffffffff)));
        self.writer.draw_rect(
            Point::new(0.0, 0.0),
            Point::new(self.width, self.height),
            &background,
            None,
            None,
        );

        let bottom = frame.top + frame.height;
        for x in ticks(window.x_max, 10) {
            let p = frame.to_canvas((x, 0.0));
            self.line(Point::new(p.x, frame.top), Point::new(p.x, bottom), Rgba::GRID, 1);
            self.text_centered(Point::new(p.x, bottom + 16.0), &tick_label(x), Rgba::BLACK, 11);
        }
        for y in ticks(window.y_max, 10) {
            let p = frame.to_canvas((0.0, y));
            self.line(Point::new(frame.left, p.y), Point::new(frame.left + frame.width, p.y), Rgba::GRID, 1);
            let label = tick_label(y);
            let left = frame.left - 8.0 - text_width(&label, 11);
            self.text_from(Point::new(left, p.y), &label, Rgba::BLACK, 11);
        }

        let axes = style(Rgba::BLACK, 1, None);
        self.writer.draw_rect(
            Point::new(frame.left, frame.top),
            Point::new(frame.width, frame.height),
            &axes,
            None,
            None,
        );
        self.text_centered(
            Point::new(frame.left + frame.width / 2.0, bottom + 40.0),
            x_label,
            Rgba::BLACK,
            FONT_SIZE,
        );
        self.text_centered(
            Point::new(frame.left - 50.0, frame.top + frame.height / 2.0),
            y_label,
            Rgba::BLACK,
            FONT_SIZE,
        );
        Ok(())
    }

    fn fill_region(&mut self, grid: &FeasibilityGrid, color: Rgba) -> Result<(), RenderError> {
        let frame = self.frame()?;
        let cell_width = frame.width / grid.columns() as f64;
        let cell_height = frame.height / grid.rows() as f64;
        let look = style(color, 0, Some(color));

        for row in 0..grid.rows() {
            let top = frame.top + frame.height - (row + 1) as f64 * cell_height;
            for (start, end) in grid.runs(row) {
                let left = frame.left + start as f64 * cell_width;
                let size = Point::new((end - start) as f64 * cell_width, cell_height);
                self.writer.draw_rect(Point::new(left, top), size, &look, None, None);
            }
        }
        Ok(())
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: Rgba, _label: &str) -> Result<(), RenderError> {
        let frame = self.frame()?;
        for pair in points.windows(2) {
            let Some((a, b)) = clip_segment(&frame.window, pair[0], pair[1]) else {
                continue;
            };
            self.line(frame.to_canvas(a), frame.to_canvas(b), color, 2);
        }
        Ok(())
    }

    fn marker(&mut self, at: (f64, f64), color: Rgba, annotation: &[String]) -> Result<(), RenderError> {
        let frame = self.frame()?;
        let center = frame.to_canvas(at);
        let look = style(color, 1, Some(color));
        self.writer.draw_circle(center, Point::new(14.0, 14.0), &look, None);

        let line_height = FONT_SIZE as f64 * 1.3;
        let first = center.y - 10.0 - line_height * (annotation.len().saturating_sub(1)) as f64;
        for (i, text) in annotation.iter().enumerate() {
            let y = first + i as f64 * line_height;
            self.text_from(Point::new(center.x + 10.0, y), text, Rgba::ANNOTATION, FONT_SIZE);
        }
        Ok(())
    }

    fn titles(&mut self, suptitle: &str, title: &str) -> Result<(), RenderError> {
        let frame = self.frame()?;
        let middle = frame.left + frame.width / 2.0;
        self.text_centered(Point::new(middle, 28.0), suptitle, Rgba::SUPTITLE, 18);
        self.text_centered(Point::new(middle, 60.0), title, Rgba::BLACK, 15);
        Ok(())
    }

    fn legend(&mut self, entries: &[LegendEntry]) -> Result<(), RenderError> {
        let frame = self.frame()?;
        if entries.is_empty() {
            return Ok(());
        }

        let font_size = 12;
        let row_height = 20.0;
        let swatch_width = 24.0;
        let widest = entries
            .iter()
            .map(|e| text_width(&e.label, font_size))
            .fold(0.0, f64::max);
        let width = swatch_width + widest + 24.0;
        let height = entries.len() as f64 * row_height + 10.0;
        let left = frame.left + frame.width - width - 10.0;
        let top = frame.top + 10.0;

        let boxed = style(Rgba(0xccccccff), 1, Some(Rgba(0xffffffe6)));
        self.writer.draw_rect(Point::new(left, top), Point::new(width, height), &boxed, None, None);

        for (i, entry) in entries.iter().enumerate() {
            let y = top + 5.0 + row_height * (i as f64 + 0.5);
            let x = left + 8.0;
            match entry.swatch {
                Swatch::Patch => {
                    let look = style(entry.color, 0, Some(entry.color));
                    self.writer.draw_rect(
                        Point::new(x, y - 6.0),
                        Point::new(swatch_width, 12.0),
                        &look,
                        None,
                        None,
                    );
                }
                Swatch::Line => self.line(Point::new(x, y), Point::new(x + swatch_width, y), entry.color, 2),
            }
            self.text_from(Point::new(x + swatch_width + 8.0, y), &entry.label, Rgba::BLACK, font_size);
        }
        Ok(())
    }
}

fn style(line: Rgba, line_width: usize, fill: Option<Rgba>) -> StyleAttr {
    let mut look = StyleAttr::simple();
    look.line_color = Color::new(line.0);
    look.line_width = line_width;
    look.fill_color = fill.map(|f| Color::new(f.0));
    look.font_size = FONT_SIZE;
    look
}

fn text_width(text: &str, font_size: usize) -> f64 {
    text.chars().count() as f64 * font_size as f64 * CHAR_WIDTH
}

fn tick_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
