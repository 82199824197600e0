//! # Graphics Sinks
//!
//! The paint pass draws through [`GraphicsContext`], a small stateful
//! drawing API in output space (origin bottom-left, Y up, PDF points). It
//! mirrors the PDF content-stream model: build a path, then fill, stroke or
//! clip it; `save`/`restore` bracket changes to the graphics state and the
//! current transform.
//!
//! Every `save` must be matched by exactly one `restore` on every path.
//! [`with_saved`] (and `PaintContext::saved`) make that structural.
//!
//! Two sinks ship with the crate: [`RecordingGraphics`] here, which keeps
//! a flat list of [`PaintOp`]s in absolute coordinates for tests and
//! inspection, and `pdf::PdfPage`, which writes content-stream operators.

use crate::error::LayoutError;
use crate::geometry::{Matrix, Point, Rect, Size};
use crate::style::{BoxDecoration, Color};

/// A run of text positioned at its baseline origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Baseline origin in the current coordinate system.
    pub origin: Point,
    pub font_family: &'a str,
    pub font_weight: u32,
    pub italic: bool,
    pub font_size: f64,
    pub color: Color,
}

/// Output-space drawing primitives.
pub trait GraphicsContext {
    fn save(&mut self);
    /// Fails with [`LayoutError::UnbalancedSave`] without a matching `save`.
    fn restore(&mut self) -> Result<(), LayoutError>;

    /// Concatenate `matrix` onto the current transform.
    fn transform(&mut self, matrix: &Matrix);

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(&Matrix::translation(dx, dy));
    }

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);

    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
    fn close_path(&mut self);

    fn rect(&mut self, r: Rect) {
        self.move_to(Point::new(r.x, r.y));
        self.line_to(Point::new(r.x + r.width, r.y));
        self.line_to(Point::new(r.x + r.width, r.y + r.height));
        self.line_to(Point::new(r.x, r.y + r.height));
        self.close_path();
    }

    /// Fill and consume the current path.
    fn fill(&mut self);
    /// Stroke and consume the current path.
    fn stroke(&mut self);
    /// Intersect the clip region with the current path and consume it.
    fn clip(&mut self);

    fn draw_text(&mut self, run: &TextRun<'_>);
}

/// Run `f` between `save` and `restore`. The restore happens even if `f`
/// fails; the first error wins.
pub fn with_saved<F>(g: &mut dyn GraphicsContext, f: F) -> Result<(), LayoutError>
where
    F: FnOnce(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
{
    g.save();
    let result = f(&mut *g);
    let restored = g.restore();
    result.and(restored)
}

/// A stack of current transformation matrices.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Matrix,
    saved: Vec<Matrix>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Matrix {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    pub fn pop(&mut self) -> Result<Matrix, LayoutError> {
        let previous = self.saved.pop().ok_or(LayoutError::EmptyTransformStack)?;
        Ok(std::mem::replace(&mut self.current, previous))
    }

    /// `matrix` is applied to points before the existing transform, the
    /// same order PDF's `cm` uses.
    pub fn concat(&mut self, matrix: &Matrix) {
        self.current = matrix.then(&self.current);
    }

    pub fn apply(&self, p: Point) -> Point {
        self.current.apply(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

impl PathElement {
    fn points(&self) -> Vec<Point> {
        match *self {
            PathElement::MoveTo(p) | PathElement::LineTo(p) => vec![p],
            PathElement::CurveTo(a, b, c) => vec![a, b, c],
            PathElement::Close => vec![],
        }
    }
}

/// One recorded drawing operation, in absolute output coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill {
        path: Vec<PathElement>,
        color: Color,
    },
    Stroke {
        path: Vec<PathElement>,
        color: Color,
        width: f64,
    },
    Clip {
        path: Vec<PathElement>,
    },
    Text {
        text: String,
        origin: Point,
        font_family: String,
        font_size: f64,
        color: Color,
    },
}

impl PaintOp {
    /// Bounding box of the op's geometry. Text reports a zero-size box at
    /// its origin.
    pub fn bounds(&self) -> Rect {
        let path = match self {
            PaintOp::Fill { path, .. } | PaintOp::Stroke { path, .. } | PaintOp::Clip { path } => {
                path
            }
            PaintOp::Text { origin, .. } => return Rect::new(origin.x, origin.y, 0.0, 0.0),
        };
        let mut points = path.iter().flat_map(PathElement::points);
        let Some(first) = points.next() else {
            return Rect::default();
        };
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    fill: Color,
    stroke: Color,
    line_width: f64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
        }
    }
}

/// A sink that records what was drawn instead of encoding it.
#[derive(Debug, Default)]
pub struct RecordingGraphics {
    ops: Vec<PaintOp>,
    transforms: TransformStack,
    state: State,
    saved: Vec<State>,
    path: Vec<PathElement>,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<PaintOp> {
        self.ops
    }

    /// True when every `save` has been restored.
    pub fn is_balanced(&self) -> bool {
        self.saved.is_empty()
    }

    /// Bounding boxes of every fill, in paint order.
    pub fn fill_bounds(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter(|op| matches!(op, PaintOp::Fill { .. }))
            .map(PaintOp::bounds)
            .collect()
    }

    /// Every text run as `(text, baseline origin)`, in paint order.
    pub fn texts(&self) -> Vec<(&str, Point)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { text, origin, .. } => Some((text.as_str(), *origin)),
                _ => None,
            })
            .collect()
    }

    fn take_path(&mut self) -> Vec<PathElement> {
        std::mem::take(&mut self.path)
    }
}

impl GraphicsContext for RecordingGraphics {
    fn save(&mut self) {
        self.transforms.push();
        self.saved.push(self.state);
    }

    fn restore(&mut self) -> Result<(), LayoutError> {
        self.state = self.saved.pop().ok_or(LayoutError::UnbalancedSave)?;
        self.transforms.pop()?;
        Ok(())
    }

    fn transform(&mut self, matrix: &Matrix) {
        self.transforms.concat(matrix);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn move_to(&mut self, p: Point) {
        let p = self.transforms.apply(p);
        self.path.push(PathElement::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        let p = self.transforms.apply(p);
        self.path.push(PathElement::LineTo(p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        let t = &self.transforms;
        let element = PathElement::CurveTo(t.apply(c1), t.apply(c2), t.apply(p));
        self.path.push(element);
    }

    fn close_path(&mut self) {
        self.path.push(PathElement::Close);
    }

    fn fill(&mut self) {
        let path = self.take_path();
        self.ops.push(PaintOp::Fill {
            path,
            color: self.state.fill,
        });
    }

    fn stroke(&mut self) {
        let path = self.take_path();
        self.ops.push(PaintOp::Stroke {
            path,
            color: self.state.stroke,
            width: self.state.line_width,
        });
    }

    fn clip(&mut self) {
        let path = self.take_path();
        self.ops.push(PaintOp::Clip { path });
    }

    fn draw_text(&mut self, run: &TextRun<'_>) {
        self.ops.push(PaintOp::Text {
            text: run.text.to_string(),
            origin: self.transforms.apply(run.origin),
            font_family: run.font_family.to_string(),
            font_size: run.font_size,
            color: run.color,
        });
    }
}

// ── Shapes ─────────────────────────────────────────────────────

/// Bezier approximation constant for quarter circles.
const KAPPA: f64 = 0.5522847498;

/// Add a rectangle with uniformly rounded corners to the current path.
pub fn rounded_rect(g: &mut dyn GraphicsContext, r: Rect, radius: f64) {
    let radius = radius.min(r.width / 2.0).min(r.height / 2.0).max(0.0);
    if radius <= 0.0 {
        g.rect(r);
        return;
    }
    let k = radius * KAPPA;
    let (x, y, w, h) = (r.x, r.y, r.width, r.height);

    g.move_to(Point::new(x + radius, y));
    g.line_to(Point::new(x + w - radius, y));
    g.curve_to(
        Point::new(x + w - radius + k, y),
        Point::new(x + w, y + radius - k),
        Point::new(x + w, y + radius),
    );
    g.line_to(Point::new(x + w, y + h - radius));
    g.curve_to(
        Point::new(x + w, y + h - radius + k),
        Point::new(x + w - radius + k, y + h),
        Point::new(x + w - radius, y + h),
    );
    g.line_to(Point::new(x + radius, y + h));
    g.curve_to(
        Point::new(x + radius - k, y + h),
        Point::new(x, y + h - radius + k),
        Point::new(x, y + h - radius),
    );
    g.line_to(Point::new(x, y + radius));
    g.curve_to(
        Point::new(x, y + radius - k),
        Point::new(x + radius - k, y),
        Point::new(x + radius, y),
    );
    g.close_path();
}

pub fn stroke_line(g: &mut dyn GraphicsContext, from: Point, to: Point, width: f64, color: Color) {
    if width <= 0.0 || color.is_transparent() {
        return;
    }
    g.set_stroke_color(color);
    g.set_line_width(width);
    g.move_to(from);
    g.line_to(to);
    g.stroke();
}

/// Paint shadows, background and border of a box occupying `size` at the
/// origin. Decoration never changes layout; it only draws.
pub fn paint_decoration(
    g: &mut dyn GraphicsContext,
    decoration: &BoxDecoration,
    size: Size,
) -> Result<(), LayoutError> {
    let bounds = Rect::from_size(size);
    let radius = decoration.border_radius;

    for shadow in &decoration.box_shadow {
        if shadow.color.is_transparent() {
            continue;
        }
        // Shadow offsets are given Y-down, like every other layout offset.
        let r = Rect::new(
            shadow.offset_x - shadow.spread,
            -shadow.offset_y - shadow.spread,
            size.width + 2.0 * shadow.spread,
            size.height + 2.0 * shadow.spread,
        );
        with_saved(g, |g| {
            g.set_fill_color(shadow.color);
            rounded_rect(g, r, radius);
            g.fill();
            Ok(())
        })?;
    }

    if let Some(color) = decoration.color.filter(|c| !c.is_transparent()) {
        with_saved(g, |g| {
            g.set_fill_color(color);
            rounded_rect(g, bounds, radius);
            g.fill();
            Ok(())
        })?;
    }

    if let Some(border) = &decoration.border {
        with_saved(g, |g| {
            if border.is_uniform() {
                if border.top.is_visible() {
                    let inset = border.top.width / 2.0;
                    let r = Rect::new(
                        inset,
                        inset,
                        (size.width - border.top.width).max(0.0),
                        (size.height - border.top.width).max(0.0),
                    );
                    g.set_stroke_color(border.top.color);
                    g.set_line_width(border.top.width);
                    rounded_rect(g, r, radius);
                    g.stroke();
                }
                return Ok(());
            }
            let (w, h) = (size.width, size.height);
            let top = border.top;
            let bottom = border.bottom;
            let left = border.left;
            let right = border.right;
            stroke_line(g, Point::new(0.0, h - top.width / 2.0), Point::new(w, h - top.width / 2.0), top.width, top.color);
            stroke_line(g, Point::new(0.0, bottom.width / 2.0), Point::new(w, bottom.width / 2.0), bottom.width, bottom.color);
            stroke_line(g, Point::new(left.width / 2.0, 0.0), Point::new(left.width / 2.0, h), left.width, left.color);
            stroke_line(g, Point::new(w - right.width / 2.0, 0.0), Point::new(w - right.width / 2.0, h), right.width, right.color);
            Ok(())
        })?;
    }
    Ok(())
}
