//! Simple bar chart, painted straight in output space.

use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size};
use crate::graphics::stroke_line;
use crate::layout::{cached, LayoutContext, LayoutResult, PaintContext, Widget};
use crate::style::Color;

const DEFAULT_SIZE: Size = Size {
    width: 200.0,
    height: 100.0,
};
const AXIS_WIDTH: f64 = 0.5;

pub struct BarChart {
    values: Vec<f64>,
    bar_color: Option<Color>,
    axis_color: Color,
    spacing: f64,
    size: Option<Size>,
}

impl BarChart {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            bar_color: None,
            axis_color: Color::GREY,
            spacing: 4.0,
            size: None,
        }
    }

    /// Defaults to the theme's chart color.
    pub fn bar_color(mut self, color: Color) -> Self {
        self.bar_color = Some(color);
        self
    }

    pub fn axis_color(mut self, color: Color) -> Self {
        self.axis_color = color;
        self
    }

    /// Gap between bars, and between the axis and the first bar.
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Bar rectangles for a chart of `size`, in output space.
    /// Negative values draw as empty bars.
    pub fn bar_rects(&self, size: Size) -> Vec<Rect> {
        let n = self.values.len();
        let max = self.values.iter().copied().fold(0.0_f64, f64::max);
        if n == 0 || max <= 0.0 {
            return Vec::new();
        }
        let bar_width = ((size.width - self.spacing * (n as f64 + 1.0)) / n as f64).max(0.0);
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = self.spacing + i as f64 * (bar_width + self.spacing);
                let height = v.max(0.0) / max * size.height;
                Rect::new(x, 0.0, bar_width, height)
            })
            .collect()
    }
}

impl Widget for BarChart {
    fn name(&self) -> &'static str {
        "BarChart"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let width = if c.has_bounded_width() {
            c.max_width
        } else {
            DEFAULT_SIZE.width
        };
        let height = if c.has_bounded_height() {
            c.max_height
        } else {
            DEFAULT_SIZE.height
        };
        let size = c.constrain(Size::new(width, height));
        self.size = Some(size);
        Ok(LayoutResult::new(size).with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let size = *cached(&self.size, self.name())?;
        let color = self.bar_color.unwrap_or(ctx.theme.chart_color);

        ctx.saved(|ctx| {
            ctx.graphics.set_fill_color(color);
            for bar in self.bar_rects(size) {
                if bar.height > 0.0 {
                    ctx.graphics.rect(bar);
                    ctx.graphics.fill();
                }
            }
            Ok(())
        })?;

        let origin = Point::ZERO;
        stroke_line(
            &mut *ctx.graphics,
            origin,
            Point::new(size.width, 0.0),
            AXIS_WIDTH,
            self.axis_color,
        );
        stroke_line(
            &mut *ctx.graphics,
            origin,
            Point::new(0.0, size.height),
            AXIS_WIDTH,
            self.axis_color,
        );
        Ok(())
    }
}
