//! # Layout Engine
//!
//! Every node in a folio tree is a [`Widget`]. A document is produced in two
//! passes over the tree:
//!
//! 1. **Layout**, top-down constraints and bottom-up sizes. A parent hands
//!    each child a [`BoxConstraints`] inside a [`LayoutContext`], the child
//!    picks a size inside them and returns it in a [`LayoutResult`]. The
//!    parent then decides where the child goes. Positions are widget space:
//!    origin top-left, Y down.
//!
//! 2. **Paint**, top-down. Each widget draws itself through the
//!    [`PaintContext`]'s graphics sink using only what it cached during
//!    layout. Paint never lays anything out again. The sink is in output
//!    space (origin bottom-left, Y up) and every widget paints with its own
//!    bottom-left corner at the origin; parents translate before painting a
//!    child, converting the child's cached widget-space rect with
//!    [`Rect::flip_y`](crate::geometry::Rect::flip_y) on the way.
//!
//! Layout must be idempotent: a parent may lay a child out more than once
//! while probing sizes, and identical contexts must give identical results.
//! Caches a widget keeps between its own `layout` and `paint` are the only
//! state it mutates.
//!
//! The pure arithmetic lives in the submodules so it can be tested without
//! building trees: constraints, alignment, flex distribution, table columns
//! and page breaking.

pub mod alignment;
pub mod constraints;
pub mod flex;
pub mod page_break;
pub mod table;

pub use alignment::Alignment;
pub use constraints::BoxConstraints;
pub use flex::{FlexChildData, TextDirection};

use crate::error::LayoutError;
use crate::font::{FontRegistry, StandardMeasurement};
use crate::geometry::{Rect, Size};
use crate::graphics::GraphicsContext;
use crate::model::PageFormat;
use crate::style::ThemeData;
use crate::text::TextMeasurement;

/// Fallback measurement used when a layout pass has no measurement service.
static STANDARD_MEASUREMENT: StandardMeasurement = StandardMeasurement;

/// Everything a widget's `layout` reads.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub constraints: BoxConstraints,
    pub theme: &'a ThemeData,
    pub text_direction: TextDirection,
    pub text_measurement: Option<&'a dyn TextMeasurement>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(constraints: BoxConstraints, theme: &'a ThemeData) -> Self {
        Self {
            constraints,
            theme,
            text_direction: TextDirection::default(),
            text_measurement: None,
        }
    }

    pub fn with_measurement(mut self, measurement: &'a dyn TextMeasurement) -> Self {
        self.text_measurement = Some(measurement);
        self
    }

    pub fn with_text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    /// The same context with different constraints, for laying out a child.
    pub fn with_constraints(&self, constraints: BoxConstraints) -> Self {
        Self {
            constraints,
            ..*self
        }
    }

    /// The same context threading a different theme down a subtree.
    pub fn with_theme<'b>(&self, theme: &'b ThemeData) -> LayoutContext<'b>
    where
        'a: 'b,
    {
        LayoutContext {
            constraints: self.constraints,
            theme,
            text_direction: self.text_direction,
            text_measurement: self.text_measurement,
        }
    }

    /// The measurement service, or the built-in standard font metrics.
    pub fn measurement(&self) -> &'a dyn TextMeasurement {
        match self.text_measurement {
            Some(m) => m,
            None => &STANDARD_MEASUREMENT,
        }
    }
}

/// What a widget's `layout` returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutResult {
    pub size: Size,
    /// Distance from the top edge to the first text baseline, if any.
    pub baseline: Option<f64>,
    /// Whether painting this subtree draws anything.
    pub needs_repaint: bool,
}

impl LayoutResult {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            baseline: None,
            needs_repaint: false,
        }
    }

    pub fn with_baseline(mut self, baseline: Option<f64>) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_repaint(mut self, needs_repaint: bool) -> Self {
        self.needs_repaint = needs_repaint;
        self
    }
}

/// A page-creation collaborator. Widgets that produce more than one page
/// (`MultiPage`) ask it for pages 2..N; `build` paints one page into a fresh
/// output-space graphics sink the size of `format`.
pub trait PageSink {
    fn add_page(
        &mut self,
        format: &PageFormat,
        build: &mut dyn FnMut(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
    ) -> Result<(), LayoutError>;
}

/// Everything a widget's `paint` reads and writes.
pub struct PaintContext<'a> {
    /// The widget's own resolved size.
    pub size: Size,
    pub theme: &'a ThemeData,
    pub graphics: &'a mut dyn GraphicsContext,
    pub document: Option<&'a mut dyn PageSink>,
    pub fonts: Option<&'a FontRegistry>,
}

impl<'a> PaintContext<'a> {
    pub fn new(size: Size, theme: &'a ThemeData, graphics: &'a mut dyn GraphicsContext) -> Self {
        Self {
            size,
            theme,
            graphics,
            document: None,
            fonts: None,
        }
    }

    pub fn with_document(mut self, document: &'a mut dyn PageSink) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_fonts(mut self, fonts: &'a FontRegistry) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// A context for a child of the given size, sharing this one's sink.
    pub fn child(&mut self, size: Size) -> PaintContext<'_> {
        let document: Option<&mut dyn PageSink> = match self.document {
            Some(ref mut d) => Some(&mut **d),
            None => None,
        };
        PaintContext {
            size,
            theme: self.theme,
            graphics: &mut *self.graphics,
            document,
            fonts: self.fonts,
        }
    }

    /// A context for the same box with a different theme.
    pub fn with_theme<'b>(&'b mut self, theme: &'b ThemeData) -> PaintContext<'b> {
        let size = self.size;
        let mut ctx = self.child(size);
        ctx.theme = theme;
        ctx
    }

    /// Measurement matching the fonts available to this pass.
    pub fn measurement(&self) -> &'a dyn TextMeasurement {
        match self.fonts {
            Some(fonts) => fonts,
            None => &STANDARD_MEASUREMENT,
        }
    }

    /// Run `f` between a graphics save and restore. The restore happens on
    /// every path, including when `f` fails.
    pub fn saved<F>(&mut self, f: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut PaintContext<'_>) -> Result<(), LayoutError>,
    {
        self.graphics.save();
        let result = f(self);
        let restored = self.graphics.restore();
        result.and(restored)
    }

    /// Run `f` with the origin moved to `rect`, given in this widget's
    /// widget-space coordinates, and a context sized to it.
    pub fn in_rect<F>(&mut self, rect: Rect, f: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut PaintContext<'_>) -> Result<(), LayoutError>,
    {
        let out = rect.flip_y(self.size.height);
        self.saved(|ctx| {
            ctx.graphics.translate(out.x, out.y);
            f(&mut ctx.child(rect.size()))
        })
    }

    /// Paint `child` into `rect` (widget space, relative to this widget).
    pub fn paint_child(&mut self, child: &dyn Widget, rect: Rect) -> Result<(), LayoutError> {
        self.in_rect(rect, |ctx| child.paint(ctx))
    }
}

/// Absolute placement request a child makes of its `Stack`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionHint {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A node of the widget tree.
pub trait Widget {
    /// Short type name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Pick a size inside `ctx.constraints` and cache whatever paint needs.
    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError>;

    /// Draw using the cache from the last `layout`. Fails with
    /// [`LayoutError::NotLaidOut`] if there is none.
    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError>;

    /// Participation in a flex parent's main-axis distribution.
    fn flex_data(&self) -> Option<FlexChildData> {
        None
    }

    /// Absolute placement inside a `Stack`.
    fn positioning_hint(&self) -> Option<PositionHint> {
        None
    }
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        (**self).layout(ctx)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        (**self).paint(ctx)
    }

    fn flex_data(&self) -> Option<FlexChildData> {
        (**self).flex_data()
    }

    fn positioning_hint(&self) -> Option<PositionHint> {
        (**self).positioning_hint()
    }
}

/// The layout cache, or the error paint reports without one.
pub(crate) fn cached<'c, T>(cache: &'c Option<T>, widget: &'static str) -> Result<&'c T, LayoutError> {
    cache.as_ref().ok_or(LayoutError::NotLaidOut(widget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::RecordingGraphics;
    use crate::style::Color;

    /// Fills its whole box and remembers how often it was painted.
    struct Swatch {
        size: Option<Size>,
    }

    impl Widget for Swatch {
        fn name(&self) -> &'static str {
            "Swatch"
        }

        fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
            ctx.constraints.validate()?;
            let size = ctx.constraints.constrain(Size::new(10.0, 20.0));
            self.size = Some(size);
            Ok(LayoutResult::new(size).with_repaint(true))
        }

        fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
            let size = cached(&self.size, self.name())?;
            ctx.graphics.set_fill_color(Color::BLACK);
            ctx.graphics.rect(Rect::from_size(*size));
            ctx.graphics.fill();
            Ok(())
        }
    }

    #[test]
    fn paint_before_layout_is_an_error() {
        let theme = ThemeData::default();
        let mut g = RecordingGraphics::new();
        let swatch = Swatch { size: None };
        let mut ctx = PaintContext::new(Size::new(10.0, 20.0), &theme, &mut g);
        assert_eq!(swatch.paint(&mut ctx), Err(LayoutError::NotLaidOut("Swatch")));
    }

    #[test]
    fn paint_child_flips_into_output_space() {
        let theme = ThemeData::default();
        let mut swatch = Swatch { size: None };
        let ctx = LayoutContext::new(BoxConstraints::default(), &theme);
        swatch.layout(&ctx).unwrap();

        let mut g = RecordingGraphics::new();
        {
            let mut ctx = PaintContext::new(Size::new(100.0, 100.0), &theme, &mut g);
            ctx.paint_child(&swatch, Rect::new(5.0, 10.0, 10.0, 20.0))
                .unwrap();
        }
        let fills = g.fill_bounds();
        // Top edge 10pt below the top of a 100pt box: bottom edge at y = 70.
        assert_eq!(fills, vec![Rect::new(5.0, 70.0, 10.0, 20.0)]);
        assert!(g.is_balanced());
    }

    #[test]
    fn saved_restores_even_on_error() {
        let theme = ThemeData::default();
        let mut g = RecordingGraphics::new();
        {
            let mut ctx = PaintContext::new(Size::new(10.0, 10.0), &theme, &mut g);
            let result = ctx.saved(|_| Err(LayoutError::EmptyTransformStack));
            assert_eq!(result, Err(LayoutError::EmptyTransformStack));
        }
        assert!(g.is_balanced());
    }

    #[test]
    fn missing_measurement_falls_back_to_standard_metrics() {
        let theme = ThemeData::default();
        let ctx = LayoutContext::new(BoxConstraints::default(), &theme);
        let w = ctx.measurement().measure_text_width(" ", 12.0, Some("Helvetica"));
        assert!((w - 3.336).abs() < 0.001);
    }
}
