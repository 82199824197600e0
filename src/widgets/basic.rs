//! Single-child box helpers: fixed sizes, insets, alignment, extra
//! constraints, fractional sizing and paint-time transforms.

use crate::error::LayoutError;
use crate::geometry::{EdgeInsets, Matrix, Rect, Size};
use crate::layout::{
    cached, Alignment, BoxConstraints, LayoutContext, LayoutResult, PaintContext, Widget,
};

/// Child layout and placement shared by every single-child box.
#[derive(Debug, Clone, Copy)]
struct ChildSlot {
    rect: Rect,
}

fn paint_slot(
    ctx: &mut PaintContext<'_>,
    child: Option<&dyn Widget>,
    slot: &Option<ChildSlot>,
    name: &'static str,
) -> Result<(), LayoutError> {
    let slot = cached(slot, name)?;
    match child {
        Some(child) => ctx.paint_child(child, slot.rect),
        None => Ok(()),
    }
}

// ── SizedBox ───────────────────────────────────────────────────

/// A box of fixed width and/or height. Axes left unset follow the child.
#[derive(Default)]
pub struct SizedBox {
    width: Option<f64>,
    height: Option<f64>,
    child: Option<Box<dyn Widget>>,
    slot: Option<ChildSlot>,
}

impl SizedBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn from_width(width: f64) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn from_height(height: f64) -> Self {
        Self {
            height: Some(height),
            ..Self::default()
        }
    }

    /// As big as the parent allows.
    pub fn expand() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY)
    }

    pub fn shrink() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.child = Some(Box::new(child));
        self
    }
}

impl Widget for SizedBox {
    fn name(&self) -> &'static str {
        "SizedBox"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let inner = ctx
            .constraints
            .enforce(&BoxConstraints::expand(self.width, self.height));

        let (size, baseline) = match self.child.as_mut() {
            Some(child) => {
                let result = child.layout(&ctx.with_constraints(inner))?;
                (inner.constrain(result.size), result.baseline)
            }
            None => (inner.constrain(Size::ZERO), None),
        };
        self.slot = Some(ChildSlot {
            rect: Rect::from_size(size),
        });
        Ok(LayoutResult::new(size).with_baseline(baseline))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        paint_slot(ctx, self.child.as_deref(), &self.slot, self.name())
    }
}

// ── Padding ────────────────────────────────────────────────────

pub struct Padding {
    padding: EdgeInsets,
    child: Box<dyn Widget>,
    slot: Option<ChildSlot>,
}

impl Padding {
    pub fn new(padding: EdgeInsets, child: impl Widget + 'static) -> Self {
        Self {
            padding,
            child: Box::new(child),
            slot: None,
        }
    }
}

impl Widget for Padding {
    fn name(&self) -> &'static str {
        "Padding"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let inner = ctx.constraints.deflate(&self.padding);
        let result = self.child.layout(&ctx.with_constraints(inner))?;
        let size = ctx.constraints.constrain(self.padding.inflate_size(result.size));
        self.slot = Some(ChildSlot {
            rect: Rect::new(self.padding.left, self.padding.top, result.size.width, result.size.height),
        });
        Ok(LayoutResult::new(size)
            .with_baseline(result.baseline.map(|b| b + self.padding.top))
            .with_repaint(result.needs_repaint))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        paint_slot(ctx, Some(self.child.as_ref()), &self.slot, self.name())
    }
}

// ── Align / Center ─────────────────────────────────────────────

/// Positions its child by `alignment`. Without a factor the box grows to the
/// bounded maximum on that axis; with one it is `factor × child`.
pub struct Align {
    alignment: Alignment,
    width_factor: Option<f64>,
    height_factor: Option<f64>,
    child: Box<dyn Widget>,
    slot: Option<ChildSlot>,
}

fn check_factor(name: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidFactor {
            name,
            expected: "non-negative",
            value,
        })
    }
}

fn check_unit_factor(name: &'static str, value: f64) -> Result<f64, LayoutError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(LayoutError::InvalidFactor {
            name,
            expected: "within [0, 1]",
            value,
        })
    }
}

impl Align {
    pub fn new(alignment: Alignment, child: impl Widget + 'static) -> Self {
        Self {
            alignment,
            width_factor: None,
            height_factor: None,
            child: Box::new(child),
            slot: None,
        }
    }

    pub fn width_factor(mut self, factor: f64) -> Result<Self, LayoutError> {
        self.width_factor = Some(check_factor("widthFactor", factor)?);
        Ok(self)
    }

    pub fn height_factor(mut self, factor: f64) -> Result<Self, LayoutError> {
        self.height_factor = Some(check_factor("heightFactor", factor)?);
        Ok(self)
    }
}

impl Widget for Align {
    fn name(&self) -> &'static str {
        "Align"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let result = self.child.layout(&ctx.with_constraints(c.loosen()))?;
        let child = result.size;

        let axis = |factor: Option<f64>, bounded: bool, max: f64, child: f64| match factor {
            Some(f) => child * f,
            None if bounded => max,
            None => child,
        };
        let size = c.constrain(Size::new(
            axis(self.width_factor, c.has_bounded_width(), c.max_width, child.width),
            axis(self.height_factor, c.has_bounded_height(), c.max_height, child.height),
        ));

        let offset = self.alignment.resolve(size, child);
        self.slot = Some(ChildSlot {
            rect: Rect::from_origin_size(offset, child),
        });
        Ok(LayoutResult::new(size)
            .with_baseline(result.baseline.map(|b| b + offset.y))
            .with_repaint(result.needs_repaint))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        paint_slot(ctx, Some(self.child.as_ref()), &self.slot, self.name())
    }
}

/// [`Align`] with `Alignment::Center`.
pub struct Center(Align);

impl Center {
    pub fn new(child: impl Widget + 'static) -> Self {
        Self(Align::new(Alignment::Center, child))
    }
}

impl Widget for Center {
    fn name(&self) -> &'static str {
        "Center"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        self.0.layout(ctx)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        self.0.paint(ctx)
    }
}

// ── ConstrainedBox ─────────────────────────────────────────────

/// Applies extra constraints on top of the incoming ones.
pub struct ConstrainedBox {
    constraints: BoxConstraints,
    child: Box<dyn Widget>,
    slot: Option<ChildSlot>,
}

impl ConstrainedBox {
    pub fn new(constraints: BoxConstraints, child: impl Widget + 'static) -> Self {
        Self {
            constraints,
            child: Box::new(child),
            slot: None,
        }
    }
}

impl Widget for ConstrainedBox {
    fn name(&self) -> &'static str {
        "ConstrainedBox"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        self.constraints.validate()?;
        let inner = ctx.constraints.enforce(&self.constraints);
        let result = self.child.layout(&ctx.with_constraints(inner))?;
        let size = inner.constrain(result.size);
        self.slot = Some(ChildSlot {
            rect: Rect::from_size(result.size),
        });
        Ok(LayoutResult::new(size)
            .with_baseline(result.baseline)
            .with_repaint(result.needs_repaint))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        paint_slot(ctx, Some(self.child.as_ref()), &self.slot, self.name())
    }
}

// ── FractionallySizedBox ───────────────────────────────────────

/// Sizes its child to a fraction of the bounded incoming maximum.
pub struct FractionallySizedBox {
    width_factor: Option<f64>,
    height_factor: Option<f64>,
    alignment: Alignment,
    child: Box<dyn Widget>,
    slot: Option<ChildSlot>,
}

impl FractionallySizedBox {
    pub fn new(child: impl Widget + 'static) -> Self {
        Self {
            width_factor: None,
            height_factor: None,
            alignment: Alignment::Center,
            child: Box::new(child),
            slot: None,
        }
    }

    pub fn width_factor(mut self, factor: f64) -> Result<Self, LayoutError> {
        self.width_factor = Some(check_unit_factor("widthFactor", factor)?);
        Ok(self)
    }

    pub fn height_factor(mut self, factor: f64) -> Result<Self, LayoutError> {
        self.height_factor = Some(check_unit_factor("heightFactor", factor)?);
        Ok(self)
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn inner_constraints(&self, c: &BoxConstraints) -> BoxConstraints {
        let mut inner = *c;
        if let (Some(f), true) = (self.width_factor, c.has_bounded_width()) {
            let w = c.max_width * f;
            inner.min_width = w;
            inner.max_width = w;
        }
        if let (Some(f), true) = (self.height_factor, c.has_bounded_height()) {
            let h = c.max_height * f;
            inner.min_height = h;
            inner.max_height = h;
        }
        inner
    }
}

impl Widget for FractionallySizedBox {
    fn name(&self) -> &'static str {
        "FractionallySizedBox"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let inner = self.inner_constraints(&c);
        let result = self.child.layout(&ctx.with_constraints(inner))?;
        let size = c.constrain(result.size);
        let offset = self.alignment.resolve(size, result.size);
        self.slot = Some(ChildSlot {
            rect: Rect::from_origin_size(offset, result.size),
        });
        Ok(LayoutResult::new(size).with_repaint(result.needs_repaint))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        paint_slot(ctx, Some(self.child.as_ref()), &self.slot, self.name())
    }
}

// ── Transform ──────────────────────────────────────────────────

/// Applies an affine transform to its child at paint time. Layout is
/// unaffected: the child keeps the size and position it would have without
/// the transform.
pub struct Transform {
    /// Output-space matrix, applied about the alignment point.
    matrix: Matrix,
    alignment: Alignment,
    child: Box<dyn Widget>,
    size: Option<Size>,
}

impl Transform {
    /// Fails for matrices that collapse the child to a line or a point.
    pub fn new(matrix: Matrix, child: impl Widget + 'static) -> Result<Self, LayoutError> {
        if !matrix.is_invertible() {
            return Err(LayoutError::NonInvertibleTransform);
        }
        Ok(Self {
            matrix,
            alignment: Alignment::Center,
            child: Box::new(child),
            size: None,
        })
    }

    /// Counter-clockwise rotation about the child's center.
    pub fn rotate(radians: f64, child: impl Widget + 'static) -> Result<Self, LayoutError> {
        Self::new(Matrix::rotation(radians), child)
    }

    pub fn scale(sx: f64, sy: f64, child: impl Widget + 'static) -> Result<Self, LayoutError> {
        Self::new(Matrix::scale(sx, sy), child)
    }

    /// Shift by `(dx, dy)`, with `dy` measured downward like layout offsets.
    pub fn translate(dx: f64, dy: f64, child: impl Widget + 'static) -> Self {
        Self {
            matrix: Matrix::translation(dx, -dy),
            alignment: Alignment::Center,
            child: Box::new(child),
            size: None,
        }
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The full matrix for a box of `size`, pivoting about the alignment
    /// point.
    fn effective_matrix(&self, size: Size) -> Matrix {
        let pivot = self.alignment.resolve(size, Size::ZERO);
        let (px, py) = (pivot.x, size.height - pivot.y);
        Matrix::translation(-px, -py)
            .then(&self.matrix)
            .then(&Matrix::translation(px, py))
    }
}

impl Widget for Transform {
    fn name(&self) -> &'static str {
        "Transform"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let result = self.child.layout(ctx)?;
        self.size = Some(result.size);
        Ok(result.with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let size = *cached(&self.size, self.name())?;
        let matrix = self.effective_matrix(size);
        ctx.saved(|ctx| {
            ctx.graphics.transform(&matrix);
            self.child.paint(&mut ctx.child(size))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::RecordingGraphics;
    use crate::style::{Color, ThemeData};
    use crate::widgets::Container;

    fn lay_out(widget: &mut dyn Widget, constraints: BoxConstraints) -> LayoutResult {
        let theme = ThemeData::default();
        widget.layout(&LayoutContext::new(constraints, &theme)).unwrap()
    }

    fn fills(widget: &dyn Widget, size: Size) -> Vec<Rect> {
        let theme = ThemeData::default();
        let mut g = RecordingGraphics::new();
        {
            let mut ctx = PaintContext::new(size, &theme, &mut g);
            widget.paint(&mut ctx).unwrap();
        }
        assert!(g.is_balanced());
        g.fill_bounds()
    }

    fn block(w: f64, h: f64) -> Container {
        Container::new().size(w, h).color(Color::BLACK)
    }

    #[test]
    fn sized_box_is_tight_on_given_axes() {
        let mut b = SizedBox::from_width(40.0).child(SizedBox::new(10.0, 25.0));
        let r = lay_out(&mut b, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(r.size, Size::new(40.0, 25.0));
    }

    #[test]
    fn sized_box_expand_fills_bounded_parent() {
        let mut b = SizedBox::expand();
        let r = lay_out(&mut b, BoxConstraints::loose(Size::new(70.0, 30.0)));
        assert_eq!(r.size, Size::new(70.0, 30.0));
    }

    #[test]
    fn padding_adds_insets() {
        let mut p = Padding::new(EdgeInsets::symmetric(5.0, 10.0), SizedBox::new(20.0, 20.0));
        let r = lay_out(&mut p, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(r.size, Size::new(40.0, 30.0));
        assert_eq!(p.slot.unwrap().rect, Rect::new(10.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn align_fills_bounded_axes() {
        let mut a = Align::new(Alignment::BottomRight, SizedBox::new(10.0, 10.0));
        let r = lay_out(&mut a, BoxConstraints::tight(Size::new(50.0, 40.0)));
        assert_eq!(r.size, Size::new(50.0, 40.0));
        assert_eq!(a.slot.unwrap().rect, Rect::new(40.0, 30.0, 10.0, 10.0));
    }

    #[test]
    fn align_factors_scale_child() {
        let mut a = Align::new(Alignment::Center, SizedBox::new(10.0, 20.0))
            .width_factor(2.0)
            .unwrap()
            .height_factor(1.5)
            .unwrap();
        let r = lay_out(&mut a, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(r.size, Size::new(20.0, 30.0));
    }

    #[test]
    fn negative_align_factor_is_rejected() {
        let err = Align::new(Alignment::Center, SizedBox::shrink())
            .width_factor(-1.0)
            .err()
            .unwrap();
        assert!(matches!(err, LayoutError::InvalidFactor { name: "widthFactor", .. }));
        assert_eq!(err.to_string(), "widthFactor must be non-negative, got -1");
    }

    #[test]
    fn center_shrinks_under_unbounded_constraints() {
        let mut c = Center::new(SizedBox::new(12.0, 8.0));
        let r = lay_out(&mut c, BoxConstraints::default());
        assert_eq!(r.size, Size::new(12.0, 8.0));
    }

    #[test]
    fn center_paints_child_in_middle() {
        let mut c = Center::new(block(10.0, 10.0));
        let r = lay_out(&mut c, BoxConstraints::tight(Size::new(30.0, 50.0)));
        assert_eq!(fills(&c, r.size), vec![Rect::new(10.0, 20.0, 10.0, 10.0)]);
    }

    #[test]
    fn constrained_box_enforces_minimum() {
        let extra = BoxConstraints::new(50.0, 80.0, 0.0, f64::INFINITY).unwrap();
        let mut b = ConstrainedBox::new(extra, SizedBox::new(10.0, 10.0));
        let r = lay_out(&mut b, BoxConstraints::loose(Size::new(200.0, 200.0)));
        assert_eq!(r.size, Size::new(50.0, 10.0));
    }

    #[test]
    fn fractionally_sized_box_takes_share() {
        let mut b = FractionallySizedBox::new(SizedBox::expand())
            .width_factor(0.5)
            .unwrap();
        let r = lay_out(&mut b, BoxConstraints::tight(Size::new(200.0, 100.0)));
        assert_eq!(r.size, Size::new(200.0, 100.0));
        assert_eq!(b.slot.unwrap().rect, Rect::new(50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn fraction_outside_unit_range_fails_at_construction() {
        let err = FractionallySizedBox::new(SizedBox::shrink())
            .height_factor(1.2)
            .err()
            .unwrap();
        assert!(matches!(err, LayoutError::InvalidFactor { name: "heightFactor", .. }));
        assert_eq!(err.to_string(), "heightFactor must be within [0, 1], got 1.2");
    }

    #[test]
    fn transform_rejects_singular_matrix() {
        assert!(matches!(
            Transform::scale(0.0, 1.0, SizedBox::shrink()),
            Err(LayoutError::NonInvertibleTransform)
        ));
    }

    #[test]
    fn transform_keeps_layout_size() {
        let mut t = Transform::scale(2.0, 2.0, block(10.0, 10.0)).unwrap();
        let r = lay_out(&mut t, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(r.size, Size::new(10.0, 10.0));
    }

    #[test]
    fn transform_scales_about_center() {
        let mut t = Transform::scale(2.0, 2.0, block(10.0, 10.0)).unwrap();
        let r = lay_out(&mut t, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(fills(&t, r.size), vec![Rect::new(-5.0, -5.0, 20.0, 20.0)]);
    }

    #[test]
    fn transform_translate_is_y_down() {
        let mut t = Transform::translate(10.0, 5.0, block(10.0, 10.0));
        let r = lay_out(&mut t, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(fills(&t, r.size), vec![Rect::new(10.0, -5.0, 10.0, 10.0)]);
    }
}
