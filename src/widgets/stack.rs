//! Overlapping children. Non-positioned children size the stack; positioned
//! ones are placed against its final size and never grow it.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::layout::{
    cached, Alignment, BoxConstraints, LayoutContext, LayoutResult, PaintContext, PositionHint,
    Widget,
};

/// How non-positioned children are constrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackFit {
    /// Incoming constraints with the minimums dropped.
    #[default]
    Loose,
    /// Tight to the incoming maximum on every bounded axis.
    Expand,
    /// Incoming constraints unchanged.
    Passthrough,
}

#[derive(Default)]
pub struct Stack {
    children: Vec<Box<dyn Widget>>,
    alignment: Alignment,
    fit: StackFit,
    rects: Option<Vec<Rect>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_children(mut self, children: Vec<Box<dyn Widget>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn fit(mut self, fit: StackFit) -> Self {
        self.fit = fit;
        self
    }

    fn non_positioned_constraints(&self, c: &BoxConstraints) -> BoxConstraints {
        match self.fit {
            StackFit::Loose => c.loosen(),
            StackFit::Expand => {
                let mut tight = *c;
                if c.has_bounded_width() {
                    tight.min_width = c.max_width;
                }
                if c.has_bounded_height() {
                    tight.min_height = c.max_height;
                }
                tight
            }
            StackFit::Passthrough => *c,
        }
    }
}

/// Constraints for a positioned child on one axis: tight when its extent is
/// fully determined, otherwise anything up to the stack's extent.
fn positioned_axis(
    extent: Option<f64>,
    start: Option<f64>,
    end: Option<f64>,
    stack: f64,
) -> (f64, f64) {
    match (extent, start, end) {
        (Some(e), _, _) => (e, e),
        (None, Some(s), Some(e)) => {
            let v = (stack - s - e).max(0.0);
            (v, v)
        }
        _ => (0.0, stack),
    }
}

/// Offset of a positioned child on one axis, falling back to alignment.
fn positioned_offset(start: Option<f64>, end: Option<f64>, stack: f64, child: f64, aligned: f64) -> f64 {
    match (start, end) {
        (Some(s), _) => s,
        (None, Some(e)) => stack - e - child,
        (None, None) => aligned,
    }
}

impl Widget for Stack {
    fn name(&self) -> &'static str {
        "Stack"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let inner = self.non_positioned_constraints(&c);

        let mut sizes: Vec<Option<Size>> = Vec::with_capacity(self.children.len());
        let mut extent: Option<Size> = None;
        for child in self.children.iter_mut() {
            if child.positioning_hint().is_some() {
                sizes.push(None);
                continue;
            }
            let size = child.layout(&ctx.with_constraints(inner))?.size;
            extent = Some(match extent {
                Some(e) => Size::new(e.width.max(size.width), e.height.max(size.height)),
                None => size,
            });
            sizes.push(Some(size));
        }

        let size = match (self.fit, extent) {
            (StackFit::Expand, _) | (_, None) => {
                let fill = |bounded: bool, max: f64, min: f64, content: f64| {
                    if bounded {
                        max
                    } else {
                        min.max(content)
                    }
                };
                let content = extent.unwrap_or(Size::ZERO);
                Size::new(
                    fill(c.has_bounded_width(), c.max_width, c.min_width, content.width),
                    fill(c.has_bounded_height(), c.max_height, c.min_height, content.height),
                )
            }
            (_, Some(e)) => c.constrain(e),
        };

        let mut rects = Vec::with_capacity(self.children.len());
        for (child, laid_out) in self.children.iter_mut().zip(sizes) {
            let rect = match (laid_out, child.positioning_hint()) {
                (Some(child_size), _) => {
                    Rect::from_origin_size(self.alignment.resolve(size, child_size), child_size)
                }
                (None, Some(hint)) => {
                    let (min_w, max_w) = positioned_axis(hint.width, hint.left, hint.right, size.width);
                    let (min_h, max_h) = positioned_axis(hint.height, hint.top, hint.bottom, size.height);
                    let child_constraints = BoxConstraints {
                        min_width: min_w,
                        max_width: max_w,
                        min_height: min_h,
                        max_height: max_h,
                    };
                    let child_size = child.layout(&ctx.with_constraints(child_constraints))?.size;
                    let aligned = self.alignment.resolve(size, child_size);
                    Rect::new(
                        positioned_offset(hint.left, hint.right, size.width, child_size.width, aligned.x),
                        positioned_offset(hint.top, hint.bottom, size.height, child_size.height, aligned.y),
                        child_size.width,
                        child_size.height,
                    )
                }
                (None, None) => Rect::default(),
            };
            rects.push(rect);
        }
        self.rects = Some(rects);

        Ok(LayoutResult::new(size).with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let rects = cached(&self.rects, self.name())?;
        for (child, rect) in self.children.iter().zip(rects) {
            ctx.paint_child(child.as_ref(), *rect)?;
        }
        Ok(())
    }
}

/// Places its child at explicit offsets inside the enclosing [`Stack`].
/// Outside a stack it lays out like its child.
pub struct Positioned {
    hint: PositionHint,
    child: Box<dyn Widget>,
}

impl Positioned {
    pub fn new(child: impl Widget + 'static) -> Self {
        Self {
            hint: PositionHint::default(),
            child: Box::new(child),
        }
    }

    /// Stretch to all four edges of the stack.
    pub fn fill(child: impl Widget + 'static) -> Self {
        Self::new(child).left(0.0).top(0.0).right(0.0).bottom(0.0)
    }

    pub fn from_hint(hint: PositionHint, child: Box<dyn Widget>) -> Self {
        Self { hint, child }
    }

    pub fn left(mut self, v: f64) -> Self {
        self.hint.left = Some(v);
        self
    }

    pub fn top(mut self, v: f64) -> Self {
        self.hint.top = Some(v);
        self
    }

    pub fn right(mut self, v: f64) -> Self {
        self.hint.right = Some(v);
        self
    }

    pub fn bottom(mut self, v: f64) -> Self {
        self.hint.bottom = Some(v);
        self
    }

    pub fn width(mut self, v: f64) -> Self {
        self.hint.width = Some(v);
        self
    }

    pub fn height(mut self, v: f64) -> Self {
        self.hint.height = Some(v);
        self
    }
}

impl Widget for Positioned {
    fn name(&self) -> &'static str {
        "Positioned"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        self.child.layout(ctx)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        self.child.paint(ctx)
    }

    fn positioning_hint(&self) -> Option<PositionHint> {
        Some(self.hint)
    }
}
