//! The box-model primitive: margin, size limits, padding, decoration and one
//! aligned child.

use crate::error::LayoutError;
use crate::geometry::{EdgeInsets, Rect, Size};
use crate::graphics::paint_decoration;
use crate::layout::{cached, Alignment, BoxConstraints, LayoutContext, LayoutResult, PaintContext, Widget};
use crate::style::{BoxDecoration, Color};

#[derive(Default)]
pub struct Container {
    child: Option<Box<dyn Widget>>,
    width: Option<f64>,
    height: Option<f64>,
    min_width: Option<f64>,
    max_width: Option<f64>,
    min_height: Option<f64>,
    max_height: Option<f64>,
    padding: EdgeInsets,
    margin: EdgeInsets,
    alignment: Alignment,
    decoration: Option<BoxDecoration>,
    layout: Option<ContainerLayout>,
}

#[derive(Debug, Clone, Copy)]
struct ContainerLayout {
    /// The decorated box, inside the margin.
    box_rect: Rect,
    /// Child placement inside the decorated box.
    child_rect: Rect,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn size(self, width: f64, height: f64) -> Self {
        self.width(width).height(height)
    }

    pub fn min_width(mut self, v: f64) -> Self {
        self.min_width = Some(v);
        self
    }

    pub fn max_width(mut self, v: f64) -> Self {
        self.max_width = Some(v);
        self
    }

    pub fn min_height(mut self, v: f64) -> Self {
        self.min_height = Some(v);
        self
    }

    pub fn max_height(mut self, v: f64) -> Self {
        self.max_height = Some(v);
        self
    }

    pub fn padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub fn margin(mut self, margin: EdgeInsets) -> Self {
        self.margin = margin;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn decoration(mut self, decoration: BoxDecoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Shorthand for a decoration that is only a fill.
    pub fn color(self, color: Color) -> Self {
        self.decoration(BoxDecoration::filled(color))
    }

    /// The container's own constraints: incoming minus margin, narrowed by
    /// the min/max limits, pinned by an explicit width/height.
    fn own_constraints(&self, incoming: &BoxConstraints) -> BoxConstraints {
        let outer = incoming.deflate(&self.margin);
        let limits = BoxConstraints {
            min_width: self.min_width.unwrap_or(0.0),
            max_width: self.max_width.unwrap_or(f64::INFINITY),
            min_height: self.min_height.unwrap_or(0.0),
            max_height: self.max_height.unwrap_or(f64::INFINITY),
        };
        let mut own = outer.enforce(&limits);
        if let Some(w) = self.width {
            own = own.tighten_width(w);
        }
        if let Some(h) = self.height {
            own = own.tighten_height(h);
        }
        own
    }
}

impl Widget for Container {
    fn name(&self) -> &'static str {
        "Container"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let own = self.own_constraints(&ctx.constraints);

        let mut child_result = None;
        let box_size = match self.child.as_mut() {
            Some(child) => {
                // Loose, so intrinsically sized children keep their size.
                let child_constraints = own.deflate(&self.padding).loosen();
                let result = child.layout(&ctx.with_constraints(child_constraints))?;
                child_result = Some(result);
                own.constrain(self.padding.inflate_size(result.size))
            }
            None => {
                let natural = self.padding.inflate_size(Size::ZERO);
                Size::new(
                    if own.has_bounded_width() {
                        own.max_width
                    } else {
                        own.constrain_width(natural.width)
                    },
                    if own.has_bounded_height() {
                        own.max_height
                    } else {
                        own.constrain_height(natural.height)
                    },
                )
            }
        };

        let child_size = child_result.map(|r| r.size).unwrap_or(Size::ZERO);
        let inner = self.padding.deflate_size(box_size);
        let offset = self.alignment.resolve(inner, child_size);
        let child_rect = Rect::new(
            offset.x + self.padding.left,
            offset.y + self.padding.top,
            child_size.width,
            child_size.height,
        );
        let box_rect = Rect::new(self.margin.left, self.margin.top, box_size.width, box_size.height);
        self.layout = Some(ContainerLayout {
            box_rect,
            child_rect,
        });

        let size = ctx.constraints.constrain(self.margin.inflate_size(box_size));
        let decorated = self.decoration.as_ref().is_some_and(|d| !d.is_empty());
        let baseline = child_result
            .and_then(|r| r.baseline)
            .map(|b| b + box_rect.y + child_rect.y);
        Ok(LayoutResult::new(size)
            .with_baseline(baseline)
            .with_repaint(decorated || child_result.is_some_and(|r| r.needs_repaint)))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let layout = cached(&self.layout, self.name())?;
        ctx.in_rect(layout.box_rect, |ctx| {
            if let Some(decoration) = &self.decoration {
                paint_decoration(&mut *ctx.graphics, decoration, ctx.size)?;
            }
            match &self.child {
                Some(child) => ctx.paint_child(child.as_ref(), layout.child_rect),
                None => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::RecordingGraphics;
    use crate::style::ThemeData;
    use crate::widgets::SizedBox;

    fn lay_out(widget: &mut dyn Widget, constraints: BoxConstraints) -> Size {
        let theme = ThemeData::default();
        widget
            .layout(&LayoutContext::new(constraints, &theme))
            .unwrap()
            .size
    }

    #[test]
    fn explicit_size_wins() {
        let mut c = Container::new().size(120.0, 40.0);
        let size = lay_out(&mut c, BoxConstraints::loose(Size::new(500.0, 500.0)));
        assert_eq!(size, Size::new(120.0, 40.0));
    }

    #[test]
    fn margin_and_padding_add_up() {
        let mut c = Container::new()
            .padding(EdgeInsets::all(10.0))
            .margin(EdgeInsets::symmetric(5.0, 0.0))
            .child(SizedBox::new(30.0, 20.0));
        let size = lay_out(&mut c, BoxConstraints::loose(Size::new(500.0, 500.0)));
        assert_eq!(size, Size::new(50.0, 50.0));
    }

    #[test]
    fn child_gets_loose_constraints() {
        let mut c = Container::new().size(200.0, 200.0).child(SizedBox::new(30.0, 30.0));
        lay_out(&mut c, BoxConstraints::loose(Size::new(500.0, 500.0)));
        let layout = c.layout.unwrap();
        assert_eq!(layout.child_rect, Rect::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn child_capped_by_explicit_size_minus_padding() {
        let mut c = Container::new()
            .width(100.0)
            .padding(EdgeInsets::all(10.0))
            .child(SizedBox::new(500.0, 10.0));
        lay_out(&mut c, BoxConstraints::loose(Size::new(800.0, 800.0)));
        assert_eq!(c.layout.unwrap().child_rect.width, 80.0);
    }

    #[test]
    fn alignment_positions_child_inside_padding() {
        let mut c = Container::new()
            .size(100.0, 100.0)
            .padding(EdgeInsets::all(10.0))
            .alignment(Alignment::BottomRight)
            .child(SizedBox::new(20.0, 20.0));
        lay_out(&mut c, BoxConstraints::loose(Size::new(500.0, 500.0)));
        assert_eq!(c.layout.unwrap().child_rect, Rect::new(70.0, 70.0, 20.0, 20.0));
    }

    #[test]
    fn childless_container_fills_bounded_space() {
        let mut c = Container::new().color(Color::BLACK);
        let size = lay_out(&mut c, BoxConstraints::loose(Size::new(300.0, 40.0)));
        assert_eq!(size, Size::new(300.0, 40.0));
        let mut u = Container::new().padding(EdgeInsets::all(4.0));
        assert_eq!(lay_out(&mut u, BoxConstraints::default()), Size::new(8.0, 8.0));
    }

    #[test]
    fn min_max_limits_clamp() {
        let mut c = Container::new().max_width(50.0).min_height(70.0).child(SizedBox::new(90.0, 10.0));
        let size = lay_out(&mut c, BoxConstraints::loose(Size::new(500.0, 500.0)));
        assert_eq!(size, Size::new(50.0, 70.0));
    }

    #[test]
    fn invalid_constraints_fail_fast() {
        let theme = ThemeData::default();
        let bad = BoxConstraints {
            min_width: 10.0,
            max_width: 5.0,
            min_height: 0.0,
            max_height: 5.0,
        };
        let mut c = Container::new();
        assert!(matches!(
            c.layout(&LayoutContext::new(bad, &theme)),
            Err(LayoutError::InvalidConstraints { .. })
        ));
    }

    #[test]
    fn paints_decoration_inside_margin() {
        let theme = ThemeData::default();
        let mut c = Container::new()
            .size(50.0, 20.0)
            .margin(EdgeInsets::only(10.0, 0.0, 0.0, 5.0))
            .color(Color::BLACK);
        let size = lay_out(&mut c, BoxConstraints::loose(Size::new(100.0, 100.0)));
        assert_eq!(size, Size::new(55.0, 30.0));

        let mut g = RecordingGraphics::new();
        {
            let mut ctx = PaintContext::new(size, &theme, &mut g);
            c.paint(&mut ctx).unwrap();
        }
        // 10pt top margin in a 30pt box: the fill sits on the bottom edge.
        assert_eq!(g.fill_bounds(), vec![Rect::new(5.0, 0.0, 50.0, 20.0)]);
        assert!(g.is_balanced());
    }
}
