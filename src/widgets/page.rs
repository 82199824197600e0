//! Single-page root widget.

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::layout::{cached, BoxConstraints, LayoutContext, LayoutResult, PaintContext, Widget};
use crate::model::PageFormat;

/// One page of `format`; the child is laid out loose inside the margins.
pub struct Page {
    format: PageFormat,
    child: Option<Box<dyn Widget>>,
    child_rect: Option<Rect>,
}

impl Page {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            child: None,
            child_rect: None,
        }
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }
}

impl Widget for Page {
    fn name(&self) -> &'static str {
        "Page"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let (width, height) = self.format.size.dimensions();
        let size = ctx.constraints.constrain(Size::new(width, height));
        let margin = self.format.margin;
        let content = margin.deflate_size(size);

        let child_size = match self.child.as_mut() {
            Some(child) => {
                child
                    .layout(&ctx.with_constraints(BoxConstraints::loose(content)))?
                    .size
            }
            None => Size::ZERO,
        };
        if child_size.height > content.height {
            tracing::warn!(
                overflow = child_size.height - content.height,
                "page content is taller than the page; it will be clipped"
            );
        }
        self.child_rect = Some(Rect::new(margin.left, margin.top, child_size.width, child_size.height));
        Ok(LayoutResult::new(size).with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let rect = cached(&self.child_rect, self.name())?;
        match &self.child {
            Some(child) => ctx.paint_child(child.as_ref(), *rect),
            None => Ok(()),
        }
    }
}
