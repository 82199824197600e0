//! Widgets that thread a new theme down their subtree. The theme flows
//! immutably: a wrapper builds its own copy and hands children a reference.

use crate::error::LayoutError;
use crate::layout::{cached, LayoutContext, LayoutResult, PaintContext, Widget};
use crate::style::{TextStyle, ThemeData};

/// Replaces the inherited theme for its subtree.
pub struct Theme {
    data: ThemeData,
    child: Box<dyn Widget>,
    laid_out: bool,
}

impl Theme {
    pub fn new(data: ThemeData, child: impl Widget + 'static) -> Self {
        Self {
            data,
            child: Box::new(child),
            laid_out: false,
        }
    }
}

impl Widget for Theme {
    fn name(&self) -> &'static str {
        "Theme"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let result = self.child.layout(&ctx.with_theme(&self.data))?;
        self.laid_out = true;
        Ok(result)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        if !self.laid_out {
            return Err(LayoutError::NotLaidOut(self.name()));
        }
        self.child.paint(&mut ctx.with_theme(&self.data))
    }
}

/// Layers a text style over the inherited default text style.
pub struct DefaultTextStyle {
    style: TextStyle,
    child: Box<dyn Widget>,
    /// The merged theme from the last layout, reused by paint.
    theme: Option<ThemeData>,
}

impl DefaultTextStyle {
    pub fn new(style: TextStyle, child: impl Widget + 'static) -> Self {
        Self {
            style,
            child: Box::new(child),
            theme: None,
        }
    }
}

impl Widget for DefaultTextStyle {
    fn name(&self) -> &'static str {
        "DefaultTextStyle"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let theme = ctx.theme.with_text_style(&self.style);
        let result = self.child.layout(&ctx.with_theme(&theme))?;
        self.theme = Some(theme);
        Ok(result)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let theme = cached(&self.theme, self.name())?;
        self.child.paint(&mut ctx.with_theme(theme))
    }
}
