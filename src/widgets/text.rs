//! Paragraph text. Layout wraps through the context's measurement service
//! and caches the lines; paint draws each line at its baseline.

use crate::error::LayoutError;
use crate::geometry::{Point, Size};
use crate::graphics::{stroke_line, TextRun};
use crate::layout::{cached, LayoutContext, LayoutResult, PaintContext, TextDirection, Widget};
use crate::style::{ResolvedTextStyle, TextAlign, TextDecoration, TextStyle, ThemeData};
use crate::text::{TextLine, TextOptions};

/// Which theme style a text node starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextRole {
    #[default]
    Body,
    TableHeader,
    TableCell,
}

impl TextRole {
    fn base_style(self, theme: &ThemeData) -> TextStyle {
        match self {
            TextRole::Body => theme.default_text_style.clone(),
            TextRole::TableHeader => theme.default_text_style.merge(&theme.table_header),
            TextRole::TableCell => theme.default_text_style.merge(&theme.table_cell),
        }
    }
}

/// Horizontal placement of a line, after `Start`/`End` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAlign {
    Left,
    Right,
    Center,
}

impl LineAlign {
    fn resolve(align: TextAlign, direction: TextDirection) -> Self {
        let rtl = direction == TextDirection::Rtl;
        match align {
            TextAlign::Left => LineAlign::Left,
            TextAlign::Right => LineAlign::Right,
            TextAlign::Center => LineAlign::Center,
            TextAlign::Start | TextAlign::Justify if rtl => LineAlign::Right,
            TextAlign::Start | TextAlign::Justify => LineAlign::Left,
            TextAlign::End if rtl => LineAlign::Left,
            TextAlign::End => LineAlign::Right,
        }
    }

    fn offset(self, box_width: f64, line_width: f64) -> f64 {
        match self {
            LineAlign::Left => 0.0,
            LineAlign::Right => box_width - line_width,
            LineAlign::Center => (box_width - line_width) / 2.0,
        }
    }
}

#[derive(Debug, Clone)]
struct TextLayout {
    style: ResolvedTextStyle,
    lines: Vec<TextLine>,
    /// First baseline, from the top of the box.
    baseline: f64,
    align: LineAlign,
    size: Size,
}

pub struct Text {
    text: String,
    style: TextStyle,
    role: TextRole,
    text_align: TextAlign,
    max_lines: Option<usize>,
    soft_wrap: bool,
    layout: Option<TextLayout>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            role: TextRole::Body,
            text_align: TextAlign::Start,
            max_lines: None,
            soft_wrap: true,
            layout: None,
        }
    }

    pub fn style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn role(mut self, role: TextRole) -> Self {
        self.role = role;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    /// With soft wrap off, only `\n` breaks lines.
    pub fn soft_wrap(mut self, soft_wrap: bool) -> Self {
        self.soft_wrap = soft_wrap;
        self
    }

    /// Lines from the last layout.
    pub fn lines(&self) -> Option<Vec<&str>> {
        self.layout
            .as_ref()
            .map(|l| l.lines.iter().map(|line| line.text.as_str()).collect())
    }

    fn options(&self, style: &ResolvedTextStyle) -> TextOptions {
        TextOptions {
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            font_weight: style.font_weight.value(),
            italic: style.is_italic(),
            line_spacing: style.line_spacing,
            letter_spacing: style.letter_spacing,
            max_lines: self.max_lines,
        }
    }
}

impl Widget for Text {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let style = self.role.base_style(ctx.theme).merge(&self.style).resolve();
        let opts = self.options(&style);
        let max_width = if self.soft_wrap {
            c.max_width
        } else {
            f64::INFINITY
        };

        let metrics = ctx
            .measurement()
            .measure_text_with_wrapping(&self.text, max_width, &opts);
        let size = c.constrain(Size::new(metrics.width, metrics.height));
        let baseline = metrics.baseline;
        let visible = !self.text.trim().is_empty();

        self.layout = Some(TextLayout {
            style,
            lines: metrics.lines,
            baseline,
            align: LineAlign::resolve(self.text_align, ctx.text_direction),
            size,
        });
        Ok(LayoutResult::new(size)
            .with_baseline(Some(baseline))
            .with_repaint(visible))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let layout = cached(&self.layout, self.name())?;
        let style = &layout.style;
        let height = ctx.size.height;
        let line_height = style.line_height();

        for (i, line) in layout.lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let x = layout.align.offset(layout.size.width, line.width);
            let baseline = layout.baseline + i as f64 * line_height;
            let y = height - baseline;
            ctx.graphics.draw_text(&TextRun {
                text: &line.text,
                origin: Point::new(x, y),
                font_family: &style.font_family,
                font_weight: style.font_weight.value(),
                italic: style.is_italic(),
                font_size: style.font_size,
                color: style.color,
            });

            let decoration_y = match style.decoration {
                TextDecoration::None => continue,
                TextDecoration::Underline => y - style.font_size * 0.1,
                TextDecoration::LineThrough => y + style.font_size * 0.3,
            };
            stroke_line(
                &mut *ctx.graphics,
                Point::new(x, decoration_y),
                Point::new(x + line.width, decoration_y),
                style.font_size * 0.05,
                style.color,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{PaintOp, RecordingGraphics};
    use crate::layout::BoxConstraints;
    use crate::text::MonospaceMeasurement;

    fn lay_out(text: &mut Text, max_width: f64, direction: TextDirection) -> LayoutResult {
        let theme = ThemeData::default();
        let ctx = LayoutContext::new(BoxConstraints::loose(Size::new(max_width, 1000.0)), &theme)
            .with_measurement(&MonospaceMeasurement)
            .with_text_direction(direction);
        text.layout(&ctx).unwrap()
    }

    fn paint(text: &Text, size: Size) -> RecordingGraphics {
        let theme = ThemeData::default();
        let mut g = RecordingGraphics::new();
        {
            let mut ctx = PaintContext::new(size, &theme, &mut g);
            text.paint(&mut ctx).unwrap();
        }
        g
    }

    fn style() -> TextStyle {
        TextStyle {
            font_size: Some(10.0),
            line_spacing: Some(1.0),
            ..TextStyle::default()
        }
    }

    #[test]
    fn sizes_to_wrapped_content() {
        let mut t = Text::new("hello world").style(style());
        let r = lay_out(&mut t, 40.0, TextDirection::Ltr);
        assert_eq!(r.size, Size::new(25.0, 20.0));
        assert_eq!(t.lines().unwrap(), vec!["hello", "world"]);
        // Ascent 8pt with no leading.
        assert_eq!(r.baseline, Some(8.0));
    }

    #[test]
    fn no_soft_wrap_keeps_one_line() {
        let mut t = Text::new("hello world").style(style()).soft_wrap(false);
        let r = lay_out(&mut t, 40.0, TextDirection::Ltr);
        assert_eq!(t.lines().unwrap().len(), 1);
        // Clamped to the constraint even though the line is wider.
        assert_eq!(r.size.width, 40.0);
    }

    #[test]
    fn lines_paint_top_down_in_output_space() {
        let mut t = Text::new("ab\ncd").style(style());
        let r = lay_out(&mut t, 100.0, TextDirection::Ltr);
        let g = paint(&t, r.size);
        assert_eq!(
            g.texts(),
            vec![("ab", Point::new(0.0, 12.0)), ("cd", Point::new(0.0, 2.0))]
        );
    }

    #[test]
    fn end_alignment_follows_direction() {
        let mut t = Text::new("a\nabc").style(style()).align(TextAlign::End);
        let r = lay_out(&mut t, 100.0, TextDirection::Ltr);
        let g = paint(&t, r.size);
        assert_eq!(g.texts()[0].1.x, 10.0);

        let r = lay_out(&mut t, 100.0, TextDirection::Rtl);
        let g = paint(&t, r.size);
        assert_eq!(g.texts()[0].1.x, 0.0);
    }

    #[test]
    fn center_alignment_splits_slack() {
        let mut t = Text::new("a\nabc").style(style()).align(TextAlign::Center);
        let r = lay_out(&mut t, 100.0, TextDirection::Ltr);
        let g = paint(&t, r.size);
        assert_eq!(g.texts()[0].1.x, 5.0);
    }

    #[test]
    fn table_header_role_is_bold() {
        let theme = ThemeData::default();
        let style = TextRole::TableHeader.base_style(&theme).resolve();
        assert_eq!(style.font_size, 10.0);
        assert_eq!(style.font_weight.value(), 700);
    }

    #[test]
    fn underline_is_stroked_below_baseline() {
        let mut t = Text::new("ab").style(TextStyle {
            decoration: Some(TextDecoration::Underline),
            ..style()
        });
        let r = lay_out(&mut t, 100.0, TextDirection::Ltr);
        let g = paint(&t, r.size);
        let strokes: Vec<_> = g
            .ops()
            .iter()
            .filter(|op| matches!(op, PaintOp::Stroke { .. }))
            .map(PaintOp::bounds)
            .collect();
        assert_eq!(strokes.len(), 1);
        assert!((strokes[0].y - 1.0).abs() < 1e-9);
        assert_eq!(strokes[0].width, 10.0);
    }

    #[test]
    fn falls_back_to_standard_metrics() {
        let theme = ThemeData::default();
        let mut t = Text::new("Hi");
        let ctx = LayoutContext::new(BoxConstraints::default(), &theme);
        let r = t.layout(&ctx).unwrap();
        // Helvetica H = 722, i = 222 units at 12pt.
        assert!((r.size.width - 11.328).abs() < 1e-9);
        assert!(r.needs_repaint);
    }

    #[test]
    fn blank_text_needs_no_paint() {
        let mut t = Text::new("  ").style(style());
        assert!(!lay_out(&mut t, 100.0, TextDirection::Ltr).needs_repaint);
    }
}
