//! # Text Measurement and Line Breaking
//!
//! Layout never looks at glyphs. It asks a [`TextMeasurement`] service how
//! wide a run is and how a paragraph wraps, and gets back plain numbers. The
//! crate ships three services:
//!
//! - `FontRegistry`, real metrics for standard and registered fonts;
//! - `StandardMeasurement`, the standard AFM tables only, used as fallback
//!   when a layout pass has no service;
//! - [`MonospaceMeasurement`], a font-free service for tests.
//!
//! Wrapping is greedy over UAX #14 break opportunities: words are added to
//! the current line while they fit, `\n` always ends a line, and a single
//! word wider than the line is broken between characters.

use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Font parameters for a measurement request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub italic: bool,
    /// Line height as a multiple of the font size.
    pub line_spacing: f64,
    pub letter_spacing: f64,
    pub max_lines: Option<usize>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            font_weight: 400,
            italic: false,
            line_spacing: 1.2,
            letter_spacing: 0.0,
            max_lines: None,
        }
    }
}

impl TextOptions {
    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_spacing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f64,
}

/// Result of wrapping a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    /// Width of the widest line.
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the block to the first baseline.
    pub baseline: f64,
    pub line_count: usize,
    pub lines: Vec<TextLine>,
}

/// Text measurement consumed by layout. Must be deterministic.
pub trait TextMeasurement {
    fn measure_text_width(&self, text: &str, font_size: f64, font_family: Option<&str>) -> f64;

    /// Width of a run with weight, style and letter spacing applied.
    fn measure_run(&self, text: &str, opts: &TextOptions) -> f64 {
        let glyphs = text.chars().count() as f64;
        self.measure_text_width(text, opts.font_size, Some(&opts.font_family))
            + glyphs * opts.letter_spacing
    }

    fn ascent(&self, opts: &TextOptions) -> f64 {
        opts.font_size * 0.8
    }

    /// Distance below the baseline, positive.
    fn descent(&self, opts: &TextOptions) -> f64 {
        opts.font_size * 0.2
    }

    fn measure_text_with_wrapping(
        &self,
        text: &str,
        max_width: f64,
        opts: &TextOptions,
    ) -> TextMetrics {
        let measure = |s: &str| self.measure_run(s, opts);
        let mut lines = wrap_text(text, max_width, &measure);
        if let Some(max) = opts.max_lines {
            lines.truncate(max.max(1));
        }

        let line_height = opts.line_height();
        let ascent = self.ascent(opts);
        let descent = self.descent(opts);
        let half_leading = (line_height - (ascent + descent)) / 2.0;

        TextMetrics {
            width: lines.iter().map(|l| l.width).fold(0.0, f64::max),
            height: lines.len() as f64 * line_height,
            baseline: half_leading + ascent,
            line_count: lines.len(),
            lines,
        }
    }
}

/// Greedy line breaking. Every paragraph produces at least one line, so
/// empty text is one empty line.
pub fn wrap_text(text: &str, max_width: f64, measure: &dyn Fn(&str) -> f64) -> Vec<TextLine> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph.trim_end_matches('\r'), max_width, measure, &mut lines);
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f64,
    measure: &dyn Fn(&str) -> f64,
    out: &mut Vec<TextLine>,
) {
    let push = |line: &str, out: &mut Vec<TextLine>| {
        let text = line.trim_end();
        out.push(TextLine {
            text: text.to_string(),
            width: measure(text),
        });
    };

    let mut line = String::new();
    let mut start = 0;
    for (end, opportunity) in linebreaks(paragraph) {
        let segment = &paragraph[start..end];
        start = end;

        let candidate = format!("{line}{segment}");
        if line.is_empty() || measure(candidate.trim_end()) <= max_width {
            line = candidate;
        } else {
            push(&line, out);
            line = segment.to_string();
        }

        // A word that is wider than a whole line is split by characters.
        while line.trim_end().chars().count() > 1 && measure(line.trim_end()) > max_width {
            let split = split_at_width(&line, max_width, measure);
            push(&line[..split], out);
            line = line[split..].to_string();
        }

        if opportunity == BreakOpportunity::Mandatory && end < paragraph.len() {
            push(&line, out);
            line.clear();
        }
    }
    push(&line, out);
}

/// Byte index of the longest prefix that fits, at least one character.
fn split_at_width(line: &str, max_width: f64, measure: &dyn Fn(&str) -> f64) -> usize {
    let mut split = 0;
    for (i, ch) in line.char_indices() {
        let end = i + ch.len_utf8();
        if split > 0 && measure(&line[..end]) > max_width {
            break;
        }
        split = end;
    }
    split
}

/// Every glyph is half an em wide; ascent 0.8em, descent 0.2em.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasurement;

impl TextMeasurement for MonospaceMeasurement {
    fn measure_text_width(&self, text: &str, font_size: f64, _font_family: Option<&str>) -> f64 {
        text.chars().count() as f64 * font_size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(font_size: f64) -> TextOptions {
        TextOptions {
            font_size,
            line_spacing: 1.0,
            ..TextOptions::default()
        }
    }

    fn texts(m: &TextMetrics) -> Vec<&str> {
        m.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn fits_on_one_line() {
        let m = MonospaceMeasurement.measure_text_with_wrapping("hello world", 1000.0, &opts(10.0));
        assert_eq!(texts(&m), vec!["hello world"]);
        assert_eq!(m.width, 55.0);
        assert_eq!(m.height, 10.0);
        assert_eq!(m.line_count, 1);
    }

    #[test]
    fn wraps_at_spaces() {
        // 5pt per glyph: "hello world" is 55pt, "hello" 25pt
        let m = MonospaceMeasurement.measure_text_with_wrapping("hello world", 40.0, &opts(10.0));
        assert_eq!(texts(&m), vec!["hello", "world"]);
        assert_eq!(m.width, 25.0);
        assert_eq!(m.height, 20.0);
    }

    #[test]
    fn newline_always_breaks() {
        let m = MonospaceMeasurement.measure_text_with_wrapping("a\nb\n", 1000.0, &opts(10.0));
        assert_eq!(texts(&m), vec!["a", "b", ""]);
    }

    #[test]
    fn long_word_breaks_by_character() {
        let m = MonospaceMeasurement.measure_text_with_wrapping("abcdefgh", 20.0, &opts(10.0));
        assert_eq!(texts(&m), vec!["abcd", "efgh"]);
    }

    #[test]
    fn max_lines_truncates() {
        let mut o = opts(10.0);
        o.max_lines = Some(2);
        let m = MonospaceMeasurement.measure_text_with_wrapping("aa bb cc dd", 10.0, &o);
        assert_eq!(m.line_count, 2);
        assert_eq!(m.height, 20.0);
    }

    #[test]
    fn unbounded_width_never_wraps() {
        let m = MonospaceMeasurement.measure_text_with_wrapping("one two three", f64::INFINITY, &opts(10.0));
        assert_eq!(m.line_count, 1);
    }

    #[test]
    fn baseline_sits_inside_first_line() {
        let mut o = opts(10.0);
        o.line_spacing = 1.4;
        let m = MonospaceMeasurement.measure_text_with_wrapping("x", 100.0, &o);
        // 4pt of leading split evenly above and below, ascent 8pt
        assert!((m.baseline - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let m = MonospaceMeasurement.measure_text_with_wrapping("", 100.0, &opts(10.0));
        assert_eq!(m.line_count, 1);
        assert_eq!(m.width, 0.0);
    }
}
