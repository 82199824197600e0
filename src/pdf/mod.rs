//! # PDF Serializer
//!
//! Paints widget trees into PDF pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. We write the raw bytes ourselves
//! because the subset needed for document rendering is small: content
//! streams, Type1 standard fonts, embedded TrueType fonts and an Info
//! dictionary.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! [`PdfPage`] is the [`GraphicsContext`] the paint pass draws into. Each
//! page keeps its own font resource list (`/F0`, `/F1`, ...) so pages can be
//! produced independently, including the extra pages a `MultiPage` requests
//! while page 1 is still being painted.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Error, LayoutError};
use crate::font::{FontData, FontKey, FontRegistry};
use crate::geometry::{Matrix, Point, Rect, Size};
use crate::graphics::{GraphicsContext, TextRun};
use crate::layout::{BoxConstraints, LayoutContext, PageSink, PaintContext, Widget};
use crate::model::{Metadata, PageFormat};
use crate::style::{Color, ThemeData};

/// Code points that WinAnsiEncoding places in 0x80..=0x9F.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Encode a character as a WinAnsi byte; unmappable characters become `?`.
fn win_ansi_encode(ch: char) -> u8 {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return code as u8;
    }
    WIN_ANSI_HIGH
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, b)| *b)
        .unwrap_or(b'?')
}

fn win_ansi_decode(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, b)| *b == byte)
            .map(|(c, _)| *c),
    }
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

fn hex_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let _ = write!(out, "{:02X}", win_ansi_encode(ch));
    }
    out
}

// ── Page content ───────────────────────────────────────────────

/// A page being painted: accumulates content-stream operators.
pub struct PdfPage<'a> {
    registry: &'a FontRegistry,
    content: String,
    depth: usize,
    fonts: Vec<FontKey>,
}

impl<'a> PdfPage<'a> {
    pub fn new(registry: &'a FontRegistry) -> Self {
        Self {
            registry,
            content: String::new(),
            depth: 0,
            fonts: Vec::new(),
        }
    }

    /// The uncompressed content stream so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    fn font_index(&mut self, key: FontKey) -> usize {
        match self.fonts.iter().position(|k| *k == key) {
            Some(i) => i,
            None => {
                self.fonts.push(key);
                self.fonts.len() - 1
            }
        }
    }

    fn finish(self, size: Size) -> Result<PageContent, LayoutError> {
        if self.depth != 0 {
            return Err(LayoutError::UnbalancedSave);
        }
        Ok(PageContent {
            size,
            content: self.content,
            fonts: self.fonts,
        })
    }
}

impl GraphicsContext for PdfPage<'_> {
    fn save(&mut self) {
        self.depth += 1;
        self.content.push_str("q\n");
    }

    fn restore(&mut self) -> Result<(), LayoutError> {
        if self.depth == 0 {
            return Err(LayoutError::UnbalancedSave);
        }
        self.depth -= 1;
        self.content.push_str("Q\n");
        Ok(())
    }

    fn transform(&mut self, m: &Matrix) {
        let _ = write!(
            self.content,
            "{:.4} {:.4} {:.4} {:.4} {:.2} {:.2} cm\n",
            m.a, m.b, m.c, m.d, m.e, m.f
        );
    }

    fn set_fill_color(&mut self, c: Color) {
        let _ = write!(self.content, "{:.3} {:.3} {:.3} rg\n", c.r, c.g, c.b);
    }

    fn set_stroke_color(&mut self, c: Color) {
        let _ = write!(self.content, "{:.3} {:.3} {:.3} RG\n", c.r, c.g, c.b);
    }

    fn set_line_width(&mut self, width: f64) {
        let _ = write!(self.content, "{:.2} w\n", width);
    }

    fn move_to(&mut self, p: Point) {
        let _ = write!(self.content, "{:.2} {:.2} m\n", p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        let _ = write!(self.content, "{:.2} {:.2} l\n", p.x, p.y);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        let _ = write!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            c1.x, c1.y, c2.x, c2.y, p.x, p.y
        );
    }

    fn close_path(&mut self) {
        self.content.push_str("h\n");
    }

    fn rect(&mut self, r: Rect) {
        let _ = write!(
            self.content,
            "{:.2} {:.2} {:.2} {:.2} re\n",
            r.x, r.y, r.width, r.height
        );
    }

    fn fill(&mut self) {
        self.content.push_str("f\n");
    }

    fn stroke(&mut self) {
        self.content.push_str("S\n");
    }

    fn clip(&mut self) {
        self.content.push_str("W n\n");
    }

    fn draw_text(&mut self, run: &TextRun<'_>) {
        if run.text.is_empty() {
            return;
        }
        let key = self
            .registry
            .resolve_key(run.font_family, run.font_weight, run.italic);
        let index = self.font_index(key);
        let c = run.color;
        // Text color stays inside its own q/Q.
        let _ = write!(
            self.content,
            "q\nBT\n/F{} {:.2} Tf\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} Td\n<{}> Tj\nET\nQ\n",
            index,
            run.font_size,
            c.r,
            c.g,
            c.b,
            run.origin.x,
            run.origin.y,
            hex_string(run.text)
        );
    }
}

struct PageContent {
    size: Size,
    content: String,
    /// Page-local font resources; `/F{i}` is `fonts[i]`.
    fonts: Vec<FontKey>,
}

/// Collects pages requested during a paint pass.
struct PageCollector<'a> {
    registry: &'a FontRegistry,
    pages: Vec<PageContent>,
}

fn paint_extra_page(
    registry: &FontRegistry,
    format: &PageFormat,
    build: &mut dyn FnMut(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
) -> Result<PageContent, LayoutError> {
    let (width, height) = format.size.dimensions();
    let mut page = PdfPage::new(registry);
    build(&mut page)?;
    page.finish(Size::new(width, height))
}

impl PageSink for PageCollector<'_> {
    fn add_page(
        &mut self,
        format: &PageFormat,
        build: &mut dyn FnMut(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
    ) -> Result<(), LayoutError> {
        let page = paint_extra_page(self.registry, format, build)?;
        self.pages.push(page);
        Ok(())
    }
}

// ── Document ───────────────────────────────────────────────────

/// Tracks allocated PDF objects during writing. Object 0 is the free-list
/// head and never written.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            objects: vec![Vec::new()],
        }
    }

    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len() - 1
    }

    fn set(&mut self, id: usize, data: Vec<u8>) {
        self.objects[id] = data;
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    /// A zlib-compressed stream object. `extra` goes into the dictionary.
    fn push_stream(&mut self, raw: &[u8], extra: &str) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {} /Filter /FlateDecode{} >>\nstream\n",
            compressed.len(),
            extra
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn serialize(&self, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; self.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in self.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", self.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len(),
            info_id,
            xref_offset
        );
        output
    }
}

/// A PDF under construction: owns the fonts and theme used to lay out and
/// paint each root widget, and the finished pages.
pub struct PdfDocument {
    metadata: Metadata,
    theme: ThemeData,
    fonts: FontRegistry,
    pages: Vec<PageContent>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            theme: ThemeData::default(),
            fonts: FontRegistry::new(),
            pages: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_theme(mut self, theme: ThemeData) -> Self {
        self.theme = theme;
        self
    }

    pub fn register_font(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        self.fonts.register(family, weight, italic, data)
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lay `root` out tight to the page size of `format` and paint it.
    /// `Page` and `MultiPage` roots apply the margins; a `MultiPage` may
    /// append more than one page.
    pub fn add_page(&mut self, format: &PageFormat, root: &mut dyn Widget) -> Result<(), Error> {
        let (width, height) = format.size.dimensions();
        let size = Size::new(width, height);
        let ctx = LayoutContext::new(BoxConstraints::tight(size), &self.theme)
            .with_measurement(&self.fonts);
        root.layout(&ctx)?;

        let mut extra = PageCollector {
            registry: &self.fonts,
            pages: Vec::new(),
        };
        let mut page = PdfPage::new(&self.fonts);
        {
            let mut paint = PaintContext::new(size, &self.theme, &mut page)
                .with_document(&mut extra)
                .with_fonts(&self.fonts);
            root.paint(&mut paint)?;
        }
        let first = page.finish(size)?;
        let extra_pages = extra.pages;

        tracing::debug!(pages = 1 + extra_pages.len(), root = root.name(), "painted root widget");
        self.pages.push(first);
        self.pages.extend(extra_pages);
        Ok(())
    }

    /// Serialize every page into a PDF file. An empty document gets one
    /// blank A4 page.
    pub fn save(&self) -> Vec<u8> {
        let mut builder = PdfBuilder::new();
        let catalog_id = builder.reserve();
        let pages_id = builder.reserve();

        let mut keys: Vec<FontKey> = self
            .pages
            .iter()
            .flat_map(|p| p.fonts.iter().cloned())
            .collect();
        keys.sort();
        keys.dedup();
        let font_ids: Vec<(FontKey, usize)> = keys
            .into_iter()
            .map(|key| {
                let id = self.write_font(&mut builder, &key);
                (key, id)
            })
            .collect();

        let blank = PageContent {
            size: {
                let (w, h) = PageFormat::default().size.dimensions();
                Size::new(w, h)
            },
            content: String::new(),
            fonts: Vec::new(),
        };
        let pages: Vec<&PageContent> = if self.pages.is_empty() {
            vec![&blank]
        } else {
            self.pages.iter().collect()
        };

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content_id = builder.push_stream(page.content.as_bytes(), "");
            let resources = page
                .fonts
                .iter()
                .enumerate()
                .filter_map(|(i, key)| {
                    font_ids
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, id)| format!("/F{} {} 0 R", i, id))
                })
                .collect::<Vec<_>>()
                .join(" ");
            let page_dict = format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                pages_id, page.size.width, page.size.height, content_id, resources
            );
            page_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.set(
            catalog_id,
            format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id).into_bytes(),
        );
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.set(
            pages_id,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes(),
        );

        let info_id = builder.push(self.info_dict().into_bytes());
        builder.serialize(info_id)
    }

    fn info_dict(&self) -> String {
        let m = &self.metadata;
        let mut info = String::from("<< ");
        for (name, value) in [
            ("Title", &m.title),
            ("Author", &m.author),
            ("Subject", &m.subject),
        ] {
            if let Some(value) = value {
                let _ = write!(info, "/{} ({}) ", name, escape_pdf_string(value));
            }
        }
        let creator = m.creator.as_deref().unwrap_or("folio");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (folio {}) >>",
            escape_pdf_string(creator),
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    fn write_font(&self, builder: &mut PdfBuilder, key: &FontKey) -> usize {
        match self.fonts.resolve(&key.family, key.weight, key.italic) {
            FontData::Standard(font) => builder.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            ),
            FontData::Custom { data, metrics } => {
                let base_name: String = metrics
                    .postscript_name
                    .clone()
                    .unwrap_or_else(|| key.family.clone())
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect();
                let file_id =
                    builder.push_stream(data, &format!(" /Length1 {}", data.len()));

                let scale = 1000.0 / metrics.units_per_em as f64;
                let [x_min, y_min, x_max, y_max] = metrics.bbox.map(|v| (v as f64 * scale).round());
                let ascent = (metrics.ascender as f64 * scale).round();
                let descent = (metrics.descender as f64 * scale).round();
                let flags = if key.italic { 32 | 64 } else { 32 };
                let descriptor_id = builder.push(
                    format!(
                        "<< /Type /FontDescriptor /FontName /{} /Flags {} \
                         /FontBBox [{} {} {} {}] /ItalicAngle {} /Ascent {} /Descent {} \
                         /CapHeight {} /StemV 80 /FontFile2 {} 0 R >>",
                        base_name,
                        flags,
                        x_min,
                        y_min,
                        x_max,
                        y_max,
                        if key.italic { -12 } else { 0 },
                        ascent,
                        descent,
                        ascent,
                        file_id
                    )
                    .into_bytes(),
                );

                let widths = (32u8..=255)
                    .map(|code| {
                        let ch = win_ansi_decode(code).unwrap_or(' ');
                        format!("{}", metrics.char_width(ch, 1000.0).round())
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                builder.push(
                    format!(
                        "<< /Type /Font /Subtype /TrueType /BaseFont /{} /FirstChar 32 \
                         /LastChar 255 /Widths [{}] /FontDescriptor {} 0 R \
                         /Encoding /WinAnsiEncoding >>",
                        base_name, widths, descriptor_id
                    )
                    .into_bytes(),
                )
            }
        }
    }
}

impl PageSink for PdfDocument {
    fn add_page(
        &mut self,
        format: &PageFormat,
        build: &mut dyn FnMut(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
    ) -> Result<(), LayoutError> {
        let page = paint_extra_page(&self.fonts, format, build)?;
        self.pages.push(page);
        Ok(())
    }
}
