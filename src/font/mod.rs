//! # Font Management
//!
//! Resolving a `(family, weight, italic)` request to font data and metrics.
//!
//! The 14 standard PDF fonts need no embedding and measure with the AFM
//! tables in [`metrics`]. Custom TrueType/OpenType fonts are registered from
//! raw bytes; ttf-parser supplies their advance widths and vertical metrics,
//! and the PDF writer embeds them whole.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::HashMap;

use crate::error::Error;
use crate::text::{TextMeasurement, TextOptions};

/// Every font a document can draw with, keyed by family, weight and style.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, weight: u32, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            weight: snap_weight(weight),
            italic,
        }
    }
}

/// Weights snap to regular or bold.
pub fn snap_weight(weight: u32) -> u32 {
    if weight >= 600 {
        700
    } else {
        400
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// Built into every PDF reader.
    Standard(StandardFont),
    /// A TrueType/OpenType font that is embedded in the output.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

impl FontData {
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().measure_string(text, font_size, letter_spacing),
            FontData::Custom { metrics, .. } => text
                .chars()
                .map(|ch| metrics.char_width(ch, font_size) + letter_spacing)
                .sum(),
        }
    }

    /// Ascender as a fraction of the font size.
    pub fn ascent_ratio(&self) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().ascender as f64 / 1000.0,
            FontData::Custom { metrics, .. } => {
                metrics.ascender as f64 / metrics.units_per_em as f64
            }
        }
    }

    /// Descender as a fraction of the font size; negative.
    pub fn descent_ratio(&self) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().descender as f64 / 1000.0,
            FontData::Custom { metrics, .. } => {
                metrics.descender as f64 / metrics.units_per_em as f64
            }
        }
    }
}

/// Horizontal advances and vertical metrics read from a custom font.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Font bounding box `[x_min, y_min, x_max, y_max]` in font units.
    pub bbox: [i16; 4],
    pub postscript_name: Option<String>,
}

impl CustomFontMetrics {
    /// Advance of `ch` at `font_size`, in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// `None` when the bytes are not a font ttf-parser can read.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        let bbox = face.global_bounding_box();
        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && name.is_unicode())
            .and_then(|name| name.to_string());

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            postscript_name,
        })
    }
}

/// Base-14 faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    /// `/BaseFont` name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// The standard face for a family name, if it is one.
    pub fn from_family(family: &str, weight: u32, italic: bool) -> Option<Self> {
        let bold = snap_weight(weight) == 700;
        let font = match (family, bold, italic) {
            ("Helvetica", false, false) => Self::Helvetica,
            ("Helvetica", true, false) => Self::HelveticaBold,
            ("Helvetica", false, true) => Self::HelveticaOblique,
            ("Helvetica", true, true) => Self::HelveticaBoldOblique,
            ("Times", false, false) => Self::TimesRoman,
            ("Times", true, false) => Self::TimesBold,
            ("Times", false, true) => Self::TimesItalic,
            ("Times", true, true) => Self::TimesBoldItalic,
            ("Courier", false, false) => Self::Courier,
            ("Courier", true, false) => Self::CourierBold,
            ("Courier", false, true) => Self::CourierOblique,
            ("Courier", true, true) => Self::CourierBoldOblique,
            ("Symbol", _, _) => Self::Symbol,
            ("ZapfDingbats", _, _) => Self::ZapfDingbats,
            _ => return None,
        };
        Some(font)
    }

    /// Like [`StandardFont::from_family`], falling back to Helvetica.
    pub fn resolve(family: &str, weight: u32, italic: bool) -> Self {
        Self::from_family(family, weight, italic)
            .or_else(|| Self::from_family("Helvetica", weight, italic))
            .unwrap_or(Self::Helvetica)
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        for family in ["Helvetica", "Times", "Courier"] {
            for weight in [400, 700] {
                for italic in [false, true] {
                    if let Some(font) = StandardFont::from_family(family, weight, italic) {
                        fonts.insert(FontKey::new(family, weight, italic), FontData::Standard(font));
                    }
                }
            }
        }
        Self { fonts }
    }

    /// The registered font closest to the request. Unknown families get
    /// Helvetica.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        if let Some(font) = self.fonts.get(&FontKey::new(family, weight, italic)) {
            return font;
        }
        if let Some(font) = self.fonts.get(&FontKey::new("Helvetica", weight, italic)) {
            return font;
        }
        static FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);
        self.fonts
            .get(&FontKey::new("Helvetica", 400, false))
            .unwrap_or(&FALLBACK)
    }

    /// The key [`FontRegistry::resolve`] lands on for this request.
    pub fn resolve_key(&self, family: &str, weight: u32, italic: bool) -> FontKey {
        let exact = FontKey::new(family, weight, italic);
        if self.fonts.contains_key(&exact) {
            return exact;
        }
        let fallback = FontKey::new("Helvetica", weight, italic);
        if self.fonts.contains_key(&fallback) {
            return fallback;
        }
        FontKey::new("Helvetica", 400, false)
    }

    /// Register a custom font. Fails if ttf-parser cannot read it.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        let metrics = CustomFontMetrics::from_font_data(&data)
            .ok_or_else(|| Error::Font(format!("could not parse font data for '{family}'")))?;
        self.fonts.insert(
            FontKey::new(family, weight, italic),
            FontData::Custom { data, metrics },
        );
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }

    /// Width of `text` in points, letter spacing included.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        self.resolve(family, weight, italic)
            .measure_string(text, font_size, letter_spacing)
    }
}

impl TextMeasurement for FontRegistry {
    fn measure_text_width(&self, text: &str, font_size: f64, font_family: Option<&str>) -> f64 {
        self.measure_string(text, font_family.unwrap_or("Helvetica"), 400, false, font_size, 0.0)
    }

    fn measure_run(&self, text: &str, opts: &TextOptions) -> f64 {
        self.measure_string(
            text,
            &opts.font_family,
            opts.font_weight,
            opts.italic,
            opts.font_size,
            opts.letter_spacing,
        )
    }

    fn ascent(&self, opts: &TextOptions) -> f64 {
        self.resolve(&opts.font_family, opts.font_weight, opts.italic)
            .ascent_ratio()
            * opts.font_size
    }

    fn descent(&self, opts: &TextOptions) -> f64 {
        -self
            .resolve(&opts.font_family, opts.font_weight, opts.italic)
            .descent_ratio()
            * opts.font_size
    }
}

/// Measurement from the standard font tables alone, no registry needed.
/// Used whenever a layout pass is not given a measurement service.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMeasurement;

impl TextMeasurement for StandardMeasurement {
    fn measure_text_width(&self, text: &str, font_size: f64, font_family: Option<&str>) -> f64 {
        StandardFont::resolve(font_family.unwrap_or("Helvetica"), 400, false)
            .metrics()
            .measure_string(text, font_size, 0.0)
    }

    fn measure_run(&self, text: &str, opts: &TextOptions) -> f64 {
        StandardFont::resolve(&opts.font_family, opts.font_weight, opts.italic)
            .metrics()
            .measure_string(text, opts.font_size, opts.letter_spacing)
    }

    fn ascent(&self, opts: &TextOptions) -> f64 {
        let m = StandardFont::resolve(&opts.font_family, opts.font_weight, opts.italic).metrics();
        m.ascender as f64 / 1000.0 * opts.font_size
    }

    fn descent(&self, opts: &TextOptions) -> f64 {
        let m = StandardFont::resolve(&opts.font_family, opts.font_weight, opts.italic).metrics();
        -(m.descender as f64) / 1000.0 * opts.font_size
    }
}
