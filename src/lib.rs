//! # Folio
//!
//! A widget-tree document layout engine.
//!
//! A document is a tree of widgets. Layout runs one pass down the tree:
//! every parent hands its children a [`BoxConstraints`](layout::BoxConstraints)
//! range, every child answers with a size inside it, and the parent decides
//! where each child goes. Paint then runs a second pass that draws each
//! widget into a [`GraphicsContext`](graphics::GraphicsContext), and
//! [`MultiPage`](widgets::MultiPage) flows block content over as many pages
//! as it needs.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — DocumentSpec → widget tree
//!       ↓
//!   [widgets]  — layout: constraints down, sizes up (widget space, Y down)
//!       ↓
//!   [widgets]  — paint: draw ops (output space, Y up)
//!       ↓
//!   [pdf]      — content streams, fonts, xref → PDF bytes
//! ```
//!
//! The pure algorithms live apart from the widgets that use them:
//! [`layout::flex`], [`layout::table`] and [`layout::page_break`] take plain
//! numbers and return plain numbers.
//!
//! Layout errors are loud and content that doesn't fit is not: invariant
//! violations return [`LayoutError`](error::LayoutError), while overflowing
//! pages or tables log a `tracing` warning and keep going. The library never
//! installs a subscriber.

pub mod error;
pub mod font;
pub mod geometry;
pub mod graphics;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;
pub mod widgets;

pub use error::{Error, LayoutError};

use model::DocumentSpec;
use pdf::PdfDocument;

/// Render a document to PDF bytes.
///
/// Custom fonts are registered first, then every child flows through a
/// `MultiPage` on the document's page format.
pub fn render(document: &DocumentSpec) -> Result<Vec<u8>, Error> {
    let mut pdf = PdfDocument::new()
        .with_metadata(document.metadata.clone())
        .with_theme(document.theme.clone());
    for font in &document.fonts {
        pdf.register_font(&font.family, font.weight, font.italic, font.decode()?)?;
    }

    let mut root = document.build()?;
    pdf.add_page(&document.page, &mut root)?;
    tracing::debug!(pages = pdf.page_count(), "document rendered");
    Ok(pdf.save())
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, Error> {
    let document = DocumentSpec::from_json(json)?;
    render(&document)
}
