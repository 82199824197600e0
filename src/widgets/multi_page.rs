//! # Multi-Page Flow
//!
//! `MultiPage` takes a flat list of block widgets and spreads them over as
//! many pages as they need. One layout + paint cycle goes through these
//! states:
//!
//! 1. **Measure bands.** Header and footer are laid out once (loose width =
//!    content width, max height 100pt) to find the content area left
//!    between them.
//! 2. **Measure content.** Every child is laid out once with the content
//!    width and an unbounded height. A child whose layout fails is logged,
//!    counted as zero height and skipped when painting.
//! 3. **Split.** [`paginate`] groups the heights into page chunks greedily.
//!    A block taller than a page gets a page to itself and overflows it.
//!    Chunks past `max_pages` are dropped with a warning.
//! 4. **Paint.** Page 1 is painted into the context handed to `paint`.
//!    Pages 2..N are requested from the context's [`PageSink`]; without one
//!    only page 1 is produced.
//!
//! Header and footer builders are called per page with the page number and
//! the total page count. Each page's bands are built and laid out during
//! layout, in the same context as the content, and painted from that cache.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::graphics::GraphicsContext;
use crate::layout::page_break::{paginate, ContentChunk, Pagination};
use crate::layout::{
    cached, BoxConstraints, LayoutContext, LayoutResult, PageSink, PaintContext, Widget,
};
use crate::model::PageFormat;

/// Upper bound on a header or footer band's height.
const BAND_MAX_HEIGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultiPageOptions {
    /// Pages beyond this are dropped with a warning.
    pub max_pages: usize,
    /// Distance from the top page edge to the header.
    pub header_inset: f64,
    /// Distance from the bottom page edge to the footer.
    pub footer_inset: f64,
}

impl Default for MultiPageOptions {
    fn default() -> Self {
        Self {
            max_pages: 20,
            header_inset: 20.0,
            footer_inset: 20.0,
        }
    }
}

/// Passed to header/footer builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based.
    pub page_number: usize,
    pub total_pages: usize,
}

/// A header or footer: the same widget on every page, or one built per page.
pub enum PageDecoration {
    Static(Box<dyn Widget>),
    Builder(Box<dyn Fn(PageInfo) -> Box<dyn Widget>>),
}

impl PageDecoration {
    pub fn builder(build: impl Fn(PageInfo) -> Box<dyn Widget> + 'static) -> Self {
        PageDecoration::Builder(Box::new(build))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Header,
    Footer,
}

#[derive(Debug, Clone)]
struct MultiPageLayout {
    page_size: Size,
    /// Content area in page coordinates (widget space).
    content: Rect,
    header: Option<Size>,
    footer: Option<Size>,
    /// `None` for children whose layout failed.
    sizes: Vec<Option<Size>>,
    pagination: Pagination,
}

impl MultiPageLayout {
    fn band_rect(&self, band: Band, size: Size, options: &MultiPageOptions) -> Rect {
        let y = match band {
            Band::Header => options.header_inset,
            Band::Footer => self.page_size.height - options.footer_inset - size.height,
        };
        Rect::new(self.content.x, y, size.width, size.height)
    }
}

/// A builder band laid out for one page.
struct BuiltBand {
    widget: Box<dyn Widget>,
    size: Size,
}

/// The builder bands of one page, `None` where the band is static or absent.
#[derive(Default)]
struct PageBands {
    header: Option<BuiltBand>,
    footer: Option<BuiltBand>,
}

impl PageBands {
    fn get(&self, band: Band) -> Option<&BuiltBand> {
        match band {
            Band::Header => self.header.as_ref(),
            Band::Footer => self.footer.as_ref(),
        }
    }
}

pub struct MultiPage {
    format: PageFormat,
    options: MultiPageOptions,
    header: Option<PageDecoration>,
    footer: Option<PageDecoration>,
    children: Vec<Box<dyn Widget>>,
    layout: Option<MultiPageLayout>,
    /// Indexed by page number - 1.
    bands: Vec<PageBands>,
}

impl MultiPage {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            options: MultiPageOptions::default(),
            header: None,
            footer: None,
            children: Vec::new(),
            layout: None,
            bands: Vec::new(),
        }
    }

    pub fn options(mut self, options: MultiPageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(mut self, header: PageDecoration) -> Self {
        self.header = Some(header);
        self
    }

    pub fn footer(mut self, footer: PageDecoration) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_children(mut self, children: Vec<Box<dyn Widget>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Page chunks from the last layout.
    pub fn chunks(&self) -> Option<&[ContentChunk]> {
        self.layout.as_ref().map(|l| l.pagination.chunks.as_slice())
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.layout.as_ref().map(|l| &l.pagination)
    }

    /// Pages the last layout produced; at least 1 once laid out.
    pub fn page_count(&self) -> usize {
        self.layout
            .as_ref()
            .map(|l| l.pagination.chunks.len().max(1))
            .unwrap_or(0)
    }

    /// Lay out a header or footer for measurement. Builders are measured
    /// with a one-page placeholder.
    fn measure_band(
        decoration: Option<&mut PageDecoration>,
        ctx: &LayoutContext<'_>,
    ) -> Result<Option<Size>, LayoutError> {
        let Some(decoration) = decoration else {
            return Ok(None);
        };
        let size = match decoration {
            PageDecoration::Static(widget) => widget.layout(ctx)?.size,
            PageDecoration::Builder(build) => {
                let mut widget = build(PageInfo {
                    page_number: 1,
                    total_pages: 1,
                });
                widget.layout(ctx)?.size
            }
        };
        Ok(Some(size))
    }

    /// Build a builder band for one page and lay it out in the same context
    /// the content was measured in.
    fn build_band(
        decoration: Option<&PageDecoration>,
        info: PageInfo,
        ctx: &LayoutContext<'_>,
    ) -> Result<Option<BuiltBand>, LayoutError> {
        let Some(PageDecoration::Builder(build)) = decoration else {
            return Ok(None);
        };
        let mut widget = build(info);
        let size = widget.layout(ctx)?.size;
        Ok(Some(BuiltBand { widget, size }))
    }

    fn paint_band(
        &self,
        band: Band,
        info: PageInfo,
        layout: &MultiPageLayout,
        ctx: &mut PaintContext<'_>,
    ) -> Result<(), LayoutError> {
        let (decoration, measured) = match band {
            Band::Header => (self.header.as_ref(), layout.header),
            Band::Footer => (self.footer.as_ref(), layout.footer),
        };
        match (decoration, measured) {
            (Some(PageDecoration::Static(widget)), Some(size)) => {
                let rect = layout.band_rect(band, size, &self.options);
                ctx.paint_child(widget.as_ref(), rect)
            }
            (Some(PageDecoration::Builder(_)), _) => {
                let built = self
                    .bands
                    .get(info.page_number - 1)
                    .and_then(|bands| bands.get(band))
                    .ok_or(LayoutError::NotLaidOut(self.name()))?;
                let rect = layout.band_rect(band, built.size, &self.options);
                ctx.paint_child(built.widget.as_ref(), rect)
            }
            _ => Ok(()),
        }
    }

    fn paint_page(
        &self,
        layout: &MultiPageLayout,
        chunk: Option<&ContentChunk>,
        info: PageInfo,
        ctx: &mut PaintContext<'_>,
    ) -> Result<(), LayoutError> {
        self.paint_band(Band::Header, info, layout, ctx)?;

        if let Some(chunk) = chunk {
            let mut y = layout.content.y;
            for index in chunk.widgets.clone() {
                let Some(size) = layout.sizes[index] else {
                    continue;
                };
                let rect = Rect::new(layout.content.x, y, size.width, size.height);
                ctx.paint_child(self.children[index].as_ref(), rect)?;
                y += size.height;
            }
        }

        self.paint_band(Band::Footer, info, layout, ctx)
    }
}

impl Widget for MultiPage {
    fn name(&self) -> &'static str {
        "MultiPage"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        let (width, height) = self.format.size.dimensions();
        let page_size = ctx.constraints.constrain(Size::new(width, height));
        let margin = self.format.margin;
        let content_width = (page_size.width - margin.horizontal()).max(0.0);

        let band_ctx = ctx.with_constraints(BoxConstraints::loose(Size::new(
            content_width,
            BAND_MAX_HEIGHT,
        )));
        let header = Self::measure_band(self.header.as_mut(), &band_ctx)?;
        let footer = Self::measure_band(self.footer.as_mut(), &band_ctx)?;
        let header_height = header.map(|s| s.height).unwrap_or(0.0);
        let footer_height = footer.map(|s| s.height).unwrap_or(0.0);

        let available = (page_size.height - margin.vertical() - header_height - footer_height).max(0.0);
        let content = Rect::new(margin.left, margin.top + header_height, content_width, available);

        let child_ctx = ctx.with_constraints(BoxConstraints {
            min_width: 0.0,
            max_width: content_width,
            min_height: 0.0,
            max_height: f64::INFINITY,
        });
        let mut sizes = Vec::with_capacity(self.children.len());
        for (index, child) in self.children.iter_mut().enumerate() {
            match child.layout(&child_ctx) {
                Ok(result) => sizes.push(Some(result.size)),
                Err(error) => {
                    tracing::warn!(
                        index,
                        widget = child.name(),
                        %error,
                        "skipping child that failed to lay out"
                    );
                    sizes.push(None);
                }
            }
        }

        let heights: Vec<f64> = sizes
            .iter()
            .map(|s| s.map(|s| s.height).unwrap_or(0.0))
            .collect();
        let pagination = paginate(&heights, available, self.options.max_pages);
        for &index in &pagination.oversized {
            tracing::warn!(
                index,
                height = heights[index],
                available,
                "block is taller than a page and will overflow it"
            );
        }
        if pagination.is_truncated() {
            tracing::warn!(
                max_pages = self.options.max_pages,
                dropped = pagination.truncated.len(),
                "page limit reached; remaining content is dropped"
            );
        }

        let total_pages = pagination.chunks.len().max(1);
        let mut bands = Vec::with_capacity(total_pages);
        for page_number in 1..=total_pages {
            let info = PageInfo {
                page_number,
                total_pages,
            };
            bands.push(PageBands {
                header: Self::build_band(self.header.as_ref(), info, &band_ctx)?,
                footer: Self::build_band(self.footer.as_ref(), info, &band_ctx)?,
            });
        }
        self.bands = bands;

        self.layout = Some(MultiPageLayout {
            page_size,
            content,
            header,
            footer,
            sizes,
            pagination,
        });
        Ok(LayoutResult::new(page_size).with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let layout = cached(&self.layout, self.name())?;
        let chunks = &layout.pagination.chunks;
        let total_pages = chunks.len().max(1);
        let info = |page_number| PageInfo {
            page_number,
            total_pages,
        };

        self.paint_page(layout, chunks.first(), info(1), ctx)?;
        if chunks.len() < 2 {
            return Ok(());
        }

        let theme = ctx.theme;
        let fonts = ctx.fonts;
        let Some(document) = ctx.document.as_mut() else {
            tracing::debug!(
                pages = chunks.len(),
                "no page sink available; only the first page is rendered"
            );
            return Ok(());
        };
        for chunk in &chunks[1..] {
            let page_info = info(chunk.page_number);
            document.add_page(
                &self.format,
                &mut |graphics: &mut dyn GraphicsContext| -> Result<(), LayoutError> {
                    let mut page_ctx = PaintContext::new(layout.page_size, theme, graphics);
                    if let Some(fonts) = fonts {
                        page_ctx = page_ctx.with_fonts(fonts);
                    }
                    self.paint_page(layout, Some(chunk), page_info, &mut page_ctx)
                },
            )?;
        }
        Ok(())
    }
}

/// A [`PageSink`] that records each extra page into its own
/// [`RecordingGraphics`](crate::graphics::RecordingGraphics).
#[derive(Debug, Default)]
pub struct RecordingPages {
    pub pages: Vec<crate::graphics::RecordingGraphics>,
}

impl PageSink for RecordingPages {
    fn add_page(
        &mut self,
        _format: &PageFormat,
        build: &mut dyn FnMut(&mut dyn GraphicsContext) -> Result<(), LayoutError>,
    ) -> Result<(), LayoutError> {
        let mut graphics = crate::graphics::RecordingGraphics::new();
        build(&mut graphics)?;
        self.pages.push(graphics);
        Ok(())
    }
}
