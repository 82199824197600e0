//! # Document Model
//!
//! The JSON input for the renderer. A document is page configuration plus a
//! flat list of block nodes that flow across pages, with an optional header
//! and footer repeated on every page.
//!
//! Nodes are tagged by `"type"` and mirror the widget builders one-to-one:
//!
//! ```json
//! { "type": "Row", "mainAxisAlignment": "SpaceBetween", "children": [
//!     { "type": "Text", "text": "Invoice" },
//!     { "type": "Text", "text": "#42", "style": { "fontWeight": "Bold" } }
//! ] }
//! ```
//!
//! Header and footer text may use `{{pageNumber}}` and `{{totalPages}}`;
//! they are substituted per page.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::EdgeInsets;
use crate::layout::flex::{Axis, CrossAxisAlignment, FlexFit, MainAxisAlignment, MainAxisSize};
use crate::layout::table::TableColumnWidth;
use crate::layout::{Alignment, PositionHint, Widget};
use crate::style::{BoxDecoration, Color, TextAlign, TextStyle, ThemeData};
use crate::widgets::{
    BarChart, CellValue, Center, Container, Flex, Flexible, MultiPage, MultiPageOptions, Padding,
    PageDecoration, PageInfo, Positioned, SizedBox, Spacer, Stack, StackFit, Table, TableBorder,
    Text,
};

const PAGE_NUMBER: &str = "{{pageNumber}}";
const TOTAL_PAGES: &str = "{{totalPages}}";

// ── Page configuration ─────────────────────────────────────────

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Page size and margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFormat {
    pub size: PageSize,
    pub margin: EdgeInsets,
}

impl Default for PageFormat {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: EdgeInsets::all(54.0),
        }
    }
}

/// Written to the PDF Info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// A custom TrueType font to register before layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Base64-encoded font data, or a `data:` URI.
    pub src: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

impl FontSpec {
    pub fn decode(&self) -> Result<Vec<u8>, Error> {
        let raw = match self.src.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => self.src.as_str(),
        };
        base64::engine::general_purpose::STANDARD
            .decode(raw.trim())
            .map_err(|e| Error::Font(format!("invalid base64 for font '{}': {e}", self.family)))
    }
}

// ── Document ───────────────────────────────────────────────────

/// A complete document ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSpec {
    pub metadata: Metadata,
    pub page: PageFormat,
    pub theme: ThemeData,
    pub fonts: Vec<FontSpec>,
    pub multi_page: MultiPageOptions,
    pub header: Option<NodeSpec>,
    pub footer: Option<NodeSpec>,
    pub children: Vec<NodeSpec>,
}

impl DocumentSpec {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// The root widget: every child flowing through a [`MultiPage`].
    pub fn build(&self) -> Result<MultiPage, Error> {
        let children = self
            .children
            .iter()
            .map(NodeSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        let mut root = MultiPage::new(self.page)
            .options(self.multi_page)
            .with_children(children);
        if let Some(header) = &self.header {
            root = root.header(header.decoration()?);
        }
        if let Some(footer) = &self.footer {
            root = root.footer(footer.decoration()?);
        }
        Ok(root)
    }
}

// ── Nodes ──────────────────────────────────────────────────────

/// A color as `"#rrggbb"` or `{ "r": .., "g": .., "b": .., "a": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Rgba(Color),
}

impl ColorValue {
    pub fn to_color(&self) -> Color {
        match self {
            ColorValue::Hex(hex) => Color::hex(hex),
            ColorValue::Rgba(color) => *color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnWidthSpec {
    Fixed(f64),
    Flex(f64),
    Intrinsic,
    Fraction(f64),
}

impl ColumnWidthSpec {
    fn to_width(self) -> Result<TableColumnWidth, Error> {
        Ok(match self {
            ColumnWidthSpec::Fixed(w) => TableColumnWidth::Fixed(w),
            ColumnWidthSpec::Flex(f) => TableColumnWidth::Flex(f),
            ColumnWidthSpec::Intrinsic => TableColumnWidth::Intrinsic(None),
            ColumnWidthSpec::Fraction(f) => TableColumnWidth::fraction(f)?,
        })
    }
}

/// A table cell: a JSON scalar or a nested node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSpec {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    Node(Box<NodeSpec>),
}

impl CellSpec {
    fn to_value(&self) -> Result<CellValue, Error> {
        Ok(match self {
            CellSpec::Null => CellValue::Null,
            CellSpec::Boolean(b) => CellValue::Boolean(*b),
            CellSpec::Number(n) => CellValue::Number(*n),
            CellSpec::Text(s) => CellValue::Text(s.clone()),
            CellSpec::Node(node) => CellValue::Widget(node.build()?),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSpec {
    pub text: String,
    pub style: TextStyle,
    pub align: TextAlign,
    pub max_lines: Option<usize>,
    pub soft_wrap: bool,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            style: TextStyle::default(),
            align: TextAlign::Start,
            max_lines: None,
            soft_wrap: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerSpec {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Option<EdgeInsets>,
    pub margin: Option<EdgeInsets>,
    pub alignment: Option<Alignment>,
    pub color: Option<ColorValue>,
    pub decoration: Option<BoxDecoration>,
    pub child: Option<Box<NodeSpec>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlexSpec {
    pub main_axis_alignment: MainAxisAlignment,
    pub main_axis_size: MainAxisSize,
    pub cross_axis_alignment: CrossAxisAlignment,
    pub spacing: f64,
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleSpec {
    #[serde(default = "default_flex")]
    pub flex: f64,
    pub child: Box<NodeSpec>,
}

fn default_flex() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacerSpec {
    #[serde(default = "default_flex")]
    pub flex: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackSpec {
    pub alignment: Alignment,
    pub fit: StackFit,
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedSpec {
    #[serde(flatten)]
    pub position: PositionSpec,
    pub child: Box<NodeSpec>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSpec {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSpec {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellSpec>>,
    pub column_widths: Vec<ColumnWidthSpec>,
    /// Border width; `0` removes the grid.
    pub border_width: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizedBoxSpec {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub child: Option<Box<NodeSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddingSpec {
    pub padding: EdgeInsets,
    pub child: Box<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterSpec {
    pub child: Box<NodeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSpec {
    pub values: Vec<f64>,
    pub bar_color: Option<ColorValue>,
    pub axis_color: Option<ColorValue>,
    pub spacing: Option<f64>,
}

/// One node of the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeSpec {
    Text(TextSpec),
    Container(ContainerSpec),
    Row(FlexSpec),
    Column(FlexSpec),
    Expanded(FlexibleSpec),
    Flexible(FlexibleSpec),
    Spacer(SpacerSpec),
    Stack(StackSpec),
    Positioned(PositionedSpec),
    Table(TableSpec),
    SizedBox(SizedBoxSpec),
    Padding(PaddingSpec),
    Center(CenterSpec),
    Chart(ChartSpec),
}

fn build_all(nodes: &[NodeSpec]) -> Result<Vec<Box<dyn Widget>>, Error> {
    nodes.iter().map(NodeSpec::build).collect()
}

impl NodeSpec {
    /// Turn this node and its subtree into widgets.
    pub fn build(&self) -> Result<Box<dyn Widget>, Error> {
        let widget: Box<dyn Widget> = match self {
            NodeSpec::Text(spec) => {
                let mut text = Text::new(spec.text.clone())
                    .style(spec.style.clone())
                    .align(spec.align)
                    .soft_wrap(spec.soft_wrap);
                if let Some(max_lines) = spec.max_lines {
                    text = text.max_lines(max_lines);
                }
                Box::new(text)
            }
            NodeSpec::Container(spec) => {
                let mut container = Container::new();
                if let Some(w) = spec.width {
                    container = container.width(w);
                }
                if let Some(h) = spec.height {
                    container = container.height(h);
                }
                if let Some(padding) = spec.padding {
                    container = container.padding(padding);
                }
                if let Some(margin) = spec.margin {
                    container = container.margin(margin);
                }
                if let Some(alignment) = spec.alignment {
                    container = container.alignment(alignment);
                }
                if let Some(decoration) = &spec.decoration {
                    container = container.decoration(decoration.clone());
                }
                if let Some(color) = &spec.color {
                    container = container.color(color.to_color());
                }
                if let Some(child) = &spec.child {
                    container = container.child(child.build()?);
                }
                Box::new(container)
            }
            NodeSpec::Row(spec) => Box::new(Self::build_flex(Axis::Horizontal, spec)?),
            NodeSpec::Column(spec) => Box::new(Self::build_flex(Axis::Vertical, spec)?),
            NodeSpec::Expanded(spec) => {
                Box::new(Flexible::expanded(spec.child.build()?).flex(spec.flex))
            }
            NodeSpec::Flexible(spec) => Box::new(
                Flexible::new(spec.child.build()?)
                    .flex(spec.flex)
                    .fit(FlexFit::Loose),
            ),
            NodeSpec::Spacer(spec) => Box::new(Spacer::flex(spec.flex)),
            NodeSpec::Stack(spec) => Box::new(
                Stack::new()
                    .alignment(spec.alignment)
                    .fit(spec.fit)
                    .with_children(build_all(&spec.children)?),
            ),
            NodeSpec::Positioned(spec) => {
                let p = spec.position;
                let hint = PositionHint {
                    left: p.left,
                    top: p.top,
                    right: p.right,
                    bottom: p.bottom,
                    width: p.width,
                    height: p.height,
                };
                Box::new(Positioned::from_hint(hint, spec.child.build()?))
            }
            NodeSpec::Table(spec) => Box::new(Self::build_table(spec)?),
            NodeSpec::SizedBox(spec) => {
                let mut sized = match (spec.width, spec.height) {
                    (Some(w), Some(h)) => SizedBox::new(w, h),
                    (Some(w), None) => SizedBox::from_width(w),
                    (None, Some(h)) => SizedBox::from_height(h),
                    (None, None) => SizedBox::default(),
                };
                if let Some(child) = &spec.child {
                    sized = sized.child(child.build()?);
                }
                Box::new(sized)
            }
            NodeSpec::Padding(spec) => Box::new(Padding::new(spec.padding, spec.child.build()?)),
            NodeSpec::Center(spec) => Box::new(Center::new(spec.child.build()?)),
            NodeSpec::Chart(spec) => {
                let mut chart = BarChart::new(spec.values.clone());
                if let Some(color) = &spec.bar_color {
                    chart = chart.bar_color(color.to_color());
                }
                if let Some(color) = &spec.axis_color {
                    chart = chart.axis_color(color.to_color());
                }
                if let Some(spacing) = spec.spacing {
                    chart = chart.spacing(spacing);
                }
                Box::new(chart)
            }
        };
        Ok(widget)
    }

    fn build_flex(axis: Axis, spec: &FlexSpec) -> Result<Flex, Error> {
        Ok(Flex::new(axis)
            .main_axis_alignment(spec.main_axis_alignment)
            .main_axis_size(spec.main_axis_size)
            .cross_axis_alignment(spec.cross_axis_alignment)
            .spacing(spec.spacing)
            .with_children(build_all(&spec.children)?))
    }

    fn build_table(spec: &TableSpec) -> Result<Table, Error> {
        let data = spec
            .rows
            .iter()
            .map(|row| row.iter().map(CellSpec::to_value).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        let mut table = Table::from_text_array(data, spec.headers.clone());
        if !spec.column_widths.is_empty() {
            let widths = spec
                .column_widths
                .iter()
                .map(|w| w.to_width())
                .collect::<Result<Vec<_>, _>>()?;
            table = table.column_widths(widths);
        }
        match spec.border_width {
            Some(w) if w <= 0.0 => table = table.border(TableBorder::none()),
            Some(w) => table = table.border(TableBorder::all(w, Color::BLACK)),
            None => {}
        }
        Ok(table)
    }

    /// True when any text in the subtree mentions a page placeholder.
    fn has_placeholders(&self) -> bool {
        let mut found = false;
        self.visit_text(&mut |text| {
            found |= text.contains(PAGE_NUMBER) || text.contains(TOTAL_PAGES);
        });
        found
    }

    fn substitute(&self, info: PageInfo) -> NodeSpec {
        let mut node = self.clone();
        node.visit_text_mut(&mut |text| {
            *text = text
                .replace(PAGE_NUMBER, &info.page_number.to_string())
                .replace(TOTAL_PAGES, &info.total_pages.to_string());
        });
        node
    }

    fn children(&self) -> Vec<&NodeSpec> {
        match self {
            NodeSpec::Text(_) | NodeSpec::Spacer(_) | NodeSpec::Chart(_) => Vec::new(),
            NodeSpec::Container(spec) => spec.child.iter().map(|c| &**c).collect(),
            NodeSpec::SizedBox(spec) => spec.child.iter().map(|c| &**c).collect(),
            NodeSpec::Row(spec) | NodeSpec::Column(spec) => spec.children.iter().collect(),
            NodeSpec::Stack(spec) => spec.children.iter().collect(),
            NodeSpec::Expanded(spec) | NodeSpec::Flexible(spec) => vec![&*spec.child],
            NodeSpec::Positioned(spec) => vec![&*spec.child],
            NodeSpec::Padding(spec) => vec![&*spec.child],
            NodeSpec::Center(spec) => vec![&*spec.child],
            NodeSpec::Table(spec) => spec
                .rows
                .iter()
                .flatten()
                .filter_map(|cell| match cell {
                    CellSpec::Node(node) => Some(&**node),
                    _ => None,
                })
                .collect(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut NodeSpec> {
        match self {
            NodeSpec::Text(_) | NodeSpec::Spacer(_) | NodeSpec::Chart(_) => Vec::new(),
            NodeSpec::Container(spec) => spec.child.iter_mut().map(|c| &mut **c).collect(),
            NodeSpec::SizedBox(spec) => spec.child.iter_mut().map(|c| &mut **c).collect(),
            NodeSpec::Row(spec) | NodeSpec::Column(spec) => spec.children.iter_mut().collect(),
            NodeSpec::Stack(spec) => spec.children.iter_mut().collect(),
            NodeSpec::Expanded(spec) | NodeSpec::Flexible(spec) => vec![&mut *spec.child],
            NodeSpec::Positioned(spec) => vec![&mut *spec.child],
            NodeSpec::Padding(spec) => vec![&mut *spec.child],
            NodeSpec::Center(spec) => vec![&mut *spec.child],
            NodeSpec::Table(spec) => spec
                .rows
                .iter_mut()
                .flatten()
                .filter_map(|cell| match cell {
                    CellSpec::Node(node) => Some(&mut **node),
                    _ => None,
                })
                .collect(),
        }
    }

    fn visit_text(&self, f: &mut dyn FnMut(&str)) {
        match self {
            NodeSpec::Text(spec) => f(&spec.text),
            NodeSpec::Table(spec) => {
                spec.headers.iter().for_each(|h| f(h));
                for cell in spec.rows.iter().flatten() {
                    if let CellSpec::Text(s) = cell {
                        f(s);
                    }
                }
            }
            _ => {}
        }
        for child in self.children() {
            child.visit_text(f);
        }
    }

    fn visit_text_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        match self {
            NodeSpec::Text(spec) => f(&mut spec.text),
            NodeSpec::Table(spec) => {
                spec.headers.iter_mut().for_each(|h| f(h));
                for cell in spec.rows.iter_mut().flatten() {
                    if let CellSpec::Text(s) = cell {
                        f(s);
                    }
                }
            }
            _ => {}
        }
        for child in self.children_mut() {
            child.visit_text_mut(f);
        }
    }

    /// A header/footer decoration. Nodes mentioning page placeholders are
    /// rebuilt for every page; the rest are built once.
    pub fn decoration(&self) -> Result<PageDecoration, Error> {
        if !self.has_placeholders() {
            return Ok(PageDecoration::Static(self.build()?));
        }
        // Surface build errors now rather than once per page.
        self.substitute(PageInfo {
            page_number: 1,
            total_pages: 1,
        })
        .build()?;
        let template = self.clone();
        Ok(PageDecoration::builder(move |info| {
            match template.substitute(info).build() {
                Ok(widget) => widget,
                Err(error) => {
                    tracing::warn!(%error, page = info.page_number, "page decoration failed to build");
                    Box::new(SizedBox::shrink())
                }
            }
        }))
    }
}
