//! Grid of widget cells with per-column width strategies.
//!
//! Layout runs column-first: every column strategy measures its cells, the
//! measurements are resolved into final widths against the available width,
//! and only then are rows laid out, each cell pinned to its column's width.
//! Rows that do not fit the incoming max height are left out and reported
//! through [`Table::visible_rows`]; a row is never split.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{EdgeInsets, Point, Rect, Size};
use crate::graphics::{paint_decoration, stroke_line};
use crate::layout::table::{fit_rows, resolve_column_widths, TableColumnWidth, TableWidth};
use crate::layout::{cached, BoxConstraints, LayoutContext, LayoutResult, PaintContext, Widget};
use crate::style::{BorderSide, BoxDecoration, Color, TextAlign};
use crate::widgets::{Padding, SizedBox, Text, TextRole};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableCellVerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
    /// The cell is laid out again, tight to the row height.
    Full,
}

impl TableCellVerticalAlignment {
    fn offset(self, row_height: f64, cell_height: f64) -> f64 {
        match self {
            TableCellVerticalAlignment::Top | TableCellVerticalAlignment::Full => 0.0,
            TableCellVerticalAlignment::Middle => (row_height - cell_height) / 2.0,
            TableCellVerticalAlignment::Bottom => row_height - cell_height,
        }
    }
}

/// Lines drawn around and between cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableBorder {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
    pub horizontal_inside: BorderSide,
    pub vertical_inside: BorderSide,
}

impl TableBorder {
    pub fn all(width: f64, color: Color) -> Self {
        let side = BorderSide::new(width, color);
        Self {
            top: side,
            right: side,
            bottom: side,
            left: side,
            horizontal_inside: side,
            vertical_inside: side,
        }
    }

    pub fn none() -> Self {
        Self {
            top: BorderSide::NONE,
            right: BorderSide::NONE,
            bottom: BorderSide::NONE,
            left: BorderSide::NONE,
            horizontal_inside: BorderSide::NONE,
            vertical_inside: BorderSide::NONE,
        }
    }
}

impl Default for TableBorder {
    fn default() -> Self {
        Self::none()
    }
}

pub struct TableRow {
    children: Vec<Box<dyn Widget>>,
    vertical_alignment: Option<TableCellVerticalAlignment>,
    decoration: Option<BoxDecoration>,
    repeat: bool,
}

impl TableRow {
    pub fn new(children: Vec<Box<dyn Widget>>) -> Self {
        Self {
            children,
            vertical_alignment: None,
            decoration: None,
            repeat: false,
        }
    }

    pub fn cell(mut self, cell: impl Widget + 'static) -> Self {
        self.children.push(Box::new(cell));
        self
    }

    pub fn vertical_alignment(mut self, alignment: TableCellVerticalAlignment) -> Self {
        self.vertical_alignment = Some(alignment);
        self
    }

    pub fn decoration(mut self, decoration: BoxDecoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Repeated rows are kept at the top of a table that starts mid-way
    /// through its rows, like a header on a continuation page.
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.repeat
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A single cell's content for [`Table::from_text_array`].
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Widget(Box<dyn Widget>),
    Null,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<Box<dyn Widget>> for CellValue {
    fn from(w: Box<dyn Widget>) -> Self {
        CellValue::Widget(w)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Integral values print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

const CELL_PADDING: f64 = 5.0;

impl CellValue {
    fn into_widget(self) -> Box<dyn Widget> {
        let content: Box<dyn Widget> = match self {
            CellValue::Text(s) => Box::new(Text::new(s).role(TextRole::TableCell)),
            CellValue::Number(n) => Box::new(
                Text::new(format_number(n))
                    .role(TextRole::TableCell)
                    .align(TextAlign::Right),
            ),
            CellValue::Boolean(b) => Box::new(Text::new(b.to_string()).role(TextRole::TableCell)),
            CellValue::Widget(w) => w,
            CellValue::Null => Box::new(SizedBox::shrink()),
        };
        Box::new(Padding::new(EdgeInsets::all(CELL_PADDING), content))
    }
}

/// The rows shown by the last layout, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRows {
    pub first_row: usize,
    pub last_row: usize,
}

#[derive(Debug, Clone)]
struct RowLayout {
    index: usize,
    y: f64,
    height: f64,
    cells: Vec<Rect>,
}

#[derive(Debug, Clone)]
struct TableLayout {
    widths: Vec<f64>,
    rows: Vec<RowLayout>,
}

#[derive(Default)]
pub struct Table {
    rows: Vec<TableRow>,
    column_widths: Vec<TableColumnWidth>,
    default_column_width: TableColumnWidth,
    table_width: TableWidth,
    border: TableBorder,
    default_vertical_alignment: TableCellVerticalAlignment,
    start_row: usize,
    layout: Option<TableLayout>,
    visible: Option<VisibleRows>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bordered table of text cells with an optional repeated header row.
    pub fn from_text_array(data: Vec<Vec<CellValue>>, headers: Vec<String>) -> Self {
        let mut table = Table::new().border(TableBorder::all(1.0, Color::BLACK));
        if !headers.is_empty() {
            let cells = headers
                .into_iter()
                .map(|h| -> Box<dyn Widget> {
                    Box::new(Padding::new(
                        EdgeInsets::all(CELL_PADDING),
                        Text::new(h).role(TextRole::TableHeader),
                    ))
                })
                .collect();
            table = table.row(TableRow::new(cells).repeat(true));
        }
        for values in data {
            let cells = values.into_iter().map(CellValue::into_widget).collect();
            table = table.row(TableRow::new(cells));
        }
        table
    }

    pub fn row(mut self, row: TableRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_rows(mut self, rows: Vec<TableRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn column_widths(mut self, widths: Vec<TableColumnWidth>) -> Self {
        self.column_widths = widths;
        self
    }

    pub fn default_column_width(mut self, width: TableColumnWidth) -> Self {
        self.default_column_width = width;
        self
    }

    pub fn table_width(mut self, width: TableWidth) -> Self {
        self.table_width = width;
        self
    }

    pub fn border(mut self, border: TableBorder) -> Self {
        self.border = border;
        self
    }

    pub fn default_vertical_alignment(mut self, alignment: TableCellVerticalAlignment) -> Self {
        self.default_vertical_alignment = alignment;
        self
    }

    /// Continue the table from row `start`, keeping earlier repeated rows.
    pub fn start_row(mut self, start: usize) -> Self {
        self.start_row = start;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn border_style(&self) -> &TableBorder {
        &self.border
    }

    pub fn column_width(&self, column: usize) -> TableColumnWidth {
        self.column_widths
            .get(column)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    /// Rows from `start_row` onwards that fit in the last layout. `None`
    /// before layout or when none of them fit.
    pub fn visible_rows(&self) -> Option<VisibleRows> {
        self.visible
    }

    /// Resolved column widths from the last layout.
    pub fn resolved_widths(&self) -> Option<&[f64]> {
        self.layout.as_ref().map(|l| l.widths.as_slice())
    }

    /// Indices of the rows this layout considers, in order.
    fn candidate_rows(&self) -> Vec<usize> {
        let start = self.start_row.min(self.rows.len());
        (0..start)
            .filter(|&i| self.rows[i].repeat)
            .chain(start..self.rows.len())
            .collect()
    }

    fn measure_columns(
        &mut self,
        ctx: &LayoutContext<'_>,
        candidates: &[usize],
        available: f64,
    ) -> Result<Vec<f64>, LayoutError> {
        let columns = candidates
            .iter()
            .map(|&i| self.rows[i].children.len())
            .max()
            .unwrap_or(0);
        let unbounded = ctx.with_constraints(BoxConstraints::default());

        let mut measures = Vec::with_capacity(columns);
        for col in 0..columns {
            let strategy = self.column_width(col);
            let mut measure = strategy.measure(0.0, None, available);
            for &i in candidates {
                let Some(cell) = self.rows[i].children.get_mut(col) else {
                    continue;
                };
                let intrinsic = if strategy.needs_intrinsic() {
                    cell.layout(&unbounded)?.size.width
                } else {
                    0.0
                };
                let flex = cell.flex_data().map(|d| d.flex);
                measure = measure.merge(&strategy.measure(intrinsic, flex, available));
            }
            measures.push(measure);
        }
        Ok(resolve_column_widths(&measures, available, self.table_width))
    }
}

impl Widget for Table {
    fn name(&self) -> &'static str {
        "Table"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let candidates = self.candidate_rows();
        let widths = self.measure_columns(ctx, &candidates, c.max_width)?;

        let mut laid_out: Vec<RowLayout> = Vec::with_capacity(candidates.len());
        for &index in &candidates {
            let row = &mut self.rows[index];
            let alignment = row
                .vertical_alignment
                .unwrap_or(self.default_vertical_alignment);

            let mut sizes = Vec::with_capacity(row.children.len());
            for (cell, &width) in row.children.iter_mut().zip(&widths) {
                let constraints = BoxConstraints::expand(Some(width), None);
                sizes.push(cell.layout(&ctx.with_constraints(constraints))?.size);
            }
            let height = sizes.iter().map(|s| s.height).fold(0.0, f64::max);

            if alignment == TableCellVerticalAlignment::Full {
                for ((cell, &width), size) in row.children.iter_mut().zip(&widths).zip(sizes.iter_mut()) {
                    let tight = BoxConstraints::tight(Size::new(width, height));
                    *size = cell.layout(&ctx.with_constraints(tight))?.size;
                }
            }

            let mut x = 0.0;
            let cells = sizes
                .iter()
                .zip(&widths)
                .map(|(size, &width)| {
                    let rect = Rect::new(
                        x,
                        alignment.offset(height, size.height),
                        size.width,
                        size.height,
                    );
                    x += width;
                    rect
                })
                .collect();
            laid_out.push(RowLayout {
                index,
                y: 0.0,
                height,
                cells,
            });
        }

        let heights: Vec<f64> = laid_out.iter().map(|r| r.height).collect();
        let (count, total_height) = fit_rows(&heights, c.max_height);
        if count < laid_out.len() {
            tracing::warn!(
                shown = count,
                rows = laid_out.len(),
                max_height = c.max_height,
                "table rows do not fit the available height; truncating"
            );
        }
        laid_out.truncate(count);
        let mut y = 0.0;
        for row in laid_out.iter_mut() {
            row.y = y;
            y += row.height;
        }

        let body: Vec<usize> = laid_out
            .iter()
            .map(|r| r.index)
            .filter(|&i| i >= self.start_row)
            .collect();
        self.visible = match (body.first(), body.last()) {
            (Some(&first_row), Some(&last_row)) => Some(VisibleRows {
                first_row,
                last_row,
            }),
            _ => None,
        };

        let width: f64 = widths.iter().sum();
        let size = c.constrain(Size::new(width, total_height));
        self.layout = Some(TableLayout {
            widths,
            rows: laid_out,
        });
        Ok(LayoutResult::new(size).with_repaint(true))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let layout = cached(&self.layout, self.name())?;
        let table_width: f64 = layout.widths.iter().sum();

        for row_layout in &layout.rows {
            let row = &self.rows[row_layout.index];
            let row_rect = Rect::new(0.0, row_layout.y, table_width, row_layout.height);
            if let Some(decoration) = &row.decoration {
                ctx.in_rect(row_rect, |ctx| {
                    paint_decoration(&mut *ctx.graphics, decoration, ctx.size)
                })?;
            }
            for (cell, rect) in row.children.iter().zip(&row_layout.cells) {
                let rect = Rect::new(rect.x, rect.y + row_layout.y, rect.width, rect.height);
                ctx.paint_child(cell.as_ref(), rect)?;
            }
        }

        self.paint_border(ctx, layout)
    }
}

impl Table {
    fn paint_border(&self, ctx: &mut PaintContext<'_>, layout: &TableLayout) -> Result<(), LayoutError> {
        let border = &self.border;
        let height = ctx.size.height;
        let w: f64 = layout.widths.iter().sum();
        let h: f64 = layout.rows.iter().map(|r| r.height).sum();
        // Widget space to output space.
        let at = |x: f64, y: f64| Point::new(x, height - y);
        let mut line = |from: Point, to: Point, side: &BorderSide| {
            if side.is_visible() {
                stroke_line(&mut *ctx.graphics, from, to, side.width, side.color);
            }
        };

        if layout.rows.is_empty() {
            return Ok(());
        }
        line(at(0.0, 0.0), at(w, 0.0), &border.top);
        line(at(0.0, h), at(w, h), &border.bottom);
        line(at(0.0, 0.0), at(0.0, h), &border.left);
        line(at(w, 0.0), at(w, h), &border.right);

        for row in layout.rows.iter().skip(1) {
            line(at(0.0, row.y), at(w, row.y), &border.horizontal_inside);
        }
        let mut x = 0.0;
        for width in layout.widths.iter().take(layout.widths.len().saturating_sub(1)) {
            x += width;
            line(at(x, 0.0), at(x, h), &border.vertical_inside);
        }
        Ok(())
    }
}
