//! # Widgets
//!
//! Every concrete node of the layout tree. Each widget follows the same
//! contract from [`crate::layout::Widget`]: `layout` picks a size inside the
//! incoming constraints and caches child placements in widget space;
//! `paint` reads that cache and draws in output space with its own
//! bottom-left corner at the origin. Painting before layout fails with
//! [`LayoutError::NotLaidOut`](crate::error::LayoutError::NotLaidOut).
//!
//! Builders take children as `impl Widget + 'static` and box them, so trees
//! read top-down:
//!
//! ```ignore
//! let tree = Container::new()
//!     .padding(EdgeInsets::all(8.0))
//!     .child(Flex::row().child(Text::new("a")).child(Flexible::expanded(Spacer::new())));
//! ```

mod basic;
mod chart;
mod container;
mod flex;
mod multi_page;
mod page;
mod stack;
mod table;
mod text;
mod theme;

pub use basic::{Align, Center, ConstrainedBox, FractionallySizedBox, Padding, SizedBox, Transform};
pub use chart::BarChart;
pub use container::Container;
pub use flex::{Flex, Flexible, Spacer};
pub use multi_page::{MultiPage, MultiPageOptions, PageDecoration, PageInfo, RecordingPages};
pub use page::Page;
pub use stack::{Positioned, Stack, StackFit};
pub use table::{
    CellValue, Table, TableBorder, TableCellVerticalAlignment, TableRow, VisibleRows,
};
pub use text::{Text, TextRole};
pub use theme::{DefaultTextStyle, Theme};
