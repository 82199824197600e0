//! # Table Column Widths
//!
//! Column sizing for the `Table` widget. Each column picks its own strategy;
//! the strategy turns every cell in the column into a `{width, flex}`
//! measurement, the column keeps the maximum of both, and then:
//!
//! 1. Non-flex columns take their measured width.
//! 2. If they overflow the available width they are scaled down together.
//!    Under `TableWidth::Max` with no flex column they are scaled up to fill.
//! 3. Whatever is left is split between flex columns by weight, with the same
//!    proportional formula the flex engine uses.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::flex::distribute_flex;

/// A fraction of the table's available width, guaranteed to be in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fraction(f64);

impl Fraction {
    pub fn new(value: f64) -> Result<Self, LayoutError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LayoutError::InvalidFraction(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableColumnWidth {
    /// Exactly this many points.
    Fixed(f64),
    /// A share of the leftover width.
    Flex(f64),
    /// As wide as the widest cell. A weight turns the column into a flex
    /// column; without one, a cell's own flex data is used.
    Intrinsic(Option<f64>),
    /// A fraction of the available width.
    Fraction(Fraction),
}

impl Default for TableColumnWidth {
    fn default() -> Self {
        TableColumnWidth::Intrinsic(None)
    }
}

impl TableColumnWidth {
    /// Fallible constructor for [`TableColumnWidth::Fraction`].
    pub fn fraction(value: f64) -> Result<Self, LayoutError> {
        Ok(TableColumnWidth::Fraction(Fraction::new(value)?))
    }

    /// Whether measuring a cell requires laying it out.
    pub fn needs_intrinsic(&self) -> bool {
        matches!(self, TableColumnWidth::Intrinsic(_))
    }

    /// Measure one cell of this column. `intrinsic` is the cell's natural
    /// width and `cell_flex` its own flex factor, if it has one.
    pub fn measure(&self, intrinsic: f64, cell_flex: Option<f64>, available: f64) -> ColumnMeasure {
        match self {
            TableColumnWidth::Fixed(w) => ColumnMeasure {
                width: *w,
                flex: 0.0,
            },
            TableColumnWidth::Flex(f) => ColumnMeasure {
                width: 0.0,
                flex: *f,
            },
            TableColumnWidth::Intrinsic(weight) => ColumnMeasure {
                width: intrinsic,
                flex: weight.or(cell_flex).unwrap_or(0.0),
            },
            TableColumnWidth::Fraction(f) => ColumnMeasure {
                width: if available.is_finite() {
                    available * f.value()
                } else {
                    0.0
                },
                flex: 0.0,
            },
        }
    }
}

/// Width and flex weight reported for a column (or a single cell).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnMeasure {
    pub width: f64,
    pub flex: f64,
}

impl ColumnMeasure {
    /// Column-wise accumulation: the maximum of both components.
    pub fn merge(&self, other: &ColumnMeasure) -> ColumnMeasure {
        ColumnMeasure {
            width: self.width.max(other.width),
            flex: self.flex.max(other.flex),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableWidth {
    /// Columns keep their measured widths.
    Min,
    /// The table fills the available width.
    #[default]
    Max,
}

/// Resolve final column widths.
pub fn resolve_column_widths(
    columns: &[ColumnMeasure],
    available: f64,
    table_width: TableWidth,
) -> Vec<f64> {
    let mut widths: Vec<f64> = columns.iter().map(|c| c.width.max(0.0)).collect();
    if !available.is_finite() {
        return widths;
    }

    let flexes: Vec<f64> = columns.iter().map(|c| c.flex).collect();
    let total_flex: f64 = flexes.iter().filter(|f| **f > 0.0).sum();
    let fixed_total: f64 = columns
        .iter()
        .zip(&widths)
        .filter(|(c, _)| c.flex <= 0.0)
        .map(|(_, w)| *w)
        .sum();

    let fill = table_width == TableWidth::Max && total_flex <= 0.0;
    if fixed_total > 0.0 && (fill || fixed_total > available) {
        let ratio = available / fixed_total;
        for (w, c) in widths.iter_mut().zip(columns) {
            if c.flex <= 0.0 {
                *w *= ratio;
            }
        }
    }

    if total_flex > 0.0 {
        let used: f64 = widths
            .iter()
            .zip(columns)
            .filter(|(_, c)| c.flex <= 0.0)
            .map(|(w, _)| *w)
            .sum();
        let shares = distribute_flex(available - used, &flexes);
        for ((w, c), share) in widths.iter_mut().zip(columns).zip(shares) {
            if c.flex > 0.0 {
                *w = share;
            }
        }
    }

    widths
}

/// How many leading rows fit in `max_height`. The first row is always taken
/// so a table never lays out empty. Returns `(count, total_height)`.
pub fn fit_rows(row_heights: &[f64], max_height: f64) -> (usize, f64) {
    let mut total = 0.0;
    for (i, h) in row_heights.iter().enumerate() {
        if i > 0 && total + h > max_height {
            return (i, total);
        }
        total += h;
    }
    (row_heights.len(), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(w: f64) -> ColumnMeasure {
        ColumnMeasure { width: w, flex: 0.0 }
    }

    fn flex(f: f64) -> ColumnMeasure {
        ColumnMeasure { width: 0.0, flex: f }
    }

    #[test]
    fn fraction_out_of_range_is_rejected() {
        assert!(TableColumnWidth::fraction(0.25).is_ok());
        assert_eq!(
            TableColumnWidth::fraction(-0.1),
            Err(LayoutError::InvalidFraction(-0.1))
        );
        assert!(TableColumnWidth::fraction(1.01).is_err());
    }

    #[test]
    fn flex_columns_share_leftover() {
        let widths = resolve_column_widths(&[fixed(100.0), flex(1.0), flex(3.0)], 500.0, TableWidth::Max);
        assert_eq!(widths, vec![100.0, 100.0, 300.0]);
        let total: f64 = widths.iter().sum();
        assert!((total - 500.0).abs() < 1e-9);
    }

    #[test]
    fn max_without_flex_scales_fixed_columns_up() {
        let widths = resolve_column_widths(&[fixed(50.0), fixed(150.0)], 400.0, TableWidth::Max);
        assert_eq!(widths, vec![100.0, 300.0]);
    }

    #[test]
    fn min_leaves_fixed_columns_alone() {
        let widths = resolve_column_widths(&[fixed(50.0), fixed(150.0)], 400.0, TableWidth::Min);
        assert_eq!(widths, vec![50.0, 150.0]);
    }

    #[test]
    fn overflowing_columns_shrink_to_fit() {
        let widths = resolve_column_widths(&[fixed(300.0), fixed(300.0), flex(1.0)], 300.0, TableWidth::Min);
        assert_eq!(widths, vec![150.0, 150.0, 0.0]);
    }

    #[test]
    fn merge_keeps_maximum() {
        let column = [
            ColumnMeasure { width: 40.0, flex: 0.0 },
            ColumnMeasure { width: 70.0, flex: 0.0 },
            ColumnMeasure { width: 10.0, flex: 2.0 },
        ]
        .iter()
        .fold(ColumnMeasure::default(), |acc, m| acc.merge(m));
        assert_eq!(column, ColumnMeasure { width: 70.0, flex: 2.0 });
    }

    #[test]
    fn strategies_measure_cells() {
        let avail = 200.0;
        assert_eq!(TableColumnWidth::Fixed(30.0).measure(99.0, None, avail), fixed(30.0));
        assert_eq!(TableColumnWidth::Flex(2.0).measure(99.0, None, avail), flex(2.0));
        assert_eq!(
            TableColumnWidth::Intrinsic(None).measure(42.0, Some(3.0), avail),
            ColumnMeasure { width: 42.0, flex: 3.0 }
        );
        assert_eq!(
            TableColumnWidth::fraction(0.25).unwrap().measure(99.0, None, avail),
            fixed(50.0)
        );
    }

    #[test]
    fn fit_rows_truncates_but_keeps_first() {
        assert_eq!(fit_rows(&[30.0, 30.0, 30.0], 70.0), (2, 60.0));
        assert_eq!(fit_rows(&[100.0, 10.0], 50.0), (1, 100.0));
        assert_eq!(fit_rows(&[10.0, 10.0], f64::INFINITY), (2, 20.0));
        assert_eq!(fit_rows(&[], 10.0), (0, 0.0));
    }
}
