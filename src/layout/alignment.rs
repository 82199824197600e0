//! # Alignment
//!
//! Where a child sits inside a larger (or smaller) parent box. Nine named
//! anchors cover the common cases; `Geometry` takes any point in `[-1, 1]²`
//! where `(-1, -1)` is the top-left corner and `(1, 1)` the bottom-right.
//!
//! Offsets are computed in widget space (Y down):
//!
//! ```text
//! offset = (container - child) * (alignment + 1) / 2      per axis
//! ```
//!
//! A child bigger than its container gets a negative offset and overflows
//! past the top/left edge. That is intended, not an error.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Geometry {
        x: f64,
        y: f64,
    },
}

impl Alignment {
    /// Fraction of the free space placed before the child, per axis.
    fn factors(&self) -> (f64, f64) {
        match self {
            Alignment::TopLeft => (0.0, 0.0),
            Alignment::TopCenter => (0.5, 0.0),
            Alignment::TopRight => (1.0, 0.0),
            Alignment::CenterLeft => (0.0, 0.5),
            Alignment::Center => (0.5, 0.5),
            Alignment::CenterRight => (1.0, 0.5),
            Alignment::BottomLeft => (0.0, 1.0),
            Alignment::BottomCenter => (0.5, 1.0),
            Alignment::BottomRight => (1.0, 1.0),
            Alignment::Geometry { x, y } => ((x + 1.0) / 2.0, (y + 1.0) / 2.0),
        }
    }

    /// The top-left offset of `child` inside `container`.
    pub fn resolve(&self, container: Size, child: Size) -> Point {
        let (fx, fy) = self.factors();
        Point::new(
            (container.width - child.width) * fx,
            (container.height - child.height) * fy,
        )
    }

    /// Offset along a single axis; `horizontal` picks which factor applies.
    pub fn resolve_axis(&self, horizontal: bool, container: f64, child: f64) -> f64 {
        let (fx, fy) = self.factors();
        let f = if horizontal { fx } else { fy };
        (container - child) * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_exact_half_of_free_space() {
        let p = Alignment::Center.resolve(Size::new(100.0, 60.0), Size::new(30.0, 20.0));
        assert_eq!(p, Point::new(35.0, 20.0));
    }

    #[test]
    fn named_anchors_match_geometry() {
        let container = Size::new(200.0, 100.0);
        let child = Size::new(50.0, 10.0);
        let table = [
            (Alignment::TopLeft, -1.0, -1.0),
            (Alignment::TopCenter, 0.0, -1.0),
            (Alignment::TopRight, 1.0, -1.0),
            (Alignment::CenterLeft, -1.0, 0.0),
            (Alignment::Center, 0.0, 0.0),
            (Alignment::CenterRight, 1.0, 0.0),
            (Alignment::BottomLeft, -1.0, 1.0),
            (Alignment::BottomCenter, 0.0, 1.0),
            (Alignment::BottomRight, 1.0, 1.0),
        ];
        for (named, x, y) in table {
            assert_eq!(
                named.resolve(container, child),
                Alignment::Geometry { x, y }.resolve(container, child),
                "{named:?}"
            );
        }
    }

    #[test]
    fn oversized_child_gets_negative_offset() {
        let p = Alignment::BottomRight.resolve(Size::new(10.0, 10.0), Size::new(30.0, 15.0));
        assert_eq!(p, Point::new(-20.0, -5.0));
        let c = Alignment::Center.resolve(Size::new(10.0, 10.0), Size::new(30.0, 10.0));
        assert_eq!(c.x, -10.0);
    }
}
