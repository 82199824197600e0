//! # Box Constraints
//!
//! The input every widget layout consumes: a min/max range per axis. A parent
//! chooses the constraints, the child picks a size inside them. Constraints
//! are built fresh for each layout call and never mutated.

use crate::error::LayoutError;
use crate::geometry::{EdgeInsets, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraints {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for BoxConstraints {
    /// Fully unconstrained: `0..∞` on both axes.
    fn default() -> Self {
        Self::expand(None, None)
    }
}

impl BoxConstraints {
    /// Build and validate constraints.
    pub fn new(
        min_width: f64,
        max_width: f64,
        min_height: f64,
        max_height: f64,
    ) -> Result<Self, LayoutError> {
        let c = Self {
            min_width,
            max_width,
            min_height,
            max_height,
        };
        c.validate()?;
        Ok(c)
    }

    /// Exactly `size`.
    pub fn tight(size: Size) -> Self {
        Self {
            min_width: size.width,
            max_width: size.width,
            min_height: size.height,
            max_height: size.height,
        }
    }

    /// Anything from zero up to `size`.
    pub fn loose(size: Size) -> Self {
        Self {
            min_width: 0.0,
            max_width: size.width,
            min_height: 0.0,
            max_height: size.height,
        }
    }

    /// Tight on the given axes, unbounded on the others.
    pub fn expand(width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            min_width: width.unwrap_or(0.0),
            max_width: width.unwrap_or(f64::INFINITY),
            min_height: height.unwrap_or(0.0),
            max_height: height.unwrap_or(f64::INFINITY),
        }
    }

    /// Check `0 <= min <= max` on both axes. Called at the top of every
    /// widget's layout.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let axis_ok =
            |min: f64, max: f64| min.is_finite() && min >= 0.0 && !max.is_nan() && min <= max;
        if axis_ok(self.min_width, self.max_width) && axis_ok(self.min_height, self.max_height) {
            Ok(())
        } else {
            Err(LayoutError::InvalidConstraints {
                min_width: self.min_width,
                max_width: self.max_width,
                min_height: self.min_height,
                max_height: self.max_height,
            })
        }
    }

    /// Clamp each axis of `size` into range. Never fails.
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            self.constrain_width(size.width),
            self.constrain_height(size.height),
        )
    }

    pub fn constrain_width(&self, width: f64) -> f64 {
        width.max(self.min_width).min(self.max_width)
    }

    pub fn constrain_height(&self, height: f64) -> f64 {
        height.max(self.min_height).min(self.max_height)
    }

    pub fn biggest(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn smallest(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_width.is_finite()
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_finite()
    }

    pub fn is_tight(&self) -> bool {
        self.min_width >= self.max_width && self.min_height >= self.max_height
    }

    /// Drop the minimums.
    pub fn loosen(&self) -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            ..*self
        }
    }

    /// Subtract insets from both bounds of both axes, clamped at zero.
    pub fn deflate(&self, insets: &EdgeInsets) -> Self {
        let h = insets.horizontal();
        let v = insets.vertical();
        let min_width = (self.min_width - h).max(0.0);
        let min_height = (self.min_height - v).max(0.0);
        Self {
            min_width,
            max_width: (self.max_width - h).max(min_width),
            min_height,
            max_height: (self.max_height - v).max(min_height),
        }
    }

    /// Constraints that respect `other` as far as possible while staying
    /// inside `self`.
    ///
    /// Minimums stay finite: an infinite request against an unbounded axis
    /// keeps this side's minimum.
    pub fn enforce(&self, other: &BoxConstraints) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            min_width: finite_or(self.constrain_width(other.min_width), self.min_width),
            max_width: self.constrain_width(other.max_width),
            min_height: finite_or(self.constrain_height(other.min_height), self.min_height),
            max_height: self.constrain_height(other.max_height),
        }
    }

    /// Pin the width to a single value, kept inside the current range.
    pub fn tighten_width(&self, width: f64) -> Self {
        let w = self.constrain_width(width);
        Self {
            min_width: w,
            max_width: w,
            ..*self
        }
    }

    pub fn tighten_height(&self, height: f64) -> Self {
        let h = self.constrain_height(height);
        Self {
            min_height: h,
            max_height: h,
            ..*self
        }
    }

    pub fn with_max_width(&self, max_width: f64) -> Self {
        Self {
            max_width: max_width.max(self.min_width),
            ..*self
        }
    }

    pub fn with_max_height(&self, max_height: f64) -> Self {
        Self {
            max_height: max_height.max(self.min_height),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories() {
        let s = Size::new(100.0, 50.0);
        assert!(BoxConstraints::tight(s).is_tight());
        assert_eq!(BoxConstraints::loose(s).smallest(), Size::ZERO);
        let e = BoxConstraints::expand(Some(10.0), None);
        assert_eq!(e.min_width, 10.0);
        assert!(!e.has_bounded_height());
    }

    #[test]
    fn constrain_clamps_each_axis() {
        let c = BoxConstraints::new(10.0, 100.0, 20.0, 30.0).unwrap();
        assert_eq!(c.constrain(Size::new(5.0, 50.0)), Size::new(10.0, 30.0));
        assert_eq!(c.constrain(Size::new(50.0, 25.0)), Size::new(50.0, 25.0));
    }

    #[test]
    fn min_greater_than_max_fails_fast() {
        assert!(matches!(
            BoxConstraints::new(50.0, 10.0, 0.0, 10.0),
            Err(LayoutError::InvalidConstraints { .. })
        ));
        let bad = BoxConstraints {
            min_width: 0.0,
            max_width: 10.0,
            min_height: 5.0,
            max_height: 1.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn nan_and_infinite_minimum_are_invalid() {
        assert!(BoxConstraints::new(f64::NAN, 10.0, 0.0, 10.0).is_err());
        assert!(BoxConstraints::new(f64::INFINITY, f64::INFINITY, 0.0, 10.0).is_err());
        assert!(BoxConstraints::new(0.0, f64::INFINITY, 0.0, f64::INFINITY).is_ok());
    }

    #[test]
    fn deflate_keeps_min_le_max() {
        let c = BoxConstraints::tight(Size::new(10.0, 10.0));
        let d = c.deflate(&EdgeInsets::all(8.0));
        assert_eq!(d.max_width, 0.0);
        assert!(d.validate().is_ok());
        let u = BoxConstraints::default().deflate(&EdgeInsets::all(8.0));
        assert!(!u.has_bounded_width());
    }

    #[test]
    fn enforce_stays_inside() {
        let outer = BoxConstraints::new(0.0, 100.0, 0.0, 100.0).unwrap();
        let inner = BoxConstraints::tight(Size::new(150.0, 40.0));
        let e = outer.enforce(&inner);
        assert_eq!(e.biggest(), Size::new(100.0, 40.0));
    }

    #[test]
    fn enforce_keeps_minimums_finite() {
        let unbounded = BoxConstraints::default();
        let e = unbounded.enforce(&BoxConstraints::tight(Size::square(f64::INFINITY)));
        assert_eq!(e.smallest(), Size::ZERO);
        assert!(!e.has_bounded_width());
        assert!(e.validate().is_ok());

        let row_child = BoxConstraints::new(0.0, f64::INFINITY, 0.0, 50.0).unwrap();
        let e = row_child.enforce(&BoxConstraints::tight(Size::square(f64::INFINITY)));
        assert_eq!((e.min_width, e.min_height, e.max_height), (0.0, 50.0, 50.0));
    }
}
