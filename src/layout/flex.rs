//! # Flex Layout Utilities
//!
//! The pure arithmetic behind `Row`/`Column`: proportional distribution of
//! leftover main-axis space, main-axis spacing for each alignment mode, and
//! the direction rule that decides which end of the main axis child 0 starts
//! from. The widget in `widgets::flex` drives these; nothing here lays out a
//! child.
//!
//! ## Direction
//!
//! Whether children accumulate from offset 0 or from the far end depends on
//! three inputs plus the coordinate space the offsets are expressed in.
//! [`resolve_axis_direction`] answers for output space (origin bottom-left):
//! a top-to-bottom column has to be filled from the high-Y end there. Layout
//! works in widget space (origin top-left), where the vertical answer flips;
//! [`main_axis_direction`] applies that correction. Every position formula
//! goes through these two functions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Visual order of a column's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalDirection {
    /// First child at the top.
    #[default]
    Down,
    /// First child at the bottom.
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    /// Child 0 sits at offset 0 and later children follow at higher offsets.
    Forward,
    /// Child 0 sits at the far end of the axis.
    Reversed,
}

impl AxisDirection {
    pub fn flipped(self) -> Self {
        match self {
            AxisDirection::Forward => AxisDirection::Reversed,
            AxisDirection::Reversed => AxisDirection::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Origin top-left, Y down. Layout happens here.
    #[default]
    Widget,
    /// Origin bottom-left, Y up. Paint sinks live here.
    Output,
}

/// Accumulation direction of the main axis, in output space.
///
/// Rows follow the text direction. Columns ignore it: `Down` fills from the
/// top, which is the high-Y end in output space, so it is `Reversed`.
pub fn resolve_axis_direction(
    axis: Axis,
    text_direction: TextDirection,
    vertical_direction: VerticalDirection,
) -> AxisDirection {
    match axis {
        Axis::Horizontal => match text_direction {
            TextDirection::Ltr => AxisDirection::Forward,
            TextDirection::Rtl => AxisDirection::Reversed,
        },
        Axis::Vertical => match vertical_direction {
            VerticalDirection::Down => AxisDirection::Reversed,
            VerticalDirection::Up => AxisDirection::Forward,
        },
    }
}

/// [`resolve_axis_direction`] expressed in the given coordinate space.
pub fn main_axis_direction(
    axis: Axis,
    text_direction: TextDirection,
    vertical_direction: VerticalDirection,
    space: CoordinateSpace,
) -> AxisDirection {
    let output = resolve_axis_direction(axis, text_direction, vertical_direction);
    match (axis, space) {
        (Axis::Vertical, CoordinateSpace::Widget) => output.flipped(),
        _ => output,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainAxisAlignment {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainAxisSize {
    Min,
    #[default]
    Max,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossAxisAlignment {
    Start,
    End,
    #[default]
    Center,
    Stretch,
    /// Not supported yet: text baselines are not threaded through the cross
    /// axis, so this positions like `Start`.
    Baseline,
}

impl CrossAxisAlignment {
    /// Offset of a child inside the cross extent of its container.
    pub fn offset(self, container: f64, child: f64) -> f64 {
        match self {
            CrossAxisAlignment::Start
            | CrossAxisAlignment::Stretch
            | CrossAxisAlignment::Baseline => 0.0,
            CrossAxisAlignment::End => container - child,
            CrossAxisAlignment::Center => (container - child) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlexFit {
    /// The child may be smaller than its share.
    #[default]
    Loose,
    /// The child is forced to exactly its share.
    Tight,
}

/// How a flexible child takes part in main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexChildData {
    pub flex: f64,
    pub fit: FlexFit,
}

/// Split `free` space between children in proportion to their flex factors.
/// Negative free space distributes nothing.
pub fn distribute_flex(free: f64, flexes: &[f64]) -> Vec<f64> {
    let total: f64 = flexes.iter().filter(|f| **f > 0.0).sum();
    if total <= 0.0 {
        return vec![0.0; flexes.len()];
    }
    let free = free.max(0.0);
    flexes
        .iter()
        .map(|f| if *f > 0.0 { free * (f / total) } else { 0.0 })
        .collect()
}

/// Leading offset of every child along the main axis, measured from the
/// start edge in forward order.
///
/// `spacing` is the fixed gap between neighbours; the alignment distributes
/// whatever is left of `main_size` on top of it. Distributed modes never use
/// negative leftover space. A lone child under `SpaceBetween` is centered.
pub fn main_axis_offsets(
    alignment: MainAxisAlignment,
    child_sizes: &[f64],
    spacing: f64,
    main_size: f64,
) -> Vec<f64> {
    let n = child_sizes.len();
    if n == 0 {
        return vec![];
    }
    let used: f64 = child_sizes.iter().sum::<f64>() + spacing * (n - 1) as f64;
    let remaining = main_size - used;
    let free = remaining.max(0.0);

    let (leading, between) = match alignment {
        MainAxisAlignment::Start => (0.0, spacing),
        MainAxisAlignment::End => (remaining, spacing),
        MainAxisAlignment::Center => (remaining / 2.0, spacing),
        MainAxisAlignment::SpaceBetween => {
            if n == 1 {
                (remaining / 2.0, spacing)
            } else {
                (0.0, spacing + free / (n - 1) as f64)
            }
        }
        MainAxisAlignment::SpaceAround => {
            let space = free / n as f64;
            (space / 2.0, spacing + space)
        }
        MainAxisAlignment::SpaceEvenly => {
            let space = free / (n + 1) as f64;
            (space, spacing + space)
        }
    };

    let mut offsets = Vec::with_capacity(n);
    let mut cursor = leading;
    for size in child_sizes {
        offsets.push(cursor);
        cursor += size + between;
    }
    offsets
}

/// Turn a forward offset into a position on the axis.
pub fn place_on_axis(direction: AxisDirection, offset: f64, child: f64, main_size: f64) -> f64 {
    match direction {
        AxisDirection::Forward => offset,
        AxisDirection::Reversed => main_size - offset - child,
    }
}
