//! `Row`/`Column`: the flex layout widget and its flexible children.
//!
//! Layout runs in two passes over the children. Fixed children go first with
//! an unbounded main axis so they report their natural extent; whatever main
//! space is left is then shared between flexible children by weight. The
//! arithmetic lives in [`crate::layout::flex`]; this module only drives it.

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::layout::flex::{
    distribute_flex, main_axis_direction, main_axis_offsets, place_on_axis, Axis,
    CoordinateSpace, CrossAxisAlignment, FlexFit, MainAxisAlignment, MainAxisSize,
    VerticalDirection,
};
use crate::layout::{
    cached, BoxConstraints, FlexChildData, LayoutContext, LayoutResult, PaintContext,
    TextDirection, Widget,
};

/// A linear layout along one axis.
pub struct Flex {
    direction: Axis,
    children: Vec<Box<dyn Widget>>,
    main_axis_alignment: MainAxisAlignment,
    main_axis_size: MainAxisSize,
    cross_axis_alignment: CrossAxisAlignment,
    text_direction: Option<TextDirection>,
    vertical_direction: VerticalDirection,
    spacing: f64,
    rects: Option<Vec<Rect>>,
}

// Main/cross accessors so the algorithm reads the same for both axes.

fn main_of(axis: Axis, size: Size) -> f64 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

fn cross_of(axis: Axis, size: Size) -> f64 {
    main_of(axis.cross(), size)
}

fn size_of(axis: Axis, main: f64, cross: f64) -> Size {
    match axis {
        Axis::Horizontal => Size::new(main, cross),
        Axis::Vertical => Size::new(cross, main),
    }
}

fn constraints_of(axis: Axis, (min_main, max_main): (f64, f64), (min_cross, max_cross): (f64, f64)) -> BoxConstraints {
    match axis {
        Axis::Horizontal => BoxConstraints {
            min_width: min_main,
            max_width: max_main,
            min_height: min_cross,
            max_height: max_cross,
        },
        Axis::Vertical => BoxConstraints {
            min_width: min_cross,
            max_width: max_cross,
            min_height: min_main,
            max_height: max_main,
        },
    }
}

fn range_of(axis: Axis, c: &BoxConstraints) -> (f64, f64) {
    match axis {
        Axis::Horizontal => (c.min_width, c.max_width),
        Axis::Vertical => (c.min_height, c.max_height),
    }
}

impl Flex {
    pub fn new(direction: Axis) -> Self {
        Self {
            direction,
            children: Vec::new(),
            main_axis_alignment: MainAxisAlignment::default(),
            main_axis_size: MainAxisSize::default(),
            cross_axis_alignment: CrossAxisAlignment::default(),
            text_direction: None,
            vertical_direction: VerticalDirection::default(),
            spacing: 0.0,
            rects: None,
        }
    }

    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    pub fn child(mut self, child: impl Widget + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_children(mut self, children: Vec<Box<dyn Widget>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    pub fn main_axis_size(mut self, size: MainAxisSize) -> Self {
        self.main_axis_size = size;
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    /// Overrides the direction inherited from the layout context.
    pub fn text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = Some(direction);
        self
    }

    pub fn vertical_direction(mut self, direction: VerticalDirection) -> Self {
        self.vertical_direction = direction;
        self
    }

    /// Fixed gap between neighbouring children.
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Child rects from the last layout, in widget space.
    pub fn child_rects(&self) -> Option<&[Rect]> {
        self.rects.as_deref()
    }
}

impl Widget for Flex {
    fn name(&self) -> &'static str {
        match self.direction {
            Axis::Horizontal => "Row",
            Axis::Vertical => "Column",
        }
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        let c = ctx.constraints;
        c.validate()?;
        let axis = self.direction;
        let (min_main, max_main) = range_of(axis, &c);
        let (min_cross, max_cross) = range_of(axis.cross(), &c);
        let bounded_main = max_main.is_finite();
        let stretch = self.cross_axis_alignment == CrossAxisAlignment::Stretch;
        let text_direction = self.text_direction.unwrap_or(ctx.text_direction);

        let n = self.children.len();
        let total_spacing = self.spacing * n.saturating_sub(1) as f64;
        let cross_range = if stretch && max_cross.is_finite() {
            (max_cross, max_cross)
        } else {
            (0.0, max_cross)
        };

        let flex_data: Vec<Option<FlexChildData>> = self
            .children
            .iter()
            .map(|child| child.flex_data().filter(|d| d.flex > 0.0))
            .collect();
        let has_flexible = flex_data.iter().any(Option::is_some);
        if has_flexible && !bounded_main {
            tracing::debug!(
                widget = self.name(),
                "flexible children under an unbounded main axis are laid out as fixed"
            );
        }
        let flex_data: Vec<Option<FlexChildData>> = if bounded_main {
            flex_data
        } else {
            vec![None; n]
        };

        // Pass 1: fixed children at their natural main extent.
        let mut results: Vec<Option<LayoutResult>> = vec![None; n];
        let mut allocated = 0.0;
        let fixed_constraints = constraints_of(axis, (0.0, f64::INFINITY), cross_range);
        for (i, child) in self.children.iter_mut().enumerate() {
            if flex_data[i].is_some() {
                continue;
            }
            let result = child.layout(&ctx.with_constraints(fixed_constraints))?;
            allocated += main_of(axis, result.size);
            results[i] = Some(result);
        }

        // Pass 2: flexible children share what is left.
        if has_flexible && bounded_main {
            let flexes: Vec<f64> = flex_data
                .iter()
                .map(|d| d.map(|d| d.flex).unwrap_or(0.0))
                .collect();
            let free = max_main - allocated - total_spacing;
            let shares = distribute_flex(free, &flexes);
            for (i, child) in self.children.iter_mut().enumerate() {
                let Some(data) = flex_data[i] else {
                    continue;
                };
                let share = shares[i];
                let main_range = match data.fit {
                    FlexFit::Tight => (share, share),
                    FlexFit::Loose => (0.0, share),
                };
                let constraints = constraints_of(axis, main_range, cross_range);
                let result = child.layout(&ctx.with_constraints(constraints))?;
                allocated += main_of(axis, result.size);
                results[i] = Some(result);
            }
        }

        let results: Vec<LayoutResult> = results.into_iter().flatten().collect();

        let main_size = match self.main_axis_size {
            MainAxisSize::Max if bounded_main => max_main,
            _ => allocated + total_spacing,
        }
        .max(min_main)
        .min(max_main);

        let cross_size = if stretch && max_cross.is_finite() {
            max_cross
        } else {
            results
                .iter()
                .map(|r| cross_of(axis, r.size))
                .fold(0.0, f64::max)
        }
        .max(min_cross)
        .min(max_cross);

        // Stretch under an unbounded cross axis: now that the cross extent is
        // known, pin every child to it.
        let mut results = results;
        if stretch && !max_cross.is_finite() {
            for (child, result) in self.children.iter_mut().zip(results.iter_mut()) {
                let main = main_of(axis, result.size);
                let constraints = constraints_of(axis, (main, main), (cross_size, cross_size));
                *result = child.layout(&ctx.with_constraints(constraints))?;
            }
        }

        let main_sizes: Vec<f64> = results.iter().map(|r| main_of(axis, r.size)).collect();
        let offsets = main_axis_offsets(self.main_axis_alignment, &main_sizes, self.spacing, main_size);
        let direction = main_axis_direction(
            axis,
            text_direction,
            self.vertical_direction,
            CoordinateSpace::Widget,
        );
        let mirror_cross = axis == Axis::Vertical && text_direction == TextDirection::Rtl;

        let mut rects = Vec::with_capacity(n);
        for (result, offset) in results.iter().zip(&offsets) {
            let child_main = main_of(axis, result.size);
            let child_cross = cross_of(axis, result.size);
            let main_pos = place_on_axis(direction, *offset, child_main, main_size);
            let mut cross_pos = self.cross_axis_alignment.offset(cross_size, child_cross);
            if mirror_cross {
                cross_pos = cross_size - child_cross - cross_pos;
            }
            rects.push(match axis {
                Axis::Horizontal => Rect::new(main_pos, cross_pos, child_main, child_cross),
                Axis::Vertical => Rect::new(cross_pos, main_pos, child_cross, child_main),
            });
        }

        let baseline = results
            .first()
            .zip(rects.first())
            .and_then(|(r, rect)| r.baseline.map(|b| b + rect.y));
        let needs_repaint = results.iter().any(|r| r.needs_repaint);
        self.rects = Some(rects);

        Ok(LayoutResult::new(size_of(axis, main_size, cross_size))
            .with_baseline(baseline)
            .with_repaint(needs_repaint))
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        let rects = cached(&self.rects, self.name())?;
        for (child, rect) in self.children.iter().zip(rects) {
            ctx.paint_child(child.as_ref(), *rect)?;
        }
        Ok(())
    }
}

/// A child that takes a weighted share of its flex parent's free space.
pub struct Flexible {
    data: FlexChildData,
    child: Box<dyn Widget>,
}

impl Flexible {
    /// Weight 1, allowed to stay smaller than its share.
    pub fn new(child: impl Widget + 'static) -> Self {
        Self {
            data: FlexChildData {
                flex: 1.0,
                fit: FlexFit::Loose,
            },
            child: Box::new(child),
        }
    }

    /// Weight 1, forced to exactly its share.
    pub fn expanded(child: impl Widget + 'static) -> Self {
        Self::new(child).fit(FlexFit::Tight)
    }

    pub fn flex(mut self, flex: f64) -> Self {
        self.data.flex = flex.max(0.0);
        self
    }

    pub fn fit(mut self, fit: FlexFit) -> Self {
        self.data.fit = fit;
        self
    }
}

impl Widget for Flexible {
    fn name(&self) -> &'static str {
        match self.data.fit {
            FlexFit::Tight => "Expanded",
            FlexFit::Loose => "Flexible",
        }
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        self.child.layout(ctx)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        self.child.paint(ctx)
    }

    fn flex_data(&self) -> Option<FlexChildData> {
        Some(self.data)
    }
}

/// Empty tight flexible space.
pub struct Spacer {
    flex: f64,
}

impl Spacer {
    pub fn new() -> Self {
        Self { flex: 1.0 }
    }

    pub fn flex(flex: f64) -> Self {
        Self { flex: flex.max(0.0) }
    }
}

impl Default for Spacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Spacer {
    fn name(&self) -> &'static str {
        "Spacer"
    }

    fn layout(&mut self, ctx: &LayoutContext<'_>) -> Result<LayoutResult, LayoutError> {
        ctx.constraints.validate()?;
        Ok(LayoutResult::new(ctx.constraints.smallest()))
    }

    fn paint(&self, _ctx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        Ok(())
    }

    fn flex_data(&self) -> Option<FlexChildData> {
        Some(FlexChildData {
            flex: self.flex,
            fit: FlexFit::Tight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ThemeData;
    use crate::widgets::SizedBox;

    fn lay_out(flex: &mut Flex, constraints: BoxConstraints) -> Size {
        let theme = ThemeData::default();
        flex.layout(&LayoutContext::new(constraints, &theme))
            .unwrap()
            .size
    }

    fn rects(flex: &Flex) -> Vec<Rect> {
        flex.child_rects().unwrap().to_vec()
    }

    fn xs(flex: &Flex) -> Vec<f64> {
        rects(flex).iter().map(|r| r.x).collect()
    }

    fn widths(flex: &Flex) -> Vec<f64> {
        rects(flex).iter().map(|r| r.width).collect()
    }

    fn loose(w: f64, h: f64) -> BoxConstraints {
        BoxConstraints::loose(Size::new(w, h))
    }

    #[test]
    fn row_packs_from_start() {
        let mut row = Flex::row()
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(20.0, 30.0));
        let size = lay_out(&mut row, loose(100.0, 100.0));
        assert_eq!(size, Size::new(100.0, 30.0));
        assert_eq!(xs(&row), vec![0.0, 10.0]);
        // Default cross alignment is Center.
        assert_eq!(rects(&row)[0].y, 10.0);
    }

    #[test]
    fn expanding_box_in_row_stays_finite() {
        let mut row = Flex::row()
            .child(SizedBox::expand())
            .child(SizedBox::expand().child(SizedBox::shrink()))
            .child(SizedBox::new(20.0, 10.0));
        let size = lay_out(&mut row, loose(100.0, 50.0));
        assert_eq!(size, Size::new(100.0, 50.0));
        // Unbounded along the main axis: no width, full cross extent.
        assert_eq!(rects(&row)[0].size(), Size::new(0.0, 50.0));
        assert_eq!(rects(&row)[1].size(), Size::new(0.0, 50.0));
        assert_eq!(xs(&row), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn flex_factors_split_free_space() {
        let mut row = Flex::row()
            .child(Flexible::expanded(SizedBox::shrink()).flex(1.0))
            .child(Flexible::expanded(SizedBox::shrink()).flex(2.0))
            .child(Flexible::expanded(SizedBox::shrink()).flex(1.0));
        lay_out(&mut row, loose(400.0, 50.0));
        assert_eq!(widths(&row), vec![100.0, 200.0, 100.0]);
        assert_eq!(xs(&row), vec![0.0, 100.0, 300.0]);
    }

    #[test]
    fn fixed_children_are_subtracted_first() {
        let mut row = Flex::row()
            .child(SizedBox::from_width(100.0))
            .child(Flexible::expanded(SizedBox::shrink()))
            .child(Spacer::flex(3.0));
        lay_out(&mut row, loose(500.0, 50.0));
        assert_eq!(widths(&row), vec![100.0, 100.0, 300.0]);
    }

    #[test]
    fn spacing_is_reserved_before_distribution() {
        let mut row = Flex::row()
            .spacing(10.0)
            .child(Flexible::expanded(SizedBox::shrink()))
            .child(Flexible::expanded(SizedBox::shrink()));
        lay_out(&mut row, loose(110.0, 10.0));
        assert_eq!(widths(&row), vec![50.0, 50.0]);
        assert_eq!(xs(&row), vec![0.0, 60.0]);
    }

    #[test]
    fn loose_flexible_may_stay_smaller() {
        let mut row = Flex::row()
            .child(Flexible::new(SizedBox::from_width(30.0)))
            .child(Flexible::expanded(SizedBox::shrink()));
        lay_out(&mut row, loose(200.0, 10.0));
        assert_eq!(widths(&row), vec![30.0, 100.0]);
    }

    #[test]
    fn min_main_axis_size_wraps_children() {
        let mut row = Flex::row()
            .main_axis_size(MainAxisSize::Min)
            .spacing(5.0)
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(10.0, 10.0));
        assert_eq!(lay_out(&mut row, loose(300.0, 100.0)), Size::new(25.0, 10.0));
    }

    #[test]
    fn space_between_centers_a_single_child() {
        let mut row = Flex::row()
            .main_axis_alignment(MainAxisAlignment::SpaceBetween)
            .child(SizedBox::new(20.0, 10.0));
        lay_out(&mut row, loose(100.0, 10.0));
        assert_eq!(xs(&row), vec![40.0]);
    }

    #[test]
    fn rtl_row_starts_at_the_right() {
        let mut row = Flex::row()
            .text_direction(TextDirection::Rtl)
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(20.0, 10.0));
        lay_out(&mut row, loose(100.0, 10.0));
        assert_eq!(xs(&row), vec![90.0, 70.0]);
    }

    #[test]
    fn rtl_is_inherited_from_context() {
        let theme = ThemeData::default();
        let mut row = Flex::row().child(SizedBox::new(10.0, 10.0));
        let ctx = LayoutContext::new(loose(50.0, 10.0), &theme).with_text_direction(TextDirection::Rtl);
        row.layout(&ctx).unwrap();
        assert_eq!(xs(&row), vec![40.0]);
    }

    #[test]
    fn column_down_fills_from_top() {
        let mut col = Flex::column()
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(10.0, 20.0));
        lay_out(&mut col, loose(50.0, 100.0));
        let ys: Vec<f64> = rects(&col).iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![0.0, 10.0]);
    }

    #[test]
    fn column_up_fills_from_bottom() {
        let mut col = Flex::column()
            .vertical_direction(VerticalDirection::Up)
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(10.0, 20.0));
        lay_out(&mut col, loose(50.0, 100.0));
        let ys: Vec<f64> = rects(&col).iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![90.0, 70.0]);
    }

    #[test]
    fn rtl_column_mirrors_cross_start() {
        let mut col = Flex::column()
            .cross_axis_alignment(CrossAxisAlignment::Start)
            .text_direction(TextDirection::Rtl)
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::new(30.0, 10.0));
        lay_out(&mut col, loose(100.0, 100.0));
        assert_eq!(xs(&col), vec![20.0, 0.0]);
    }

    #[test]
    fn stretch_fills_bounded_cross_axis() {
        let mut col = Flex::column()
            .cross_axis_alignment(CrossAxisAlignment::Stretch)
            .child(SizedBox::from_height(50.0));
        lay_out(&mut col, loose(400.0, 400.0));
        assert_eq!(rects(&col)[0], Rect::new(0.0, 0.0, 400.0, 50.0));
    }

    #[test]
    fn stretch_under_unbounded_cross_uses_widest_child() {
        let mut col = Flex::column()
            .cross_axis_alignment(CrossAxisAlignment::Stretch)
            .child(SizedBox::new(10.0, 10.0))
            .child(SizedBox::from_height(10.0).child(SizedBox::new(60.0, 10.0)));
        let size = lay_out(&mut col, BoxConstraints::expand(None, Some(100.0)));
        assert_eq!(size.width, 60.0);
        assert_eq!(widths(&col), vec![60.0, 60.0]);
    }

    #[test]
    fn flexible_under_unbounded_main_is_fixed() {
        let mut row = Flex::row()
            .child(Flexible::expanded(SizedBox::new(15.0, 5.0)))
            .child(SizedBox::new(10.0, 5.0));
        let size = lay_out(&mut row, BoxConstraints::default());
        assert_eq!(size, Size::new(25.0, 5.0));
    }

    #[test]
    fn overflowing_fixed_children_give_flex_nothing() {
        let mut row = Flex::row()
            .child(SizedBox::from_width(150.0))
            .child(Flexible::expanded(SizedBox::shrink()));
        let size = lay_out(&mut row, loose(100.0, 10.0));
        assert_eq!(size.width, 100.0);
        assert_eq!(widths(&row), vec![150.0, 0.0]);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut row = Flex::row()
            .main_axis_alignment(MainAxisAlignment::SpaceEvenly)
            .child(SizedBox::new(10.0, 10.0))
            .child(Flexible::new(SizedBox::new(30.0, 20.0)).flex(2.0))
            .child(SizedBox::new(15.0, 5.0));
        let a = lay_out(&mut row, loose(300.0, 40.0));
        let first = rects(&row);
        let b = lay_out(&mut row, loose(300.0, 40.0));
        assert_eq!(a, b);
        assert_eq!(first, rects(&row));
    }
}
