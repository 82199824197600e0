//! Integration tests for the folio layout pipeline.
//!
//! These tests drive the public API end to end:
//! - widget trees → layout → recorded paint ops
//! - flex distribution, table widths and pagination on whole trees
//! - layout properties over many random constraints (seeded, deterministic)
//! - JSON → PDF bytes

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use folio::error::{Error, LayoutError};
use folio::geometry::{EdgeInsets, Rect, Size};
use folio::graphics::RecordingGraphics;
use folio::layout::flex::{CrossAxisAlignment, MainAxisAlignment};
use folio::layout::table::TableColumnWidth;
use folio::layout::{BoxConstraints, LayoutContext, LayoutResult, PaintContext, Widget};
use folio::model::{PageFormat, PageSize};
use folio::style::{Color, ThemeData};
use folio::text::MonospaceMeasurement;
use folio::widgets::*;

// ─── Helpers ────────────────────────────────────────────────────

fn layout(widget: &mut dyn Widget, constraints: BoxConstraints) -> LayoutResult {
    let theme = ThemeData::default();
    let ctx = LayoutContext::new(constraints, &theme).with_measurement(&MonospaceMeasurement);
    widget.layout(&ctx).expect("layout failed")
}

fn paint(widget: &dyn Widget, size: Size) -> RecordingGraphics {
    let theme = ThemeData::default();
    let mut g = RecordingGraphics::new();
    {
        let mut ctx = PaintContext::new(size, &theme, &mut g);
        widget.paint(&mut ctx).expect("paint failed");
    }
    assert!(g.is_balanced(), "save/restore must balance");
    g
}

fn block(height: f64) -> Container {
    Container::new().height(height).color(Color::BLACK)
}

fn custom_page(width: f64, height: f64) -> PageFormat {
    PageFormat {
        size: PageSize::Custom { width, height },
        margin: EdgeInsets::ZERO,
    }
}

fn random_constraints(rng: &mut StdRng) -> BoxConstraints {
    let axis = |rng: &mut StdRng| {
        let min: f64 = if rng.gen_bool(0.3) { 0.0 } else { rng.gen_range(0.0..200.0) };
        let max = if rng.gen_bool(0.2) {
            f64::INFINITY
        } else {
            min + rng.gen_range(0.0..300.0)
        };
        (min, max)
    };
    let (min_width, max_width) = axis(rng);
    let (min_height, max_height) = axis(rng);
    BoxConstraints {
        min_width,
        max_width,
        min_height,
        max_height,
    }
}

fn satisfies(c: &BoxConstraints, size: Size) -> bool {
    let eps = 1e-9;
    size.width >= c.min_width - eps
        && size.width <= c.max_width + eps
        && size.height >= c.min_height - eps
        && size.height <= c.max_height + eps
        && size.is_finite()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn pdf_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ─── Flex ───────────────────────────────────────────────────────

#[test]
fn test_column_space_between_with_stretch() {
    let mut column = Flex::column()
        .main_axis_alignment(MainAxisAlignment::SpaceBetween)
        .cross_axis_alignment(CrossAxisAlignment::Stretch)
        .child(SizedBox::from_height(50.0))
        .child(SizedBox::from_height(50.0));
    let result = layout(&mut column, BoxConstraints::tight(Size::new(400.0, 400.0)));

    assert_eq!(result.size, Size::new(400.0, 400.0));
    assert_eq!(
        column.child_rects().unwrap(),
        &[
            Rect::new(0.0, 0.0, 400.0, 50.0),
            Rect::new(0.0, 350.0, 400.0, 50.0)
        ]
    );
}

#[test]
fn test_column_space_between_in_loose_box() {
    let mut column = Flex::column()
        .main_axis_alignment(MainAxisAlignment::SpaceBetween)
        .child(block(50.0))
        .child(block(50.0));
    let result = layout(&mut column, BoxConstraints::loose(Size::new(400.0, 400.0)));

    // Main size Max fills the height; childless containers fill the width.
    assert_eq!(result.size, Size::new(400.0, 400.0));
    let rects = column.child_rects().unwrap();
    assert_eq!(
        rects,
        &[
            Rect::new(0.0, 0.0, 400.0, 50.0),
            Rect::new(0.0, 350.0, 400.0, 50.0)
        ]
    );
    assert_eq!(rects[1].y - rects[0].bottom(), 300.0);

    // Fixed-size children: the cross extent is the widest child and the
    // narrower one is centered within it.
    let mut column = Flex::column()
        .main_axis_alignment(MainAxisAlignment::SpaceBetween)
        .child(SizedBox::new(100.0, 50.0))
        .child(SizedBox::new(60.0, 50.0));
    let result = layout(&mut column, BoxConstraints::loose(Size::new(400.0, 400.0)));
    assert_eq!(result.size, Size::new(100.0, 400.0));
    assert_eq!(
        column.child_rects().unwrap(),
        &[
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(20.0, 350.0, 60.0, 50.0)
        ]
    );
}

#[test]
fn test_row_flex_ratio() {
    let mut row = Flex::row()
        .child(Flexible::expanded(SizedBox::shrink()))
        .child(Flexible::expanded(SizedBox::shrink()).flex(2.0))
        .child(Flexible::expanded(SizedBox::shrink()));
    layout(&mut row, BoxConstraints::tight(Size::new(400.0, 100.0)));

    let rects = row.child_rects().unwrap();
    let widths: Vec<f64> = rects.iter().map(|r| r.width).collect();
    let xs: Vec<f64> = rects.iter().map(|r| r.x).collect();
    assert_eq!(widths, vec![100.0, 200.0, 100.0]);
    assert_eq!(xs, vec![0.0, 100.0, 300.0]);
}

#[test]
fn test_first_child_paints_at_top_in_output_space() {
    let mut column = Flex::column()
        .cross_axis_alignment(CrossAxisAlignment::Stretch)
        .child(block(50.0))
        .child(block(30.0));
    let size = layout(&mut column, BoxConstraints::tight(Size::new(100.0, 400.0))).size;
    let g = paint(&column, size);

    assert_eq!(
        g.fill_bounds(),
        vec![
            Rect::new(0.0, 350.0, 100.0, 50.0),
            Rect::new(0.0, 320.0, 100.0, 30.0)
        ]
    );
}

// ─── Box widgets ────────────────────────────────────────────────

#[test]
fn test_padding_adds_insets_to_child() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let c = random_constraints(&mut rng);
        let insets = EdgeInsets::only(
            rng.gen_range(0.0..20.0),
            rng.gen_range(0.0..20.0),
            rng.gen_range(0.0..20.0),
            rng.gen_range(0.0..20.0),
        );
        let mut padded = Padding::new(insets, SizedBox::shrink());
        let size = layout(&mut padded, c).size;
        let expected = c.constrain(Size::new(insets.horizontal(), insets.vertical()));
        assert!((size.width - expected.width).abs() < 1e-9, "{c:?} {insets:?}");
        assert!((size.height - expected.height).abs() < 1e-9, "{c:?} {insets:?}");
    }
}

fn random_insets(rng: &mut StdRng) -> EdgeInsets {
    EdgeInsets::only(
        rng.gen_range(0.0..20.0),
        rng.gen_range(0.0..20.0),
        rng.gen_range(0.0..20.0),
        rng.gen_range(0.0..20.0),
    )
}

#[test]
fn test_container_insets_never_shrink_the_box() {
    let mut rng = StdRng::seed_from_u64(11);
    for i in 0..300 {
        let c = random_constraints(&mut rng);
        let child = Size::new(rng.gen_range(0.0..150.0), rng.gen_range(0.0..150.0));
        let (margin, padding) = if i % 4 == 0 {
            (EdgeInsets::ZERO, EdgeInsets::ZERO)
        } else {
            (random_insets(&mut rng), random_insets(&mut rng))
        };

        let mut plain = Container::new().child(SizedBox::new(child.width, child.height));
        let mut boxed = Container::new()
            .margin(margin)
            .padding(padding)
            .child(SizedBox::new(child.width, child.height));
        let plain = layout(&mut plain, c).size;
        let boxed = layout(&mut boxed, c).size;

        assert!(satisfies(&c, boxed), "{boxed:?} violates {c:?}");
        assert!(boxed.width >= plain.width - 1e-9, "{c:?} {margin:?} {padding:?}");
        assert!(boxed.height >= plain.height - 1e-9, "{c:?} {margin:?} {padding:?}");
        if margin == EdgeInsets::ZERO && padding == EdgeInsets::ZERO {
            assert_eq!(boxed, plain);
        }

        // Unconstrained, the insets add up exactly and strictly grow the box.
        let mut free = Container::new()
            .margin(margin)
            .padding(padding)
            .child(SizedBox::new(child.width, child.height));
        let size = layout(&mut free, BoxConstraints::default()).size;
        let expected_width = child.width + margin.horizontal() + padding.horizontal();
        let expected_height = child.height + margin.vertical() + padding.vertical();
        assert!((size.width - expected_width).abs() < 1e-9);
        assert!((size.height - expected_height).abs() < 1e-9);
        if margin.horizontal() + padding.horizontal() > 0.0 {
            assert!(size.width > child.width);
        }
    }
}

#[test]
fn test_paint_before_layout_fails() {
    let container = Container::new().child(Text::new("x"));
    let theme = ThemeData::default();
    let mut g = RecordingGraphics::new();
    let mut ctx = PaintContext::new(Size::ZERO, &theme, &mut g);
    assert_eq!(
        container.paint(&mut ctx),
        Err(LayoutError::NotLaidOut("Container"))
    );
}

#[test]
fn test_transform_keeps_graphics_state_balanced() {
    let mut rotated = Transform::rotate(0.5, block(20.0)).unwrap();
    let size = layout(&mut rotated, BoxConstraints::loose(Size::new(40.0, 40.0))).size;
    // paint() asserts balance.
    let g = paint(&rotated, size);
    assert_eq!(g.fill_bounds().len(), 1);
}

// ─── Property checks ────────────────────────────────────────────

fn sample_tree() -> Container {
    Container::new().padding(EdgeInsets::all(4.0)).child(
        Flex::column()
            .child(
                Flex::row()
                    .child(Text::new("hello world"))
                    .child(Flexible::new(SizedBox::from_height(10.0))),
            )
            .child(
                Stack::new()
                    .child(SizedBox::new(30.0, 20.0))
                    .child(Positioned::new(SizedBox::shrink()).left(2.0).top(3.0)),
            )
            .child(Align::new(folio::layout::Alignment::BottomRight, SizedBox::new(5.0, 5.0))),
    )
}

fn report_table() -> Table {
    Table::from_text_array(
        vec![
            vec!["North".into(), 1200.into(), true.into()],
            vec!["South".into(), 37.5.into(), CellValue::Null],
            vec!["East".into(), 0.into(), false.into()],
        ],
        vec!["Region".to_string(), "Units".to_string(), "On target".to_string()],
    )
    .column_widths(vec![
        TableColumnWidth::Flex(2.0),
        TableColumnWidth::Intrinsic(None),
        TableColumnWidth::fraction(0.2).unwrap(),
    ])
}

fn paginated_report() -> MultiPage {
    MultiPage::new(custom_page(300.0, 400.0))
        .footer(PageDecoration::builder(|info| {
            Box::new(Text::new(format!("{} of {}", info.page_number, info.total_pages)))
        }))
        .child(report_table())
        .child(block(150.0))
        .child(BarChart::new(vec![2.0, 5.0, 3.0]))
        .child(block(250.0))
}

fn property_trees() -> Vec<Box<dyn Widget>> {
    vec![
        Box::new(sample_tree()),
        Box::new(report_table()),
        Box::new(BarChart::new(vec![3.0, -1.0, 7.5, 0.0])),
        Box::new(
            Flex::column()
                .child(BarChart::new(vec![1.0, 2.0]))
                .child(report_table()),
        ),
        Box::new(paginated_report()),
    ]
}

#[test]
fn test_layout_satisfies_constraints_and_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let c = random_constraints(&mut rng);
        for mut tree in property_trees() {
            let first = layout(&mut *tree, c);
            let second = layout(&mut *tree, c);
            assert_eq!(first, second, "{} relayout changed for {c:?}", tree.name());
            assert!(
                satisfies(&c, first.size),
                "{}: {:?} violates {c:?}",
                tree.name(),
                first.size
            );
        }
    }
}

#[test]
fn test_paginated_report_is_stable_across_layouts() {
    let mut doc = paginated_report();
    layout(&mut doc, BoxConstraints::default());
    let chunks = doc.chunks().unwrap().to_vec();
    layout(&mut doc, BoxConstraints::default());
    assert_eq!(doc.chunks().unwrap(), chunks.as_slice());
    assert!(doc.page_count() >= 2);
}

#[test]
fn test_invalid_constraints_are_rejected() {
    let bad = BoxConstraints {
        min_width: 10.0,
        max_width: 5.0,
        min_height: 0.0,
        max_height: 5.0,
    };
    let theme = ThemeData::default();
    let mut tree = sample_tree();
    let err = tree.layout(&LayoutContext::new(bad, &theme)).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidConstraints { .. }));
}

// ─── Tables ─────────────────────────────────────────────────────

#[test]
fn test_table_widths_fill_available_width() {
    let mut table = Table::new()
        .column_widths(vec![
            TableColumnWidth::Flex(1.0),
            TableColumnWidth::Flex(2.0),
            TableColumnWidth::Fixed(50.0),
        ])
        .row(
            TableRow::new(Vec::new())
                .cell(Text::new("a"))
                .cell(Text::new("b"))
                .cell(Text::new("c")),
        );
    layout(&mut table, BoxConstraints::loose(Size::new(350.0, 500.0)));

    let widths = table.resolved_widths().unwrap();
    assert_eq!(widths, &[100.0, 200.0, 50.0]);
    assert!((widths.iter().sum::<f64>() - 350.0).abs() < 1e-9);
}

#[test]
fn test_from_text_array_marks_header_repeated() {
    let table = Table::from_text_array(
        vec![
            vec!["Apples".into(), 3.into()],
            vec!["Pears".into(), CellValue::Null],
        ],
        vec!["Fruit".to_string(), "Qty".to_string()],
    );
    assert_eq!(table.row_count(), 3);
    assert!(table.rows()[0].is_repeated());
    assert!(!table.rows()[1].is_repeated());
}

#[test]
fn test_table_rows_truncate_to_height() {
    let mut table = Table::new().with_rows(
        (0..10)
            .map(|_| TableRow::new(Vec::new()).cell(SizedBox::from_height(20.0)))
            .collect(),
    );
    let size = layout(&mut table, BoxConstraints::loose(Size::new(100.0, 65.0))).size;
    let visible = table.visible_rows().unwrap();
    assert_eq!((visible.first_row, visible.last_row), (0, 2));
    assert!(size.height <= 65.0);
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_multi_page_splits_content() {
    let mut doc = MultiPage::new(custom_page(300.0, 500.0))
        .child(block(200.0))
        .child(block(200.0))
        .child(block(200.0))
        .child(block(200.0))
        .child(block(200.0));
    layout(&mut doc, BoxConstraints::default());

    let chunks = doc.chunks().unwrap();
    let ranges: Vec<_> = chunks.iter().map(|c| c.widgets.clone()).collect();
    assert_eq!(ranges, vec![0..2, 2..4, 4..5]);
    let pages: Vec<_> = chunks.iter().map(|c| c.page_number).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!((chunks[1].start_offset, chunks[1].end_offset), (400.0, 800.0));
}

#[test]
fn test_multi_page_without_sink_renders_first_page_only() {
    let mut doc = MultiPage::new(custom_page(300.0, 500.0))
        .child(block(200.0))
        .child(block(200.0))
        .child(block(200.0));
    let size = layout(&mut doc, BoxConstraints::default()).size;
    assert_eq!(doc.page_count(), 2);

    let g = paint(&doc, size);
    assert_eq!(g.fill_bounds().len(), 2);
}

#[test]
fn test_multi_page_respects_max_pages() {
    let mut doc = MultiPage::new(custom_page(300.0, 100.0))
        .options(MultiPageOptions {
            max_pages: 2,
            ..MultiPageOptions::default()
        })
        .with_children((0..6).map(|_| -> Box<dyn Widget> { Box::new(block(100.0)) }).collect());
    layout(&mut doc, BoxConstraints::default());
    assert_eq!(doc.page_count(), 2);
    assert!(doc.pagination().unwrap().is_truncated());
}

#[test]
fn test_oversized_block_gets_its_own_page() {
    let mut doc = MultiPage::new(custom_page(300.0, 100.0))
        .child(block(50.0))
        .child(block(250.0))
        .child(block(50.0));
    layout(&mut doc, BoxConstraints::default());
    let ranges: Vec<_> = doc.chunks().unwrap().iter().map(|c| c.widgets.clone()).collect();
    assert_eq!(ranges, vec![0..1, 1..2, 2..3]);
    assert_eq!(doc.pagination().unwrap().oversized, vec![1]);
}

// ─── JSON → PDF ─────────────────────────────────────────────────

const REPORT: &str = r##"{
  "metadata": { "title": "Report" },
  "page": { "size": "A5" },
  "footer": { "type": "Center", "child": { "type": "Text", "text": "{{pageNumber}}/{{totalPages}}" } },
  "children": [
    { "type": "Text", "text": "Heading", "style": { "fontSize": 20, "fontWeight": "Bold" } },
    { "type": "Row", "children": [
      { "type": "Expanded", "child": { "type": "Container", "height": 40, "color": "#336699" } },
      { "type": "SizedBox", "width": 10 },
      { "type": "Expanded", "child": { "type": "Chart", "values": [1, 3, 2] } }
    ] },
    { "type": "Table", "headers": ["A", "B"], "rows": [["x", 1], ["y", true], ["z", null]] }
  ]
}"##;

#[test]
fn test_json_to_pdf() {
    let bytes = folio::render_json(REPORT).unwrap();
    assert_valid_pdf(&bytes);
    let text = pdf_text(&bytes);
    assert!(text.contains("/Count 1"));
    assert!(text.contains("/Title (Report)"));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
}

#[test]
fn test_json_overflow_creates_pages() {
    let children: Vec<String> = (0..60)
        .map(|i| format!(r#"{{ "type": "SizedBox", "height": 40, "child": {{ "type": "Text", "text": "Row {i}" }} }}"#))
        .collect();
    let json = format!(
        r#"{{ "page": {{ "size": "Letter" }}, "children": [{}] }}"#,
        children.join(",")
    );
    let bytes = folio::render_json(&json).unwrap();
    assert_valid_pdf(&bytes);
    // 684pt of content per Letter page fits 17 rows of 40pt.
    assert!(pdf_text(&bytes).contains("/Count 4"));
}

#[test]
fn test_invalid_json_reports_hint() {
    let err = folio::render_json(r#"{ "children": [ }"#).unwrap_err();
    match err {
        Error::Parse { hint, .. } => assert!(!hint.is_empty()),
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn test_bad_font_data_is_a_font_error() {
    let json = r#"{ "fonts": [{ "family": "Broken", "src": "AAAA" }], "children": [] }"#;
    assert!(matches!(folio::render_json(json), Err(Error::Font(_))));
}
