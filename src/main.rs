//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o output.pdf
//!   echo '{ ... }' | folio -o output.pdf
//!   folio --example > report.json
//!
//! `RUST_LOG=folio=debug` shows layout diagnostics on stderr.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), folio::Error> {
    let input = match args.get(1) {
        Some(path) if !path.starts_with('-') => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let pdf_bytes = folio::render_json(&input)?;
    fs::write(&output_path, &pdf_bytes)?;
    eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Quarterly Report",
    "author": "Folio"
  },
  "page": {
    "size": "A4",
    "margin": { "top": 54, "right": 54, "bottom": 54, "left": 54 }
  },
  "header": {
    "type": "Row",
    "mainAxisAlignment": "SpaceBetween",
    "children": [
      { "type": "Text", "text": "ACME Corp", "style": { "fontSize": 9, "fontWeight": "Bold" } },
      { "type": "Text", "text": "Q3 2026", "style": { "fontSize": 9 } }
    ]
  },
  "footer": {
    "type": "Center",
    "child": { "type": "Text", "text": "Page {{pageNumber}} of {{totalPages}}", "style": { "fontSize": 8 } }
  },
  "children": [
    {
      "type": "Container",
      "padding": { "bottom": 16 },
      "child": {
        "type": "Text",
        "text": "Quarterly Report",
        "style": { "fontSize": 28, "fontWeight": "Bold", "color": { "r": 0.1, "g": 0.1, "b": 0.15 } }
      }
    },
    {
      "type": "Row",
      "spacing": 12,
      "crossAxisAlignment": "Start",
      "children": [
        {
          "type": "Expanded",
          "flex": 2,
          "child": {
            "type": "Text",
            "text": "Revenue grew across every region this quarter. The table below lists the totals per region; the chart to the right shows the month-by-month trend.",
            "style": { "fontSize": 10, "lineSpacing": 1.4 }
          }
        },
        {
          "type": "Expanded",
          "child": {
            "type": "SizedBox",
            "height": 80,
            "child": { "type": "Chart", "values": [12, 18, 15, 22], "barColor": "#3366cc" }
          }
        }
      ]
    },
    { "type": "SizedBox", "height": 24 },
    {
      "type": "Table",
      "headers": ["Region", "Units", "Revenue", "On target"],
      "columnWidths": [{ "flex": 2 }, "intrinsic", "intrinsic", "intrinsic"],
      "rows": [
        ["North", 1200, 48000.5, true],
        ["South", 950, 37250, true],
        ["East", 430, 17100, false],
        ["West", null, 0, false]
      ]
    },
    { "type": "SizedBox", "height": 24 },
    {
      "type": "Container",
      "padding": { "top": 8, "right": 8, "bottom": 8, "left": 8 },
      "color": "#f4f4f8",
      "child": {
        "type": "Text",
        "text": "Figures are unaudited and may change before the annual report.",
        "style": { "fontSize": 9, "color": { "r": 0.35, "g": 0.35, "b": 0.4 } }
      }
    }
  ]
}"##
}
