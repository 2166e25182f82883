//! # Pagewright CLI
//!
//! Usage:
//!   pagewright input.json -o output.pdf
//!   echo '{ ... }' | pagewright -o output.pdf
//!   pagewright input.json --layout-json > layout.json
//!   pagewright --example > sample.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use pagewright::pdf::PdfWriter;
use pagewright::{Document, LayoutConfig, LayoutEngine, LayoutResult, PagewrightError};

#[derive(Parser)]
#[command(name = "pagewright")]
#[command(version)]
#[command(about = "Lay out paragraphs, lists, tables and images onto pages", long_about = None)]
struct Cli {
    /// Document JSON (reads stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, value_name = "FILE", default_value = "output.pdf")]
    output: PathBuf,

    /// Layout configuration JSON (page size, margins, table styling)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the positioned items as JSON instead of writing a PDF
    #[arg(long)]
    layout_json: bool,

    /// Print a sample document and exit
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_document_json());
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PagewrightError> {
    let input = read_input(cli.input.as_deref())?;
    let document: Document = serde_json::from_str(&input)?;

    let config = match &cli.config {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(config.clone())?;
    let layout = engine.layout(&document.blocks)?;

    if cli.layout_json {
        println!("{}", layout_to_json(&layout)?);
        return Ok(());
    }

    let pdf_bytes = PdfWriter::new().write(&layout, &document, &config);
    fs::write(&cli.output, &pdf_bytes)?;
    eprintln!(
        "✓ Written {} bytes ({} page(s)) to {}",
        pdf_bytes.len(),
        layout.page_count,
        cli.output.display()
    );
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, PagewrightError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn layout_to_json(layout: &LayoutResult) -> Result<String, PagewrightError> {
    Ok(serde_json::to_string_pretty(layout)?)
}

fn example_document_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Quarterly Report",
    "author": "Pagewright"
  },
  "blocks": [
    {
      "type": "paragraph",
      "style": "heading1",
      "runs": [{ "type": "text", "text": "Quarterly Report" }]
    },
    {
      "type": "paragraph",
      "spacing": { "before": 0, "after": 240 },
      "runs": [
        { "type": "text", "text": "Revenue grew in every region this quarter. " },
        { "type": "text", "text": "Details follow.", "italic": true }
      ]
    },
    {
      "type": "paragraph",
      "style": "heading2",
      "runs": [{ "type": "text", "text": "Highlights" }]
    },
    {
      "type": "paragraph",
      "list": { "kind": "bullet", "level": 0 },
      "runs": [{ "type": "text", "text": "New office opened", "bold": true }]
    },
    {
      "type": "paragraph",
      "list": { "kind": "bullet", "level": 1 },
      "runs": [{ "type": "text", "text": "Forty new hires", "color": "1F4E79" }]
    },
    {
      "type": "paragraph",
      "alignment": "center",
      "runs": [{ "type": "text", "text": "Summary", "underline": true, "fontSize": 16 }]
    },
    {
      "type": "table",
      "rows": [
        {
          "cells": [
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "Region", "bold": true }] }] },
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "Revenue", "bold": true }] }] }
          ]
        },
        {
          "cells": [
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "North" }] }] },
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "1,200" }] }] }
          ]
        },
        {
          "cells": [
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "South" }] }] },
            { "paragraphs": [{ "runs": [{ "type": "text", "text": "980" }] }] }
          ]
        }
      ]
    }
  ]
}
"##
}
