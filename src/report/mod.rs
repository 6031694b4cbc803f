//! Report Output
//!
//! Renders a finished scan either as one line per finding or as a single
//! JSON document for tools.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::analysis::ScanReport;

/// How a report is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `file:line signature`, one finding per line
    #[default]
    Text,
    /// Findings plus scan totals as JSON
    Json,
}

/// Text rendering: discovery order, newline-terminated
pub fn render_text(report: &ScanReport) -> String {
    let mut output = String::new();
    for finding in &report.findings {
        output.push_str(&finding.to_string());
        output.push('\n');
    }
    output
}

pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Write `report` to `out` in the requested format
pub fn write_report(format: OutputFormat, report: &ScanReport, out: &mut impl Write) -> io::Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report).map_err(io::Error::from)?,
    };
    out.write_all(rendered.as_bytes())?;
    out.flush()
}
