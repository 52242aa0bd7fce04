//! Report generation.
//!
//! This module renders the aggregated table as Markdown, JSON or CSV and
//! writes output files.

use crate::models::{GroupKey, NomineeTotals, Report, ReportMetadata, YearSummary};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, include_years: bool) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Academy Award Nominees by Ethnic Background\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_totals_section(report, &report.totals));

    if include_years {
        output.push_str(&generate_years_section(report, &report.summaries));
    }

    output.push_str(&generate_unmapped_section(&report.metadata.unmapped_labels));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Read:** {}\n", metadata.rows_read));
    if metadata.rows_skipped > 0 {
        section.push_str(&format!("- **Rows Skipped:** {}\n", metadata.rows_skipped));
    }
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the totals section.
fn generate_totals_section(report: &Report, totals: &NomineeTotals) -> String {
    let mut section = String::new();

    section.push_str("## Totals\n\n");

    if totals.years == 0 {
        section.push_str("No nominees found.\n\n");
        return section;
    }

    if let (Some(first), Some(last)) = (totals.first_year, totals.last_year) {
        section.push_str(&format!(
            "{} nominees across {} ceremony years ({} to {}).\n\n",
            totals.total, totals.years, first, last
        ));
    }

    section.push_str("| Group | Nominees | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for group_total in &totals.by_group {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            report.label(group_total.key),
            group_total.count,
            group_total.share * 100.0
        ));
    }
    section.push_str(&format!("| **Total** | **{}** | 100.0% |\n\n", totals.total));

    if let Some(peak) = totals.peak_year {
        section.push_str(&format!(
            "Peak year: **{}** with {} nominees.\n\n",
            peak, totals.peak_total
        ));
    }

    section
}

/// Generate the per-year table.
fn generate_years_section(report: &Report, summaries: &[YearSummary]) -> String {
    if summaries.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## By Year\n\n");
    section.push_str("| Year | Total |");
    for group in &report.groups {
        section.push_str(&format!(" {} |", group.label));
    }
    section.push('\n');
    section.push_str("|:---|---:|");
    for _ in &report.groups {
        section.push_str("---:|");
    }
    section.push('\n');

    for summary in summaries {
        section.push_str(&format!("| {} | {} |", summary.year, summary.nominees_total));
        for group in &report.groups {
            section.push_str(&format!(" {} |", summary.count(group.key)));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// List raw labels that fell back to the default group.
fn generate_unmapped_section(labels: &[String]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Unmapped Labels\n\n");
    section.push_str("These ethnic background values had no mapping and were counted in the default group:\n\n");
    for label in labels {
        if label.is_empty() {
            section.push_str("- *(empty)*\n");
        } else {
            section.push_str(&format!("- `{}`\n", label));
        }
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by oscars-streamgraph v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a CSV table with one row per year.
///
/// Columns are `year`, `nominees_total` and one `nominees_<group>` column
/// per group in fixed group order.
pub fn generate_csv_report(summaries: &[YearSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["year", "nominees_total"];
    header.extend(GroupKey::ALL.iter().map(|key| key.field_name()));
    writer.write_record(&header)?;

    for summary in summaries {
        let mut row = vec![summary.year.to_string(), summary.nominees_total.to_string()];
        row.extend(summary.counts().iter().map(|count| count.to_string()));
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV report: {}", e))?;
    String::from_utf8(bytes).context("CSV report is not valid UTF-8")
}

/// Write `content` to `path` atomically.
///
/// The data goes to a temporary file in the same directory first, which is
/// then renamed over `path`.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}
