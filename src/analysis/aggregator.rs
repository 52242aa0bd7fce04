//! Year × group aggregation.
//!
//! This module rolls nominee records up into one [`YearSummary`] per
//! ceremony year and provides lookups and text views over the result.

use crate::models::{Group, GroupKey, LabelMap, NomineeRecord, NomineeTotals, YearSummary};
use std::collections::BTreeMap;

/// Count resolved records per year and group.
///
/// Output is ascending by year with exactly one entry per distinct input
/// year, whatever the input order.
pub fn aggregate(records: &[NomineeRecord]) -> Vec<YearSummary> {
    rollup(records.iter().map(|r| (r.year, r.group)))
}

/// Count `(year, raw label)` pairs, resolving each label through `labels`.
///
/// Unknown labels land in the table's default group.
pub fn aggregate_raw<'a, I>(rows: I, labels: &LabelMap) -> Vec<YearSummary>
where
    I: IntoIterator<Item = (i32, &'a str)>,
{
    rollup(
        rows.into_iter()
            .map(|(year, raw)| (year, labels.resolve(raw))),
    )
}

fn rollup(pairs: impl Iterator<Item = (i32, GroupKey)>) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, YearSummary> = BTreeMap::new();
    for (year, group) in pairs {
        by_year
            .entry(year)
            .or_insert_with(|| YearSummary::new(year))
            .record(group);
    }
    let summaries: Vec<YearSummary> = by_year.into_values().collect();
    debug_assert!(summaries.iter().all(YearSummary::is_consistent));
    summaries
}

/// Summary for the year closest to `year`. Halfway points round up to the
/// later year.
pub fn nearest_summary(summaries: &[YearSummary], year: f64) -> Option<&YearSummary> {
    summaries.iter().min_by(|a, b| {
        let da = (f64::from(a.year) - year).abs();
        let db = (f64::from(b.year) - year).abs();
        da.total_cmp(&db).then(b.year.cmp(&a.year))
    })
}

/// Multi-line breakdown of one year, one group per line.
pub fn format_breakdown(summary: &YearSummary, groups: &[Group]) -> String {
    let mut lines = vec![format!(
        "{}: {} nominees",
        summary.year, summary.nominees_total
    )];
    for group in groups {
        lines.push(format!("  {}: {}", group.label, summary.count(group.key)));
    }
    lines.join("\n")
}

/// Fixed-width table of all summaries, for terminal output.
pub fn format_table(summaries: &[YearSummary], groups: &[Group]) -> String {
    let width = groups
        .iter()
        .map(|g| g.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    let mut header = format!("{:>6}  {:>6}", "Year", "Total");
    for group in groups {
        header.push_str(&format!("  {:>width$}", group.label, width = width));
    }

    let mut lines = vec![header];
    for summary in summaries {
        let mut row = format!("{:>6}  {:>6}", summary.year, summary.nominees_total);
        for group in groups {
            row.push_str(&format!(
                "  {:>width$}",
                summary.count(group.key),
                width = width
            ));
        }
        lines.push(row);
    }
    lines.join("\n")
}

/// Short text summary of the statistics.
pub fn generate_summary_text(totals: &NomineeTotals, groups: &[Group]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Total nominees: {}", totals.total));
    match (totals.first_year, totals.last_year) {
        (Some(first), Some(last)) => {
            lines.push(format!("Years: {} ({} to {})", totals.years, first, last))
        }
        _ => lines.push("Years: 0".to_string()),
    }
    if let Some(peak) = totals.peak_year {
        lines.push(format!("Peak year: {} ({} nominees)", peak, totals.peak_total));
    }

    for group in groups {
        if let Some(total) = totals.by_group.iter().find(|t| t.key == group.key) {
            lines.push(format!(
                "- {}: {} ({:.1}%)",
                group.label,
                total.count,
                total.share * 100.0
            ));
        }
    }

    lines.join("\n")
}
