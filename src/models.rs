//! Data models for the nominee streamgraph.
//!
//! This module contains the core data structures used throughout the
//! application: canonical groups, the raw-label lookup table, parsed
//! nominee records, per-year summaries and the report envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Canonical ethnic-background group.
///
/// The order of the variants is the fixed group order; the first variant is
/// the default group that absorbs unrecognized raw labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    /// Caucasian or another background (default group)
    Caucasian,
    /// Afro-descendant
    Afrodescendant,
    /// Hispanic
    Hispanic,
    /// Asian
    Asian,
}

impl GroupKey {
    /// All groups in their fixed order.
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Caucasian,
        GroupKey::Afrodescendant,
        GroupKey::Hispanic,
        GroupKey::Asian,
    ];

    /// Position of the group in [`GroupKey::ALL`].
    pub fn index(self) -> usize {
        match self {
            GroupKey::Caucasian => 0,
            GroupKey::Afrodescendant => 1,
            GroupKey::Hispanic => 2,
            GroupKey::Asian => 3,
        }
    }

    /// Column name used for this group in summary tables.
    pub fn field_name(self) -> &'static str {
        match self {
            GroupKey::Caucasian => "nominees_caucasian",
            GroupKey::Afrodescendant => "nominees_afrodescendant",
            GroupKey::Hispanic => "nominees_hispanic",
            GroupKey::Asian => "nominees_asian",
        }
    }

    /// Built-in display label.
    pub fn default_label(self) -> &'static str {
        match self {
            GroupKey::Caucasian => "Caucasian or another",
            GroupKey::Afrodescendant => "Afro-descendant",
            GroupKey::Hispanic => "Hispanic",
            GroupKey::Asian => "Asian",
        }
    }

    /// Built-in swatch color.
    pub fn default_color(self) -> &'static str {
        match self {
            GroupKey::Caucasian => "#BFD3C1",
            GroupKey::Afrodescendant => "#68A691",
            GroupKey::Hispanic => "#EFC7C2",
            GroupKey::Asian => "#694F5D",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Caucasian => write!(f, "caucasian"),
            GroupKey::Afrodescendant => write!(f, "afrodescendant"),
            GroupKey::Hispanic => write!(f, "hispanic"),
            GroupKey::Asian => write!(f, "asian"),
        }
    }
}

/// A display group: canonical key plus presentation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Canonical key.
    pub key: GroupKey,
    /// Legend label.
    pub label: String,
    /// Swatch color (presentation only).
    pub color: String,
}

impl Group {
    /// The four groups with their built-in labels and colors.
    pub fn defaults() -> Vec<Group> {
        GroupKey::ALL
            .iter()
            .map(|&key| Group {
                key,
                label: key.default_label().to_string(),
                color: key.default_color().to_string(),
            })
            .collect()
    }
}

/// Immutable lookup from raw ethnic-background labels to canonical groups.
///
/// Built once at startup and passed explicitly to ingest and aggregation.
/// Labels absent from the table resolve to the default group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    entries: HashMap<String, GroupKey>,
    default: GroupKey,
}

impl LabelMap {
    /// Build a table from `(raw label, group)` pairs. Raw labels are trimmed.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, GroupKey)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(raw, key)| (raw.as_ref().trim().to_string(), key))
                .collect(),
            default: GroupKey::ALL[0],
        }
    }

    /// Resolve a raw label. Never fails: unknown labels fall back to the
    /// default group.
    pub fn resolve(&self, raw: &str) -> GroupKey {
        self.entries
            .get(raw.trim())
            .copied()
            .unwrap_or(self.default)
    }

    /// Whether the raw label has an explicit entry.
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw.trim())
    }

    /// The fallback group.
    pub fn default_group(&self) -> GroupKey {
        self.default
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new([
            ("", GroupKey::Caucasian),
            ("black", GroupKey::Afrodescendant),
            ("hispanic", GroupKey::Hispanic),
            ("asian", GroupKey::Asian),
        ])
    }
}

impl From<&BTreeMap<String, GroupKey>> for LabelMap {
    fn from(table: &BTreeMap<String, GroupKey>) -> Self {
        Self::new(table.iter().map(|(raw, key)| (raw.as_str(), *key)))
    }
}

/// One nominee row, parsed and resolved at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomineeRecord {
    /// Ceremony year.
    pub year: i32,
    /// Canonical group the raw label resolved to.
    pub group: GroupKey,
    /// The raw ethnic-background label as it appeared in the source.
    pub raw_label: String,
}

impl NomineeRecord {
    /// Parse-free constructor resolving `raw_label` through `labels`.
    pub fn new(year: i32, raw_label: &str, labels: &LabelMap) -> Self {
        Self {
            year,
            group: labels.resolve(raw_label),
            raw_label: raw_label.trim().to_string(),
        }
    }
}

/// Nominee counts for one ceremony year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearSummary {
    /// Ceremony year.
    pub year: i32,
    /// Sum of all group counts.
    pub nominees_total: u32,
    pub nominees_caucasian: u32,
    pub nominees_afrodescendant: u32,
    pub nominees_hispanic: u32,
    pub nominees_asian: u32,
}

impl YearSummary {
    /// An empty summary for `year`.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            nominees_total: 0,
            nominees_caucasian: 0,
            nominees_afrodescendant: 0,
            nominees_hispanic: 0,
            nominees_asian: 0,
        }
    }

    /// Count one nominee in `group`, keeping the total in step.
    pub fn record(&mut self, group: GroupKey) {
        *self.count_mut(group) += 1;
        self.nominees_total += 1;
    }

    /// Count for a single group.
    pub fn count(&self, group: GroupKey) -> u32 {
        match group {
            GroupKey::Caucasian => self.nominees_caucasian,
            GroupKey::Afrodescendant => self.nominees_afrodescendant,
            GroupKey::Hispanic => self.nominees_hispanic,
            GroupKey::Asian => self.nominees_asian,
        }
    }

    /// Counts in [`GroupKey::ALL`] order.
    pub fn counts(&self) -> [u32; 4] {
        GroupKey::ALL.map(|key| self.count(key))
    }

    /// Whether the total equals the sum of the group counts.
    pub fn is_consistent(&self) -> bool {
        self.counts().iter().sum::<u32>() == self.nominees_total
    }

    fn count_mut(&mut self, group: GroupKey) -> &mut u32 {
        match group {
            GroupKey::Caucasian => &mut self.nominees_caucasian,
            GroupKey::Afrodescendant => &mut self.nominees_afrodescendant,
            GroupKey::Hispanic => &mut self.nominees_hispanic,
            GroupKey::Asian => &mut self.nominees_asian,
        }
    }
}

/// Grand total for one group across all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: GroupKey,
    pub count: u64,
    /// Fraction of all nominees (0.0 when there are none).
    pub share: f64,
}

/// Statistics over a full summary sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NomineeTotals {
    /// Total number of nominees.
    pub total: u64,
    /// Per-group totals in fixed group order.
    pub by_group: Vec<GroupTotal>,
    /// Number of distinct years.
    pub years: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Year with the most nominees (earliest on ties).
    pub peak_year: Option<i32>,
    pub peak_total: u32,
}

impl NomineeTotals {
    /// Compute totals from per-year summaries.
    pub fn from_summaries(summaries: &[YearSummary]) -> Self {
        let mut counts = [0u64; 4];
        let mut peak: Option<&YearSummary> = None;

        for summary in summaries {
            for (slot, count) in counts.iter_mut().zip(summary.counts()) {
                *slot += u64::from(count);
            }
            let better = match peak {
                None => true,
                Some(p) => {
                    summary.nominees_total > p.nominees_total
                        || (summary.nominees_total == p.nominees_total && summary.year < p.year)
                }
            };
            if better {
                peak = Some(summary);
            }
        }

        let total: u64 = counts.iter().sum();
        let by_group = GroupKey::ALL
            .iter()
            .map(|&key| {
                let count = counts[key.index()];
                GroupTotal {
                    key,
                    count,
                    share: if total == 0 {
                        0.0
                    } else {
                        count as f64 / total as f64
                    },
                }
            })
            .collect();

        Self {
            total,
            by_group,
            years: summaries.len(),
            first_year: summaries.iter().map(|s| s.year).min(),
            last_year: summaries.iter().map(|s| s.year).max(),
            peak_year: peak.map(|p| p.year),
            peak_total: peak.map(|p| p.nominees_total).unwrap_or(0),
        }
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path or URL the dataset was read from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Data rows read from the source.
    pub rows_read: usize,
    /// Rows dropped by the invalid-year policy.
    pub rows_skipped: usize,
    /// Distinct raw labels that fell back to the default group.
    pub unmapped_labels: Vec<String>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete aggregation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Display groups used for labels.
    pub groups: Vec<Group>,
    /// Per-year summaries, ascending by year.
    pub summaries: Vec<YearSummary>,
    pub totals: NomineeTotals,
}

impl Report {
    /// Assemble a report, computing totals from the summaries.
    pub fn new(metadata: ReportMetadata, groups: Vec<Group>, summaries: Vec<YearSummary>) -> Self {
        let totals = NomineeTotals::from_summaries(&summaries);
        Self {
            metadata,
            groups,
            summaries,
            totals,
        }
    }

    /// Display label for a group, falling back to the built-in label.
    pub fn label(&self, key: GroupKey) -> &str {
        self.groups
            .iter()
            .find(|g| g.key == key)
            .map(|g| g.label.as_str())
            .unwrap_or_else(|| key.default_label())
    }
}
