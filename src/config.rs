//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.streamgraph.toml` files.

use crate::chart::{Palette, StackOffset, StackOrder};
use crate::cli::ReportFormat;
use crate::ingest::YearPolicy;
use crate::models::{Group, GroupKey, LabelMap};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".streamgraph.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Raw ethnic-background label to canonical group.
    #[serde(default = "default_labels")]
    pub labels: BTreeMap<String, GroupKey>,

    /// Legend labels and colors.
    #[serde(default)]
    pub groups: GroupsConfig,

    /// Chart layout and stacking.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            input: InputConfig::default(),
            labels: default_labels(),
            groups: GroupsConfig::default(),
            chart: ChartConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

fn default_labels() -> BTreeMap<String, GroupKey> {
    [
        ("", GroupKey::Caucasian),
        ("black", GroupKey::Afrodescendant),
        ("hispanic", GroupKey::Hispanic),
        ("asian", GroupKey::Asian),
    ]
    .into_iter()
    .map(|(raw, key)| (raw.to_string(), key))
    .collect()
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default SVG output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "streamgraph.svg".to_string()
}

/// Dataset location and CSV layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Local path or http(s) URL of the CSV file.
    #[serde(default = "default_source")]
    pub source: String,

    /// Header of the ceremony year column.
    #[serde(default = "default_year_column")]
    pub year_column: String,

    /// Header of the ethnic background column.
    #[serde(default = "default_ethnicity_column")]
    pub ethnicity_column: String,

    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// What to do with rows whose year is not an integer.
    #[serde(default)]
    pub on_invalid_year: YearPolicy,

    /// Timeout for remote sources in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            year_column: default_year_column(),
            ethnicity_column: default_ethnicity_column(),
            delimiter: default_delimiter(),
            on_invalid_year: YearPolicy::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_source() -> String {
    "data/academy_awards_nominees.csv".to_string()
}

fn default_year_column() -> String {
    "year".to_string()
}

fn default_ethnicity_column() -> String {
    "ethnic_background".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_timeout() -> u64 {
    30
}

/// Optional label/color override for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl GroupStyle {
    fn builtin(key: GroupKey) -> Self {
        Self {
            label: Some(key.default_label().to_string()),
            color: Some(key.default_color().to_string()),
        }
    }
}

/// Presentation settings for the four groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    pub caucasian: GroupStyle,
    pub afrodescendant: GroupStyle,
    pub hispanic: GroupStyle,
    pub asian: GroupStyle,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            caucasian: GroupStyle::builtin(GroupKey::Caucasian),
            afrodescendant: GroupStyle::builtin(GroupKey::Afrodescendant),
            hispanic: GroupStyle::builtin(GroupKey::Hispanic),
            asian: GroupStyle::builtin(GroupKey::Asian),
        }
    }
}

impl GroupsConfig {
    fn style(&self, key: GroupKey) -> &GroupStyle {
        match key {
            GroupKey::Caucasian => &self.caucasian,
            GroupKey::Afrodescendant => &self.afrodescendant,
            GroupKey::Hispanic => &self.hispanic,
            GroupKey::Asian => &self.asian,
        }
    }
}

/// Chart margins in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 100.0,
            right: 20.0,
            bottom: 50.0,
            left: 50.0,
        }
    }
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default)]
    pub margin: Margins,

    /// Catmull-Rom parameter (0 uniform, 0.5 centripetal, 1 chordal).
    #[serde(default = "default_curve_alpha")]
    pub curve_alpha: f64,

    #[serde(default)]
    pub order: StackOrder,

    #[serde(default)]
    pub offset: StackOffset,

    #[serde(default)]
    pub palette: Palette,

    /// Rotated label on the vertical axis.
    #[serde(default = "default_y_label")]
    pub y_label: String,

    /// Approximate tick count on each axis.
    #[serde(default = "default_ticks")]
    pub ticks: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin: Margins::default(),
            curve_alpha: default_curve_alpha(),
            order: StackOrder::default(),
            offset: StackOffset::default(),
            palette: Palette::default(),
            y_label: default_y_label(),
            ticks: default_ticks(),
        }
    }
}

fn default_width() -> f64 {
    1160.0
}

fn default_height() -> f64 {
    600.0
}

fn default_curve_alpha() -> f64 {
    0.5
}

fn default_y_label() -> String {
    "Number of nominees".to_string()
}

fn default_ticks() -> usize {
    10
}

/// Upper bound on `ticks`; each axis allocates one entry per tick.
const MAX_TICKS: usize = 100;

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report format when --format is not given.
    #[serde(default)]
    pub format: ReportFormat,

    /// Include the per-year table in Markdown reports.
    #[serde(default = "default_true")]
    pub include_years: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            include_years: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.source = input.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if args.skip_invalid_years {
            self.input.on_invalid_year = YearPolicy::Skip;
        }
        if let Some(timeout) = args.timeout {
            self.input.timeout_seconds = timeout;
        }

        // Chart settings
        if let Some(order) = args.order {
            self.chart.order = order;
        }
        if let Some(offset) = args.offset {
            self.chart.offset = offset;
        }
        if let Some(palette) = args.palette {
            self.chart.palette = palette;
        }
        if let Some(width) = args.width {
            self.chart.width = width;
        }
        if let Some(height) = args.height {
            self.chart.height = height;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        let chart = &self.chart;
        if chart.width <= chart.margin.left + chart.margin.right {
            anyhow::bail!("Chart width must exceed the left and right margins");
        }
        if chart.height <= chart.margin.top + chart.margin.bottom {
            anyhow::bail!("Chart height must exceed the top and bottom margins");
        }
        if !(0.0..=1.0).contains(&chart.curve_alpha) {
            anyhow::bail!("curve_alpha must be between 0.0 and 1.0");
        }
        if chart.ticks == 0 {
            anyhow::bail!("ticks must be at least 1");
        }
        if chart.ticks > MAX_TICKS {
            anyhow::bail!("ticks must be at most {}", MAX_TICKS);
        }
        if !self.input.delimiter.is_ascii() {
            anyhow::bail!("CSV delimiter must be a single ASCII character");
        }
        if self.input.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// The raw-label lookup table.
    pub fn label_map(&self) -> LabelMap {
        LabelMap::from(&self.labels)
    }

    /// Display groups with overrides applied.
    pub fn groups(&self) -> Vec<Group> {
        let mut groups = Group::defaults();
        for group in &mut groups {
            let style = self.groups.style(group.key);
            if let Some(ref label) = style.label {
                group.label = label.clone();
            }
            if let Some(ref color) = style.color {
                group.color = color.clone();
            }
        }
        groups
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "streamgraph.svg");
        assert_eq!(config.input.year_column, "year");
        assert_eq!(config.input.on_invalid_year, YearPolicy::Fail);
        assert_eq!(config.chart.width, 1160.0);
        assert_eq!(config.chart.order, StackOrder::Ascending);
        assert_eq!(config.chart.offset, StackOffset::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[general]
output = "chart.svg"
verbose = true

[input]
source = "https://example.com/nominees.csv"
on_invalid_year = "skip"
delimiter = ";"

[labels]
"" = "caucasian"
black = "afrodescendant"
latino = "hispanic"

[groups.asian]
color = "#000000"

[chart]
offset = "wiggle"
order = "none"
palette = "groups"
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "chart.svg");
        assert!(config.general.verbose);
        assert_eq!(config.input.source, "https://example.com/nominees.csv");
        assert_eq!(config.input.on_invalid_year, YearPolicy::Skip);
        assert_eq!(config.input.delimiter, ';');
        assert_eq!(config.chart.offset, StackOffset::Wiggle);
        assert_eq!(config.chart.order, StackOrder::None);
        assert_eq!(config.chart.palette, Palette::Groups);

        let labels = config.label_map();
        assert_eq!(labels.resolve("latino"), GroupKey::Hispanic);
        // "asian" is not in this table, so it falls back.
        assert_eq!(labels.resolve("asian"), GroupKey::Caucasian);

        let groups = config.groups();
        let asian = &groups[GroupKey::Asian.index()];
        assert_eq!(asian.color, "#000000");
        assert_eq!(asian.label, "Asian");
        assert_eq!(groups[0].label, "Caucasian or another");
    }

    #[test]
    fn test_validate_rejects_bad_alpha() {
        let mut config = Config::default();
        config.chart.curve_alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_canvas() {
        let mut config = Config::default();
        config.chart.width = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_ticks() {
        let mut config = Config::default();
        config.chart.ticks = MAX_TICKS;
        assert!(config.validate().is_ok());

        config.chart.ticks = MAX_TICKS + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 100"));

        config.chart.ticks = usize::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_margin_table() {
        let config: Config = toml::from_str("[chart.margin]\ntop = 10.0\n").unwrap();
        assert_eq!(config.chart.margin.top, 10.0);
        assert_eq!(config.chart.margin.right, 20.0);
        assert_eq!(config.chart.margin.bottom, 50.0);
        assert_eq!(config.chart.margin.left, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_groups_without_overrides_match_defaults() {
        let mut config = Config::default();
        assert_eq!(config.groups(), Group::defaults());

        // An omitted field keeps the built-in value.
        config.groups.hispanic = GroupStyle {
            label: Some("Latino".to_string()),
            color: None,
        };
        let groups = config.groups();
        let hispanic = &groups[GroupKey::Hispanic.index()];
        assert_eq!(hispanic.label, "Latino");
        assert_eq!(hispanic.color, GroupKey::Hispanic.default_color());
        assert_eq!(groups[GroupKey::Asian.index()], Group::defaults()[3]);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[chart]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.labels, default_labels());
        assert_eq!(reparsed.groups, GroupsConfig::default());
    }

    #[test]
    fn test_merge_with_args() {
        use clap::Parser;

        let args = crate::cli::Args::try_parse_from([
            "oscars-streamgraph",
            "-i",
            "other.csv",
            "-o",
            "out/chart.svg",
            "--skip-invalid-years",
            "--offset",
            "wiggle",
            "--width",
            "900",
        ])
        .unwrap();

        let mut config = Config::default();
        config.chart.order = StackOrder::Reverse;
        config.merge_with_args(&args);

        assert_eq!(config.input.source, "other.csv");
        assert_eq!(config.general.output, "out/chart.svg");
        assert_eq!(config.input.on_invalid_year, YearPolicy::Skip);
        assert_eq!(config.chart.offset, StackOffset::Wiggle);
        assert_eq!(config.chart.width, 900.0);
        // Not given on the command line: the config value stays.
        assert_eq!(config.chart.order, StackOrder::Reverse);
        assert_eq!(config.input.timeout_seconds, 30);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[chart]\nwidth = 800.0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chart.width, 800.0);
        assert_eq!(config.chart.height, 600.0);
    }
}
