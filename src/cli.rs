//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::chart::{Palette, StackOffset, StackOrder};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Oscars Streamgraph - Academy Award nominees by ethnic background
///
/// Reads a nominee CSV, counts nominees per ceremony year and ethnic
/// background group, and renders the counts as a stacked streamgraph SVG.
///
/// Examples:
///   oscars-streamgraph --input data/academy_awards_nominees.csv
///   oscars-streamgraph -i https://example.com/nominees.csv -o chart.svg
///   oscars-streamgraph --offset wiggle --report summary.md
///   oscars-streamgraph --dry-run --year 1972
///   oscars-streamgraph --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV dataset to read (local path or http(s) URL)
    ///
    /// Defaults to the source in .streamgraph.toml, or
    /// data/academy_awards_nominees.csv.
    #[arg(short, long, value_name = "PATH|URL", env = "STREAMGRAPH_INPUT")]
    pub input: Option<String>,

    /// Output file path for the SVG chart
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .streamgraph.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write a summary report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json, csv)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Layer order in the stack
    #[arg(long, value_name = "ORDER")]
    pub order: Option<StackOrder>,

    /// Baseline offset of the stack
    ///
    /// `none` stacks from zero; `silhouette` and `wiggle` give the
    /// centred streamgraph look; `expand` normalizes each year to 100%.
    #[arg(long, value_name = "OFFSET")]
    pub offset: Option<StackOffset>,

    /// Fill palette for the layers
    #[arg(long, value_name = "PALETTE")]
    pub palette: Option<Palette>,

    /// Chart width in SVG units
    #[arg(long, value_name = "UNITS")]
    pub width: Option<f64>,

    /// Chart height in SVG units
    #[arg(long, value_name = "UNITS")]
    pub height: Option<f64>,

    /// Drop rows with a non-numeric year instead of failing
    #[arg(long)]
    pub skip_invalid_years: bool,

    /// Print the breakdown for the ceremony year closest to YEAR
    #[arg(long, value_name = "YEAR")]
    pub year: Option<f64>,

    /// Timeout for remote datasets in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Dry run: load and aggregate, print the table, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .streamgraph.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV table, one row per year
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(width) = self.width {
            if !width.is_finite() || width <= 0.0 {
                return Err("Width must be a positive number".to_string());
            }
        }
        if let Some(height) = self.height {
            if !height.is_finite() || height <= 0.0 {
                return Err("Height must be a positive number".to_string());
            }
        }

        if let Some(year) = self.year {
            if !year.is_finite() {
                return Err("Year must be a finite number".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if input.trim().is_empty() {
                return Err("Input must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some("data/nominees.csv".to_string()),
            output: None,
            config: None,
            report: None,
            format: None,
            order: None,
            offset: None,
            palette: None,
            width: None,
            height: None,
            skip_invalid_years: false,
            year: None,
            timeout: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_dimensions() {
        let mut args = make_args();
        args.width = Some(-10.0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.height = Some(f64::NAN);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "oscars-streamgraph",
            "--input",
            "nominees.csv",
            "--offset",
            "silhouette",
            "--order",
            "descending",
            "--format",
            "json",
            "--year",
            "1972",
        ])
        .unwrap();

        assert_eq!(args.input.as_deref(), Some("nominees.csv"));
        assert_eq!(args.offset, Some(StackOffset::Silhouette));
        assert_eq!(args.order, Some(StackOrder::Descending));
        assert_eq!(args.format, Some(ReportFormat::Json));
        assert_eq!(args.year, Some(1972.0));
    }
}
