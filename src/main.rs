//! Oscars Streamgraph - Academy Award nominees by ethnic background
//!
//! A CLI tool that reads a nominee CSV, counts nominees per ceremony year
//! and ethnic background group, and renders the counts as a streamgraph SVG.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, config, unreadable or invalid dataset)

mod analysis;
mod chart;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, ReportFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so it is read first.
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("oscars-streamgraph v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .streamgraph.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the dataset, label mapping, colors and chart layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        // An explicit path must load.
        Config::load(config_path)?
    } else {
        Config::load_default()?.unwrap_or_default()
    };

    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the complete pipeline.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();
    debug!("Configuration: {:?}", config);

    // Step 1: Load the dataset
    let source = source::Source::parse(&config.input.source);
    println!("📥 Loading dataset: {}", source);

    let load_options = source::LoadOptions {
        timeout_seconds: config.input.timeout_seconds,
        show_progress: !args.quiet,
    };
    let bytes = source::load_source(&source, &load_options).await?;
    info!("Read {} bytes from {}", bytes.len(), source);

    // Step 2: Parse records
    let labels = config.label_map();
    debug!("Label table has {} entries", labels.len());
    let ingest_options = ingest::IngestOptions::from(&config.input);
    let ingested = ingest::parse_records(bytes.as_slice(), &labels, &ingest_options)
        .with_context(|| format!("Failed to parse dataset {}", source))?;

    if !ingested.row_errors.is_empty() {
        warn!("Skipped {} rows", ingested.row_errors.len());
        for row_error in &ingested.row_errors {
            debug!("Line {}: {}", row_error.line, row_error.message);
        }
    }

    // Step 3: Aggregate
    let summaries = analysis::aggregate(&ingested.records);
    let groups = config.groups();
    info!(
        "Aggregated {} records into {} years",
        ingested.records.len(),
        summaries.len()
    );

    if let Some(year) = args.year {
        println!("\n🔎 Nearest ceremony year to {}:", year);
        match analysis::nearest_summary(&summaries, year) {
            Some(summary) => println!("{}", analysis::format_breakdown(summary, &groups)),
            None => println!("   No data."),
        }
    }

    let totals = models::NomineeTotals::from_summaries(&summaries);

    // Handle --dry-run: print the table and exit
    if args.dry_run {
        println!("\n🔍 Dry run: aggregated table (nothing written)\n");
        // Rebuilt from the raw labels so the table reflects the label table.
        let table = analysis::aggregate_raw(
            ingested
                .records
                .iter()
                .map(|r| (r.year, r.raw_label.as_str())),
            &labels,
        );
        if table.is_empty() {
            println!("   No nominees found.");
        } else {
            println!("{}", analysis::format_table(&table, &groups));
        }
        println!("\n{}", analysis::generate_summary_text(&totals, &groups));
        println!("\n✅ Dry run complete.");
        return Ok(());
    }

    // Step 4: Render the chart
    println!("\n🎨 Rendering streamgraph...");
    let chart_options = chart::ChartOptions::from(&config.chart);
    let svg = chart::render_streamgraph(&summaries, &groups, &chart_options);

    let output = PathBuf::from(&config.general.output);
    report::write_atomic(&output, &svg)
        .with_context(|| format!("Failed to write chart to {}", output.display()))?;

    // Step 5: Optional report
    if let Some(ref report_path) = args.report {
        println!("📝 Generating report...");
        let metadata = ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            rows_read: ingested.rows_read,
            rows_skipped: ingested.row_errors.len(),
            unmapped_labels: ingested.unmapped_labels.clone(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };
        let report = Report::new(metadata, groups.clone(), summaries.clone());

        let content = match config.report.format {
            ReportFormat::Json => report::generate_json_report(&report)?,
            ReportFormat::Csv => report::generate_csv_report(&report.summaries)?,
            ReportFormat::Markdown => {
                report::generate_markdown_report(&report, config.report.include_years)
            }
        };
        report::write_atomic(report_path, &content)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        println!("   Report saved to: {}", report_path.display());
    }

    // Print summary
    let duration = start_time.elapsed().as_secs_f64();
    println!("\n📊 Summary:");
    for line in analysis::generate_summary_text(&totals, &groups).lines() {
        println!("   {}", line);
    }
    if !ingested.unmapped_labels.is_empty() {
        println!(
            "   ⚠️  {} unmapped label(s) counted as {}",
            ingested.unmapped_labels.len(),
            labels.default_group()
        );
    }
    println!("   Duration: {:.2}s", duration);
    println!("\n✅ Streamgraph saved to: {}", output.display());

    Ok(())
}
