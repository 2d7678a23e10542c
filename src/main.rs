//! weightchart - chart datasets from a weight log
//!
//! A CLI that loads a measurement log, runs the aggregation engine for the
//! requested window and writes the resulting chart description.
//!
//! Exit codes:
//!   0 - Success (an empty chart is still a success)
//!   1 - Runtime error (unreadable log, bad config, invalid arguments)

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::Local;
use cli::{Args, OutputFormat, StepArg};
use config::Config;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use weightchart::engine::{navigate, period_label, Direction, TracingObserver};
use weightchart::models::{ChartReport, ReportMetadata};
use weightchart::{ingest, report, ChartEngine};

fn main() -> Result<()> {
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

    // Initialize logging
    init_logging(&args);

    info!("weightchart v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_chart(args) {
        error!("Chart generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .weightchart.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .weightchart.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .weightchart.toml")?;

    println!("✅ Created .weightchart.toml with default settings.");
    println!("   Edit it to change the default window, offset unit and output format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that chart output on stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the log, run the engine and write the chart.
fn run_chart(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let log_path = args
        .log_path()
        .context("A measurement log is required (--log)")?;

    // Step 1: Load the measurement log
    let outcome = ingest::load_log(log_path)?;
    info!(
        "Loaded {} measurements from {}",
        outcome.measurements.len(),
        log_path.display()
    );
    if outcome.excluded > 0 {
        warn!(
            "{} of {} log entries were malformed and excluded",
            outcome.excluded,
            outcome.total()
        );
    }

    // Step 2: Resolve window and offset
    let selector = config.window.default_selector;
    let offset = match args.step {
        Some(StepArg::Previous) => navigate(selector, args.offset, Direction::Previous),
        Some(StepArg::Next) => navigate(selector, args.offset, Direction::Next),
        None => args.offset,
    };
    let now = args.now.unwrap_or_else(|| Local::now().naive_local());

    // Step 3: Aggregate
    let engine = ChartEngine::with_observer(config.engine_options(), TracingObserver);
    let chart_run = engine.render(&outcome.measurements, selector, now, offset);

    let label = period_label(selector, chart_run.window.end);
    if chart_run.result.is_empty() {
        info!("No data for {}", label);
    } else {
        info!(
            "{} chart for {}: {} dataset(s) from {} measurement(s)",
            chart_run.result.mode,
            label,
            chart_run.result.datasets.len(),
            chart_run.filtered
        );
    }

    // Step 4: Build and write the report
    let chart_report = ChartReport {
        metadata: ReportMetadata {
            selector,
            offset,
            period_label: label,
            window_start: chart_run.window.start,
            window_end: chart_run.window.end,
            generated_at: Local::now(),
            measurements_loaded: outcome.measurements.len(),
            measurements_excluded: outcome.excluded,
            measurements_in_window: chart_run.filtered,
        },
        chart: chart_run.result,
    };

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&chart_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&chart_report),
    };

    match args.output {
        Some(ref path) => {
            report::write_output(&output, Some(path.as_path()))
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
            info!("Chart saved to {}", path.display());
        }
        None => report::write_output(&output, None).context("Failed to write chart")?,
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .weightchart.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
