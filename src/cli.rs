//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use weightchart::WindowSelector;

/// weightchart - turn a weight log into chart datasets
///
/// Loads a JSON measurement log, picks the requested display window and
/// prints the series a chart should draw (per-day average/max/min, or raw
/// timed points for a single day).
///
/// Examples:
///   weightchart --log weights.json
///   weightchart --log weights.json --window week --format json
///   weightchart --log weights.json --window 1 --offset 1 --previous
///   weightchart --log weights.json --window all --output chart.md
///   weightchart --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Measurement log to chart (JSON array or keyed object)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "WEIGHTCHART_LOG",
        required_unless_present = "init_config"
    )]
    pub log: Option<PathBuf>,

    /// Display window: a day count, 0 for all time, or
    /// day|week|month|quarter|year|all
    ///
    /// Defaults to the config file value, or month.
    #[arg(short, long, value_name = "WINDOW")]
    pub window: Option<WindowSelector>,

    /// Number of periods to page back from now
    #[arg(long, default_value = "0", value_name = "N")]
    pub offset: u32,

    /// Page one period from --offset before rendering
    #[arg(long, value_name = "DIRECTION")]
    pub step: Option<StepArg>,

    /// How --offset is measured (window, day)
    ///
    /// Defaults to the config file value, or window.
    #[arg(long, value_name = "UNIT")]
    pub offset_unit: Option<OffsetUnitArg>,

    /// Reference instant instead of the current local time
    ///
    /// Accepts YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD (end of that day).
    #[arg(long, value_name = "DATETIME", value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Overlay the previous period as a dashed comparison series
    #[arg(short, long)]
    pub previous: bool,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .weightchart.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .weightchart.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Offset unit for --offset-unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OffsetUnitArg {
    Window,
    Day,
}

/// Paging direction for --step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StepArg {
    Previous,
    Next,
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date/time: {}", s))?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or("Invalid end-of-day time")?;
    Ok(date.and_time(end_of_day))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the log path (validated to be present unless --init-config).
    pub fn log_path(&self) -> Option<&std::path::Path> {
        self.log.as_deref()
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

        match self.log {
            None => return Err("A measurement log is required (--log)".to_string()),
            Some(ref path) => {
                if !path.exists() {
                    return Err(format!("Log file does not exist: {}", path.display()));
                }
                if !path.is_file() {
                    return Err(format!("Log path is not a file: {}", path.display()));
                }
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
