//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.weightchart.toml` files.

use crate::cli::{Args, OffsetUnitArg, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use weightchart::{EngineOptions, OffsetUnit, WindowSelector};

pub const DEFAULT_CONFIG_FILE: &str = ".weightchart.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Window settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Display window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window used when --window is not given (0 = all time).
    #[serde(default)]
    pub default_selector: WindowSelector,

    /// Whether an offset counts whole windows or single days.
    #[serde(default)]
    pub offset_unit: OffsetUnit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_selector: WindowSelector::MONTH,
            offset_unit: OffsetUnit::Window,
        }
    }
}

/// Chart content settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Overlay the previous period.
    #[serde(default)]
    pub show_previous: bool,
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.weightchart.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(window) = args.window {
            self.window.default_selector = window;
        }

        if let Some(unit) = args.offset_unit {
            self.window.offset_unit = offset_unit_from_arg(unit);
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }

        // Flags always override
        if args.previous {
            self.chart.show_previous = true;
        }
    }

    /// Engine policy derived from this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            offset_unit: self.window.offset_unit,
            include_previous: self.chart.show_previous,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Convert OffsetUnitArg to OffsetUnit.
fn offset_unit_from_arg(arg: OffsetUnitArg) -> OffsetUnit {
    match arg {
        OffsetUnitArg::Window => OffsetUnit::Window,
        OffsetUnitArg::Day => OffsetUnit::Day,
    }
}
