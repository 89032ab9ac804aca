//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cineregions.toml` files.

use crate::cli::OutputFormat;
use crate::models::Metric;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".cineregions.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report path. Unset means `cinemas_report.<ext>` for the chosen format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Stem of the report file when no output path is configured.
const DEFAULT_REPORT_STEM: &str = "cinemas_report";

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Venue table (CSV).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venues: Option<String>,

    /// Region boundaries (GeoJSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<String>,

    /// Boundary feature property holding the official region name.
    #[serde(default = "default_name_property")]
    pub region_name_property: String,

    /// Field delimiter of the venue table.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            venues: None,
            regions: None,
            region_name_property: default_name_property(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_name_property() -> String {
    "nom".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Metric for the region table and map.
    #[serde(default)]
    pub metric: Metric,

    /// Number of venues in each ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Include attribute distributions.
    #[serde(default = "default_true")]
    pub include_distributions: bool,

    /// Include the correlation matrix.
    #[serde(default = "default_true")]
    pub include_correlations: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            top_n: default_top_n(),
            include_distributions: true,
            include_correlations: true,
        }
    }
}

fn default_top_n() -> usize {
    20
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
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings
    /// whenever they are given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref venues) = args.venues {
            self.data.venues = Some(venues.display().to_string());
        }
        if let Some(ref regions) = args.regions {
            self.data.regions = Some(regions.display().to_string());
        }
        if let Some(delimiter) = args.delimiter {
            self.data.delimiter = delimiter;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(metric) = args.metric {
            self.report.metric = metric;
        }
        if let Some(top) = args.top {
            self.report.top_n = top;
        }
        if args.no_correlations {
            self.report.include_correlations = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Venue table path, which must come from the CLI or the config file.
    pub fn venues_path(&self) -> Result<PathBuf> {
        match self.data.venues {
            Some(ref path) => Ok(PathBuf::from(path)),
            None => bail!("No venue table given. Use --venues or set [data].venues in {CONFIG_FILE}"),
        }
    }

    /// Report path, falling back to a default named after the format.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        match self.general.output {
            Some(ref path) => PathBuf::from(path),
            None => PathBuf::from(format!("{DEFAULT_REPORT_STEM}.{}", format.extension())),
        }
    }

    /// Delimiter as a single byte, as the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.data.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("Delimiter must be ASCII, got '{}'", self.data.delimiter))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
