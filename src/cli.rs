//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Metric;
use clap::Parser;
use std::path::PathBuf;

/// Cineregions - statistics and region maps for French cinema venues
///
/// Loads the venue table, aggregates screens, seats and venues by region,
/// and writes a Markdown/JSON report plus GeoJSON layers for a map renderer.
///
/// Examples:
///   cineregions --venues dataset.csv
///   cineregions --venues dataset.csv --regions regions.geojson --map-output map.geojson
///   cineregions --venues dataset.csv --metric seats --format json -o report.json
///   cineregions --venues dataset.csv --commune Paris,Lyon --markers-output markers.geojson
///   cineregions --venues dataset.csv --commune Rennes --venue Arvor,Gaumont
///   cineregions --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Venue table to load (CSV with a header row)
    ///
    /// Can also be set via CINEREGIONS_VENUES env var or .cineregions.toml config.
    #[arg(long, value_name = "FILE", env = "CINEREGIONS_VENUES")]
    pub venues: Option<PathBuf>,

    /// Region boundaries (GeoJSON FeatureCollection)
    ///
    /// Required for --map-output.
    #[arg(long, value_name = "FILE", env = "CINEREGIONS_REGIONS")]
    pub regions: Option<PathBuf>,

    /// Field delimiter of the venue table
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Metric for the region table and map shading
    #[arg(long, value_name = "METRIC")]
    pub metric: Option<Metric>,

    /// Number of venues listed in each ranking
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Restrict venue totals and markers to these communes (comma-separated)
    ///
    /// Example: --commune Paris,Lyon
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub commune: Option<Vec<String>>,

    /// Restrict venue totals, listing and markers to these venues (comma-separated)
    ///
    /// Combines with --commune: a venue must match both.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub venue: Option<Vec<String>>,

    /// Output file path for the report
    ///
    /// Defaults to cinemas_report.md or cinemas_report.json by format.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the region choropleth layer (GeoJSON) to this file
    #[arg(long, value_name = "FILE")]
    pub map_output: Option<PathBuf>,

    /// Write the venue marker layer (GeoJSON) to this file
    #[arg(long, value_name = "FILE")]
    pub markers_output: Option<PathBuf>,

    /// Leave the correlation matrix out of the report
    #[arg(long)]
    pub no_correlations: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cineregions.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .cineregions.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
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

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
                return Err(format!("Invalid delimiter: {:?}", delimiter));
            }
        }

        for (flag, names) in [("--commune", &self.commune), ("--venue", &self.venue)] {
            if let Some(names) = names {
                if names.iter().all(|n| n.trim().is_empty()) {
                    return Err(format!("{} needs at least one name", flag));
                }
            }
        }

        for (flag, path) in [("--venues", &self.venues), ("--regions", &self.regions)] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} file does not exist: {}", flag, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general].verbose`; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Returns the selected communes, trimmed; empty means all.
    pub fn selected_communes(&self) -> Vec<String> {
        trimmed_names(&self.commune)
    }

    /// Returns the selected venue names, trimmed; empty means all.
    pub fn selected_venue_names(&self) -> Vec<String> {
        trimmed_names(&self.venue)
    }
}

fn trimmed_names(names: &Option<Vec<String>>) -> Vec<String> {
    names
        .iter()
        .flatten()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            venues: None,
            regions: None,
            delimiter: None,
            metric: None,
            top: None,
            commune: None,
            venue: None,
            output: None,
            format: OutputFormat::Markdown,
            map_output: None,
            markers_output: None,
            no_correlations: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
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
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_venue_file() {
        let mut args = make_args();
        args.venues = Some(PathBuf::from("/nonexistent/venues.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_delimiter() {
        let mut args = make_args();
        args.delimiter = Some('"');
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
    fn test_selected_communes() {
        let mut args = make_args();
        assert!(args.selected_communes().is_empty());

        args.commune = Some(vec![" Paris".to_string(), "".to_string(), "Lyon ".to_string()]);
        assert_eq!(args.selected_communes(), vec!["Paris", "Lyon"]);
    }

    #[test]
    fn test_validation_empty_venue_list() {
        let mut args = make_args();
        args.venue = Some(vec![" ".to_string()]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_selected_venue_names() {
        let mut args = make_args();
        assert!(args.selected_venue_names().is_empty());

        args.venue = Some(vec!["Arvor ".to_string(), " Gaumont".to_string()]);
        assert_eq!(args.selected_venue_names(), vec!["Arvor", "Gaumont"]);
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "cineregions",
            "--metric",
            "seats",
            "--commune",
            "Paris,Lyon",
            "--venue",
            "Le Grand Rex",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.metric, Some(Metric::Seats));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.selected_communes(), vec!["Paris", "Lyon"]);
        assert_eq!(args.selected_venue_names(), vec!["Le Grand Rex"]);
    }
}
