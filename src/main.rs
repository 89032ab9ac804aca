//! Cineregions - statistics and region maps for French cinema venues
//!
//! A CLI tool that loads the national venue table, aggregates it by
//! administrative region, and writes a statistics report plus GeoJSON
//! layers ready for choropleth and marker maps.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (unreadable input, bad config, unwritable output, etc.)

mod analysis;
mod cli;
mod config;
mod geo;
mod loader;
mod models;
mod report;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use geo::BoundarySet;
use loader::LoadOptions;
use models::{Attribute, Report, ReportMetadata, Venue, VenueDetail, VenueMeasure};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

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

    // Load configuration before logging, which honours [general].verbose
    let (config, source) = match prepare_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Cineregions v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(&args, &config) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .cineregions.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {CONFIG_FILE} already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {CONFIG_FILE}"))?;

    println!("✅ Created {CONFIG_FILE} with default settings.");
    println!("   Edit it to set the venue table, region boundaries, and report options.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the data, build the report and layers, and write them out.
fn run(args: &Args, config: &Config) -> Result<()> {
    // Step 1: Load the venue table
    let venues_path = config.venues_path()?;
    let options = LoadOptions {
        delimiter: config.delimiter_byte()?,
    };
    let venues = loader::load_venues(&venues_path, &options)?;

    if !args.quiet {
        println!("📥 Loaded {} venues from {}", venues.len(), venues_path.display());
    }

    // Step 2: Apply the commune and venue selection
    let selection = Selection {
        communes: args.selected_communes(),
        venue_names: args.selected_venue_names(),
    };
    warn_unmatched("Commune", &analysis::communes(&venues), &selection.communes);
    warn_unmatched("Venue", &analysis::venue_names(&venues), &selection.venue_names);
    let selected =
        analysis::select_venues(&venues, &selection.communes, &selection.venue_names);

    // Step 3: Aggregate by region
    let regions = analysis::aggregate_by_region(&venues);
    let metric = config.report.metric;
    info!("Aggregated venues into {} region groups", regions.len());

    // Step 4: Build the report
    let report = build_report(config, &venues, &selected, &selection, regions, &venues_path);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = config.output_path(args.format);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Step 5: Map layers
    if let Some(ref map_output) = args.map_output {
        let Some(ref regions_path) = config.data.regions else {
            bail!("--map-output needs region boundaries: use --regions or set [data].regions");
        };

        let boundaries =
            BoundarySet::load(Path::new(regions_path), &config.data.region_name_property)?;
        debug!("Boundary regions: {:?}", boundaries.names());
        let joined = geo::join_with_geometry(&report.regions, &boundaries);

        let unmatched = joined.iter().filter(|j| j.venue_count == 0).count();
        if unmatched > 0 {
            warn!("{} of {} regions have no venues", unmatched, joined.len());
        }

        geo::write_layer(&geo::choropleth_layer(&joined, metric), map_output)?;
        info!("Wrote choropleth layer to {}", map_output.display());
    }

    if let Some(ref markers_output) = args.markers_output {
        geo::write_layer(&geo::marker_layer(selected.iter().copied()), markers_output)?;
        info!("Wrote marker layer to {}", markers_output.display());
    }

    if !args.quiet {
        print_summary(&report, &output_path);
    }

    Ok(())
}

/// Commune and venue-name filters; an empty list does not filter.
#[derive(Debug, Default)]
struct Selection {
    communes: Vec<String>,
    venue_names: Vec<String>,
}

impl Selection {
    fn is_active(&self) -> bool {
        !self.communes.is_empty() || !self.venue_names.is_empty()
    }
}

/// Assemble every section of the report.
fn build_report(
    config: &Config,
    venues: &[Venue],
    selected: &[&Venue],
    selection: &Selection,
    regions: Vec<models::RegionSummary>,
    source: &Path,
) -> Report {
    let metric = config.report.metric;
    let top_n = config.report.top_n;

    let top_venues = VenueMeasure::ALL
        .iter()
        .map(|&measure| (measure, analysis::top_venues(venues, measure, top_n)))
        .collect();

    let distributions = if config.report.include_distributions {
        Attribute::ALL
            .iter()
            .map(|&attribute| analysis::attribute_distribution(venues, attribute))
            .collect()
    } else {
        Vec::new()
    };

    // Venues are listed only for a filtered selection
    let selected_venues = if selection.is_active() {
        selected.iter().map(|&v| VenueDetail::from(v)).collect()
    } else {
        Vec::new()
    };

    let correlations = config
        .report
        .include_correlations
        .then(|| analysis::correlation_matrix(venues));

    Report {
        metadata: ReportMetadata {
            source: source.display().to_string(),
            generated_at: Utc::now(),
            venues_loaded: venues.len(),
            venues_selected: selected.len(),
            communes: selection.communes.clone(),
            venue_names: selection.venue_names.clone(),
            metric,
        },
        selection: analysis::selection_totals(selected.iter().copied()),
        selected_venues,
        activity: analysis::activity_totals(venues),
        region_table: analysis::region_table(&regions, metric),
        regions,
        top_venues,
        distributions,
        descriptions: analysis::describe(venues),
        correlations,
    }
}

/// Warn about requested names absent from the table; `known` is sorted.
fn warn_unmatched(kind: &str, known: &[String], requested: &[String]) {
    for name in requested {
        if known.binary_search(name).is_err() {
            warn!("{} '{}' is not in the venue table", kind, name);
        }
    }
}

/// Print the console summary.
fn print_summary(report: &Report, output_path: &Path) {
    let metric = report.metadata.metric;

    println!("\n📊 Summary:");
    println!(
        "   Venues: {} | Screens: {} | Seats: {}",
        report.selection.venue_count, report.selection.screen_total, report.selection.seat_total
    );
    println!("   Regions by {}:", metric);
    for (region, value) in report.region_table.iter().take(5) {
        println!("     {:<30} {}", region, value);
    }
    println!("\n✅ Report saved to: {}", output_path.display());
}

/// Where the configuration came from, logged once logging is up.
#[derive(Debug)]
enum ConfigSource {
    File(PathBuf),
    Defaults,
    Invalid(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load the configuration and apply the command-line overrides.
fn prepare_config(args: &Args) -> Result<(Config, ConfigSource)> {
    let (mut config, source) = load_config(args)?;
    config.merge_with_args(args);
    Ok((config, source))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(e))),
    }
}
