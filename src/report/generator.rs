//! Markdown and JSON report generation.
//!
//! This module renders the statistics report from the aggregated results.

use crate::analysis::UNKNOWN_REGION;
use crate::models::{
    ActivityTotals, ColumnSummary, CorrelationMatrix, Distribution, RankedVenue, Report,
    ReportMetadata, SelectionTotals, VenueDetail, VenueMeasure,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# French Cinemas Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_selection_section(&report.selection));
    output.push_str(&generate_selected_venues_section(&report.selected_venues));
    output.push_str(&generate_activity_section(&report.activity));
    output.push_str(&generate_region_section(report));
    output.push_str(&generate_rankings_section(&report.top_venues));
    output.push_str(&generate_distributions_section(&report.distributions));
    output.push_str(&generate_description_section(&report.descriptions));

    if let Some(ref matrix) = report.correlations {
        output.push_str(&generate_correlation_section(matrix));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Venue Table:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Venues Loaded:** {}\n", metadata.venues_loaded));
    if !metadata.communes.is_empty() {
        section.push_str(&format!("- **Communes:** {}\n", metadata.communes.join(", ")));
    }
    if !metadata.venue_names.is_empty() {
        section.push_str(&format!("- **Venues:** {}\n", metadata.venue_names.join(", ")));
    }
    if !metadata.communes.is_empty() || !metadata.venue_names.is_empty() {
        section.push_str(&format!("- **Venues Selected:** {}\n", metadata.venues_selected));
    }
    section.push_str(&format!("- **Region Metric:** {}\n", metadata.metric));
    section.push('\n');

    section
}

/// Generate the selection totals section.
fn generate_selection_section(totals: &SelectionTotals) -> String {
    let mut section = String::new();

    section.push_str("## Selection\n\n");
    section.push_str("| Venues | Screens | Seats |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        totals.venue_count, totals.screen_total, totals.seat_total
    ));

    section
}

/// Generate the selected venues listing.
fn generate_selected_venues_section(venues: &[VenueDetail]) -> String {
    if venues.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Selected Venues\n\n");
    section.push_str(
        "| Venue | Commune | Screens | Seats | UGC Card | Cinepass | Art et Essai | Multiplex |\n",
    );
    section.push_str("|:---|:---|---:|---:|:---:|:---:|:---:|:---:|\n");

    for venue in venues {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            venue.name,
            venue.commune,
            count_cell(venue.screens),
            count_cell(venue.seats),
            flag_cell(venue.ugc_card),
            flag_cell(venue.cinepass),
            flag_cell(venue.art_et_essai),
            flag_cell(venue.multiplex)
        ));
    }
    section.push('\n');

    section
}

fn count_cell(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn flag_cell(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "-",
    }
}

/// Generate the national activity section.
fn generate_activity_section(activity: &ActivityTotals) -> String {
    let mut section = String::new();

    section.push_str("## Activity\n\n");
    section.push_str(&format!("- **Admissions 2020:** {}\n", activity.admissions_2020));
    section.push_str(&format!("- **Admissions 2019:** {}\n", activity.admissions_2019));
    section.push_str(&format!("- **Sessions 2020:** {}\n", activity.sessions_2020));
    if let Some(change) = activity.mean_admissions_change {
        section.push_str(&format!("- **Mean Admissions Change 2020/2019:** {:.2}%\n", change));
    }
    section.push('\n');

    section
}

/// Generate the region table, sorted by the selected metric.
fn generate_region_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Regions\n\n");

    if report.region_table.is_empty() {
        section.push_str("No venues to aggregate.\n\n");
        return section;
    }

    section.push_str(&format!("| Region | {} |\n", report.metadata.metric));
    section.push_str("|:---|---:|\n");
    for (region, value) in &report.region_table {
        section.push_str(&format!("| {} | {} |\n", region, value));
    }
    section.push('\n');

    let unmapped: u64 = report
        .regions
        .iter()
        .filter(|r| r.display_label == UNKNOWN_REGION)
        .map(|r| r.venue_count)
        .sum();
    if unmapped > 0 {
        section.push_str(&format!(
            "*{} venues have no recognised region and are not shown on the map.*\n\n",
            unmapped
        ));
    }

    section
}

/// Generate the venue rankings.
fn generate_rankings_section(rankings: &[(VenueMeasure, Vec<RankedVenue>)]) -> String {
    if rankings.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Venues\n\n");

    for (measure, venues) in rankings {
        section.push_str(&format!("### {}\n\n", measure));
        section.push_str(&format!("| # | Venue | Commune | {} |\n", measure));
        section.push_str("|---:|:---|:---|---:|\n");

        for (i, venue) in venues.iter().enumerate() {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                i + 1,
                venue.name,
                venue.commune,
                venue.value
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the attribute distributions.
fn generate_distributions_section(distributions: &[Distribution]) -> String {
    if distributions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Venue Characteristics\n\n");

    for dist in distributions {
        let total: u64 = dist.counts.iter().map(|(_, c)| c).sum();

        section.push_str(&format!("### {}\n\n", dist.attribute));
        section.push_str("| Value | Venues | Share |\n");
        section.push_str("|:---|---:|---:|\n");

        for (value, count) in &dist.counts {
            let share = if total > 0 {
                *count as f64 * 100.0 / total as f64
            } else {
                0.0
            };
            section.push_str(&format!("| {} | {} | {:.1}% |\n", value, count, share));
        }
        section.push('\n');
    }

    section
}

/// Generate the descriptive statistics table.
fn generate_description_section(descriptions: &[ColumnSummary]) -> String {
    if descriptions.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Descriptive Statistics\n\n");
    section.push_str("| Column | Count | Mean | Std | Min | 25% | 50% | 75% | Max |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for summary in descriptions {
        let cells = [
            summary.mean,
            summary.std,
            summary.min,
            summary.q1,
            summary.median,
            summary.q3,
            summary.max,
        ];

        section.push_str(&format!("| {} | {} |", summary.column, summary.count));
        for cell in cells {
            match cell {
                Some(value) => section.push_str(&format!(" {:.2} |", value)),
                None => section.push_str(" - |"),
            }
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the correlation matrix.
fn generate_correlation_section(matrix: &CorrelationMatrix) -> String {
    let mut section = String::new();

    section.push_str("## Correlations\n\n");

    section.push_str("| |");
    for column in &matrix.columns {
        section.push_str(&format!(" {} |", column));
    }
    section.push('\n');

    section.push_str("|:---|");
    section.push_str(&"---:|".repeat(matrix.columns.len()));
    section.push('\n');

    for (column, row) in matrix.columns.iter().zip(&matrix.values) {
        section.push_str(&format!("| **{}** |", column));
        for value in row {
            match value {
                Some(r) => section.push_str(&format!(" {:.2} |", r)),
                None => section.push_str(" - |"),
            }
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by cineregions v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
