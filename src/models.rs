//! Data models for the cinema statistics tool.
//!
//! This module contains the core data structures used throughout
//! the application for representing venues, region summaries, and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cinema venue, one row of the source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue name.
    pub name: String,
    /// Commune the venue is located in.
    pub commune: String,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Administrative region label as written in the source table.
    pub region: Option<String>,
    /// Number of screens.
    pub screens: Option<u64>,
    /// Number of seats.
    pub seats: Option<u64>,
    /// Sessions held in 2020.
    pub sessions_2020: Option<u64>,
    /// Admissions in 2020.
    pub admissions_2020: Option<u64>,
    /// Admissions in 2019.
    pub admissions_2019: Option<u64>,
    /// Admissions change 2020/2019, in percent.
    pub admissions_change: Option<f64>,
    /// Films programmed in 2020.
    pub films_2020: Option<u64>,
    /// New films (first releases) programmed in 2020.
    pub new_films_2020: Option<u64>,
    /// Population of the commune (2015).
    pub commune_population: Option<u64>,
    /// Population of the urban unit (2015).
    pub urban_unit_population: Option<u64>,
    /// Whether the venue is a multiplex.
    pub multiplex: Option<bool>,
    /// Whether the venue holds the "Art et Essai" label.
    pub art_et_essai: Option<bool>,
    /// Venue genre (fixed, itinerant, ...).
    pub genre: Option<String>,
    /// Whether the UGC subscription card is accepted.
    pub ugc_card: Option<bool>,
    /// Whether the Cinepass subscription card is accepted.
    pub cinepass: Option<bool>,
}

/// Aggregated counts for every venue sharing one raw region label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Raw region label from the source table (`None` when missing).
    pub raw_label: Option<String>,
    /// Official region name, or the unknown sentinel.
    pub display_label: String,
    /// Number of venues in the group.
    pub venue_count: u64,
    /// Sum of screens, missing counted as zero.
    pub screen_total: u64,
    /// Sum of seats, missing counted as zero.
    pub seat_total: u64,
}

impl RegionSummary {
    /// Returns the value of the given metric for this region.
    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Venues => self.venue_count,
            Metric::Screens => self.screen_total,
            Metric::Seats => self.seat_total,
        }
    }
}

/// Region-level value shaded on the choropleth map.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Number of venues.
    #[default]
    Venues,
    /// Number of screens.
    Screens,
    /// Number of seats.
    Seats,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Venues => write!(f, "Venues"),
            Metric::Screens => write!(f, "Screens"),
            Metric::Seats => write!(f, "Seats"),
        }
    }
}

impl Metric {
    /// Returns the color scheme used to shade this metric.
    pub fn color_scheme(&self) -> &'static str {
        match self {
            Metric::Venues => "YlGn",
            Metric::Screens => "OrRd",
            Metric::Seats => "BuPu",
        }
    }
}

/// Per-venue quantity used to rank venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueMeasure {
    Admissions2020,
    Admissions2019,
    Sessions2020,
    Screens,
    Seats,
}

impl fmt::Display for VenueMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueMeasure::Admissions2020 => write!(f, "Admissions 2020"),
            VenueMeasure::Admissions2019 => write!(f, "Admissions 2019"),
            VenueMeasure::Sessions2020 => write!(f, "Sessions 2020"),
            VenueMeasure::Screens => write!(f, "Screens"),
            VenueMeasure::Seats => write!(f, "Seats"),
        }
    }
}

impl VenueMeasure {
    /// All measures, in report order.
    pub const ALL: [VenueMeasure; 5] = [
        VenueMeasure::Admissions2020,
        VenueMeasure::Admissions2019,
        VenueMeasure::Sessions2020,
        VenueMeasure::Screens,
        VenueMeasure::Seats,
    ];

    /// Reads the measure from a venue, missing counted as zero.
    pub fn of(&self, venue: &Venue) -> u64 {
        let value = match self {
            VenueMeasure::Admissions2020 => venue.admissions_2020,
            VenueMeasure::Admissions2019 => venue.admissions_2019,
            VenueMeasure::Sessions2020 => venue.sessions_2020,
            VenueMeasure::Screens => venue.screens,
            VenueMeasure::Seats => venue.seats,
        };
        value.unwrap_or(0)
    }
}

/// Categorical venue attribute used for distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Genre,
    Multiplex,
    ArtEtEssai,
    UgcCard,
    Cinepass,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Genre => write!(f, "Genre"),
            Attribute::Multiplex => write!(f, "Multiplex"),
            Attribute::ArtEtEssai => write!(f, "Art et Essai"),
            Attribute::UgcCard => write!(f, "UGC card"),
            Attribute::Cinepass => write!(f, "Cinepass"),
        }
    }
}

impl Attribute {
    /// All attributes, in report order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Genre,
        Attribute::Multiplex,
        Attribute::ArtEtEssai,
        Attribute::UgcCard,
        Attribute::Cinepass,
    ];

    /// Returns the attribute value of a venue as a label, if present.
    pub fn label_of(&self, venue: &Venue) -> Option<String> {
        let flag = match self {
            Attribute::Genre => return venue.genre.clone(),
            Attribute::Multiplex => venue.multiplex,
            Attribute::ArtEtEssai => venue.art_et_essai,
            Attribute::UgcCard => venue.ugc_card,
            Attribute::Cinepass => venue.cinepass,
        };
        flag.map(|yes| if yes { "Yes" } else { "No" }.to_string())
    }
}

/// National activity figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTotals {
    /// Total admissions in 2020.
    pub admissions_2020: u64,
    /// Total admissions in 2019.
    pub admissions_2019: u64,
    /// Total sessions in 2020.
    pub sessions_2020: u64,
    /// Mean admissions change 2020/2019 over venues reporting one.
    pub mean_admissions_change: Option<f64>,
}

/// Totals over a selection of venues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTotals {
    pub venue_count: u64,
    pub screen_total: u64,
    pub seat_total: u64,
}

/// A venue ranked by one measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedVenue {
    pub name: String,
    pub commune: String,
    pub value: u64,
}

/// Counts of venues per value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub attribute: Attribute,
    /// `(value label, venue count)`, most frequent first.
    pub counts: Vec<(String, u64)>,
}

/// Pairwise Pearson correlations between quantitative columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Column names, in row/column order.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of column i with column j.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Descriptive statistics of one quantitative column over its present values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Number of venues with a value.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation, `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    /// First quartile.
    pub q1: Option<f64>,
    pub median: Option<f64>,
    /// Third quartile.
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// One selected venue, as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueDetail {
    pub name: String,
    pub commune: String,
    pub screens: Option<u64>,
    pub seats: Option<u64>,
    pub ugc_card: Option<bool>,
    pub cinepass: Option<bool>,
    pub art_et_essai: Option<bool>,
    pub multiplex: Option<bool>,
}

impl From<&Venue> for VenueDetail {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            commune: venue.commune.clone(),
            screens: venue.screens,
            seats: venue.seats,
            ugc_card: venue.ugc_card,
            cinepass: venue.cinepass,
            art_et_essai: venue.art_et_essai,
            multiplex: venue.multiplex,
        }
    }
}

/// Metadata about the statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the venue table.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of venues loaded.
    pub venues_loaded: usize,
    /// Number of venues after the commune and venue selection.
    pub venues_selected: usize,
    /// Communes selected (empty means all).
    pub communes: Vec<String>,
    /// Venue names selected (empty means all).
    #[serde(default)]
    pub venue_names: Vec<String>,
    /// Metric used for the region table.
    pub metric: Metric,
}

/// The complete statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Totals over the selected venues.
    pub selection: SelectionTotals,
    /// Selected venues, listed only when a selection is active.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_venues: Vec<VenueDetail>,
    /// National activity figures.
    pub activity: ActivityTotals,
    /// Per-region summaries.
    pub regions: Vec<RegionSummary>,
    /// Regions ranked by the selected metric.
    pub region_table: Vec<(String, u64)>,
    /// Top venues per measure.
    pub top_venues: Vec<(VenueMeasure, Vec<RankedVenue>)>,
    /// Attribute distributions.
    pub distributions: Vec<Distribution>,
    /// Descriptive statistics per quantitative column.
    #[serde(default)]
    pub descriptions: Vec<ColumnSummary>,
    /// Correlation matrix, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RegionSummary {
        RegionSummary {
            raw_label: Some("BRETAGNE".to_string()),
            display_label: "Bretagne".to_string(),
            venue_count: 2,
            screen_total: 8,
            seat_total: 1200,
        }
    }

    #[test]
    fn test_summary_value_by_metric() {
        let s = summary();
        assert_eq!(s.value(Metric::Venues), 2);
        assert_eq!(s.value(Metric::Screens), 8);
        assert_eq!(s.value(Metric::Seats), 1200);
    }

    #[test]
    fn test_metric_color_scheme() {
        assert_eq!(Metric::Venues.color_scheme(), "YlGn");
        assert_eq!(Metric::Screens.color_scheme(), "OrRd");
        assert_eq!(Metric::Seats.color_scheme(), "BuPu");
    }

    #[test]
    fn test_venue_measure_missing_is_zero() {
        let venue = Venue {
            name: "Rex".to_string(),
            screens: Some(3),
            ..Venue::default()
        };
        assert_eq!(VenueMeasure::Screens.of(&venue), 3);
        assert_eq!(VenueMeasure::Admissions2020.of(&venue), 0);
    }

    #[test]
    fn test_attribute_label() {
        let venue = Venue {
            multiplex: Some(true),
            cinepass: Some(false),
            genre: Some("Fixe".to_string()),
            ..Venue::default()
        };
        assert_eq!(Attribute::Multiplex.label_of(&venue), Some("Yes".to_string()));
        assert_eq!(Attribute::Cinepass.label_of(&venue), Some("No".to_string()));
        assert_eq!(Attribute::Genre.label_of(&venue), Some("Fixe".to_string()));
        assert_eq!(Attribute::UgcCard.label_of(&venue), None);
    }

    #[test]
    fn test_venue_detail_from_venue() {
        let venue = Venue {
            name: "Le Rex".to_string(),
            commune: "Brest".to_string(),
            screens: Some(4),
            ugc_card: Some(true),
            admissions_2020: Some(9000),
            ..Venue::default()
        };

        let detail = VenueDetail::from(&venue);

        assert_eq!(detail.name, "Le Rex");
        assert_eq!(detail.commune, "Brest");
        assert_eq!(detail.screens, Some(4));
        assert_eq!(detail.seats, None);
        assert_eq!(detail.ugc_card, Some(true));
        assert_eq!(detail.multiplex, None);
    }

    #[test]
    fn test_metric_serializes_lowercase() {
        let json = serde_json::to_string(&Metric::Screens).unwrap();
        assert_eq!(json, "\"screens\"");
    }
}
