//! Venue table loading.
//!
//! Reads the CSV export of the venue spreadsheet into [`Venue`] records.
//! Columns are located by header name, so column order does not matter and
//! unrecognised columns are ignored.

use crate::models::Venue;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const COL_NAME: &str = "nom";
pub const COL_COMMUNE: &str = "commune";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_REGION: &str = "région administrative";
pub const COL_SCREENS: &str = "écrans";
pub const COL_SEATS: &str = "fauteuils";
pub const COL_SESSIONS_2020: &str = "séances 2020";
pub const COL_ADMISSIONS_2020: &str = "entrées 2020";
pub const COL_ADMISSIONS_2019: &str = "entrées 2019";
pub const COL_ADMISSIONS_CHANGE: &str = "évolution entrées 2020/2019";
pub const COL_FILMS_2020: &str = "nombre de films programmés 2020";
pub const COL_NEW_FILMS_2020: &str = "nombre de films inédits 2020";
pub const COL_COMMUNE_POPULATION: &str = "population de la commune (2015)";
pub const COL_URBAN_UNIT_POPULATION: &str = "population unité urbaine (2015)";
pub const COL_MULTIPLEX: &str = "multiplexe";
pub const COL_ART_ET_ESSAI: &str = "Art et Essai";
pub const COL_GENRE: &str = "genre";
pub const COL_UGC_CARD: &str = "carte ugc";
pub const COL_CINEPASS: &str = "cinepass";

/// Errors raised while loading the venue table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open venue table {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed venue table: {0}")]
    Csv(#[from] csv::Error),

    #[error("venue table is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("invalid {kind} '{value}' at line {line}, column '{column}'")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
        kind: &'static str,
    },
}

/// Options for reading the venue table.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Load venues from a CSV file.
pub fn load_venues(path: &Path, options: &LoadOptions) -> Result<Vec<Venue>, LoadError> {
    info!("Loading venue table: {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    read_venues(file, options)
}

/// Read venues from any CSV source.
pub fn read_venues<R: Read>(reader: R, options: &LoadOptions) -> Result<Vec<Venue>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;
    debug!("Venue table headers: {:?}", headers);

    let mut venues = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        venues.push(layout.venue(&record, line)?);
    }

    info!("Loaded {} venues", venues.len());
    Ok(venues)
}

/// Position of each known column in the header row.
#[derive(Debug)]
struct ColumnLayout {
    name: usize,
    region: usize,
    screens: usize,
    seats: usize,
    commune: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    sessions_2020: Option<usize>,
    admissions_2020: Option<usize>,
    admissions_2019: Option<usize>,
    admissions_change: Option<usize>,
    films_2020: Option<usize>,
    new_films_2020: Option<usize>,
    commune_population: Option<usize>,
    urban_unit_population: Option<usize>,
    multiplex: Option<usize>,
    art_et_essai: Option<usize>,
    genre: Option<usize>,
    ugc_card: Option<usize>,
    cinepass: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == column)
        };
        let require =
            |column: &'static str| find(column).ok_or(LoadError::MissingColumn { column });

        // Required: nom, région administrative, écrans, fauteuils.

        Ok(Self {
            name: require(COL_NAME)?,
            region: require(COL_REGION)?,
            screens: require(COL_SCREENS)?,
            seats: require(COL_SEATS)?,
            commune: find(COL_COMMUNE),
            latitude: find(COL_LATITUDE),
            longitude: find(COL_LONGITUDE),
            sessions_2020: find(COL_SESSIONS_2020),
            admissions_2020: find(COL_ADMISSIONS_2020),
            admissions_2019: find(COL_ADMISSIONS_2019),
            admissions_change: find(COL_ADMISSIONS_CHANGE),
            films_2020: find(COL_FILMS_2020),
            new_films_2020: find(COL_NEW_FILMS_2020),
            commune_population: find(COL_COMMUNE_POPULATION),
            urban_unit_population: find(COL_URBAN_UNIT_POPULATION),
            multiplex: find(COL_MULTIPLEX),
            art_et_essai: find(COL_ART_ET_ESSAI),
            genre: find(COL_GENRE),
            ugc_card: find(COL_UGC_CARD),
            cinepass: find(COL_CINEPASS),
        })
    }

    fn venue(&self, record: &StringRecord, line: u64) -> Result<Venue, LoadError> {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|value| !value.is_empty())
        };
        let count = |idx: Option<usize>, column: &'static str| {
            cell(idx).map(|v| parse_count(v, line, column)).transpose()
        };
        let float = |idx: Option<usize>, column: &'static str| {
            cell(idx).map(|v| parse_float(v, line, column)).transpose()
        };
        let flag = |idx: Option<usize>, column: &'static str| {
            cell(idx).and_then(|v| parse_flag(v, line, column))
        };

        Ok(Venue {
            name: cell(Some(self.name)).unwrap_or_default().to_string(),
            commune: cell(self.commune).unwrap_or_default().to_string(),
            latitude: float(self.latitude, COL_LATITUDE)?,
            longitude: float(self.longitude, COL_LONGITUDE)?,
            region: cell(Some(self.region)).map(String::from),
            screens: count(Some(self.screens), COL_SCREENS)?,
            seats: count(Some(self.seats), COL_SEATS)?,
            sessions_2020: count(self.sessions_2020, COL_SESSIONS_2020)?,
            admissions_2020: count(self.admissions_2020, COL_ADMISSIONS_2020)?,
            admissions_2019: count(self.admissions_2019, COL_ADMISSIONS_2019)?,
            admissions_change: float(self.admissions_change, COL_ADMISSIONS_CHANGE)?,
            films_2020: count(self.films_2020, COL_FILMS_2020)?,
            new_films_2020: count(self.new_films_2020, COL_NEW_FILMS_2020)?,
            commune_population: count(self.commune_population, COL_COMMUNE_POPULATION)?,
            urban_unit_population: count(self.urban_unit_population, COL_URBAN_UNIT_POPULATION)?,
            multiplex: flag(self.multiplex, COL_MULTIPLEX),
            art_et_essai: flag(self.art_et_essai, COL_ART_ET_ESSAI),
            genre: cell(self.genre).map(String::from),
            ugc_card: flag(self.ugc_card, COL_UGC_CARD),
            cinepass: flag(self.cinepass, COL_CINEPASS),
        })
    }
}

/// Parse a non-negative integer count.
///
/// Spreadsheet exports often write integers as `12.0`; integral floats are accepted.
fn parse_count(value: &str, line: u64, column: &'static str) -> Result<u64, LoadError> {
    if let Ok(n) = value.parse::<u64>() {
        return Ok(n);
    }

    let invalid = || LoadError::InvalidValue {
        line,
        column,
        value: value.to_string(),
        kind: "count",
    };

    let float = value.replace(',', ".").parse::<f64>().map_err(|_| invalid())?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
        Ok(float as u64)
    } else {
        Err(invalid())
    }
}

/// Parse a decimal number, accepting a comma as decimal separator.
fn parse_float(value: &str, line: u64, column: &'static str) -> Result<f64, LoadError> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| LoadError::InvalidValue {
            line,
            column,
            value: value.to_string(),
            kind: "number",
        })
}

/// Parse a yes/no flag. Unrecognised values are treated as missing.
fn parse_flag(value: &str, line: u64, column: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "oui" | "yes" | "true" | "1" | "x" | "o" | "y" => Some(true),
        "non" | "no" | "false" | "0" | "n" => Some(false),
        other => {
            debug!("Unrecognised flag '{}' at line {}, column '{}'", other, line, column);
            None
        }
    }
}
