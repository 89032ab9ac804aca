//! GeoJSON map layers.
//!
//! The choropleth layer carries every region polygon with its counts and the
//! value to shade; the marker layer carries one point per venue.

use crate::geo::JoinedRegion;
use crate::models::{Metric, Venue};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

/// Build the choropleth FeatureCollection for a metric.
pub fn choropleth_layer(joined: &[JoinedRegion], metric: Metric) -> Value {
    let features: Vec<Value> = joined
        .iter()
        .map(|region| {
            let value = region.value(metric);
            let mut properties = region.feature.properties.clone();
            properties.insert("venue_count".to_string(), json!(region.venue_count));
            properties.insert("screen_total".to_string(), json!(region.screen_total));
            properties.insert("seat_total".to_string(), json!(region.seat_total));
            properties.insert("value".to_string(), json!(value));
            properties.insert("fill_scheme".to_string(), json!(metric.color_scheme()));
            properties.insert(
                "tooltip".to_string(),
                json!(format!("Region: {}\n{}: {}", region.feature.name, metric, value)),
            );

            json!({
                "type": "Feature",
                "geometry": region.feature.geometry,
                "properties": properties,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Build the venue marker FeatureCollection.
///
/// Venues without both coordinates are skipped.
pub fn marker_layer<'a, I>(venues: I) -> Value
where
    I: IntoIterator<Item = &'a Venue>,
{
    let mut skipped = 0usize;
    let mut features = Vec::new();

    for venue in venues {
        let (Some(lat), Some(lon)) = (venue.latitude, venue.longitude) else {
            skipped += 1;
            continue;
        };

        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [lon, lat],
            },
            "properties": {
                "name": venue.name,
                "commune": venue.commune,
                "screens": venue.screens,
                "seats": venue.seats,
                "ugc_card": venue.ugc_card,
                "cinepass": venue.cinepass,
                "tooltip": marker_tooltip(venue),
            },
        }));
    }

    if skipped > 0 {
        debug!("{} venues without coordinates left off the marker layer", skipped);
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn marker_tooltip(venue: &Venue) -> String {
    fn show<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
    }
    fn yes_no(flag: Option<bool>) -> String {
        show(flag.map(|f| if f { "Yes" } else { "No" }))
    }

    format!(
        "Commune: {}\nCinema: {}\nScreens: {}\nSeats: {}\nUGC card: {}\nCinepass: {}",
        venue.commune,
        venue.name,
        show(venue.screens),
        show(venue.seats),
        yes_no(venue.ugc_card),
        yes_no(venue.cinepass),
    )
}

/// Write a layer to a file as pretty-printed GeoJSON.
pub fn write_layer(layer: &Value, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(layer)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write map layer to {}", path.display()))?;
    Ok(())
}
