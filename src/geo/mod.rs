//! Region boundary geometry.
//!
//! Loads the GeoJSON boundary dataset, joins region summaries onto it, and
//! builds the map layers consumed by a renderer.

pub mod join;
pub mod layers;

pub use join::{join_with_geometry, JoinedRegion};
pub use layers::{choropleth_layer, marker_layer, write_layer};

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading the boundary dataset.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to read boundary file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a FeatureCollection, found '{0}'")]
    NotFeatureCollection(String),

    #[error("feature {index} has no string property '{property}'")]
    MissingName { index: usize, property: String },
}

/// One region polygon from the boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Official region name, read from the name property.
    pub name: String,
    /// Geometry object, kept as-is.
    pub geometry: Value,
    /// All feature properties, including the name property.
    pub properties: Map<String, Value>,
}

/// The boundary dataset, one feature per region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    pub features: Vec<BoundaryFeature>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Value,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

impl BoundarySet {
    /// Load a boundary dataset from a GeoJSON file.
    pub fn load(path: &Path, name_property: &str) -> Result<Self, GeoError> {
        info!("Loading region boundaries: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| GeoError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let set = Self::from_geojson(&content, name_property)?;
        info!("Loaded {} region boundaries", set.features.len());
        Ok(set)
    }

    /// Parse a GeoJSON FeatureCollection keyed by `name_property`.
    pub fn from_geojson(text: &str, name_property: &str) -> Result<Self, GeoError> {
        let raw: RawCollection = serde_json::from_str(text)?;

        if raw.kind != "FeatureCollection" {
            return Err(GeoError::NotFeatureCollection(raw.kind));
        }

        let features = raw
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| -> Result<BoundaryFeature, GeoError> {
                let properties = feature.properties.unwrap_or_default();
                let name = properties
                    .get(name_property)
                    .and_then(Value::as_str)
                    .ok_or_else(|| GeoError::MissingName {
                        index,
                        property: name_property.to_string(),
                    })?
                    .to_string();

                Ok(BoundaryFeature {
                    name,
                    geometry: feature.geometry,
                    properties,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { features })
    }

    /// Region names, in dataset order.
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }
}
