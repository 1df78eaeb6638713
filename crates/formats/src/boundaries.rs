//! Country outline decoding.
//!
//! Accepts either a TopoJSON topology (the world atlas layout, object
//! `countries`) or a plain GeoJSON `FeatureCollection`.

use layers::{BoundaryFeature, BoundarySet};
use serde_json::Value;
use tracing::info;

use crate::{geojson, topojson};

/// Object name looked up first when the payload is a topology.
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "countries";

#[derive(Debug)]
pub enum BoundaryError {
    Json(serde_json::Error),
    UnsupportedPayload(String),
    MissingObject(String),
    InvalidFeature { index: usize, reason: String },
    ArcOutOfRange { index: i64, arcs: usize },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::Json(e) => write!(f, "invalid boundary JSON: {e}"),
            BoundaryError::UnsupportedPayload(ty) => {
                write!(f, "expected Topology or FeatureCollection, got `{ty}`")
            }
            BoundaryError::MissingObject(name) => {
                write!(f, "topology has no object named `{name}`")
            }
            BoundaryError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            BoundaryError::ArcOutOfRange { index, arcs } => {
                write!(f, "arc index {index} out of range (topology has {arcs} arcs)")
            }
        }
    }
}

impl std::error::Error for BoundaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoundaryError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BoundaryError {
    fn from(e: serde_json::Error) -> Self {
        BoundaryError::Json(e)
    }
}

/// Decode outlines from either supported JSON layout.
pub fn decode_boundaries(payload: &str) -> Result<BoundarySet, BoundaryError> {
    let value: Value = serde_json::from_str(payload)?;
    let ty = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let features = match ty.as_str() {
        "Topology" => {
            let topology: topojson::Topology = serde_json::from_value(value)?;
            topology.features(DEFAULT_TOPOLOGY_OBJECT)?
        }
        "FeatureCollection" => geojson::features_from_value(&value)?,
        _ => return Err(BoundaryError::UnsupportedPayload(ty)),
    };

    info!(features = features.len(), kind = %ty, "decoded boundaries");
    Ok(BoundarySet::new(features))
}

/// Keep only the features that actually carry an outline.
pub(crate) fn push_feature(out: &mut Vec<BoundaryFeature>, feature: BoundaryFeature) {
    if feature.polygons.iter().any(|p| !p.is_empty()) {
        out.push(feature);
    }
}
