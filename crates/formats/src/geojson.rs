use layers::{BoundaryFeature, Polygon, Ring};
use foundation::math::LonLat;
use serde_json::Value;

use crate::boundaries::{BoundaryError, push_feature};

/// Parse a GeoJSON `FeatureCollection` into named outlines.
///
/// Only `Polygon` and `MultiPolygon` geometries carry an outline; other
/// geometry kinds and null geometries are skipped. The name comes from
/// `properties.name`, falling back to the feature `id`.
pub fn features_from_value(value: &Value) -> Result<Vec<BoundaryFeature>, BoundaryError> {
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| BoundaryError::UnsupportedPayload("FeatureCollection without features".into()))?;

    let mut out = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let invalid = |reason: String| BoundaryError::InvalidFeature { index, reason };
        let Some(name) = feature_name(feature) else {
            continue;
        };
        let polygons = match feature.get("geometry") {
            None | Some(Value::Null) => continue,
            Some(geometry) => match parse_geometry(geometry).map_err(invalid)? {
                Some(polygons) => polygons,
                None => continue,
            },
        };
        push_feature(&mut out, BoundaryFeature::new(name, polygons));
    }
    Ok(out)
}

fn feature_name(feature: &Value) -> Option<String> {
    if let Some(name) = feature
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
    {
        return Some(name.to_string());
    }
    match feature.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(value: &Value) -> Result<Option<Vec<Polygon>>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = || {
        obj.get("coordinates")
            .ok_or("geometry missing coordinates".to_string())
    };

    match ty {
        "Polygon" => Ok(Some(vec![parse_polygon(coords()?)?])),
        "MultiPolygon" => Ok(Some(parse_multi_polygon(coords()?)?)),
        _ => Ok(None),
    }
}

fn parse_position(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Polygon>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}

#[cfg(test)]
mod tests {
    use super::features_from_value;
    use crate::boundaries::BoundaryError;
    use foundation::math::LonLat;
    use serde_json::json;

    #[test]
    fn reads_polygons_and_skips_other_geometry() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "PT", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "id": 32, "properties": null,
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[10, 10], [12, 10], [12, 12], [10, 12], [10, 10]]]
                 ]}},
                {"type": "Feature", "properties": {"name": "Empty"}, "geometry": null}
            ]
        });
        let features = features_from_value(&fc).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "32");
        assert_eq!(features[0].polygons.len(), 2);
        assert!(features[0].contains(LonLat::new(11.0, 11.0)));
    }

    #[test]
    fn reports_bad_coordinates_with_index() {
        let fc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Bad"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, "x"]]]}}
            ]
        });
        let err = features_from_value(&fc).unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidFeature { index: 0, .. }));
    }
}
