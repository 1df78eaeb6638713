//! TopoJSON topology decoding.
//!
//! Arcs are shared between neighbouring rings. A negative arc index `!i`
//! refers to arc `i` traversed backwards. Quantized topologies store arcs as
//! integer deltas that must be accumulated and then scaled by the transform.

use std::collections::BTreeMap;

use foundation::math::LonLat;
use layers::{BoundaryFeature, Polygon, Ring};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::boundaries::{BoundaryError, push_feature};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantizeTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<QuantizeTransform>,
    pub objects: BTreeMap<String, TopoGeometry>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub arcs: Option<Value>,
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

impl TopoGeometry {
    fn name(&self) -> Option<String> {
        if let Some(name) = self
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
        {
            return Some(name.to_string());
        }
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl Topology {
    pub fn parse(payload: &str) -> Result<Self, BoundaryError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Features of object `preferred`, or of the first object when the
    /// topology has no object by that name.
    pub fn features(&self, preferred: &str) -> Result<Vec<BoundaryFeature>, BoundaryError> {
        let object = self
            .objects
            .get(preferred)
            .or_else(|| self.objects.values().next())
            .ok_or_else(|| BoundaryError::MissingObject(preferred.to_string()))?;

        let arcs = self.decoded_arcs();
        let mut out = Vec::new();
        let mut index = 0usize;
        collect(object, &arcs, &mut index, &mut out)?;
        Ok(out)
    }

    /// Arcs in absolute longitude/latitude.
    fn decoded_arcs(&self) -> Vec<Vec<LonLat>> {
        self.arcs
            .iter()
            .map(|arc| {
                let mut x = 0.0;
                let mut y = 0.0;
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            LonLat::new(
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            )
                        }
                        None => LonLat::new(p[0], p[1]),
                    })
                    .collect()
            })
            .collect()
    }
}

fn collect(
    geometry: &TopoGeometry,
    arcs: &[Vec<LonLat>],
    index: &mut usize,
    out: &mut Vec<BoundaryFeature>,
) -> Result<(), BoundaryError> {
    let at = *index;
    *index += 1;
    let invalid = |reason: String| BoundaryError::InvalidFeature { index: at, reason };

    let polygons = match geometry.kind.as_deref() {
        Some("GeometryCollection") => {
            for child in &geometry.geometries {
                collect(child, arcs, index, out)?;
            }
            return Ok(());
        }
        Some("Polygon") => {
            let refs: Vec<Vec<i64>> = arc_refs(geometry).map_err(invalid)?;
            vec![polygon(&refs, arcs)?]
        }
        Some("MultiPolygon") => {
            let refs: Vec<Vec<Vec<i64>>> = arc_refs(geometry).map_err(invalid)?;
            refs.iter()
                .map(|p| polygon(p, arcs))
                .collect::<Result<Vec<_>, _>>()?
        }
        other => {
            debug!(index = at, kind = ?other, "skipping geometry without an outline");
            return Ok(());
        }
    };

    match geometry.name() {
        Some(name) => push_feature(out, BoundaryFeature::new(name, polygons)),
        None => debug!(index = at, "skipping unnamed geometry"),
    }
    Ok(())
}

fn arc_refs<T: serde::de::DeserializeOwned>(geometry: &TopoGeometry) -> Result<T, String> {
    let value = geometry
        .arcs
        .clone()
        .ok_or("geometry missing arcs".to_string())?;
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<LonLat>]) -> Result<Polygon, BoundaryError> {
    rings.iter().map(|r| ring(r, arcs)).collect()
}

/// Stitch arcs into one ring; each arc after the first repeats the previous
/// arc's last point, which is dropped.
fn ring(refs: &[i64], arcs: &[Vec<LonLat>]) -> Result<Ring, BoundaryError> {
    let mut points: Ring = Vec::new();
    for &r in refs {
        let (i, reversed) = if r < 0 { (!r, true) } else { (r, false) };
        let arc = usize::try_from(i)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(BoundaryError::ArcOutOfRange {
                index: r,
                arcs: arcs.len(),
            })?;
        if !points.is_empty() {
            points.pop();
        }
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::Topology;
    use crate::boundaries::BoundaryError;
    use foundation::math::LonLat;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn decodes_quantized_arcs() {
        let topo = Topology::parse(
            r#"{"type":"Topology",
                "transform":{"scale":[0.5,0.25],"translate":[-10,20]},
                "objects":{"countries":{"type":"GeometryCollection","geometries":[
                    {"type":"Polygon","id":"A","arcs":[[0]]}]}},
                "arcs":[[[0,0],[8,0],[0,8],[-8,0],[0,-8]]]}"#,
        )
        .unwrap();
        let features = topo.features("countries").unwrap();
        let ring = &features[0].polygons[0][0];
        assert_eq!(ring.len(), 5);
        assert_close(ring[0].lon_deg, -10.0);
        assert_close(ring[0].lat_deg, 20.0);
        assert_close(ring[2].lon_deg, -6.0);
        assert_close(ring[2].lat_deg, 22.0);
        assert_eq!(ring[4], ring[0]);
    }

    #[test]
    fn shared_and_reversed_arcs_stitch_into_rings() {
        // Two unit squares side by side sharing the x=1 edge (arc 1).
        let topo = Topology::parse(
            r#"{"type":"Topology",
                "objects":{"land":{"type":"GeometryCollection","geometries":[
                    {"type":"Polygon","properties":{"name":"West"},"arcs":[[0,1]]},
                    {"type":"MultiPolygon","properties":{"name":"East"},"arcs":[[[2,-2]]]}]}},
                "arcs":[
                    [[1,1],[0,1],[0,0],[1,0]],
                    [[1,0],[1,1]],
                    [[1,0],[2,0],[2,1],[1,1]]
                ]}"#,
        )
        .unwrap();
        let features = topo.features("countries").unwrap();
        assert_eq!(features.len(), 2);

        let west = &features[0];
        assert_eq!(west.polygons[0][0].len(), 5);
        assert!(west.contains(LonLat::new(0.5, 0.5)));
        assert!(!west.contains(LonLat::new(1.5, 0.5)));

        let east = &features[1];
        assert_eq!(east.polygons[0][0].first(), east.polygons[0][0].last());
        assert!(east.contains(LonLat::new(1.5, 0.5)));
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let topo = Topology::parse(
            r#"{"type":"Topology","objects":{"countries":{"type":"Polygon","id":1,"arcs":[[3]]}},"arcs":[]}"#,
        )
        .unwrap();
        let err = topo.features("countries").unwrap_err();
        assert!(matches!(err, BoundaryError::ArcOutOfRange { index: 3, arcs: 0 }));
    }
}
