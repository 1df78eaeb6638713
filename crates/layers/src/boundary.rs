use foundation::bounds::Aabb2;
use foundation::math::{LonLat, MercatorProjection};

/// Closed ring of positions; a trailing duplicate of the first point is allowed.
pub type Ring = Vec<LonLat>;

/// Polygon as an outer ring followed by its holes.
pub type Polygon = Vec<Ring>;

/// A named geographic area (one country of the world topology).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl BoundaryFeature {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            polygons,
        }
    }

    /// Point-in-polygon test in longitude/latitude space (even-odd rule,
    /// so holes are excluded).
    pub fn contains(&self, p: LonLat) -> bool {
        self.polygons.iter().any(|polygon| {
            polygon
                .iter()
                .filter(|ring| ring_crosses(ring, p))
                .count()
                % 2
                == 1
        })
    }

    /// Bounding box of every vertex after projection into map pixels.
    pub fn projected_bounds(&self, projection: &MercatorProjection) -> Option<Aabb2> {
        Aabb2::from_points(
            self.polygons
                .iter()
                .flatten()
                .flatten()
                .map(|p| projection.project(*p)),
        )
    }
}

/// Whether a ray cast east from `p` crosses `ring` an odd number of times.
fn ring_crosses(ring: &[LonLat], p: LonLat) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.lat_deg > p.lat_deg) != (b.lat_deg > p.lat_deg) {
            let t = (p.lat_deg - a.lat_deg) / (b.lat_deg - a.lat_deg);
            let lon_at = a.lon_deg + t * (b.lon_deg - a.lon_deg);
            if p.lon_deg < lon_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// All boundary features of a topology, looked up by display name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundarySet {
    features: Vec<BoundaryFeature>,
}

impl BoundarySet {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryFeature> {
        self.features.iter()
    }

    pub fn find(&self, name: &str) -> Option<&BoundaryFeature> {
        self.features.iter().find(|f| f.name == name)
    }
}
