//! Coordinate clustering for the focused map view.
//!
//! Records are binned on a 0.1 degree grid. Cluster identity does not survive
//! a recompute; every filter or focus change rebuilds the set from scratch.

use std::collections::BTreeMap;
use std::fmt;

use dataset::EventRecord;
use foundation::math::LonLat;
use layers::{BoundaryFeature, LogScale, ScaleDomain, SqrtScale};
use serde::Serialize;
use tracing::debug;

use crate::analysis::statistics::Statistics;

pub const CLUSTER_RADIUS_RANGE: [f64; 2] = [1.5, 6.0];
pub const MIN_DOT_RADIUS: f64 = 1.5;
pub const DOT_RADIUS_AT_UNIT_SCALE: f64 = 3.5;

/// Grid cell of a cluster, in tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClusterKey {
    pub lat_tenths: i64,
    pub lng_tenths: i64,
}

impl ClusterKey {
    /// `None` for coordinates that cannot be binned.
    pub fn of(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        Some(Self {
            lat_tenths: tenths(lat)?,
            lng_tenths: tenths(lng)?,
        })
    }
}

/// `v` rounded to one decimal from its exact binary value, in tenths.
/// Exact ties (odd multiples of 0.25) round away from zero.
fn tenths(v: f64) -> Option<i64> {
    let quarters = v.abs() * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        return Some((v.abs() * 10.0).ceil().copysign(v) as i64);
    }
    format!("{v:.1}").replace('.', "").parse().ok()
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1},{:.1}",
            self.lat_tenths as f64 / 10.0,
            self.lng_tenths as f64 / 10.0
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub key: ClusterKey,
    pub count: usize,
    /// Position of the first member.
    pub lat: f64,
    pub lng: f64,
    pub total_loss: f64,
    pub mean_severity: Option<f64>,
    pub dominant_type: String,
}

impl Cluster {
    pub fn location(&self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }

    fn from_members(key: ClusterKey, members: &[&EventRecord]) -> Option<Self> {
        let first = members.first()?;
        Some(Self {
            key,
            count: members.len(),
            lat: first.latitude,
            lng: first.longitude,
            total_loss: Statistics::sum(members.iter().map(|r| r.economic_loss)),
            mean_severity: Statistics::mean(members.iter().map(|r| r.severity)),
            dominant_type: dominant_type(members)?,
        })
    }
}

/// Most frequent type; a tie goes to the type seen first.
fn dominant_type(members: &[&EventRecord]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for r in members {
        match counts.iter_mut().find(|(t, _)| *t == r.disaster_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.disaster_type.as_str(), 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (t, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((t, n));
        }
    }
    best.map(|(t, _)| t.to_string())
}

/// Rendering scales relative to the clusters currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterScales {
    pub radius: SqrtScale,
    pub color: LogScale,
    /// Smallest and largest member count, for the legend.
    pub count_extent: Option<(usize, usize)>,
}

impl ClusterScales {
    fn for_clusters(clusters: &[Cluster]) -> Self {
        let extent = Statistics::min_max(clusters.iter().map(|c| c.count as f64));
        let max = extent.map(|(_, hi)| hi);
        Self {
            radius: SqrtScale::new(ScaleDomain::up_to(0.0, max), CLUSTER_RADIUS_RANGE),
            color: LogScale::new(ScaleDomain::up_to(1.0, max)),
            count_extent: extent.map(|(lo, hi)| (lo as usize, hi as usize)),
        }
    }

    /// Color-ramp position for a cluster.
    pub fn ramp(&self, cluster: &Cluster) -> f64 {
        self.color.ramp(cluster.count.max(1) as f64).unwrap_or(0.0)
    }
}

/// Dot radius at zoom scale `k`; dots shrink as the map zooms in.
pub fn dot_radius(k: f64) -> f64 {
    (DOT_RADIUS_AT_UNIT_SCALE / k.sqrt()).max(MIN_DOT_RADIUS)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,
    pub scales: ClusterScales,
}

impl ClusterSet {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, key: ClusterKey) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.key == key)
    }
}

pub struct SpatialClusterer;

impl SpatialClusterer {
    /// Group `records` into grid clusters, in first-seen order. With a
    /// `boundary`, clusters whose first member lies outside it are dropped.
    pub fn cluster(records: &[&EventRecord], boundary: Option<&BoundaryFeature>) -> ClusterSet {
        let mut index: BTreeMap<ClusterKey, usize> = BTreeMap::new();
        let mut groups: Vec<(ClusterKey, Vec<&EventRecord>)> = Vec::new();
        let mut unplaced = 0usize;
        for &r in records {
            let Some(key) = ClusterKey::of(r.latitude, r.longitude) else {
                unplaced += 1;
                continue;
            };
            match index.get(&key) {
                Some(&slot) => groups[slot].1.push(r),
                None => {
                    index.insert(key, groups.len());
                    groups.push((key, vec![r]));
                }
            }
        }

        let clusters: Vec<Cluster> = groups
            .iter()
            .filter_map(|(key, members)| Cluster::from_members(*key, members))
            .filter(|c| boundary.is_none_or(|b| b.contains(c.location())))
            .collect();

        debug!(
            records = records.len(),
            unplaced,
            groups = groups.len(),
            clusters = clusters.len(),
            boundary = boundary.map(|b| b.name.as_str()),
            "clustered events"
        );
        ClusterSet {
            scales: ClusterScales::for_clusters(&clusters),
            clusters,
        }
    }
}
