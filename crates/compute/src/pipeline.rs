//! Filter-then-aggregate pass feeding every dashboard view.
//!
//! Each call is a full pass over the records; nothing is cached between
//! calls. An empty filtered set short-circuits to [`ViewSet::NoData`] so no
//! reducer ever runs on an empty group.

use dataset::{EventRecord, FilterPredicate, FilterState};
use foundation::math::{Vec2, descending_cmp_f64};
use layers::{LinearScale, LogScale, ScaleDomain, SqrtScale};
use serde::Serialize;
use tracing::debug;

use crate::analysis::rollup::{
    Count, Rollup, RollupEntry, Sum, by_country, by_display_name, by_type, group_by, rank, rollup,
};
use crate::analysis::statistics::Statistics;
use crate::analysis::temporal::{TemporalAnalysis, Trend};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_SCATTER_LIMIT: usize = 2000;

/// Severity index extent on the scatter x axis.
pub const SEVERITY_DOMAIN: [f64; 2] = [0.0, 10.0];
pub const SCATTER_AID_FALLBACK: f64 = 100_000.0;
pub const SCATTER_LOSS_FALLBACK: f64 = 1e9;
pub const SCATTER_RADIUS: [f64; 2] = [3.0, 18.0];
/// Extra pick tolerance around a scatter marker, in pixels.
pub const SCATTER_PICK_SLOP: f64 = 4.0;

/// Grouping axis of the impact breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImpactAxis {
    Country,
    /// Exactly one country is selected: compare its disaster types instead.
    Type,
}

impl ImpactAxis {
    pub fn for_state(state: &FilterState) -> Self {
        if state.single_country().is_some() {
            ImpactAxis::Type
        } else {
            ImpactAxis::Country
        }
    }

    pub fn key_of(self, record: &EventRecord) -> String {
        match self {
            ImpactAxis::Country => by_country(record),
            ImpactAxis::Type => by_type(record),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub event_count: usize,
    pub total_loss: f64,
}

/// Event count per map display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choropleth {
    pub counts: Vec<RollupEntry<String, usize>>,
    pub color: LogScale,
}

impl Choropleth {
    pub fn count_for(&self, display_name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|e| e.key == display_name)
            .map(|e| e.value)
    }

    /// Color-ramp position for a feature; `None` renders as "no events".
    pub fn ramp_for(&self, display_name: &str) -> Option<f64> {
        self.count_for(display_name)
            .and_then(|c| self.color.ramp(c as f64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactBreakdown {
    pub axis: ImpactAxis,
    pub frequency: Rollup<String, usize>,
    pub casualties: Rollup<String, f64>,
    pub loss: Rollup<String, f64>,
    pub domains: ImpactDomains,
}

/// Bar axis domain for each impact metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactDomains {
    pub frequency: ScaleDomain,
    pub casualties: ScaleDomain,
    pub loss: ScaleDomain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidShare {
    pub disaster_type: String,
    pub amount: f64,
    /// Percentage of the total aid across all types.
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidBreakdown {
    pub shares: Vec<AidShare>,
    pub color: LinearScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub country: String,
    pub disaster_type: String,
    pub year: i32,
    pub severity: f64,
    pub aid: f64,
    pub loss: f64,
}

impl ScatterPoint {
    fn from_record(r: &EventRecord) -> Self {
        Self {
            country: r.country.clone(),
            disaster_type: r.disaster_type.clone(),
            year: r.year,
            severity: r.severity,
            aid: r.aid_amount,
            loss: r.economic_loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPoint {
    pub index: usize,
    pub center: Vec2,
    pub radius: f64,
}

/// Highest-loss events plotted as severity against aid, sized by loss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    pub points: Vec<ScatterPoint>,
    pub aid_max: f64,
    pub loss_max: f64,
}

impl ScatterPlot {
    pub fn x_scale(&self, width: f64) -> LinearScale {
        LinearScale::new(
            ScaleDomain::new(SEVERITY_DOMAIN[0], SEVERITY_DOMAIN[1]),
            [0.0, width],
        )
    }

    pub fn y_scale(&self, height: f64) -> LinearScale {
        LinearScale::new(ScaleDomain::new(0.0, self.aid_max), [height, 0.0]).nice()
    }

    pub fn radius_scale(&self) -> SqrtScale {
        SqrtScale::new(ScaleDomain::new(0.0, self.loss_max), SCATTER_RADIUS)
    }

    /// Marker positions inside a plot area of `width` x `height` pixels.
    pub fn place(&self, width: f64, height: f64) -> Vec<PlacedPoint> {
        let (x, y, r) = (self.x_scale(width), self.y_scale(height), self.radius_scale());
        self.points
            .iter()
            .enumerate()
            .map(|(index, p)| PlacedPoint {
                index,
                center: Vec2::new(x.map(p.severity), y.map(p.aid)),
                radius: r.map(p.loss),
            })
            .collect()
    }

    /// Closest marker whose center is within its radius plus slop of `pointer`.
    pub fn pick(&self, width: f64, height: f64, pointer: Vec2) -> Option<&ScatterPoint> {
        let mut best: Option<(f64, usize)> = None;
        for placed in self.place(width, height) {
            let dist = placed.center.distance(pointer);
            if dist < placed.radius + SCATTER_PICK_SLOP && best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, placed.index));
            }
        }
        best.and_then(|(_, i)| self.points.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub choropleth: Choropleth,
    pub impact: ImpactBreakdown,
    pub aid: AidBreakdown,
    pub trend: Trend,
    pub scatter: ScatterPlot,
}

/// Per-view datasets, or the uniform empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewSet {
    NoData,
    Ready(Box<Aggregates>),
}

impl ViewSet {
    pub fn aggregates(&self) -> Option<&Aggregates> {
        match self {
            ViewSet::NoData => None,
            ViewSet::Ready(a) => Some(a),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ViewSet::NoData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationPipeline {
    pub top_n: usize,
    pub scatter_limit: usize,
}

impl Default for AggregationPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N, DEFAULT_SCATTER_LIMIT)
    }
}

impl AggregationPipeline {
    pub fn new(top_n: usize, scatter_limit: usize) -> Self {
        Self {
            top_n,
            scatter_limit,
        }
    }

    /// Records matching `predicate`, in their original order.
    pub fn filter<'a>(
        &self,
        records: &'a [EventRecord],
        predicate: &FilterPredicate,
    ) -> Vec<&'a EventRecord> {
        records.iter().filter(|r| predicate.matches(r)).collect()
    }

    pub fn kpis(&self, filtered: &[&EventRecord]) -> Kpis {
        Kpis {
            event_count: filtered.len(),
            total_loss: Statistics::sum(filtered.iter().map(|r| r.economic_loss)),
        }
    }

    pub fn aggregate(&self, filtered: &[&EventRecord], axis: ImpactAxis) -> ViewSet {
        if filtered.is_empty() {
            debug!("filter produced no records");
            return ViewSet::NoData;
        }

        let aggregates = Aggregates {
            choropleth: self.choropleth(filtered),
            impact: self.impact(filtered, axis),
            aid: self.aid(filtered),
            trend: TemporalAnalysis::response_time_trend(filtered),
            scatter: self.scatter(filtered),
        };
        debug!(
            records = filtered.len(),
            axis = ?axis,
            features = aggregates.choropleth.counts.len(),
            "aggregated views"
        );
        ViewSet::Ready(Box::new(aggregates))
    }

    pub fn choropleth(&self, filtered: &[&EventRecord]) -> Choropleth {
        let counts = group_by(filtered, by_display_name, &Count);
        let max = Statistics::max(counts.iter().map(|e| e.value as f64));
        Choropleth {
            counts,
            color: LogScale::new(ScaleDomain::up_to(1.0, max)),
        }
    }

    pub fn impact(&self, filtered: &[&EventRecord], axis: ImpactAxis) -> ImpactBreakdown {
        let top = Some(self.top_n);
        let key = |r: &EventRecord| axis.key_of(r);
        let frequency = rollup(filtered, key, &Count, top);
        let casualties = rollup(filtered, key, &Sum::of(|r| r.casualties as f64), top);
        let loss = rollup(filtered, key, &Sum::of(|r| r.economic_loss), top);
        ImpactBreakdown {
            axis,
            domains: ImpactDomains {
                frequency: frequency.domain(),
                casualties: casualties.domain(),
                loss: loss.domain(),
            },
            frequency,
            casualties,
            loss,
        }
    }

    /// Summed aid per disaster type, descending, with each type's share.
    pub fn aid(&self, filtered: &[&EventRecord]) -> AidBreakdown {
        let mut sums = group_by(filtered, by_type, &Sum::of(|r| r.aid_amount));
        rank(&mut sums);
        let total = Statistics::sum(sums.iter().map(|e| e.value));
        let max = Statistics::max(sums.iter().map(|e| e.value));
        let shares = sums
            .into_iter()
            .map(|e| AidShare {
                share_pct: if total > 0.0 { e.value / total * 100.0 } else { 0.0 },
                disaster_type: e.key,
                amount: e.value,
            })
            .collect();
        AidBreakdown {
            shares,
            color: LinearScale::new(ScaleDomain::up_to(0.0, max), [0.0, 1.0]),
        }
    }

    pub fn scatter(&self, filtered: &[&EventRecord]) -> ScatterPlot {
        let mut top: Vec<&EventRecord> = filtered.to_vec();
        top.sort_by(|a, b| descending_cmp_f64(a.economic_loss, b.economic_loss));
        top.truncate(self.scatter_limit);

        let nonzero = |v: Option<f64>, fallback: f64| match v {
            Some(v) if v != 0.0 => v,
            _ => fallback,
        };
        ScatterPlot {
            aid_max: nonzero(
                Statistics::max(top.iter().map(|r| r.aid_amount)),
                SCATTER_AID_FALLBACK,
            ),
            loss_max: nonzero(
                Statistics::max(top.iter().map(|r| r.economic_loss)),
                SCATTER_LOSS_FALLBACK,
            ),
            points: top.into_iter().map(ScatterPoint::from_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregationPipeline, ImpactAxis, SCATTER_AID_FALLBACK, ViewSet};
    use dataset::{Catalog, EventRecord, FilterState, YearRange};
    use foundation::math::{LonLat, Vec2};
    use pretty_assertions::assert_eq;
    use time::Date;
    use time::macros::date;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    fn event(date: Date, country: &str, ty: &str, severity: f64, loss: f64, aid: f64) -> EventRecord {
        let mut r = EventRecord::new(date, country, ty, LonLat::new(-70.6, -33.4));
        r.severity = severity;
        r.economic_loss = loss;
        r.aid_amount = aid;
        r.response_time_hours = severity * 2.0;
        r
    }

    fn chile() -> Vec<EventRecord> {
        vec![
            event(date!(2019 - 03 - 01), "Chile", "Earthquake", 8.0, 1_000_000.0, 0.0),
            event(date!(2020 - 07 - 01), "Chile", "Flood", 3.0, 500_000.0, 200_000.0),
        ]
    }

    fn mixed() -> Vec<EventRecord> {
        let mut out = chile();
        out.push(event(date!(2021 - 01 - 01), "Japan", "Earthquake", 6.0, 3_000_000.0, 50_000.0));
        out.push(event(date!(2017 - 01 - 01), "Japan", "Storm", 2.0, 10.0, 0.0));
        out.push(event(date!(2022 - 01 - 01), "Peru", "Flood", 4.0, 250_000.0, 150_000.0));
        out
    }

    #[test]
    fn single_country_scenario_groups_by_type() {
        let records = chile();
        let mut state = FilterState::new(Catalog::from_records(&records), YearRange::new(2018, 2024));
        state.set_countries(["Chile"]);
        state.set_types(Vec::<String>::new());

        let pipeline = AggregationPipeline::default();
        let filtered = pipeline.filter(&records, &state.predicate());
        assert_eq!(filtered.len(), 2);
        assert_close(pipeline.kpis(&filtered).total_loss, 1_500_000.0);

        let axis = ImpactAxis::for_state(&state);
        assert_eq!(axis, ImpactAxis::Type);
        let views = pipeline.aggregate(&filtered, axis);
        let agg = views.aggregates().unwrap();
        let keys: Vec<&String> = agg.impact.loss.keys().collect();
        assert_eq!(keys, vec!["Earthquake", "Flood"]);
    }

    #[test]
    fn zero_casualties_still_get_a_bar_domain() {
        let records = chile();
        let refs: Vec<&EventRecord> = records.iter().collect();
        let impact = AggregationPipeline::default().impact(&refs, ImpactAxis::Type);
        assert_eq!(impact.casualties.max_value(), Some(0.0));
        assert_eq!((impact.domains.casualties.lo, impact.domains.casualties.hi), (0.0, 1.0));
        assert_close(impact.domains.loss.hi, 1_000_000.0);
        assert_close(impact.domains.frequency.hi, 1.0);
    }

    #[test]
    fn filter_preserves_order_and_applies_years() {
        let records = mixed();
        let state = FilterState::new(Catalog::from_records(&records), YearRange::new(2018, 2024));
        let pipeline = AggregationPipeline::default();
        let filtered = pipeline.filter(&records, &state.predicate());
        let countries: Vec<&str> = filtered.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["Chile", "Chile", "Japan", "Peru"]);
    }

    #[test]
    fn empty_filter_is_no_data() {
        let records = mixed();
        let mut state = FilterState::new(Catalog::from_records(&records), YearRange::new(2030, 2031));
        state.select_all_types();
        let pipeline = AggregationPipeline::default();
        let filtered = pipeline.filter(&records, &state.predicate());
        assert_eq!(pipeline.aggregate(&filtered, ImpactAxis::for_state(&state)), ViewSet::NoData);
        assert_eq!(pipeline.kpis(&filtered).event_count, 0);
        assert_eq!(pipeline.kpis(&filtered).total_loss, 0.0);
    }

    #[test]
    fn per_country_loss_sums_to_total() {
        let records = mixed();
        let refs: Vec<&EventRecord> = records.iter().collect();
        let pipeline = AggregationPipeline::default();
        let impact = pipeline.impact(&refs, ImpactAxis::Country);
        let summed: f64 = impact.loss.entries().iter().map(|e| e.value).sum();
        assert_close(summed, pipeline.kpis(&refs).total_loss);
        let counted: usize = impact.frequency.entries().iter().map(|e| e.value).sum();
        assert_eq!(counted, refs.len());
    }

    #[test]
    fn aid_shares_are_ranked_and_sum_to_hundred() {
        let records = mixed();
        let refs: Vec<&EventRecord> = records.iter().collect();
        let aid = AggregationPipeline::default().aid(&refs);
        let types: Vec<&str> = aid.shares.iter().map(|s| s.disaster_type.as_str()).collect();
        assert_eq!(types, vec!["Flood", "Earthquake", "Storm"]);
        assert_close(aid.shares.iter().map(|s| s.share_pct).sum(), 100.0);
        assert_close(aid.shares[0].share_pct, 87.5);
    }

    #[test]
    fn choropleth_counts_by_display_name() {
        let mut records = mixed();
        for r in &mut records {
            if r.country == "Japan" {
                r.display_name = "Nippon".to_string();
            }
        }
        let refs: Vec<&EventRecord> = records.iter().collect();
        let map = AggregationPipeline::default().choropleth(&refs);
        assert_eq!(map.count_for("Nippon"), Some(2));
        assert_eq!(map.count_for("Japan"), None);
        assert_eq!(map.ramp_for("Nippon"), Some(1.0));
        assert_eq!(map.ramp_for("Peru"), Some(0.0));
    }

    #[test]
    fn scatter_keeps_top_losses_and_picks_nearest() {
        let records = mixed();
        let refs: Vec<&EventRecord> = records.iter().collect();
        let scatter = AggregationPipeline::new(5, 2).scatter(&refs);
        assert_eq!(scatter.points.len(), 2);
        assert_eq!(scatter.points[0].country, "Japan");
        assert_eq!(scatter.points[1].disaster_type, "Earthquake");
        assert_close(scatter.aid_max, 50_000.0);

        let placed = scatter.place(100.0, 100.0);
        assert_close(placed[0].center.x, 60.0);
        assert_close(placed[0].radius, 18.0);

        let hit = scatter.pick(100.0, 100.0, placed[1].center + Vec2::new(1.0, 0.0));
        assert_eq!(hit.map(|p| p.country.as_str()), Some("Chile"));
        assert!(scatter.pick(100.0, 100.0, Vec2::new(-100.0, -100.0)).is_none());
    }

    #[test]
    fn scatter_without_aid_uses_fallback_domain() {
        let records = chile();
        let refs: Vec<&EventRecord> = records.iter().take(1).collect();
        let scatter = AggregationPipeline::default().scatter(&refs);
        assert_eq!(scatter.aid_max, SCATTER_AID_FALLBACK);
    }
}
