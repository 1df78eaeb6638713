use dataset::EventRecord;
use layers::symbology::upper_or_one;
use serde::Serialize;

use super::rollup::{Mean, group_by};
use super::statistics::Statistics;

/// Headroom above the highest point of a trend line.
pub const TREND_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Trend {
    /// Fewer than two years carry a value; no line can be drawn.
    Insufficient,
    /// `y_max` is 1 when every point is zero.
    Series { points: Vec<TrendPoint>, y_max: f64 },
}

impl Trend {
    pub fn points(&self) -> &[TrendPoint] {
        match self {
            Trend::Insufficient => &[],
            Trend::Series { points, .. } => points,
        }
    }
}

pub struct TemporalAnalysis;

impl TemporalAnalysis {
    /// Mean of `measure` per year, ascending by year. Years where no record
    /// has a value are left out.
    pub fn yearly_mean(
        records: &[&EventRecord],
        measure: impl Fn(&EventRecord) -> f64,
    ) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = group_by(records, |r| r.year, &Mean::of(measure))
            .into_iter()
            .filter_map(|e| e.value.map(|value| TrendPoint { year: e.key, value }))
            .collect();
        points.sort_by_key(|p| p.year);
        points
    }

    pub fn response_time_trend(records: &[&EventRecord]) -> Trend {
        let points = Self::yearly_mean(records, |r| r.response_time_hours);
        if points.len() < 2 {
            return Trend::Insufficient;
        }
        let y_max = upper_or_one(
            Statistics::max(points.iter().map(|p| p.value)).map(|max| max * TREND_HEADROOM),
        );
        Trend::Series { points, y_max }
    }
}
