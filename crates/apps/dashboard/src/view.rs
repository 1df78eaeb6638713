//! Render-ready snapshot of the dashboard, consumed by the drawing layer.

use compute::{Aggregates, ClusterSet, Kpis};
use layers::{ViewTransform, ViewportMode};
use serde::Serialize;

pub const GLOBAL_VIEW_LABEL: &str = "Global View";
pub const NO_DATA_LABEL: &str = "No Data Found";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    /// "Global View" or "N Selected".
    pub scope: String,
    /// Whether the filter status badge is shown.
    pub filtered: bool,
    pub impact_title: String,
    pub year_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiView {
    pub kpis: Kpis,
    pub events: String,
    pub loss: String,
}

/// Styling inputs for one country outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStyle {
    pub name: String,
    pub events: Option<usize>,
    /// Choropleth ramp position; `None` draws the "no events" fill.
    pub ramp: Option<f64>,
    /// The single selected country.
    pub highlighted: bool,
    /// Country is part of the current selection.
    pub outlined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub rendered: ViewTransform,
    pub target: ViewTransform,
    pub mode: ViewportMode,
    pub features: Vec<FeatureStyle>,
    pub back_visible: bool,
    /// Present only while a country is focused.
    pub clusters: Option<ClusterSet>,
    pub dot_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameBody {
    NoData,
    Ready {
        aggregates: Box<Aggregates>,
        map: MapView,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub status: StatusLine,
    pub kpis: KpiView,
    pub body: FrameBody,
}

impl DashboardFrame {
    pub fn aggregates(&self) -> Option<&Aggregates> {
        match &self.body {
            FrameBody::NoData => None,
            FrameBody::Ready { aggregates, .. } => Some(aggregates),
        }
    }

    pub fn map(&self) -> Option<&MapView> {
        match &self.body {
            FrameBody::NoData => None,
            FrameBody::Ready { map, .. } => Some(map),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.body, FrameBody::NoData)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
