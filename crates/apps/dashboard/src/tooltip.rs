//! Tooltip HTML for each view. Anchors are supplied by the caller.

use compute::{AidShare, Cluster, ImpactAxis};
use compute::analysis::temporal::TrendPoint;

use crate::format::{format_hours, format_si, format_usd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBand {
    Low,
    Moderate,
    High,
}

impl SeverityBand {
    pub fn of(severity: f64) -> Self {
        if severity > 7.0 {
            SeverityBand::High
        } else if severity > 4.0 {
            SeverityBand::Moderate
        } else {
            SeverityBand::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SeverityBand::High => "#d32f2f",
            SeverityBand::Moderate => "#f57c00",
            SeverityBand::Low => "#388e3c",
        }
    }
}

/// Impact metric shown in a bar tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactMetric {
    Frequency,
    Casualties,
    Loss,
}

impl ImpactMetric {
    pub fn title(self) -> &'static str {
        match self {
            ImpactMetric::Frequency => "Frequency",
            ImpactMetric::Casualties => "Casualties",
            ImpactMetric::Loss => "Loss ($)",
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            ImpactMetric::Frequency => format!("{value}"),
            _ => format_si(value, 2),
        }
    }
}

pub fn country_html(name: &str, events: usize) -> String {
    format!("<b>{}</b><br>Total Events: {events}", escape(name))
}

pub fn cluster_html(cluster: &Cluster) -> String {
    let severity = match cluster.mean_severity {
        Some(s) => format!(
            "<b style=\"color:{}\">{s:.1}</b>",
            SeverityBand::of(s).color()
        ),
        None => "<b>n/a</b>".to_string(),
    };
    format!(
        "<b>Location Cluster</b><br>Events: <b>{}</b><br>Main Type: <b>{}</b><br>Avg Severity: {severity}<br>Total Loss: {}",
        cluster.count,
        escape(&cluster.dominant_type),
        format_usd(cluster.total_loss),
    )
}

pub fn impact_html(key: &str, metric: ImpactMetric, value: f64) -> String {
    format!(
        "<b>{}</b><br>{}: {}",
        escape(key),
        metric.title(),
        metric.format(value)
    )
}

pub fn aid_html(share: &AidShare) -> String {
    format!(
        "<b>{}</b><br>Aid: <b>{}</b><br>Share: <b>{:.1}%</b>",
        escape(&share.disaster_type),
        format_usd(share.amount),
        share.share_pct
    )
}

pub fn trend_html(point: &TrendPoint) -> String {
    format!("Avg: {}", format_hours(point.value))
}

pub fn impact_title(axis: ImpactAxis, single_country: Option<&str>, top_n: usize) -> String {
    match (axis, single_country) {
        (ImpactAxis::Type, Some(country)) => format!("Impact Prioritization by Type - {country}"),
        _ => format!("Impact Analysis (Top {top_n} Countries)"),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
