//! Startup loading of the event table and the country topology.
//!
//! Both payloads are fetched concurrently; if either fetch or decode fails
//! the whole startup fails and no session is built.

use dataset::DisplayNames;
use formats::{BoundaryError, RecordCsvError, RecordLoadReport, decode_boundaries, parse_records_str};
use layers::BoundarySet;
use tracing::info;

use crate::config::{DashboardConfig, Source};

#[derive(Debug)]
pub enum StartupError {
    Read { source: Source, error: std::io::Error },
    Fetch { source: Source, error: reqwest::Error },
    Records(RecordCsvError),
    Boundaries(BoundaryError),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Read { source, error } => write!(f, "failed to read {source}: {error}"),
            StartupError::Fetch { source, error } => write!(f, "failed to fetch {source}: {error}"),
            StartupError::Records(e) => write!(f, "{e}"),
            StartupError::Boundaries(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Read { error, .. } => Some(error),
            StartupError::Fetch { error, .. } => Some(error),
            StartupError::Records(e) => Some(e),
            StartupError::Boundaries(e) => Some(e),
        }
    }
}

/// Decoded startup payloads.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub records: RecordLoadReport,
    pub boundaries: BoundarySet,
}

pub async fn load_sources(config: &DashboardConfig) -> Result<LoadedSources, StartupError> {
    let http = reqwest::Client::new();
    let (records, topology) = tokio::try_join!(
        fetch_text(&http, &config.records),
        fetch_text(&http, &config.topology),
    )?;
    decode_sources(&records, &topology, &config.display_names)
}

pub fn decode_sources(
    records: &str,
    topology: &str,
    names: &DisplayNames,
) -> Result<LoadedSources, StartupError> {
    let records = parse_records_str(records, names).map_err(StartupError::Records)?;
    let boundaries = decode_boundaries(topology).map_err(StartupError::Boundaries)?;
    info!(
        records = records.records.len(),
        skipped = records.skipped,
        boundaries = boundaries.len(),
        "startup sources ready"
    );
    Ok(LoadedSources {
        records,
        boundaries,
    })
}

async fn fetch_text(http: &reqwest::Client, source: &Source) -> Result<String, StartupError> {
    match source {
        Source::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|error| StartupError::Read {
                    source: source.clone(),
                    error,
                })
        }
        Source::Url(url) => {
            let fetch = |error| StartupError::Fetch {
                source: source.clone(),
                error,
            };
            let resp = http
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(fetch)?;
            resp.text().await.map_err(fetch)
        }
    }
}
