//! Event table ingestion.
//!
//! Rows without a parseable ISO date or a numeric latitude are dropped and
//! counted; they never reach the filter engine.

use std::io;

use dataset::{DisplayNames, EventRecord};
use time::Date;
use time::macros::format_description;
use tracing::{debug, info};

pub const REQUIRED_COLUMNS: [&str; 11] = [
    "date",
    "country",
    "disaster_type",
    "severity_index",
    "response_efficiency_score",
    "casualties",
    "response_time_hours",
    "economic_loss_usd",
    "aid_amount_usd",
    "latitude",
    "longitude",
];

#[derive(Debug)]
pub enum RecordCsvError {
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for RecordCsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordCsvError::Csv(e) => write!(f, "failed to read event table: {e}"),
            RecordCsvError::MissingColumn(name) => {
                write!(f, "event table is missing column `{name}`")
            }
        }
    }
}

impl std::error::Error for RecordCsvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordCsvError::Csv(e) => Some(e),
            RecordCsvError::MissingColumn(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordLoadReport {
    pub records: Vec<EventRecord>,
    /// Rows dropped for a bad date or latitude.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns([usize; 11]);

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, RecordCsvError> {
        let mut idx = [0usize; 11];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(RecordCsvError::MissingColumn(name))?;
        }
        Ok(Self(idx))
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, column: usize) -> &'r str {
        row.get(self.0[column]).unwrap_or("")
    }
}

pub fn parse_records_str(payload: &str, names: &DisplayNames) -> Result<RecordLoadReport, RecordCsvError> {
    read_records(payload.as_bytes(), names)
}

pub fn read_records<R: io::Read>(
    reader: R,
    names: &DisplayNames,
) -> Result<RecordLoadReport, RecordCsvError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers().map_err(RecordCsvError::Csv)?)?;

    let mut report = RecordLoadReport::default();
    for (line, row) in rdr.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                debug!(line, %err, "skipping unreadable row");
                report.skipped += 1;
                continue;
            }
        };
        match parse_row(&columns, &row, names) {
            Some(record) => report.records.push(record),
            None => {
                debug!(line, "skipping row without a valid date or latitude");
                report.skipped += 1;
            }
        }
    }

    info!(
        kept = report.records.len(),
        skipped = report.skipped,
        "loaded event records"
    );
    Ok(report)
}

fn parse_row(columns: &Columns, row: &csv::StringRecord, names: &DisplayNames) -> Option<EventRecord> {
    let date = parse_date(columns.get(row, 0))?;
    let latitude = parse_number(columns.get(row, 9)).filter(|v| !v.is_nan())?;

    let country = columns.get(row, 1).to_string();
    let display_name = names.display_name(&country).to_string();
    let casualties = parse_number(columns.get(row, 5))
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0);
    let aid_amount = parse_number(columns.get(row, 8))
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0);

    Some(EventRecord {
        date,
        year: date.year(),
        country,
        display_name,
        disaster_type: columns.get(row, 2).to_string(),
        severity: measure(columns.get(row, 3)),
        response_efficiency: measure(columns.get(row, 4)),
        casualties,
        response_time_hours: measure(columns.get(row, 6)),
        economic_loss: measure(columns.get(row, 7)),
        aid_amount,
        latitude,
        longitude: measure(columns.get(row, 10)),
    })
}

fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Missing or malformed measures are NaN; reducers skip them, so a blank
/// cell is left out of a mean instead of counting as zero.
fn measure(s: &str) -> f64 {
    parse_number(s).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::{RecordCsvError, parse_records_str};
    use dataset::DisplayNames;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "date,country,disaster_type,severity_index,response_efficiency_score,casualties,response_time_hours,economic_loss_usd,aid_amount_usd,latitude,longitude";

    fn table(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out
    }

    #[test]
    fn parses_complete_row() {
        let csv = table(&["2019-06-12,Chile,Earthquake,8,72.5,14,36,1000000,0,-33.4,-70.6"]);
        let report = parse_records_str(&csv, &DisplayNames::builtin()).unwrap();
        assert_eq!(report.skipped, 0);
        let r = &report.records[0];
        assert_eq!(r.year, 2019);
        assert_eq!(r.country, "Chile");
        assert_eq!(r.display_name, "Chile");
        assert_eq!(r.disaster_type, "Earthquake");
        assert_eq!(r.severity, 8.0);
        assert_eq!(r.casualties, 14);
        assert_eq!(r.economic_loss, 1_000_000.0);
        assert_eq!(r.latitude, -33.4);
        assert_eq!(r.longitude, -70.6);
    }

    #[test]
    fn drops_rows_with_bad_date_or_latitude() {
        let csv = table(&[
            "2019-02-30,Chile,Flood,3,1,1,1,1,1,-33.4,-70.6",
            "not-a-date,Chile,Flood,3,1,1,1,1,1,-33.4,-70.6",
            "2019-06-12,Chile,Flood,3,1,1,1,1,1,north,-70.6",
            "2019-06-12,Chile,Flood,3,1,1,1,1,1,,-70.6",
            "2020-01-01,Japan,Storm,5,1,1,1,1,1,35.6,139.7",
        ]);
        let report = parse_records_str(&csv, &DisplayNames::builtin()).unwrap();
        assert_eq!(report.skipped, 4);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].country, "Japan");
    }

    #[test]
    fn missing_casualties_and_aid_default_to_zero() {
        let csv = table(&["2020-01-01,Japan,Storm,5,1,,12,500,n/a,35.6,139.7"]);
        let report = parse_records_str(&csv, &DisplayNames::builtin()).unwrap();
        let r = &report.records[0];
        assert_eq!(r.casualties, 0);
        assert_eq!(r.aid_amount, 0.0);
    }

    #[test]
    fn blank_measures_are_not_numbers() {
        let csv = table(&["2020-01-01,Japan,Storm,,1,3,,500,1,35.6,139.7"]);
        let report = parse_records_str(&csv, &DisplayNames::builtin()).unwrap();
        let r = &report.records[0];
        assert!(r.severity.is_nan());
        assert!(r.response_time_hours.is_nan());
        assert_eq!(r.casualties, 3);
    }

    #[test]
    fn unmapped_country_keeps_raw_label() {
        let csv = table(&["2020-01-01,Atlantis,Storm,5,1,1,12,500,1,35.6,139.7"]);
        let names = DisplayNames::from_pairs([("USA", "United States of America")]);
        let report = parse_records_str(&csv, &names).unwrap();
        assert_eq!(report.records[0].display_name, "Atlantis");
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse_records_str("date,country\n2020-01-01,Chile", &DisplayNames::builtin())
            .unwrap_err();
        assert!(matches!(err, RecordCsvError::MissingColumn("disaster_type")));
    }
}
