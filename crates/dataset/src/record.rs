use foundation::math::LonLat;
use time::Date;

/// One disaster event. Parsed once at load time and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub date: Date,
    pub year: i32,
    /// Raw country label as it appears in the source table.
    pub country: String,
    /// Label used to look the country up in the boundary topology.
    pub display_name: String,
    pub disaster_type: String,
    /// Severity index, 0–10.
    pub severity: f64,
    pub response_efficiency: f64,
    pub casualties: u64,
    pub response_time_hours: f64,
    /// Economic loss in USD.
    pub economic_loss: f64,
    /// Aid amount in USD.
    pub aid_amount: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl EventRecord {
    /// A record at `date` with all measures zeroed; `display_name` starts as `country`.
    pub fn new(
        date: Date,
        country: impl Into<String>,
        disaster_type: impl Into<String>,
        location: LonLat,
    ) -> Self {
        let country = country.into();
        Self {
            date,
            year: date.year(),
            display_name: country.clone(),
            country,
            disaster_type: disaster_type.into(),
            severity: 0.0,
            response_efficiency: 0.0,
            casualties: 0,
            response_time_hours: 0.0,
            economic_loss: 0.0,
            aid_amount: 0.0,
            latitude: location.lat_deg,
            longitude: location.lon_deg,
        }
    }

    pub fn location(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }
}
