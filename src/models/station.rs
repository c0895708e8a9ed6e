use serde::{Deserialize, Serialize};

/// Raw station record from the Tempest /stations listing
#[derive(Debug, Deserialize)]
pub struct StationRecord {
    pub station_id: i64,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub stations: Vec<StationRecord>,
}

/// The station this session reads from. Resolved once, dropped on refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
}

impl From<StationRecord> for Station {
    fn from(rec: StationRecord) -> Self {
        Station {
            id: rec.station_id.to_string(),
            name: rec.name,
            latitude: rec.latitude,
            longitude: rec.longitude,
            timezone: rec.timezone,
        }
    }
}

impl Station {
    /// Label for headers: the station name if it has one, else its id
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} (#{})", name, self.id),
            _ => format!("#{}", self.id),
        }
    }
}
