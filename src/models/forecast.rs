use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::weather::LocalZone;

/// Qualitative barometric pressure direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureTrend {
    Rising,
    Falling,
    Steady,
    Unknown,
}

impl PressureTrend {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "rising" => PressureTrend::Rising,
            "falling" => PressureTrend::Falling,
            "steady" => PressureTrend::Steady,
            _ => PressureTrend::Unknown,
        }
    }
}

impl std::fmt::Display for PressureTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PressureTrend::Rising => write!(f, "rising"),
            PressureTrend::Falling => write!(f, "falling"),
            PressureTrend::Steady => write!(f, "steady"),
            PressureTrend::Unknown => write!(f, "unknown"),
        }
    }
}

/// Live station readings, imperial units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub condition_text: String,
    pub temperature_f: f64,
    pub humidity_pct: f64,
    pub wind_speed_mph: f64,
    /// `None` only when the provider sent an explicit null
    pub wind_direction_deg: Option<f64>,
    pub rain_today_in: f64,
    pub pressure_inhg: f64,
    pub pressure_trend: PressureTrend,
    /// Trend exactly as reported, used for display
    pub pressure_trend_raw: String,
}

impl CurrentConditions {
    /// Pull `current_conditions` out of a better_forecast response.
    /// Missing fields fall back to "Unknown" / 0.0.
    pub fn from_forecast(data: &Value) -> Self {
        let empty = Value::Null;
        let current = data.get("current_conditions").unwrap_or(&empty);

        let wind_direction_deg = match current.get("wind_direction") {
            None => Some(0.0),
            Some(v) => v.as_f64(),
        };
        let pressure_trend_raw = text(current, "pressure_trend").unwrap_or_default();

        Self {
            condition_text: text(current, "conditions").unwrap_or_else(|| "Unknown".to_string()),
            temperature_f: num(current, "air_temperature").unwrap_or(0.0),
            humidity_pct: num(current, "relative_humidity").unwrap_or(0.0),
            wind_speed_mph: num(current, "wind_avg").unwrap_or(0.0),
            wind_direction_deg,
            rain_today_in: num(current, "precip_accum_local_day").unwrap_or(0.0),
            pressure_inhg: num(current, "sea_level_pressure").unwrap_or(0.0),
            pressure_trend: PressureTrend::parse(&pressure_trend_raw),
            pressure_trend_raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastEntry {
    pub local_day_start: DateTime<FixedOffset>,
    pub high_f: Option<f64>,
    pub low_f: Option<f64>,
    pub condition_text: String,
    pub rain_probability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecastEntry {
    pub local_time: DateTime<FixedOffset>,
    pub temperature_f: f64,
    pub rain_probability_pct: f64,
    pub condition_text: String,
}

/// First `limit` days of `forecast.daily`. Days without a start
/// timestamp are skipped.
pub fn daily_entries(data: &Value, zone: LocalZone, limit: usize) -> Vec<DailyForecastEntry> {
    let Some(days) = data.pointer("/forecast/daily").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    days.iter()
        .take(limit)
        .filter_map(|day| {
            let start = day.get("day_start_local").and_then(|v| v.as_i64())?;
            Some(DailyForecastEntry {
                local_day_start: zone.at(start)?,
                high_f: num(day, "air_temp_high"),
                low_f: num(day, "air_temp_low"),
                condition_text: text(day, "conditions").unwrap_or_else(|| "N/A".to_string()),
                rain_probability_pct: num(day, "precip_probability").unwrap_or(0.0),
            })
        })
        .collect()
}

/// Hourly entries in provider order, optionally only those at or after
/// `now`, capped at `limit`.
pub fn hourly_entries(
    data: &Value,
    zone: LocalZone,
    now: DateTime<Utc>,
    future_only: bool,
    limit: usize,
) -> Vec<HourlyForecastEntry> {
    let Some(hours) = data.pointer("/forecast/hourly").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let cutoff = now.timestamp();
    hours.iter()
        .filter_map(|hour| {
            let ts = hour.get("time").and_then(|v| v.as_i64())?;
            if future_only && ts < cutoff {
                return None;
            }
            Some(HourlyForecastEntry {
                local_time: zone.at(ts)?,
                temperature_f: num(hour, "air_temperature").unwrap_or(0.0),
                rain_probability_pct: num(hour, "precip_probability").unwrap_or(0.0),
                condition_text: text(hour, "conditions").unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

/// IANA zone the provider reports for the station, if any
pub fn reported_timezone(data: &Value) -> Option<&str> {
    data.get("timezone").and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn num(v: &Value, key: &str) -> Option<f64> {
    v.get(key).and_then(|x| x.as_f64())
}

fn text(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|x| x.as_str()).map(String::from)
}
