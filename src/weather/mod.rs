pub mod alerts;
pub mod summary;

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
    "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Map a wind direction in degrees to one of 16 compass points.
/// 360 wraps to "N"; no reading gives "Unknown".
pub fn deg_to_compass(deg: Option<f64>) -> &'static str {
    match deg {
        Some(d) if d.is_finite() => {
            let idx = ((d / 22.5) + 0.5).floor() as i64;
            COMPASS_POINTS[idx.rem_euclid(16) as usize]
        }
        _ => "Unknown",
    }
}

/// Signed label shown next to the pressure reading.
/// "falling" -> "- Falling", "rising" -> "+ Rising", anything else is
/// just capitalized, empty shows nothing.
pub fn pressure_delta(raw_trend: &str) -> Option<String> {
    let trend = raw_trend.trim();
    if trend.is_empty() {
        return None;
    }
    let label = capitalize(trend);
    match trend.to_lowercase().as_str() {
        "falling" => Some(format!("- {}", label)),
        "rising" => Some(format!("+ {}", label)),
        _ => Some(label),
    }
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a reading without a trailing ".0" when it is whole
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

/// Zone used to turn provider epoch timestamps into local wall time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalZone {
    Named(Tz),
    Host,
}

impl LocalZone {
    /// First parseable zone wins: configured, then station-reported,
    /// then the host zone.
    pub fn resolve(configured: Option<&str>, reported: Option<&str>) -> Self {
        for (source, name) in [("configured", configured), ("station", reported)] {
            let Some(name) = name else { continue };
            match name.parse::<Tz>() {
                Ok(tz) => return LocalZone::Named(tz),
                Err(_) => warn!("Ignoring unknown {} timezone '{}'", source, name),
            }
        }
        LocalZone::Host
    }

    pub fn at(&self, epoch_secs: i64) -> Option<DateTime<FixedOffset>> {
        match self {
            LocalZone::Named(tz) => tz.timestamp_opt(epoch_secs, 0).single().map(|d| d.fixed_offset()),
            LocalZone::Host => Local.timestamp_opt(epoch_secs, 0).single().map(|d| d.fixed_offset()),
        }
    }
}

impl std::fmt::Display for LocalZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalZone::Named(tz) => write!(f, "{}", tz.name()),
            LocalZone::Host => write!(f, "host local time"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_cardinal_points() {
        assert_eq!(deg_to_compass(Some(0.0)), "N");
        assert_eq!(deg_to_compass(Some(360.0)), "N");
        assert_eq!(deg_to_compass(Some(90.0)), "E");
        assert_eq!(deg_to_compass(Some(180.0)), "S");
        assert_eq!(deg_to_compass(Some(270.0)), "W");
    }

    #[test]
    fn test_compass_boundaries() {
        assert_eq!(deg_to_compass(Some(11.24)), "N");
        assert_eq!(deg_to_compass(Some(11.25)), "NNE");
        assert_eq!(deg_to_compass(Some(22.5)), "NNE");
        assert_eq!(deg_to_compass(Some(348.75)), "N");
        assert_eq!(deg_to_compass(Some(348.7)), "NNW");
    }

    #[test]
    fn test_compass_total_over_degrees() {
        for d in 0..360 {
            let label = deg_to_compass(Some(d as f64));
            assert!(COMPASS_POINTS.contains(&label), "{} gave {}", d, label);
        }
    }

    #[test]
    fn test_compass_without_reading() {
        assert_eq!(deg_to_compass(None), "Unknown");
        assert_eq!(deg_to_compass(Some(f64::NAN)), "Unknown");
    }

    #[test]
    fn test_pressure_delta() {
        assert_eq!(pressure_delta("falling").as_deref(), Some("- Falling"));
        assert_eq!(pressure_delta("rising").as_deref(), Some("+ Rising"));
        assert_eq!(pressure_delta("RISING").as_deref(), Some("+ Rising"));
        assert_eq!(pressure_delta("steady").as_deref(), Some("Steady"));
        assert_eq!(pressure_delta("sLOWLY climbing").as_deref(), Some("Slowly climbing"));
        assert_eq!(pressure_delta(""), None);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(72.0), "72");
        assert_eq!(fmt_num(72.5), "72.5");
        assert_eq!(fmt_num(-3.0), "-3");
    }

    #[test]
    fn test_zone_resolution_order() {
        let tz = LocalZone::resolve(Some("America/Chicago"), Some("America/Denver"));
        assert_eq!(tz, LocalZone::Named(chrono_tz::America::Chicago));

        let tz = LocalZone::resolve(Some("Not/AZone"), Some("America/Denver"));
        assert_eq!(tz, LocalZone::Named(chrono_tz::America::Denver));

        assert_eq!(LocalZone::resolve(None, None), LocalZone::Host);
    }
}
