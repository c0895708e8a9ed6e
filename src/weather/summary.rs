use super::alerts::Alert;
use super::fmt_num;
use crate::models::forecast::DailyForecastEntry;

pub const FORECAST_UNAVAILABLE: &str = "Forecast data unavailable.";

/// Fixed-format multi-day block fed verbatim to the model prompts
pub fn daily_forecast_text(days: &[DailyForecastEntry]) -> String {
    if days.is_empty() {
        return FORECAST_UNAVAILABLE.to_string();
    }

    let mut text = String::new();
    for day in days {
        text.push_str(&format!(
            "- {}: High {}F, Low {}F, {} ({}% Rain Chance)\n",
            day.local_day_start.format("%A"),
            day.high_f.map(fmt_num).unwrap_or_else(|| "N/A".to_string()),
            day.low_f.map(fmt_num).unwrap_or_else(|| "N/A".to_string()),
            day.condition_text,
            fmt_num(day.rain_probability_pct),
        ));
    }
    text
}

/// One-line alert digest for the Q&A prompt
pub fn alert_text(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "NO ACTIVE ALERTS.".to_string();
    }
    let events: Vec<&str> = alerts.iter().map(|a| a.event.as_str()).collect();
    format!("ACTIVE GOVERNMENT ALERTS: {}.", events.join(", "))
}
