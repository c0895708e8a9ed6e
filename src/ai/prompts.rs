use crate::models::forecast::CurrentConditions;
use crate::weather::{deg_to_compass, fmt_num};

/// Weekly outlook request built around the daily forecast block.
/// `days` is the number of entries in the block.
pub fn outlook_prompt(daily_forecast_text: &str, days: usize) -> String {
    let heading = match days {
        0 => "Here is the forecast:".to_string(),
        n => format!("Here is the {}-day forecast:", n),
    };
    format!(
r#"Act as a Weather Strategist.
{}
{}

Write a "Weekly Outlook" for the user.
1. **Headline:** A 4-6 word summary of the week.
2. **Trend:** Are we warming up or cooling down?
3. **Key Days:** Mention specific days to watch out for.
4. **Advice:** One practical tip.

Keep it concise and formatted with Markdown."#,
        heading,
        daily_forecast_text.trim_end(),
    )
}

/// Question prompt carrying live readings, alerts and the forecast
pub fn teacher_prompt(
    current: &CurrentConditions,
    alert_text: &str,
    daily_forecast_text: &str,
    question: &str,
) -> String {
    format!(
r#"Act as a Meteorology Professor.

LIVE DATA:
- Pressure: {} inHg ({})
- Humidity: {}%
- Temp: {} F
- Wind: {} mph (from {})
- Rain Today: {} inches

ALERTS: {}

FORECAST:
{}

USER QUESTION: "{}"

FORMAT YOUR RESPONSE EXACTLY LIKE THIS:

**The Short Answer**
[Direct answer]

**The Science Breakdown**
* **Observation:** [Data point used] [Source: Sensor]
* **Concept:** [Explain the concept]
* **Prediction:** [Implication] [Source: AI Model]"#,
        fmt_num(current.pressure_inhg),
        current.pressure_trend_raw,
        fmt_num(current.humidity_pct),
        fmt_num(current.temperature_f),
        fmt_num(current.wind_speed_mph),
        deg_to_compass(current.wind_direction_deg),
        fmt_num(current.rain_today_in),
        alert_text,
        daily_forecast_text.trim_end(),
        question.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outlook_prompt_embeds_forecast() {
        let prompt = outlook_prompt("- Friday: High 72F, Low 55F, Clear (0% Rain Chance)\n", 7);
        assert!(prompt.starts_with("Act as a Weather Strategist."));
        assert!(prompt.contains("Here is the 7-day forecast:\n- Friday: High 72F"));
        assert!(prompt.contains("**Headline:**"));
    }

    #[test]
    fn test_outlook_prompt_day_count_follows_entries() {
        let prompt = outlook_prompt("- Friday: High 72F, Low 55F, Clear (0% Rain Chance)", 3);
        assert!(prompt.contains("Here is the 3-day forecast:\n- Friday"));

        let prompt = outlook_prompt("Forecast data unavailable.", 0);
        assert!(prompt.contains("Here is the forecast:\nForecast data unavailable."));
    }

    #[test]
    fn test_teacher_prompt_carries_context() {
        let current = CurrentConditions::from_forecast(&json!({
            "current_conditions": {
                "air_temperature": 71.4,
                "relative_humidity": 58,
                "wind_avg": 6.2,
                "wind_direction": 225,
                "sea_level_pressure": 29.92,
                "pressure_trend": "falling"
            }
        }));
        let prompt = teacher_prompt(&current, "NO ACTIVE ALERTS.", "Forecast data unavailable.", "  Will it storm? ");

        assert!(prompt.contains("- Pressure: 29.92 inHg (falling)"));
        assert!(prompt.contains("- Humidity: 58%"));
        assert!(prompt.contains("- Wind: 6.2 mph (from SW)"));
        assert!(prompt.contains("- Rain Today: 0 inches"));
        assert!(prompt.contains("ALERTS: NO ACTIVE ALERTS."));
        assert!(prompt.contains("FORECAST:\nForecast data unavailable."));
        assert!(prompt.contains("USER QUESTION: \"Will it storm?\""));
    }
}
