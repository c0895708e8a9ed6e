use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::endpoints;

/// NWS active-alerts client (api.weather.gov)
/// No API key required, but requests without a User-Agent are refused
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    #[serde(default)]
    properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertProperties {
    severity: Option<String>,
    event: Option<String>,
    sender_name: Option<String>,
    description: Option<String>,
    headline: Option<String>,
}

/// An active government weather alert for the station's location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub severity: String,
    pub event: String,
    pub sender_name: String,
    pub description: String,
    pub headline: Option<String>,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            severity: "Unknown".to_string(),
            event: "Weather Alert".to_string(),
            sender_name: "Unknown".to_string(),
            description: String::new(),
            headline: None,
        }
    }
}

impl From<AlertProperties> for Alert {
    fn from(p: AlertProperties) -> Self {
        let fallback = Alert::default();
        Alert {
            severity: p.severity.unwrap_or(fallback.severity),
            event: p.event.unwrap_or(fallback.event),
            sender_name: p.sender_name.unwrap_or(fallback.sender_name),
            description: p.description.unwrap_or(fallback.description),
            headline: p.headline,
        }
    }
}

impl NwsClient {
    pub fn new(user_agent: &str, base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create NWS HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Active alerts at a point. Any failure reads as "no alerts" so the
    /// dashboard never blocks on this service.
    pub async fn fetch_alerts(&self, lat: f64, lon: f64) -> Vec<Alert> {
        match self.try_fetch_alerts(lat, lon).await {
            Ok(alerts) => {
                info!("{} active alert(s) at {:.4},{:.4}", alerts.len(), lat, lon);
                alerts
            }
            Err(e) => {
                warn!("NWS alerts unavailable, showing none: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_alerts(&self, lat: f64, lon: f64) -> Result<Vec<Alert>> {
        let url = format!("{}{}", self.base_url, endpoints::ALERTS_ACTIVE);
        let point = format!("{:.4},{:.4}", lat, lon);

        debug!("NWS alerts request: {}?point={}", url, point);
        let resp: AlertsResponse = self.http
            .get(&url)
            .query(&[("point", point.as_str())])
            .header("Accept", "application/geo+json")
            .send()
            .await
            .context("NWS alerts request failed")?
            .error_for_status()
            .context("NWS alerts request rejected")?
            .json()
            .await
            .context("Failed to parse NWS alerts response")?;

        Ok(resp.features.into_iter().map(|f| f.properties.into()).collect())
    }
}
