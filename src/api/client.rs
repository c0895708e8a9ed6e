use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info};

use super::endpoints;
use crate::models::station::{Station, StationsResponse};

/// WeatherFlow Tempest REST client
pub struct TempestClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TempestClient {
    pub fn new(token: String, base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent("tempest-teacher/0.1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// First station on the account. An empty listing is an error.
    pub async fn get_station(&self) -> Result<Station> {
        let url = format!("{}{}", self.base_url, endpoints::STATIONS);
        debug!("Fetching stations: {}", url);

        let response: StationsResponse = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .context("Failed to fetch stations")?
            .error_for_status()
            .context("Stations request rejected")?
            .json()
            .await
            .context("Failed to parse stations response")?;

        let station: Station = response
            .stations
            .into_iter()
            .next()
            .context("No stations found for this token")?
            .into();

        info!("Using station {} at {:.4},{:.4}", station.label(), station.latitude, station.longitude);
        Ok(station)
    }

    /// Raw better_forecast payload, imperial units. Shape is not checked
    /// here; consumers read fields with defaults.
    pub async fn get_forecast(&self, station_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, endpoints::BETTER_FORECAST);
        debug!("Fetching forecast for station {}: {}", station_id, url);

        let mut query: Vec<(&str, &str)> = vec![("station_id", station_id)];
        query.extend_from_slice(endpoints::IMPERIAL_UNITS);
        query.push(("token", self.token.as_str()));

        let response: serde_json::Value = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("Failed to fetch forecast")?
            .error_for_status()
            .context("Forecast request rejected")?
            .json()
            .await
            .context("Failed to parse forecast response")?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TempestClient {
        TempestClient::new("tok-123".to_string(), &server.uri(), None).unwrap()
    }

    #[tokio::test]
    async fn test_first_station_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations"))
            .and(query_param("token", "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stations": [
                    { "station_id": 4242, "name": "Backyard", "latitude": 41.8781, "longitude": -87.6298, "timezone": "America/Chicago" },
                    { "station_id": 9999, "latitude": 0.0, "longitude": 0.0 }
                ]
            })))
            .mount(&server)
            .await;

        let station = client(&server).get_station().await.unwrap();
        assert_eq!(station.id, "4242");
        assert_eq!(station.latitude, 41.8781);
        assert_eq!(station.timezone.as_deref(), Some("America/Chicago"));
        assert_eq!(station.label(), "Backyard (#4242)");
    }

    #[tokio::test]
    async fn test_empty_station_list_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stations": [] })))
            .mount(&server)
            .await;

        let err = client(&server).get_station().await.unwrap_err();
        assert!(err.to_string().contains("No stations"));
    }

    #[tokio::test]
    async fn test_unauthorized_station_lookup_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(client(&server).get_station().await.is_err());
    }

    #[tokio::test]
    async fn test_forecast_requests_imperial_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/better_forecast"))
            .and(query_param("station_id", "4242"))
            .and(query_param("units_temp", "f"))
            .and(query_param("units_wind", "mph"))
            .and(query_param("units_pressure", "inhg"))
            .and(query_param("units_precip", "in"))
            .and(query_param("units_distance", "mi"))
            .and(query_param("token", "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_conditions": { "air_temperature": 65.2 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server).get_forecast("4242").await.unwrap();
        assert_eq!(data["current_conditions"]["air_temperature"], json!(65.2));
    }

    #[tokio::test]
    async fn test_forecast_server_error_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/better_forecast"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).get_forecast("4242").await.unwrap_err();
        assert!(err.to_string().contains("Forecast request rejected"));
    }
}
