use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::ai::fallback::{Generation, ModelChain};
use crate::ai::prompts;
use crate::api::client::TempestClient;
use crate::config::AppConfig;
use crate::models::forecast::{self, CurrentConditions, DailyForecastEntry, HourlyForecastEntry};
use crate::models::station::Station;
use crate::weather::alerts::{Alert, NwsClient};
use crate::weather::{summary, LocalZone};

pub const GREETING: &str =
    "I'm ready to analyze. Ask me a question, and I'll break down the science for you.";
pub const UNAVAILABLE: &str =
    "The AI teacher is temporarily unavailable. Please try again in a moment.";

/// Where station, forecast and alert data come from
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn station(&self) -> Result<Station>;
    async fn forecast(&self, station_id: &str) -> Result<Value>;
    /// Never fails; an unreachable alert service reads as no alerts
    async fn alerts(&self, lat: f64, lon: f64) -> Vec<Alert>;
}

/// Tempest for station data, NWS for alerts
pub struct LiveSource {
    tempest: TempestClient,
    nws: NwsClient,
}

impl LiveSource {
    pub fn new(tempest: TempestClient, nws: NwsClient) -> Self {
        Self { tempest, nws }
    }
}

#[async_trait]
impl WeatherSource for LiveSource {
    async fn station(&self) -> Result<Station> {
        self.tempest.get_station().await
    }

    async fn forecast(&self, station_id: &str) -> Result<Value> {
        self.tempest.get_forecast(station_id).await
    }

    async fn alerts(&self, lat: f64, lon: f64) -> Vec<Alert> {
        self.nws.fetch_alerts(lat, lon).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "You"),
            Role::Assistant => write!(f, "Teacher"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only chat transcript. Lives as long as the process.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    fn push(&mut self, role: Role, content: &str) {
        self.messages.push(Message {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .context("Failed to serialize transcript")?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        Ok(())
    }
}

/// The parts of AppConfig a session needs
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timezone: Option<String>,
    pub forecast_days: usize,
    pub hourly_limit: usize,
    pub hourly_future_only: bool,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            timezone: config.timezone.clone(),
            forecast_days: config.forecast_days,
            hourly_limit: config.hourly_limit,
            hourly_future_only: config.hourly_future_only,
        }
    }
}

/// Everything read in one fetch, already reshaped for display and prompts
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub station: Station,
    pub zone: LocalZone,
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecastEntry>,
    pub hourly: Vec<HourlyForecastEntry>,
    /// Daily block fed verbatim to both prompts
    pub summary: String,
    pub alerts: Vec<Alert>,
    pub fetched_at: DateTime<Utc>,
}

/// Dashboard session state: cached data, cached outlook and transcript.
///
/// The outlook is tied to the snapshot it was generated from: storing a
/// new snapshot or calling [`Session::invalidate`] clears it, so it is
/// never shown against newer data.
pub struct Session<S: WeatherSource> {
    source: S,
    chain: ModelChain,
    settings: SessionSettings,
    station: Option<Station>,
    snapshot: Option<Snapshot>,
    outlook: Option<String>,
    conversation: Conversation,
}

impl<S: WeatherSource> Session<S> {
    pub fn new(source: S, chain: ModelChain, settings: SessionSettings) -> Self {
        let mut conversation = Conversation::default();
        conversation.push(Role::Assistant, GREETING);
        Self {
            source,
            chain,
            settings,
            station: None,
            snapshot: None,
            outlook: None,
            conversation,
        }
    }

    /// Cached snapshot, fetching station, forecast and alerts first if
    /// needed. A station failure stops here before anything else is fetched.
    pub async fn load(&mut self) -> Result<&Snapshot> {
        if self.snapshot.is_none() {
            let snapshot = self.fetch_snapshot().await?;
            self.outlook = None;
            self.snapshot = Some(snapshot);
        }
        self.snapshot.as_ref().context("Weather snapshot missing after load")
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Drop station, forecast, alerts and outlook together. The
    /// conversation is kept.
    pub fn invalidate(&mut self) {
        info!("Invalidating cached weather data and outlook");
        self.station = None;
        self.snapshot = None;
        self.outlook = None;
    }

    /// Weekly outlook for the current snapshot, generated on first use.
    /// `None` when every model failed; the next call tries again.
    pub async fn outlook(&mut self) -> Result<Option<&str>> {
        let snapshot = self.load().await?;
        let (summary, days) = (snapshot.summary.clone(), snapshot.daily.len());
        if self.outlook.is_none() {
            let prompt = prompts::outlook_prompt(&summary, days);
            self.outlook = settle(self.chain.generate(&prompt).await);
        }
        Ok(self.outlook.as_deref())
    }

    /// Answer a free-form question. The question and the answer (or the
    /// unavailability notice) are appended to the conversation.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            bail!("Question is empty");
        }

        let snapshot = self.load().await?;
        let prompt = prompts::teacher_prompt(
            &snapshot.current,
            &summary::alert_text(&snapshot.alerts),
            &snapshot.summary,
            question,
        );

        self.conversation.push(Role::User, question);
        let answer = settle(self.chain.generate(&prompt).await)
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        self.conversation.push(Role::Assistant, &answer);
        Ok(answer)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    async fn fetch_snapshot(&mut self) -> Result<Snapshot> {
        let station = match self.station.clone() {
            Some(station) => station,
            None => {
                let station = self.source.station().await
                    .context("Error finding station")?;
                self.station = Some(station.clone());
                station
            }
        };

        let data = self.source.forecast(&station.id).await
            .with_context(|| format!("Error fetching forecast for station {}", station.id))?;
        let alerts = self.source.alerts(station.latitude, station.longitude).await;

        let reported = forecast::reported_timezone(&data).or(station.timezone.as_deref());
        let zone = LocalZone::resolve(self.settings.timezone.as_deref(), reported);
        debug!("Rendering local times in {}", zone);

        let daily = forecast::daily_entries(&data, zone, self.settings.forecast_days);
        let fetched_at = Utc::now();
        let hourly = forecast::hourly_entries(
            &data,
            zone,
            fetched_at,
            self.settings.hourly_future_only,
            self.settings.hourly_limit,
        );

        let current = CurrentConditions::from_forecast(&data);
        info!(
            "Loaded station {}: {} day(s), {} hour(s), {} alert(s), pressure {}",
            station.id, daily.len(), hourly.len(), alerts.len(), current.pressure_trend
        );

        Ok(Snapshot {
            current,
            summary: summary::daily_forecast_text(&daily),
            station,
            zone,
            daily,
            hourly,
            alerts,
            fetched_at,
        })
    }
}

/// Answer text, if any. Failure causes go to the log, never to the user.
fn settle(generation: Generation) -> Option<String> {
    match generation {
        Generation::Success { model, text, failures } => {
            if !failures.is_empty() {
                info!("Answered by fallback model {} after {} failure(s)", model, failures.len());
            }
            Some(text)
        }
        Generation::Exhausted { failures } => {
            let causes: Vec<String> = failures
                .iter()
                .map(|f| format!("{}: {}", f.model, f.error))
                .collect();
            warn!("All {} model candidate(s) failed ({})", failures.len(), causes.join("; "));
            None
        }
    }
}
