use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::fallback::{GenerateError, ModelChain, TextGenerator};
use crate::api::endpoints;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Shared connection settings for the Gemini generateContent endpoint
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create Gemini HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self, name: &str) -> GeminiModel {
        GeminiModel {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    /// Fallback chain over `models`, in the given order
    pub fn chain(&self, models: &[String]) -> ModelChain {
        ModelChain::new(
            models
                .iter()
                .filter(|m| !m.trim().is_empty())
                .map(|m| Box::new(self.model(m.trim())) as Box<dyn TextGenerator>)
                .collect(),
        )
    }
}

/// A single named Gemini model
pub struct GeminiModel {
    client: GeminiClient,
    name: String,
}

#[async_trait]
impl TextGenerator for GeminiModel {
    fn model(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}{}/{}:generateContent",
            self.client.base_url, endpoints::GENERATE_CONTENT, self.name
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!("Gemini request: model={} prompt_chars={}", self.name, prompt.len());
        let resp = self.client.http
            .post(&url)
            .header("x-goog-api-key", &self.client.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => GenerateError::RateLimited,
                404 => GenerateError::ModelNotFound(self.name.clone()),
                401 | 403 => GenerateError::Unauthorized(truncate(&text, 200)),
                code => GenerateError::Api { status: code, body: truncate(&text, 200) },
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        Ok(text)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max.saturating_sub(3);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback::Generation;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("key-abc".to_string(), &server.uri(), None).unwrap()
    }

    fn answer(text: &str) -> serde_json::Value {
        json!({ "candidates": [ { "content": { "parts": [ { "text": text } ] } } ] })
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "key-abc"))
            .and(body_partial_json(json!({ "contents": [ { "parts": [ { "text": "Why is the sky blue?" } ] } ] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer("Rayleigh scattering.")))
            .mount(&server)
            .await;

        let text = client(&server)
            .model("gemini-2.5-flash")
            .generate("Why is the sky blue?")
            .await
            .unwrap();
        assert_eq!(text, "Rayleigh scattering.");
    }

    #[tokio::test]
    async fn test_status_codes_map_to_causes() {
        let server = MockServer::start().await;
        for (model, status) in [("quota", 429), ("gone", 404), ("denied", 403), ("broken", 500)] {
            Mock::given(method("POST"))
                .and(path(format!("/v1beta/models/{}:generateContent", model)))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;
        }
        let client = client(&server);

        assert!(matches!(client.model("quota").generate("q").await, Err(GenerateError::RateLimited)));
        assert!(matches!(client.model("gone").generate("q").await, Err(GenerateError::ModelNotFound(_))));
        assert!(matches!(client.model("denied").generate("q").await, Err(GenerateError::Unauthorized(_))));
        assert!(matches!(
            client.model("broken").generate("q").await,
            Err(GenerateError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_answer_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).model("m").generate("q").await,
            Err(GenerateError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_chain_skips_quota_exhausted_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/first:generateContent"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/second:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer("second answer")))
            .mount(&server)
            .await;

        let chain = client(&server).chain(&["first".to_string(), " ".to_string(), "second".to_string()]);
        assert_eq!(chain.models(), vec!["first", "second"]);
        match chain.generate("q").await {
            Generation::Success { model, text, failures } => {
                assert_eq!(model, "second");
                assert_eq!(text, "second answer");
                assert!(matches!(failures[0].error, GenerateError::RateLimited));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }
}
