use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single model invocation failed
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited or quota exhausted")]
    RateLimited,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerateError {
    /// Failures that will repeat on every call until config changes
    pub fn is_permanent(&self) -> bool {
        matches!(self, GenerateError::ModelNotFound(_) | GenerateError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerateError::InvalidResponse(err.to_string())
        } else {
            GenerateError::Transport(err.to_string())
        }
    }
}

/// One candidate in the fallback list
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug)]
pub struct ModelFailure {
    pub model: String,
    pub error: GenerateError,
}

/// Outcome of running a prompt down the candidate list
#[derive(Debug)]
pub enum Generation {
    Success {
        model: String,
        text: String,
        /// Candidates that failed before `model` answered
        failures: Vec<ModelFailure>,
    },
    Exhausted { failures: Vec<ModelFailure> },
}

/// Prioritized list of generators, tried strictly in order
pub struct ModelChain {
    candidates: Vec<Box<dyn TextGenerator>>,
}

impl ModelChain {
    pub fn new(candidates: Vec<Box<dyn TextGenerator>>) -> Self {
        Self { candidates }
    }

    pub fn models(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.model()).collect()
    }

    pub async fn generate(&self, prompt: &str) -> Generation {
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            let model = candidate.model().to_string();
            match candidate.generate(prompt).await {
                Ok(text) => {
                    info!("Model {} answered ({} chars)", model, text.len());
                    return Generation::Success { model, text, failures };
                }
                Err(error) => {
                    if error.is_permanent() {
                        warn!("Model {} will not work until config changes: {}", model, error);
                    } else {
                        debug!("Model {} failed, trying next: {}", model, error);
                    }
                    failures.push(ModelFailure { model, error });
                }
            }
        }

        Generation::Exhausted { failures }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted generator that counts its calls
    pub struct FakeModel {
        pub name: String,
        pub reply: Option<String>,
        pub calls: Arc<AtomicUsize>,
        pub prompts: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeModel {
        pub fn ok(name: &str, reply: &str) -> Self {
            Self::build(name, Some(reply.to_string()))
        }

        pub fn failing(name: &str) -> Self {
            Self::build(name, None)
        }

        fn build(name: &str, reply: Option<String>) -> Self {
            Self {
                name: name.to_string(),
                reply,
                calls: Arc::new(AtomicUsize::new(0)),
                prompts: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        pub fn call_count(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeModel {
        fn model(&self) -> &str {
            &self.name
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(GenerateError::RateLimited),
            }
        }
    }
}
