//! services/api/src/adapters/coach/mod.rs
//!
//! The AI interview coach. The vendor is chosen once, at startup, from
//! `AI_PROVIDER`; a deployment without a usable vendor still starts and
//! answers every AI call with a typed error.

pub mod extract;
pub mod prompts;
pub mod vendor;

use async_trait::async_trait;
use interview_prep_core::domain::{AiFeedback, Difficulty, GeneratedQuestion};
use interview_prep_core::ports::{AiError, InterviewCoach};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::AiSettings;
pub use vendor::{CompletionBackend, GeminiBackend, OpenAiCompatible, VendorCoach};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Gemini,
    Groq,
}

impl FromStr for AiProvider {
    type Err = AiError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            "groq" => Ok(AiProvider::Groq),
            _ => Err(AiError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Fails every call with the configuration problem found at startup.
pub struct UnavailableCoach(pub AiError);

#[async_trait]
impl InterviewCoach for UnavailableCoach {
    async fn request_feedback(&self, _question: &str, _answer: &str) -> Result<AiFeedback, AiError> {
        Err(self.0.clone())
    }

    async fn request_question_generation(
        &self,
        _topic: &str,
        _difficulty: Difficulty,
        _count: u8,
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        Err(self.0.clone())
    }
}

/// Builds the coach for the configured vendor. Only the HTTP client itself
/// can fail here; configuration problems become an `UnavailableCoach`.
pub fn build_coach(settings: &AiSettings) -> Result<Arc<dyn InterviewCoach>, reqwest::Error> {
    let provider = match settings.provider.parse::<AiProvider>() {
        Ok(provider) => provider,
        Err(error) => {
            tracing::error!(provider = %settings.provider, "Unsupported AI provider configured");
            return Ok(Arc::new(UnavailableCoach(error)));
        }
    };
    let Some(api_key) = settings.api_key.clone() else {
        tracing::warn!(?provider, "AI_API_KEY is not set; AI features are disabled");
        return Ok(Arc::new(UnavailableCoach(AiError::MissingCredential)));
    };

    let http = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()?;
    let model = settings.model.clone();
    let base_url = settings.base_url.clone();

    tracing::info!(?provider, timeout_secs = settings.timeout.as_secs(), "AI coach configured");
    Ok(match provider {
        AiProvider::OpenAi => Arc::new(VendorCoach::new(
            OpenAiCompatible::openai(api_key, model, base_url),
            http,
        )),
        AiProvider::Groq => Arc::new(VendorCoach::new(
            OpenAiCompatible::groq(api_key, model, base_url),
            http,
        )),
        AiProvider::Gemini => Arc::new(VendorCoach::new(
            GeminiBackend::new(api_key, model, base_url),
            http,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(provider: &str, api_key: Option<&str>) -> AiSettings {
        AiSettings {
            provider: provider.to_string(),
            api_key: api_key.map(str::to_string),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn provider_names_are_case_insensitive() {
        assert_eq!("OpenAI".parse::<AiProvider>().unwrap(), AiProvider::OpenAi);
        assert_eq!("GEMINI".parse::<AiProvider>().unwrap(), AiProvider::Gemini);
        assert_eq!(" groq ".parse::<AiProvider>().unwrap(), AiProvider::Groq);
        assert_eq!(
            "anthropic".parse::<AiProvider>().unwrap_err(),
            AiError::UnsupportedProvider("anthropic".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_provider_fails_each_call() {
        let coach = build_coach(&settings("cohere", Some("key"))).unwrap();
        let err = coach.request_feedback("Q", "A").await.unwrap_err();
        assert_eq!(err, AiError::UnsupportedProvider("cohere".to_string()));
    }

    #[tokio::test]
    async fn missing_key_fails_each_call() {
        let coach = build_coach(&settings("openai", None)).unwrap();
        let err = coach
            .request_question_generation("graphs", Difficulty::Easy, 3)
            .await
            .unwrap_err();
        assert_eq!(err, AiError::MissingCredential);
    }
}
