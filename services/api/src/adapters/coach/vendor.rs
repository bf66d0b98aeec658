//! services/api/src/adapters/coach/vendor.rs
//!
//! The HTTP side of the coach: one `CompletionBackend` per wire format and a
//! generic `VendorCoach` that sends a prompt, classifies failures, and hands
//! the completion text to `extract`.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use interview_prep_core::domain::{AiFeedback, Difficulty, GeneratedQuestion};
use interview_prep_core::ports::{AiError, InterviewCoach};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::extract::{parse_feedback, parse_generated_questions};
use super::prompts::{self, Prompt, TEMPERATURE};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-4-turbo";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_MODEL: &str = "mixtral-8x7b-32768";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-pro";

/// One vendor wire format.
pub trait CompletionBackend: Send + Sync {
    /// Human-readable vendor name used in error messages.
    fn vendor(&self) -> &'static str;

    /// Builds the outbound request, credentials included.
    fn request(&self, http: &reqwest::Client, prompt: &Prompt) -> Result<RequestBuilder, AiError>;

    /// JSON pointer to the completion text inside a success body.
    fn completion_pointer(&self) -> &'static str;
}

//=========================================================================================
// Backends
//=========================================================================================

/// OpenAI's chat-completions format, also spoken by Groq.
#[derive(Clone)]
pub struct OpenAiCompatible {
    vendor: &'static str,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatible {
    pub fn openai(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            vendor: "OpenAI",
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| OPENAI_MODEL.to_string()),
            api_key,
        }
    }

    pub fn groq(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            vendor: "Groq",
            base_url: base_url.unwrap_or_else(|| GROQ_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| GROQ_MODEL.to_string()),
            api_key,
        }
    }

    fn body(&self, prompt: &Prompt) -> Result<Value, AiError> {
        let build_error = |e: async_openai::error::OpenAIError| AiError::Vendor {
            vendor: self.vendor.to_string(),
            status: None,
            message: format!("could not build request: {e}"),
        };

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system.as_str())
            .build()
            .map_err(build_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()
            .map_err(build_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .temperature(TEMPERATURE)
            .max_tokens(prompt.max_tokens)
            .build()
            .map_err(build_error)?;

        serde_json::to_value(&request).map_err(|e| AiError::Vendor {
            vendor: self.vendor.to_string(),
            status: None,
            message: format!("could not encode request: {e}"),
        })
    }
}

impl CompletionBackend for OpenAiCompatible {
    fn vendor(&self) -> &'static str {
        self.vendor
    }

    fn request(&self, http: &reqwest::Client, prompt: &Prompt) -> Result<RequestBuilder, AiError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        Ok(http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.body(prompt)?))
    }

    fn completion_pointer(&self) -> &'static str {
        "/choices/0/message/content"
    }
}

/// Google's `generateContent` format. It has no system role, so the prompt
/// is sent as a single user part.
#[derive(Clone)]
pub struct GeminiBackend {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| GEMINI_MODEL.to_string()),
            api_key,
        }
    }
}

impl CompletionBackend for GeminiBackend {
    fn vendor(&self) -> &'static str {
        "Gemini"
    }

    fn request(&self, http: &reqwest::Client, prompt: &Prompt) -> Result<RequestBuilder, AiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt.combined() }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": prompt.max_tokens,
            },
        });
        Ok(http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body))
    }

    fn completion_pointer(&self) -> &'static str {
        "/candidates/0/content/parts/0/text"
    }
}

//=========================================================================================
// Failure classification
//=========================================================================================

/// Builds the error for a non-success vendor answer. The vendor's own
/// `error.message` is preferred over the bare status.
pub fn vendor_failure(vendor: &str, status: StatusCode, body: &str) -> AiError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let message = if status == StatusCode::TOO_MANY_REQUESTS {
        format!("{detail} (rate limit exceeded, try again shortly)")
    } else {
        detail
    };

    AiError::Vendor {
        vendor: vendor.to_string(),
        status: Some(status.as_u16()),
        message,
    }
}

fn transport_failure(vendor: &str, error: &reqwest::Error) -> AiError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {error}")
    };
    AiError::Vendor {
        vendor: vendor.to_string(),
        status: None,
        message,
    }
}

//=========================================================================================
// The Coach
//=========================================================================================

/// An `InterviewCoach` backed by a single vendor. Each call is one request:
/// no retries and no fallback vendor.
pub struct VendorCoach<B> {
    backend: B,
    http: reqwest::Client,
}

impl<B: CompletionBackend> VendorCoach<B> {
    /// `http` should carry the configured timeout.
    pub fn new(backend: B, http: reqwest::Client) -> Self {
        Self { backend, http }
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError> {
        let vendor = self.backend.vendor();
        debug!(vendor, max_tokens = prompt.max_tokens, "Sending completion request");

        let response = self
            .backend
            .request(&self.http, prompt)?
            .send()
            .await
            .map_err(|e| transport_failure(vendor, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let error = vendor_failure(vendor, status, &body);
            warn!(vendor, status = status.as_u16(), error = %error, "AI vendor returned an error");
            return Err(error);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("{vendor} response is not JSON: {e}")))?;

        body.pointer(self.backend.completion_pointer())
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AiError::Parse(format!("No response from {vendor}")))
    }
}

#[async_trait]
impl<B: CompletionBackend> InterviewCoach for VendorCoach<B> {
    async fn request_feedback(&self, question: &str, answer: &str) -> Result<AiFeedback, AiError> {
        if question.trim().is_empty() {
            return Err(AiError::EmptyInput("question"));
        }
        if answer.trim().is_empty() {
            return Err(AiError::EmptyInput("answer"));
        }

        let completion = self.complete(&prompts::feedback(question, answer)).await?;
        parse_feedback(&completion)
    }

    async fn request_question_generation(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: u8,
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        if topic.trim().is_empty() {
            return Err(AiError::EmptyInput("topic"));
        }
        if count == 0 {
            return Err(AiError::EmptyInput("count"));
        }

        let prompt = prompts::question_generation(topic, difficulty, count);
        let completion = self.complete(&prompt).await?;
        parse_generated_questions(&completion, difficulty, count)
    }
}
