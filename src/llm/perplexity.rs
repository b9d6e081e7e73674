// ABOUTME: Perplexity chat-completions client speaking the OpenAI-compatible wire format
// ABOUTME: Handles auth, dry runs, error-body extraction and response decoding without retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Perplexity Provider
//!
//! Sends a [`PromptConfig`] to `POST {base_url}/chat/completions` and decodes the
//! choices. The online models ground their answers in web search, which is what
//! makes them useful for enumerating real places.
//!
//! Failure classes are kept distinct:
//!
//! - missing token: [`ErrorCode::ConfigMissing`], checked before anything else
//! - connection or body-read failure: [`ErrorCode::ExternalServiceUnavailable`]
//! - non-success status: [`ErrorCode::ExternalServiceError`] (or the auth /
//!   rate-limit codes), carrying the most specific message in the error body
//! - undecodable success body: [`ErrorCode::SerializationError`]

use async_trait::async_trait;
use honing_core::constants::service_names;
use honing_core::errors::{AppError, AppResult, ErrorCode};
use honing_core::models::MessageRole;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{
    ChatMessage, CompletionChoice, CompletionClient, CompletionResult, PromptConfig, TokenUsage,
};
use crate::config::CompletionSettings;

/// Connection timeout; the whole-request timeout comes from settings
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Longest body excerpt written to logs
const LOG_BODY_PREVIEW: usize = 500;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Perplexity chat-completions request body
#[derive(Debug, Serialize)]
struct PerplexityRequest<'a> {
    model: &'a str,
    messages: Vec<PerplexityMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_citations: bool,
    search_domain_filter: Vec<String>,
    return_images: bool,
    return_related_questions: bool,
    top_k: u32,
    stream: bool,
    presence_penalty: f32,
    frequency_penalty: f32,
}

/// Message structure on the wire
#[derive(Debug, Serialize)]
struct PerplexityMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for PerplexityMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

/// Successful response body
#[derive(Debug, Deserialize)]
struct PerplexityResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<PerplexityChoice>,
    #[serde(default)]
    usage: Option<PerplexityUsage>,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct PerplexityChoice {
    message: PerplexityResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct PerplexityResponseMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct PerplexityUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Error response body; either shape may be present
#[derive(Debug, Default, Deserialize)]
struct PerplexityErrorResponse {
    #[serde(default)]
    error: Option<PerplexityErrorBody>,
    #[serde(default)]
    detail: Vec<PerplexityErrorDetail>,
}

/// `{"error": {...}}` shape
#[derive(Debug, Deserialize)]
struct PerplexityErrorBody {
    #[serde(default)]
    message: String,
}

/// `{"detail": [...]}` validation shape
#[derive(Debug, Deserialize)]
struct PerplexityErrorDetail {
    #[serde(default)]
    loc: Vec<Value>,
    #[serde(default)]
    msg: String,
}

// ============================================================================
// Client
// ============================================================================

/// Perplexity completion client
pub struct PerplexityClient {
    client: Client,
    settings: CompletionSettings,
}

impl PerplexityClient {
    /// Create a new client with the given settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: CompletionSettings) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %settings.base_url,
            model = %settings.model,
            "Initializing Perplexity completion client"
        );

        Ok(Self { client, settings })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, prompt: &'a PromptConfig) -> PerplexityRequest<'a> {
        PerplexityRequest {
            model: &self.settings.model,
            messages: prompt.messages.iter().map(PerplexityMessage::from).collect(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            return_citations: true,
            search_domain_filter: Vec::new(),
            return_images: false,
            return_related_questions: true,
            top_k: 0,
            stream: false,
            presence_penalty: 0.0,
            frequency_penalty: self.settings.frequency_penalty,
        }
    }

    /// Turn a non-success response into the most specific error available
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let parsed = serde_json::from_str::<PerplexityErrorResponse>(body).unwrap_or_default();

        let message = parsed
            .detail
            .iter()
            .map(|detail| detail.msg.trim())
            .find(|msg| !msg.is_empty())
            .or_else(|| {
                parsed
                    .error
                    .as_ref()
                    .map(|error| error.message.trim())
                    .filter(|msg| !msg.is_empty())
            })
            .map_or_else(
                || format!("API error {}", status.as_u16()),
                ToOwned::to_owned,
            );

        if let Some(detail) = parsed.detail.first() {
            debug!(loc = ?detail.loc, "Completion API rejected request");
        }

        let code = match status.as_u16() {
            401 | 403 => ErrorCode::ExternalAuthFailed,
            429 => ErrorCode::ExternalRateLimited,
            _ => ErrorCode::ExternalServiceError,
        };
        AppError::new(code, message)
    }

    /// Decode a success body into choices
    fn decode_success(body: &str) -> AppResult<CompletionResult> {
        let response: PerplexityResponse = serde_json::from_str(body).map_err(|e| {
            error!(
                "Failed to parse completion response: {} - body: {}",
                e,
                body.chars().take(LOG_BODY_PREVIEW).collect::<String>()
            );
            AppError::serialization(format!("Failed to decode completion response: {e}"))
        })?;

        let choices = response
            .choices
            .into_iter()
            .map(|choice| CompletionChoice {
                role: MessageRole::parse(&choice.message.role).unwrap_or(MessageRole::Assistant),
                content: choice.message.content,
                finish_reason: choice.finish_reason,
            })
            .collect();

        Ok(CompletionResult {
            choices,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl CompletionClient for PerplexityClient {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model, messages = prompt.messages.len(), dry_run = prompt.dry_run))]
    async fn invoke(&self, prompt: &PromptConfig) -> AppResult<CompletionResult> {
        let Some(token) = prompt.auth_token.as_deref().filter(|t| !t.is_empty()) else {
            return Err(AppError::config_missing("API token not set"));
        };

        let request = self.build_request(prompt);

        if prompt.dry_run {
            let body = serde_json::to_string(&request)?;
            debug!(body_len = body.len(), "Dry run: completion request built, not sent");
            return Ok(CompletionResult::default());
        }

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Perplexity: {}", e);
                AppError::transport(service_names::PERPLEXITY, format!("Failed to call API: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read completion response: {}", e);
            AppError::transport(
                service_names::PERPLEXITY,
                format!("Failed to read response body: {e}"),
            )
        })?;

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                body = %body.chars().take(LOG_BODY_PREVIEW).collect::<String>(),
                "Completion API returned an error"
            );
            return Err(Self::parse_error_response(status, &body));
        }

        let result = Self::decode_success(&body)?;
        debug!(
            choices = result.choices.len(),
            model = %result.model,
            total_tokens = result.usage.map(|u| u.total_tokens),
            "Received completion"
        );
        Ok(result)
    }
}
