// ABOUTME: Completion client abstraction for the chat-completions API
// ABOUTME: Defines messages, prompt configuration, results, and the CompletionClient trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Completion Client Interface
//!
//! This module defines the contract between the search engine (and the
//! property chat service) and the text-generation API.
//!
//! ## Key Concepts
//!
//! - **`ChatMessage`**: Role-based message structure for conversations
//! - **`PromptConfig`**: The ordered messages for one round plus the resolved
//!   auth token and the dry-run flag
//! - **`CompletionResult`**: The choices returned by the API
//! - **`CompletionClient`**: Async trait implemented by [`PerplexityClient`]
//!   and by in-process fakes in tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use honing_inn::config::CompletionSettings;
//! use honing_inn::llm::{ChatMessage, CompletionClient, PerplexityClient, PromptConfig};
//!
//! async fn example() -> honing_core::errors::AppResult<()> {
//!     let settings = CompletionSettings::with_token("pplx-...");
//!     let client = PerplexityClient::new(settings.clone())?;
//!     let prompt = PromptConfig::new(
//!         vec![ChatMessage::user("Great walks in Canterbury")],
//!         settings.api_token.clone(),
//!         false,
//!     );
//!     let result = client.invoke(&prompt).await?;
//!     println!("{} choices", result.choices.len());
//!     Ok(())
//! }
//! ```

mod perplexity;
pub mod prompts;

pub use perplexity::PerplexityClient;

use async_trait::async_trait;
use honing_core::errors::AppResult;
use honing_core::models::{ConversationMessage, MessageRole};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Message Types
// ============================================================================

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<&ConversationMessage> for ChatMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Everything the completion client needs for one invocation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Ordered transcript to send
    pub messages: Vec<ChatMessage>,
    /// Bearer token resolved from injected settings
    pub auth_token: Option<String>,
    /// Build and validate the request without sending it
    pub dry_run: bool,
}

impl PromptConfig {
    /// Create a prompt configuration
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>, auth_token: Option<String>, dry_run: bool) -> Self {
        Self {
            messages,
            auth_token,
            dry_run,
        }
    }

    /// The last user turn, if any
    #[must_use]
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::User)
            .map(|message| message.content.as_str())
    }
}

impl fmt::Debug for PromptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptConfig")
            .field("messages", &self.messages)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// One candidate reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// Role reported by the API (normally assistant)
    pub role: MessageRole,
    /// Reply text
    pub content: String,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

impl CompletionChoice {
    /// Assistant choice with the given text
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            finish_reason: None,
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// Successful completion; may legitimately carry zero choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Returned choices in API order
    pub choices: Vec<CompletionChoice>,
    /// Model that produced the reply, empty for dry runs
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
}

impl CompletionResult {
    /// Result carrying the given choices
    #[must_use]
    pub fn from_choices(choices: Vec<CompletionChoice>) -> Self {
        Self {
            choices,
            ..Self::default()
        }
    }

    /// The choice the engine acts on
    #[must_use]
    pub fn last_choice(&self) -> Option<&CompletionChoice> {
        self.choices.last()
    }
}

// ============================================================================
// Client Trait
// ============================================================================

/// Chat-completions client
///
/// Implementations must treat a missing auth token, a transport failure, a
/// non-success status and an undecodable body as distinct terminal errors, and
/// must not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Send the prompt and return the API's choices
    ///
    /// A dry run returns an empty result without touching the network.
    async fn invoke(&self, prompt: &PromptConfig) -> AppResult<CompletionResult>;
}
