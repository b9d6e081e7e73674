// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory databases, fixtures and a scripted completion client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `honing_inn`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::collections::VecDeque;
use std::env;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use honing_inn::config::CompletionSettings;
use honing_inn::database::{Database, SearchStore};
use honing_inn::errors::{AppError, AppResult, ErrorCode};
use honing_inn::llm::{CompletionChoice, CompletionClient, CompletionResult, PromptConfig};
use honing_inn::models::{NewSearchQuery, NewTheme, SearchQuery, Theme};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls verbosity, default WARN keeps output quiet
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> AppResult<Arc<Database>> {
    init_test_logging();
    Ok(Arc::new(Database::new("sqlite::memory:").await?))
}

/// Settings carrying a fake token so clients accept invocations
pub fn test_settings() -> CompletionSettings {
    CompletionSettings::with_token("test-token")
}

/// Theme without prompt overrides
pub async fn create_test_theme(store: &dyn SearchStore) -> Theme {
    store
        .create_theme(&NewTheme {
            name: "Parks".into(),
            ..NewTheme::default()
        })
        .await
        .unwrap()
}

/// Search for parks in Christchurch under the given theme
pub async fn create_test_search(store: &dyn SearchStore, theme: &Theme) -> SearchQuery {
    store
        .create_search(&NewSearchQuery {
            theme_id: theme.id.clone(),
            display_name: "Christchurch".into(),
            query: "Parks in Christchurch by size".into(),
        })
        .await
        .unwrap()
}

/// A scripted answer for [`ScriptedClient`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Successful completion with these choice texts
    Choices(Vec<String>),
    /// Failure with this code and message
    Failure(ErrorCode, String),
}

impl ScriptedReply {
    /// Single-choice success
    pub fn text(content: &str) -> Self {
        Self::Choices(vec![content.to_owned()])
    }

    /// Success with zero choices
    pub const fn empty() -> Self {
        Self::Choices(Vec::new())
    }
}

/// Completion client answering from a script and recording every prompt
///
/// Follows the client contract: a missing token fails first, and a dry run
/// returns an empty result without consuming a scripted reply.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<PromptConfig>>,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<PromptConfig> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn invoke(&self, prompt: &PromptConfig) -> AppResult<CompletionResult> {
        self.prompts.lock().unwrap().push(prompt.clone());

        if prompt.auth_token.as_deref().unwrap_or_default().is_empty() {
            return Err(AppError::config_missing("API token not set"));
        }
        if prompt.dry_run {
            return Ok(CompletionResult::default());
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client ran out of replies");

        match reply {
            ScriptedReply::Choices(texts) => Ok(CompletionResult::from_choices(
                texts
                    .into_iter()
                    .map(CompletionChoice::assistant)
                    .collect(),
            )),
            ScriptedReply::Failure(code, message) => Err(AppError::new(code, message)),
        }
    }
}
