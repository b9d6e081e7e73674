// ABOUTME: Search-progress engine driving multi-round fractal searches
// ABOUTME: Orchestrates prompt building, completion, parsing, persistence and status updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Search-Progress Engine
//!
//! A fractal search enumerates places matching a free-text query over several
//! rounds. Each round replays the stored transcript, asks the same question
//! again, parses the reply into groups and points, and records whether the
//! assistant said the list is complete.
//!
//! ## Round steps
//!
//! 1. Load the transcript
//! 2. Build the prompt ([`build_prompt_config`])
//! 3. Invoke the completion client
//! 4. Dry run: stop here, nothing is persisted
//! 5. Reject a completion with zero choices
//! 6. Persist the new prompt turns and the assistant reply
//! 7. Parse ([`parse_response`]) and persist groups, then their points
//! 8. Save the status derived from the completion flag
//!
//! Any failure aborts the round. Writes already made stay in place; the
//! caller's [`SearchQuery`] is never modified.

pub mod parser;
pub mod placement;
pub mod prompt;

pub use parser::{parse_content, parse_response, ParseOutcome, ParsedGroup};
pub use placement::{place_points, GeocodeCandidate, Geocoder};
pub use prompt::{build_prompt_config, search_system_prompt};

use std::sync::Arc;

use honing_core::errors::{AppError, AppResult};
use honing_core::models::{
    MessageRole, NewConversationMessage, ResultGroup, ResultPoint, SearchQuery, SearchStatus,
    Theme,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::CompletionSettings;
use crate::database::SearchStore;
use crate::llm::{ChatMessage, CompletionClient, PromptConfig};

/// Options for one round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRequest {
    /// Build and validate the prompt without calling the API or persisting
    pub dry_run: bool,
}

impl RoundRequest {
    /// A round that calls the API and persists its results
    #[must_use]
    pub const fn live() -> Self {
        Self { dry_run: false }
    }

    /// A round that stops after building the request
    #[must_use]
    pub const fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// What one round produced
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// The search as saved; unchanged for dry runs
    pub search: SearchQuery,
    /// Prompt that was sent (or would have been)
    pub prompt: PromptConfig,
    /// Groups persisted this round
    pub groups: Vec<ResultGroup>,
    /// Points persisted this round, stamped with their group IDs
    pub points: Vec<ResultPoint>,
    /// Whether the assistant reported the enumeration finished
    pub is_complete: bool,
}

/// Drives rounds of a fractal search against injected collaborators
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn SearchStore>,
    client: Arc<dyn CompletionClient>,
    settings: CompletionSettings,
}

impl SearchEngine {
    /// Create an engine over a store and a completion client
    #[must_use]
    pub fn new(
        store: Arc<dyn SearchStore>,
        client: Arc<dyn CompletionClient>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Access the underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SearchStore> {
        &self.store
    }

    /// Run one round of a search
    ///
    /// # Errors
    ///
    /// Returns the first failure among: loading the transcript, invoking the
    /// completion client, an empty completion, or any persistence write.
    #[instrument(skip(self, search, theme), fields(search_id = %search.id, client = self.client.name(), dry_run = request.dry_run))]
    pub async fn run_round(
        &self,
        search: &SearchQuery,
        theme: &Theme,
        request: RoundRequest,
    ) -> AppResult<RoundOutcome> {
        let transcript = self.store.list_messages(&search.id).await?;
        let prompt =
            build_prompt_config(search, &transcript, theme, &self.settings, request.dry_run);

        let result = self.client.invoke(&prompt).await?;

        if request.dry_run {
            info!(messages = prompt.messages.len(), "Dry run complete, nothing persisted");
            return Ok(RoundOutcome {
                search: search.clone(),
                prompt,
                groups: Vec::new(),
                points: Vec::new(),
                is_complete: search.is_complete(),
            });
        }

        let reply = result
            .last_choice()
            .ok_or_else(AppError::empty_completion)?;

        for message in prompt.messages.iter().skip(transcript.len()) {
            self.append_message(&search.id, message).await?;
        }
        self.append_message(
            &search.id,
            &ChatMessage::new(MessageRole::Assistant, reply.content.as_str()),
        )
        .await?;

        let parsed = parse_response(&result, search)?;

        let mut groups = Vec::with_capacity(parsed.groups.len());
        let mut points = Vec::with_capacity(parsed.point_count());
        for parsed_group in parsed.groups {
            let group = self
                .store
                .create_result_group(&parsed_group.to_new_group())
                .await?;
            for draft in parsed_group.points {
                let point = self
                    .store
                    .create_result_point(&draft.into_new_point(&group.id))
                    .await?;
                points.push(point);
            }
            groups.push(group);
        }

        let updated = SearchQuery {
            status: Some(SearchStatus::from_completion(parsed.is_complete)),
            ..search.clone()
        };
        let saved = self.store.save_search(&updated).await?;

        info!(
            groups = groups.len(),
            points = points.len(),
            is_complete = parsed.is_complete,
            "Search round complete"
        );

        Ok(RoundOutcome {
            search: saved,
            prompt,
            groups,
            points,
            is_complete: parsed.is_complete,
        })
    }

    /// Load a search and its theme by ID, then run one round
    ///
    /// # Errors
    ///
    /// Returns not-found when the search or its theme is missing, otherwise as
    /// [`Self::run_round`].
    pub async fn progress(&self, search_id: &str, request: RoundRequest) -> AppResult<RoundOutcome> {
        let search = self
            .store
            .get_search(search_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Search {search_id}")))?;
        let theme = self
            .store
            .get_theme(&search.theme_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Theme {}", search.theme_id)))?;

        self.run_round(&search, &theme, request).await
    }

    /// Geocode every stored point of a search and persist the outcome
    ///
    /// # Errors
    ///
    /// Returns an error if loading the points or saving a location fails.
    /// Geocoding failures are recorded as point warnings instead.
    #[instrument(skip(self, geocoder), fields(search_id = %search_id))]
    pub async fn place_search_points(
        &self,
        search_id: &str,
        geocoder: &dyn Geocoder,
    ) -> AppResult<Vec<ResultPoint>> {
        let points = self.store.list_result_points(search_id).await?;
        let placed = place_points(points, geocoder).await;

        for point in &placed {
            self.store
                .update_point_location(&point.id, point.lat, point.lng, &point.warning_message)
                .await?;
        }

        debug!(
            placed = placed.iter().filter(|p| p.is_placed()).count(),
            total = placed.len(),
            "Placement pass complete"
        );
        Ok(placed)
    }

    async fn append_message(&self, search_id: &str, message: &ChatMessage) -> AppResult<()> {
        self.store
            .create_message(&NewConversationMessage {
                search_id: search_id.to_owned(),
                role: message.role,
                content: message.content.clone(),
            })
            .await?;
        Ok(())
    }
}
