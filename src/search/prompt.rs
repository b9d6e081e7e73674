// ABOUTME: Builds the message list for one fractal search round
// ABOUTME: Seeds new transcripts with a system prompt and always appends the query as a user turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use honing_core::models::{ConversationMessage, SearchQuery, Theme};
use tracing::debug;

use crate::config::CompletionSettings;
use crate::llm::prompts::FRACTAL_SEARCH_SYSTEM_PROMPT;
use crate::llm::{ChatMessage, PromptConfig};

/// System prompt for a theme: its override when set, the default otherwise
#[must_use]
pub fn search_system_prompt(theme: &Theme) -> &str {
    theme
        .geo_prompt_override()
        .unwrap_or(FRACTAL_SEARCH_SYSTEM_PROMPT)
}

/// Build the prompt for the next round of a search
///
/// An empty transcript is seeded with the theme's system prompt. Either way
/// the literal query text is appended as a new user turn, so a continuation
/// asks the same question again and the assistant lists what it has not
/// listed yet. The auth token comes from the injected settings.
#[must_use]
pub fn build_prompt_config(
    search: &SearchQuery,
    transcript: &[ConversationMessage],
    theme: &Theme,
    settings: &CompletionSettings,
    dry_run: bool,
) -> PromptConfig {
    let mut messages: Vec<ChatMessage> = if transcript.is_empty() {
        vec![ChatMessage::system(search_system_prompt(theme))]
    } else {
        transcript.iter().map(ChatMessage::from).collect()
    };
    messages.push(ChatMessage::user(search.query.as_str()));

    debug!(
        search_id = %search.id,
        transcript_len = transcript.len(),
        messages = messages.len(),
        theme_override = theme.geo_prompt_override().is_some(),
        dry_run,
        "Built search prompt"
    );

    PromptConfig::new(messages, settings.api_token.clone(), dry_run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use honing_core::models::MessageRole;

    fn search() -> SearchQuery {
        SearchQuery {
            id: "s1".into(),
            theme_id: "t1".into(),
            display_name: "Christchurch".into(),
            query: "Parks in {location}".into(),
            status: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        let theme = Theme {
            start_geo_system_prompt: Some("   ".into()),
            ..Theme::default()
        };
        assert_eq!(search_system_prompt(&theme), FRACTAL_SEARCH_SYSTEM_PROMPT);
    }

    #[test]
    fn test_query_sent_literally() {
        let config = build_prompt_config(
            &search(),
            &[],
            &Theme::default(),
            &CompletionSettings::default(),
            false,
        );
        assert_eq!(config.messages[1].role, MessageRole::User);
        assert_eq!(config.messages[1].content, "Parks in {location}");
        assert!(config.auth_token.is_none());
    }
}
