// ABOUTME: Property chat service producing a rated narrative assessment of a home per topic
// ABOUTME: Handles address cleaning, placeholder substitution, prompt precedence and rating extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Property Chats
//!
//! A chat type is a topic (traffic noise, schools, flood risk...) with a user
//! prompt template. Running it against a home sends one system and one user
//! message, keeps every returned choice, and reads a `Rating: N` line from the
//! last one.
//!
//! Templates may use `{address}`, `{suburb}`, `{addressType}` and `{topic}`.

use std::sync::{Arc, OnceLock};

use honing_core::constants::defaults;
use honing_core::errors::{AppError, AppResult};
use honing_core::models::{Chat, ChatResult, ChatType, Home, NewChat, Theme};
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::config::CompletionSettings;
use crate::database::ChatStore;
use crate::llm::prompts::PROPERTY_CHAT_SYSTEM_PROMPT;
use crate::llm::{ChatMessage, CompletionClient, CompletionResult, PromptConfig};

/// Fragments scraped listing titles carry around the street address
const LISTING_NOISE: &[&str] = &["For sale |", "homes.co.nz"];

/// Remove listing-site noise from a scraped title
///
/// Surrounding whitespace is left alone.
#[must_use]
pub fn clean_address(address: &str) -> String {
    LISTING_NOISE
        .iter()
        .fold(address.to_owned(), |cleaned, noise| cleaned.replace(noise, ""))
}

fn rating_pattern() -> Option<&'static Regex> {
    static RATING_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    RATING_PATTERN
        .get_or_init(|| Regex::new(r"Rating:\s*(\d+)").ok())
        .as_ref()
}

/// First `Rating: N` in a reply, or -1 when there is none
#[must_use]
pub fn extract_rating(message: &str) -> i32 {
    rating_pattern()
        .and_then(|pattern| pattern.captures(message))
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().trim().parse().ok())
        .unwrap_or(defaults::NO_RATING)
}

/// System prompt precedence: chat type override, theme override, default
#[must_use]
pub fn chat_system_prompt<'a>(theme: &'a Theme, chat_type: &'a ChatType) -> &'a str {
    chat_type
        .start_system_prompt_override
        .as_deref()
        .filter(|prompt| !prompt.trim().is_empty())
        .or_else(|| theme.chat_prompt_override())
        .unwrap_or(PROPERTY_CHAT_SYSTEM_PROMPT)
}

/// Substitute the chat placeholders in a template
#[must_use]
pub fn apply_replacements(template: &str, home: &Home, chat_type: &ChatType) -> String {
    [
        ("{address}", home.clean_address.as_str()),
        ("{suburb}", home.clean_suburb.as_str()),
        ("{addressType}", chat_type.address_type.as_str()),
        ("{topic}", chat_type.name.as_str()),
    ]
    .into_iter()
    .fold(template.to_owned(), |text, (placeholder, value)| {
        text.replace(placeholder, value)
    })
}

/// Build the two-message prompt for one chat
#[must_use]
pub fn build_chat_prompt_config(
    home: &Home,
    chat_type: &ChatType,
    theme: &Theme,
    settings: &CompletionSettings,
) -> PromptConfig {
    let system = apply_replacements(chat_system_prompt(theme, chat_type), home, chat_type);
    let user = apply_replacements(&chat_type.prompt, home, chat_type);

    PromptConfig::new(
        vec![ChatMessage::system(system), ChatMessage::user(user)],
        settings.api_token.clone(),
        false,
    )
}

/// Turn a completion into a chat record
///
/// # Errors
///
/// Returns an empty-completion error when there are no choices
pub fn build_chat(
    result: &CompletionResult,
    home: &Home,
    chat_type: &ChatType,
    prompt: &str,
) -> AppResult<NewChat> {
    let last = result
        .last_choice()
        .ok_or_else(AppError::empty_completion)?;

    Ok(NewChat {
        home_id: home.id.clone(),
        chat_type_id: chat_type.id.clone(),
        chat_type_title: chat_type.name.clone(),
        theme_id: chat_type.theme_id.clone(),
        prompt: prompt.to_owned(),
        rating: extract_rating(&last.content),
        results: result
            .choices
            .iter()
            .map(|choice| ChatResult {
                role: choice.role,
                content: choice.content.clone(),
            })
            .collect(),
    })
}

/// Runs chat types against homes and stores the results
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    client: Arc<dyn CompletionClient>,
    settings: CompletionSettings,
}

impl ChatService {
    /// Create a chat service
    #[must_use]
    pub fn new(
        store: Arc<dyn ChatStore>,
        client: Arc<dyn CompletionClient>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Run one chat type against a home
    ///
    /// # Errors
    ///
    /// Returns the completion client's error, an empty-completion error, or a
    /// persistence error
    #[instrument(skip_all, fields(home_id = %home.id, chat_type = %chat_type.name))]
    pub async fn run_chat(&self, home: &Home, chat_type: &ChatType, theme: &Theme) -> AppResult<Chat> {
        let prompt = build_chat_prompt_config(home, chat_type, theme, &self.settings);
        let result = self.client.invoke(&prompt).await?;

        let user_prompt = prompt.user_prompt().unwrap_or_default();
        let chat = build_chat(&result, home, chat_type, user_prompt)?;
        if chat.rating == defaults::NO_RATING {
            warn!("Reply carried no rating");
        }

        let stored = self.store.create_chat(&chat).await?;
        info!(chat_id = %stored.id, rating = stored.rating, "Stored property chat");
        Ok(stored)
    }

    /// Run every chat type of a theme against a home, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Self::run_chat`] or by listing the
    /// chat types
    pub async fn run_all_chats(&self, home: &Home, theme: &Theme) -> AppResult<Vec<Chat>> {
        let chat_types = self.store.list_chat_types(&theme.id).await?;
        let mut chats = Vec::with_capacity(chat_types.len());
        for chat_type in &chat_types {
            chats.push(self.run_chat(home, chat_type, theme).await?);
        }
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_address() {
        let cases = [
            ("123 Main Street", "123 Main Street"),
            ("For sale | 123 Main Street", " 123 Main Street"),
            ("123 Main Street homes.co.nz", "123 Main Street "),
            ("For sale | 123 Main Street homes.co.nz", " 123 Main Street "),
        ];
        for (give, want) in cases {
            assert_eq!(clean_address(give), want, "clean_address({give:?})");
        }
    }

    #[test]
    fn test_extract_rating() {
        let cases = [
            ("User's feedback. Rating: 5", 5),
            ("User's feedback. Rating: 123", 123),
            ("User's feedback. Rating: five", -1),
            ("User's feedback.", -1),
            ("User's feedback. Rating:", -1),
            ("User liked the product.\n\t\t**Rating: 8**", 8),
            ("Rating: 5 and Rating: 10", 5),
            ("Rating:    9", 9),
            ("Rating: -2", -1),
            ("Rating:10", 10),
            ("Rating: 99999999999999999999", -1),
        ];
        for (message, want) in cases {
            assert_eq!(extract_rating(message), want, "extract_rating({message:?})");
        }
    }

    #[test]
    fn test_system_prompt_precedence() {
        let mut theme = Theme::default();
        let mut chat_type = ChatType::default();
        assert_eq!(
            chat_system_prompt(&theme, &chat_type),
            PROPERTY_CHAT_SYSTEM_PROMPT
        );

        theme.start_system_prompt = Some("theme prompt".into());
        assert_eq!(chat_system_prompt(&theme, &chat_type), "theme prompt");

        chat_type.start_system_prompt_override = Some("chat type prompt".into());
        assert_eq!(chat_system_prompt(&theme, &chat_type), "chat type prompt");
    }

    #[test]
    fn test_placeholders_replaced_everywhere() {
        let home = Home {
            clean_address: "7 Middleton Road".into(),
            clean_suburb: "Riccarton".into(),
            ..Home::default()
        };
        let chat_type = ChatType {
            name: "traffic noise".into(),
            prompt: "How is {topic} at {address}, {suburb}? Judge the {addressType}.".into(),
            address_type: "street".into(),
            ..ChatType::default()
        };
        let config = build_chat_prompt_config(
            &home,
            &chat_type,
            &Theme::default(),
            &CompletionSettings::with_token("t"),
        );

        assert_eq!(
            config.messages[1].content,
            "How is traffic noise at 7 Middleton Road, Riccarton? Judge the street."
        );
        assert!(config.messages[0].content.contains("researching traffic noise"));
        assert_eq!(config.auth_token.as_deref(), Some("t"));
    }
}
