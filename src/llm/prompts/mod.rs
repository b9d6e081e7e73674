// ABOUTME: Default system prompts loaded at compile time from markdown files
// ABOUTME: Provides the fractal search instructions and the property chat framing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.
//! Themes and chat types may replace either one; these are the fallbacks.

/// Instructions for geographic enumeration
///
/// States the `fractal-search/v2` output protocol: `#` headings, `-` bullets
/// with `title - location`, and a final `LIST IS COMPLETE` /
/// `LIST IS INCOMPLETE` line that the parser reads as the completion flag.
pub const FRACTAL_SEARCH_SYSTEM_PROMPT: &str = include_str!("fractal_search_system.md");

/// Framing for single-topic property assessments ending in `Rating: N`
pub const PROPERTY_CHAT_SYSTEM_PROMPT: &str = include_str!("property_chat_system.md");

/// Get the default system prompt for fractal searches
#[must_use]
pub const fn fractal_search_system_prompt() -> &'static str {
    FRACTAL_SEARCH_SYSTEM_PROMPT
}

/// Get the default system prompt for property chats
///
/// Contains a `{topic}` placeholder substituted per chat type.
#[must_use]
pub const fn property_chat_system_prompt() -> &'static str {
    PROPERTY_CHAT_SYSTEM_PROMPT
}

#[cfg(test)]
mod tests {
    use super::*;
    use honing_core::constants::protocol;

    #[test]
    fn test_search_prompt_states_protocol() {
        let prompt = fractal_search_system_prompt();
        assert!(prompt.contains(protocol::FRACTAL_SEARCH_PROTOCOL));
        assert!(prompt.contains(protocol::LIST_COMPLETE));
        assert!(prompt.contains(protocol::LIST_INCOMPLETE));
    }

    #[test]
    fn test_chat_prompt_has_topic_placeholder() {
        assert!(property_chat_system_prompt().contains("{topic}"));
        assert!(property_chat_system_prompt().contains("Rating: 3"));
    }
}
