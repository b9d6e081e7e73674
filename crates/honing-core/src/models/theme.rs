// ABOUTME: Theme records bundling prompt overrides shared across searches and chats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Named bundle of prompt overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Theme {
    /// Unique theme ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Replaces the default geographic search system prompt
    pub start_geo_system_prompt: Option<String>,
    /// Replaces the default property chat system prompt
    pub start_system_prompt: Option<String>,
}

impl Theme {
    /// Override for the search system prompt, ignoring blank values
    #[must_use]
    pub fn geo_prompt_override(&self) -> Option<&str> {
        self.start_geo_system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }

    /// Override for the property chat system prompt, ignoring blank values
    #[must_use]
    pub fn chat_prompt_override(&self) -> Option<&str> {
        self.start_system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }
}

/// Fields required to create a theme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTheme {
    /// Display name
    pub name: String,
    /// Optional search system prompt override
    pub start_geo_system_prompt: Option<String>,
    /// Optional chat system prompt override
    pub start_system_prompt: Option<String>,
}
