// ABOUTME: Search query record and its progress status
// ABOUTME: A search is a free-text geographic query scoped to a location and a theme
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of a search across rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStatus {
    /// At least one round ran and the assistant has more to enumerate
    InProgress,
    /// The assistant emitted the completion sentinel
    Complete,
}

impl SearchStatus {
    /// Stored string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        }
    }

    /// Parse the stored representation; unknown values read as unset
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in-progress" => Some(Self::InProgress),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    /// Status that follows a round with the given completion flag
    #[must_use]
    pub const fn from_completion(is_complete: bool) -> Self {
        if is_complete {
            Self::Complete
        } else {
            Self::InProgress
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-issued search ("fractal search")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Unique search ID
    pub id: String,
    /// Theme supplying prompt overrides
    pub theme_id: String,
    /// Location the query is scoped to, e.g. "Christchurch"
    pub display_name: String,
    /// Free-text query sent verbatim as the user turn
    pub query: String,
    /// Unset until the first round completes
    pub status: Option<SearchStatus>,
    /// When the search was created (ISO 8601)
    pub created_at: String,
    /// When the search was last saved (ISO 8601)
    pub updated_at: String,
}

impl SearchQuery {
    /// Whether the assistant reported the enumeration finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == Some(SearchStatus::Complete)
    }
}

/// Fields required to create a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSearchQuery {
    /// Theme supplying prompt overrides
    pub theme_id: String,
    /// Location display name
    pub display_name: String,
    /// Free-text query
    pub query: String,
}
