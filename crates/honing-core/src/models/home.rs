// ABOUTME: Candidate homes, chat types and the narrative assessments generated for them
// ABOUTME: Records for the property chat flow that rates a home against one topic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::MessageRole;

/// A candidate home placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Home {
    /// Unique home ID
    pub id: String,
    /// Listing title as scraped
    pub title: String,
    /// Listing URL
    pub url: Option<String>,
    /// Street address with listing noise removed
    pub clean_address: String,
    /// Suburb
    pub clean_suburb: String,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// A topic a home can be assessed against (noise, schools, flooding...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatType {
    /// Unique chat type ID
    pub id: String,
    /// Theme this chat type belongs to
    pub theme_id: String,
    /// Topic name, substituted for `{topic}`
    pub name: String,
    /// User prompt template
    pub prompt: String,
    /// Substituted for `{addressType}`, e.g. "address" or "suburb"
    pub address_type: String,
    /// Highest-precedence system prompt
    pub start_system_prompt_override: Option<String>,
}

/// One choice returned for a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Role reported by the API
    pub role: MessageRole,
    /// Narrative text
    pub content: String,
}

/// A generated assessment of a home for one chat type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat ID
    pub id: String,
    /// Assessed home
    pub home_id: String,
    /// Chat type used
    pub chat_type_id: String,
    /// Chat type name at generation time
    pub chat_type_title: String,
    /// Theme of the chat type
    pub theme_id: String,
    /// User prompt sent
    pub prompt: String,
    /// Rating extracted from the last choice, -1 when absent
    pub rating: i32,
    /// All returned choices
    pub results: Vec<ChatResult>,
    /// When the chat was created (ISO 8601)
    pub created_at: String,
}

/// Fields required to store a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChat {
    /// Assessed home
    pub home_id: String,
    /// Chat type used
    pub chat_type_id: String,
    /// Chat type name
    pub chat_type_title: String,
    /// Theme of the chat type
    pub theme_id: String,
    /// User prompt sent
    pub prompt: String,
    /// Extracted rating
    pub rating: i32,
    /// Returned choices
    pub results: Vec<ChatResult>,
}

/// Fields supplied when registering a home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewHome {
    /// Listing title as scraped
    pub title: String,
    /// Listing URL
    pub url: Option<String>,
    /// Street address with listing noise removed
    pub clean_address: String,
    /// Suburb
    pub clean_suburb: String,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// Fields supplied when defining a chat type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewChatType {
    /// Theme this chat type belongs to
    pub theme_id: String,
    /// Topic name
    pub name: String,
    /// User prompt template
    pub prompt: String,
    /// Address granularity substituted for `{addressType}`
    pub address_type: String,
    /// Highest-precedence system prompt
    pub start_system_prompt_override: Option<String>,
}
