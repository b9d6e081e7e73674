// ABOUTME: Core data models for searches, transcripts, results, themes and property chats
// ABOUTME: Plain serde records shared by the engine, the store and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod home;
mod message;
mod result;
mod search;
mod theme;

pub use home::{Chat, ChatResult, ChatType, Home, NewChat, NewChatType, NewHome};
pub use message::{ConversationMessage, MessageRole, NewConversationMessage};
pub use result::{NewResultGroup, NewResultPoint, PointDraft, ResultGroup, ResultPoint};
pub use search::{NewSearchQuery, SearchQuery, SearchStatus};
pub use theme::{NewTheme, Theme};
