// ABOUTME: Main library entry point for the Honing Inn home research engine
// ABOUTME: Exposes the fractal search engine, property chats, persistence and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Honing Inn
//!
//! Research candidate homes by asking an online language model two kinds of
//! questions:
//!
//! - **Fractal searches**: "Parks in Christchurch", "Great Walks in New
//!   Zealand". Each round asks again, the reply is parsed into groups of
//!   points, and the search is marked complete once the model says the list
//!   is exhausted. Points can then be geocoded onto the map.
//! - **Property chats**: a narrative assessment of one home against one topic,
//!   ending in a relative `Rating: N`.
//!
//! ## Architecture
//!
//! - **`search`**: prompt construction, response parsing, round orchestration
//!   and point placement
//! - **`chat`**: property chat prompts, rating extraction and the chat service
//! - **`llm`**: the completion client trait and the Perplexity implementation
//! - **`database`**: store traits and their `SQLite` implementation
//! - **`config`** / **`logging`**: environment configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use honing_inn::config::ServerConfig;
//! use honing_inn::database::{Database, SearchStore};
//! use honing_inn::errors::AppResult;
//! use honing_inn::llm::PerplexityClient;
//! use honing_inn::models::{NewSearchQuery, NewTheme};
//! use honing_inn::search::{RoundRequest, SearchEngine};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Arc::new(Database::new(&config.database_url).await?);
//!     let client = Arc::new(PerplexityClient::new(config.completion.clone())?);
//!     let engine = SearchEngine::new(database.clone(), client, config.completion);
//!
//!     let theme = database.create_theme(&NewTheme { name: "Parks".into(), ..NewTheme::default() }).await?;
//!     let search = database
//!         .create_search(&NewSearchQuery {
//!             theme_id: theme.id.clone(),
//!             display_name: "Christchurch".into(),
//!             query: "Parks in Christchurch by size".into(),
//!         })
//!         .await?;
//!
//!     let outcome = engine.run_round(&search, &theme, RoundRequest::live()).await?;
//!     println!("{} points, complete: {}", outcome.points.len(), outcome.is_complete);
//!     Ok(())
//! }
//! ```

/// Property chats rating a home against one topic
pub mod chat;

/// Environment configuration
pub mod config;

/// Store traits and the `SQLite` implementation
pub mod database;

/// Completion client abstraction and providers
pub mod llm;

/// Tracing subscriber setup
pub mod logging;

/// Search-progress engine
pub mod search;

pub use honing_core::{constants, errors, models};
