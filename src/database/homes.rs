// ABOUTME: Database operations for homes, chat types and generated property chats
// ABOUTME: Persists chats together with every returned choice in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use honing_core::errors::{AppError, AppResult};
use honing_core::models::{
    Chat, ChatResult, ChatType, Home, MessageRole, NewChat, NewChatType, NewHome,
};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::now_timestamp;

/// Home, chat type and chat operations manager
pub struct HomeManager {
    pool: SqlitePool,
}

impl HomeManager {
    /// Create a new home manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Homes
    // ========================================================================

    /// Register a home
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_home(&self, home: &NewHome) -> AppResult<Home> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO homes (id, title, url, clean_address, clean_suburb, lat, lng, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&id)
        .bind(&home.title)
        .bind(home.url.as_deref())
        .bind(&home.clean_address)
        .bind(&home.clean_suburb)
        .bind(home.lat)
        .bind(home.lng)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create home: {e}")))?;

        Ok(Home {
            id,
            title: home.title.clone(),
            url: home.url.clone(),
            clean_address: home.clean_address.clone(),
            clean_suburb: home.clean_suburb.clone(),
            lat: home.lat,
            lng: home.lng,
        })
    }

    /// Get a home by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_home(&self, home_id: &str) -> AppResult<Option<Home>> {
        let row = sqlx::query(
            r"
            SELECT id, title, url, clean_address, clean_suburb, lat, lng
            FROM homes
            WHERE id = $1
            ",
        )
        .bind(home_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get home: {e}")))?;

        Ok(row.map(|r| Home {
            id: r.get("id"),
            title: r.get("title"),
            url: r.get("url"),
            clean_address: r.get("clean_address"),
            clean_suburb: r.get("clean_suburb"),
            lat: r.get("lat"),
            lng: r.get("lng"),
        }))
    }

    // ========================================================================
    // Chat Types
    // ========================================================================

    /// Define a chat type
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_chat_type(&self, chat_type: &NewChatType) -> AppResult<ChatType> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO chat_types (id, theme_id, name, prompt, address_type, start_system_prompt_override, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(&chat_type.theme_id)
        .bind(&chat_type.name)
        .bind(&chat_type.prompt)
        .bind(&chat_type.address_type)
        .bind(chat_type.start_system_prompt_override.as_deref())
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat type: {e}")))?;

        Ok(ChatType {
            id,
            theme_id: chat_type.theme_id.clone(),
            name: chat_type.name.clone(),
            prompt: chat_type.prompt.clone(),
            address_type: chat_type.address_type.clone(),
            start_system_prompt_override: chat_type.start_system_prompt_override.clone(),
        })
    }

    /// Chat types of a theme in creation order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_chat_types(&self, theme_id: &str) -> AppResult<Vec<ChatType>> {
        let rows = sqlx::query(
            r"
            SELECT id, theme_id, name, prompt, address_type, start_system_prompt_override
            FROM chat_types
            WHERE theme_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(theme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat types: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| ChatType {
                id: r.get("id"),
                theme_id: r.get("theme_id"),
                name: r.get("name"),
                prompt: r.get("prompt"),
                address_type: r.get("address_type"),
                start_system_prompt_override: r.get("start_system_prompt_override"),
            })
            .collect())
    }

    // ========================================================================
    // Chats
    // ========================================================================

    /// Persist a chat and its results atomically
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_chat(&self, chat: &NewChat) -> AppResult<Chat> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO chats (id, home_id, chat_type_id, chat_type_title, theme_id, prompt, rating, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&id)
        .bind(&chat.home_id)
        .bind(&chat.chat_type_id)
        .bind(&chat.chat_type_title)
        .bind(&chat.theme_id)
        .bind(&chat.prompt)
        .bind(chat.rating)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat: {e}")))?;

        for result in &chat.results {
            sqlx::query("INSERT INTO chat_results (chat_id, role, content) VALUES ($1, $2, $3)")
                .bind(&id)
                .bind(result.role.as_str())
                .bind(&result.content)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to store chat result: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit chat: {e}")))?;

        Ok(Chat {
            id,
            home_id: chat.home_id.clone(),
            chat_type_id: chat.chat_type_id.clone(),
            chat_type_title: chat.chat_type_title.clone(),
            theme_id: chat.theme_id.clone(),
            prompt: chat.prompt.clone(),
            rating: chat.rating,
            results: chat.results.clone(),
            created_at: now,
        })
    }

    /// Chats generated for a home, oldest first, with their results
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_chats(&self, home_id: &str) -> AppResult<Vec<Chat>> {
        let chat_rows = sqlx::query(
            r"
            SELECT id, home_id, chat_type_id, chat_type_title, theme_id, prompt, rating, created_at
            FROM chats
            WHERE home_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(home_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list chats: {e}")))?;

        let result_rows = sqlx::query(
            r"
            SELECT r.chat_id, r.role, r.content
            FROM chat_results r
            JOIN chats c ON c.id = r.chat_id
            WHERE c.home_id = $1
            ORDER BY r.id ASC
            ",
        )
        .bind(home_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat results: {e}")))?;

        let mut results_by_chat: HashMap<String, Vec<ChatResult>> = HashMap::new();
        for r in result_rows {
            let role: String = r.get("role");
            results_by_chat
                .entry(r.get("chat_id"))
                .or_default()
                .push(ChatResult {
                    role: MessageRole::parse(&role).unwrap_or(MessageRole::Assistant),
                    content: r.get("content"),
                });
        }

        Ok(chat_rows
            .into_iter()
            .map(|r| {
                let id: String = r.get("id");
                let results = results_by_chat.remove(&id).unwrap_or_default();
                Chat {
                    id,
                    home_id: r.get("home_id"),
                    chat_type_id: r.get("chat_type_id"),
                    chat_type_title: r.get("chat_type_title"),
                    theme_id: r.get("theme_id"),
                    prompt: r.get("prompt"),
                    rating: r.get("rating"),
                    results,
                    created_at: r.get("created_at"),
                }
            })
            .collect())
    }
}
