// ABOUTME: Database operations for searches and their conversation transcripts
// ABOUTME: Creates, saves and deletes searches and appends transcript messages in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use honing_core::errors::{AppError, AppResult};
use honing_core::models::{
    ConversationMessage, MessageRole, NewConversationMessage, NewSearchQuery, SearchQuery,
    SearchStatus,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::now_timestamp;

/// Search and transcript operations manager
pub struct SearchManager {
    pool: SqlitePool,
}

impl SearchManager {
    /// Create a new search manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Search Operations
    // ========================================================================

    /// Create a new search with unset status
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, search: &NewSearchQuery) -> AppResult<SearchQuery> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO searches (id, theme_id, display_name, query, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULL, $5, $5)
            ",
        )
        .bind(&id)
        .bind(&search.theme_id)
        .bind(&search.display_name)
        .bind(&search.query)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create search: {e}")))?;

        Ok(SearchQuery {
            id,
            theme_id: search.theme_id.clone(),
            display_name: search.display_name.clone(),
            query: search.query.clone(),
            status: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a search by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, search_id: &str) -> AppResult<Option<SearchQuery>> {
        let row = sqlx::query(
            r"
            SELECT id, theme_id, display_name, query, status, created_at, updated_at
            FROM searches
            WHERE id = $1
            ",
        )
        .bind(search_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get search: {e}")))?;

        Ok(row.as_ref().map(search_from_row))
    }

    /// List the searches of a theme, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_for_theme(&self, theme_id: &str) -> AppResult<Vec<SearchQuery>> {
        let rows = sqlx::query(
            r"
            SELECT id, theme_id, display_name, query, status, created_at, updated_at
            FROM searches
            WHERE theme_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(theme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list searches: {e}")))?;

        Ok(rows.iter().map(search_from_row).collect())
    }

    /// Persist status, display name and query
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the search does not exist
    pub async fn save(&self, search: &SearchQuery) -> AppResult<SearchQuery> {
        let now = now_timestamp();

        let result = sqlx::query(
            r"
            UPDATE searches
            SET display_name = $1, query = $2, status = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&search.display_name)
        .bind(&search.query)
        .bind(search.status.as_ref().map(SearchStatus::as_str))
        .bind(&now)
        .bind(&search.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save search: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Search {}", search.id)));
        }

        Ok(SearchQuery {
            updated_at: now,
            ..search.clone()
        })
    }

    /// Delete a search and everything it owns
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, search_id: &str) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for statement in [
            "DELETE FROM result_points WHERE search_id = $1",
            "DELETE FROM result_groups WHERE search_id = $1",
            "DELETE FROM search_messages WHERE search_id = $1",
        ] {
            sqlx::query(statement)
                .bind(search_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete search data: {e}")))?;
        }

        let result = sqlx::query("DELETE FROM searches WHERE id = $1")
            .bind(search_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete search: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit search deletion: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Transcript Operations
    // ========================================================================

    /// Append a message to a search transcript
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_message(
        &self,
        message: &NewConversationMessage,
    ) -> AppResult<ConversationMessage> {
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO search_messages (id, search_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(&message.search_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        Ok(ConversationMessage {
            id,
            search_id: message.search_id.clone(),
            role: message.role,
            content: message.content.clone(),
            created_at: now,
        })
    }

    /// Get all messages for a search in chronological order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a stored role is unknown
    pub async fn list_messages(&self, search_id: &str) -> AppResult<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, search_id, role, content, created_at
            FROM search_messages
            WHERE search_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        rows.iter()
            .map(|r| {
                let role: String = r.get("role");
                let role = MessageRole::parse(&role).ok_or_else(|| {
                    AppError::database(format!("Unknown message role stored: {role}"))
                })?;
                Ok(ConversationMessage {
                    id: r.get("id"),
                    search_id: r.get("search_id"),
                    role,
                    content: r.get("content"),
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}

fn search_from_row(r: &SqliteRow) -> SearchQuery {
    let status: Option<String> = r.get("status");
    SearchQuery {
        id: r.get("id"),
        theme_id: r.get("theme_id"),
        display_name: r.get("display_name"),
        query: r.get("query"),
        status: status.as_deref().and_then(SearchStatus::parse),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
