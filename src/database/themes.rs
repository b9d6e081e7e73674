// ABOUTME: Database operations for themes and their prompt overrides
// ABOUTME: Themes group searches and chat types and may replace the default system prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use honing_core::errors::{AppError, AppResult};
use honing_core::models::{NewTheme, Theme};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::now_timestamp;

/// Theme operations manager
pub struct ThemeManager {
    pool: SqlitePool,
}

impl ThemeManager {
    /// Create a new theme manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a theme
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, theme: &NewTheme) -> AppResult<Theme> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO themes (id, name, start_geo_system_prompt, start_system_prompt, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(&theme.name)
        .bind(theme.start_geo_system_prompt.as_deref())
        .bind(theme.start_system_prompt.as_deref())
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create theme: {e}")))?;

        Ok(Theme {
            id,
            name: theme.name.clone(),
            start_geo_system_prompt: theme.start_geo_system_prompt.clone(),
            start_system_prompt: theme.start_system_prompt.clone(),
        })
    }

    /// Get a theme by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, theme_id: &str) -> AppResult<Option<Theme>> {
        let row = sqlx::query(
            r"
            SELECT id, name, start_geo_system_prompt, start_system_prompt
            FROM themes
            WHERE id = $1
            ",
        )
        .bind(theme_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get theme: {e}")))?;

        Ok(row.map(|r| Theme {
            id: r.get("id"),
            name: r.get("name"),
            start_geo_system_prompt: r.get("start_geo_system_prompt"),
            start_system_prompt: r.get("start_system_prompt"),
        }))
    }
}
