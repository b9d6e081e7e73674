// ABOUTME: Database operations for result groups and result points
// ABOUTME: Stores parsed groups and points and records placement outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use honing_core::errors::{AppError, AppResult};
use honing_core::models::{NewResultGroup, NewResultPoint, ResultGroup, ResultPoint};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::now_timestamp;

/// Result group and point operations manager
pub struct ResultManager {
    pool: SqlitePool,
}

impl ResultManager {
    /// Create a new result manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a result group
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_group(&self, group: &NewResultGroup) -> AppResult<ResultGroup> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO result_groups (id, search_id, display_name, point_type_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(&group.search_id)
        .bind(&group.display_name)
        .bind(&group.point_type_name)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create result group: {e}")))?;

        Ok(ResultGroup {
            id,
            search_id: group.search_id.clone(),
            display_name: group.display_name.clone(),
            point_type_name: group.point_type_name.clone(),
        })
    }

    /// Groups of a search in creation order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_groups(&self, search_id: &str) -> AppResult<Vec<ResultGroup>> {
        let rows = sqlx::query(
            r"
            SELECT id, search_id, display_name, point_type_name
            FROM result_groups
            WHERE search_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list result groups: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| ResultGroup {
                id: r.get("id"),
                search_id: r.get("search_id"),
                display_name: r.get("display_name"),
                point_type_name: r.get("point_type_name"),
            })
            .collect())
    }

    /// Create an unplaced result point
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_point(&self, point: &NewResultPoint) -> AppResult<ResultPoint> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO result_points (id, theme_id, search_id, group_id, title, description, point_type, warning_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, '', $8)
            ",
        )
        .bind(&id)
        .bind(&point.theme_id)
        .bind(&point.search_id)
        .bind(&point.group_id)
        .bind(&point.title)
        .bind(&point.description)
        .bind(&point.point_type)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create result point: {e}")))?;

        Ok(ResultPoint {
            id,
            theme_id: point.theme_id.clone(),
            search_id: point.search_id.clone(),
            group_id: point.group_id.clone(),
            title: point.title.clone(),
            description: point.description.clone(),
            point_type: point.point_type.clone(),
            lat: None,
            lng: None,
            warning_message: String::new(),
        })
    }

    /// Points of a search in creation order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_points(&self, search_id: &str) -> AppResult<Vec<ResultPoint>> {
        let rows = sqlx::query(
            r"
            SELECT id, theme_id, search_id, group_id, title, description, point_type, lat, lng, warning_message
            FROM result_points
            WHERE search_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list result points: {e}")))?;

        Ok(rows.iter().map(point_from_row).collect())
    }

    /// Record coordinates and warning for a point
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the point does not exist
    pub async fn update_location(
        &self,
        point_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        warning_message: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE result_points
            SET lat = $1, lng = $2, warning_message = $3
            WHERE id = $4
            ",
        )
        .bind(lat)
        .bind(lng)
        .bind(warning_message)
        .bind(point_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update point location: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Result point {point_id}")));
        }
        Ok(())
    }
}

fn point_from_row(r: &SqliteRow) -> ResultPoint {
    ResultPoint {
        id: r.get("id"),
        theme_id: r.get("theme_id"),
        search_id: r.get("search_id"),
        group_id: r.get("group_id"),
        title: r.get("title"),
        description: r.get("description"),
        point_type: r.get("point_type"),
        lat: r.get("lat"),
        lng: r.get("lng"),
        warning_message: r.get("warning_message"),
    }
}
