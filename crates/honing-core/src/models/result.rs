// ABOUTME: Result group and point records produced by parsing assistant replies
// ABOUTME: Groups are per-round category headings, points are the bullet items under them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// A category heading emitted by the assistant in one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultGroup {
    /// Unique group ID
    pub id: String,
    /// Search this group belongs to
    pub search_id: String,
    /// Heading text
    pub display_name: String,
    /// Point-type label applied to the group's points
    pub point_type_name: String,
}

/// Fields required to create a result group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResultGroup {
    /// Search this group belongs to
    pub search_id: String,
    /// Heading text
    pub display_name: String,
    /// Point-type label
    pub point_type_name: String,
}

/// A stored point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPoint {
    /// Unique point ID
    pub id: String,
    /// Theme the point is displayed under
    pub theme_id: String,
    /// Search that produced the point
    pub search_id: String,
    /// Group the point was listed under
    pub group_id: String,
    /// Item name
    pub title: String,
    /// Location or short description, empty when the bullet had none
    pub description: String,
    /// Point-type label
    pub point_type: String,
    /// Latitude, set by placement
    pub lat: Option<f64>,
    /// Longitude, set by placement
    pub lng: Option<f64>,
    /// Why placement failed, empty otherwise
    pub warning_message: String,
}

impl ResultPoint {
    /// Whether placement assigned coordinates
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

/// A point as produced by the parser, before its group has an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDraft {
    /// Theme of the owning search
    pub theme_id: String,
    /// Owning search
    pub search_id: String,
    /// Item name
    pub title: String,
    /// Location or short description
    pub description: String,
    /// Point-type label of the enclosing group
    pub point_type: String,
}

impl PointDraft {
    /// Attach the persisted group's identifier
    #[must_use]
    pub fn into_new_point(self, group_id: &str) -> NewResultPoint {
        NewResultPoint {
            theme_id: self.theme_id,
            search_id: self.search_id,
            group_id: group_id.to_owned(),
            title: self.title,
            description: self.description,
            point_type: self.point_type,
        }
    }
}

/// Fields required to create a point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResultPoint {
    /// Theme the point is displayed under
    pub theme_id: String,
    /// Search that produced the point
    pub search_id: String,
    /// Group the point was listed under
    pub group_id: String,
    /// Item name
    pub title: String,
    /// Location or short description
    pub description: String,
    /// Point-type label
    pub point_type: String,
}
