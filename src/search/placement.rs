// ABOUTME: Geocoding pass that attaches coordinates to parsed result points
// ABOUTME: Tries several lookups per point and prefers candidates near already-placed points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Point Placement
//!
//! Points come out of the parser with a title and a free-text location. This
//! pass asks a [`Geocoder`] for candidates using, in order:
//!
//! 1. `"{title} {description}"`
//! 2. `"{title}"`
//! 3. `"{description}"`
//!
//! When a lookup returns several candidates and at least one point is already
//! placed, the candidate nearest to the running average of placed coordinates
//! wins, which keeps a city-scoped search from jumping to a namesake abroad.

use async_trait::async_trait;
use honing_core::errors::AppResult;
use honing_core::models::ResultPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Name the geocoder matched
    pub display_name: String,
}

impl GeocodeCandidate {
    /// Candidate at the given coordinates
    #[must_use]
    pub fn new(lat: f64, lng: f64, display_name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            display_name: display_name.into(),
        }
    }

    fn distance_to(&self, lat: f64, lng: f64) -> f64 {
        (self.lat - lat).hypot(self.lng - lng)
    }
}

/// Address lookup service
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for a free-text query, best match first
    ///
    /// An empty list is a valid answer and is treated like a failed lookup.
    async fn geocode(&self, query: &str) -> AppResult<Vec<GeocodeCandidate>>;
}

/// Running sum of placed coordinates
#[derive(Debug, Default, Clone, Copy)]
struct PlacedAverage {
    lat_sum: f64,
    lng_sum: f64,
    count: u32,
}

impl PlacedAverage {
    fn add(&mut self, lat: f64, lng: f64) {
        self.lat_sum += lat;
        self.lng_sum += lng;
        self.count += 1;
    }

    fn mean(&self) -> Option<(f64, f64)> {
        (self.count > 0).then(|| {
            let n = f64::from(self.count);
            (self.lat_sum / n, self.lng_sum / n)
        })
    }

    fn select<'a>(&self, candidates: &'a [GeocodeCandidate]) -> Option<&'a GeocodeCandidate> {
        match self.mean() {
            Some((lat, lng)) if candidates.len() > 1 => candidates
                .iter()
                .min_by(|a, b| a.distance_to(lat, lng).total_cmp(&b.distance_to(lat, lng))),
            _ => candidates.first(),
        }
    }
}

/// Lookup strings for a point in the order they are tried
#[must_use]
pub fn lookup_queries(point: &ResultPoint) -> Vec<String> {
    let candidates = [
        format!("{} {}", point.title, point.description),
        point.title.clone(),
        point.description.clone(),
    ];

    let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
    for query in candidates {
        let query = query.trim().to_owned();
        if !query.is_empty() && !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}

/// Geocode each point in order
///
/// Placed points get coordinates and an empty warning; points every lookup
/// failed for keep no coordinates and carry the last failure as their warning.
/// The geocoder's errors never abort the pass.
pub async fn place_points(points: Vec<ResultPoint>, geocoder: &dyn Geocoder) -> Vec<ResultPoint> {
    let mut average = PlacedAverage::default();
    let mut placed = Vec::with_capacity(points.len());

    for mut point in points {
        let mut last_failure = String::from("geocoding failed: nothing to look up");
        let mut candidates = Vec::new();

        for query in lookup_queries(&point) {
            match geocoder.geocode(&query).await {
                Ok(found) if !found.is_empty() => {
                    candidates = found;
                    break;
                }
                Ok(_) => last_failure = format!("geocoding failed: no results for {query}"),
                Err(e) => last_failure = format!("geocoding failed: {}", e.message),
            }
        }

        if let Some(choice) = average.select(&candidates) {
            debug!(
                point_id = %point.id,
                title = %point.title,
                candidates = candidates.len(),
                matched = %choice.display_name,
                "Placed point"
            );
            point.lat = Some(choice.lat);
            point.lng = Some(choice.lng);
            point.warning_message = String::new();
            average.add(choice.lat, choice.lng);
        } else {
            warn!(point_id = %point.id, title = %point.title, warning = %last_failure, "Could not place point");
            point.lat = None;
            point.lng = None;
            point.warning_message = last_failure;
        }

        placed.push(point);
    }

    placed
}
