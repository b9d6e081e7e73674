// ABOUTME: Integration tests for geocoding result points with a table-driven geocoder
// ABOUTME: Covers lookup fallbacks, failure warnings, nearest-candidate selection and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use common::{
    create_test_database, create_test_search, create_test_theme, test_settings, ScriptedClient,
    ScriptedReply,
};
use honing_inn::database::SearchStore;
use honing_inn::errors::{AppError, AppResult};
use honing_inn::models::ResultPoint;
use honing_inn::search::{place_points, GeocodeCandidate, Geocoder, RoundRequest, SearchEngine};

/// Answers from a fixed table; unknown queries return no candidates
#[derive(Default)]
struct TableGeocoder {
    answers: HashMap<String, Result<Vec<GeocodeCandidate>, String>>,
    queries: Mutex<Vec<String>>,
}

impl TableGeocoder {
    fn found(mut self, query: &str, candidates: Vec<GeocodeCandidate>) -> Self {
        self.answers.insert(query.to_owned(), Ok(candidates));
        self
    }

    fn failing(mut self, query: &str, message: &str) -> Self {
        self.answers.insert(query.to_owned(), Err(message.to_owned()));
        self
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode(&self, query: &str) -> AppResult<Vec<GeocodeCandidate>> {
        self.queries.lock().unwrap().push(query.to_owned());
        match self.answers.get(query) {
            Some(Ok(candidates)) => Ok(candidates.clone()),
            Some(Err(message)) => Err(AppError::external_service(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

fn point(id: &str, title: &str, description: &str) -> ResultPoint {
    ResultPoint {
        id: id.into(),
        theme_id: "theme-1".into(),
        search_id: "search-1".into(),
        group_id: "group-1".into(),
        title: title.into(),
        description: description.into(),
        point_type: "main".into(),
        lat: None,
        lng: None,
        warning_message: "stale".into(),
    }
}

#[tokio::test]
async fn test_full_query_tried_first() {
    let geocoder = TableGeocoder::default().found(
        "Hagley Park Riccarton Avenue",
        vec![GeocodeCandidate::new(-43.53, 172.62, "Hagley Park")],
    );

    let placed = place_points(vec![point("p1", "Hagley Park", "Riccarton Avenue")], &geocoder).await;

    assert_eq!(placed[0].lat, Some(-43.53));
    assert_eq!(placed[0].lng, Some(172.62));
    assert_eq!(placed[0].warning_message, "");
    assert_eq!(geocoder.queries(), vec!["Hagley Park Riccarton Avenue"]);
}

#[tokio::test]
async fn test_falls_back_to_title_then_description() {
    let geocoder = TableGeocoder::default()
        .failing("Woodham Park Woodham Road", "timeout")
        .found(
            "Woodham Road",
            vec![GeocodeCandidate::new(-43.52, 172.67, "Woodham Road")],
        );

    let placed = place_points(vec![point("p1", "Woodham Park", "Woodham Road")], &geocoder).await;

    assert!(placed[0].is_placed());
    assert_eq!(
        geocoder.queries(),
        vec!["Woodham Park Woodham Road", "Woodham Park", "Woodham Road"]
    );
}

#[tokio::test]
async fn test_unplaced_point_carries_last_failure() {
    let no_results = place_points(
        vec![point("p1", "Nowhere", "")],
        &TableGeocoder::default(),
    )
    .await;
    assert!(!no_results[0].is_placed());
    assert_eq!(
        no_results[0].warning_message,
        "geocoding failed: no results for Nowhere"
    );

    let errored = place_points(
        vec![point("p2", "Broken", "")],
        &TableGeocoder::default().failing("Broken", "service down"),
    )
    .await;
    assert_eq!(errored[0].lat, None);
    assert_eq!(errored[0].warning_message, "geocoding failed: service down");

    let blank = place_points(vec![point("p3", " ", "")], &TableGeocoder::default()).await;
    assert_eq!(
        blank[0].warning_message,
        "geocoding failed: nothing to look up"
    );
}

#[tokio::test]
async fn test_ambiguous_match_prefers_candidate_near_placed_points() {
    let geocoder = TableGeocoder::default()
        .found(
            "Hagley Park",
            vec![GeocodeCandidate::new(-43.53, 172.62, "Hagley Park")],
        )
        .found(
            "Victoria Park",
            vec![
                GeocodeCandidate::new(51.53, -0.04, "Victoria Park, London"),
                GeocodeCandidate::new(-43.58, 172.63, "Victoria Park, Christchurch"),
            ],
        );

    let placed = place_points(
        vec![point("p1", "Hagley Park", ""), point("p2", "Victoria Park", "")],
        &geocoder,
    )
    .await;

    assert_eq!(placed[1].lat, Some(-43.58));
    assert_eq!(placed[1].lng, Some(172.63));
}

#[tokio::test]
async fn test_first_point_takes_first_candidate() {
    let geocoder = TableGeocoder::default().found(
        "Victoria Park",
        vec![
            GeocodeCandidate::new(51.53, -0.04, "Victoria Park, London"),
            GeocodeCandidate::new(-43.58, 172.63, "Victoria Park, Christchurch"),
        ],
    );

    let placed = place_points(vec![point("p1", "Victoria Park", "")], &geocoder).await;
    assert_eq!(placed[0].lat, Some(51.53));
}

#[tokio::test]
async fn test_place_search_points_persists_locations_and_warnings() {
    let database = create_test_database().await.unwrap();
    let theme = create_test_theme(database.as_ref()).await;
    let search = create_test_search(database.as_ref(), &theme).await;
    let client = ScriptedClient::new([ScriptedReply::text(
        "# Parks\n- Hagley Park - Riccarton Avenue\n- Atlantis",
    )]);
    let engine = SearchEngine::new(database.clone(), client, test_settings());
    engine
        .run_round(&search, &theme, RoundRequest::live())
        .await
        .unwrap();

    let geocoder = TableGeocoder::default().found(
        "Hagley Park Riccarton Avenue",
        vec![GeocodeCandidate::new(-43.53, 172.62, "Hagley Park")],
    );
    let placed = engine
        .place_search_points(&search.id, &geocoder)
        .await
        .unwrap();
    assert_eq!(placed.len(), 2);

    let stored = database.list_result_points(&search.id).await.unwrap();
    assert_eq!(stored, placed);
    assert_eq!(stored[0].lat, Some(-43.53));
    assert_eq!(stored[0].warning_message, "");
    assert!(!stored[1].is_placed());
    assert_eq!(
        stored[1].warning_message,
        "geocoding failed: no results for Atlantis"
    );
}
