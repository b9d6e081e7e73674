// ABOUTME: Integration tests for parsing fractal search replies into groups and points
// ABOUTME: Exercises headings, bullets, separators, orphans and the completion sentinel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use honing_inn::errors::ErrorCode;
use honing_inn::llm::{CompletionChoice, CompletionResult};
use honing_inn::models::SearchQuery;
use honing_inn::search::{parse_content, parse_response};

fn search() -> SearchQuery {
    SearchQuery {
        id: "search-1".into(),
        theme_id: "theme-1".into(),
        display_name: "New Zealand".into(),
        query: "Cities in New Zealand".into(),
        status: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[test]
fn test_single_section_without_descriptions() {
    let outcome = parse_content("# Section 1\n- Point 1\n- Point 2", &search());

    assert_eq!(outcome.groups.len(), 1);
    let group = &outcome.groups[0];
    assert_eq!(group.display_name, "Section 1");
    assert_eq!(group.search_id, "search-1");
    assert_eq!(group.point_type_name, "main");

    let titles: Vec<&str> = group.points.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Point 1", "Point 2"]);
    assert!(group.points.iter().all(|p| p.description.is_empty()));
    assert!(group
        .points
        .iter()
        .all(|p| p.theme_id == "theme-1" && p.search_id == "search-1"));
    assert!(!outcome.is_complete);
}

#[test]
fn test_two_sections_with_descriptions() {
    let reply = "## North Island\n- Auckland - Largest city\n\n## South Island\n- Dunedin - Edinburgh of the south\n- Christchurch - Garden city";
    let outcome = parse_content(reply, &search());

    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(outcome.groups[0].display_name, "North Island");
    assert_eq!(outcome.groups[1].display_name, "South Island");
    assert_eq!(outcome.point_count(), 3);

    let auckland = &outcome.groups[0].points[0];
    assert_eq!(auckland.title, "Auckland");
    assert_eq!(auckland.description, "Largest city");

    let south: Vec<(&str, &str)> = outcome.groups[1]
        .points
        .iter()
        .map(|p| (p.title.as_str(), p.description.as_str()))
        .collect();
    assert_eq!(
        south,
        vec![
            ("Dunedin", "Edinburgh of the south"),
            ("Christchurch", "Garden city")
        ]
    );
}

#[test]
fn test_bullet_before_any_heading_is_dropped() {
    let outcome = parse_content("- Orphan\n# Section\n- Kept", &search());

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].points.len(), 1);
    assert_eq!(outcome.groups[0].points[0].title, "Kept");
}

#[test]
fn test_reply_without_headings_yields_no_groups() {
    let outcome = parse_content("Sorry, I found nothing.\n- stray bullet", &search());
    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.point_count(), 0);
}

#[test]
fn test_heading_without_bullets_is_kept_empty() {
    let outcome = parse_content("# Empty\n# Full\n- One", &search());
    assert_eq!(outcome.groups.len(), 2);
    assert!(outcome.groups[0].points.is_empty());
    assert_eq!(outcome.groups[1].points.len(), 1);
}

#[test]
fn test_whitespace_and_blank_lines_are_ignored() {
    let outcome = parse_content(
        "\n\n   ###   Spaced Heading   \n\n\t-   Padded -   desc  \n   \n",
        &search(),
    );

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].display_name, "Spaced Heading");
    let point = &outcome.groups[0].points[0];
    assert_eq!(point.title, "Padded");
    assert_eq!(point.description, "desc");
}

#[test]
fn test_completion_sentinel() {
    let complete = parse_content("# A\n- One\nLIST IS COMPLETE", &search());
    assert!(complete.is_complete);

    let incomplete = parse_content("# A\n- One\nLIST IS INCOMPLETE", &search());
    assert!(!incomplete.is_complete);

    // Once set, a later incomplete marker does not reset the flag
    let both = parse_content("LIST IS COMPLETE\n# A\n- One\nLIST IS INCOMPLETE", &search());
    assert!(both.is_complete);
    assert_eq!(both.groups.len(), 1);
}

#[test]
fn test_sentinel_must_be_whole_line() {
    let outcome = parse_content("# A\n- One\nThe LIST IS COMPLETE now", &search());
    assert!(!outcome.is_complete);
}

#[test]
fn test_parsing_is_deterministic() {
    let reply = "# Parks\n- Hagley Park - Riccarton\n- Victoria Park\nLIST IS COMPLETE";
    assert_eq!(parse_content(reply, &search()), parse_content(reply, &search()));
}

#[test]
fn test_parse_response_reads_last_choice() {
    let result = CompletionResult::from_choices(vec![
        CompletionChoice::assistant("# First\n- Ignored"),
        CompletionChoice::assistant("# Last\n- Used"),
    ]);

    let outcome = parse_response(&result, &search()).unwrap();
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].display_name, "Last");
}

#[test]
fn test_parse_response_without_choices_fails() {
    let error = parse_response(&CompletionResult::default(), &search()).unwrap_err();
    assert_eq!(error.code, ErrorCode::EmptyCompletion);
}
