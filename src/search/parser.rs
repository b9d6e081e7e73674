// ABOUTME: Parses a markdown-style completion into result groups, points and a completion flag
// ABOUTME: Folds over trimmed lines so every group is built once and never mutated afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Parser
//!
//! Reads the last choice of a completion written in the `fractal-search/v2`
//! format:
//!
//! ```text
//! # Big Parks
//! - Hagley Park - Riccarton Avenue
//! - Bottle Lake Forest Park
//! LIST IS COMPLETE
//! ```
//!
//! Headings open groups, bullets become points of the open group, and the
//! sentinel line sets the completion flag. Anything else is ignored.

use honing_core::constants::{defaults, protocol};
use honing_core::errors::{AppError, AppResult};
use honing_core::models::{NewResultGroup, PointDraft, SearchQuery};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::CompletionResult;

/// A heading and the bullets listed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedGroup {
    /// Owning search
    pub search_id: String,
    /// Heading text without the `#` run
    pub display_name: String,
    /// Point-type label, always the default for parsed groups
    pub point_type_name: String,
    /// Points in reply order
    pub points: Vec<PointDraft>,
}

impl ParsedGroup {
    fn open(search: &SearchQuery, display_name: &str) -> Self {
        Self {
            search_id: search.id.clone(),
            display_name: display_name.to_owned(),
            point_type_name: defaults::POINT_TYPE.to_owned(),
            points: Vec::new(),
        }
    }

    /// Record for persisting this group
    #[must_use]
    pub fn to_new_group(&self) -> NewResultGroup {
        NewResultGroup {
            search_id: self.search_id.clone(),
            display_name: self.display_name.clone(),
            point_type_name: self.point_type_name.clone(),
        }
    }
}

/// Everything extracted from one reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Groups in reply order
    pub groups: Vec<ParsedGroup>,
    /// Whether the reply carried the completion sentinel
    pub is_complete: bool,
}

impl ParseOutcome {
    /// Total points across all groups
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|group| group.points.len()).sum()
    }
}

/// Parse the last choice of a completion
///
/// # Errors
///
/// Returns [`honing_core::errors::ErrorCode::EmptyCompletion`] when the result
/// has no choices. A reply with no headings is not an error; it yields zero
/// groups.
pub fn parse_response(result: &CompletionResult, search: &SearchQuery) -> AppResult<ParseOutcome> {
    let choice = result
        .last_choice()
        .ok_or_else(AppError::empty_completion)?;
    Ok(parse_content(&choice.content, search))
}

/// Parse reply text; deterministic and side-effect free
#[must_use]
pub fn parse_content(content: &str, search: &SearchQuery) -> ParseOutcome {
    let outcome = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Line::classify)
        .fold(ParseState::default(), |state, line| state.apply(line, search))
        .finish();

    debug!(
        search_id = %search.id,
        groups = outcome.groups.len(),
        points = outcome.point_count(),
        is_complete = outcome.is_complete,
        "Parsed completion"
    );
    outcome
}

/// A trimmed, non-empty reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Heading(&'a str),
    Bullet(&'a str),
    Sentinel { complete: bool },
    Other,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if line == protocol::LIST_COMPLETE {
            Self::Sentinel { complete: true }
        } else if line == protocol::LIST_INCOMPLETE {
            Self::Sentinel { complete: false }
        } else if line.starts_with(protocol::HEADING_MARKER) {
            Self::Heading(line.trim_start_matches(protocol::HEADING_MARKER).trim_start())
        } else if let Some(rest) = line.strip_prefix(protocol::BULLET_MARKER) {
            Self::Bullet(rest.trim_start())
        } else {
            Self::Other
        }
    }
}

/// Fold accumulator: closed groups, the open one, and the flag
#[derive(Debug, Default)]
struct ParseState {
    closed: Vec<ParsedGroup>,
    open: Option<ParsedGroup>,
    complete: bool,
}

impl ParseState {
    fn apply(mut self, line: Line<'_>, search: &SearchQuery) -> Self {
        match line {
            Line::Heading(name) => {
                self.closed.extend(self.open.take());
                self.open = Some(ParsedGroup::open(search, name));
            }
            Line::Bullet(text) => match self.open.as_mut() {
                Some(group) => {
                    let point = point_from_bullet(text, search, &group.point_type_name);
                    group.points.push(point);
                }
                None => debug!(bullet = text, "Dropping bullet outside any group"),
            },
            Line::Sentinel { complete } => self.complete |= complete,
            Line::Other => {}
        }
        self
    }

    fn finish(mut self) -> ParseOutcome {
        self.closed.extend(self.open.take());
        ParseOutcome {
            groups: self.closed,
            is_complete: self.complete,
        }
    }
}

/// Split `title - description`; anything but exactly two segments is all title
fn point_from_bullet(text: &str, search: &SearchQuery, point_type: &str) -> PointDraft {
    let segments: Vec<&str> = text.split(protocol::TITLE_DESCRIPTION_SEPARATOR).collect();
    let (title, description) = match segments.as_slice() {
        [title, description] => (title.trim(), description.trim()),
        _ => (text, ""),
    };

    PointDraft {
        theme_id: search.theme_id.clone(),
        search_id: search.id.clone(),
        title: title.to_owned(),
        description: description.to_owned(),
        point_type: point_type.to_owned(),
    }
}
