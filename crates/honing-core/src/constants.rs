// ABOUTME: Application-wide constants for the search protocol and record defaults
// ABOUTME: Completion sentinels, default point type, and status labels live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Wire contract between the search engine and the completion model's output.
///
/// Bumped whenever the expected markdown layout or the sentinel lines change.
/// The default system prompt states this version verbatim.
pub mod protocol {
    /// Current output-format version
    pub const FRACTAL_SEARCH_PROTOCOL: &str = "fractal-search/v2";

    /// Line the assistant emits once nothing remains to enumerate
    pub const LIST_COMPLETE: &str = "LIST IS COMPLETE";

    /// Line the assistant emits when more items remain
    pub const LIST_INCOMPLETE: &str = "LIST IS INCOMPLETE";

    /// Prefix that opens a result group
    pub const HEADING_MARKER: char = '#';

    /// Prefix that introduces a point
    pub const BULLET_MARKER: char = '-';

    /// Separator between a point's title and its description
    pub const TITLE_DESCRIPTION_SEPARATOR: &str = " - ";
}

/// Record defaults
pub mod defaults {
    /// Point-type label given to every parsed group and point
    pub const POINT_TYPE: &str = "main";

    /// Returned by rating extraction when the reply carries no usable rating
    pub const NO_RATING: i32 = -1;
}

/// Service identity used in logs
pub mod service_names {
    /// Library and server name
    pub const HONING_INN: &str = "honing_inn";

    /// Name of the completion API in error messages
    pub const PERPLEXITY: &str = "Perplexity";
}
