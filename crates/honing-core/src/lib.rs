// ABOUTME: Core types and constants for the Honing Inn home research platform
// ABOUTME: Foundation crate with error handling, domain records, and protocol constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Honing Core
//!
//! Foundation crate providing shared types for the Honing Inn search engine.
//! This crate is designed to change infrequently, so the server crate and its
//! binaries compile incrementally against a stable base.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Completion protocol sentinels and record defaults
//! - **models**: Searches, transcripts, result groups/points, themes, homes and chats

/// Unified error handling system with standard error codes
pub mod errors;

/// Protocol constants and record defaults
pub mod constants;

/// Core data models
pub mod models;
