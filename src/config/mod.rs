// ABOUTME: Configuration management module for process-wide settings
// ABOUTME: Environment-sourced settings resolved once and injected into the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Honing Inn engine
//!
//! Settings are read from the environment exactly once, at process start, and
//! then passed down explicitly. Nothing below the binary reads ambient state.

/// Environment and server configuration
pub mod environment;

pub use environment::{CompletionSettings, Environment, ServerConfig};
