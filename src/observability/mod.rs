// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and
//! operational logging in feedsift. Message types follow a struct-based
//! pattern: each one implements `Display` for the human-readable line and
//! [`StructuredLog`](messages::StructuredLog) for the structured fields, so
//! call sites never carry format strings of their own.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::retrieval` - paginated feed retrieval per source
//! * `messages::scheduler` - dispatch pacing, rate limiting and shutdown
//! * `messages::relay` - mapping runs, deliveries and checkpoints
//! * `messages::config` - configuration loading
//!
//! # Usage
//!
//! ```rust
//! use feedsift::observability::messages::StructuredLog;
//! use feedsift::observability::messages::retrieval::PageFetchFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
//! let msg = PageFetchFailed {
//!     source: "did:plc:abc",
//!     page: 2,
//!     error: &error,
//! };
//!
//! msg.log();
//! ```

pub mod messages;

#[cfg(test)]
pub(crate) mod span_names;
