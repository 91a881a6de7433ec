// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `retrieval` - page fetches, filter failures, per-source results
//! * `scheduler` - pacing, rate-limit pauses, lifecycle
//! * `relay` - mapping lifecycle, delivery failures, checkpoint I/O
//! * `config` - configuration loading
//!
//! # Usage Pattern
//!
//! ```rust
//! use feedsift::observability::messages::relay::MappingStarted;
//!
//! let msg = MappingStarted {
//!     mapping: "cats",
//!     source_count: 3,
//!     channel_count: 1,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod config;
pub mod relay;
pub mod retrieval;
pub mod scheduler;

use tracing::Span;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emits the message as a `tracing` event at the message's level.
    fn log(&self);

    /// Opens a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
