// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations behind the traits in [`crate::traits`].
//!
//! # Available Backends
//!
//! ## Bluesky
//! [`bluesky::BlueskyFetcher`] reads author feeds and feed generators from a
//! public AppView and decodes them into [`FeedItem`](crate::feed::FeedItem)s.
//!
//! ## Discord
//! [`discord::DiscordDispatcher`] posts channel messages as a bot and reports
//! rate-limit feedback to the scheduler.
//!
//! ## Checkpoint file
//! [`checkpoint_file::CheckpointFile`] keeps each mapping's checkpoints in a
//! small tab-separated file.
//!
//! ## Stub Backend (Test-Only)
//! In-memory fakes for engine tests (only available in test builds):
//! - **StubFeed**: scripted pages and failures keyed by source and cursor
//! - **RecordingDispatcher**: records deliveries, answers from a script
//! - **MemoryCheckpointStore**: in-memory map with switchable failures

pub mod bluesky;
pub mod checkpoint_file;
pub mod discord;
#[cfg(test)]
pub mod stub;

pub use bluesky::BlueskyFetcher;
pub use checkpoint_file::CheckpointFile;
pub use discord::DiscordDispatcher;
