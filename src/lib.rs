// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // feed, notifier and checkpoint collaborators
pub mod config;     // config loading + relay builder
pub mod engine;     // retrieval, scheduling, relay
pub mod errors;     // error handling
pub mod feed;       // feed items and sources
pub mod fisp;       // filter language
pub mod jsonpath;   // path queries over raw feed JSON
pub mod observability;
pub mod traits;     // collaborator abstractions
