// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors reported by the feed, notifier and checkpoint collaborators.

use thiserror::Error;

/// A page could not be fetched or decoded.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable feed page: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// A delivery failed for a reason other than rate limiting.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("delivery was dropped before it ran")]
    Abandoned,

    #[error("{0}")]
    Other(String),
}

/// Reading or writing a checkpoint map failed.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed checkpoint line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
