// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Reason tag the feed API attaches to reposted entries.
pub const REPOST_REASON: &str = "app.bsky.feed.defs#reasonRepost";

/// One entry of a feed page.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    /// Stable `at://` URI of the post
    pub uri: String,
    /// DID of the post's author (the original author for reposts)
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Why the entry is in this feed, e.g. [`REPOST_REASON`]
    pub reason: Option<String>,
    pub has_embed: bool,
    pub labels: Vec<String>,
    /// The feed entry exactly as the API returned it
    pub raw: Value,
}

impl FeedItem {
    /// Record key, the last path segment of the URI.
    pub fn record_key(&self) -> Option<&str> {
        self.uri.rsplit('/').next().filter(|key| !key.is_empty())
    }

    /// DID authority of the URI (`at://<did>/...`).
    pub fn uri_authority(&self) -> Option<&str> {
        self.uri
            .strip_prefix("at://")
            .and_then(|rest| rest.split('/').next())
            .filter(|did| !did.is_empty())
    }
}

/// A page of items plus the cursor for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub cursor: Option<String>,
}
