// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feed pages from a Bluesky AppView over XRPC.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::consts::DEFAULT_BLUESKY_BASE_URL;
use crate::errors::FetchError;
use crate::feed::{FeedItem, FeedPage, SourceTarget};
use crate::traits::FeedFetcher;

/// Record type of a regular post.
const POST_RECORD_TYPE: &str = "app.bsky.feed.post";

/// Embed types that are links or quotes rather than attached media.
const NOT_EMBEDS: [&str; 2] = ["app.bsky.embed.external", "app.bsky.embed.record"];

pub struct BlueskyFetcher {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl BlueskyFetcher {
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_url(DEFAULT_BLUESKY_BASE_URL, user_agent)
    }

    pub fn with_base_url(base_url: &str, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// XRPC endpoint and query for one page of `target`.
    fn request_parts(&self, target: &SourceTarget, cursor: Option<&str>) -> (String, Vec<(&'static str, String)>) {
        let (method, mut query) = match target {
            SourceTarget::Author { did } => ("app.bsky.feed.getAuthorFeed", vec![("actor", did.clone())]),
            SourceTarget::Generator { did, feed_key } => (
                "app.bsky.feed.getFeed",
                vec![(
                    "feed",
                    format!("at://{}/app.bsky.feed.generator/{}", did, feed_key),
                )],
            ),
        };
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        (format!("{}/xrpc/{}", self.base_url, method), query)
    }
}

#[async_trait::async_trait]
impl FeedFetcher for BlueskyFetcher {
    async fn fetch_page(
        &self,
        target: &SourceTarget,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError> {
        let (url, query) = self.request_parts(target, cursor);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let document: Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        decode_page(&document)
    }

    fn name(&self) -> &'static str {
        "bluesky"
    }
}

/// Decodes a `getAuthorFeed`/`getFeed` response body.
///
/// Entries that are not posts, or that lack a URI, author or parsable
/// creation time, are skipped.
pub fn decode_page(document: &Value) -> Result<FeedPage, FetchError> {
    let entries = document
        .get("feed")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Decode("response has no 'feed' array".to_string()))?;

    Ok(FeedPage {
        items: entries.iter().filter_map(decode_entry).collect(),
        cursor: document
            .get("cursor")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn decode_entry(entry: &Value) -> Option<FeedItem> {
    let post = entry.get("post")?;
    let record = post.get("record")?;
    if record.get("$type").and_then(Value::as_str) != Some(POST_RECORD_TYPE) {
        return None;
    }

    let created_at = record
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Utc);

    let has_embed = record
        .pointer("/embed/$type")
        .and_then(Value::as_str)
        .is_some_and(|kind| !NOT_EMBEDS.contains(&kind));

    let labels = post
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| label.get("val").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(FeedItem {
        uri: post.get("uri")?.as_str()?.to_string(),
        author: post.pointer("/author/did")?.as_str()?.to_string(),
        text: record
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at,
        reason: entry
            .pointer("/reason/$type")
            .and_then(Value::as_str)
            .map(str::to_string),
        has_embed,
        labels,
        raw: entry.clone(),
    })
}
