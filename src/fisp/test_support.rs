// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::errors::EvalError;
use crate::feed::FeedItem;
use crate::fisp::{parse, FilterContext, FunctionRegistry};

/// A plain post by `did:plc:author` reading "hello world".
pub(crate) fn item() -> FeedItem {
    FeedItem {
        uri: "at://did:plc:author/app.bsky.feed.post/3kpost".to_string(),
        author: "did:plc:author".to_string(),
        text: "hello world".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        reason: None,
        has_embed: false,
        labels: vec![],
        raw: json!({
            "post": {
                "uri": "at://did:plc:author/app.bsky.feed.post/3kpost",
                "author": {"did": "did:plc:author", "handle": "author.bsky.social"},
                "record": {
                    "$type": "app.bsky.feed.post",
                    "text": "hello world",
                    "langs": ["en", "fr"]
                },
                "likeCount": 3
            }
        }),
    }
}

pub(crate) fn check_item(
    source: &str,
    item: &FeedItem,
    owner: Option<&str>,
) -> Result<bool, EvalError> {
    let registry = FunctionRegistry::with_builtins();
    let ctx = FilterContext { item, owner };
    registry
        .evaluator()
        .evaluate_truthy(&parse(source).unwrap(), &ctx)
}

pub(crate) fn check(source: &str) -> bool {
    check_item(source, &item(), None).unwrap()
}
