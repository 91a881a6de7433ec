// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::feed::FeedItem;

/// What a filter is evaluated against: the item under test and, when known,
/// the account that owns the source the item came from.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub item: &'a FeedItem,
    pub owner: Option<&'a str>,
}

impl<'a> FilterContext<'a> {
    pub fn new(item: &'a FeedItem) -> Self {
        Self { item, owner: None }
    }

    pub fn with_owner(item: &'a FeedItem, owner: &'a str) -> Self {
        Self {
            item,
            owner: Some(owner),
        }
    }
}
