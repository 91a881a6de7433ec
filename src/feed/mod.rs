// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feed items, pages and the sources they are pulled from.

mod item;
mod source;

pub use item::{FeedItem, FeedPage, REPOST_REASON};
pub use source::SourceTarget;
