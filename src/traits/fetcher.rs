// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::feed::{FeedPage, SourceTarget};

/// Reads one page of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetches the page at `cursor`, or the first page when `cursor` is `None`.
    async fn fetch_page(
        &self,
        target: &SourceTarget,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError>;

    fn name(&self) -> &'static str;
}
