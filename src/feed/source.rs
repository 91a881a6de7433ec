// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Where a source's pages come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceTarget {
    /// Posts and reposts by one account
    Author { did: String },
    /// A custom feed generator published by `did`
    Generator { did: String, feed_key: String },
}

impl SourceTarget {
    /// Identity used for checkpoints and de-duplication.
    pub fn key(&self) -> String {
        match self {
            SourceTarget::Author { did } => did.clone(),
            SourceTarget::Generator { did, feed_key } => {
                format!("{}/app.bsky.feed.generator/{}", did, feed_key)
            }
        }
    }

    /// The account owning the source, used by self-authorship checks.
    pub fn owner(&self) -> &str {
        match self {
            SourceTarget::Author { did } | SourceTarget::Generator { did, .. } => did,
        }
    }
}

impl fmt::Display for SourceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
