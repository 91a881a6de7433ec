// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::CheckpointError;

/// Source key to the newest creation time already handled for that source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointMap(BTreeMap<String, DateTime<Utc>>);

impl CheckpointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<DateTime<Utc>> {
        self.0.get(key).copied()
    }

    /// Records `at` for `key` unless an equal or newer time is already held.
    /// Returns whether the stored value changed.
    pub fn advance(&mut self, key: &str, at: DateTime<Utc>) -> bool {
        match self.0.get_mut(key) {
            Some(current) if *current >= at => false,
            Some(current) => {
                *current = at;
                true
            }
            None => {
                self.0.insert(key.to_string(), at);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DateTime<Utc>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DateTime<Utc>)> for CheckpointMap {
    fn from_iter<T: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Persists a [`CheckpointMap`] between runs.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Reads the stored map. A store that was never written reads as empty.
    async fn read(&self) -> Result<CheckpointMap, CheckpointError>;

    async fn write(&self, checkpoints: &CheckpointMap) -> Result<(), CheckpointError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_advance_never_moves_backwards() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let mut map = CheckpointMap::new();
        assert!(map.advance("a", late));
        assert!(!map.advance("a", early));
        assert!(!map.advance("a", late));
        assert_eq!(map.get("a"), Some(late));
        assert_eq!(map.get("b"), None);
    }
}
