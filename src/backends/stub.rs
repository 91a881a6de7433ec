// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tokio::time::Instant;

use crate::errors::{CheckpointError, DispatchError, FetchError};
use crate::feed::{FeedItem, FeedPage, SourceTarget};
use crate::traits::{CheckpointMap, CheckpointStore, DeliveryReport, Dispatcher, FeedFetcher};

/// A post by `did:plc:author` created at 12:`minute` on 2024-06-01 UTC.
pub fn post_at(minute: u32) -> FeedItem {
    post_by("did:plc:author", Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap())
}

pub fn post_by(author: &str, created_at: DateTime<Utc>) -> FeedItem {
    let rkey = format!("p{}", created_at.timestamp());
    let uri = format!("at://{}/app.bsky.feed.post/{}", author, rkey);
    FeedItem {
        uri: uri.clone(),
        author: author.to_string(),
        text: format!("post {}", rkey),
        created_at,
        reason: None,
        has_embed: false,
        labels: vec![],
        raw: json!({"post": {"uri": uri, "author": {"did": author}}}),
    }
}

type PageKey = (String, Option<String>);
pub type FetchLog = Arc<Mutex<Vec<PageKey>>>;

/// A feed that serves scripted pages keyed by source and cursor. Unscripted
/// requests get an empty page without a cursor.
#[derive(Default)]
pub struct StubFeed {
    pages: HashMap<PageKey, Result<FeedPage, String>>,
    log: FetchLog,
}

impl StubFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(
        mut self,
        target: SourceTarget,
        cursor: Option<&str>,
        items: Vec<FeedItem>,
        next: Option<&str>,
    ) -> Self {
        let page = FeedPage {
            items,
            cursor: next.map(str::to_string),
        };
        self.pages
            .insert((target.key(), cursor.map(str::to_string)), Ok(page));
        self
    }

    pub fn failure(mut self, target: SourceTarget, cursor: Option<&str>, message: &str) -> Self {
        self.pages.insert(
            (target.key(), cursor.map(str::to_string)),
            Err(message.to_string()),
        );
        self
    }

    /// Every `(source key, cursor)` fetched, in order.
    pub fn fetch_log(&self) -> FetchLog {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl FeedFetcher for StubFeed {
    async fn fetch_page(
        &self,
        target: &SourceTarget,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FetchError> {
        let key = (target.key(), cursor.map(str::to_string));
        self.log.lock().unwrap().push(key.clone());
        match self.pages.get(&key) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(message)) => Err(FetchError::Other(message.clone())),
            None => Ok(FeedPage::default()),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// One delivery seen by a [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub destination: String,
    pub message: String,
    pub at: Instant,
}

/// A dispatcher that records every call and answers from a script, falling
/// back to `Delivered` without quota once the script runs out.
#[derive(Default)]
pub struct RecordingDispatcher {
    script: Mutex<VecDeque<Result<DeliveryReport, DispatchError>>>,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, response: Result<DeliveryReport, DispatchError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn deliveries(&self) -> Arc<Mutex<Vec<Delivery>>> {
        Arc::clone(&self.deliveries)
    }
}

#[async_trait::async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn deliver(&self, destination: &str, message: &str) -> Result<DeliveryReport, DispatchError> {
        self.deliveries.lock().unwrap().push(Delivery {
            destination: destination.to_string(),
            message: message.to_string(),
            at: Instant::now(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(DeliveryReport::Delivered { quota: None }))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// In-memory checkpoint store with switchable failures.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    stored: Arc<Mutex<Option<CheckpointMap>>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: CheckpointMap) -> Self {
        Self {
            stored: Arc::new(Mutex::new(Some(map))),
            ..Self::default()
        }
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// The last map written, if any.
    pub fn stored(&self) -> Arc<Mutex<Option<CheckpointMap>>> {
        Arc::clone(&self.stored)
    }
}

fn simulated(operation: &str) -> CheckpointError {
    CheckpointError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("simulated {} failure", operation),
    ))
}

#[async_trait::async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn read(&self) -> Result<CheckpointMap, CheckpointError> {
        if self.fail_reads {
            return Err(simulated("read"));
        }
        Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
    }

    async fn write(&self, checkpoints: &CheckpointMap) -> Result<(), CheckpointError> {
        if self.fail_writes {
            return Err(simulated("write"));
        }
        *self.stored.lock().unwrap() = Some(checkpoints.clone());
        Ok(())
    }
}
