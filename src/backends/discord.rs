// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Channel messages through the Discord REST API.
//!
//! Rate limiting is reported, not handled: a 429 becomes
//! [`DeliveryReport::RateLimited`] with the `Retry-After` hint, and the
//! bucket headers on successful calls become a [`Quota`]. Pacing is the
//! scheduler's job.

use std::time::Duration;

use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use serde_json::json;

use crate::config::consts::DEFAULT_DISCORD_BASE_URL;
use crate::errors::DispatchError;
use crate::traits::{DeliveryReport, Dispatcher, Quota};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET_AFTER: &str = "x-ratelimit-reset-after";

pub struct DiscordDispatcher {
    client: reqwest::Client,
    base_url: String,
    token: String,
    user_agent: String,
}

impl DiscordDispatcher {
    /// `owner_uri` and `version` go into the `DiscordBot (...)` user agent
    /// Discord requires of bots.
    pub fn new(token: &str, owner_uri: &str, version: &str) -> Self {
        Self::with_base_url(DEFAULT_DISCORD_BASE_URL, token, owner_uri, version)
    }

    pub fn with_base_url(base_url: &str, token: &str, owner_uri: &str, version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user_agent: bot_user_agent(owner_uri, version),
        }
    }

    fn message_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.base_url, channel_id)
    }
}

pub fn bot_user_agent(owner_uri: &str, version: &str) -> String {
    format!("DiscordBot ({}, {}) feedsift", owner_uri, version)
}

#[async_trait::async_trait]
impl Dispatcher for DiscordDispatcher {
    async fn deliver(&self, destination: &str, message: &str) -> Result<DeliveryReport, DispatchError> {
        let response = self
            .client
            .post(self.message_url(destination))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .header(USER_AGENT, &self.user_agent)
            .json(&json!({ "content": message }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(DeliveryReport::RateLimited {
                retry_after: retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(DeliveryReport::Delivered {
            quota: quota(response.headers()),
        })
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

/// Reads a header holding a (possibly fractional) number of seconds.
fn seconds_header(headers: &HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<Duration> {
    let seconds: f64 = headers.get(name)?.to_str().ok()?.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    seconds_header(headers, RETRY_AFTER)
}

pub fn quota(headers: &HeaderMap) -> Option<Quota> {
    let remaining = headers
        .get(RATE_LIMIT_REMAINING)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let reset_after = seconds_header(headers, RATE_LIMIT_RESET_AFTER)?;
    Some(Quota {
        remaining,
        reset_after,
    })
}
