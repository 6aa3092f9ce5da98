//! Per-client daily command limit.
//!
//! Each client gets `limit` commands per calendar day (UTC). Counters live
//! in memory and reset the first time a client is seen on a new day.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use chrono::{NaiveDate, Utc};
use palette_action::RateLimitUsage;

struct DailyCount {
    day: NaiveDate,
    count: u32,
}

/// Shared daily counters keyed by client.
#[derive(Clone)]
pub struct DailyRateLimiter {
    limit: u32,
    counters: Arc<Mutex<HashMap<String, DailyCount>>>,
}

impl DailyRateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one command for `client` today.
    ///
    /// Returns the usage after counting, or `Err` with the unchanged usage
    /// when the client has no commands left.
    pub fn check(&self, client: &str) -> Result<RateLimitUsage, RateLimitUsage> {
        self.check_on(client, Utc::now().date_naive())
    }

    pub fn check_on(&self, client: &str, today: NaiveDate) -> Result<RateLimitUsage, RateLimitUsage> {
        let mut counters = self.counters.lock().unwrap();
        let entry = counters.entry(client.to_string()).or_insert(DailyCount {
            day: today,
            count: 0,
        });
        if entry.day != today {
            entry.day = today;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            return Err(RateLimitUsage {
                remaining: 0,
                used: entry.count,
                limit: self.limit,
            });
        }
        entry.count += 1;
        Ok(RateLimitUsage {
            remaining: self.limit - entry.count,
            used: entry.count,
            limit: self.limit,
        })
    }
}

/// Key a request by client: the first `X-Forwarded-For` entry, else the
/// peer address, else `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
