//! Fixed-window request counter per client.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::time::Duration;

use super::to_delta;

/// Request cap for one client within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRule {
    pub limit: u32,
    pub period: Duration,
}

/// Result of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleOutcome {
    /// Counted; `remaining` more requests fit in the window.
    Allowed {
        remaining: u32,
        resets_at: DateTime<Utc>,
    },
    /// Limit already reached; the request was not counted.
    Limited { resets_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// In-memory throttle counters keyed by client identifier.
///
/// A window opens on a client's first request and resets entirely once
/// `period` has elapsed. Check and increment happen under the map shard's
/// write lock, so concurrent requests from one client cannot both slip past
/// the limit, while other clients only contend when they share a shard.
#[derive(Debug)]
pub struct ThrottleStore {
    rule: ThrottleRule,
    period: TimeDelta,
    windows: DashMap<String, Window>,
}

impl ThrottleStore {
    pub fn new(rule: ThrottleRule) -> Self {
        Self {
            rule,
            period: to_delta(rule.period),
            windows: DashMap::new(),
        }
    }

    pub fn rule(&self) -> ThrottleRule {
        self.rule
    }

    /// Counts a request from `client` unless its window is already full.
    pub fn hit(&self, client: &str, now: DateTime<Utc>) -> ThrottleOutcome {
        let mut window = self
            .windows
            .entry(client.to_owned())
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now >= window_end(window.started_at, self.period) {
            window.started_at = now;
            window.count = 0;
        }

        let resets_at = window_end(window.started_at, self.period);
        if window.count >= self.rule.limit {
            return ThrottleOutcome::Limited { resets_at };
        }

        window.count += 1;
        ThrottleOutcome::Allowed {
            remaining: self.rule.limit - window.count,
            resets_at,
        }
    }

    /// Drops windows that have ended.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now < window_end(w.started_at, self.period));
        before.saturating_sub(self.windows.len())
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

fn window_end(started_at: DateTime<Utc>, period: TimeDelta) -> DateTime<Utc> {
    started_at
        .checked_add_signed(period)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
