//! Per-client abuse prevention.
//!
//! Two layers are evaluated on every inbound request, in order:
//!
//! 1. [`BlocklistFilter`] - a banned client is rejected with `403` no matter
//!    what its throttle counter says.
//! 2. [`ThrottleStore`] - a client that has used up its fixed window is
//!    rejected with `429`. The rejected request is not added to the throttle
//!    count; it is added to the client's retry counter instead, and crossing
//!    `max_retry` inside the find-time window bans the client.
//!
//! Both stores live in process memory and are keyed by client identifier
//! (usually the source IP). [`Gatekeeper`] composes them and owns the
//! [`Clock`]; [`responder`] turns a rejection into an HTTP response.

pub mod blocklist;
pub mod clock;
pub mod responder;
pub mod sweeper;
pub mod throttle;

pub use blocklist::{BanRule, BlocklistFilter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use responder::{AbuseResponse, Rejection};
pub use sweeper::spawn_sweeper;
pub use throttle::{ThrottleOutcome, ThrottleRule, ThrottleStore};

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Limits applied by the [`Gatekeeper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbuseConfig {
    pub throttle: ThrottleRule,
    pub ban: BanRule,
}

impl Default for AbuseConfig {
    /// 200 requests per 5 minutes; more than 1000 rejections within
    /// 30 minutes bans for 12 hours.
    fn default() -> Self {
        Self {
            throttle: ThrottleRule {
                limit: 200,
                period: Duration::from_secs(5 * 60),
            },
            ban: BanRule {
                max_retry: 1000,
                find_time: Duration::from_secs(30 * 60),
                ban_time: Duration::from_secs(12 * 60 * 60),
            },
        }
    }
}

/// Outcome of gatekeeping a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        limit: u32,
        remaining: u32,
        resets_at: DateTime<Utc>,
    },
    Throttled {
        limit: u32,
        resets_at: DateTime<Utc>,
        retry_after: u64,
        /// Set when this rejection triggered a new ban.
        banned_until: Option<DateTime<Utc>>,
    },
    Banned {
        until: DateTime<Utc>,
    },
}

impl Decision {
    /// The rejection to report, or `None` if the request may proceed.
    pub fn rejection(&self) -> Option<Rejection> {
        match *self {
            Decision::Allowed { .. } => None,
            Decision::Throttled {
                limit,
                resets_at,
                retry_after,
                ..
            } => Some(Rejection::Throttled {
                limit,
                retry_after,
                reset_at: resets_at.timestamp(),
            }),
            Decision::Banned { .. } => Some(Rejection::Banned),
        }
    }
}

/// Throttle and blocklist composed over one clock.
pub struct Gatekeeper {
    throttle: ThrottleStore,
    blocklist: BlocklistFilter,
    clock: Arc<dyn Clock>,
}

impl Gatekeeper {
    pub fn new(config: AbuseConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            throttle: ThrottleStore::new(config.throttle),
            blocklist: BlocklistFilter::new(config.ban),
            clock,
        }
    }

    /// Gatekeeper on the wall clock.
    pub fn with_system_clock(config: AbuseConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Decides whether a request from `client` may proceed and updates its
    /// counters accordingly.
    pub fn check(&self, client: &str) -> Decision {
        let now = self.clock.now();

        if let Some(until) = self.blocklist.banned_until(client, now) {
            return Decision::Banned { until };
        }

        let limit = self.throttle.rule().limit;
        match self.throttle.hit(client, now) {
            ThrottleOutcome::Allowed {
                remaining,
                resets_at,
            } => Decision::Allowed {
                limit,
                remaining,
                resets_at,
            },
            ThrottleOutcome::Limited { resets_at } => Decision::Throttled {
                limit,
                resets_at,
                retry_after: seconds_until(now, resets_at),
                banned_until: self.blocklist.record_violation(client, now),
            },
        }
    }

    /// Evicts expired throttle windows and stale ban records.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        self.throttle.sweep(now) + self.blocklist.sweep(now)
    }

    /// Number of clients currently tracked by either layer.
    pub fn tracked(&self) -> (usize, usize) {
        (self.throttle.len(), self.blocklist.len())
    }
}

/// Whole seconds from `now` until `at`, rounded up, at least one.
fn seconds_until(now: DateTime<Utc>, at: DateTime<Utc>) -> u64 {
    let millis = (at - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

pub(crate) fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
