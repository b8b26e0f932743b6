//! Escalating ban list built on a rolling retry counter.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::time::Duration;

use super::to_delta;

/// When repeated throttle violations turn into a ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanRule {
    /// Violations tolerated inside one find-time window; one more bans.
    pub max_retry: u32,
    pub find_time: Duration,
    pub ban_time: Duration,
}

#[derive(Debug, Clone, Copy)]
struct BanRecord {
    window_started_at: DateTime<Utc>,
    retries: u32,
    banned_until: Option<DateTime<Utc>>,
}

impl BanRecord {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            window_started_at: now,
            retries: 0,
            banned_until: None,
        }
    }

    fn is_banned(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.is_some_and(|until| now < until)
    }
}

/// Per-client ban records.
///
/// Expired bans are cleared lazily on the next check; the record then starts
/// counting from zero again.
#[derive(Debug)]
pub struct BlocklistFilter {
    rule: BanRule,
    find_time: TimeDelta,
    ban_time: TimeDelta,
    records: DashMap<String, BanRecord>,
}

impl BlocklistFilter {
    pub fn new(rule: BanRule) -> Self {
        Self {
            rule,
            find_time: to_delta(rule.find_time),
            ban_time: to_delta(rule.ban_time),
            records: DashMap::new(),
        }
    }

    pub fn rule(&self) -> BanRule {
        self.rule
    }

    /// Returns the ban expiry if `client` is banned at `now`.
    pub fn banned_until(&self, client: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut record = self.records.get_mut(client)?;

        match record.banned_until {
            Some(until) if now < until => Some(until),
            Some(_) => {
                *record = BanRecord::fresh(now);
                None
            }
            None => None,
        }
    }

    /// Records one throttle violation by `client`.
    ///
    /// Returns the ban expiry when this violation pushed the client over
    /// `max_retry` inside the current find-time window.
    pub fn record_violation(&self, client: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut record = self
            .records
            .entry(client.to_owned())
            .or_insert_with(|| BanRecord::fresh(now));

        if record.is_banned(now) {
            return None;
        }

        if record.banned_until.is_some() || now >= add(record.window_started_at, self.find_time)
        {
            *record = BanRecord::fresh(now);
        }

        record.retries = record.retries.saturating_add(1);
        if record.retries <= self.rule.max_retry {
            return None;
        }

        let until = add(now, self.ban_time);
        record.retries = 0;
        record.banned_until = Some(until);
        Some(until)
    }

    /// Drops records that carry neither an active ban nor a live retry window.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| {
            r.is_banned(now) || now < add(r.window_started_at, self.find_time)
        });
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn add(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abuse::clock::{Clock, ManualClock};

    fn filter(max_retry: u32) -> BlocklistFilter {
        BlocklistFilter::new(BanRule {
            max_retry,
            find_time: Duration::from_secs(60),
            ban_time: Duration::from_secs(600),
        })
    }

    #[test]
    fn test_bans_after_exceeding_max_retry() {
        let clock = ManualClock::default();
        let filter = filter(3);

        for _ in 0..3 {
            assert_eq!(filter.record_violation("ip", clock.now()), None);
        }
        assert_eq!(filter.banned_until("ip", clock.now()), None);

        let until = filter.record_violation("ip", clock.now());
        assert_eq!(until, Some(clock.now() + TimeDelta::seconds(600)));
        assert_eq!(filter.banned_until("ip", clock.now()), until);
    }

    #[test]
    fn test_retries_outside_find_time_start_over() {
        let clock = ManualClock::default();
        let filter = filter(2);

        filter.record_violation("ip", clock.now());
        filter.record_violation("ip", clock.now());
        clock.advance(TimeDelta::seconds(61));

        assert_eq!(filter.record_violation("ip", clock.now()), None);
        assert_eq!(filter.record_violation("ip", clock.now()), None);
        assert!(filter.record_violation("ip", clock.now()).is_some());
    }

    #[test]
    fn test_ban_expires_and_counter_restarts() {
        let clock = ManualClock::default();
        let filter = filter(0);

        assert!(filter.record_violation("ip", clock.now()).is_some());
        clock.advance(TimeDelta::seconds(599));
        assert!(filter.banned_until("ip", clock.now()).is_some());

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(filter.banned_until("ip", clock.now()), None);
        assert!(filter.record_violation("ip", clock.now()).is_some());
    }

    #[test]
    fn test_violations_while_banned_do_not_extend_ban() {
        let clock = ManualClock::default();
        let filter = filter(0);

        let until = filter.record_violation("ip", clock.now());
        clock.advance(TimeDelta::seconds(10));
        assert_eq!(filter.record_violation("ip", clock.now()), None);
        assert_eq!(filter.banned_until("ip", clock.now()), until);
    }

    #[test]
    fn test_sweep_reclaims_expired_bans() {
        let clock = ManualClock::default();
        let filter = filter(0);

        filter.record_violation("banned", clock.now());
        clock.advance(TimeDelta::seconds(30));
        let counting = filter.record_violation("counting", clock.now());
        assert!(counting.is_some());

        clock.advance(TimeDelta::seconds(3600));
        assert_eq!(filter.sweep(clock.now()), 2);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_sweep_drops_stale_counters_only() {
        let clock = ManualClock::default();
        let filter = filter(5);

        filter.record_violation("stale", clock.now());
        filter.record_violation("banned-soon", clock.now());
        for _ in 0..5 {
            filter.record_violation("banned-soon", clock.now());
        }

        clock.advance(TimeDelta::seconds(120));
        assert_eq!(filter.sweep(clock.now()), 1);
        assert!(filter.banned_until("banned-soon", clock.now()).is_some());
    }
}
