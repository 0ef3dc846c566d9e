//! Fixed-interval poll scheduling for one endpoint scope.
//!
//! Intervals never back off. Failures count toward a stop threshold; once
//! stopped, a scope stays quiet until a manual refresh re-arms it. At most
//! one request per scope is in flight at a time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_failures: u32,
    last_dispatch: Option<Instant>,
    inflight: bool,
    consecutive_failures: u32,
}

impl Poller {
    pub fn new(interval: Duration, max_failures: u32) -> Self {
        Self {
            interval,
            max_failures,
            last_dispatch: None,
            inflight: false,
            consecutive_failures: 0,
        }
    }

    /// Whether a new request should be dispatched now.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.inflight || self.is_stopped() {
            return false;
        }
        match self.last_dispatch {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    pub fn mark_dispatched(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
        self.inflight = true;
    }

    pub fn mark_success(&mut self) {
        self.inflight = false;
        self.consecutive_failures = 0;
    }

    pub fn mark_failure(&mut self) {
        self.inflight = false;
        self.consecutive_failures += 1;
    }

    pub fn is_stopped(&self) -> bool {
        self.consecutive_failures >= self.max_failures
    }

    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Manual refresh: clear the failure count and make the scope
    /// immediately due again.
    pub fn rearm(&mut self) {
        self.consecutive_failures = 0;
        self.last_dispatch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poller(interval_ms: u64) -> Poller {
        Poller::new(Duration::from_millis(interval_ms), 5)
    }

    #[test]
    fn first_poll_is_due_immediately() {
        let p = poller(1000);
        assert!(p.is_due(Instant::now()));
    }

    #[test]
    fn not_due_while_a_request_is_in_flight() {
        let mut p = poller(0);
        let now = Instant::now();
        p.mark_dispatched(now);
        assert!(!p.is_due(now));
        p.mark_success();
        assert!(p.is_due(now));
    }

    #[test]
    fn interval_gates_the_next_dispatch() {
        let mut p = poller(1000);
        let start = Instant::now();
        p.mark_dispatched(start);
        p.mark_success();
        assert!(!p.is_due(start + Duration::from_millis(500)));
        assert!(p.is_due(start + Duration::from_millis(1000)));
    }

    #[test]
    fn consecutive_failures_stop_the_scope() {
        let mut p = poller(0);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(p.is_due(now));
            p.mark_dispatched(now);
            p.mark_failure();
        }
        assert!(p.is_stopped());
        assert!(!p.is_due(now));
    }

    #[test]
    fn one_success_resets_the_failure_count() {
        let mut p = poller(0);
        let now = Instant::now();
        for _ in 0..4 {
            p.mark_dispatched(now);
            p.mark_failure();
        }
        p.mark_dispatched(now);
        p.mark_success();
        assert_eq!(p.failures(), 0);
        assert!(!p.is_stopped());
    }

    #[test]
    fn rearm_revives_a_stopped_scope() {
        let mut p = poller(60_000);
        let now = Instant::now();
        for _ in 0..5 {
            p.mark_dispatched(now);
            p.mark_failure();
        }
        assert!(p.is_stopped());
        p.rearm();
        assert!(!p.is_stopped());
        assert!(p.is_due(now));
    }
}
