//! Rolling-window request limiter shared by all mock backend operations.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Tracks request instants inside a rolling window. `try_acquire` takes the
/// current instant as an argument so tests can replay a timeline without
/// sleeping.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: VecDeque<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self { max_requests, window, requests: VecDeque::new() }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(oldest) = self.requests.front() {
            if now.duration_since(*oldest) >= self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
        if self.requests.len() >= self.max_requests {
            return false;
        }
        self.requests.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::RateLimiter;

    #[test]
    fn allows_up_to_the_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.try_acquire(now));
        assert!(limiter.try_acquire(now));
        assert!(limiter.try_acquire(now));
        assert!(!limiter.try_acquire(now));
    }

    #[test]
    fn window_rolls_instead_of_resetting() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_acquire(start));
        assert!(limiter.try_acquire(start + Duration::from_secs(30)));
        // Still inside the window of both earlier requests.
        assert!(!limiter.try_acquire(start + Duration::from_secs(45)));
        // The first request has aged out, the second has not.
        assert!(limiter.try_acquire(start + Duration::from_secs(61)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(62)));
    }

    #[test]
    fn rejected_requests_do_not_consume_slots() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_acquire(start));
        assert!(!limiter.try_acquire(start + Duration::from_secs(1)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(2)));
        assert!(limiter.try_acquire(start + Duration::from_secs(61)));
    }
}
