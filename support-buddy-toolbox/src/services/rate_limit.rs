//! Sliding-window call limiter for the AI backend.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default number of calls allowed per window.
pub const DEFAULT_MAX_CALLS: usize = 10;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Result of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Call recorded.
    Allowed {
        /// Calls still available in the current window.
        remaining: usize,
    },
    /// Window full.
    Limited {
        /// Time until the oldest recorded call leaves the window.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub const fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }
}

/// At most `max_calls` acquisitions in any `window`.
///
/// Timestamps are pruned on every call, so memory is bounded by `max_calls`.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub const fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a call if the window has room.
    pub fn try_acquire(&self) -> RateLimitResult {
        self.try_acquire_at(Instant::now())
    }

    /// Same as [`try_acquire`](Self::try_acquire) with an explicit clock.
    pub fn try_acquire_at(&self, now: Instant) -> RateLimitResult {
        // a panic while holding the lock cannot leave the deque inconsistent
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut calls, now);

        if calls.len() < self.max_calls {
            calls.push_back(now);
            return RateLimitResult::Allowed {
                remaining: self.max_calls - calls.len(),
            };
        }

        let retry_after = calls
            .front()
            .map_or(self.window, |oldest| {
                (*oldest + self.window).saturating_duration_since(now)
            });
        RateLimitResult::Limited { retry_after }
    }

    /// Calls still available right now, without recording one.
    pub fn remaining(&self) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut calls, Instant::now());
        self.max_calls.saturating_sub(calls.len())
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = calls.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_allows_up_to_max_calls() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(
            limiter.try_acquire_at(now),
            RateLimitResult::Allowed { remaining: 2 }
        );
        assert!(limiter.try_acquire_at(now).is_allowed());
        assert_eq!(
            limiter.try_acquire_at(now),
            RateLimitResult::Allowed { remaining: 0 }
        );
        assert!(limiter.try_acquire_at(now).is_limited());
    }

    #[test]
    fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire_at(start).is_allowed());
        assert!(limiter
            .try_acquire_at(start + Duration::from_secs(30))
            .is_allowed());

        match limiter.try_acquire_at(start + Duration::from_secs(45)) {
            RateLimitResult::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(15));
            }
            RateLimitResult::Allowed { .. } => panic!("window should be full"),
        }

        // first call has aged out
        assert!(limiter
            .try_acquire_at(start + Duration::from_secs(60))
            .is_allowed());
        assert!(limiter
            .try_acquire_at(start + Duration::from_secs(61))
            .is_limited());
    }

    #[test]
    fn test_limited_calls_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.try_acquire_at(start).is_allowed());
        for secs in 1..10 {
            assert!(limiter
                .try_acquire_at(start + Duration::from_secs(secs))
                .is_limited());
        }
        assert!(limiter
            .try_acquire_at(start + Duration::from_secs(10))
            .is_allowed());
    }

    #[test]
    fn test_zero_capacity_always_limited() {
        let limiter = SlidingWindowLimiter::new(0, Duration::from_secs(60));
        assert_eq!(
            limiter.try_acquire(),
            RateLimitResult::Limited {
                retry_after: Duration::from_secs(60)
            }
        );
    }

    #[test]
    fn test_remaining_does_not_consume() {
        let limiter = SlidingWindowLimiter::default();
        assert_eq!(limiter.remaining(), DEFAULT_MAX_CALLS);
        assert_eq!(limiter.remaining(), DEFAULT_MAX_CALLS);
        assert!(limiter.try_acquire().is_allowed());
        assert_eq!(limiter.remaining(), DEFAULT_MAX_CALLS - 1);
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_limit() {
        let limiter = Arc::new(SlidingWindowLimiter::new(50, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| limiter.try_acquire().is_allowed())
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .sum();
        assert_eq!(allowed, 50);
    }
}
