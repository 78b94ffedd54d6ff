#![forbid(unsafe_code)]

//! Trailing-edge debounce timer.
//!
//! A [`Debouncer`] holds at most one pending value. Arming it again before the
//! window elapses replaces the value and restarts the window, so a burst of
//! inputs produces exactly one firing carrying the last value.
//!
//! Time is always passed in. Nothing here reads the clock, which keeps the
//! behaviour deterministic under test.
//!
//! ```ignore
//! let mut d = Debouncer::new(Duration::from_millis(300));
//! d.arm_at("r".to_string(), t0);
//! d.arm_at("ru".to_string(), t0 + ms(50));
//! assert_eq!(d.tick_at(t0 + ms(349)), None);
//! assert_eq!(d.tick_at(t0 + ms(350)), Some("ru".to_string()));
//! ```
//!
//! # Invariants
//!
//! - **Latest-wins**: only the most recently armed value can fire.
//! - **At most once**: a value fires once and the timer disarms.
//! - **No early fire**: `tick_at(now)` returns `None` while `now < deadline`.

use std::time::{Duration, Instant};

use tracing::trace;

/// Search debounce window.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Counters for a [`Debouncer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Calls to `arm_at`.
    pub armed: u64,
    /// Pending values replaced before firing.
    pub superseded: u64,
    pub fired: u64,
    /// Pending values dropped by `cancel`.
    pub cancelled: u64,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Cancellable latest-wins timer.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
    stats: DebounceStats,
}

impl<T> Debouncer<T> {
    /// Create a disarmed debouncer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            stats: DebounceStats::default(),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Store `value` and (re)start the window at `now`.
    pub fn arm_at(&mut self, value: T, now: Instant) {
        self.stats.armed += 1;
        if self.pending.is_some() {
            self.stats.superseded += 1;
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
        trace!(window_ms = self.window.as_millis() as u64, "debounce armed");
    }

    /// Drop any pending value without firing.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.stats.cancelled += 1;
        }
    }

    /// Fire if the deadline has passed.
    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        self.stats.fired += 1;
        self.pending.take().map(|p| p.value)
    }

    /// Time left before the pending value fires. `None` when disarmed,
    /// `Some(ZERO)` when already due.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        let pending = self.pending.as_ref()?;
        Some(pending.deadline.saturating_duration_since(now))
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The value that will fire next, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    #[must_use]
    pub fn stats(&self) -> DebounceStats {
        self.stats
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}
