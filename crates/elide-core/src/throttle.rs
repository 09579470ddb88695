#![forbid(unsafe_code)]

//! Latest-wins coalescing for high-frequency value streams.
//!
//! Container resize observers fire on every intermediate size while the user
//! drags a window edge. Re-running a full ellipsis measurement for each of
//! those is wasted work: only the settled width matters. [`Throttle`] sits
//! between the observer and the engine and decides when a value is applied.
//!
//! Two modes are supported:
//!
//! - **Throttle** (leading + trailing edge): the first value after a quiet
//!   period applies immediately; later values inside the window are held and
//!   the newest one applies once the window has elapsed.
//! - **Debounce** (trailing edge only): values apply once no new value has
//!   arrived for the full delay.
//!
//! # Invariants
//!
//! - **Latest-wins**: the final value of a burst is never dropped.
//! - **No duplicates**: a value equal to the last applied one is skipped when
//!   nothing is pending.
//! - **Deterministic**: every entry point has an `_at(now)` twin, so tests can
//!   drive time explicitly.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use elide_core::throttle::{Throttle, ThrottleConfig};
//!
//! let mut widths = Throttle::new(ThrottleConfig::default());
//! let t0 = Instant::now();
//!
//! // Leading edge: applies at once.
//! assert_eq!(widths.push_at(300, t0), Some(300));
//! // Inside the window: held.
//! assert_eq!(widths.push_at(280, t0 + Duration::from_millis(20)), None);
//! assert_eq!(widths.push_at(150, t0 + Duration::from_millis(40)), None);
//! // Window elapsed: latest value applies.
//! assert_eq!(widths.tick_at(t0 + Duration::from_millis(200)), Some(150));
//! ```

use std::time::{Duration, Instant};

/// Default coalescing window, matching typical resize-observer throttling.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

/// How pending values are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalesceMode {
    /// Leading and trailing edge: apply now if the window is open, otherwise
    /// hold the newest value until the window closes.
    #[default]
    Throttle,
    /// Trailing edge only: apply once the stream has been quiet for the window.
    Debounce,
}

/// Configuration for [`Throttle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Coalescing window.
    pub window: Duration,
    /// Release strategy.
    pub mode: CoalesceMode,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            mode: CoalesceMode::Throttle,
        }
    }
}

impl ThrottleConfig {
    /// Throttle with the given window.
    #[must_use]
    pub fn throttle(window: Duration) -> Self {
        Self {
            window,
            mode: CoalesceMode::Throttle,
        }
    }

    /// Debounce with the given delay.
    #[must_use]
    pub fn debounce(delay: Duration) -> Self {
        Self {
            window: delay,
            mode: CoalesceMode::Debounce,
        }
    }
}

#[inline]
fn elapsed_since(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier).unwrap_or(Duration::ZERO)
}

/// Latest-wins coalescer for a stream of values (typically container widths).
///
/// Not thread-safe; drive it from the same loop that owns the engine.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    config: ThrottleConfig,
    /// Newest value not yet applied.
    pending: Option<T>,
    /// Last value handed to the caller.
    last_applied: Option<T>,
    /// When a value was last handed out.
    last_apply: Option<Instant>,
    /// When a value was last pushed.
    last_push: Option<Instant>,
    /// Number of values absorbed without being applied.
    coalesced: u64,
}

impl<T: Clone + PartialEq> Throttle<T> {
    /// Create an empty throttle.
    #[must_use]
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            pending: None,
            last_applied: None,
            last_apply: None,
            last_push: None,
            coalesced: 0,
        }
    }

    /// Create a throttle that treats `initial` as already applied.
    #[must_use]
    pub fn with_initial(config: ThrottleConfig, initial: T) -> Self {
        let mut throttle = Self::new(config);
        throttle.last_applied = Some(initial);
        throttle
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> ThrottleConfig {
        self.config
    }

    /// Push a new value observed now.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.push_at(value, Instant::now())
    }

    /// Push a new value observed at `now`.
    ///
    /// Returns `Some(value)` when the value should be applied immediately.
    pub fn push_at(&mut self, value: T, now: Instant) -> Option<T> {
        self.last_push = Some(now);

        if self.pending.is_none() && self.last_applied.as_ref() == Some(&value) {
            crate::trace!(target: "elide.throttle", "skip_same_value");
            return None;
        }

        if self.config.mode == CoalesceMode::Throttle && self.window_open(now) {
            self.pending = None;
            if self.last_applied.as_ref() == Some(&value) {
                return None;
            }
            return Some(self.apply(value, now));
        }

        if self.pending.replace(value).is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
        }
        crate::trace!(target: "elide.throttle", coalesced = self.coalesced, "hold");
        None
    }

    /// Check for a releasable value now.
    pub fn tick(&mut self) -> Option<T> {
        self.tick_at(Instant::now())
    }

    /// Check for a releasable value at `now`.
    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        self.pending.as_ref()?;

        let ready = match self.config.mode {
            CoalesceMode::Throttle => self.window_open(now),
            CoalesceMode::Debounce => self
                .last_push
                .is_none_or(|t| elapsed_since(now, t) >= self.config.window),
        };
        if !ready {
            return None;
        }

        let value = self.pending.take()?;
        if self.last_applied.as_ref() == Some(&value) {
            // The stream settled back where it started.
            return None;
        }
        Some(self.apply(value, now))
    }

    /// Apply any pending value immediately, ignoring the window.
    pub fn flush_at(&mut self, now: Instant) -> Option<T> {
        let value = self.pending.take()?;
        Some(self.apply(value, now))
    }

    /// Time left until a pending value becomes releasable.
    #[must_use]
    pub fn time_until_release(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref()?;
        let anchor = match self.config.mode {
            CoalesceMode::Throttle => self.last_apply,
            CoalesceMode::Debounce => self.last_push,
        };
        let Some(anchor) = anchor else {
            return Some(Duration::ZERO);
        };
        Some(self.config.window.saturating_sub(elapsed_since(now, anchor)))
    }

    /// Whether a value is waiting to be released.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The last value handed to the caller.
    #[must_use]
    pub fn last_applied(&self) -> Option<&T> {
        self.last_applied.as_ref()
    }

    /// How many values were replaced before being applied.
    #[must_use]
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_apply
            .is_none_or(|t| elapsed_since(now, t) >= self.config.window)
    }

    fn apply(&mut self, value: T, now: Instant) -> T {
        crate::debug!(target: "elide.throttle", "apply");
        self.last_apply = Some(now);
        self.last_applied = Some(value.clone());
        value
    }
}
