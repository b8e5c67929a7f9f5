//! Debounce and stale-result suppression for suggestion fetches.
//!
//! Every keystroke bumps a generation counter and re-arms the quiet-period
//! timer. A fetch is tagged with the generation current when its timer fired;
//! when it completes, its result may only be committed if that tag is still
//! the current generation. Out-of-order completions are therefore harmless:
//! an older fetch finishing last is recognised as superseded and dropped.
//!
//! The controller is a plain state machine driven with explicit instants so
//! the widget task (and tests) decide when time passes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Default quiet period before a fetch is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Monotonic tag identifying the most recently issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the controller is in the fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing scheduled or running
    Idle,
    /// Timer armed; fires at `deadline` unless another keystroke arrives
    Pending {
        generation: Generation,
        deadline: Instant,
    },
    /// Fetch issued and not yet completed
    InFlight { generation: Generation },
    /// Latest fetch result was committed
    Committed { generation: Generation },
    /// Widget unmounted; nothing will ever commit again
    Cancelled,
}

/// What to do with a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Result belongs to the current generation; apply it.
    Commit,
    /// A newer query was issued since; drop the result.
    Superseded,
    /// Widget is gone; drop the result.
    Cancelled,
}

/// Generation-tagged debounce state machine.
#[derive(Debug)]
pub struct DebounceController {
    delay: Duration,
    current: Generation,
    state: DebounceState,
}

impl Default for DebounceController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebounceController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: Generation::default(),
            state: DebounceState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == DebounceState::Cancelled
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, DebounceState::InFlight { .. })
    }

    /// Deadline of the armed timer, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// A searchable keystroke: supersede everything and re-arm the timer.
    ///
    /// Returns the new generation, or `None` once cancelled.
    pub fn keystroke(&mut self, now: Instant) -> Option<Generation> {
        if self.is_cancelled() {
            return None;
        }
        self.current = self.current.next();
        self.state = DebounceState::Pending {
            generation: self.current,
            deadline: now + self.delay,
        };
        debug!(generation = %self.current, "Debounce timer armed");
        Some(self.current)
    }

    /// Supersede everything without scheduling a fetch (query became
    /// unsearchable, or a suggestion was selected).
    pub fn invalidate(&mut self) {
        if self.is_cancelled() {
            return;
        }
        self.current = self.current.next();
        self.state = DebounceState::Idle;
        debug!(generation = %self.current, "Pending fetches invalidated");
    }

    /// Timer check. Moves `Pending` to `InFlight` once the deadline has
    /// passed and returns the generation the fetch must be tagged with.
    pub fn fire(&mut self, now: Instant) -> Option<Generation> {
        match self.state {
            DebounceState::Pending {
                generation,
                deadline,
            } if now >= deadline => {
                self.state = DebounceState::InFlight { generation };
                debug!(%generation, "Debounce timer fired");
                Some(generation)
            }
            _ => None,
        }
    }

    /// A fetch tagged `generation` completed.
    pub fn complete(&mut self, generation: Generation) -> Disposition {
        if self.is_cancelled() {
            debug!(%generation, "Fetch completed after unmount, dropped");
            return Disposition::Cancelled;
        }
        if generation != self.current {
            debug!(
                %generation,
                current = %self.current,
                "Stale fetch completed, dropped"
            );
            return Disposition::Superseded;
        }
        if let DebounceState::InFlight { generation: g } = self.state {
            if g == generation {
                self.state = DebounceState::Committed { generation };
                return Disposition::Commit;
            }
        }
        // Current tag but not in flight: already committed once.
        Disposition::Superseded
    }

    /// Widget teardown. Disarms the timer and orphans any in-flight fetch.
    pub fn unmount(&mut self) {
        self.state = DebounceState::Cancelled;
        debug!(generation = %self.current, "Debounce controller cancelled");
    }
}
