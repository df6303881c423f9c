//! Timer service contract and debounce.
//!
//! Timers are opaque handles. The host tells the heatmap when a handle fires
//! (see `HeatmapFeature::on_timer`); there are no stored callbacks, so the
//! feature's state keeps a single owner.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use crate::error::{HeatmapError, HeatmapResult};

/// Opaque identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Host timer scheduling.
pub trait TimerService {
    /// Arrange for `handle` to be delivered back after `delay`.
    fn schedule(&mut self, delay: Duration) -> HeatmapResult<TimerHandle>;

    /// Cancel a scheduled timer. Cancelling an unknown or fired handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle) -> HeatmapResult<()>;
}

/// Virtual-clock [`TimerService`] driven explicitly by [`advance`](Self::advance).
///
/// Suitable for frame loops (advance by the frame delta) and tests.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerHandle, Duration>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Move the clock forward, returning handles whose deadline passed, in
    /// deadline order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(Duration, TimerHandle)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(handle, deadline)| (*deadline, *handle))
            .collect();
        due.sort();
        for (_, handle) in &due {
            self.pending.remove(handle);
        }
        due.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl TimerService for ManualTimers {
    fn schedule(&mut self, delay: Duration) -> HeatmapResult<TimerHandle> {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.insert(handle, self.now + delay);
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) -> HeatmapResult<()> {
        self.pending.remove(&handle);
        Ok(())
    }
}

/// Coalesces repeated triggers into one pending timer; only the most recent
/// trigger can fire.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// Cancel any pending timer and schedule a new one after `delay`.
    ///
    /// Scheduling failures are logged and leave nothing pending.
    pub fn trigger(&mut self, timers: &mut dyn TimerService, delay: Duration) -> bool {
        self.cancel(timers);
        match timers.schedule(delay) {
            Ok(handle) => {
                self.pending = Some(handle);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to schedule debounced rebuild");
                false
            }
        }
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self, timers: &mut dyn TimerService) {
        if let Some(handle) = self.pending.take() {
            if let Err(e) = timers.cancel(handle) {
                warn!(error = %e, handle = handle.0, "Failed to cancel debounced rebuild");
            }
        }
    }

    /// Cancel the pending timer and report whether one was pending, so the
    /// caller can run the action immediately.
    pub fn flush(&mut self, timers: &mut dyn TimerService) -> bool {
        let was_pending = self.pending.is_some();
        self.cancel(timers);
        was_pending
    }

    /// Acknowledge a fired handle. Returns `true` only for the current one;
    /// stale handles from superseded triggers are ignored.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

/// A timer service that is always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTimers;

impl TimerService for NoTimers {
    fn schedule(&mut self, _delay: Duration) -> HeatmapResult<TimerHandle> {
        Err(HeatmapError::Timer("no timer service available".to_string()))
    }

    fn cancel(&mut self, _handle: TimerHandle) -> HeatmapResult<()> {
        Err(HeatmapError::Timer("no timer service available".to_string()))
    }
}
