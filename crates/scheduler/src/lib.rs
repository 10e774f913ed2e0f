//! Frame tick scheduling.
//!
//! The animation driver never loops on its own: after each frame it asks a
//! [`TickScheduler`] for the next tick and yields back to the host loop. The
//! host later delivers the tick by handle. Keeping this behind a trait lets the
//! driver's state machine run against [`FrameQueue`] in tests exactly as it
//! does under a real window.

use std::collections::BTreeSet;

/// Identifies one scheduled tick. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Requests and cancels frame ticks.
pub trait TickScheduler {
    /// Requests one future tick and returns its handle.
    fn schedule_tick(&mut self) -> TickHandle;
    /// Withdraws a tick. Cancelling an already delivered or unknown handle is a no-op.
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Host-side view of a scheduler whose ticks are delivered by polling.
pub trait TickSource {
    /// True when at least one tick is waiting for delivery.
    fn has_pending(&self) -> bool;
    /// Removes and returns every pending tick in scheduling order.
    fn drain_due(&mut self) -> Vec<TickHandle>;
}

/// Single-threaded tick queue.
///
/// Scheduling only records a handle; the host decides when ticks are due
/// (on the next redraw, or immediately in tests) and drains them.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: BTreeSet<TickHandle>,
    scheduled_total: u64,
    cancelled_total: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TickHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Number of ticks ever scheduled.
    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }

    /// Number of pending ticks withdrawn before delivery.
    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }
}

impl TickScheduler for FrameQueue {
    fn schedule_tick(&mut self) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.scheduled_total += 1;
        self.pending.insert(handle);
        tracing::trace!(tick = handle.0, "scheduled tick");
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending.remove(&handle) {
            self.cancelled_total += 1;
            tracing::trace!(tick = handle.0, "cancelled tick");
        }
    }
}

impl TickSource for FrameQueue {
    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn drain_due(&mut self) -> Vec<TickHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_ordered() {
        let mut queue = FrameQueue::new();
        let first = queue.schedule_tick();
        let second = queue.schedule_tick();
        assert_ne!(first, second);
        assert!(first < second);
        assert_eq!(queue.drain_due(), vec![first, second]);
        assert!(!queue.has_pending());
    }

    #[test]
    fn cancelled_tick_is_never_delivered() {
        let mut queue = FrameQueue::new();
        let kept = queue.schedule_tick();
        let dropped = queue.schedule_tick();
        queue.cancel_tick(dropped);

        assert!(queue.is_pending(kept));
        assert!(!queue.is_pending(dropped));
        assert_eq!(queue.drain_due(), vec![kept]);
        assert_eq!(queue.cancelled_total(), 1);
    }

    #[test]
    fn cancelling_delivered_tick_is_noop() {
        let mut queue = FrameQueue::new();
        let handle = queue.schedule_tick();
        assert_eq!(queue.drain_due(), vec![handle]);

        queue.cancel_tick(handle);
        assert_eq!(queue.cancelled_total(), 0);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn handles_are_not_reused_after_drain() {
        let mut queue = FrameQueue::new();
        let first = queue.schedule_tick();
        queue.drain_due();
        let second = queue.schedule_tick();
        assert_ne!(first, second);
        assert_eq!(queue.scheduled_total(), 2);
    }
}
