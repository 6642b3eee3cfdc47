//! Deterministic one-shot timers for the host event loop.
//!
//! Key properties:
//! - Total ordering on `(deadline, id)`: timers due at the same instant fire
//!   in scheduling order.
//! - Cancellation does not perturb the order of remaining timers.
//! - Nothing fires until the host calls [`TimerQueue::pop_due`] with the
//!   current time, so tests can step time explicitly.

use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Time,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, deadline: Time, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            id,
            deadline,
            payload,
        });
        id
    }

    /// Removes a pending timer. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).payload)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.entries
            .iter()
            .map(|e| e.deadline)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Removes and returns every timer with `deadline <= now`, in firing order.
    pub fn pop_due(&mut self, now: Time) -> Vec<(TimerId, T)> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.deadline.0 <= now.0);
        self.entries = pending;

        due.sort_by(|a, b| {
            a.deadline
                .0
                .total_cmp(&b.deadline.0)
                .then_with(|| a.id.cmp(&b.id))
        });
        due.into_iter().map(|e| (e.id, e.payload)).collect()
    }
}
