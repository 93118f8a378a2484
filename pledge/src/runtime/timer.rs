use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Instant;

use super::scheduler::Job;

/// Callback slot shared between a timer entry and whoever may cancel it.
///
/// Firing or cancelling takes the callback out, so each timer runs at most
/// once and a cancelled timer releases everything its callback captured.
pub(crate) type TimerSlot = Rc<RefCell<Option<Job>>>;

/// An entry in the scheduler timer queue.
///
/// `TimerEntry` represents a callback due at a specific deadline. Entries
/// live in a binary heap ordered by deadline, then by registration order.
pub(crate) struct TimerEntry {
    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Registration sequence number, used to break deadline ties.
    seq: u64,

    /// Callback to run; `None` once fired or cancelled.
    pub(crate) slot: TimerSlot,
}

impl TimerEntry {
    fn is_cancelled(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// Orders timer entries by deadline, then by registration order.
    ///
    /// The comparison is **reversed** so that a `BinaryHeap<TimerEntry>`
    /// behaves as a min-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending timers.
#[derive(Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    next_seq: u64,
}

impl TimerQueue {
    /// Registers `callback` to run once `deadline` is reached.
    pub(crate) fn push(&mut self, deadline: Instant, callback: Job) -> TimerSlot {
        let slot: TimerSlot = Rc::new(RefCell::new(Some(callback)));
        let seq = self.next_seq;
        self.next_seq += 1;

        self.heap.push(TimerEntry {
            deadline,
            seq,
            slot: slot.clone(),
        });

        slot
    }

    /// Pops the earliest entry whose deadline is at or before `now`.
    pub(crate) fn pop_expired(&mut self, now: Instant) -> Option<TimerEntry> {
        if self.heap.peek()?.deadline <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Returns the earliest live deadline, discarding cancelled entries.
    pub(crate) fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(entry) = self.heap.peek() {
            if !entry.is_cancelled() {
                return Some(entry.deadline);
            }
            self.heap.pop();
        }
        None
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub(crate) fn live(&self) -> usize {
        self.heap.iter().filter(|entry| !entry.is_cancelled()).count()
    }

    /// Removes every entry.
    pub(crate) fn drain(&mut self) -> Vec<TimerEntry> {
        self.heap.drain().collect()
    }
}
