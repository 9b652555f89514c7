//! Deferred work scheduled on the game clock.
//!
//! Tasks are plain values: everything a task needs travels inside it, so a
//! restoration attempt never reads state that changed behind its back.
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::command::Command;
use crate::time::GameTime;

/// Identifies one restoration attempt: cycle number and 1-based attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestoreSlot {
    pub cycle: u64,
    pub attempt: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    /// Deferred execution of a triggered cycle.
    Execute { cycle: u64 },
    /// One restoration attempt with the snapshot taken before the action.
    Restore {
        slot: RestoreSlot,
        fallback: Option<Command>,
    },
}

#[derive(Debug)]
struct Scheduled {
    due: GameTime,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-heap of tasks ordered by due time, FIFO among equal due times.
#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: GameTime, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, task }));
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: GameTime) -> Option<Task> {
        if self.heap.peek()?.0.due > now {
            return None;
        }
        self.heap.pop().map(|Reverse(scheduled)| scheduled.task)
    }

    pub fn next_due(&self) -> Option<GameTime> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.due)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execute(cycle: u64) -> Task {
        Task::Execute { cycle }
    }

    #[test]
    fn pops_in_due_order_then_fifo() {
        let mut queue = TaskQueue::new();
        queue.schedule(GameTime(500), execute(3));
        queue.schedule(GameTime(100), execute(1));
        queue.schedule(GameTime(100), execute(2));

        assert_eq!(queue.next_due(), Some(GameTime(100)));
        assert_eq!(queue.pop_due(GameTime(1_000)), Some(execute(1)));
        assert_eq!(queue.pop_due(GameTime(1_000)), Some(execute(2)));
        assert_eq!(queue.pop_due(GameTime(1_000)), Some(execute(3)));
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_wait_until_due() {
        let mut queue = TaskQueue::new();
        queue.schedule(GameTime(500), execute(1));

        assert_eq!(queue.pop_due(GameTime(499)), None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(GameTime(500)), Some(execute(1)));
    }

    #[test]
    fn restore_slots_order_by_cycle_then_attempt() {
        let early = RestoreSlot {
            cycle: 1,
            attempt: 3,
        };
        let late = RestoreSlot {
            cycle: 2,
            attempt: 1,
        };
        assert!(early < late);
    }
}
