use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::entities::{BombId, DroneId};

/// A deferred action. Each one fires once; re-arming is the job of whoever handles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Task {
    SpawnDrone,
    MoveDrone(DroneId),
    MoveBomb(BombId),
}

/// Virtual-time timer queue. Times are milliseconds since the session started.
/// Tasks due at the same instant run in the order they were scheduled.
pub struct Scheduler {
    queue: BinaryHeap<Reverse<(u64, u64, Task)>>,
    now: u64,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            now: 0,
            next_seq: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, task: Task) {
        let fire_at = self.now + delay_ms;
        self.queue.push(Reverse((fire_at, self.next_seq, task)));
        self.next_seq += 1;
    }

    pub fn next_due_time(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse((fire_at, _, _))| *fire_at)
    }

    /// Pops the earliest task due at or before `until`, moving the clock to its fire time.
    pub fn pop_due(&mut self, until: u64) -> Option<Task> {
        match self.next_due_time() {
            Some(fire_at) if fire_at <= until => {
                let Reverse((fire_at, _, task)) = self.queue.pop()?;
                self.now = self.now.max(fire_at);
                Some(task)
            }
            _ => None,
        }
    }

    /// Moves the clock forward once every task up to `until` has been popped.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.queue.iter().any(|Reverse((_, _, queued))| *queued == task)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
