use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Order in which a `BoundedQueue` hands elements back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Fifo,
    Lifo,
}

/// Fixed-capacity holding area. Insertion never blocks: a full queue hands
/// the element straight back.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    discipline: Discipline,
    high_water_mark: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize, discipline: Discipline) -> Self {
        BoundedQueue {
            items: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            discipline,
            high_water_mark: 0,
        }
    }

    /// Inserts `item` unless the queue is at capacity, in which case the
    /// queue is left untouched and the item is returned.
    pub fn try_enqueue(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        self.high_water_mark = self.high_water_mark.max(self.items.len());
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<T> {
        match self.discipline {
            Discipline::Fifo => self.items.pop_front(),
            Discipline::Lifo => self.items.pop_back(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Largest length observed since construction.
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }
}
