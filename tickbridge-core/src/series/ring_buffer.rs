//! Fixed-capacity ring buffer with "ago"-relative indexing.
//!
//! The substrate for tick replay: the in-progress bar lives in the newest
//! slot and is cheaply rewritten tick-by-tick via [`RingBuffer::replace_last`]
//! without reallocation. Capacity never grows; the oldest element is silently
//! evicted on overflow.

use std::collections::VecDeque;

/// Default retained depth for replayed bar series.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Panics if `capacity` is zero; callers validate capacity as a
    /// configuration error before construction.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a new newest slot, evicting the oldest element at capacity.
    pub fn append(&mut self, value: T) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    /// Rewrite the newest slot in place. Used while a bar is still open.
    ///
    /// Panics on an empty buffer — replacing a slot that was never appended
    /// is a programming-contract violation.
    pub fn replace_last(&mut self, value: T) {
        match self.buf.back_mut() {
            Some(slot) => *slot = value,
            None => panic!("replace_last on empty ring buffer"),
        }
    }

    /// Explicit no-op placeholder: the slot update for adapters whose data
    /// lives elsewhere (pass-through series) or is immutable within a bar
    /// (open times). Keeps the three-mutator write contract uniform.
    pub fn keep_last(&mut self) {}

    /// Element `ago` slots behind the newest, or `None` past the retained
    /// history.
    pub fn get(&self, ago: usize) -> Option<&T> {
        let len = self.buf.len();
        if ago < len {
            self.buf.get(len - 1 - ago)
        } else {
            None
        }
    }

    /// Element `ago` slots behind the newest. Panics past the retained
    /// history — reading history that does not exist yet is a strategy bug
    /// that should fail loudly, not clamp.
    pub fn at(&self, ago: usize) -> &T {
        match self.get(ago) {
            Some(v) => v,
            None => panic!(
                "ring buffer index {ago} out of range (len {})",
                self.buf.len()
            ),
        }
    }

    /// Newest element. Panics on an empty buffer.
    pub fn last(&self) -> &T {
        self.at(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_reverse_append_order() {
        let mut rb = RingBuffer::new(10);
        for i in 0..5 {
            rb.append(i);
        }
        assert_eq!(rb.len(), 5);
        for ago in 0..5 {
            assert_eq!(*rb.at(ago), 4 - ago);
        }
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut rb = RingBuffer::new(3);
        for i in 0..7 {
            rb.append(i);
        }
        assert_eq!(rb.len(), 3);
        assert_eq!(*rb.at(0), 6);
        assert_eq!(*rb.at(1), 5);
        assert_eq!(*rb.at(2), 4);
        assert!(rb.get(3).is_none());
    }

    #[test]
    fn replace_last_rewrites_newest_only() {
        let mut rb = RingBuffer::new(4);
        rb.append(1.0);
        rb.append(2.0);
        rb.replace_last(9.0);
        assert_eq!(*rb.at(0), 9.0);
        assert_eq!(*rb.at(1), 1.0);
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn keep_last_changes_nothing() {
        let mut rb = RingBuffer::new(4);
        rb.append(7);
        rb.keep_last();
        assert_eq!(rb.len(), 1);
        assert_eq!(*rb.at(0), 7);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn at_past_count_panics() {
        let mut rb = RingBuffer::new(4);
        rb.append(1);
        rb.at(1);
    }

    #[test]
    #[should_panic(expected = "replace_last on empty")]
    fn replace_last_on_empty_panics() {
        let mut rb: RingBuffer<i32> = RingBuffer::new(4);
        rb.replace_last(1);
    }

    #[test]
    fn get_is_the_fallible_twin() {
        let mut rb = RingBuffer::new(4);
        assert!(rb.get(0).is_none());
        rb.append(5);
        assert_eq!(rb.get(0), Some(&5));
        assert_eq!(rb.get(1), None);
    }
}
