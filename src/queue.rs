//! Fixed-capacity circular FIFO.

use log::debug;

use crate::geometry::Position;

/// Work-list of pixels for [`BorderScan`](crate::render::BorderScan).
pub type FrontierQueue = ArrayQueue<Position>;

/// A ring buffer whose capacity is a power of two, so wrapping an index is a
/// bitwise AND with `capacity - 1`.
///
/// The storage is allocated once; [`push`](ArrayQueue::push) on a full queue
/// and [`pop`](ArrayQueue::pop) on an empty one leave it untouched.
pub struct ArrayQueue<T> {
    items: Box<[T]>,
    index_mask: usize,
    write: usize,
    read: usize,
    len: usize,
}

impl<T: Copy + Default> ArrayQueue<T> {
    /// A queue holding `1 << capacity_bits` items.
    pub fn with_capacity_bits(capacity_bits: u32) -> Self {
        let capacity = 1usize << capacity_bits;
        Self {
            items: vec![T::default(); capacity].into_boxed_slice(),
            index_mask: capacity - 1,
            write: 0,
            read: 0,
            len: 0,
        }
    }

    /// A queue holding at least `capacity` items; the capacity is rounded up
    /// to the next power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let rounded = capacity.max(1).next_power_of_two();
        if rounded != capacity {
            debug!("rounding queue capacity {} up to {}", capacity, rounded);
        }
        Self::with_capacity_bits(rounded.trailing_zeros())
    }
}

impl<T: Copy> ArrayQueue<T> {
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    pub fn clear(&mut self) {
        self.write = 0;
        self.read = 0;
        self.len = 0;
    }

    /// Appends `value`, or returns `false` if the queue is full.
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items[self.write] = value;
        self.write = (self.write + 1) & self.index_mask;
        self.len += 1;
        true
    }

    /// Removes the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.items[self.read];
        self.read = (self.read + 1) & self.index_mask;
        self.len -= 1;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_to_capacity_then_reuses_slots() {
        for bits in 0..=10 {
            let mut queue = ArrayQueue::<Position>::with_capacity_bits(bits);
            let capacity = 1usize << bits;
            assert_eq!(queue.capacity(), capacity);

            for i in 0..capacity {
                assert!(queue.push(Position::new(i as i32, 0)), "push {} of {}", i, capacity);
            }
            assert!(queue.is_full());
            assert!(!queue.push(Position::new(-1, -1)));
            assert_eq!(queue.len(), capacity);

            assert_eq!(queue.pop(), Some(Position::new(0, 0)));
            assert!(queue.push(Position::new(-1, -1)));
            assert!(queue.is_full());
        }
    }

    #[test]
    fn pops_in_fifo_order_across_wraparound() {
        let mut queue = ArrayQueue::<u32>::with_capacity_bits(2);
        for round in 0..5u32 {
            assert!(queue.push(round * 10));
            assert!(queue.push(round * 10 + 1));
            assert!(queue.push(round * 10 + 2));
            assert_eq!(queue.pop(), Some(round * 10));
            assert_eq!(queue.pop(), Some(round * 10 + 1));
            assert_eq!(queue.pop(), Some(round * 10 + 2));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_on_empty_fails() {
        let mut queue = ArrayQueue::<u32>::with_capacity_bits(3);
        assert_eq!(queue.pop(), None);
        assert!(queue.push(7));
        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn failed_push_does_not_disturb_contents() {
        let mut queue = ArrayQueue::<u32>::with_capacity_bits(1);
        assert!(queue.push(1));
        assert!(queue.push(2));
        assert!(!queue.push(3));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn clear_resets() {
        let mut queue = ArrayQueue::<u32>::with_capacity_bits(2);
        queue.push(1);
        queue.push(2);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test_log::test]
    fn capacity_rounds_up_to_power_of_two() {
        assert_eq!(ArrayQueue::<u8>::with_capacity(0).capacity(), 1);
        assert_eq!(ArrayQueue::<u8>::with_capacity(1).capacity(), 1);
        assert_eq!(ArrayQueue::<u8>::with_capacity(5).capacity(), 8);
        assert_eq!(ArrayQueue::<u8>::with_capacity(4096).capacity(), 4096);
        assert_eq!(ArrayQueue::<u8>::with_capacity(4097).capacity(), 8192);
    }
}
