//! Single-producer/single-consumer receive ring
//!
//! The receive interrupt is the only producer and the foreground reader the
//! only consumer. Each side owns one index and only reads the other, so
//! plain atomic loads and stores are enough; no read-modify-write is used.
//! One slot is always left free to tell a full ring from an empty one.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use usart_core::{Frame, FrameCodec};

/// Fixed-capacity frame ring, allocated once at configuration time
pub struct RxRing {
    slots: Box<[AtomicU8]>,
    codec: FrameCodec,
    capacity: usize,
    /// Next slot to write; owned by the producer
    head: AtomicUsize,
    /// Next slot to read; owned by the consumer
    tail: AtomicUsize,
}

impl RxRing {
    /// Allocate a ring of `capacity` slots (holding `capacity - 1` frames).
    ///
    /// A zero capacity is raised to one: a ring that can never hold a frame.
    pub fn new(capacity: usize, codec: FrameCodec) -> Self {
        let capacity = capacity.max(1);
        let slots: Vec<AtomicU8> = (0..capacity * codec.frame_bytes())
            .map(|_| AtomicU8::new(0))
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            codec,
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Number of slots, including the one kept free
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames the ring can hold at once
    pub const fn usable(&self) -> usize {
        self.capacity - 1
    }

    /// Producer half; only the receive interrupt may use it
    pub fn producer(&self) -> RxProducer<'_> {
        RxProducer { ring: self }
    }

    /// Consumer half; only the foreground reader may use it
    pub fn consumer(&self) -> RxConsumer<'_> {
        RxConsumer { ring: self }
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) % self.capacity
    }

    fn len_between(&self, head: usize, tail: usize) -> usize {
        (head + self.capacity - tail) % self.capacity
    }

    fn write_slot(&self, index: usize, frame: Frame) {
        let n = self.codec.frame_bytes();
        let bytes = self.codec.to_bytes(frame);
        for (cell, byte) in self.slots[index * n..index * n + n].iter().zip(bytes) {
            cell.store(byte, Ordering::Relaxed);
        }
    }

    fn read_slot(&self, index: usize) -> Frame {
        let n = self.codec.frame_bytes();
        let mut bytes = [0u8; 2];
        for (byte, cell) in bytes.iter_mut().zip(&self.slots[index * n..index * n + n]) {
            *byte = cell.load(Ordering::Relaxed);
        }
        self.codec.from_bytes(&bytes[..n])
    }
}

/// Write side of the ring
pub struct RxProducer<'a> {
    ring: &'a RxRing,
}

impl<'a> RxProducer<'a> {
    /// Whether another frame fits
    pub fn has_room(&self) -> bool {
        let head = self.ring.head.load(Ordering::Relaxed);
        self.ring.next(head) != self.ring.tail.load(Ordering::Acquire)
    }

    /// Claim the slot at `head` if the ring is not full.
    ///
    /// Nothing is published until [`RxSlot::commit`]; dropping the slot
    /// leaves the ring unchanged.
    pub fn reserve(&self) -> Option<RxSlot<'a>> {
        let head = self.ring.head.load(Ordering::Relaxed);
        let next = self.ring.next(head);
        if next == self.ring.tail.load(Ordering::Acquire) {
            return None;
        }
        Some(RxSlot {
            ring: self.ring,
            index: head,
            next,
        })
    }
}

/// A reserved, not yet published, ring slot
pub struct RxSlot<'a> {
    ring: &'a RxRing,
    index: usize,
    next: usize,
}

impl RxSlot<'_> {
    /// Store `frame` and advance `head` past it
    pub fn commit(self, frame: Frame) {
        self.ring.write_slot(self.index, frame);
        self.ring.head.store(self.next, Ordering::Release);
    }
}

/// Read side of the ring
pub struct RxConsumer<'a> {
    ring: &'a RxRing,
}

impl RxConsumer<'_> {
    /// Frames waiting to be read
    pub fn len(&self) -> usize {
        let head = self.ring.head.load(Ordering::Acquire);
        let tail = self.ring.tail.load(Ordering::Relaxed);
        self.ring.len_between(head, tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the oldest frame and advance `tail` past it
    pub fn pop(&self) -> Option<Frame> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        if tail == self.ring.head.load(Ordering::Acquire) {
            return None;
        }
        let frame = self.ring.read_slot(tail);
        self.ring.tail.store(self.ring.next(tail), Ordering::Release);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usart_core::CharWidth;

    fn push(ring: &RxRing, value: u16) -> bool {
        match ring.producer().reserve() {
            Some(slot) => {
                slot.commit(Frame(value));
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_ring_fifo() {
        let ring = RxRing::new(4, FrameCodec::new(CharWidth::Eight));

        assert!(ring.consumer().is_empty());
        assert!(push(&ring, 10));
        assert!(push(&ring, 20));
        assert!(push(&ring, 30));
        assert_eq!(ring.consumer().len(), 3);

        assert_eq!(ring.consumer().pop(), Some(Frame(10)));
        assert_eq!(ring.consumer().pop(), Some(Frame(20)));
        assert_eq!(ring.consumer().pop(), Some(Frame(30)));
        assert_eq!(ring.consumer().pop(), None);
    }

    #[test]
    fn test_ring_keeps_one_slot_free() {
        let ring = RxRing::new(3, FrameCodec::new(CharWidth::Eight));

        assert!(push(&ring, 1));
        assert!(push(&ring, 2));
        assert!(!ring.producer().has_room());
        assert!(!push(&ring, 3));
        assert_eq!(ring.consumer().len(), ring.usable());
    }

    #[test]
    fn test_ring_wraps_around() {
        let ring = RxRing::new(3, FrameCodec::new(CharWidth::Nine));

        for value in 0..10u16 {
            assert!(push(&ring, 0x100 + value));
            assert_eq!(ring.consumer().len(), 1);
            assert_eq!(ring.consumer().pop(), Some(Frame(0x100 + value)));
        }
    }

    #[test]
    fn test_dropped_slot_is_not_published() {
        let ring = RxRing::new(4, FrameCodec::new(CharWidth::Eight));

        let slot = ring.producer().reserve();
        assert!(slot.is_some());
        drop(slot);

        assert!(ring.consumer().is_empty());
    }

    #[test]
    fn test_zero_capacity_ring_is_always_full() {
        let ring = RxRing::new(0, FrameCodec::new(CharWidth::Eight));
        assert_eq!(ring.capacity(), 1);
        assert!(!ring.producer().has_room());
    }
}
