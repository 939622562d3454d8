//! A bounded k-FIFO queue: a fixed-size contiguous ring of `queue_size =
//! k * num_segments` slots, with head/tail advancing in `k`-sized strides
//! instead of `UnboundedKFifo`'s segment links.
//!
//! Bounding the queue trades the unbounded variant's ability to grow under
//! sustained overload for a single pre-allocated array and a `put` that can
//! legitimately fail when full.

use std::sync::atomic::Ordering;

use crate::backoff::Backoff;
use crate::payload::Payload;
use crate::pool::Pool;
use crate::tagged::PackedWord;

pub struct BoundedKFifo<T: Payload> {
    queue_size: usize,
    k: usize,
    head: PackedWord,
    tail: PackedWord,
    slots: Vec<PackedWord>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Payload> BoundedKFifo<T> {
    pub fn new(k: usize, num_segments: usize) -> Self {
        assert!(k >= 1 && num_segments >= 1);
        let queue_size = k * num_segments;
        let slots = (0..queue_size).map(|_| PackedWord::new(T::EMPTY.to_bits())).collect();
        BoundedKFifo {
            queue_size,
            k,
            head: PackedWord::new(0),
            tail: PackedWord::new(0),
            slots,
            _marker: std::marker::PhantomData,
        }
    }

    fn find_index(&self, start: usize, want_empty: bool) -> Option<(usize, u64, u64)> {
        let random_offset = crate::rand::index(self.k, false);
        for i in 0..self.k {
            let index = (start + (random_offset + i) % self.k) % self.queue_size;
            let (bits, tag) = self.slots[index].load_raw(Ordering::Acquire);
            if T::from_bits(bits).is_empty() == want_empty {
                return Some((index, bits, tag));
            }
        }
        None
    }

    fn queue_full(&self, head_index: usize, tail_index: usize) -> bool {
        let (head_now, _) = self.head.load_raw(Ordering::Acquire);
        (tail_index + self.k) % self.queue_size == head_index && head_index == head_now as usize
    }

    fn in_valid_region(&self, tail_old: usize, tail_current: usize, head_current: usize) -> bool {
        let wraps = tail_current < head_current;
        if !wraps {
            head_current < tail_old && tail_old <= tail_current
        } else {
            head_current < tail_old || tail_old <= tail_current
        }
    }

    fn not_in_valid_region(&self, tail_old: usize, tail_current: usize, head_current: usize) -> bool {
        let wraps = tail_current < head_current;
        if !wraps {
            tail_old < tail_current || head_current < tail_old
        } else {
            tail_old < tail_current && head_current < tail_old
        }
    }

    fn committed(&self, tail_old: usize, index: usize, new_bits: u64, new_tag: u64) -> bool {
        let (cur_bits, cur_tag) = self.slots[index].load_raw(Ordering::Acquire);
        if cur_bits != new_bits || cur_tag != new_tag {
            return true;
        }
        let (tail_current, _) = self.tail.load_raw(Ordering::Acquire);
        let (head_current, head_tag) = self.head.load_raw(Ordering::Acquire);
        if self.in_valid_region(tail_old, tail_current as usize, head_current as usize) {
            true
        } else if self.not_in_valid_region(tail_old, tail_current as usize, head_current as usize) {
            !self.slots[index].compare_and_swap_raw(new_bits, new_tag, T::EMPTY.to_bits())
        } else {
            let advanced = self.head.compare_and_swap_raw(
                head_current,
                head_tag,
                (head_current as usize + self.k) as u64 % self.queue_size as u64,
            );
            if advanced {
                true
            } else {
                !self.slots[index].compare_and_swap_raw(new_bits, new_tag, T::EMPTY.to_bits())
            }
        }
    }
}

impl<T: Payload> Pool<T> for BoundedKFifo<T> {
    fn put(&self, item: T) -> bool {
        assert!(!item.is_empty(), "cannot enqueue the EMPTY sentinel value");
        let mut backoff = Backoff::new();
        loop {
            let (head_index, _) = self.head.load_raw(Ordering::Acquire);
            let (tail_index, tail_tag) = self.tail.load_raw(Ordering::Acquire);
            match self.find_index(tail_index as usize, true) {
                Some((index, old_bits, old_tag)) => {
                    let new_bits = item.to_bits();
                    let new_tag = old_tag.wrapping_add(1);
                    if self.slots[index].compare_and_swap_raw(old_bits, old_tag, new_bits)
                        && self.committed(tail_index as usize, index, new_bits, new_tag)
                    {
                        return true;
                    }
                }
                None => {
                    if self.queue_full(head_index as usize, tail_index as usize) {
                        return false;
                    }
                    self.tail.compare_and_swap_raw(
                        tail_index,
                        tail_tag,
                        (tail_index as usize + self.k) as u64 % self.queue_size as u64,
                    );
                }
            }
            backoff.spin();
        }
    }

    fn get(&self) -> Option<T> {
        let mut backoff = Backoff::new();
        loop {
            let (head_index, head_tag) = self.head.load_raw(Ordering::Acquire);
            let (tail_index, _) = self.tail.load_raw(Ordering::Acquire);
            match self.find_index(head_index as usize, false) {
                Some((index, old_bits, old_tag)) => {
                    if self.slots[index].compare_and_swap_raw(old_bits, old_tag, T::EMPTY.to_bits()) {
                        return Some(T::from_bits(old_bits));
                    }
                }
                None => {
                    if head_index == tail_index {
                        return None;
                    }
                    self.head.compare_and_swap_raw(
                        head_index,
                        head_tag,
                        (head_index as usize + self.k) as u64 % self.queue_size as u64,
                    );
                }
            }
            backoff.spin();
        }
    }

    fn empty(&self) -> bool {
        let (head_index, _) = self.head.load_raw(Ordering::Acquire);
        self.find_index(head_index as usize, false).is_none()
    }
}
