//! The segment type backing [`super::unbounded::UnboundedKFifo`].
//!
//! A segment is a fixed-size ring of `k` tagged slots plus a link to the
//! next segment. Segments are allocated with `Box::into_raw` and never
//! freed: this crate's memory model treats allocation as effectively free
//! within the lifetime of a run (see the crate-level documentation), which
//! sidesteps the hazard-pointer/epoch machinery a reclaiming implementation
//! would otherwise need around `next`.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::payload::Payload;
use crate::tagged::{PackedWord, TaggedPtr};

#[repr(align(8))]
pub struct KSegment<T: Payload> {
    pub next: TaggedPtr<KSegment<T>>,
    pub k: usize,
    pub deleted: AtomicBool,
    pub items: Vec<PackedWord>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Payload> KSegment<T> {
    /// Allocates a fresh, all-empty segment of `k` slots and leaks it,
    /// returning the raw pointer every caller threads through tagged CAS
    /// loops.
    pub fn new_leaked(k: usize) -> *mut KSegment<T> {
        let items = (0..k).map(|_| PackedWord::new(T::EMPTY.to_bits())).collect();
        let segment = KSegment {
            next: TaggedPtr::new(std::ptr::null_mut()),
            k,
            deleted: AtomicBool::new(false),
            items,
            _marker: std::marker::PhantomData,
        };
        Box::into_raw(Box::new(segment))
    }

    /// Scans the segment starting from a random slot, looking for either an
    /// empty slot (`want_empty = true`, used by `enqueue`) or a populated
    /// one (`want_empty = false`, used by `dequeue`). Returns the slot index
    /// and its last-observed `(value, tag)` pair.
    pub fn find_index(&self, want_empty: bool) -> Option<(usize, u64, u64)> {
        let start = crate::rand::index(self.k, false);
        for i in 0..self.k {
            let index = (start + i) % self.k;
            let (bits, tag) = self.items[index].load_raw(Ordering::Acquire);
            let is_empty = T::from_bits(bits).is_empty();
            if is_empty == want_empty {
                return Some((index, bits, tag));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_segment_is_all_empty() {
        let ptr = KSegment::<u64>::new_leaked(4);
        let seg = unsafe { &*ptr };
        assert_eq!(seg.find_index(false), None);
        assert!(seg.find_index(true).is_some());
    }
}
