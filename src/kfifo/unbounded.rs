//! An unbounded k-FIFO queue: a linked list of [`KSegment`]s, each a
//! `k`-wide ring of randomly-probed slots.
//!
//! Strict FIFO order is relaxed within a segment's `k` slots in exchange for
//! letting `k` independent producers/consumers make progress without
//! contending on a single head/tail pointer, per Kirsch, Lippautz, and
//! Payer's k-FIFO construction. New segments are appended as the tail fills
//! and old ones unlinked (never freed) as the head drains past them.

use std::sync::atomic::Ordering;

use super::segment::KSegment;
use crate::backoff::Backoff;
use crate::payload::Payload;
use crate::pool::Pool;

pub struct UnboundedKFifo<T: Payload> {
    head: crate::tagged::TaggedPtr<KSegment<T>>,
    tail: crate::tagged::TaggedPtr<KSegment<T>>,
    k: usize,
}

impl<T: Payload> UnboundedKFifo<T> {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k-FIFO segment width must be at least 1");
        let seg = KSegment::<T>::new_leaked(k);
        UnboundedKFifo {
            head: crate::tagged::TaggedPtr::new(seg),
            tail: crate::tagged::TaggedPtr::new(seg),
            k,
        }
    }

    fn advance_head(&self, head_old: *mut KSegment<T>, head_tag: usize) {
        let (head_current, head_current_tag) = self.head.load(Ordering::Acquire);
        if head_current != head_old {
            return;
        }
        let (tail_current, _) = self.tail.load(Ordering::Acquire);
        let head_seg = unsafe { &*head_current };
        let (head_next, _) = head_seg.next.load(Ordering::Acquire);
        if head_current == head_old {
            if head_current == tail_current {
                let tail_seg = unsafe { &*tail_current };
                let (tail_next, tail_next_tag) = tail_seg.next.load(Ordering::Acquire);
                if tail_next.is_null() {
                    return;
                }
                let (tail_now, tail_now_tag) = self.tail.load(Ordering::Acquire);
                if tail_now == tail_current {
                    let _ = tail_next_tag;
                    self.tail.compare_and_swap(tail_current, tail_now_tag, tail_next);
                }
            }
            head_seg.deleted.store(true, Ordering::Release);
            self.head.compare_and_swap(head_old, head_current_tag, head_next);
        }
        let _ = head_tag;
    }

    fn advance_tail(&self, tail_old: *mut KSegment<T>, tail_tag: usize) {
        let (tail_current, tail_current_tag) = self.tail.load(Ordering::Acquire);
        if tail_current != tail_old {
            return;
        }
        let tail_seg = unsafe { &*tail_old };
        let (next, _next_tag) = tail_seg.next.load(Ordering::Acquire);
        let (tail_now, _) = self.tail.load(Ordering::Acquire);
        if tail_now != tail_old {
            return;
        }
        if !next.is_null() {
            self.tail.compare_and_swap(tail_old, tail_current_tag, next);
        } else {
            let new_seg = KSegment::<T>::new_leaked(self.k);
            if tail_seg.next.compare_and_swap(std::ptr::null_mut(), 0, new_seg) {
                self.tail.compare_and_swap(tail_old, tail_current_tag, new_seg);
            } else {
                // Someone else linked a segment; leak ours, it was never observable.
            }
        }
        let _ = tail_tag;
    }

    fn committed(&self, tail_old: *mut KSegment<T>, item_index: usize, new_bits: u64, new_tag: u64) -> bool {
        let tail_seg = unsafe { &*tail_old };
        let (cur_bits, cur_tag) = tail_seg.items[item_index].load_raw(Ordering::Acquire);
        if cur_bits != new_bits || cur_tag != new_tag {
            return true;
        }
        let (head_current, _) = self.head.load(Ordering::Acquire);
        if tail_seg.deleted.load(Ordering::Acquire) {
            return !tail_seg.items[item_index].compare_and_swap_raw(new_bits, new_tag, T::EMPTY.to_bits());
        }
        if tail_old == head_current {
            let (_, head_current_tag) = self.head.load(Ordering::Acquire);
            if self.head.compare_and_swap(head_current, head_current_tag, head_current) {
                return true;
            }
            return !tail_seg.items[item_index].compare_and_swap_raw(new_bits, new_tag, T::EMPTY.to_bits());
        }
        true
    }
}

impl<T: Payload> Pool<T> for UnboundedKFifo<T> {
    fn put(&self, item: T) -> bool {
        assert!(!item.is_empty(), "cannot enqueue the EMPTY sentinel value");
        let mut backoff = Backoff::new();
        loop {
            let (tail_old, tail_tag) = self.tail.load(Ordering::Acquire);
            let tail_seg = unsafe { &*tail_old };
            if let Some((index, old_bits, old_tag)) = tail_seg.find_index(true) {
                let (tail_now, _) = self.tail.load(Ordering::Acquire);
                if tail_now != tail_old {
                    backoff.spin();
                    continue;
                }
                let new_bits = item.to_bits();
                let new_tag = old_tag.wrapping_add(1);
                if tail_seg.items[index].compare_and_swap_raw(old_bits, old_tag, new_bits) {
                    if self.committed(tail_old, index, new_bits, new_tag) {
                        return true;
                    }
                }
            } else {
                self.advance_tail(tail_old, tail_tag);
            }
            backoff.spin();
        }
    }

    fn get(&self) -> Option<T> {
        let mut backoff = Backoff::new();
        loop {
            let (head_old, head_tag) = self.head.load(Ordering::Acquire);
            let head_seg = unsafe { &*head_old };
            let found = head_seg.find_index(false);
            let (tail_old, _) = self.tail.load(Ordering::Acquire);
            let (head_check, _) = self.head.load(Ordering::Acquire);
            if head_check != head_old {
                continue;
            }
            if let Some((index, old_bits, old_tag)) = found {
                if head_old == tail_old {
                    self.advance_tail(tail_old, 0);
                }
                if head_seg.items[index].compare_and_swap_raw(old_bits, old_tag, T::EMPTY.to_bits()) {
                    return Some(T::from_bits(old_bits));
                }
            } else {
                if head_old == tail_old {
                    return None;
                }
                self.advance_head(head_old, head_tag);
            }
            backoff.spin();
        }
    }

    fn empty(&self) -> bool {
        let (head, _) = self.head.load(Ordering::Acquire);
        let (tail, _) = self.tail.load(Ordering::Acquire);
        if head != tail {
            return false;
        }
        let seg = unsafe { &*head };
        seg.find_index(false).is_none()
    }
}
