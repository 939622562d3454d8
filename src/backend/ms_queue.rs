//! A Michael-Scott queue adapted into a [`PartialPool`] shard.
//!
//! Node shape and enqueue/dequeue loop follow the teacher crate's
//! hazard-pointer-protected FIFO, but since this crate never reclaims node
//! memory within a run, the hazard-pointer guard machinery is dropped
//! entirely: a popped node is simply never freed, matching the rest of the
//! crate's arena-without-reclaim model.

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU64, Ordering};

use crate::backoff::Backoff;
use crate::payload::Payload;
use crate::pool::{PartialPool, Pool, State};

#[repr(C)]
struct MsNode<T> {
    next: AtomicPtr<MsNode<T>>,
    data: Option<T>,
}

pub struct MsQueue<T: Payload> {
    head: AtomicPtr<MsNode<T>>,
    tail: AtomicPtr<MsNode<T>>,
    puts: AtomicU64,
}

impl<T: Payload> Default for MsQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> MsQueue<T> {
    pub fn new() -> Self {
        let sentinel = Box::into_raw(Box::new(MsNode {
            next: AtomicPtr::new(ptr::null_mut()),
            data: None,
        }));
        MsQueue {
            head: AtomicPtr::new(sentinel),
            tail: AtomicPtr::new(sentinel),
            puts: AtomicU64::new(0),
        }
    }
}

impl<T: Payload> Pool<T> for MsQueue<T> {
    fn put(&self, item: T) -> bool {
        let node = Box::into_raw(Box::new(MsNode {
            next: AtomicPtr::new(ptr::null_mut()),
            data: Some(item),
        }));
        let mut backoff = Backoff::new();
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let next = unsafe { (*tail).next.load(Ordering::Acquire) };
            if tail == self.tail.load(Ordering::Acquire) {
                if next.is_null() {
                    if unsafe { &*tail }
                        .next
                        .compare_exchange(ptr::null_mut(), node, Ordering::Release, Ordering::Relaxed)
                        .is_ok()
                    {
                        let _ = self.tail.compare_exchange(
                            tail,
                            node,
                            Ordering::Release,
                            Ordering::Relaxed,
                        );
                        self.puts.fetch_add(1, Ordering::AcqRel);
                        return true;
                    }
                } else {
                    let _ = self.tail.compare_exchange(
                        tail,
                        next,
                        Ordering::Release,
                        Ordering::Relaxed,
                    );
                }
            }
            backoff.spin();
        }
    }

    fn get(&self) -> Option<T> {
        let mut backoff = Backoff::new();
        loop {
            let head = self.head.load(Ordering::Acquire);
            let tail = self.tail.load(Ordering::Acquire);
            let next = unsafe { (*head).next.load(Ordering::Acquire) };
            if head == self.head.load(Ordering::Acquire) {
                if head == tail {
                    if next.is_null() {
                        return None;
                    }
                    let _ = self.tail.compare_exchange(
                        tail,
                        next,
                        Ordering::Release,
                        Ordering::Relaxed,
                    );
                } else {
                    let data = unsafe { (*next).data };
                    if self
                        .head
                        .compare_exchange(head, next, Ordering::Release, Ordering::Relaxed)
                        .is_ok()
                    {
                        // The old head (dummy) node is never freed.
                        return data;
                    }
                }
            }
            backoff.spin();
        }
    }

    fn empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let next = unsafe { (*head).next.load(Ordering::Acquire) };
        next.is_null()
    }
}

impl<T: Payload> PartialPool<T> for MsQueue<T> {
    fn put_state(&self) -> State {
        self.puts.load(Ordering::Acquire)
    }

    fn get_return_put_state(&self, state: &mut State) -> Option<T> {
        let item = self.get();
        *state = self.put_state();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let q = MsQueue::<u64>::new();
        q.put(1);
        q.put(2);
        q.put(3);
        assert_eq!(q.get(), Some(1));
        assert_eq!(q.get(), Some(2));
        assert_eq!(q.get(), Some(3));
        assert_eq!(q.get(), None);
    }

    #[test]
    fn empty_tracks_state() {
        let q = MsQueue::<u64>::new();
        assert!(q.empty());
        q.put(1);
        assert!(!q.empty());
        q.get();
        assert!(q.empty());
    }
}
