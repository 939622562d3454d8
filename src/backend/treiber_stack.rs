//! A Treiber stack adapted into a [`PartialPool`] shard.
//!
//! The push/pop core is the teacher crate's lock-free stack, generalized
//! from a raw `*mut StackEntry<T>` API to the `Payload`-typed `Pool`
//! contract, with a `put_state` counter layered on top so the stack can sit
//! behind a [`crate::dds::DistributedDataStructure`].

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU64, Ordering};

use crate::backoff::Backoff;
use crate::payload::Payload;
use crate::pool::{PartialPool, Pool, State};

#[repr(C)]
struct StackEntry<T> {
    next: AtomicPtr<StackEntry<T>>,
    data: T,
}

pub struct TreiberStack<T: Payload> {
    head: AtomicPtr<StackEntry<T>>,
    puts: AtomicU64,
}

impl<T: Payload> Default for TreiberStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> TreiberStack<T> {
    pub fn new() -> Self {
        TreiberStack {
            head: AtomicPtr::new(ptr::null_mut()),
            puts: AtomicU64::new(0),
        }
    }
}

impl<T: Payload> Pool<T> for TreiberStack<T> {
    fn put(&self, item: T) -> bool {
        let entry = Box::into_raw(Box::new(StackEntry {
            next: AtomicPtr::new(ptr::null_mut()),
            data: item,
        }));
        let mut backoff = Backoff::new();
        loop {
            let head = self.head.load(Ordering::Relaxed);
            unsafe { (*entry).next.store(head, Ordering::Relaxed) };
            if self
                .head
                .compare_exchange_weak(head, entry, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                self.puts.fetch_add(1, Ordering::AcqRel);
                return true;
            }
            backoff.spin();
        }
    }

    fn get(&self) -> Option<T> {
        let mut backoff = Backoff::new();
        loop {
            let head = self.head.load(Ordering::Acquire);
            if head.is_null() {
                return None;
            }
            let next = unsafe { (*head).next.load(Ordering::Relaxed) };
            if self
                .head
                .compare_exchange_weak(head, next, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                // Popped nodes are never freed; see the crate's memory model notes.
                let data = unsafe { (*head).data };
                return Some(data);
            }
            backoff.spin();
        }
    }

    fn empty(&self) -> bool {
        self.head.load(Ordering::Acquire).is_null()
    }
}

impl<T: Payload> PartialPool<T> for TreiberStack<T> {
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
    fn lifo_order() {
        let s = TreiberStack::<u64>::new();
        s.put(1);
        s.put(2);
        s.put(3);
        assert_eq!(s.get(), Some(3));
        assert_eq!(s.get(), Some(2));
        assert_eq!(s.get(), Some(1));
        assert_eq!(s.get(), None);
    }

    #[test]
    fn put_state_advances_only_on_put() {
        let s = TreiberStack::<u64>::new();
        let before = s.put_state();
        s.put(1);
        assert_ne!(before, s.put_state());
        let after_put = s.put_state();
        s.get();
        assert_eq!(after_put, s.put_state());
    }
}
