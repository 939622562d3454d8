//! A DDS variant that grows its shard set as new producer threads show up,
//! rather than being constructed with a fixed shard count.
//!
//! A thread registers a fresh partial pool on its first `put`; `retire`
//! unlinks a thread's pool once it has been observed empty. Both structural
//! changes take the crate's `FasLock` spinlock; steady-state `put`/`get`
//! also take it here (a simplification over the original's design, which
//! only locks during registration/retirement and otherwise dereferences the
//! backend array directly — see this crate's design notes for why that
//! finer-grained scheme was not ported verbatim). A generation counter,
//! bumped on every structural change, lets `get` notice a concurrent
//! registration mid-scan and retry against the fresh set instead of
//! finishing against a stale one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::payload::Payload;
use crate::pool::Pool;
use crate::spinlock::FasLock;

thread_local! {
    static REGISTERED: RefCell<HashMap<usize, usize>> = RefCell::new(HashMap::new());
}

pub struct DynamicDds<T: Payload, P: Pool<T> + Default> {
    slots: FasLock<Vec<Option<Box<P>>>>,
    generation: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T: Payload, P: Pool<T> + Default> Default for DynamicDds<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload, P: Pool<T> + Default> DynamicDds<T, P> {
    pub fn new() -> Self {
        DynamicDds {
            slots: FasLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    fn key(&self) -> usize {
        self as *const _ as usize
    }

    fn my_slot(&self) -> usize {
        if let Some(index) = REGISTERED.with(|r| r.borrow().get(&self.key()).copied()) {
            return index;
        }
        let index = {
            let mut guard = self.slots.lock();
            guard.push(Some(Box::new(P::default())));
            guard.len() - 1
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        REGISTERED.with(|r| r.borrow_mut().insert(self.key(), index));
        index
    }

    /// Unlinks this thread's slot if, and only if, its pool is currently
    /// empty. A pool that still holds items is left registered so those
    /// items remain reachable; call after draining if a hard retire is
    /// needed.
    pub fn retire(&self) {
        let index = match REGISTERED.with(|r| r.borrow_mut().remove(&self.key())) {
            Some(index) => index,
            None => return,
        };
        let mut guard = self.slots.lock();
        let should_clear = matches!(guard.get(index), Some(Some(slot)) if slot.empty());
        if should_clear {
            guard[index] = None;
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn num_registered(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_some()).count()
    }
}

impl<T: Payload, P: Pool<T> + Default> Pool<T> for DynamicDds<T, P> {
    fn put(&self, item: T) -> bool {
        let index = self.my_slot();
        let guard = self.slots.lock();
        guard[index].as_ref().expect("own slot retired concurrently").put(item)
    }

    fn get(&self) -> Option<T> {
        loop {
            let generation_before = self.generation.load(Ordering::Acquire);
            let item = {
                let guard = self.slots.lock();
                let n = guard.len();
                if n == 0 {
                    return None;
                }
                let start = crate::rand::index(n, false);
                (0..n).find_map(|i| {
                    let idx = (start + i) % n;
                    guard[idx].as_ref().and_then(|pool| pool.get())
                })
            };
            if item.is_some() {
                return item;
            }
            if self.generation.load(Ordering::Acquire) == generation_before {
                return None;
            }
            // The registered set changed mid-scan; retry against it.
        }
    }

    fn empty(&self) -> bool {
        self.slots.lock().iter().flatten().all(|p| p.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MsQueue;

    #[test]
    fn registers_on_first_put() {
        let dds = DynamicDds::<u64, MsQueue<u64>>::new();
        assert_eq!(dds.num_registered(), 0);
        dds.put(1);
        assert_eq!(dds.num_registered(), 1);
    }

    #[test]
    fn retire_clears_empty_slot_only() {
        let dds = DynamicDds::<u64, MsQueue<u64>>::new();
        dds.put(1);
        dds.retire();
        assert_eq!(dds.num_registered(), 1, "non-empty slot must survive retire");
        assert_eq!(dds.get(), Some(1));
    }

    #[test]
    fn round_trip() {
        let dds = DynamicDds::<u64, MsQueue<u64>>::new();
        for i in 1..=5u64 {
            dds.put(i);
        }
        let mut seen = Vec::new();
        while let Some(v) = dds.get() {
            seen.push(v);
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=5).collect::<Vec<_>>());
    }
}
