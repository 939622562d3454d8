//! A timestamped stack: per-producer buffers in the same spirit as
//! [`super::queue`], but each producer prepends at a `head` pointer instead
//! of appending at a tail, and `get` prefers the *youngest* unremoved
//! element instead of the oldest, giving LIFO-ish removal order without
//! producers contending on a shared top pointer.

use super::clock::TimeSource;
use super::spbuffer::{RemoveAttempt, StackEntryRing};
use crate::payload::Payload;
use crate::pool::Pool;

pub struct TsStack<T: Payload, C: TimeSource> {
    buffers: StackEntryRing<T>,
    clock: C,
}

impl<T: Payload, C: TimeSource> TsStack<T, C> {
    pub fn new(num_producers: usize, clock: C) -> Self {
        TsStack {
            buffers: StackEntryRing::new(num_producers),
            clock,
        }
    }

    fn producer_slot(&self) -> usize {
        crate::dds::balancer::thread_id() as usize
    }
}

impl<T: Payload, C: TimeSource> Pool<T> for TsStack<T, C> {
    fn put(&self, item: T) -> bool {
        let timestamp = self.clock.get_timestamp();
        self.buffers.get(self.producer_slot()).insert(item, timestamp);
        true
    }

    fn get(&self) -> Option<T> {
        loop {
            let start_time = self.clock.read_time();
            let n = self.buffers.len();
            let start = crate::rand::index(n, true);

            let mut best: Option<(usize, u64)> = None;

            for i in 0..n {
                let index = (start + i) % n;
                if let Some(ts) = self.buffers.get(index).youngest_timestamp() {
                    if best.map(|(_, best_ts)| ts > best_ts).unwrap_or(true) {
                        best = Some((index, ts));
                    }
                }
            }

            let (index, _) = match best {
                Some(b) => b,
                None => return None,
            };

            match self.buffers.get(index).take_youngest_if(start_time) {
                RemoveAttempt::Removed(value) => return Some(value),
                RemoveAttempt::Contended | RemoveAttempt::TooYoung | RemoveAttempt::Empty => continue,
            }
        }
    }

    fn empty(&self) -> bool {
        self.buffers.iter().all(|b| b.is_empty())
    }
}
