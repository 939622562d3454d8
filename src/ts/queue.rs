//! A timestamped queue: FIFO-ish removal ordered by insertion timestamp
//! rather than by a single shared head/tail pointer, so producers never
//! contend with each other on insert.

use super::clock::TimeSource;
use super::spbuffer::{EntryRing, RemoveAttempt};
use crate::payload::Payload;
use crate::pool::Pool;

pub struct TsQueue<T: Payload, C: TimeSource> {
    buffers: EntryRing<T>,
    clock: C,
}

impl<T: Payload, C: TimeSource> TsQueue<T, C> {
    pub fn new(num_producers: usize, clock: C) -> Self {
        TsQueue {
            buffers: EntryRing::new(num_producers),
            clock,
        }
    }

    fn producer_slot(&self) -> usize {
        crate::dds::balancer::thread_id() as usize
    }
}

impl<T: Payload, C: TimeSource> Pool<T> for TsQueue<T, C> {
    fn put(&self, item: T) -> bool {
        let timestamp = self.clock.get_timestamp();
        self.buffers.get(self.producer_slot()).insert(item, timestamp);
        true
    }

    /// Scans every producer's buffer starting from a random offset, tracks
    /// the globally-oldest element seen (ties broken by scan order), and
    /// removes only elements timestamped no later than the scan's start
    /// time, so a producer's concurrent insert cannot be removed before an
    /// insert that logically preceded it from the remover's perspective.
    fn get(&self) -> Option<T> {
        loop {
            let start_time = self.clock.read_time();
            let n = self.buffers.len();
            let start = crate::rand::index(n, true);

            let mut best: Option<(usize, u64)> = None;

            for i in 0..n {
                let index = (start + i) % n;
                if let Some(ts) = self.buffers.get(index).oldest_timestamp() {
                    if best.map(|(_, best_ts)| ts < best_ts).unwrap_or(true) {
                        best = Some((index, ts));
                    }
                }
            }

            let (index, _) = match best {
                Some(b) => b,
                None => return None,
            };

            match self.buffers.get(index).take_oldest_if(start_time) {
                RemoveAttempt::Removed(value) => return Some(value),
                RemoveAttempt::Contended | RemoveAttempt::TooYoung | RemoveAttempt::Empty => continue,
            }
        }
    }

    fn empty(&self) -> bool {
        self.buffers.iter().all(|b| b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::clock::AtomicCounter;

    #[test]
    fn single_producer_preserves_order() {
        let q = TsQueue::<u64, _>::new(4, AtomicCounter::new());
        for i in 1..=5u64 {
            q.put(i);
        }
        let mut seen = Vec::new();
        while let Some(v) = q.get() {
            seen.push(v);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_queue_returns_none() {
        let q = TsQueue::<u64, _>::new(2, AtomicCounter::new());
        assert!(q.empty());
        assert_eq!(q.get(), None);
    }
}
