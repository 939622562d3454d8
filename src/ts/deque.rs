//! A timestamped deque: on every `put` and `get`, a side (left/right) is
//! chosen at random; the left end removes the globally-oldest element like
//! [`super::queue::TsQueue`], the right end removes the globally-youngest
//! like [`super::stack::TsStack`]. The original provides no distinct
//! left/right insert (`insert_right` simply calls `insert_left`), so `put`
//! always appends to the calling producer's buffer regardless of which
//! side was chosen.

use super::clock::TimeSource;
use super::spbuffer::{EntryRing, RemoveAttempt};
use crate::payload::Payload;
use crate::pool::Pool;

pub struct TsDeque<T: Payload, C: TimeSource> {
    buffers: EntryRing<T>,
    clock: C,
}

impl<T: Payload, C: TimeSource> TsDeque<T, C> {
    pub fn new(num_producers: usize, clock: C) -> Self {
        TsDeque {
            buffers: EntryRing::new(num_producers),
            clock,
        }
    }

    fn producer_slot(&self) -> usize {
        crate::dds::balancer::thread_id() as usize
    }

    fn remove_end(&self, oldest: bool) -> Option<T> {
        loop {
            let start_time = self.clock.read_time();
            let n = self.buffers.len();
            let start = crate::rand::index(n, true);

            let mut best: Option<(usize, u64)> = None;
            for i in 0..n {
                let index = (start + i) % n;
                if let Some(ts) = self.buffers.get(index).oldest_timestamp() {
                    let better = match best {
                        None => true,
                        Some((_, best_ts)) => {
                            if oldest {
                                ts < best_ts
                            } else {
                                ts > best_ts
                            }
                        }
                    };
                    if better {
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

    pub fn insert_left(&self, item: T) -> bool {
        let timestamp = self.clock.get_timestamp();
        self.buffers.get(self.producer_slot()).insert(item, timestamp);
        true
    }

    pub fn insert_right(&self, item: T) -> bool {
        self.insert_left(item)
    }

    pub fn remove_left(&self) -> Option<T> {
        self.remove_end(true)
    }

    pub fn remove_right(&self) -> Option<T> {
        self.remove_end(false)
    }
}

impl<T: Payload, C: TimeSource> Pool<T> for TsDeque<T, C> {
    fn put(&self, item: T) -> bool {
        if crate::rand::hwrand() % 2 == 0 {
            self.insert_left(item)
        } else {
            self.insert_right(item)
        }
    }

    fn get(&self) -> Option<T> {
        if crate::rand::hwrand() % 2 == 0 {
            self.remove_left()
        } else {
            self.remove_right()
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
    fn left_end_is_fifo_ordered() {
        let d = TsDeque::<u64, _>::new(4, AtomicCounter::new());
        d.insert_left(1);
        d.insert_left(2);
        d.insert_left(3);
        assert_eq!(d.remove_left(), Some(1));
        assert_eq!(d.remove_left(), Some(2));
        assert_eq!(d.remove_left(), Some(3));
    }

    #[test]
    fn right_end_is_lifo_ordered() {
        let d = TsDeque::<u64, _>::new(4, AtomicCounter::new());
        d.insert_left(1);
        d.insert_left(2);
        d.insert_left(3);
        assert_eq!(d.remove_right(), Some(3));
        assert_eq!(d.remove_right(), Some(2));
        assert_eq!(d.remove_right(), Some(1));
    }

    #[test]
    fn empty_deque_returns_none() {
        let d = TsDeque::<u64, _>::new(2, AtomicCounter::new());
        assert!(d.empty());
        assert_eq!(d.remove_left(), None);
        assert_eq!(d.remove_right(), None);
    }
}
