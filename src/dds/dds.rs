//! The Distributed Data Structure: a fixed array of `P` shards fronted by a
//! [`Balancer`], with a linearizable emptiness check layered on top of the
//! shards' individual best-effort `get`.

use crate::payload::Payload;
use crate::pool::{PartialPool, Pool, State};

use super::balancer::Balancer;

/// A sharded pool. `put` and `get` delegate to one shard chosen by the
/// balancer; `empty` runs the two-phase check described on [`Self::empty`].
pub struct DistributedDataStructure<T: Payload, P: PartialPool<T>> {
    backends: Vec<P>,
    balancer: Box<dyn Balancer>,
    linearizable_empty: bool,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Payload, P: PartialPool<T>> DistributedDataStructure<T, P> {
    /// `linearizable_empty` selects between the full two-phase emptiness
    /// check (`true`, the default the original ships) and a single round
    /// that reports `empty` as soon as one pass finds nothing (`false`,
    /// standing in for the original's `NON_LINEARIZABLE_EMPTY` compile-time
    /// variant as a runtime flag instead, since both must be reachable in
    /// the same binary for the test suite to exercise each).
    pub fn new(backends: Vec<P>, balancer: Box<dyn Balancer>, linearizable_empty: bool) -> Self {
        assert!(!backends.is_empty(), "a DDS needs at least one partial pool");
        DistributedDataStructure {
            backends,
            balancer,
            linearizable_empty,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn num_pools(&self) -> usize {
        self.backends.len()
    }
}

impl<T: Payload, P: PartialPool<T>> Pool<T> for DistributedDataStructure<T, P> {
    fn put(&self, item: T) -> bool {
        let index = self.balancer.put_id(self.backends.len());
        self.backends[index].put(item)
    }

    /// Tries the balancer's local hint first, then a full round over every
    /// shard starting from `get_id`. If a full round finds nothing and
    /// `linearizable_empty` is set, re-checks each shard's `put_state`
    /// against the value recorded during the round: if any shard's state
    /// moved, a concurrent put may now be visible, so the search restarts
    /// from that shard. A round that completes with every state unchanged
    /// means all shards were observed simultaneously empty at those states
    /// and stayed that way through the recheck, which is a genuine
    /// linearization point.
    fn get(&self) -> Option<T> {
        let n = self.backends.len();

        if let Some(hint) = self.balancer.local_get_id(n) {
            if let Some(item) = self.backends[hint].get() {
                return Some(item);
            }
        }

        let mut start = self.balancer.get_id(n);
        let mut tails = vec![0 as State; n];

        loop {
            for i in 0..n {
                let index = (start + i) % n;
                let mut state = 0;
                if let Some(item) = self.backends[index].get_return_put_state(&mut state) {
                    return Some(item);
                }
                tails[index] = state;
            }

            if !self.linearizable_empty {
                return None;
            }

            let mut restarted = false;
            for i in 0..n {
                let index = (start + i) % n;
                if self.backends[index].put_state() != tails[index] {
                    start = index;
                    restarted = true;
                    break;
                }
                if (index + 1) % n == start {
                    return None;
                }
            }
            if !restarted {
                return None;
            }
        }
    }

    fn empty(&self) -> bool {
        self.backends.iter().all(|b| b.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MsQueue;
    use crate::dds::balancer::OneRandom;

    #[test]
    fn round_trips_across_shards() {
        let backends: Vec<MsQueue<u64>> = (0..4).map(|_| MsQueue::new()).collect();
        let dds = DistributedDataStructure::new(backends, Box::new(OneRandom::new(false)), true);
        for i in 1..=20u64 {
            assert!(dds.put(i));
        }
        let mut seen = Vec::new();
        while let Some(v) = dds.get() {
            seen.push(v);
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn reports_empty_after_full_drain() {
        let backends: Vec<MsQueue<u64>> = (0..3).map(|_| MsQueue::new()).collect();
        let dds = DistributedDataStructure::new(backends, Box::new(OneRandom::new(false)), true);
        assert!(dds.get().is_none());
        dds.put(1);
        assert!(dds.get().is_some());
        assert!(dds.get().is_none());
    }
}
