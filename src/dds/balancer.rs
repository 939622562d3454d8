//! Load balancers: the strategies a [`super::dds::DistributedDataStructure`]
//! uses to pick which shard a `put` or `get` lands on.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// The calling thread's small dense id, assigned on first use. Several
/// balancers key their state off this rather than the OS thread handle.
pub fn thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// The strategy that maps a `put`/`get` call to one of `num_pools` shard
/// indices.
pub trait Balancer: Send + Sync {
    fn put_id(&self, num_pools: usize) -> usize;
    fn get_id(&self, num_pools: usize) -> usize;

    /// An optional fast-path hint tried before `get_id`'s full round, e.g.
    /// "the shard this thread last put to". Balancers that have no natural
    /// affinity return `None`.
    fn local_get_id(&self, _num_pools: usize) -> Option<usize> {
        None
    }
}

/// Picks a uniformly random shard on every call.
pub struct OneRandom {
    use_hw_random: bool,
}

impl OneRandom {
    pub fn new(use_hw_random: bool) -> Self {
        OneRandom { use_hw_random }
    }
}

impl Balancer for OneRandom {
    fn put_id(&self, num_pools: usize) -> usize {
        crate::rand::index(num_pools, self.use_hw_random)
    }

    fn get_id(&self, num_pools: usize) -> usize {
        crate::rand::index(num_pools, self.use_hw_random)
    }
}

/// Gives each thread a fixed, pre-shuffled shard for `put`, so a thread's
/// own puts and gets stay locally ordered even though there is no global
/// order across threads; `get` still samples randomly.
pub struct LocalLinearizability {
    distribution: Vec<usize>,
}

impl LocalLinearizability {
    pub fn new(size: usize, seed: u64) -> Self {
        let mut distribution: Vec<usize> = (0..size).collect();
        // Fisher-Yates shuffle driven by a fixed seed so the same
        // construction arguments always produce the same thread-to-shard
        // assignment.
        let mut state = seed.max(1);
        for i in (1..size).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state as usize) % (i + 1);
            distribution.swap(i, j);
        }
        LocalLinearizability { distribution }
    }
}

impl Balancer for LocalLinearizability {
    fn put_id(&self, num_pools: usize) -> usize {
        if num_pools == 1 {
            return 0;
        }
        let size = self.distribution.len();
        self.distribution[(thread_id() as usize) % size] % num_pools
    }

    fn get_id(&self, num_pools: usize) -> usize {
        if num_pools == 1 {
            return 0;
        }
        (crate::rand::hwrand() as usize) % num_pools
    }
}

/// Splits threads into `partitions` groups, each round-robining over its own
/// slice of shards independently of the other groups.
pub struct PartitionedRoundRobin {
    partitions: usize,
    num_pools: usize,
    enqueue_cursors: Vec<AtomicU64>,
    dequeue_cursors: Vec<AtomicU64>,
}

impl PartitionedRoundRobin {
    pub fn new(partitions: usize, num_pools: usize) -> Self {
        let per_partition = (num_pools / partitions) as u64;
        let enqueue_cursors = (0..partitions).map(|i| AtomicU64::new(per_partition * i as u64)).collect();
        let dequeue_cursors = (0..partitions).map(|i| AtomicU64::new(per_partition * i as u64)).collect();
        PartitionedRoundRobin {
            partitions,
            num_pools,
            enqueue_cursors,
            dequeue_cursors,
        }
    }
}

impl Balancer for PartitionedRoundRobin {
    fn put_id(&self, num_pools: usize) -> usize {
        debug_assert_eq!(num_pools, self.num_pools);
        let p = (thread_id() as usize) % self.partitions;
        (self.enqueue_cursors[p].fetch_add(1, Ordering::Relaxed) as usize) % num_pools
    }

    fn get_id(&self, num_pools: usize) -> usize {
        debug_assert_eq!(num_pools, self.num_pools);
        let p = (thread_id() as usize) % self.partitions;
        (self.dequeue_cursors[p].fetch_add(1, Ordering::Relaxed) as usize) % num_pools
    }
}

/// Routes every call from a thread to the shard matching its id, so thread
/// `t`'s puts and gets both land on shard `t % num_pools`.
pub struct IdBased;

impl Balancer for IdBased {
    fn put_id(&self, num_pools: usize) -> usize {
        if num_pools == 1 {
            return 0;
        }
        (thread_id() as usize) % num_pools
    }

    fn get_id(&self, num_pools: usize) -> usize {
        if num_pools == 1 {
            return 0;
        }
        (thread_id() as usize) % num_pools
    }

    fn local_get_id(&self, num_pools: usize) -> Option<usize> {
        Some(self.get_id(num_pools))
    }
}

/// Puts route by thread id like [`IdBased`]; gets sample randomly instead,
/// trading the put-side locality for fewer empty shard probes on the get
/// side.
pub struct RandomId {
    use_hw_random: bool,
}

impl RandomId {
    pub fn new(use_hw_random: bool) -> Self {
        RandomId { use_hw_random }
    }
}

impl Balancer for RandomId {
    fn put_id(&self, num_pools: usize) -> usize {
        if num_pools == 1 {
            return 0;
        }
        (thread_id() as usize) % num_pools
    }

    fn get_id(&self, num_pools: usize) -> usize {
        crate::rand::index(num_pools, self.use_hw_random)
    }
}
