//! Time sources for the timestamped buffer family.
//!
//! Every element inserted into a TS buffer is stamped with a timestamp used
//! to order removal; the buffers are written against the [`TimeSource`]
//! trait so the strategy is swappable without touching buffer code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

pub trait TimeSource: Send + Sync {
    /// Advances and returns a fresh timestamp, to be stamped onto a newly
    /// inserted element.
    fn get_timestamp(&self) -> u64;

    /// Reads the current time without advancing it, for comparisons against
    /// already-stamped elements.
    fn read_time(&self) -> u64;
}

/// A per-producer logical clock: `get_timestamp` takes the maximum of every
/// producer's last-published time and republishes `max + 1` under its own
/// slot, requiring no cross-thread read-after-write or write-after-read
/// synchronization beyond the per-slot atomics themselves.
pub struct Stuttering {
    clocks: Vec<AtomicU64>,
}

impl Stuttering {
    pub fn new(num_producers: usize) -> Self {
        Stuttering {
            clocks: (0..num_producers.max(1)).map(|_| AtomicU64::new(1)).collect(),
        }
    }

    fn latest(&self) -> u64 {
        self.clocks.iter().map(|c| c.load(Ordering::Acquire)).max().unwrap_or(0)
    }
}

impl TimeSource for Stuttering {
    fn get_timestamp(&self) -> u64 {
        let thread_id = crate::dds::balancer::thread_id() as usize % self.clocks.len();
        let latest = self.latest();
        let next = latest + 1;
        self.clocks[thread_id].store(next, Ordering::Release);
        next
    }

    fn read_time(&self) -> u64 {
        self.latest()
    }
}

/// A single globally shared counter: simple and strictly monotonic, at the
/// cost of every producer contending on one cache line.
pub struct AtomicCounter {
    clock: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        AtomicCounter {
            clock: AtomicU64::new(1),
        }
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for AtomicCounter {
    fn get_timestamp(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::AcqRel)
    }

    fn read_time(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }
}

/// A wall-clock-cycle source, standing in for the original's `rdtsc()`
/// reading: no coordination at all, at the cost of clocks that can tie or
/// even appear to run backwards across cores under skew.
pub struct Hardware {
    epoch: Instant,
}

impl Hardware {
    pub fn new() -> Self {
        Hardware { epoch: Instant::now() }
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

impl Default for Hardware {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Hardware {
    fn get_timestamp(&self) -> u64 {
        self.now()
    }

    fn read_time(&self) -> u64 {
        self.now()
    }
}

/// Wraps any `TimeSource` to guarantee strictly increasing values even when
/// the underlying source can repeat (`Hardware` under heavy clock skew).
/// Not present in the original; added because `Stuttering`/`AtomicCounter`
/// already guarantee this and callers comparing timestamps for tie-breaking
/// should not have to special-case `Hardware`.
pub struct Monotonic<S> {
    inner: S,
    last: Mutex<u64>,
}

impl<S: TimeSource> Monotonic<S> {
    pub fn new(inner: S) -> Self {
        Monotonic { inner, last: Mutex::new(0) }
    }
}

impl<S: TimeSource> TimeSource for Monotonic<S> {
    fn get_timestamp(&self) -> u64 {
        let raw = self.inner.get_timestamp();
        let mut last = self.last.lock().unwrap();
        let next = raw.max(*last + 1);
        *last = next;
        next
    }

    fn read_time(&self) -> u64 {
        self.inner.read_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_counter_strictly_increases() {
        let c = AtomicCounter::new();
        let a = c.get_timestamp();
        let b = c.get_timestamp();
        assert!(b > a);
    }

    #[test]
    fn stuttering_single_producer_increases() {
        let c = Stuttering::new(1);
        let a = c.get_timestamp();
        let b = c.get_timestamp();
        assert!(b > a);
    }

    #[test]
    fn monotonic_wrapper_never_repeats() {
        let c = Monotonic::new(AtomicCounter::new());
        let mut prev = 0;
        for _ in 0..50 {
            let t = c.get_timestamp();
            assert!(t > prev);
            prev = t;
        }
    }
}
