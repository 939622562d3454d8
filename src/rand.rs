//! Per-thread pseudorandom and hardware-timestamp randomness.
//!
//! The k-FIFO's random slot selection, the TS buffer's random scan start, and
//! the 1-random/random-id balancers all need a cheap source of randomness
//! local to the calling thread. This mirrors the original `pseudorand`/
//! `hwrand` pair: a per-thread Lehmer (Park-Miller) generator seeded from the
//! thread's id, plus a hardware-counter-derived source for callers that ask
//! for `--hw_random`-style behavior.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

const PARK_MILLER_A: u64 = 16_807;
const PARK_MILLER_M: u64 = 2_147_483_647;
const PARK_MILLER_Q: u64 = 127_773;
const PARK_MILLER_R: u64 = 2_836;

thread_local! {
    static SEED: Cell<u64> = Cell::new(initial_seed());
}

fn initial_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1);
    // Thread::id() has no stable numeric value, so mix in the address of a
    // thread-local as a cheap per-thread distinguisher.
    let distinguisher = &nanos as *const u64 as u64;
    (nanos ^ distinguisher.rotate_left(17)) % PARK_MILLER_M | 1
}

/// A per-thread pseudorandom value (Lehmer/Park-Miller minimal standard
/// generator). Deterministic given a fixed initial seed, cheap, and free of
/// any cross-thread synchronization.
pub fn pseudorand() -> u64 {
    SEED.with(|seed| {
        let s = seed.get();
        let hi = s / PARK_MILLER_Q;
        let lo = s % PARK_MILLER_Q;
        let test = PARK_MILLER_A
            .wrapping_mul(lo)
            .wrapping_sub(PARK_MILLER_R.wrapping_mul(hi));
        let next = if test > 0 { test } else { test.wrapping_add(PARK_MILLER_M) };
        seed.set(next);
        next
    })
}

/// A hardware-timestamp-derived random value, standing in for the original's
/// `rdtsc() >> 6`. Uses the monotonic clock rather than inline assembly so
/// the same source compiles on every target scal runs on.
pub fn hwrand() -> u64 {
    use std::time::Instant;
    thread_local! {
        static EPOCH: Instant = Instant::now();
    }
    EPOCH.with(|epoch| epoch.elapsed().as_nanos() as u64 >> 6)
}

/// Returns a uniformly-distributed index in `[0, bound)`, using the hardware
/// or pseudorandom source depending on `use_hw_random`.
pub fn index(bound: usize, use_hw_random: bool) -> usize {
    if bound <= 1 {
        return 0;
    }
    let r = if use_hw_random { hwrand() } else { pseudorand() };
    (r % bound as u64) as usize
}
