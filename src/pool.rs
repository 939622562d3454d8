//! The `Pool` and `PartialPool` contracts shared by every container in this
//! crate.
//!
//! `Pool` is the surface a benchmark driver (or, here, a test) sees: put,
//! get, and a couple of optional capabilities. `PartialPool` is the stricter
//! contract a backend must satisfy to be usable as one of the `P` shards
//! inside a [`crate::dds::DistributedDataStructure`] — it adds the state
//! token the linearizable emptiness check relies on.

use crate::payload::Payload;

/// An opaque token that changes exactly when a successful `put` occurs on
/// the pool that issued it. Two states compare equal iff no put happened on
/// that pool between the calls that produced them.
pub type State = u64;

/// The surface exported to benchmarks and tests: put an item, get an item,
/// and a handful of optional capabilities most containers don't need.
pub trait Pool<T: Payload> {
    /// Inserts `item`. Returns `false` only for bounded containers that are
    /// full; unbounded containers always return `true`.
    fn put(&self, item: T) -> bool;

    /// Removes and returns an item, or `None` if the pool is empty.
    fn get(&self) -> Option<T>;

    /// A best-effort emptiness check. Not linearizable by itself; see
    /// `DistributedDataStructure::empty` for the linearizable version used
    /// by the DDS.
    fn empty(&self) -> bool {
        false
    }

    /// Releases any resources a backend batches for the lifetime of a run
    /// (thread-local arenas, registered producer slots). Most backends have
    /// nothing to do here since this crate's memory model never reclaims
    /// individual nodes.
    fn terminate(&self) {}
}

/// The contract a backend must satisfy to be embedded as a shard inside a
/// [`crate::dds::DistributedDataStructure`].
///
/// Beyond `Pool`, a partial pool must expose a state token that advances on
/// every successful put, and a combined get-and-observe-state operation so
/// the DDS's two-phase emptiness check can tell whether a pool changed
/// between two observations without racing a separate `get`/`put_state`
/// pair.
pub trait PartialPool<T: Payload>: Pool<T> {
    /// The pool's current put-state. Two reads with no intervening put
    /// return equal values.
    fn put_state(&self) -> State;

    /// Attempts to remove an item, also reporting the put-state observed at
    /// the moment of the attempt. Returns `true` iff an item was removed;
    /// `state` is always set to a valid observation either way.
    fn get_return_put_state(&self, state: &mut State) -> Option<T>;

    /// An approximate element count, for diagnostics only. Backends that
    /// can't answer cheaply return `None`.
    fn approx_size(&self) -> Option<usize> {
        None
    }
}
