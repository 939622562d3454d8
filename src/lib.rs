//! # scal
//!
//! A research workbench of concurrent "pool" data structures — multi-producer,
//! multi-consumer containers that relax strict FIFO/LIFO order in exchange for
//! scalability — together with a quantitative analyzer that scores how far a
//! recorded execution log deviates from a sequentially consistent order.
//!
//! ## Module organization
//!
//! ### Foundation
//! - [`pr`] - Atomic primitives and memory barriers
//! - [`backoff`] - Exponential backoff for contention management
//! - [`spinlock`] - Spinlocks used by the small number of non-lock-free paths
//! - [`rand`] - Per-thread pseudorandom and hardware-timestamp randomness
//! - [`tagged`] - Tagged-pointer / tagged-word CAS primitive (ABA defense)
//! - [`payload`] - The `Payload` trait pool elements must implement
//! - [`pool`] - The `Pool` / `PartialPool` contracts
//!
//! ### Pools
//! - [`kfifo`] - Bounded and unbounded k-FIFO queues
//! - [`dds`] - Distributed Data Structure: sharding + load balancers
//! - [`ts`] - Timestamped buffer family (queue, stack, deque)
//! - [`backend`] - Sequential-ish backends pluggable into a DDS
//!
//! ### Analysis
//! - [`logger`] - Records invocation/response/linearization timestamps
//! - [`analyzer`] - Post-mortem semantic-error analyzer

#![warn(rust_2018_idioms)]
#![allow(clippy::module_inception)]

pub mod pr;

pub mod backoff;
pub mod spinlock;

pub mod rand;

pub mod tagged;

pub mod payload;
pub mod pool;

pub mod kfifo;

pub mod backend;
pub mod dds;

pub mod ts;

pub mod logger;

pub mod analyzer;

pub use payload::Payload;
pub use pool::{PartialPool, Pool, State};
