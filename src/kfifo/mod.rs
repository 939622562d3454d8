//! Bounded and unbounded k-FIFO queues (Kirsch, Lippautz, Payer).
//!
//! Both variants relax strict FIFO order within a width-`k` window of slots
//! in exchange for letting up to `k` concurrent producers and consumers
//! avoid contending on a single head/tail pointer.

mod bounded;
mod segment;
mod unbounded;

pub use bounded::BoundedKFifo;
pub use unbounded::UnboundedKFifo;
