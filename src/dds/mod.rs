//! Distributed Data Structure: a set of independent backend shards fronted
//! by a pluggable load balancer, plus a dynamically-growing variant.

pub mod balancer;
mod dds;
mod dynamic;

pub use balancer::Balancer;
pub use dds::DistributedDataStructure;
pub use dynamic::DynamicDds;
