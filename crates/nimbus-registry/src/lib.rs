//! Nimbus registry
//!
//! Two independent concurrent stores: infrastructures keyed by id, and
//! instances keyed by (infrastructure id, instance id). Both follow the same
//! copy-on-write discipline: the store holds one atomic reference to an
//! immutable snapshot map, readers take the reference once and work on a
//! self-consistent view, and every write builds a new map and swaps it in
//! through a compare-and-swap retry loop. Reads never block; concurrent
//! writes serialize only against each other at the pointer swap.
//!
//! The registry is memory-resident bookkeeping. It never calls providers,
//! never raises domain errors (absence is `None`), and is rebuilt empty on
//! process start.

pub mod infrastructures;
pub mod instances;

// Re-exports
pub use infrastructures::InfrastructureStore;
pub use instances::InstanceStore;
