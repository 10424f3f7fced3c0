//! Nimbus domain model
//!
//! Value types shared by the registry, the provider abstraction and the
//! orchestration services. Records arrive fully deserialized from the REST
//! layer; nothing in this crate performs I/O or validation beyond shape.

pub mod model;

pub use model::*;
