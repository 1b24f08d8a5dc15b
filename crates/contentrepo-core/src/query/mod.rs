//! Query compiler.
//!
//! normalize → build → optimize → render. Every stage is pure; a compile call
//! owns all of its intermediate state.

pub(crate) mod compile;
mod compiled;
mod fingerprint;
mod optimize;
mod predicate;
mod projection;
mod render;


pub use compile::compile;
pub use compiled::{
    CompiledQuery, ElementSelection, ExecutionMode, FilterStatus, QueryOptions,
};
pub use fingerprint::QueryFingerprint;
pub use predicate::{Occurrence, Predicate};
