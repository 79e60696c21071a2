//! Application seams: the host trait, the per-invocation context and the
//! command registry.

pub mod context;
pub mod host;
pub mod registry;
