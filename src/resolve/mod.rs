//! Semantic resolution stages that run between model building and synthesis.

pub mod aliases;
pub mod hierarchy;

pub use aliases::{scope_chain, AliasResolver, MAX_ALIAS_DEPTH};
pub use hierarchy::resolve_hierarchy;
