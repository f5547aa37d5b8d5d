//! Shared plumbing for the loach workspace: well-known paths and
//! atomic file persistence.

pub mod paths;
pub mod persist;
