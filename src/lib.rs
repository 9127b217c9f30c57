//! vastup - keep the `vast` SSH host alias pointed at your current instance
//!
//! This library provides the config-file transformation behind the `vastup`
//! binary: locate the managed host block, carry its custom settings over,
//! and rewrite it with fresh connection details.

pub mod sshconfig;

// Re-export commonly used types
pub use sshconfig::{ConnectionParams, HostBlock, UpdateReport};
