//! Data structures persisted to disk.

pub mod credential;
pub mod policy;
pub mod vault_config;
