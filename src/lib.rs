//! Local password vault.
//!
//! Stores (site, username, password) records in a single JSON file and
//! generates random passwords.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Credential store, password generator, config and path resolution
//! - `models` — Data structures
//! - `util` — Filesystem helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;

pub use crate::core::generator::{generate, GenerateError, PasswordGenerator};
pub use crate::core::store::{CredentialStore, LookupResult, StoreError, UpsertOutcome};
pub use crate::models::credential::Record;
