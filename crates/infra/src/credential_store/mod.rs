//! Identity persistence boundary.
//!
//! The store is the only shared mutable resource in the process. Each
//! create/update/delete is atomic, including the uniqueness checks that go
//! with it (global email, one admin per organization).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;
pub use r#trait::{CredentialStore, StoreError};
