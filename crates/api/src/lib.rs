//! HTTP API: router, authentication gate, and account operations.

pub mod app;
pub mod context;
pub mod middleware;
