// src/cli/handlers/mod.rs

// One module per CLI action.

/// `datmo cleanup`.
pub mod cleanup;
/// Helpers shared by the handlers.
pub mod commons;
/// `datmo config`.
pub mod config;
/// `datmo init`.
pub mod init;
/// `datmo status`.
pub mod status;
/// `datmo version`.
pub mod version;
