//! `datmo` keeps a project's code, files, environments and records behind
//! swappable drivers. Which driver backs each concern is read from the project's
//! settings and resolved lazily by the [`core::controller::Controller`].

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Command-line front end.
pub mod cli;
/// File, directory and settings-key names.
pub mod constants;
/// Settings, the component registry and the controller.
pub mod core;
pub mod drivers;
/// Settings values and stored entities.
pub mod models;
pub mod storage;
pub mod system;
