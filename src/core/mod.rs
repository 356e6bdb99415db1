// src/core/mod.rs

pub mod config_defaults;
pub mod controller;
pub mod project;
pub mod registry;
pub mod settings;
