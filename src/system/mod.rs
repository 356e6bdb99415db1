//! # System Interaction Layer
//!
//! Boundary between the drivers and the operating system.
//!
//! - **`executor`**: spawns the external tools a driver is configured with (`git`,
//!   `docker`), splitting the configured executable with shell rules and capturing
//!   output and failures.

/// Running external tools.
pub mod executor;
