//! # Drivers
//!
//! Pluggable implementations of the project's subsystems. The controller only
//! relies on the traits declared here; which implementation backs each one is
//! decided by the project's settings.
//!
//! - **`git`**: [`CodeDriver`] backed by the `git` executable.
//! - **`local_file`**: [`FileDriver`] managing `.datmo/files` inside the project.
//! - **`docker`**: [`EnvironmentDriver`] backed by a docker daemon socket.

/// Docker environment driver.
pub mod docker;
/// Git code driver.
pub mod git;
/// Local file driver.
pub mod local_file;

pub use docker::DockerEnvironmentDriver;
pub use git::GitCodeDriver;
pub use local_file::LocalFileDriver;

use crate::system::executor::ExecutionError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by drivers.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A filesystem operation failed.
    #[error("Filesystem error at '{path}': {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An external tool failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The driver's project path is not a directory.
    #[error("Driver path '{0}' is not a directory.")]
    InvalidPath(PathBuf),
    /// The backing service cannot be reached.
    #[error("{driver} is unavailable: {reason}")]
    Unavailable {
        /// Which driver reported the problem.
        driver: &'static str,
        /// What is missing.
        reason: String,
    },
}

/// Version control for the project's code.
pub trait CodeDriver: fmt::Debug {
    /// Whether the project is under version control.
    fn is_initialized(&self) -> bool;

    /// Puts the project under version control. A no-op when already initialized.
    fn init(&self) -> Result<(), DriverError>;
}

/// Storage of tracked project files.
pub trait FileDriver: fmt::Debug {
    /// Whether the driver's directory layout exists.
    fn is_initialized(&self) -> bool;

    /// Creates the directory layout.
    fn init(&self) -> Result<(), DriverError>;

    /// Removes everything datmo created in the project. Returns whether
    /// anything was removed.
    fn cleanup(&self) -> Result<bool, DriverError>;
}

/// Execution environments for project runs.
pub trait EnvironmentDriver: fmt::Debug {
    /// Whether the environment backend is reachable.
    fn is_initialized(&self) -> bool;

    /// Connects to the environment backend.
    fn init(&self) -> Result<(), DriverError>;
}
