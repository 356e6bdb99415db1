// src/drivers/docker.rs

use super::{DriverError, EnvironmentDriver};
use crate::core::registry::{Arguments, Component, ConstructionError};
use crate::system::executor;
use log::{debug, info};
use std::cell::Cell;
use std::path::{Path, PathBuf};

const UNIX_SCHEME: &str = "unix://";

/// Execution environments through a docker daemon.
#[derive(Debug)]
pub struct DockerEnvironmentDriver {
    filepath: PathBuf,
    execpath: String,
    socket: String,
    connected: Cell<bool>,
}

impl DockerEnvironmentDriver {
    /// Creates a driver for the project at `filepath`, talking to the daemon
    /// at `socket` (e.g. `unix:///var/run/docker.sock`).
    pub fn new(
        filepath: PathBuf,
        execpath: impl Into<String>,
        socket: impl Into<String>,
    ) -> Result<Self, DriverError> {
        if !filepath.is_dir() {
            return Err(DriverError::InvalidPath(filepath));
        }
        Ok(Self {
            filepath,
            execpath: execpath.into(),
            socket: socket.into(),
            connected: Cell::new(false),
        })
    }

    /// The project directory used as build context.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// The docker daemon address.
    pub fn socket(&self) -> &str {
        &self.socket
    }

    /// The socket file for `unix://` sockets.
    fn socket_path(&self) -> Option<&Path> {
        self.socket.strip_prefix(UNIX_SCHEME).map(Path::new)
    }
}

impl EnvironmentDriver for DockerEnvironmentDriver {
    fn is_initialized(&self) -> bool {
        self.connected.get() || self.socket_path().is_some_and(Path::exists)
    }

    fn init(&self) -> Result<(), DriverError> {
        if let Some(path) = self.socket_path() {
            if !path.exists() {
                return Err(DriverError::Unavailable {
                    driver: "docker",
                    reason: format!("socket '{}' does not exist", path.display()),
                });
            }
            debug!("Docker socket found at '{}'", path.display());
        } else {
            info!("Checking docker daemon at '{}'", self.socket);
            executor::run_tool(
                &self.execpath,
                &["--host", &self.socket, "version"],
                &self.filepath,
            )?;
        }
        self.connected.set(true);
        Ok(())
    }
}

pub(crate) fn construct(args: Arguments) -> Result<Component, ConstructionError> {
    let driver = DockerEnvironmentDriver::new(
        args.path("filepath")?,
        args.text("execpath")?,
        args.text("socket")?,
    )?;
    Ok(Component::Environment(Box::new(driver)))
}
