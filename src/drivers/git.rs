// src/drivers/git.rs

use super::{CodeDriver, DriverError};
use crate::core::registry::{Arguments, Component, ConstructionError};
use crate::system::executor;
use log::info;
use std::path::{Path, PathBuf};

/// Version control through the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCodeDriver {
    filepath: PathBuf,
    execpath: String,
}

impl GitCodeDriver {
    /// Creates a driver for the repository at `filepath`.
    pub fn new(filepath: PathBuf, execpath: impl Into<String>) -> Result<Self, DriverError> {
        if !filepath.is_dir() {
            return Err(DriverError::InvalidPath(filepath));
        }
        Ok(Self {
            filepath,
            execpath: execpath.into(),
        })
    }

    /// The repository root.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// The git command line, before splitting.
    pub fn execpath(&self) -> &str {
        &self.execpath
    }
}

impl CodeDriver for GitCodeDriver {
    fn is_initialized(&self) -> bool {
        self.filepath.join(".git").is_dir()
    }

    fn init(&self) -> Result<(), DriverError> {
        if self.is_initialized() {
            return Ok(());
        }
        info!("Initializing git repository in '{}'", self.filepath.display());
        executor::run_tool(&self.execpath, &["init"], &self.filepath)?;
        Ok(())
    }
}

pub(crate) fn construct(args: Arguments) -> Result<Component, ConstructionError> {
    let driver = GitCodeDriver::new(args.path("filepath")?, args.text("execpath")?)?;
    Ok(Component::Code(Box::new(driver)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_initialized_tracks_git_directory() {
        let home = tempdir().unwrap();
        let driver = GitCodeDriver::new(home.path().to_path_buf(), "git").unwrap();
        assert!(!driver.is_initialized());

        fs::create_dir(home.path().join(".git")).unwrap();
        assert!(driver.is_initialized());
        // Already initialized: nothing is executed.
        driver.init().unwrap();
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let home = tempdir().unwrap();
        let missing = home.path().join("missing");
        assert!(matches!(
            GitCodeDriver::new(missing, "git"),
            Err(DriverError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_init_surfaces_tool_failure() {
        let home = tempdir().unwrap();
        let driver = GitCodeDriver::new(home.path().to_path_buf(), "datmo-no-such-git").unwrap();
        assert!(matches!(driver.init(), Err(DriverError::Execution(_))));
    }
}
