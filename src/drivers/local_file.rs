// src/drivers/local_file.rs

use super::{DriverError, FileDriver};
use crate::constants::{DATMO_DIR, FILES_DIRNAME};
use crate::core::registry::{Arguments, Component, ConstructionError};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps tracked files under `<filepath>/.datmo/files`.
#[derive(Debug, Clone)]
pub struct LocalFileDriver {
    filepath: PathBuf,
}

impl LocalFileDriver {
    /// Creates a driver for the project at `filepath`.
    pub fn new(filepath: PathBuf) -> Result<Self, DriverError> {
        if !filepath.is_dir() {
            return Err(DriverError::InvalidPath(filepath));
        }
        Ok(Self { filepath })
    }

    /// The project's hidden datmo directory.
    pub fn datmo_dir(&self) -> PathBuf {
        self.filepath.join(DATMO_DIR)
    }

    /// The directory holding tracked files.
    pub fn files_dir(&self) -> PathBuf {
        self.datmo_dir().join(FILES_DIRNAME)
    }

    /// The project directory.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }
}

impl FileDriver for LocalFileDriver {
    fn is_initialized(&self) -> bool {
        self.files_dir().is_dir()
    }

    fn init(&self) -> Result<(), DriverError> {
        let files_dir = self.files_dir();
        debug!("Creating file driver layout at '{}'", files_dir.display());
        fs::create_dir_all(&files_dir).map_err(|source| DriverError::Io {
            path: files_dir,
            source,
        })
    }

    fn cleanup(&self) -> Result<bool, DriverError> {
        let datmo_dir = self.datmo_dir();
        if !datmo_dir.exists() {
            return Ok(false);
        }
        warn!("Removing '{}'", datmo_dir.display());
        fs::remove_dir_all(&datmo_dir).map_err(|source| DriverError::Io {
            path: datmo_dir,
            source,
        })?;
        Ok(true)
    }
}

pub(crate) fn construct(args: Arguments) -> Result<Component, ConstructionError> {
    let driver = LocalFileDriver::new(args.path("filepath")?)?;
    Ok(Component::File(Box::new(driver)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_and_cleanup_lifecycle() {
        let home = tempdir().unwrap();
        let driver = LocalFileDriver::new(home.path().to_path_buf()).unwrap();
        assert!(!driver.is_initialized());
        assert!(!driver.cleanup().unwrap());

        driver.init().unwrap();
        assert!(driver.is_initialized());
        assert!(home.path().join(".datmo").join("files").is_dir());

        assert!(driver.cleanup().unwrap());
        assert!(!driver.is_initialized());
        assert!(!home.path().join(".datmo").exists());
        assert!(home.path().is_dir());
    }
}
