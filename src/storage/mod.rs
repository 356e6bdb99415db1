//! # Storage Layer
//!
//! Record storage for the controller's entities.
//!
//! - **`document_store`**: the default [`StorageDriver`], keeping JSON documents per
//!   collection either in memory or as files under a connection directory.
//! - **`dal`**: [`LocalDal`], the data-access layer that exposes typed collections
//!   (models, sessions) on top of whichever storage driver it is given.

/// Typed access to stored entities.
pub mod dal;
/// The built-in JSON document storage driver.
pub mod document_store;

pub use dal::{Collection, Entity, LocalDal};
pub use document_store::DocumentStore;

use crate::models::DriverType;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage drivers and the DAL.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A collection file could not be read or written.
    #[error("Storage I/O error at '{path}': {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A document could not be (de)serialized.
    #[error("Failed to (de)serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A `FILE` store was opened without a connection string.
    #[error("A connection string is required for '{0}' storage.")]
    MissingConnection(DriverType),
    /// The connection string could not be expanded.
    #[error("Failed to expand connection string '{value}': {reason}")]
    InvalidConnection {
        /// The raw connection string.
        value: String,
        /// Why expansion failed.
        reason: String,
    },
    /// A record to update or delete does not exist.
    #[error("No document '{id}' in collection '{collection}'.")]
    NotFound {
        /// The collection name.
        collection: String,
        /// The missing document id.
        id: String,
    },
    /// A record to create already exists.
    #[error("Document '{id}' already exists in collection '{collection}'.")]
    AlreadyExists {
        /// The collection name.
        collection: String,
        /// The duplicated document id.
        id: String,
    },
    /// A previous panic left the store's lock poisoned.
    #[error("Storage lock poisoned.")]
    Poisoned,
}

/// A document store addressed by collection name and document id.
pub trait StorageDriver: fmt::Debug + Send + Sync {
    /// The backend this driver writes to.
    fn driver_type(&self) -> DriverType;

    /// Fetches one document.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError>;

    /// Inserts or replaces one document.
    fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError>;

    /// Removes one document, reporting whether it existed.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError>;

    /// Lists every document of a collection, ordered by id.
    fn list(&self, collection: &str) -> Result<Vec<Value>, StorageError>;
}
