// src/storage/document_store.rs

use super::{StorageDriver, StorageError};
use crate::core::registry::{Arguments, Component, ConstructionError};
use crate::models::DriverType;
use log::{debug, trace};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

type CollectionMap = BTreeMap<String, Value>;

/// JSON document storage.
///
/// With [`DriverType::File`], each collection is loaded from
/// `<connection>/<collection>.json` on first use and written back after every
/// change. With [`DriverType::Memory`] nothing touches the disk.
#[derive(Debug)]
pub struct DocumentStore {
    driver_type: DriverType,
    root: Option<PathBuf>,
    collections: Mutex<HashMap<String, CollectionMap>>,
}

impl DocumentStore {
    /// Opens a store of the given type. `connection_string` is required for
    /// `FILE` stores and may use `~` and environment variables.
    pub fn open(
        driver_type: DriverType,
        connection_string: Option<&str>,
    ) -> Result<Self, StorageError> {
        let root = match driver_type {
            DriverType::Memory => None,
            DriverType::File => {
                let raw = connection_string.ok_or(StorageError::MissingConnection(driver_type))?;
                let expanded =
                    shellexpand::full(raw).map_err(|e| StorageError::InvalidConnection {
                        value: raw.to_string(),
                        reason: e.to_string(),
                    })?;
                let root = PathBuf::from(expanded.into_owned());
                fs::create_dir_all(&root).map_err(|source| StorageError::Io {
                    path: root.clone(),
                    source,
                })?;
                Some(root)
            }
        };
        debug!(
            "Opened {} document store{}",
            driver_type,
            root.as_ref()
                .map(|r| format!(" at '{}'", r.display()))
                .unwrap_or_default()
        );
        Ok(Self {
            driver_type,
            root,
            collections: Mutex::new(HashMap::new()),
        })
    }

    /// A store that only lives in memory.
    pub fn in_memory() -> Self {
        Self {
            driver_type: DriverType::Memory,
            root: None,
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the collection files, for `FILE` stores.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, CollectionMap>>, StorageError> {
        self.collections.lock().map_err(|_| StorageError::Poisoned)
    }

    fn collection_path(&self, collection: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{}.json", collection)))
    }

    fn load_collection(&self, collection: &str) -> Result<CollectionMap, StorageError> {
        let Some(path) = self.collection_path(collection) else {
            return Ok(CollectionMap::new());
        };
        if !path.exists() {
            return Ok(CollectionMap::new());
        }
        trace!("Loading collection '{}' from '{}'", collection, path.display());
        let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist_collection(&self, collection: &str, documents: &CollectionMap) -> Result<(), StorageError> {
        let Some(path) = self.collection_path(collection) else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(documents)?;
        fs::write(&path, content).map_err(|source| StorageError::Io { path, source })
    }

    /// Runs `f` on a collection, loading it first if needed.
    fn with_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut CollectionMap) -> T,
    ) -> Result<T, StorageError> {
        let mut collections = self.lock()?;
        if !collections.contains_key(collection) {
            let loaded = self.load_collection(collection)?;
            collections.insert(collection.to_string(), loaded);
        }
        let documents = collections.entry(collection.to_string()).or_default();
        Ok(f(documents))
    }
}

impl StorageDriver for DocumentStore {
    fn driver_type(&self) -> DriverType {
        self.driver_type
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError> {
        self.with_collection(collection, |docs| docs.get(id).cloned())
    }

    fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError> {
        let snapshot = self.with_collection(collection, |docs| {
            docs.insert(id.to_string(), document);
            docs.clone()
        })?;
        self.persist_collection(collection, &snapshot)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
        let (removed, snapshot) = self.with_collection(collection, |docs| {
            let removed = docs.remove(id).is_some();
            (removed, docs.clone())
        })?;
        if removed {
            self.persist_collection(collection, &snapshot)?;
        }
        Ok(removed)
    }

    fn list(&self, collection: &str) -> Result<Vec<Value>, StorageError> {
        self.with_collection(collection, |docs| docs.values().cloned().collect())
    }
}

/// Builds a [`DocumentStore`] from `driver_type` and `connection_string`.
pub(crate) fn construct(args: Arguments) -> Result<Component, ConstructionError> {
    let driver_type = args.driver_type("driver_type")?;
    let connection = args.optional_text("connection_string")?;
    let store = DocumentStore::open(driver_type, connection)?;
    Ok(Component::StorageDriver(Arc::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_basic_operations() {
        let store = DocumentStore::in_memory();
        assert_eq!(store.driver_type(), DriverType::Memory);
        assert_eq!(store.get("model", "a").unwrap(), None);

        store.set("model", "b", json!({"id": "b"})).unwrap();
        store.set("model", "a", json!({"id": "a"})).unwrap();
        assert_eq!(store.get("model", "a").unwrap(), Some(json!({"id": "a"})));

        let ids: Vec<_> = store
            .list("model")
            .unwrap()
            .into_iter()
            .map(|d| d["id"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.delete("model", "a").unwrap());
        assert!(!store.delete("model", "a").unwrap());
        assert!(store.list("session").unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let connection = dir.path().join("database");
        let connection_str = connection.to_string_lossy().to_string();

        let first = DocumentStore::open(DriverType::File, Some(&connection_str)).unwrap();
        first.set("session", "s1", json!({"id": "s1"})).unwrap();
        assert!(connection.join("session.json").is_file());

        let second = DocumentStore::open(DriverType::File, Some(&connection_str)).unwrap();
        assert_eq!(second.get("session", "s1").unwrap(), Some(json!({"id": "s1"})));
    }

    #[test]
    fn test_file_store_requires_connection_string() {
        assert!(matches!(
            DocumentStore::open(DriverType::File, None),
            Err(StorageError::MissingConnection(DriverType::File))
        ));
    }

    #[test]
    fn test_construct_rejects_unnormalized_driver_type() {
        let mut options = crate::models::Options::new();
        options.insert("driver_type".to_string(), "MEMORY".into());
        let result = construct(Arguments::from_options(&options));
        assert!(matches!(
            result,
            Err(ConstructionError::InvalidArgument { .. })
        ));
    }
}
