// src/storage/dal.rs

use super::{StorageDriver, StorageError};
use crate::core::registry::{Arguments, Component, ConstructionError};
use crate::models::{Model, Session};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;

/// A record type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned {
    /// Name of the collection holding records of this type.
    const COLLECTION: &'static str;

    /// The record's unique id.
    fn id(&self) -> &str;
}

impl Entity for Model {
    const COLLECTION: &'static str = "model";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Session {
    const COLLECTION: &'static str = "session";

    fn id(&self) -> &str {
        &self.id
    }
}

/// The data-access layer: typed collections over a storage driver.
#[derive(Debug, Clone)]
pub struct LocalDal {
    driver: Arc<dyn StorageDriver>,
}

impl LocalDal {
    /// Wraps a live storage driver.
    pub fn new(driver: Arc<dyn StorageDriver>) -> Self {
        Self { driver }
    }

    /// The storage driver this layer writes through.
    pub fn driver(&self) -> &Arc<dyn StorageDriver> {
        &self.driver
    }

    /// The model collection.
    pub fn models(&self) -> Collection<'_, Model> {
        Collection::new(self.driver.as_ref())
    }

    /// The session collection.
    pub fn sessions(&self) -> Collection<'_, Session> {
        Collection::new(self.driver.as_ref())
    }
}

/// Typed access to one collection.
#[derive(Debug)]
pub struct Collection<'a, T> {
    driver: &'a dyn StorageDriver,
    _entity: PhantomData<T>,
}

impl<'a, T: Entity> Collection<'a, T> {
    fn new(driver: &'a dyn StorageDriver) -> Self {
        Self {
            driver,
            _entity: PhantomData,
        }
    }

    /// The record with `id`, if any.
    pub fn get_by_id(&self, id: &str) -> Result<Option<T>, StorageError> {
        self.driver
            .get(T::COLLECTION, id)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    /// Inserts a new record. Fails if the id is taken.
    pub fn create(&self, record: &T) -> Result<(), StorageError> {
        if self.driver.get(T::COLLECTION, record.id())?.is_some() {
            return Err(StorageError::AlreadyExists {
                collection: T::COLLECTION.to_string(),
                id: record.id().to_string(),
            });
        }
        self.driver
            .set(T::COLLECTION, record.id(), serde_json::to_value(record)?)
    }

    /// Replaces an existing record. Fails if it does not exist.
    pub fn update(&self, record: &T) -> Result<(), StorageError> {
        if self.driver.get(T::COLLECTION, record.id())?.is_none() {
            return Err(StorageError::NotFound {
                collection: T::COLLECTION.to_string(),
                id: record.id().to_string(),
            });
        }
        self.driver
            .set(T::COLLECTION, record.id(), serde_json::to_value(record)?)
    }

    /// Removes a record. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        self.driver.delete(T::COLLECTION, id)
    }

    /// Every record matching `predicate`.
    pub fn query(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>, StorageError> {
        let mut records = Vec::new();
        for document in self.driver.list(T::COLLECTION)? {
            let record: T = serde_json::from_value(document)?;
            if predicate(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Builds a [`LocalDal`] around the live driver injected under `driver`.
pub(crate) fn construct(args: Arguments) -> Result<Component, ConstructionError> {
    let driver = args.storage_driver("driver")?;
    Ok(Component::Dal(LocalDal::new(driver)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ArgValue;
    use crate::storage::DocumentStore;

    fn memory_dal() -> LocalDal {
        LocalDal::new(Arc::new(DocumentStore::in_memory()))
    }

    #[test]
    fn test_model_create_get_update_delete() {
        let dal = memory_dal();
        let mut model = Model::new("demo", "first");

        dal.models().create(&model).unwrap();
        assert_eq!(dal.models().get_by_id(&model.id).unwrap(), Some(model.clone()));
        assert!(matches!(
            dal.models().create(&model),
            Err(StorageError::AlreadyExists { .. })
        ));

        model.description = "second".to_string();
        dal.models().update(&model).unwrap();
        assert_eq!(
            dal.models().get_by_id(&model.id).unwrap().map(|m| m.description),
            Some("second".to_string())
        );

        assert!(dal.models().delete(&model.id).unwrap());
        assert_eq!(dal.models().get_by_id(&model.id).unwrap(), None);
    }

    #[test]
    fn test_update_missing_record_fails() {
        let dal = memory_dal();
        let session = Session::new("m", "default");
        assert!(matches!(
            dal.sessions().update(&session),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sessions_query_by_model() {
        let dal = memory_dal();
        dal.sessions().create(&Session::new("m1", "default")).unwrap();
        dal.sessions().create(&Session::new("m1", "tuning")).unwrap();
        dal.sessions().create(&Session::new("m2", "default")).unwrap();

        let sessions = dal.sessions().query(|s| s.model_id == "m1").unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(dal.models().query(|_| true).unwrap().is_empty());
    }

    #[test]
    fn test_construct_requires_live_driver() {
        let mut options = crate::models::Options::new();
        options.insert("driver".to_string(), "storage.local.driver".into());
        let mut args = Arguments::from_options(&options);
        assert!(matches!(
            construct(args.clone()),
            Err(ConstructionError::InvalidArgument { .. })
        ));

        args.insert(
            "driver",
            ArgValue::StorageDriver(Arc::new(DocumentStore::in_memory())),
        );
        assert!(matches!(construct(args), Ok(Component::Dal(_))));
    }
}
