// src/core/registry.rs

//! # Component Registry
//!
//! Maps descriptor identifiers to the constructors of concrete drivers. The set of
//! components is closed ([`ComponentKind`]); the registry only decides which
//! factory builds each kind, so embedders and tests can swap one in with
//! [`ComponentRegistry::register`].

use crate::drivers::{self, CodeDriver, DriverError, EnvironmentDriver, FileDriver};
use crate::models::{DriverType, OptionValue, Options};
use crate::storage::{self, LocalDal, StorageDriver, StorageError};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Every component that can be named by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Version control through the `git` executable.
    GitCode,
    /// File tracking inside the project's `.datmo` directory.
    LocalFile,
    /// Execution environments through docker.
    DockerEnvironment,
    /// The data-access layer over a storage driver.
    LocalDal,
    /// Document storage with `FILE` or `MEMORY` backends.
    DocumentStore,
}

impl ComponentKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 5] = [
        Self::GitCode,
        Self::LocalFile,
        Self::DockerEnvironment,
        Self::LocalDal,
        Self::DocumentStore,
    ];

    /// The identifier used for this kind in descriptors.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::GitCode => "code.git",
            Self::LocalFile => "file.local",
            Self::DockerEnvironment => "environment.docker",
            Self::LocalDal => "storage.local.dal",
            Self::DocumentStore => "storage.local.document_store",
        }
    }

    /// The role a component of this kind plays for the controller.
    pub fn role(&self) -> ComponentRole {
        match self {
            Self::GitCode => ComponentRole::Code,
            Self::LocalFile => ComponentRole::File,
            Self::DockerEnvironment => ComponentRole::Environment,
            Self::LocalDal => ComponentRole::Dal,
            Self::DocumentStore => ComponentRole::StorageDriver,
        }
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.identifier() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// What a constructed component is used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    /// A [`CodeDriver`].
    Code,
    /// A [`FileDriver`].
    File,
    /// An [`EnvironmentDriver`].
    Environment,
    /// A [`StorageDriver`].
    StorageDriver,
    /// A [`LocalDal`].
    Dal,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Code => "code driver",
            Self::File => "file driver",
            Self::Environment => "environment driver",
            Self::StorageDriver => "storage driver",
            Self::Dal => "data-access layer",
        };
        f.write_str(name)
    }
}

/// Errors raised by component constructors.
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// No factory is registered for the requested kind.
    #[error("No factory registered for component '{0}'.")]
    NotRegistered(ComponentKind),
    /// A required argument was not supplied.
    #[error("Missing required argument '{name}'.")]
    MissingArgument {
        /// The argument name.
        name: String,
    },
    /// An argument was supplied with the wrong type.
    #[error("Argument '{name}' must be {expected}.")]
    InvalidArgument {
        /// The argument name.
        name: String,
        /// Human readable description of the expected type.
        expected: &'static str,
    },
    /// A driver failed while being set up.
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// A storage backend failed while being opened.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A construction argument.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// An option copied verbatim from the descriptor.
    Setting(OptionValue),
    /// A storage backend type, already normalized from its settings name.
    DriverType(DriverType),
    /// A live storage driver injected by the controller.
    StorageDriver(Arc<dyn StorageDriver>),
}

/// Named arguments handed to a component factory.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: BTreeMap<String, ArgValue>,
}

impl Arguments {
    /// Builds arguments from descriptor options, copying each value as-is.
    pub fn from_options(options: &Options) -> Self {
        let values = options
            .iter()
            .map(|(name, value)| (name.clone(), ArgValue::Setting(value.clone())))
            .collect();
        Self { values }
    }

    /// Sets `name`, returning the value it replaces.
    pub fn insert(&mut self, name: &str, value: ArgValue) -> Option<ArgValue> {
        self.values.insert(name.to_string(), value)
    }

    /// Returns the raw argument named `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Returns a required text argument.
    pub fn text(&self, name: &str) -> Result<&str, ConstructionError> {
        self.optional_text(name)?
            .ok_or_else(|| ConstructionError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Returns a text argument if present.
    pub fn optional_text(&self, name: &str) -> Result<Option<&str>, ConstructionError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(ArgValue::Setting(OptionValue::Text(value))) => Ok(Some(value)),
            Some(_) => Err(invalid(name, "a string")),
        }
    }

    /// Returns a required path argument.
    pub fn path(&self, name: &str) -> Result<PathBuf, ConstructionError> {
        self.text(name).map(PathBuf::from)
    }

    /// Returns a required, normalized storage backend type.
    pub fn driver_type(&self, name: &str) -> Result<DriverType, ConstructionError> {
        match self.values.get(name) {
            Some(ArgValue::DriverType(driver_type)) => Ok(*driver_type),
            Some(_) => Err(invalid(name, "a storage driver type")),
            None => Err(ConstructionError::MissingArgument {
                name: name.to_string(),
            }),
        }
    }

    /// Returns a required live storage driver.
    pub fn storage_driver(&self, name: &str) -> Result<Arc<dyn StorageDriver>, ConstructionError> {
        match self.values.get(name) {
            Some(ArgValue::StorageDriver(driver)) => Ok(Arc::clone(driver)),
            Some(_) => Err(invalid(name, "a live storage driver")),
            None => Err(ConstructionError::MissingArgument {
                name: name.to_string(),
            }),
        }
    }
}

fn invalid(name: &str, expected: &'static str) -> ConstructionError {
    ConstructionError::InvalidArgument {
        name: name.to_string(),
        expected,
    }
}

/// A constructed component.
#[derive(Debug)]
pub enum Component {
    /// A version control driver.
    Code(Box<dyn CodeDriver>),
    /// A file driver.
    File(Box<dyn FileDriver>),
    /// An environment driver.
    Environment(Box<dyn EnvironmentDriver>),
    /// A storage driver, shared between the controller and its DAL.
    StorageDriver(Arc<dyn StorageDriver>),
    /// A data-access layer.
    Dal(LocalDal),
}

impl Component {
    /// The role this component can fill.
    pub fn role(&self) -> ComponentRole {
        match self {
            Self::Code(_) => ComponentRole::Code,
            Self::File(_) => ComponentRole::File,
            Self::Environment(_) => ComponentRole::Environment,
            Self::StorageDriver(_) => ComponentRole::StorageDriver,
            Self::Dal(_) => ComponentRole::Dal,
        }
    }
}

/// A factory building one component from its arguments.
pub type Factory = Arc<dyn Fn(Arguments) -> Result<Component, ConstructionError>>;

/// Associates a component kind with its built-in constructor.
struct ComponentDefinition {
    kind: ComponentKind,
    constructor: fn(Arguments) -> Result<Component, ConstructionError>,
}

/// The built-in constructors. To add a component, add a `ComponentKind`
/// variant and an entry here.
static BUILTIN_COMPONENTS: &[ComponentDefinition] = &[
    ComponentDefinition {
        kind: ComponentKind::GitCode,
        constructor: drivers::git::construct,
    },
    ComponentDefinition {
        kind: ComponentKind::LocalFile,
        constructor: drivers::local_file::construct,
    },
    ComponentDefinition {
        kind: ComponentKind::DockerEnvironment,
        constructor: drivers::docker::construct,
    },
    ComponentDefinition {
        kind: ComponentKind::LocalDal,
        constructor: storage::dal::construct,
    },
    ComponentDefinition {
        kind: ComponentKind::DocumentStore,
        constructor: storage::document_store::construct,
    },
];

/// Resolves identifiers to factories.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: HashMap<ComponentKind, Factory>,
}

impl ComponentRegistry {
    /// A registry holding every built-in constructor.
    pub fn builtin() -> Self {
        let factories = BUILTIN_COMPONENTS
            .iter()
            .map(|def| (def.kind, Arc::new(def.constructor) as Factory))
            .collect();
        Self { factories }
    }

    /// A registry with no factories.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers `factory` for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: ComponentKind, factory: F) -> &mut Self
    where
        F: Fn(Arguments) -> Result<Component, ConstructionError> + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    /// Resolves a descriptor identifier to a registered kind.
    pub fn resolve(&self, identifier: &str) -> Option<ComponentKind> {
        identifier
            .parse::<ComponentKind>()
            .ok()
            .filter(|kind| self.factories.contains_key(kind))
    }

    /// Runs the factory registered for `kind`.
    pub fn construct(
        &self,
        kind: ComponentKind,
        arguments: Arguments,
    ) -> Result<Component, ConstructionError> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or(ConstructionError::NotRegistered(kind))?;
        factory(arguments)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("ComponentRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
