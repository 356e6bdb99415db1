// src/core/controller.rs

//! # Controller
//!
//! The `Controller` owns a project directory and lazily builds everything that
//! works on it: the code, file and environment drivers, the data-access layer
//! (DAL), and the project's model and current session records.
//!
//! Every component is described by a [`Descriptor`] read from the project
//! settings. The first time a key is requested its built-in default is written to
//! the settings, so later runs keep resolving the same component even if the
//! defaults change.
//!
//! Each resolved value is cached in its own slot and is never rebuilt for the
//! lifetime of the instance. Entity lookups that find nothing are not cached.
//! Two controllers opened on the same project keep separate caches.

use crate::constants::{CURRENT_SESSION_ID_KEY, MODEL_ID_KEY};
use crate::core::config_defaults::{
    self, CODE_DRIVER_KEY, DAL_KEY, ENVIRONMENT_DRIVER_KEY, FILE_DRIVER_KEY, STORAGE_DRIVER_KEY,
};
use crate::core::registry::{
    ArgValue, Arguments, Component, ComponentKind, ComponentRegistry, ComponentRole,
    ConstructionError,
};
use crate::core::settings::{ProjectSettings, SettingsError, SettingsStore};
use crate::drivers::{CodeDriver, DriverError, EnvironmentDriver, FileDriver};
use crate::models::{Descriptor, DriverType, Model, OptionValue, Session, SettingValue};
use crate::storage::{LocalDal, StorageDriver, StorageError};
use log::{debug, info, trace};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the controller.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The project directory does not exist.
    #[error("Invalid project path '{path}': not an existing directory.")]
    InvalidProjectPath {
        /// The rejected path.
        path: PathBuf,
    },
    /// A session was requested before the project has a model.
    #[error("The project at '{home}' has no model. Initialize the project first.")]
    ModelNotInitialized {
        /// The project directory.
        home: PathBuf,
    },
    /// A configuration key has no entry in the defaults table.
    #[error("Unknown configuration key '{0}'.")]
    UnknownConfigKey(String),
    /// The setting stored under a configuration key is not a descriptor.
    #[error("Setting '{key}' does not hold a component descriptor.")]
    InvalidSetting {
        /// The configuration key.
        key: String,
    },
    /// A descriptor names a component that is not registered.
    #[error("Unknown component '{identifier}' configured for '{key}'.")]
    UnknownComponent {
        /// The configuration key.
        key: String,
        /// The unresolvable identifier.
        identifier: String,
    },
    /// A storage driver descriptor names an unknown backend type.
    #[error("Invalid storage driver type '{value}' configured for '{key}'.")]
    InvalidDriverType {
        /// The configuration key.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// A component was configured for a role it cannot fill.
    #[error("Component '{kind}' configured for '{key}' built a {found}, expected a {expected}.")]
    ComponentMismatch {
        /// The configuration key.
        key: String,
        /// The configured component.
        kind: ComponentKind,
        /// The role the key requires.
        expected: ComponentRole,
        /// The role of what was built.
        found: ComponentRole,
    },
    /// A component factory failed.
    #[error("Failed to construct '{kind}' for '{key}': {source}")]
    Construction {
        /// The configuration key.
        key: String,
        /// The component being built.
        kind: ComponentKind,
        /// The factory's error.
        #[source]
        source: ConstructionError,
    },
    /// Reading or writing settings failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The DAL or its storage driver failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A driver operation failed.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

type ControllerResult<T> = Result<T, ControllerError>;

/// A descriptor after its identifier has been resolved against the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDescriptor {
    /// The configuration key it was loaded from.
    pub key: String,
    /// The registered component the identifier names.
    pub kind: ComponentKind,
    /// The effective descriptor (the project's override or the default).
    pub descriptor: Descriptor,
}

impl ResolvedDescriptor {
    /// Construction arguments built from the descriptor's options.
    pub fn arguments(&self) -> Arguments {
        Arguments::from_options(&self.descriptor.options)
    }

    fn mismatch(&self, expected: ComponentRole, found: ComponentRole) -> ControllerError {
        ControllerError::ComponentMismatch {
            key: self.key.clone(),
            kind: self.kind,
            expected,
            found,
        }
    }
}

/// Aggregate readiness of a project. Moves from `Uninitialized` to
/// `Initialized` at most once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initialization {
    /// Readiness is re-evaluated on every check.
    #[default]
    Uninitialized,
    /// Readiness was observed once; no further checks happen.
    Initialized,
}

impl Initialization {
    /// The state after a readiness check that returned `ready`.
    pub fn advance(self, ready: bool) -> Self {
        match self {
            Self::Initialized => Self::Initialized,
            Self::Uninitialized if ready => Self::Initialized,
            Self::Uninitialized => Self::Uninitialized,
        }
    }

    /// Whether readiness has been observed.
    pub fn is_initialized(self) -> bool {
        self == Self::Initialized
    }
}

/// Resolves and caches the components of one project.
pub struct Controller {
    home: PathBuf,
    settings: Box<dyn SettingsStore>,
    registry: ComponentRegistry,
    dal_driver: Option<Arc<dyn StorageDriver>>,
    // Lazily filled, never invalidated.
    dal: Option<LocalDal>,
    model: Option<Model>,
    current_session: Option<Session>,
    code_driver: Option<Box<dyn CodeDriver>>,
    file_driver: Option<Box<dyn FileDriver>>,
    environment_driver: Option<Box<dyn EnvironmentDriver>>,
    initialization: Initialization,
}

impl Controller {
    /// Opens the project at `home` with its on-disk settings and the built-in
    /// components.
    ///
    /// # Errors
    /// Returns [`ControllerError::InvalidProjectPath`] if `home` is not an
    /// existing directory.
    pub fn open(home: impl AsRef<Path>) -> ControllerResult<Self> {
        let home = canonical_home(home.as_ref())?;
        let settings = Box::new(ProjectSettings::open(&home));
        Ok(Self::assemble(home, settings, ComponentRegistry::builtin(), None))
    }

    /// Opens the project at `home` with explicit collaborators.
    ///
    /// `dal_driver`, when given, is used as the storage driver of the DAL and
    /// the `storage.local.driver` descriptor is never consulted.
    pub fn with_parts(
        home: impl AsRef<Path>,
        settings: Box<dyn SettingsStore>,
        registry: ComponentRegistry,
        dal_driver: Option<Arc<dyn StorageDriver>>,
    ) -> ControllerResult<Self> {
        let home = canonical_home(home.as_ref())?;
        Ok(Self::assemble(home, settings, registry, dal_driver))
    }

    fn assemble(
        home: PathBuf,
        settings: Box<dyn SettingsStore>,
        registry: ComponentRegistry,
        dal_driver: Option<Arc<dyn StorageDriver>>,
    ) -> Self {
        debug!("Controller opened for '{}'", home.display());
        Self {
            home,
            settings,
            registry,
            dal_driver,
            dal: None,
            model: None,
            current_session: None,
            code_driver: None,
            file_driver: None,
            environment_driver: None,
            initialization: Initialization::Uninitialized,
        }
    }

    /// The canonical project directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The project settings.
    pub fn settings(&self) -> &dyn SettingsStore {
        &*self.settings
    }

    /// Mutable access to the project settings.
    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        &mut *self.settings
    }

    /// The storage driver used by the DAL, once one has been supplied or built.
    pub fn dal_driver(&self) -> Option<&Arc<dyn StorageDriver>> {
        self.dal_driver.as_ref()
    }

    // --- Configuration resolution ---

    /// Returns the value stored under `key`, storing `default_value` first if
    /// there is none. A stored value is never overwritten.
    pub fn get_or_set_default(
        &mut self,
        key: &str,
        default_value: SettingValue,
    ) -> ControllerResult<SettingValue> {
        if let Some(value) = self.settings.get(key)? {
            return Ok(value);
        }
        trace!("No setting for '{}', storing default", key);
        self.settings.set(key, default_value.clone())?;
        Ok(default_value)
    }

    /// Loads the effective descriptor for `key` and resolves its identifier.
    ///
    /// # Errors
    /// [`ControllerError::UnknownConfigKey`] if `key` is not in the defaults
    /// table, [`ControllerError::InvalidSetting`] if the stored value is not a
    /// descriptor, [`ControllerError::UnknownComponent`] if its identifier is
    /// not registered.
    pub fn config_loader(&mut self, key: &str) -> ControllerResult<ResolvedDescriptor> {
        let default = config_defaults::default_descriptor(key, &self.home)
            .ok_or_else(|| ControllerError::UnknownConfigKey(key.to_string()))?;

        let SettingValue::Descriptor(descriptor) = self.get_or_set_default(key, default.into())?
        else {
            return Err(ControllerError::InvalidSetting {
                key: key.to_string(),
            });
        };

        let kind = self.registry.resolve(&descriptor.identifier).ok_or_else(|| {
            ControllerError::UnknownComponent {
                key: key.to_string(),
                identifier: descriptor.identifier.clone(),
            }
        })?;

        debug!("Config '{}' resolved to {}", key, descriptor);
        Ok(ResolvedDescriptor {
            key: key.to_string(),
            kind,
            descriptor,
        })
    }

    fn construct(
        &self,
        resolved: &ResolvedDescriptor,
        arguments: Arguments,
    ) -> ControllerResult<Component> {
        trace!("Constructing '{}' for '{}'", resolved.kind, resolved.key);
        self.registry
            .construct(resolved.kind, arguments)
            .map_err(|source| ControllerError::Construction {
                key: resolved.key.clone(),
                kind: resolved.kind,
                source,
            })
    }

    // --- Drivers ---

    fn build_code_driver(&mut self) -> ControllerResult<Box<dyn CodeDriver>> {
        let resolved = self.config_loader(CODE_DRIVER_KEY)?;
        match self.construct(&resolved, resolved.arguments())? {
            Component::Code(driver) => Ok(driver),
            other => Err(resolved.mismatch(ComponentRole::Code, other.role())),
        }
    }

    fn build_file_driver(&mut self) -> ControllerResult<Box<dyn FileDriver>> {
        let resolved = self.config_loader(FILE_DRIVER_KEY)?;
        match self.construct(&resolved, resolved.arguments())? {
            Component::File(driver) => Ok(driver),
            other => Err(resolved.mismatch(ComponentRole::File, other.role())),
        }
    }

    fn build_environment_driver(&mut self) -> ControllerResult<Box<dyn EnvironmentDriver>> {
        let resolved = self.config_loader(ENVIRONMENT_DRIVER_KEY)?;
        match self.construct(&resolved, resolved.arguments())? {
            Component::Environment(driver) => Ok(driver),
            other => Err(resolved.mismatch(ComponentRole::Environment, other.role())),
        }
    }

    /// The version control driver, built on first access.
    pub fn code_driver(&mut self) -> ControllerResult<&dyn CodeDriver> {
        let driver = match self.code_driver.take() {
            Some(driver) => driver,
            None => self.build_code_driver()?,
        };
        Ok(&**self.code_driver.insert(driver))
    }

    /// The file driver, built on first access.
    pub fn file_driver(&mut self) -> ControllerResult<&dyn FileDriver> {
        let driver = match self.file_driver.take() {
            Some(driver) => driver,
            None => self.build_file_driver()?,
        };
        Ok(&**self.file_driver.insert(driver))
    }

    /// The environment driver, built on first access.
    pub fn environment_driver(&mut self) -> ControllerResult<&dyn EnvironmentDriver> {
        let driver = match self.environment_driver.take() {
            Some(driver) => driver,
            None => self.build_environment_driver()?,
        };
        Ok(&**self.environment_driver.insert(driver))
    }

    // --- Data-access layer ---

    /// Builds a new DAL.
    ///
    /// The storage driver comes first: the one supplied at construction, or the
    /// one built from `storage.local.driver` (kept for later calls). It is then
    /// injected as the `driver` argument of the `storage.local` component,
    /// replacing the placeholder stored in its options.
    pub fn dal_instantiate(&mut self) -> ControllerResult<LocalDal> {
        let driver = match &self.dal_driver {
            Some(driver) => Arc::clone(driver),
            None => {
                let driver = self.build_storage_driver()?;
                self.dal_driver = Some(Arc::clone(&driver));
                driver
            }
        };

        let resolved = self.config_loader(DAL_KEY)?;
        let mut arguments = resolved.arguments();
        arguments.insert("driver", ArgValue::StorageDriver(driver));
        match self.construct(&resolved, arguments)? {
            Component::Dal(dal) => Ok(dal),
            other => Err(resolved.mismatch(ComponentRole::Dal, other.role())),
        }
    }

    fn build_storage_driver(&mut self) -> ControllerResult<Arc<dyn StorageDriver>> {
        let resolved = self.config_loader(STORAGE_DRIVER_KEY)?;
        let mut arguments = resolved.arguments();

        // Settings hold the type by name; constructors take the enum.
        if let Some(OptionValue::Text(name)) = resolved.descriptor.options.get("driver_type") {
            let driver_type = name.parse::<DriverType>().map_err(|value| {
                ControllerError::InvalidDriverType {
                    key: resolved.key.clone(),
                    value,
                }
            })?;
            arguments.insert("driver_type", ArgValue::DriverType(driver_type));
        }

        match self.construct(&resolved, arguments)? {
            Component::StorageDriver(driver) => Ok(driver),
            other => Err(resolved.mismatch(ComponentRole::StorageDriver, other.role())),
        }
    }

    /// The DAL, built on first access.
    pub fn dal(&mut self) -> ControllerResult<&LocalDal> {
        let dal = match self.dal.take() {
            Some(dal) => dal,
            None => self.dal_instantiate()?,
        };
        Ok(self.dal.insert(dal))
    }

    // --- Entities ---

    /// The project's model, looked up through `model_id`.
    ///
    /// A found model is cached for the lifetime of the controller. While none
    /// is found the lookup is repeated on every call.
    pub fn model(&mut self) -> ControllerResult<Option<&Model>> {
        let model = match self.model.take() {
            Some(model) => Some(model),
            None => self.lookup_model()?,
        };
        self.model = model;
        Ok(self.model.as_ref())
    }

    fn lookup_model(&mut self) -> ControllerResult<Option<Model>> {
        let Some(id) = self.setting_id(MODEL_ID_KEY)? else {
            trace!("No model id set");
            return Ok(None);
        };
        let model = self.dal()?.models().get_by_id(&id)?;
        debug!(
            "Model '{}' {}",
            id,
            if model.is_some() { "resolved" } else { "not found" }
        );
        Ok(model)
    }

    /// The current session, looked up through `current_session_id`. Cached
    /// like [`Controller::model`].
    ///
    /// # Errors
    /// [`ControllerError::ModelNotInitialized`] if the project has no model.
    pub fn current_session(&mut self) -> ControllerResult<Option<&Session>> {
        if self.model()?.is_none() {
            return Err(ControllerError::ModelNotInitialized {
                home: self.home.clone(),
            });
        }
        let session = match self.current_session.take() {
            Some(session) => Some(session),
            None => match self.setting_id(CURRENT_SESSION_ID_KEY)? {
                Some(id) => self.dal()?.sessions().get_by_id(&id)?,
                None => None,
            },
        };
        self.current_session = session;
        Ok(self.current_session.as_ref())
    }

    /// A non-empty id stored under `key`.
    fn setting_id(&self, key: &str) -> ControllerResult<Option<String>> {
        Ok(self
            .settings
            .get(key)?
            .as_ref()
            .and_then(SettingValue::as_text)
            .filter(|id| !id.is_empty())
            .map(str::to_string))
    }

    // --- Initialization ---

    /// Whether the project is fully set up: code, environment and file drivers
    /// all initialized, and a model present.
    ///
    /// Re-checked on each call until it first holds; from then on it is reported
    /// as initialized without checking again.
    pub fn is_initialized(&mut self) -> ControllerResult<bool> {
        if !self.initialization.is_initialized() {
            let ready = self.code_driver()?.is_initialized()
                && self.environment_driver()?.is_initialized()
                && self.file_driver()?.is_initialized()
                && self.model()?.is_some();
            self.initialization = self.initialization.advance(ready);
            if self.initialization.is_initialized() {
                info!("Project at '{}' is initialized", self.home.display());
            }
        }
        Ok(self.initialization.is_initialized())
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("home", &self.home)
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("dal_driver", &self.dal_driver)
            .field("dal", &self.dal.is_some())
            .field("model", &self.model)
            .field("current_session", &self.current_session)
            .field("code_driver", &self.code_driver)
            .field("file_driver", &self.file_driver)
            .field("environment_driver", &self.environment_driver)
            .field("initialization", &self.initialization)
            .finish()
    }
}

fn canonical_home(home: &Path) -> ControllerResult<PathBuf> {
    let invalid = || ControllerError::InvalidProjectPath {
        path: home.to_path_buf(),
    };
    if !home.is_dir() {
        return Err(invalid());
    }
    dunce::canonicalize(home).map_err(|_| invalid())
}
