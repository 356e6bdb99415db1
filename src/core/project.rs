// src/core/project.rs

//! Project lifecycle on top of the [`Controller`]: setting a project up,
//! reporting its state and removing what datmo created.

use crate::constants::{CURRENT_SESSION_ID_KEY, DEFAULT_SESSION_NAME, MODEL_ID_KEY};
use crate::core::config_defaults;
use crate::core::controller::{Controller, ControllerError, ResolvedDescriptor};
use crate::models::{Model, Session, now_millis};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// A snapshot of a project's state.
#[derive(Debug, Clone)]
pub struct ProjectStatus {
    /// The project directory.
    pub home: PathBuf,
    /// The project's model, if it has been initialized.
    pub model: Option<Model>,
    /// The current session, when a model exists.
    pub current_session: Option<Session>,
    /// Whether every driver is set up and a model exists.
    pub is_initialized: bool,
    /// The effective descriptor of every configuration key.
    pub config: Vec<ResolvedDescriptor>,
}

/// Drives the lifecycle of one project.
#[derive(Debug)]
pub struct ProjectController {
    controller: Controller,
}

impl ProjectController {
    /// Opens the project at `home` with its on-disk settings.
    pub fn open(home: impl AsRef<Path>) -> Result<Self, ControllerError> {
        Ok(Self::new(Controller::open(home)?))
    }

    /// Wraps an already opened controller.
    pub fn new(controller: Controller) -> Self {
        Self { controller }
    }

    /// The underlying controller.
    pub fn controller(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Sets the project up: initializes every driver, creates (or renames) the
    /// model and makes sure a current session exists.
    ///
    /// Ids are persisted in the settings. When the model already existed, the
    /// controller keeps the copy it cached before the rename.
    pub fn init(&mut self, name: &str, description: &str) -> Result<Model, ControllerError> {
        info!(
            "Initializing project '{}' at '{}'",
            name,
            self.controller.home().display()
        );
        self.controller.code_driver()?.init()?;
        self.controller.file_driver()?.init()?;
        self.controller.environment_driver()?.init()?;

        let existing = self.controller.model()?.cloned();
        let dal = self.controller.dal()?.clone();

        let model = match existing {
            Some(mut model) => {
                debug!("Updating existing model '{}'", model.id);
                model.name = name.to_string();
                model.description = description.to_string();
                model.updated_at = now_millis();
                dal.models().update(&model)?;
                model
            }
            None => {
                let model = Model::new(name, description);
                debug!("Creating model '{}'", model.id);
                dal.models().create(&model)?;
                model
            }
        };
        self.controller
            .settings_mut()
            .set(MODEL_ID_KEY, model.id.clone().into())?;

        let current = match self.controller.settings().get(CURRENT_SESSION_ID_KEY)? {
            Some(value) => match value.as_text() {
                Some(id) => dal.sessions().get_by_id(id)?,
                None => None,
            },
            None => None,
        }
        .filter(|session| session.model_id == model.id);

        let session = match current {
            Some(session) => session,
            None => {
                let existing = dal
                    .sessions()
                    .query(|s| s.model_id == model.id && s.name == DEFAULT_SESSION_NAME)?;
                match existing.into_iter().next() {
                    Some(session) => session,
                    None => {
                        let session = Session::new(&model.id, DEFAULT_SESSION_NAME);
                        debug!("Creating session '{}'", session.id);
                        dal.sessions().create(&session)?;
                        session
                    }
                }
            }
        };
        self.controller
            .settings_mut()
            .set(CURRENT_SESSION_ID_KEY, session.id.into())?;

        Ok(model)
    }

    /// Reports the project's state. Resolving the configuration stores the
    /// default descriptor of every key that has none yet.
    pub fn status(&mut self) -> Result<ProjectStatus, ControllerError> {
        let config = config_defaults::config_keys()
            .map(|key| self.controller.config_loader(key))
            .collect::<Result<Vec<_>, _>>()?;

        let model = self.controller.model()?.cloned();
        let current_session = match model {
            Some(_) => self.controller.current_session()?.cloned(),
            None => None,
        };
        let is_initialized = self.controller.is_initialized()?;

        Ok(ProjectStatus {
            home: self.controller.home().to_path_buf(),
            model,
            current_session,
            is_initialized,
            config,
        })
    }

    /// Removes the project's datmo directory. Returns whether anything was
    /// removed.
    pub fn cleanup(&mut self) -> Result<bool, ControllerError> {
        let removed = self.controller.file_driver()?.cleanup()?;
        if removed {
            info!("Removed datmo files from '{}'", self.controller.home().display());
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{Component, ComponentKind, ComponentRegistry};
    use crate::core::settings::ProjectSettings;
    use crate::drivers::{CodeDriver, DriverError, EnvironmentDriver};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::tempdir;

    /// Stands in for git and docker, which may be missing on the test host.
    #[derive(Debug)]
    struct StubDriver(Rc<Cell<bool>>);

    impl CodeDriver for StubDriver {
        fn is_initialized(&self) -> bool {
            self.0.get()
        }
        fn init(&self) -> Result<(), DriverError> {
            self.0.set(true);
            Ok(())
        }
    }

    impl EnvironmentDriver for StubDriver {
        fn is_initialized(&self) -> bool {
            self.0.get()
        }
        fn init(&self) -> Result<(), DriverError> {
            self.0.set(true);
            Ok(())
        }
    }

    /// A project on disk whose code and environment drivers are stubbed.
    fn open_project(home: &Path, ready: &Rc<Cell<bool>>) -> ProjectController {
        let mut registry = ComponentRegistry::builtin();
        let flag = Rc::clone(ready);
        registry.register(ComponentKind::GitCode, move |_| {
            Ok(Component::Code(Box::new(StubDriver(Rc::clone(&flag)))))
        });
        let flag = Rc::clone(ready);
        registry.register(ComponentKind::DockerEnvironment, move |_| {
            Ok(Component::Environment(Box::new(StubDriver(Rc::clone(&flag)))))
        });
        let controller = Controller::with_parts(
            home,
            Box::new(ProjectSettings::open(home)),
            registry,
            None,
        )
        .unwrap();
        ProjectController::new(controller)
    }

    #[test]
    fn test_status_of_fresh_project() {
        let home = tempdir().unwrap();
        let ready = Rc::new(Cell::new(false));
        let mut project = open_project(home.path(), &ready);

        let status = project.status().unwrap();
        assert!(status.model.is_none());
        assert!(status.current_session.is_none());
        assert!(!status.is_initialized);
        let keys: Vec<_> = status.config.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, config_defaults::config_keys().collect::<Vec<_>>());
        // Resolving seeded the settings file.
        assert!(home.path().join(".datmo").join("settings.toml").is_file());
    }

    #[test]
    fn test_init_creates_model_and_default_session() {
        let home = tempdir().unwrap();
        let ready = Rc::new(Cell::new(false));
        let mut project = open_project(home.path(), &ready);

        let model = project.init("demo", "a test project").unwrap();
        assert!(ready.get());
        assert!(home.path().join(".datmo").join("files").is_dir());
        assert!(home.path().join(".datmo").join("database").join("model.json").is_file());

        let mut reopened = open_project(home.path(), &ready);
        let status = reopened.status().unwrap();
        assert_eq!(status.model.as_ref(), Some(&model));
        let session = status.current_session.unwrap();
        assert_eq!(session.model_id, model.id);
        assert_eq!(session.name, DEFAULT_SESSION_NAME);
        assert!(status.is_initialized);
    }

    #[test]
    fn test_init_twice_updates_model_and_keeps_session() {
        let home = tempdir().unwrap();
        let ready = Rc::new(Cell::new(false));

        let first = open_project(home.path(), &ready).init("demo", "").unwrap();
        let session_id = {
            let mut project = open_project(home.path(), &ready);
            project.status().unwrap().current_session.unwrap().id
        };

        let second = open_project(home.path(), &ready)
            .init("renamed", "new description")
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "renamed");

        let mut project = open_project(home.path(), &ready);
        let status = project.status().unwrap();
        assert_eq!(status.model.map(|m| m.description), Some("new description".to_string()));
        assert_eq!(status.current_session.map(|s| s.id), Some(session_id));
        let sessions = project
            .controller()
            .dal()
            .unwrap()
            .sessions()
            .query(|_| true)
            .unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_cleanup_removes_datmo_directory() {
        let home = tempdir().unwrap();
        let ready = Rc::new(Cell::new(false));
        let mut project = open_project(home.path(), &ready);

        project.init("demo", "").unwrap();
        assert!(project.cleanup().unwrap());
        assert!(!home.path().join(".datmo").exists());
        assert!(home.path().is_dir());
        assert!(!project.cleanup().unwrap());
    }

    #[test]
    fn test_status_after_init_on_same_instance() {
        let home = tempdir().unwrap();
        let ready = Rc::new(Cell::new(false));
        let mut project = open_project(home.path(), &ready);
        assert!(!project.status().unwrap().is_initialized);

        let model = project.init("demo", "").unwrap();
        let status = project.status().unwrap();
        assert_eq!(status.model.as_ref(), Some(&model));
        assert_eq!(
            status.current_session.map(|s| s.name),
            Some(DEFAULT_SESSION_NAME.to_string())
        );
        assert!(status.is_initialized);
    }
}
