// src/constants.rs

/// The name of the hidden directory holding datmo state inside a project.
pub const DATMO_DIR: &str = ".datmo";

/// The name of the project settings file (inside .datmo/).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// The directory used by the default storage driver (inside .datmo/).
pub const DATABASE_DIRNAME: &str = "database";

/// The directory managed by the local file driver (inside .datmo/).
pub const FILES_DIRNAME: &str = "files";

/// Settings key holding the id of the project's model record.
pub const MODEL_ID_KEY: &str = "model_id";

/// Settings key holding the id of the active session.
pub const CURRENT_SESSION_ID_KEY: &str = "current_session_id";

/// Name given to the session created alongside a new model.
pub const DEFAULT_SESSION_NAME: &str = "default";

/// Number of hash bytes kept for entity ids (20 bytes = 40 hex characters).
pub const ENTITY_ID_BYTES: usize = 20;
