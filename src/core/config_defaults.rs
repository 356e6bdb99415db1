// src/core/config_defaults.rs

//! Built-in descriptors, one per configurable component. A project overrides any
//! of them by storing a descriptor under the same key in its settings.

use crate::constants::{DATABASE_DIRNAME, DATMO_DIR};
use crate::core::registry::ComponentKind;
use crate::models::{Descriptor, DriverType, OptionValue, Options};
use std::path::Path;

/// Key of the version control driver descriptor.
pub const CODE_DRIVER_KEY: &str = "controller.code.driver";
/// Key of the file driver descriptor.
pub const FILE_DRIVER_KEY: &str = "controller.file.driver";
/// Key of the environment driver descriptor.
pub const ENVIRONMENT_DRIVER_KEY: &str = "controller.environment.driver";
/// Key of the data-access layer descriptor.
pub const DAL_KEY: &str = "storage.local";
/// Key of the storage driver descriptor.
pub const STORAGE_DRIVER_KEY: &str = "storage.local.driver";

/// One row of the defaults table.
struct ConfigDefault {
    key: &'static str,
    kind: ComponentKind,
    options: fn(&Path) -> Options,
}

static CONFIG_DEFAULTS: &[ConfigDefault] = &[
    ConfigDefault {
        key: CODE_DRIVER_KEY,
        kind: ComponentKind::GitCode,
        options: |home| {
            options(&[
                ("filepath", path_text(home)),
                ("execpath", "git".into()),
            ])
        },
    },
    ConfigDefault {
        key: FILE_DRIVER_KEY,
        kind: ComponentKind::LocalFile,
        options: |home| options(&[("filepath", path_text(home))]),
    },
    ConfigDefault {
        key: ENVIRONMENT_DRIVER_KEY,
        kind: ComponentKind::DockerEnvironment,
        options: |home| {
            options(&[
                ("filepath", path_text(home)),
                ("execpath", "docker".into()),
                ("socket", "unix:///var/run/docker.sock".into()),
            ])
        },
    },
    ConfigDefault {
        key: DAL_KEY,
        kind: ComponentKind::LocalDal,
        // Placeholder: replaced by the live storage driver before construction.
        options: |_| options(&[("driver", STORAGE_DRIVER_KEY.into())]),
    },
    ConfigDefault {
        key: STORAGE_DRIVER_KEY,
        kind: ComponentKind::DocumentStore,
        options: |home| {
            options(&[
                ("driver_type", DriverType::File.as_str().into()),
                (
                    "connection_string",
                    path_text(&home.join(DATMO_DIR).join(DATABASE_DIRNAME)),
                ),
            ])
        },
    },
];

/// All keys of the defaults table, in table order.
pub fn config_keys() -> impl Iterator<Item = &'static str> {
    CONFIG_DEFAULTS.iter().map(|d| d.key)
}

/// The default descriptor for `key` in the project rooted at `home`.
pub fn default_descriptor(key: &str, home: &Path) -> Option<Descriptor> {
    CONFIG_DEFAULTS
        .iter()
        .find(|d| d.key == key)
        .map(|d| Descriptor::new(d.kind.identifier(), (d.options)(home)))
}

fn options(pairs: &[(&str, OptionValue)]) -> Options {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn path_text(path: &Path) -> OptionValue {
    OptionValue::Text(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_table_has_five_entries() {
        let keys: Vec<_> = config_keys().collect();
        assert_eq!(
            keys,
            vec![
                CODE_DRIVER_KEY,
                FILE_DRIVER_KEY,
                ENVIRONMENT_DRIVER_KEY,
                DAL_KEY,
                STORAGE_DRIVER_KEY
            ]
        );
    }

    #[test]
    fn test_default_descriptors_use_home() {
        let home = Path::new("/srv/project");

        let code = default_descriptor(CODE_DRIVER_KEY, home).unwrap();
        assert_eq!(code.identifier, "code.git");
        assert_eq!(code.options.get("filepath"), Some(&"/srv/project".into()));
        assert_eq!(code.options.get("execpath"), Some(&"git".into()));

        let env = default_descriptor(ENVIRONMENT_DRIVER_KEY, home).unwrap();
        assert_eq!(
            env.options.get("socket"),
            Some(&"unix:///var/run/docker.sock".into())
        );

        let storage = default_descriptor(STORAGE_DRIVER_KEY, home).unwrap();
        assert_eq!(storage.options.get("driver_type"), Some(&"FILE".into()));
        let connection = storage
            .options
            .get("connection_string")
            .and_then(|v| v.as_text())
            .unwrap();
        assert!(Path::new(connection).ends_with(".datmo/database"));

        let dal = default_descriptor(DAL_KEY, home).unwrap();
        assert_eq!(dal.options.get("driver"), Some(&STORAGE_DRIVER_KEY.into()));
    }

    #[test]
    fn test_unknown_key_has_no_default() {
        assert_eq!(default_descriptor("controller.task.driver", Path::new("/")), None);
    }
}
