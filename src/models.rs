// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::ENTITY_ID_BYTES;

// --- DESCRIPTOR MODELS (What is stored in the project settings) ---

/// A single construction option. Uses `untagged` so settings stay readable
/// when edited by hand.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Float(f64),
    /// Any textual value: paths, executables, enum names.
    Text(String),
    /// Anything else (arrays, tables, dates), kept as written.
    Other(toml::Value),
}

impl OptionValue {
    /// Returns the inner string for `Text` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "\"{}\"", value),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Construction options of a component, keyed by option name.
pub type Options = BTreeMap<String, OptionValue>;

/// Names a component to construct and the options to construct it with.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// The registry identifier of the component (e.g. `code.git`).
    pub identifier: String,
    /// Options passed verbatim to the component's constructor.
    #[serde(default)]
    pub options: Options,
}

impl Descriptor {
    /// Creates a descriptor from an identifier and its options.
    pub fn new(identifier: impl Into<String>, options: Options) -> Self {
        Self {
            identifier: identifier.into(),
            options,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.identifier)?;
        for (i, (name, value)) in self.options.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}: {}", sep, name, value)?;
        }
        write!(f, " }}")
    }
}

/// A value in the project settings: a plain id, a descriptor, or anything
/// else a hand edit left there. Only the key being read judges its value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    /// A scalar value, such as `model_id`.
    Text(String),
    /// A component descriptor, stored under its config key.
    Descriptor(Descriptor),
    /// Any other value, kept as written.
    Other(toml::Value),
}

impl SettingValue {
    /// Returns the inner string for `Text` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Descriptor(_) | Self::Other(_) => None,
        }
    }
}

impl From<Descriptor> for SettingValue {
    fn from(descriptor: Descriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// --- STORAGE MODELS ---

/// The backend used by the document store.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverType {
    /// Documents are persisted as JSON files under the connection string.
    File,
    /// Documents live only as long as the driver instance.
    Memory,
}

impl DriverType {
    /// The name used for this type in settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Memory => "MEMORY",
        }
    }
}

impl FromStr for DriverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FILE" => Ok(Self::File),
            "MEMORY" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- ENTITY MODELS ---

/// The project's model record.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Unique id of the record.
    pub id: String,
    /// Human readable project name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last update time, milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl Model {
    /// Creates a new model record with a fresh id.
    pub fn new(name: &str, description: &str) -> Self {
        let now = now_millis();
        Self {
            id: generate_entity_id("model", name, now),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A working session that belongs to a model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Unique id of the record.
    pub id: String,
    /// Id of the owning model.
    pub model_id: String,
    /// Session name.
    pub name: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Session {
    /// Creates a new session for `model_id` with a fresh id.
    pub fn new(model_id: &str, name: &str) -> Self {
        let now = now_millis();
        Self {
            id: generate_entity_id("session", &format!("{}/{}", model_id, name), now),
            model_id: model_id.to_string(),
            name: name.to_string(),
            created_at: now,
        }
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Derives an entity id from its kind, a discriminating name and a timestamp.
fn generate_entity_id(kind: &str, name: &str, timestamp: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_bytes());
    hasher.update(name.as_bytes());
    hasher.update(&timestamp.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    let hash = hasher.finalize();
    hex::encode(hash.as_bytes().get(..ENTITY_ID_BYTES).unwrap_or(hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_value_untagged_roundtrip_through_toml() {
        let mut options = Options::new();
        options.insert("driver_type".to_string(), "MEMORY".into());
        options.insert("retries".to_string(), OptionValue::Integer(3));
        let mut settings = BTreeMap::new();
        settings.insert("model_id".to_string(), SettingValue::from("abc"));
        settings.insert(
            "storage.local.driver".to_string(),
            SettingValue::from(Descriptor::new("storage.local.document_store", options)),
        );

        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: BTreeMap<String, SettingValue> = toml::from_str(&text).unwrap();

        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_driver_type_parses_settings_names() {
        assert_eq!("FILE".parse::<DriverType>(), Ok(DriverType::File));
        assert_eq!("MEMORY".parse::<DriverType>(), Ok(DriverType::Memory));
        assert!("memory".parse::<DriverType>().is_err());
    }

    #[test]
    fn test_entity_ids_are_hex_and_distinct_per_kind() {
        let model = Model::new("demo", "");
        let session = Session::new(&model.id, "default");

        assert_eq!(model.id.len(), ENTITY_ID_BYTES * 2);
        assert!(model.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(model.id, session.id);
        assert_eq!(session.model_id, model.id);
    }
}
