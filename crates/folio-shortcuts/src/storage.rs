//! Persistence of user shortcut customizations.
//!
//! Storage is pluggable through [`StorageBackend`]: the manager talks JSON
//! strings, the backend decides where they live. [`JsonFileStore`] writes a
//! config file atomically; [`MemoryStore`] backs tests and ephemeral
//! sessions. Malformed stored data never propagates an error to startup:
//! the config is discarded with a warning and defaults apply.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use folio_keys::{
    KeyCombination, DEFAULT_DOUBLE_PRESS_INTERVAL_MS, DEFAULT_SEQUENCE_INTERVAL_MS,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::action::ShortcutConfig;

/// Schema version stamped into every stored config.
pub const CONFIG_VERSION: &str = "1.0.0";

// ============================================================================
// Stored data model
// ============================================================================

/// Global shortcut preferences, stored alongside the bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Master switch for the whole shortcut system.
    pub enable_global: bool,
    /// Whether double-press gestures are recognized.
    pub enable_double_press: bool,
    /// Default double-press window in milliseconds.
    pub double_press_interval: u64,
    /// Default sequence inter-step window in milliseconds.
    pub key_sequence_interval: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enable_global: true,
            enable_double_press: true,
            double_press_interval: DEFAULT_DOUBLE_PRESS_INTERVAL_MS,
            key_sequence_interval: DEFAULT_SEQUENCE_INTERVAL_MS,
        }
    }
}

/// The persisted slice of one binding's state.
///
/// Only what the user can change is stored; names, categories, and defaults
/// come from the registration and are re-resolved on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredShortcut {
    /// The bound combination.
    pub keys: KeyCombination,
    /// Whether the binding is enabled.
    pub enabled: bool,
    /// Whether `keys` differs from the shipped default.
    pub customized: bool,
}

impl StoredShortcut {
    /// Extract the persisted slice of a live config.
    pub fn from_config(config: &ShortcutConfig) -> Self {
        Self {
            keys: config.keys.clone(),
            enabled: config.enabled,
            customized: config.customized,
        }
    }
}

/// The complete stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    /// Schema version.
    pub version: String,
    /// RFC 3339 timestamp of the last save.
    pub last_modified: String,
    /// Per-action stored state, keyed by action id.
    pub shortcuts: HashMap<String, StoredShortcut>,
    /// Global preferences.
    #[serde(default)]
    pub preferences: Preferences,
}

impl StoredConfig {
    /// An empty config at the current schema version.
    pub fn empty() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            last_modified: Utc::now().to_rfc3339(),
            shortcuts: HashMap::new(),
            preferences: Preferences::default(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error type for storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The backend failed to read or write.
    Backend(String),
    /// Stored or exported JSON could not be processed.
    Serialize(serde_json::Error),
    /// A filesystem operation failed.
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
            Self::Serialize(err) => write!(f, "config serialization error: {err}"),
            Self::Io(err) => write!(f, "config I/O error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(_) => None,
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

// ============================================================================
// Backends
// ============================================================================

/// Where serialized config documents live.
pub trait StorageBackend: Send {
    /// Read the stored document, if any.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Write the document, replacing any previous one.
    fn store(&self, data: &str) -> Result<(), StorageError>;

    /// Delete the stored document, if any.
    fn remove(&self) -> Result<(), StorageError>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Option<String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.data.read().clone())
    }

    fn store(&self, data: &str) -> Result<(), StorageError> {
        *self.data.write() = Some(data.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.data.write() = None;
        Ok(())
    }
}

/// File backend that writes atomically via a temp file and rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, data: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write-then-rename so a crash mid-write never truncates the config.
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// Config storage
// ============================================================================

/// Envelope written by [`ConfigStorage::export`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    /// Version of the application that produced the export.
    pub app_version: String,
    /// The exported config.
    pub config: StoredConfig,
}

/// Loads, saves, and migrates stored shortcut configuration.
pub struct ConfigStorage {
    backend: Box<dyn StorageBackend>,
}

impl ConfigStorage {
    /// Create storage over the given backend.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Load the stored config.
    ///
    /// Returns `None` when nothing is stored or the stored data is
    /// unreadable; corruption is logged and treated as absence so startup
    /// always succeeds with defaults.
    pub fn load(&self) -> Option<StoredConfig> {
        let raw = match self.backend.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(target: "folio::storage", %err, "failed to read stored config");
                return None;
            }
        };
        match serde_json::from_str::<StoredConfig>(&raw) {
            Ok(config) => Some(self.migrate(config)),
            Err(err) => {
                warn!(target: "folio::storage", %err, "stored config is malformed, using defaults");
                None
            }
        }
    }

    /// Save the config, stamping the modification time.
    ///
    /// Returns `false` on failure; a failed save is logged and never
    /// interrupts the caller.
    pub fn save(&self, config: &mut StoredConfig) -> bool {
        config.version = CONFIG_VERSION.to_string();
        config.last_modified = Utc::now().to_rfc3339();
        let serialized = match serde_json::to_string_pretty(config) {
            Ok(serialized) => serialized,
            Err(err) => {
                error!(target: "folio::storage", %err, "failed to serialize config");
                return false;
            }
        };
        if let Err(err) = self.backend.store(&serialized) {
            error!(target: "folio::storage", %err, "failed to save config");
            return false;
        }
        true
    }

    /// Delete the stored config.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove()
    }

    /// Serialize the config into a portable export envelope.
    pub fn export(&self, config: &StoredConfig) -> Result<String, StorageError> {
        let envelope = ExportEnvelope {
            exported_at: Utc::now().to_rfc3339(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            config: config.clone(),
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Parse an export envelope back into a config.
    ///
    /// Accepts both the envelope form and a bare [`StoredConfig`] document
    /// so hand-edited files import too.
    pub fn import(&self, data: &str) -> Result<StoredConfig, StorageError> {
        if let Ok(envelope) = serde_json::from_str::<ExportEnvelope>(data) {
            return Ok(self.migrate(envelope.config));
        }
        let config = serde_json::from_str::<StoredConfig>(data)?;
        Ok(self.migrate(config))
    }

    fn migrate(&self, mut config: StoredConfig) -> StoredConfig {
        if config.version != CONFIG_VERSION {
            warn!(
                target: "folio::storage",
                from = %config.version,
                to = CONFIG_VERSION,
                "migrating stored config"
            );
            config.version = CONFIG_VERSION.to_string();
        }
        config
    }
}

impl fmt::Debug for ConfigStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStorage").finish_non_exhaustive()
    }
}

/// Merge an imported config over the current one.
///
/// Imported entries win per action id; entries only present in `current`
/// are kept. Preferences come wholesale from the import.
pub fn merge_configs(current: &StoredConfig, imported: &StoredConfig) -> StoredConfig {
    let mut shortcuts = current.shortcuts.clone();
    for (id, stored) in &imported.shortcuts {
        shortcuts.insert(id.clone(), stored.clone());
    }
    StoredConfig {
        version: CONFIG_VERSION.to_string(),
        last_modified: Utc::now().to_rfc3339(),
        shortcuts,
        preferences: imported.preferences.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_keys::Key;

    fn sample_config() -> StoredConfig {
        let mut config = StoredConfig::empty();
        config.shortcuts.insert(
            "save".to_string(),
            StoredShortcut {
                keys: KeyCombination::ctrl(Key::S),
                enabled: true,
                customized: true,
            },
        );
        config.preferences.enable_double_press = false;
        config
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = ConfigStorage::new(Box::new(MemoryStore::new()));
        let mut config = sample_config();
        assert!(storage.save(&mut config));

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.shortcuts, config.shortcuts);
        assert_eq!(loaded.preferences, config.preferences);
        assert_eq!(loaded.version, CONFIG_VERSION);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shortcuts.json");
        let storage = ConfigStorage::new(Box::new(JsonFileStore::new(&path)));

        let mut config = sample_config();
        assert!(storage.save(&mut config));
        assert!(path.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.shortcuts, config.shortcuts);

        storage.clear().unwrap();
        assert!(!path.exists());
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_malformed_data_loads_as_none() {
        let store = MemoryStore::new();
        store.store("{not json").unwrap();
        let storage = ConfigStorage::new(Box::new(store));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage =
            ConfigStorage::new(Box::new(JsonFileStore::new(dir.path().join("absent.json"))));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_version_migration() {
        let store = MemoryStore::new();
        let mut old = sample_config();
        old.version = "0.9.0".to_string();
        store.store(&serde_json::to_string(&old).unwrap()).unwrap();

        let storage = ConfigStorage::new(Box::new(store));
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.version, CONFIG_VERSION);
        assert_eq!(loaded.shortcuts, old.shortcuts);
    }

    #[test]
    fn test_export_import_round_trip() {
        let storage = ConfigStorage::new(Box::new(MemoryStore::new()));
        let config = sample_config();

        let exported = storage.export(&config).unwrap();
        let imported = storage.import(&exported).unwrap();
        assert_eq!(imported.shortcuts, config.shortcuts);
        assert_eq!(imported.preferences, config.preferences);

        // A bare config document imports too.
        let bare = serde_json::to_string(&config).unwrap();
        let imported = storage.import(&bare).unwrap();
        assert_eq!(imported.shortcuts, config.shortcuts);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let storage = ConfigStorage::new(Box::new(MemoryStore::new()));
        assert!(storage.import("[]").is_err());
    }

    #[test]
    fn test_merge_favors_imported() {
        let mut current = StoredConfig::empty();
        current.shortcuts.insert(
            "save".to_string(),
            StoredShortcut {
                keys: KeyCombination::ctrl(Key::S),
                enabled: true,
                customized: false,
            },
        );
        current.shortcuts.insert(
            "local.only".to_string(),
            StoredShortcut {
                keys: KeyCombination::ctrl(Key::L),
                enabled: true,
                customized: true,
            },
        );

        let mut imported = StoredConfig::empty();
        imported.shortcuts.insert(
            "save".to_string(),
            StoredShortcut {
                keys: KeyCombination::ctrl(Key::D),
                enabled: false,
                customized: true,
            },
        );
        imported.preferences.enable_double_press = false;

        let merged = merge_configs(&current, &imported);
        assert_eq!(merged.shortcuts.len(), 2);
        assert_eq!(
            merged.shortcuts["save"].keys,
            KeyCombination::ctrl(Key::D)
        );
        assert!(merged.shortcuts.contains_key("local.only"));
        assert!(!merged.preferences.enable_double_press);
    }

    #[test]
    fn test_stored_json_shape() {
        let mut config = StoredConfig::empty();
        config.shortcuts.insert(
            "search.open".to_string(),
            StoredShortcut {
                keys: KeyCombination::double_press(Key::Shift),
                enabled: true,
                customized: false,
            },
        );
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("lastModified").is_some());
        let entry = &json["shortcuts"]["search.open"];
        assert_eq!(entry["keys"]["type"], "double");
        assert_eq!(entry["keys"]["intervalMs"], 500);
    }
}
