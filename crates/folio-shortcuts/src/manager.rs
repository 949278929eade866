//! The shortcut manager: registration, customization, persistence, dispatch.
//!
//! [`ShortcutManager`] ties the other modules together. Components register
//! [`ShortcutAction`]s at startup; the manager validates each binding,
//! settles conflicts by priority, overlays any stored user customization,
//! and arms the detector. At runtime the host forwards key events through
//! [`handle_key_down`](ShortcutManager::handle_key_down); user edits go
//! through [`update_shortcut`](ShortcutManager::update_shortcut) and friends
//! and are persisted as they happen.

use std::collections::HashMap;

use folio_keys::{KeyCombination, Platform};
use tracing::{debug, info, warn};

use crate::action::{ShortcutAction, ShortcutConfig, ShortcutHandler};
use crate::conflict::{self, ConflictInfo, Resolution};
use crate::detector::{DispatchOutcome, KeyDetector};
use crate::event::KeyEvent;
use crate::storage::{
    merge_configs, ConfigStorage, Preferences, StorageBackend, StorageError, StoredConfig,
    StoredShortcut,
};
use crate::validator::{self, ValidationError};

/// Result of a user rebinding attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Whether the new binding was applied.
    pub success: bool,
    /// Enabled bindings that blocked the change, when any.
    pub conflicts: Vec<ConflictInfo>,
    /// The validation failure, when the combination itself was rejected.
    pub error: Option<ValidationError>,
}

impl UpdateOutcome {
    fn applied() -> Self {
        Self { success: true, conflicts: Vec::new(), error: None }
    }

    fn blocked(conflicts: Vec<ConflictInfo>) -> Self {
        Self { success: false, conflicts, error: None }
    }

    fn invalid(error: ValidationError) -> Self {
        Self { success: false, conflicts: Vec::new(), error: Some(error) }
    }

    fn rejected() -> Self {
        Self { success: false, conflicts: Vec::new(), error: None }
    }
}

/// Central registry and dispatcher for keyboard shortcuts.
pub struct ShortcutManager {
    platform: Platform,
    configs: HashMap<String, ShortcutConfig>,
    order: Vec<String>,
    handlers: HashMap<String, ShortcutHandler>,
    detector: KeyDetector,
    storage: ConfigStorage,
    stored: StoredConfig,
    enabled: bool,
    destroyed: bool,
}

impl ShortcutManager {
    /// Create a manager for the current platform.
    ///
    /// Loads any stored customization from the backend; malformed or absent
    /// stored data falls back to defaults.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_platform(backend, Platform::current())
    }

    /// Create a manager for an explicit platform.
    pub fn with_platform(backend: Box<dyn StorageBackend>, platform: Platform) -> Self {
        let storage = ConfigStorage::new(backend);
        let stored = storage.load().unwrap_or_else(StoredConfig::empty);

        let mut detector = KeyDetector::new();
        detector.set_double_press_enabled(stored.preferences.enable_double_press);

        let enabled = stored.preferences.enable_global;
        if enabled {
            detector.start();
        }

        Self {
            platform,
            configs: HashMap::new(),
            order: Vec::new(),
            handlers: HashMap::new(),
            detector,
            storage,
            stored,
            enabled,
            destroyed: false,
        }
    }

    /// The platform bindings are normalized for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Current global preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.stored.preferences
    }

    /// Replace the global preferences and persist them.
    pub fn set_preferences(&mut self, preferences: Preferences) {
        if self.destroyed {
            return;
        }
        self.detector
            .set_double_press_enabled(preferences.enable_double_press);
        if preferences.enable_global != self.enabled {
            if preferences.enable_global {
                self.enable();
            } else {
                self.disable();
            }
        }
        self.stored.preferences = preferences;
        self.persist();
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register an action.
    ///
    /// The default binding is validated for the platform; any stored
    /// customization for the same id is applied on top. When the
    /// resulting binding collides with an existing enabled one, priority
    /// decides which side ends up disabled. Returns `false` when the
    /// registration is rejected outright (duplicate id, invalid binding, or
    /// a destroyed manager).
    pub fn register(&mut self, action: ShortcutAction) -> bool {
        if self.destroyed {
            warn!(target: "folio::shortcuts", id = %action.id, "register on destroyed manager");
            return false;
        }
        if self.configs.contains_key(&action.id) {
            warn!(target: "folio::shortcuts", id = %action.id, "duplicate registration rejected");
            return false;
        }

        let mut config = ShortcutConfig::from_action(&action);
        let validation = validator::validate(&config.keys, self.platform);
        if !validation.valid {
            warn!(
                target: "folio::shortcuts",
                id = %config.id,
                error = %validation.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                "default binding rejected"
            );
            return false;
        }
        if let Some(warning) = validation.warning {
            debug!(target: "folio::shortcuts", id = %config.id, %warning, "binding warning");
        }

        self.apply_stored_override(&mut config);
        self.settle_registration_conflicts(&mut config);

        let id = config.id.clone();
        if config.enabled {
            self.detector
                .register(id.clone(), config.keys.clone(), action.handler.clone());
        }
        self.handlers.insert(id.clone(), action.handler);
        self.configs.insert(id.clone(), config);
        self.order.push(id);
        true
    }

    fn apply_stored_override(&self, config: &mut ShortcutConfig) {
        let Some(stored) = self.stored.shortcuts.get(&config.id) else {
            return;
        };
        if config.customizable && stored.customized {
            let validation = validator::validate(&stored.keys, self.platform);
            if validation.valid {
                config.keys = stored.keys.clone();
            } else {
                warn!(
                    target: "folio::shortcuts",
                    id = %config.id,
                    "stored binding no longer valid, using default"
                );
            }
        }
        config.enabled = stored.enabled;
        config.refresh_customized();
    }

    fn settle_registration_conflicts(&mut self, config: &mut ShortcutConfig) {
        if !config.enabled {
            return;
        }
        let conflicts = conflict::find_conflicts(&config.keys, self.configs.values(), None);
        if conflicts.is_empty() {
            return;
        }
        let in_use: Vec<KeyCombination> = self
            .configs
            .values()
            .filter(|c| c.enabled)
            .map(|c| c.keys.clone())
            .collect();
        let resolutions = conflict::resolve_conflicts(
            &config.id,
            &config.keys,
            config.priority,
            &conflicts,
            &in_use,
        );
        for resolution in resolutions {
            match resolution {
                Resolution::DisableCandidate => {
                    config.enabled = false;
                }
                Resolution::DisableExisting { id } => {
                    if let Some(existing) = self.configs.get_mut(&id) {
                        existing.enabled = false;
                        self.detector.unregister(&id);
                    }
                }
                // Ties favor the earlier registration; the newcomer yields
                // and the free variant goes into the log for the caller.
                Resolution::Suggest { id, alternative } => {
                    config.enabled = false;
                    warn!(
                        target: "folio::shortcuts",
                        id = %config.id,
                        existing = %id,
                        alternative = %alternative
                            .map(|keys| keys.to_string())
                            .unwrap_or_else(|| "none".to_string()),
                        "equal-priority conflict, new binding starts disabled"
                    );
                }
            }
        }
    }

    /// Remove an action entirely.
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.configs.remove(id).is_none() {
            return false;
        }
        self.handlers.remove(id);
        self.order.retain(|entry| entry != id);
        self.detector.unregister(id);
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Look up one action's live config.
    pub fn get_shortcut(&self, id: &str) -> Option<&ShortcutConfig> {
        self.configs.get(id)
    }

    /// All live configs, in registration order.
    pub fn all_shortcuts(&self) -> Vec<&ShortcutConfig> {
        self.order
            .iter()
            .filter_map(|id| self.configs.get(id))
            .collect()
    }

    /// Enabled bindings that collide with `keys`, excluding `exclude_id`.
    pub fn detect_conflicts(
        &self,
        keys: &KeyCombination,
        exclude_id: Option<&str>,
    ) -> Vec<ConflictInfo> {
        conflict::find_conflicts(keys, self.configs.values(), exclude_id)
    }

    /// Platform-appropriate display string for an action's current binding.
    pub fn display_string(&self, id: &str) -> Option<String> {
        self.configs
            .get(id)
            .map(|config| self.platform.display_string(&config.keys))
    }

    // ========================================================================
    // Customization
    // ========================================================================

    /// Rebind an action.
    ///
    /// The new combination must validate and must not collide with any
    /// other enabled binding; on conflict, nothing changes and the blockers
    /// are reported. A successful change is re-armed and persisted.
    pub fn update_shortcut(&mut self, id: &str, keys: KeyCombination) -> UpdateOutcome {
        if self.destroyed {
            return UpdateOutcome::rejected();
        }
        let Some(config) = self.configs.get(id) else {
            warn!(target: "folio::shortcuts", id, "update for unknown shortcut");
            return UpdateOutcome::rejected();
        };
        if !config.customizable {
            warn!(target: "folio::shortcuts", id, "shortcut is not customizable");
            return UpdateOutcome::rejected();
        }

        let validation = validator::validate(&keys, self.platform);
        if !validation.valid {
            let error = validation
                .error
                .unwrap_or(ValidationError::MissingModifier);
            return UpdateOutcome::invalid(error);
        }

        let conflicts = conflict::find_conflicts(&keys, self.configs.values(), Some(id));
        if !conflicts.is_empty() {
            return UpdateOutcome::blocked(conflicts);
        }

        let Some(config) = self.configs.get_mut(id) else {
            return UpdateOutcome::rejected();
        };
        config.keys = keys;
        config.refresh_customized();
        let enabled = config.enabled;
        let armed_keys = config.keys.clone();
        if enabled {
            if let Some(handler) = self.handlers.get(id) {
                self.detector.register(id, armed_keys, handler.clone());
            }
        }
        info!(target: "folio::shortcuts", id, "shortcut rebound");
        self.persist();
        UpdateOutcome::applied()
    }

    /// Enable a disabled binding. Re-checks conflicts before arming.
    pub fn enable_shortcut(&mut self, id: &str) -> bool {
        if self.destroyed || !self.configs.contains_key(id) {
            return false;
        }
        let keys = self.configs[id].keys.clone();
        if !conflict::find_conflicts(&keys, self.configs.values(), Some(id)).is_empty() {
            warn!(target: "folio::shortcuts", id, "cannot enable, binding conflicts");
            return false;
        }
        let Some(config) = self.configs.get_mut(id) else {
            return false;
        };
        config.enabled = true;
        if let Some(handler) = self.handlers.get(id) {
            self.detector.register(id, keys, handler.clone());
        }
        self.persist();
        true
    }

    /// Disable a binding. Dispatch stops immediately.
    pub fn disable_shortcut(&mut self, id: &str) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(config) = self.configs.get_mut(id) else {
            return false;
        };
        config.enabled = false;
        self.detector.unregister(id);
        self.persist();
        true
    }

    /// Restore an action's shipped default binding. Idempotent.
    pub fn reset_shortcut(&mut self, id: &str) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(config) = self.configs.get_mut(id) else {
            return false;
        };
        config.keys = config.default_keys.clone();
        config.customized = false;
        let enabled = config.enabled;
        let keys = config.keys.clone();
        if enabled {
            if let Some(handler) = self.handlers.get(id) {
                self.detector.register(id, keys, handler.clone());
            }
        }
        self.persist();
        true
    }

    /// Restore every action's shipped default binding.
    pub fn reset_all_shortcuts(&mut self) {
        if self.destroyed {
            return;
        }
        let ids: Vec<String> = self.order.clone();
        for id in &ids {
            if let Some(config) = self.configs.get_mut(id) {
                config.keys = config.default_keys.clone();
                config.customized = false;
                if config.enabled {
                    let keys = config.keys.clone();
                    if let Some(handler) = self.handlers.get(id) {
                        self.detector.register(id.clone(), keys, handler.clone());
                    }
                }
            }
        }
        info!(target: "folio::shortcuts", "all shortcuts reset to defaults");
        self.persist();
    }

    // ========================================================================
    // System switch and dispatch
    // ========================================================================

    /// Turn the whole system on. Idempotent.
    pub fn enable(&mut self) {
        if self.destroyed || self.enabled {
            return;
        }
        self.enabled = true;
        self.detector.start();
        for id in &self.order {
            let Some(config) = self.configs.get(id) else { continue };
            if config.enabled {
                if let Some(handler) = self.handlers.get(id) {
                    self.detector
                        .register(id.clone(), config.keys.clone(), handler.clone());
                }
            }
        }
        info!(target: "folio::shortcuts", "shortcut system enabled");
    }

    /// Turn the whole system off. Bindings are kept but nothing dispatches.
    pub fn disable(&mut self) {
        if self.destroyed || !self.enabled {
            return;
        }
        self.enabled = false;
        self.detector.stop();
        info!(target: "folio::shortcuts", "shortcut system disabled");
    }

    /// Check if the system is dispatching.
    pub fn is_system_enabled(&self) -> bool {
        self.enabled && !self.destroyed
    }

    /// Forward a keydown event from the host.
    pub fn handle_key_down(&mut self, event: &mut KeyEvent) -> DispatchOutcome {
        if self.destroyed || !self.enabled {
            return DispatchOutcome::Ignored;
        }
        self.detector.key_down(event)
    }

    /// Forward a keyup event from the host.
    pub fn handle_key_up(&mut self, event: &KeyEvent) {
        if self.destroyed || !self.enabled {
            return;
        }
        self.detector.key_up(event);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize the current configuration for backup or transfer.
    pub fn export_configuration(&self) -> Result<String, StorageError> {
        self.storage.export(&self.stored)
    }

    /// Apply an exported configuration over the current one and persist.
    ///
    /// Imported bindings are validated per action; invalid entries are
    /// skipped with a warning, everything else is applied and re-armed.
    pub fn import_configuration(&mut self, data: &str) -> Result<(), StorageError> {
        if self.destroyed {
            return Err(StorageError::Backend("manager is destroyed".to_string()));
        }
        let imported = self.storage.import(data)?;
        self.stored = merge_configs(&self.stored, &imported);
        self.detector
            .set_double_press_enabled(self.stored.preferences.enable_double_press);

        let ids: Vec<String> = self.order.clone();
        for id in &ids {
            let Some(stored) = self.stored.shortcuts.get(id).cloned() else {
                continue;
            };
            let Some(config) = self.configs.get_mut(id) else { continue };
            if config.customizable {
                let validation = validator::validate(&stored.keys, self.platform);
                if validation.valid {
                    config.keys = stored.keys;
                } else {
                    warn!(target: "folio::shortcuts", id, "imported binding invalid, skipped");
                }
            }
            config.enabled = stored.enabled;
            config.refresh_customized();

            if config.enabled {
                let keys = config.keys.clone();
                if let Some(handler) = self.handlers.get(id) {
                    self.detector.register(id.clone(), keys, handler.clone());
                }
            } else {
                self.detector.unregister(id);
            }
        }

        // The imported master switch drives the live system, as in
        // set_preferences.
        if self.stored.preferences.enable_global != self.enabled {
            if self.stored.preferences.enable_global {
                self.enable();
            } else {
                self.disable();
            }
        }

        self.persist();
        Ok(())
    }

    /// Write the current state through the storage backend.
    ///
    /// Returns `false` on failure; persistence errors never interrupt the
    /// caller.
    fn persist(&mut self) -> bool {
        // Merge rather than replace: stored entries for actions not
        // registered this session must survive the save.
        for config in self.configs.values() {
            self.stored
                .shortcuts
                .insert(config.id.clone(), StoredShortcut::from_config(config));
        }
        self.storage.save(&mut self.stored)
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Tear the manager down. Terminal: every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.enabled = false;
        self.detector.stop();
        self.detector.clear_all();
        self.handlers.clear();
        self.configs.clear();
        self.order.clear();
        info!(target: "folio::shortcuts", "shortcut manager destroyed");
    }

    /// Check if [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl std::fmt::Debug for ShortcutManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutManager")
            .field("platform", &self.platform)
            .field("shortcuts", &self.order.len())
            .field("enabled", &self.enabled)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
