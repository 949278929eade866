//! Keyboard shortcut registry, conflict detection, and dispatch for the
//! Folio reader.
//!
//! The pieces fit together like this: components describe their shortcuts
//! as [`ShortcutAction`]s (or take entries from the shipped
//! [`catalog`]), the [`ShortcutManager`] validates and registers them,
//! settles conflicts by priority, overlays stored user customizations, and
//! arms the [`KeyDetector`]. The host forwards raw key events; matching
//! bindings run their handlers and the outcome is reported back so the
//! host can consume the event.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use folio_keys::{Key, KeyCombination, Modifiers};
//! use folio_shortcuts::{
//!     Category, KeyEvent, MemoryStore, ShortcutAction, ShortcutManager,
//! };
//!
//! let mut manager = ShortcutManager::new(Box::new(MemoryStore::new()));
//! manager.register(ShortcutAction::new(
//!     "save",
//!     "Save document",
//!     Category::System,
//!     KeyCombination::ctrl(Key::S),
//!     Arc::new(|_event| println!("saving")),
//! ));
//!
//! let mut event = KeyEvent::new(Key::S, Modifiers::CTRL);
//! manager.handle_key_down(&mut event);
//! assert!(event.is_accepted());
//! ```

mod action;
pub mod catalog;
mod conflict;
mod detector;
mod event;
mod manager;
mod storage;
mod validator;

pub use action::{
    Category, Scope, ShortcutAction, ShortcutConfig, ShortcutHandler, DEFAULT_PRIORITY,
    MAX_PRIORITY, MIN_PRIORITY,
};
pub use conflict::{
    combinations_conflict, find_conflicts, resolve_conflicts, suggest_free_binding,
    ConflictInfo, Resolution,
};
pub use detector::{DispatchOutcome, KeyDetector, EVENT_THROTTLE_MS};
pub use event::{FocusTarget, KeyEvent};
pub use manager::{ShortcutManager, UpdateOutcome};
pub use storage::{
    merge_configs, ConfigStorage, ExportEnvelope, JsonFileStore, MemoryStore, Preferences,
    StorageBackend, StorageError, StoredConfig, StoredShortcut, CONFIG_VERSION,
};
pub use validator::{
    blocked_shortcuts, is_system_shortcut, suggest_alternative, validate, Validation,
    ValidationError,
};

/// Log-filter targets used throughout the crate.
///
/// Pass these to a `tracing` filter to tune verbosity per subsystem, e.g.
/// `folio::detector=trace,folio::shortcuts=debug`.
pub mod targets {
    /// Manager-level registration and customization events.
    pub const SHORTCUTS: &str = "folio::shortcuts";
    /// Per-keystroke detection and dispatch.
    pub const DETECTOR: &str = "folio::detector";
    /// Config load, save, and migration.
    pub const STORAGE: &str = "folio::storage";
}
