//! Shortcut actions and their live configuration records.

use std::fmt;
use std::sync::Arc;

use folio_keys::KeyCombination;
use serde::{Deserialize, Serialize};

use crate::event::KeyEvent;

/// Lowest accepted action priority.
pub const MIN_PRIORITY: u8 = 1;

/// Highest accepted action priority.
pub const MAX_PRIORITY: u8 = 10;

/// Priority assigned when the caller does not pick one.
pub const DEFAULT_PRIORITY: u8 = 5;

/// Functional category of an action, used for grouping in settings UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Moving between documents, tabs, and views.
    Navigation,
    /// Text editing operations.
    Editing,
    /// Layout and zoom.
    View,
    /// Search and find.
    Search,
    /// Window management.
    Window,
    /// Application-level operations.
    System,
    /// AI assistant panel.
    Ai,
    /// Reading aids.
    Reading,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Navigation => "navigation",
            Category::Editing => "editing",
            Category::View => "view",
            Category::Search => "search",
            Category::Window => "window",
            Category::System => "system",
            Category::Ai => "ai",
            Category::Reading => "reading",
        };
        f.write_str(name)
    }
}

/// The UI context a binding is expected to be active in.
///
/// Advisory only: the detector dispatches regardless of scope, and the
/// consuming component decides whether to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Active everywhere.
    #[default]
    Global,
    /// Active while a document editor has focus.
    Editor,
    /// Active while the sidebar has focus.
    Sidebar,
    /// Active while a modal dialog is open.
    Modal,
}

/// Callback invoked when a binding fires.
///
/// Handlers receive the originating event and run synchronously from the
/// detector's point of view; a handler that kicks off async work is
/// fire-and-forget.
pub type ShortcutHandler = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Registration input for a shortcut action.
pub struct ShortcutAction {
    /// Unique identifier, e.g. `"search.open"`.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Longer description for settings UIs.
    pub description: String,
    /// Functional category.
    pub category: Category,
    /// The shipped default binding.
    pub default_keys: KeyCombination,
    /// Callback invoked on dispatch.
    pub handler: ShortcutHandler,
    /// Whether the binding starts enabled.
    pub enabled: bool,
    /// Conflict tie-breaker, 1-10, higher wins. Clamped on construction.
    pub priority: u8,
    /// Advisory UI scope.
    pub scope: Scope,
    /// Whether the user may rebind this action.
    pub customizable: bool,
}

impl ShortcutAction {
    /// Create an action with default priority, global scope, enabled, and
    /// customizable.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        default_keys: KeyCombination,
        handler: ShortcutHandler,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            default_keys,
            handler,
            enabled: true,
            priority: DEFAULT_PRIORITY,
            scope: Scope::Global,
            customizable: true,
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the priority, clamped to the valid range.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(MIN_PRIORITY, MAX_PRIORITY);
        self
    }

    /// Builder: set the scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Builder: set whether the binding starts enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set whether the user may rebind this action.
    pub fn with_customizable(mut self, customizable: bool) -> Self {
        self.customizable = customizable;
        self
    }
}

impl fmt::Debug for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutAction")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("default_keys", &self.default_keys)
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .field("scope", &self.scope)
            .field("customizable", &self.customizable)
            .finish()
    }
}

/// Live state of a registered action.
///
/// Everything from [`ShortcutAction`] except the handler (handlers are kept
/// separately and never serialized), plus the current binding, which may
/// differ from the default after a user edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutConfig {
    /// Unique identifier.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Longer description for settings UIs.
    pub description: String,
    /// Functional category.
    pub category: Category,
    /// The shipped default binding.
    pub default_keys: KeyCombination,
    /// The currently bound combination.
    pub keys: KeyCombination,
    /// Whether the binding is enabled.
    pub enabled: bool,
    /// Conflict tie-breaker.
    pub priority: u8,
    /// Advisory UI scope.
    pub scope: Scope,
    /// Whether the user may rebind this action.
    pub customizable: bool,
    /// True iff `keys` differs from `default_keys`.
    pub customized: bool,
}

impl ShortcutConfig {
    /// Build the initial config for a freshly registered action.
    pub fn from_action(action: &ShortcutAction) -> Self {
        Self {
            id: action.id.clone(),
            name: action.name.clone(),
            description: action.description.clone(),
            category: action.category,
            default_keys: action.default_keys.clone(),
            keys: action.default_keys.clone(),
            enabled: action.enabled,
            priority: action.priority.clamp(MIN_PRIORITY, MAX_PRIORITY),
            scope: action.scope,
            customizable: action.customizable,
            customized: false,
        }
    }

    /// Recompute the `customized` flag from the current binding.
    pub fn refresh_customized(&mut self) {
        self.customized = !self.keys.same_binding(&self.default_keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_keys::Key;

    fn noop_handler() -> ShortcutHandler {
        Arc::new(|_event| {})
    }

    #[test]
    fn test_priority_is_clamped() {
        let action = ShortcutAction::new(
            "test.action",
            "Test",
            Category::System,
            KeyCombination::simple(Key::F5),
            noop_handler(),
        )
        .with_priority(42);
        assert_eq!(action.priority, MAX_PRIORITY);
    }

    #[test]
    fn test_config_from_action_starts_uncustomized() {
        let action = ShortcutAction::new(
            "view.toggleSidebar",
            "Toggle sidebar",
            Category::View,
            KeyCombination::ctrl(Key::B),
            noop_handler(),
        );
        let config = ShortcutConfig::from_action(&action);
        assert_eq!(config.keys, config.default_keys);
        assert!(!config.customized);
        assert!(config.enabled);
    }

    #[test]
    fn test_refresh_customized() {
        let action = ShortcutAction::new(
            "view.toggleSidebar",
            "Toggle sidebar",
            Category::View,
            KeyCombination::ctrl(Key::B),
            noop_handler(),
        );
        let mut config = ShortcutConfig::from_action(&action);
        config.keys = KeyCombination::ctrl(Key::D);
        config.refresh_customized();
        assert!(config.customized);
        config.keys = config.default_keys.clone();
        config.refresh_customized();
        assert!(!config.customized);
    }
}
