//! The shipped default binding table.
//!
//! [`defaults`] produces the application's stock shortcuts, already
//! platform-final: the primary modifier is Meta on macOS and Ctrl
//! elsewhere, and a few bindings deliberately use literal Ctrl everywhere
//! (tab cycling, close tab) because their Meta variants belong to macOS.
//! The host attaches handlers with [`CatalogEntry::into_action`] and feeds
//! the result to the manager.

use folio_keys::{Key, KeyCombination, Modifier, Modifiers, Platform, SequenceStep};

use crate::action::{Category, Scope, ShortcutAction, ShortcutHandler};

/// One shipped default binding, not yet attached to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Unique action id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Settings-UI description.
    pub description: &'static str,
    /// Functional category.
    pub category: Category,
    /// The shipped binding.
    pub keys: KeyCombination,
    /// Conflict tie-breaker.
    pub priority: u8,
    /// Advisory UI scope.
    pub scope: Scope,
    /// Whether the user may rebind it.
    pub customizable: bool,
}

impl CatalogEntry {
    fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: Category,
        keys: KeyCombination,
        priority: u8,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            keys,
            priority,
            scope: Scope::Global,
            customizable: true,
        }
    }

    /// Attach a handler, producing a registrable action.
    pub fn into_action(self, handler: ShortcutHandler) -> ShortcutAction {
        ShortcutAction::new(self.id, self.name, self.category, self.keys, handler)
            .with_description(self.description)
            .with_priority(self.priority)
            .with_scope(self.scope)
            .with_customizable(self.customizable)
    }
}

/// The stock binding table for a platform.
pub fn defaults(platform: Platform) -> Vec<CatalogEntry> {
    let primary = Modifiers::only(platform.primary_modifier());
    let primary_shift = primary.with(Modifier::Shift);

    vec![
        // Search
        CatalogEntry::new(
            "search.open",
            "Open search",
            "Open the global search overlay",
            Category::Search,
            KeyCombination::double_press(Key::Shift),
            7,
        ),
        CatalogEntry::new(
            "search.find",
            "Find in document",
            "Find text in the current document",
            Category::Search,
            KeyCombination::combo(primary, Key::F),
            6,
        ),
        CatalogEntry::new(
            "search.findNext",
            "Find next",
            "Jump to the next match",
            Category::Search,
            KeyCombination::simple(Key::F3),
            5,
        ),
        CatalogEntry::new(
            "search.findPrevious",
            "Find previous",
            "Jump to the previous match",
            Category::Search,
            KeyCombination::combo(Modifiers::SHIFT, Key::F3),
            5,
        ),
        // Navigation
        CatalogEntry::new(
            "nav.back",
            "Go back",
            "Return to the previous location",
            Category::Navigation,
            KeyCombination::combo(Modifiers::ALT, Key::Left),
            5,
        ),
        CatalogEntry::new(
            "nav.forward",
            "Go forward",
            "Advance to the next location",
            Category::Navigation,
            KeyCombination::combo(Modifiers::ALT, Key::Right),
            5,
        ),
        CatalogEntry::new(
            "nav.nextTab",
            "Next tab",
            "Cycle to the next open tab",
            Category::Navigation,
            KeyCombination::combo(Modifiers::CTRL, Key::Tab),
            6,
        ),
        CatalogEntry::new(
            "nav.previousTab",
            "Previous tab",
            "Cycle to the previous open tab",
            Category::Navigation,
            KeyCombination::combo(Modifiers::CTRL_SHIFT, Key::Tab),
            6,
        ),
        CatalogEntry::new(
            "nav.closeTab",
            "Close tab",
            "Close the current tab",
            Category::Navigation,
            KeyCombination::ctrl(Key::W),
            6,
        ),
        // View
        CatalogEntry::new(
            "view.toggleSidebar",
            "Toggle sidebar",
            "Show or hide the sidebar",
            Category::View,
            KeyCombination::combo(primary, Key::B),
            6,
        ),
        CatalogEntry::new(
            "view.zoomIn",
            "Zoom in",
            "Increase the document zoom",
            Category::View,
            KeyCombination::combo(primary, Key::Equal),
            5,
        ),
        CatalogEntry::new(
            "view.zoomOut",
            "Zoom out",
            "Decrease the document zoom",
            Category::View,
            KeyCombination::combo(primary, Key::Minus),
            5,
        ),
        CatalogEntry::new(
            "view.zoomReset",
            "Reset zoom",
            "Restore the default zoom level",
            Category::View,
            KeyCombination::combo(primary, Key::Digit0),
            5,
        ),
        CatalogEntry::new(
            "view.fullscreen",
            "Toggle fullscreen",
            "Enter or leave fullscreen",
            Category::View,
            KeyCombination::simple(Key::F11),
            5,
        ),
        CatalogEntry::new(
            "view.goTop",
            "Go to top",
            "Scroll to the top of the document",
            Category::View,
            KeyCombination::sequence(vec![
                SequenceStep::simple(Key::G),
                SequenceStep::simple(Key::G),
            ]),
            4,
        ),
        // System
        CatalogEntry::new(
            "system.settings",
            "Open settings",
            "Open the application settings",
            Category::System,
            KeyCombination::combo(primary, Key::Comma),
            6,
        ),
        CatalogEntry::new(
            "system.reload",
            "Reload",
            "Reload the current document",
            Category::System,
            KeyCombination::combo(primary, Key::R),
            4,
        ),
        CatalogEntry::new(
            "system.shortcutHelp",
            "Keyboard shortcuts",
            "Show the shortcut reference",
            Category::System,
            KeyCombination::combo(primary, Key::Slash),
            4,
        ),
        // AI assistant
        CatalogEntry::new(
            "ai.togglePanel",
            "Toggle AI panel",
            "Show or hide the assistant panel",
            Category::Ai,
            KeyCombination::combo(primary_shift, Key::A),
            5,
        ),
        CatalogEntry::new(
            "ai.newConversation",
            "New conversation",
            "Start a fresh assistant conversation",
            Category::Ai,
            KeyCombination::combo(primary_shift, Key::N),
            4,
        ),
        // Window
        CatalogEntry::new(
            "window.openFile",
            "Open file",
            "Open a document from disk",
            Category::Window,
            KeyCombination::combo(primary, Key::O),
            6,
        ),
        CatalogEntry::new(
            "window.openFolder",
            "Open folder",
            "Open a library folder",
            Category::Window,
            KeyCombination::combo(primary_shift, Key::O),
            5,
        ),
        CatalogEntry::new(
            "window.minimize",
            "Minimize window",
            "Minimize the application window",
            Category::Window,
            KeyCombination::ctrl(Key::M),
            3,
        ),
    ]
}
