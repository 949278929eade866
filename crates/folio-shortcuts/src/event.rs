//! Keyboard event capability interface.
//!
//! The detector never touches a real event source. Whatever hosts the
//! shortcut system (a window event loop, a webview bridge, a test) builds a
//! [`KeyEvent`] from each raw keyboard event and feeds it in. The event
//! carries exactly what detection needs: the normalized key, the modifier
//! flags the backend reported, a classification of the focused element, and
//! a timestamp.

use std::time::Instant;

use folio_keys::{Key, Modifiers};

/// Classification of the element holding keyboard focus.
///
/// Shortcuts are suppressed while the user is typing into an editable
/// element, with Escape as the one exception (dialogs and search panels
/// must stay closable from inside a field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// Focus is on a non-editable element; shortcuts dispatch normally.
    #[default]
    Window,
    /// A single-line text input.
    TextInput,
    /// A multi-line text area.
    TextArea,
    /// A select/dropdown element.
    Select,
    /// A content-editable region.
    ContentEditable,
}

impl FocusTarget {
    /// Check if this focus target swallows shortcut keystrokes.
    pub fn swallows_shortcuts(self) -> bool {
        !matches!(self, FocusTarget::Window)
    }
}

/// A normalized keyboard event.
///
/// Modifier state is taken from the event's own flags rather than inferred
/// from earlier events, so a missed keyup can never leave a stale modifier
/// held. The `accepted` flag mirrors DOM `preventDefault` +
/// `stopPropagation`: the detector sets it when a binding fires so the host
/// can stop the event from reaching other handlers.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// The normalized key.
    pub key: Key,
    /// Modifier flags reported by the backend for this event.
    pub modifiers: Modifiers,
    /// What kind of element held focus when the event fired.
    pub focus: FocusTarget,
    /// When the event occurred.
    pub timestamp: Instant,
    /// Whether this is an auto-repeat event (key held down).
    pub is_repeat: bool,
    accepted: bool,
}

impl KeyEvent {
    /// Create an event for `key` with the given modifier flags.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            focus: FocusTarget::Window,
            timestamp: Instant::now(),
            is_repeat: false,
            accepted: false,
        }
    }

    /// Create an event from a raw backend key name.
    ///
    /// Returns `None` if the name is outside the canonical vocabulary, in
    /// which case the event is of no interest to the shortcut system.
    pub fn from_raw(raw: &str, modifiers: Modifiers) -> Option<Self> {
        Key::normalize(raw).map(|key| Self::new(key, modifiers))
    }

    /// Builder: set the focus-target classification.
    pub fn with_focus(mut self, focus: FocusTarget) -> Self {
        self.focus = focus;
        self
    }

    /// Builder: set the event timestamp.
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder: mark the event as an auto-repeat.
    pub fn with_repeat(mut self, is_repeat: bool) -> Self {
        self.is_repeat = is_repeat;
        self
    }

    /// Check if a binding consumed this event.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Mark the event as consumed.
    pub fn accept(&mut self) {
        self.accepted = true;
    }
}
