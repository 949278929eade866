//! Canonical key identifiers and raw-name normalization.
//!
//! Keyboard backends report the same physical key under many names:
//! `"Control"` vs `"Ctrl"`, `"Esc"` vs `"Escape"`, `" "` vs `"Space"`,
//! macOS `"Cmd"`/`"Command"` vs `"Meta"`. Everything in the shortcut system
//! stores and compares the canonical [`Key`] produced by [`Key::normalize`];
//! raw names only exist at the event boundary.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A canonical keyboard key.
///
/// This is the closed vocabulary used for binding storage, equality, and
/// display. Left/right modifier variants are collapsed into a single key
/// (`ShiftLeft` and `ShiftRight` both normalize to [`Key::Shift`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Numbers (main keyboard)
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Navigation
    Up, Down, Left, Right,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete, Insert,
    Enter, Tab,

    // Whitespace
    Space,

    // Modifiers as keys (double-press gestures bind these directly)
    Ctrl, Alt, Shift, Meta,

    // Punctuation and symbols
    Minus, Equal,
    BracketLeft, BracketRight, Backslash,
    Semicolon, Quote,
    Comma, Period, Slash,
    Grave,

    // Control
    Escape,
    CapsLock,
    PrintScreen,
}

impl Key {
    /// Normalize a raw key name from a keyboard event to a canonical key.
    ///
    /// Accepts the names produced by DOM-style keyboard events as well as
    /// common aliases (`"Control"`, `"Esc"`, `"Cmd"`, `"Return"`, a literal
    /// space character). Single printable characters are matched
    /// case-insensitively. Returns `None` for keys outside the canonical
    /// vocabulary (media keys, dead keys, IME artifacts).
    pub fn normalize(raw: &str) -> Option<Key> {
        // The space character arrives as " " from DOM events.
        if raw == " " {
            return Some(Key::Space);
        }

        let mut chars = raw.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Key::from_char(ch);
        }

        match raw.to_ascii_lowercase().as_str() {
            // Function keys
            "f1" => Some(Key::F1),
            "f2" => Some(Key::F2),
            "f3" => Some(Key::F3),
            "f4" => Some(Key::F4),
            "f5" => Some(Key::F5),
            "f6" => Some(Key::F6),
            "f7" => Some(Key::F7),
            "f8" => Some(Key::F8),
            "f9" => Some(Key::F9),
            "f10" => Some(Key::F10),
            "f11" => Some(Key::F11),
            "f12" => Some(Key::F12),

            // Navigation
            "up" | "arrowup" => Some(Key::Up),
            "down" | "arrowdown" => Some(Key::Down),
            "left" | "arrowleft" => Some(Key::Left),
            "right" | "arrowright" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdn" => Some(Key::PageDown),

            // Editing
            "backspace" | "back" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "insert" | "ins" => Some(Key::Insert),
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "space" | "spacebar" => Some(Key::Space),
            "escape" | "esc" => Some(Key::Escape),

            // Modifiers (left/right variants collapse)
            "ctrl" | "control" | "controlleft" | "controlright" => Some(Key::Ctrl),
            "alt" | "option" | "altleft" | "altright" => Some(Key::Alt),
            "shift" | "shiftleft" | "shiftright" => Some(Key::Shift),
            "meta" | "cmd" | "command" | "super" | "win" | "windows" | "metaleft"
            | "metaright" => Some(Key::Meta),

            // Punctuation (word names, used in canonical strings)
            "minus" | "dash" => Some(Key::Minus),
            "equal" | "equals" => Some(Key::Equal),
            "bracketleft" => Some(Key::BracketLeft),
            "bracketright" => Some(Key::BracketRight),
            "backslash" => Some(Key::Backslash),
            "semicolon" => Some(Key::Semicolon),
            "quote" | "apostrophe" => Some(Key::Quote),
            "comma" => Some(Key::Comma),
            "period" | "dot" => Some(Key::Period),
            "slash" => Some(Key::Slash),
            "grave" | "backquote" | "backtick" => Some(Key::Grave),

            // Control
            "capslock" => Some(Key::CapsLock),
            "printscreen" => Some(Key::PrintScreen),

            _ => None,
        }
    }

    /// Normalize a single printable character.
    fn from_char(ch: char) -> Option<Key> {
        match ch.to_ascii_uppercase() {
            'A' => Some(Key::A),
            'B' => Some(Key::B),
            'C' => Some(Key::C),
            'D' => Some(Key::D),
            'E' => Some(Key::E),
            'F' => Some(Key::F),
            'G' => Some(Key::G),
            'H' => Some(Key::H),
            'I' => Some(Key::I),
            'J' => Some(Key::J),
            'K' => Some(Key::K),
            'L' => Some(Key::L),
            'M' => Some(Key::M),
            'N' => Some(Key::N),
            'O' => Some(Key::O),
            'P' => Some(Key::P),
            'Q' => Some(Key::Q),
            'R' => Some(Key::R),
            'S' => Some(Key::S),
            'T' => Some(Key::T),
            'U' => Some(Key::U),
            'V' => Some(Key::V),
            'W' => Some(Key::W),
            'X' => Some(Key::X),
            'Y' => Some(Key::Y),
            'Z' => Some(Key::Z),
            '0' => Some(Key::Digit0),
            '1' => Some(Key::Digit1),
            '2' => Some(Key::Digit2),
            '3' => Some(Key::Digit3),
            '4' => Some(Key::Digit4),
            '5' => Some(Key::Digit5),
            '6' => Some(Key::Digit6),
            '7' => Some(Key::Digit7),
            '8' => Some(Key::Digit8),
            '9' => Some(Key::Digit9),
            '-' => Some(Key::Minus),
            '=' => Some(Key::Equal),
            '[' => Some(Key::BracketLeft),
            ']' => Some(Key::BracketRight),
            '\\' => Some(Key::Backslash),
            ';' => Some(Key::Semicolon),
            '\'' => Some(Key::Quote),
            ',' => Some(Key::Comma),
            '.' => Some(Key::Period),
            '/' => Some(Key::Slash),
            '`' => Some(Key::Grave),
            _ => None,
        }
    }

    /// The canonical name of this key, as used in storage and display.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Key::A => "A",
            Key::B => "B",
            Key::C => "C",
            Key::D => "D",
            Key::E => "E",
            Key::F => "F",
            Key::G => "G",
            Key::H => "H",
            Key::I => "I",
            Key::J => "J",
            Key::K => "K",
            Key::L => "L",
            Key::M => "M",
            Key::N => "N",
            Key::O => "O",
            Key::P => "P",
            Key::Q => "Q",
            Key::R => "R",
            Key::S => "S",
            Key::T => "T",
            Key::U => "U",
            Key::V => "V",
            Key::W => "W",
            Key::X => "X",
            Key::Y => "Y",
            Key::Z => "Z",
            Key::Digit0 => "0",
            Key::Digit1 => "1",
            Key::Digit2 => "2",
            Key::Digit3 => "3",
            Key::Digit4 => "4",
            Key::Digit5 => "5",
            Key::Digit6 => "6",
            Key::Digit7 => "7",
            Key::Digit8 => "8",
            Key::Digit9 => "9",
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Space => "Space",
            Key::Ctrl => "Ctrl",
            Key::Alt => "Alt",
            Key::Shift => "Shift",
            Key::Meta => "Meta",
            Key::Minus => "Minus",
            Key::Equal => "Equal",
            Key::BracketLeft => "BracketLeft",
            Key::BracketRight => "BracketRight",
            Key::Backslash => "Backslash",
            Key::Semicolon => "Semicolon",
            Key::Quote => "Quote",
            Key::Comma => "Comma",
            Key::Period => "Period",
            Key::Slash => "Slash",
            Key::Grave => "Grave",
            Key::Escape => "Escape",
            Key::CapsLock => "CapsLock",
            Key::PrintScreen => "PrintScreen",
        }
    }

    /// Check if this is a modifier key (Ctrl, Alt, Shift, Meta).
    pub fn is_modifier(self) -> bool {
        matches!(self, Key::Ctrl | Key::Alt | Key::Shift | Key::Meta)
    }

    /// Check if this is a letter key.
    pub fn is_letter(self) -> bool {
        matches!(
            self,
            Key::A | Key::B | Key::C | Key::D | Key::E | Key::F | Key::G | Key::H | Key::I
                | Key::J | Key::K | Key::L | Key::M | Key::N | Key::O | Key::P | Key::Q
                | Key::R | Key::S | Key::T | Key::U | Key::V | Key::W | Key::X | Key::Y
                | Key::Z
        )
    }

    /// Check if this is a digit key (main keyboard).
    pub fn is_digit(self) -> bool {
        matches!(
            self,
            Key::Digit0 | Key::Digit1 | Key::Digit2 | Key::Digit3 | Key::Digit4 | Key::Digit5
                | Key::Digit6 | Key::Digit7 | Key::Digit8 | Key::Digit9
        )
    }

    /// Check if this is a function key.
    pub fn is_function_key(self) -> bool {
        matches!(
            self,
            Key::F1 | Key::F2 | Key::F3 | Key::F4 | Key::F5 | Key::F6 | Key::F7 | Key::F8
                | Key::F9 | Key::F10 | Key::F11 | Key::F12
        )
    }

    /// Check if this key may be bound on its own, without modifiers.
    ///
    /// Letters and digits always require a modifier (they would otherwise
    /// shadow ordinary typing). Function keys, navigation keys, and the
    /// standard editing keys are safe standalone.
    pub fn is_standalone_safe(self) -> bool {
        !(self.is_letter() || self.is_digit())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical_name())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a canonical key name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Key, E> {
                Key::normalize(value)
                    .ok_or_else(|| E::custom(format!("unknown key name: {value:?}")))
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}
