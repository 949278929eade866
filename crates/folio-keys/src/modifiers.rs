//! Modifier keys and unordered modifier sets.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::key::Key;

/// A single modifier key.
///
/// Display order throughout the system is fixed: Ctrl, Alt, Shift, Meta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// The Control key.
    Ctrl,
    /// The Alt key (Option on macOS).
    Alt,
    /// The Shift key.
    Shift,
    /// The Meta key (Cmd on macOS, Win key elsewhere).
    Meta,
}

impl Modifier {
    /// All modifiers in canonical display order.
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Meta];

    /// The lowercase name used in canonical strings and stored JSON.
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }

    /// The corresponding key, for bindings on the modifier itself.
    pub fn as_key(self) -> Key {
        match self {
            Modifier::Ctrl => Key::Ctrl,
            Modifier::Alt => Key::Alt,
            Modifier::Shift => Key::Shift,
            Modifier::Meta => Key::Meta,
        }
    }

    /// Parse a modifier name, accepting common aliases (`"cmd"`, `"option"`).
    pub fn parse(name: &str) -> Option<Modifier> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "alt" | "option" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "meta" | "cmd" | "command" | "super" | "win" | "windows" => Some(Modifier::Meta),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unordered set of modifier keys.
///
/// Equality is set equality: `{Shift, Ctrl}` equals `{Ctrl, Shift}`. The
/// serialized form is a list of lowercase names in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// The Control key is required.
    pub ctrl: bool,
    /// The Alt key is required.
    pub alt: bool,
    /// The Shift key is required.
    pub shift: bool,
    /// The Meta key is required.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self { ctrl: false, alt: false, shift: false, meta: false };

    /// Control only.
    pub const CTRL: Self = Self { ctrl: true, alt: false, shift: false, meta: false };

    /// Alt only.
    pub const ALT: Self = Self { ctrl: false, alt: true, shift: false, meta: false };

    /// Shift only.
    pub const SHIFT: Self = Self { ctrl: false, alt: false, shift: true, meta: false };

    /// Meta only.
    pub const META: Self = Self { ctrl: false, alt: false, shift: false, meta: true };

    /// Control + Shift.
    pub const CTRL_SHIFT: Self = Self { ctrl: true, alt: false, shift: true, meta: false };

    /// Control + Meta.
    pub const CTRL_META: Self = Self { ctrl: true, alt: false, shift: false, meta: true };

    /// Build a set from a single modifier.
    pub fn only(modifier: Modifier) -> Self {
        Self::NONE.with(modifier)
    }

    /// Return this set with `modifier` added.
    pub fn with(mut self, modifier: Modifier) -> Self {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
            Modifier::Meta => self.meta = true,
        }
        self
    }

    /// Check if `modifier` is in the set.
    pub fn contains(self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
        }
    }

    /// Check if any modifier is in the set.
    pub fn any(self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }

    /// Check if the set is empty.
    pub fn is_empty(self) -> bool {
        !self.any()
    }

    /// Number of modifiers in the set.
    pub fn len(self) -> usize {
        self.iter().count()
    }

    /// Iterate over the set in canonical display order.
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        Self::only(modifier)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for modifier in self.iter() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(modifier.name())?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for modifier in self.iter() {
            seq.serialize_element(modifier.name())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ModifiersVisitor;

        impl<'de> Visitor<'de> for ModifiersVisitor {
            type Value = Modifiers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of modifier names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Modifiers, A::Error> {
                let mut modifiers = Modifiers::NONE;
                while let Some(name) = seq.next_element::<String>()? {
                    let modifier = Modifier::parse(&name)
                        .ok_or_else(|| de::Error::custom(format!("unknown modifier: {name:?}")))?;
                    modifiers = modifiers.with(modifier);
                }
                Ok(modifiers)
            }
        }

        deserializer.deserialize_seq(ModifiersVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_equality_is_unordered() {
        let a = Modifiers::NONE.with(Modifier::Shift).with(Modifier::Ctrl);
        let b = Modifiers::NONE.with(Modifier::Ctrl).with(Modifier::Shift);
        assert_eq!(a, b);
        assert_eq!(a, Modifiers::CTRL_SHIFT);
    }

    #[test]
    fn test_display_order_is_canonical() {
        let set = Modifiers::NONE
            .with(Modifier::Meta)
            .with(Modifier::Shift)
            .with(Modifier::Ctrl);
        assert_eq!(set.to_string(), "ctrl+shift+meta");
    }

    #[test]
    fn test_len_and_contains() {
        assert_eq!(Modifiers::NONE.len(), 0);
        assert!(Modifiers::NONE.is_empty());
        assert_eq!(Modifiers::CTRL_SHIFT.len(), 2);
        assert!(Modifiers::CTRL_SHIFT.contains(Modifier::Ctrl));
        assert!(!Modifiers::CTRL_SHIFT.contains(Modifier::Alt));
    }

    #[test]
    fn test_serde_as_name_list() {
        let json = serde_json::to_string(&Modifiers::CTRL_SHIFT).unwrap();
        assert_eq!(json, "[\"ctrl\",\"shift\"]");
        let parsed: Modifiers = serde_json::from_str("[\"shift\", \"ctrl\"]").unwrap();
        assert_eq!(parsed, Modifiers::CTRL_SHIFT);
        let aliased: Modifiers = serde_json::from_str("[\"cmd\"]").unwrap();
        assert_eq!(aliased, Modifiers::META);
        assert!(serde_json::from_str::<Modifiers>("[\"hyper\"]").is_err());
    }
}
