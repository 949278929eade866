//! Platform identification and platform-specific rendering of combinations.
//!
//! Default binding tables are authored once with Ctrl as the primary
//! modifier and translated per platform with
//! [`Platform::convert_for_platform`]; settings UIs render combinations with
//! [`Platform::display_string`], which uses the native symbol glyphs on
//! macOS (`⌘⇧S`) and `+`-joined text elsewhere (`Ctrl+Shift+S`).

use std::fmt;

use crate::combination::KeyCombination;
use crate::key::Key;
use crate::modifiers::{Modifier, Modifiers};

/// The desktop platform the application runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS (`darwin`).
    MacOs,
    /// Windows (`win32`).
    Windows,
    /// Linux and other Unix desktops.
    Linux,
}

impl Platform {
    /// The platform of the current build.
    pub fn current() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// The primary shortcut modifier: Meta on macOS, Ctrl elsewhere.
    pub fn primary_modifier(self) -> Modifier {
        match self {
            Platform::MacOs => Modifier::Meta,
            Platform::Windows | Platform::Linux => Modifier::Ctrl,
        }
    }

    /// Translate a combination authored with Ctrl-based defaults to this
    /// platform's convention (Ctrl becomes Meta on macOS).
    pub fn convert_for_platform(self, combination: &KeyCombination) -> KeyCombination {
        if self != Platform::MacOs {
            return combination.clone();
        }
        match combination {
            KeyCombination::Combo { modifiers, key } => KeyCombination::Combo {
                modifiers: swap_ctrl_for_meta(*modifiers),
                key: *key,
            },
            KeyCombination::Sequence { steps, interval_ms } => KeyCombination::Sequence {
                steps: steps
                    .iter()
                    .map(|step| crate::combination::SequenceStep {
                        modifiers: swap_ctrl_for_meta(step.modifiers),
                        key: step.key,
                    })
                    .collect(),
                interval_ms: *interval_ms,
            },
            other => other.clone(),
        }
    }

    /// Human-readable label for a combination on this platform.
    ///
    /// macOS renders modifier glyphs with no separator; other platforms join
    /// names with `+`. Double presses render the key twice, sequences join
    /// their steps with `", "`.
    pub fn display_string(self, combination: &KeyCombination) -> String {
        match combination {
            KeyCombination::Simple { key } => self.key_label(*key),
            KeyCombination::Combo { modifiers, key } => self.chord_label(*modifiers, *key),
            KeyCombination::DoublePress { key, .. } => {
                let label = self.key_label(*key);
                format!("{label} {label}")
            }
            KeyCombination::Sequence { steps, .. } => steps
                .iter()
                .map(|step| self.chord_label(step.modifiers, step.key))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn chord_label(self, modifiers: Modifiers, key: Key) -> String {
        if modifiers.is_empty() {
            return self.key_label(key);
        }
        match self {
            Platform::MacOs => {
                let mut label = String::new();
                for modifier in modifiers.iter() {
                    label.push_str(modifier_glyph(modifier));
                }
                label.push_str(&self.key_label(key));
                label
            }
            Platform::Windows | Platform::Linux => {
                let mut parts: Vec<&str> = Vec::new();
                for modifier in modifiers.iter() {
                    parts.push(modifier_text(self, modifier));
                }
                parts.push(key.canonical_name());
                parts.join("+")
            }
        }
    }

    fn key_label(self, key: Key) -> String {
        if self == Platform::MacOs {
            if let Some(modifier) = key_as_modifier(key) {
                return modifier_glyph(modifier).to_string();
            }
        }
        key.canonical_name().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => f.write_str("darwin"),
            Platform::Windows => f.write_str("win32"),
            Platform::Linux => f.write_str("linux"),
        }
    }
}

fn swap_ctrl_for_meta(modifiers: Modifiers) -> Modifiers {
    Modifiers {
        ctrl: false,
        alt: modifiers.alt,
        shift: modifiers.shift,
        meta: modifiers.meta || modifiers.ctrl,
    }
}

fn key_as_modifier(key: Key) -> Option<Modifier> {
    match key {
        Key::Ctrl => Some(Modifier::Ctrl),
        Key::Alt => Some(Modifier::Alt),
        Key::Shift => Some(Modifier::Shift),
        Key::Meta => Some(Modifier::Meta),
        _ => None,
    }
}

fn modifier_glyph(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Ctrl => "\u{2303}",  // ⌃
        Modifier::Alt => "\u{2325}",   // ⌥
        Modifier::Shift => "\u{21e7}", // ⇧
        Modifier::Meta => "\u{2318}",  // ⌘
    }
}

fn modifier_text(platform: Platform, modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Ctrl => "Ctrl",
        Modifier::Alt => "Alt",
        Modifier::Shift => "Shift",
        Modifier::Meta => match platform {
            Platform::Windows => "Win",
            _ => "Meta",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::SequenceStep;

    #[test]
    fn test_primary_modifier() {
        assert_eq!(Platform::MacOs.primary_modifier(), Modifier::Meta);
        assert_eq!(Platform::Windows.primary_modifier(), Modifier::Ctrl);
        assert_eq!(Platform::Linux.primary_modifier(), Modifier::Ctrl);
    }

    #[test]
    fn test_display_combo_per_platform() {
        let combo = KeyCombination::combo(
            Modifiers::NONE.with(Modifier::Shift).with(Modifier::Meta),
            Key::S,
        );
        assert_eq!(Platform::MacOs.display_string(&combo), "\u{21e7}\u{2318}S");
        assert_eq!(Platform::Linux.display_string(&combo), "Shift+Meta+S");
        assert_eq!(Platform::Windows.display_string(&combo), "Shift+Win+S");
    }

    #[test]
    fn test_display_double_press_and_sequence() {
        let double = KeyCombination::double_press(Key::Shift);
        assert_eq!(Platform::Linux.display_string(&double), "Shift Shift");
        assert_eq!(Platform::MacOs.display_string(&double), "\u{21e7} \u{21e7}");

        let seq = KeyCombination::sequence(vec![
            SequenceStep::combo(Modifiers::CTRL, Key::K),
            SequenceStep::simple(Key::C),
        ]);
        assert_eq!(Platform::Linux.display_string(&seq), "Ctrl+K, C");
    }

    #[test]
    fn test_convert_for_platform_swaps_ctrl_on_macos() {
        let ctrl_b = KeyCombination::ctrl(Key::B);
        let converted = Platform::MacOs.convert_for_platform(&ctrl_b);
        assert_eq!(converted, KeyCombination::combo(Modifiers::META, Key::B));
        assert_eq!(Platform::Linux.convert_for_platform(&ctrl_b), ctrl_b);

        let seq = KeyCombination::sequence(vec![SequenceStep::combo(Modifiers::CTRL, Key::K),
            SequenceStep::combo(Modifiers::CTRL, Key::C)]);
        match Platform::MacOs.convert_for_platform(&seq) {
            KeyCombination::Sequence { steps, .. } => {
                assert!(steps.iter().all(|s| s.modifiers == Modifiers::META));
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_ctrl_meta_combo_collapses_on_macos() {
        let both = KeyCombination::combo(Modifiers::CTRL_META, Key::F);
        let converted = Platform::MacOs.convert_for_platform(&both);
        assert_eq!(converted, KeyCombination::combo(Modifiers::META, Key::F));
    }
}
