//! Structural validation of candidate key combinations.
//!
//! Validation answers two questions before a binding is accepted: is the
//! combination shaped sensibly (a bare letter cannot be a shortcut, a
//! sequence needs at least two steps), and does it collide with a shortcut
//! the operating system reserves for itself (Cmd+Q, Alt+F4). Hard failures
//! reject the binding; questionable-but-legal choices come back as warnings
//! the settings UI can surface.

use std::fmt;

use folio_keys::{
    Key, KeyCombination, Modifier, Modifiers, Platform, MIN_DOUBLE_PRESS_INTERVAL_MS,
    MIN_SEQUENCE_INTERVAL_MS, MIN_SEQUENCE_STEPS,
};

/// Double-press windows above this draw a warning.
pub const MAX_RECOMMENDED_DOUBLE_PRESS_INTERVAL_MS: u64 = 2000;

/// Sequence inter-step windows above this draw a warning.
pub const MAX_RECOMMENDED_SEQUENCE_INTERVAL_MS: u64 = 3000;

/// Sequences longer than this draw a warning.
pub const MAX_RECOMMENDED_SEQUENCE_STEPS: usize = 4;

/// Combos with more than this many modifiers draw a warning.
pub const MAX_RECOMMENDED_MODIFIERS: usize = 3;

/// Keys that double-press gestures work well with.
const DOUBLE_PRESS_FRIENDLY: &[Key] = &[
    Key::Shift,
    Key::Ctrl,
    Key::Alt,
    Key::Meta,
    Key::Escape,
    Key::Space,
];

// Shortcuts the OS claims before the application ever sees them. The exact
// modifier+key pair is matched; variations (extra Shift) are allowed.
const RESERVED_MACOS: &[(Modifiers, Key)] = &[
    (Modifiers::META, Key::Q),
    (Modifiers::META, Key::W),
    (Modifiers::META, Key::H),
    (Modifiers::META, Key::M),
    (Modifiers::META, Key::Tab),
    (Modifiers::META, Key::Space),
    (Modifiers::CTRL_META, Key::F),
    (Modifiers::CTRL_META, Key::Q),
    (Modifiers { ctrl: false, alt: true, shift: false, meta: true }, Key::Escape),
];

const RESERVED_WINDOWS: &[(Modifiers, Key)] = &[
    (Modifiers::ALT, Key::F4),
    (Modifiers::ALT, Key::Tab),
    (Modifiers::META, Key::L),
    (Modifiers::META, Key::D),
    (Modifiers::META, Key::E),
    (Modifiers::META, Key::R),
    (Modifiers::META, Key::Tab),
    (Modifiers { ctrl: true, alt: true, shift: false, meta: false }, Key::Delete),
];

const RESERVED_LINUX: &[(Modifiers, Key)] = &[
    (Modifiers::ALT, Key::F4),
    (Modifiers::ALT, Key::Tab),
    (Modifiers::META, Key::L),
    (Modifiers::META, Key::D),
    (Modifiers { ctrl: true, alt: true, shift: false, meta: false }, Key::Delete),
];

fn reserved_table(platform: Platform) -> &'static [(Modifiers, Key)] {
    match platform {
        Platform::MacOs => RESERVED_MACOS,
        Platform::Windows => RESERVED_WINDOWS,
        Platform::Linux => RESERVED_LINUX,
    }
}

/// Why a combination was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A letter or digit cannot be bound without a modifier.
    BareKeyNeedsModifier(Key),
    /// A combo needs at least one modifier.
    MissingModifier,
    /// The combination is reserved by the operating system.
    ReservedSystemShortcut(String),
    /// The double-press window is below the minimum.
    DoublePressIntervalTooShort(u64),
    /// The sequence has fewer than the minimum number of steps.
    SequenceTooShort(usize),
    /// The sequence inter-step window is below the minimum.
    SequenceIntervalTooShort(u64),
    /// A sequence step failed the simple/combo rules.
    SequenceStep {
        /// Zero-based index of the offending step.
        index: usize,
        /// The underlying failure.
        error: Box<ValidationError>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BareKeyNeedsModifier(key) => {
                write!(f, "key {key} requires at least one modifier")
            }
            Self::MissingModifier => write!(f, "at least one modifier is required"),
            Self::ReservedSystemShortcut(label) => {
                write!(f, "{label} is reserved by the operating system")
            }
            Self::DoublePressIntervalTooShort(ms) => write!(
                f,
                "double-press interval {ms}ms is below the {MIN_DOUBLE_PRESS_INTERVAL_MS}ms minimum"
            ),
            Self::SequenceTooShort(len) => write!(
                f,
                "sequence has {len} step(s); at least {MIN_SEQUENCE_STEPS} are required"
            ),
            Self::SequenceIntervalTooShort(ms) => write!(
                f,
                "sequence interval {ms}ms is below the {MIN_SEQUENCE_INTERVAL_MS}ms minimum"
            ),
            Self::SequenceStep { index, error } => {
                write!(f, "sequence step {}: {error}", index + 1)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a candidate combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// Whether the combination may be bound.
    pub valid: bool,
    /// The reason for rejection, when invalid.
    pub error: Option<ValidationError>,
    /// Advisory note for legal-but-questionable combinations.
    pub warning: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self { valid: true, error: None, warning: None }
    }

    fn ok_with_warning(warning: String) -> Self {
        Self { valid: true, error: None, warning: Some(warning) }
    }

    fn fail(error: ValidationError) -> Self {
        Self { valid: false, error: Some(error), warning: None }
    }
}

/// Validate a candidate combination for the given platform.
pub fn validate(combination: &KeyCombination, platform: Platform) -> Validation {
    match combination {
        KeyCombination::Simple { key } => validate_simple(*key),
        KeyCombination::Combo { modifiers, key } => validate_combo(*modifiers, *key, platform),
        KeyCombination::DoublePress { key, interval_ms } => {
            validate_double_press(*key, *interval_ms)
        }
        KeyCombination::Sequence { steps, interval_ms } => {
            validate_sequence(steps, *interval_ms, platform)
        }
    }
}

fn validate_simple(key: Key) -> Validation {
    if key.is_standalone_safe() {
        Validation::ok()
    } else {
        Validation::fail(ValidationError::BareKeyNeedsModifier(key))
    }
}

fn validate_combo(modifiers: Modifiers, key: Key, platform: Platform) -> Validation {
    if modifiers.is_empty() {
        return Validation::fail(ValidationError::MissingModifier);
    }
    if is_reserved(modifiers, key, platform) {
        let label = platform.display_string(&KeyCombination::combo(modifiers, key));
        return Validation::fail(ValidationError::ReservedSystemShortcut(label));
    }
    if modifiers.len() > MAX_RECOMMENDED_MODIFIERS {
        return Validation::ok_with_warning(format!(
            "{} modifiers is hard to press; consider at most {MAX_RECOMMENDED_MODIFIERS}",
            modifiers.len()
        ));
    }
    Validation::ok()
}

fn validate_double_press(key: Key, interval_ms: u64) -> Validation {
    if interval_ms < MIN_DOUBLE_PRESS_INTERVAL_MS {
        return Validation::fail(ValidationError::DoublePressIntervalTooShort(interval_ms));
    }
    if interval_ms > MAX_RECOMMENDED_DOUBLE_PRESS_INTERVAL_MS {
        return Validation::ok_with_warning(format!(
            "double-press interval {interval_ms}ms is unusually long"
        ));
    }
    if !DOUBLE_PRESS_FRIENDLY.contains(&key) {
        return Validation::ok_with_warning(format!(
            "{key} is awkward to double-press; modifier keys, Escape, and Space work best"
        ));
    }
    Validation::ok()
}

fn validate_sequence(
    steps: &[folio_keys::SequenceStep],
    interval_ms: u64,
    platform: Platform,
) -> Validation {
    if steps.len() < MIN_SEQUENCE_STEPS {
        return Validation::fail(ValidationError::SequenceTooShort(steps.len()));
    }
    if interval_ms < MIN_SEQUENCE_INTERVAL_MS {
        return Validation::fail(ValidationError::SequenceIntervalTooShort(interval_ms));
    }

    // Bare letters are fine inside a sequence; the multi-step gesture is
    // what keeps plain typing from triggering it. Modified steps still must
    // not collide with OS-reserved chords.
    for (index, step) in steps.iter().enumerate() {
        if step.modifiers.is_empty() {
            continue;
        }
        if let Some(error) = validate_combo(step.modifiers, step.key, platform).error {
            return Validation::fail(ValidationError::SequenceStep {
                index,
                error: Box::new(error),
            });
        }
    }

    if steps.len() > MAX_RECOMMENDED_SEQUENCE_STEPS {
        return Validation::ok_with_warning(format!(
            "{} steps is hard to remember; consider at most {MAX_RECOMMENDED_SEQUENCE_STEPS}",
            steps.len()
        ));
    }
    if interval_ms > MAX_RECOMMENDED_SEQUENCE_INTERVAL_MS {
        return Validation::ok_with_warning(format!(
            "sequence interval {interval_ms}ms is unusually long"
        ));
    }
    Validation::ok()
}

fn is_reserved(modifiers: Modifiers, key: Key, platform: Platform) -> bool {
    reserved_table(platform)
        .iter()
        .any(|(m, k)| *m == modifiers && *k == key)
}

/// Check if a combination collides with an OS-reserved shortcut.
///
/// Only combos can collide; the other shapes always return `false`.
pub fn is_system_shortcut(combination: &KeyCombination, platform: Platform) -> bool {
    match combination {
        KeyCombination::Combo { modifiers, key } => is_reserved(*modifiers, *key, platform),
        _ => false,
    }
}

/// The OS-reserved combinations for a platform, for display in settings UIs.
pub fn blocked_shortcuts(platform: Platform) -> Vec<KeyCombination> {
    reserved_table(platform)
        .iter()
        .map(|(modifiers, key)| KeyCombination::combo(*modifiers, *key))
        .collect()
}

/// Propose a close, valid variant of a rejected combination.
///
/// A bare letter or digit gets Ctrl added; a reserved combo gets Shift
/// added (when Shift is free and the result is itself not reserved).
/// Returns `None` when no simple fix exists.
pub fn suggest_alternative(
    combination: &KeyCombination,
    platform: Platform,
) -> Option<KeyCombination> {
    match combination {
        KeyCombination::Simple { key } if !key.is_standalone_safe() => {
            Some(KeyCombination::ctrl(*key))
        }
        KeyCombination::Combo { modifiers, key } if is_reserved(*modifiers, *key, platform) => {
            if modifiers.contains(Modifier::Shift) {
                return None;
            }
            let shifted = modifiers.with(Modifier::Shift);
            if is_reserved(shifted, *key, platform) {
                None
            } else {
                Some(KeyCombination::combo(shifted, *key))
            }
        }
        _ => None,
    }
}
