//! Key combinations: the four binding shapes and their canonical string form.
//!
//! A [`KeyCombination`] is what an action binds to. Four shapes exist:
//!
//! - [`KeyCombination::Simple`]: one key, no modifiers (`Escape`, `F3`)
//! - [`KeyCombination::Combo`]: modifiers plus a main key (`Ctrl+Shift+S`)
//! - [`KeyCombination::DoublePress`]: the same key twice within an interval
//!   (`Shift Shift`)
//! - [`KeyCombination::Sequence`]: an ordered multi-step gesture (`G G`)
//!
//! # Canonical strings
//!
//! Every combination round-trips through a compact lowercase string used for
//! fast equality pre-checks and textual storage:
//!
//! ```
//! use folio_keys::KeyCombination;
//!
//! let combo: KeyCombination = "ctrl+shift+s".parse().unwrap();
//! assert_eq!(combo.to_string(), "ctrl+shift+s");
//! ```
//!
//! Double presses render as the key twice (`"shift shift"`), sequences as
//! space-separated steps (`"g g"`, `"ctrl+k ctrl+c"`). Intervals are not part
//! of the string form; parsing restores the defaults, and [`same_binding`]
//! (the semantic equality used for conflict checks) ignores intervals.
//!
//! [`same_binding`]: KeyCombination::same_binding

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::modifiers::{Modifier, Modifiers};

/// Default double-press window in milliseconds.
pub const DEFAULT_DOUBLE_PRESS_INTERVAL_MS: u64 = 500;

/// Minimum accepted double-press window in milliseconds.
pub const MIN_DOUBLE_PRESS_INTERVAL_MS: u64 = 100;

/// Default inter-step window for sequences in milliseconds.
pub const DEFAULT_SEQUENCE_INTERVAL_MS: u64 = 1000;

/// Minimum inter-step window for sequences in milliseconds.
pub const MIN_SEQUENCE_INTERVAL_MS: u64 = 500;

/// Minimum number of steps in a sequence.
pub const MIN_SEQUENCE_STEPS: usize = 2;

fn default_double_press_interval() -> u64 {
    DEFAULT_DOUBLE_PRESS_INTERVAL_MS
}

fn default_sequence_interval() -> u64 {
    DEFAULT_SEQUENCE_INTERVAL_MS
}

/// One step of a [`KeyCombination::Sequence`]: a key with optional modifiers.
///
/// A step with no modifiers is a simple press; a step with modifiers is a
/// combo press. Equality is derived, with the modifier set unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceStep {
    /// Modifiers that must be held for this step (may be empty).
    #[serde(default)]
    pub modifiers: Modifiers,
    /// The key pressed in this step.
    pub key: Key,
}

impl SequenceStep {
    /// A bare key press step.
    pub fn simple(key: Key) -> Self {
        Self { modifiers: Modifiers::NONE, key }
    }

    /// A modified key press step.
    pub fn combo(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Check if this step has no modifiers.
    pub fn is_simple(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl fmt::Display for SequenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.any() {
            write!(f, "{}+", self.modifiers)?;
        }
        f.write_str(&self.key.canonical_name().to_ascii_lowercase())
    }
}

/// A key combination an action can bind to.
///
/// Structural equality (`PartialEq`) compares every field including
/// intervals; conflict detection uses [`same_binding`](Self::same_binding),
/// which ignores intervals and treats modifier sets as unordered.
///
/// The serialized form is a tagged JSON object (`"type"`: `"simple"`,
/// `"combo"`, `"double"`, or `"sequence"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyCombination {
    /// A single key with no modifiers.
    Simple {
        /// The key.
        key: Key,
    },
    /// One or more modifiers plus a main key.
    Combo {
        /// The required modifier set (must be non-empty to validate).
        modifiers: Modifiers,
        /// The main key.
        key: Key,
    },
    /// The same key pressed twice within `interval_ms`.
    #[serde(rename = "double")]
    DoublePress {
        /// The key to double-press.
        key: Key,
        /// Maximum time between the two presses.
        #[serde(rename = "intervalMs", default = "default_double_press_interval")]
        interval_ms: u64,
    },
    /// An ordered list of steps, each within `interval_ms` of the previous.
    Sequence {
        /// The steps, in order (must have at least two to validate).
        steps: Vec<SequenceStep>,
        /// Maximum time between consecutive steps.
        #[serde(rename = "intervalMs", default = "default_sequence_interval")]
        interval_ms: u64,
    },
}

impl KeyCombination {
    /// A single unmodified key.
    pub fn simple(key: Key) -> Self {
        Self::Simple { key }
    }

    /// Modifiers plus a main key.
    pub fn combo(modifiers: impl Into<Modifiers>, key: Key) -> Self {
        Self::Combo { modifiers: modifiers.into(), key }
    }

    /// A Ctrl+key combination.
    pub fn ctrl(key: Key) -> Self {
        Self::combo(Modifiers::CTRL, key)
    }

    /// A double press of `key` with the default interval.
    pub fn double_press(key: Key) -> Self {
        Self::DoublePress { key, interval_ms: DEFAULT_DOUBLE_PRESS_INTERVAL_MS }
    }

    /// A double press of `key` with a custom interval.
    pub fn double_press_with_interval(key: Key, interval_ms: u64) -> Self {
        Self::DoublePress { key, interval_ms }
    }

    /// A sequence of steps with the default inter-step interval.
    pub fn sequence(steps: Vec<SequenceStep>) -> Self {
        Self::Sequence { steps, interval_ms: DEFAULT_SEQUENCE_INTERVAL_MS }
    }

    /// A sequence of steps with a custom inter-step interval.
    pub fn sequence_with_interval(steps: Vec<SequenceStep>, interval_ms: u64) -> Self {
        Self::Sequence { steps, interval_ms }
    }

    /// The shape name used in the serialized `type` tag.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Simple { .. } => "simple",
            Self::Combo { .. } => "combo",
            Self::DoublePress { .. } => "double",
            Self::Sequence { .. } => "sequence",
        }
    }

    /// The main key of this combination, if it has a single one.
    ///
    /// Sequences have no single main key and return `None`.
    pub fn primary_key(&self) -> Option<Key> {
        match self {
            Self::Simple { key } | Self::Combo { key, .. } | Self::DoublePress { key, .. } => {
                Some(*key)
            }
            Self::Sequence { .. } => None,
        }
    }

    /// The steps of a sequence, or `None` for the other shapes.
    pub fn sequence_steps(&self) -> Option<&[SequenceStep]> {
        match self {
            Self::Sequence { steps, .. } => Some(steps),
            _ => None,
        }
    }

    /// Semantic equality: do two combinations denote the same binding?
    ///
    /// Rules: modifier sets compare as unordered sets; double-press and
    /// sequence intervals are irrelevant; sequences compare positionally;
    /// different shapes are never equal.
    pub fn same_binding(&self, other: &KeyCombination) -> bool {
        match (self, other) {
            (Self::Simple { key: a }, Self::Simple { key: b }) => a == b,
            (
                Self::Combo { modifiers: am, key: ak },
                Self::Combo { modifiers: bm, key: bk },
            ) => am == bm && ak == bk,
            (Self::DoublePress { key: a, .. }, Self::DoublePress { key: b, .. }) => a == b,
            (Self::Sequence { steps: a, .. }, Self::Sequence { steps: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl fmt::Display for KeyCombination {
    /// The canonical lowercase string form (`stringify` in the public API).
    ///
    /// The grammar cannot distinguish a double press from a sequence of two
    /// identical bare steps: `Sequence[g, g]` prints as `"g g"`, which
    /// reparses as `DoublePress(G)`. The tagged serde form is unambiguous;
    /// use it wherever the shape must survive a round trip.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { key } => {
                f.write_str(&key.canonical_name().to_ascii_lowercase())
            }
            Self::Combo { modifiers, key } => {
                write!(f, "{}+{}", modifiers, key.canonical_name().to_ascii_lowercase())
            }
            Self::DoublePress { key, .. } => {
                let name = key.canonical_name().to_ascii_lowercase();
                write!(f, "{name} {name}")
            }
            Self::Sequence { steps, .. } => {
                let mut first = true;
                for step in steps {
                    if !first {
                        f.write_str(" ")?;
                    }
                    write!(f, "{step}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// Error type for parsing canonical combination strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The string is empty.
    Empty,
    /// A token's key part is not a known key name.
    UnknownKey(String),
    /// A token's modifier part is not a known modifier name.
    UnknownModifier(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key combination"),
            Self::UnknownKey(s) => write!(f, "unknown key: {s:?}"),
            Self::UnknownModifier(s) => write!(f, "unknown modifier: {s:?}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one whitespace-separated token like `"ctrl+shift+s"` or `"g"`.
///
/// Every `+`-separated part except the last must be a modifier name; the
/// last part is the key. A lone modifier name (`"shift"`) parses as a bare
/// press of that modifier key.
fn parse_step(token: &str) -> Result<SequenceStep, ParseError> {
    let mut modifiers = Modifiers::NONE;
    let parts: Vec<&str> = token.split('+').collect();
    let Some((key_part, modifier_parts)) = parts.split_last() else {
        return Err(ParseError::Empty);
    };

    for part in modifier_parts {
        let modifier = Modifier::parse(part.trim())
            .ok_or_else(|| ParseError::UnknownModifier(part.to_string()))?;
        modifiers = modifiers.with(modifier);
    }

    let key = Key::normalize(key_part.trim())
        .ok_or_else(|| ParseError::UnknownKey(key_part.to_string()))?;

    Ok(SequenceStep { modifiers, key })
}

impl FromStr for KeyCombination {
    type Err = ParseError;

    /// Parse the canonical string form (`parseKeys` in the public API).
    ///
    /// Two identical bare tokens parse as a double press; any other
    /// multi-token string parses as a sequence.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let steps = tokens
            .iter()
            .map(|token| parse_step(token))
            .collect::<Result<Vec<_>, _>>()?;

        match steps.as_slice() {
            [step] => {
                if step.is_simple() {
                    Ok(Self::simple(step.key))
                } else {
                    Ok(Self::combo(step.modifiers, step.key))
                }
            }
            [first, second] if first == second && first.is_simple() => {
                Ok(Self::double_press(first.key))
            }
            _ => Ok(Self::sequence(steps)),
        }
    }
}
