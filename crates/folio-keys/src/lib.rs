//! Key model foundation for Folio keyboard shortcuts.
//!
//! This crate defines the vocabulary the shortcut system is built on:
//! canonical [`Key`] identifiers, unordered [`Modifiers`] sets, the
//! [`KeyCombination`] binding shapes (simple, combo, double-press,
//! sequence), and [`Platform`]-specific normalization and display.
//!
//! It carries no UI or storage concerns; the shortcut registry, validator,
//! detector, and persistence live in `folio-shortcuts`.
//!
//! # Example
//!
//! ```
//! use folio_keys::{Key, KeyCombination, Modifiers, Platform};
//!
//! let save: KeyCombination = "ctrl+shift+s".parse()?;
//! assert_eq!(save, KeyCombination::combo(Modifiers::CTRL_SHIFT, Key::S));
//! assert_eq!(Platform::Linux.display_string(&save), "Ctrl+Shift+S");
//! # Ok::<(), folio_keys::ParseError>(())
//! ```

mod combination;
mod key;
mod modifiers;
mod platform;

pub use combination::{
    KeyCombination, ParseError, SequenceStep, DEFAULT_DOUBLE_PRESS_INTERVAL_MS,
    DEFAULT_SEQUENCE_INTERVAL_MS, MIN_DOUBLE_PRESS_INTERVAL_MS, MIN_SEQUENCE_INTERVAL_MS,
    MIN_SEQUENCE_STEPS,
};
pub use key::Key;
pub use modifiers::{Modifier, Modifiers};
pub use platform::Platform;
