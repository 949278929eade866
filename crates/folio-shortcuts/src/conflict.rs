//! Conflict detection between shortcut bindings.
//!
//! Two bindings conflict when they denote the same gesture, and also when
//! one sequence is a strict prefix of another (the shorter sequence would
//! fire before the longer one could complete). Conflicts are symmetric.

use folio_keys::{KeyCombination, Modifier};
use tracing::warn;

use crate::action::ShortcutConfig;

/// A binding that collides with a candidate combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictInfo {
    /// Identifier of the conflicting action.
    pub id: String,
    /// Display name of the conflicting action.
    pub name: String,
    /// The combination it is bound to.
    pub keys: KeyCombination,
    /// Its priority.
    pub priority: u8,
}

impl ConflictInfo {
    fn from_config(config: &ShortcutConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            keys: config.keys.clone(),
            priority: config.priority,
        }
    }
}

/// Check whether two combinations collide.
///
/// Same-binding gestures always collide. A sequence that is a strict prefix
/// of another sequence also collides with it, in either direction.
pub fn combinations_conflict(a: &KeyCombination, b: &KeyCombination) -> bool {
    if a.same_binding(b) {
        return true;
    }
    match (a.sequence_steps(), b.sequence_steps()) {
        (Some(sa), Some(sb)) => is_strict_prefix(sa, sb) || is_strict_prefix(sb, sa),
        _ => false,
    }
}

fn is_strict_prefix(
    shorter: &[folio_keys::SequenceStep],
    longer: &[folio_keys::SequenceStep],
) -> bool {
    shorter.len() < longer.len() && shorter.iter().zip(longer.iter()).all(|(x, y)| x == y)
}

/// Find every enabled binding that collides with `candidate`.
///
/// `exclude_id` skips the action being edited so it does not conflict with
/// its own current binding. Disabled bindings never participate.
pub fn find_conflicts<'a>(
    candidate: &KeyCombination,
    configs: impl IntoIterator<Item = &'a ShortcutConfig>,
    exclude_id: Option<&str>,
) -> Vec<ConflictInfo> {
    configs
        .into_iter()
        .filter(|config| config.enabled)
        .filter(|config| exclude_id != Some(config.id.as_str()))
        .filter(|config| combinations_conflict(candidate, &config.keys))
        .map(ConflictInfo::from_config)
        .collect()
}

/// How one conflict between a candidate and an existing binding settles.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The existing binding outranks the candidate; the candidate yields.
    DisableCandidate,
    /// The candidate outranks the existing binding, which gets disabled.
    DisableExisting {
        /// Identifier of the disabled action.
        id: String,
    },
    /// Equal priority; neither side is auto-disabled without guidance.
    Suggest {
        /// Identifier of the existing binding.
        id: String,
        /// A free variant of the candidate, when one exists.
        alternative: Option<KeyCombination>,
    },
}

/// Settle conflicts between a candidate binding and the bindings it hit.
///
/// Per conflict: a strictly higher-priority existing binding wins and the
/// candidate yields; a strictly lower-priority one is disabled; equal
/// priority produces a suggestion built by trying unused modifiers against
/// everything in `in_use`.
pub fn resolve_conflicts(
    candidate_id: &str,
    candidate: &KeyCombination,
    candidate_priority: u8,
    conflicts: &[ConflictInfo],
    in_use: &[KeyCombination],
) -> Vec<Resolution> {
    conflicts
        .iter()
        .map(|c| {
            if c.priority > candidate_priority {
                warn!(
                    target: "folio::shortcuts",
                    id = candidate_id,
                    existing = %c.id,
                    "binding conflict, higher-priority binding kept"
                );
                Resolution::DisableCandidate
            } else if c.priority < candidate_priority {
                warn!(
                    target: "folio::shortcuts",
                    id = candidate_id,
                    disabled = %c.id,
                    "binding conflict, lower-priority binding disabled"
                );
                Resolution::DisableExisting { id: c.id.clone() }
            } else {
                Resolution::Suggest {
                    id: c.id.clone(),
                    alternative: suggest_free_binding(candidate, in_use),
                }
            }
        })
        .collect()
}

/// Propose an unused variant of `candidate` by adding one more modifier.
///
/// Tries each absent modifier in Ctrl, Alt, Shift, Meta order and returns
/// the first variant that collides with nothing in `in_use`. Only combos
/// can be varied this way; other shapes return `None`.
pub fn suggest_free_binding<'a>(
    candidate: &KeyCombination,
    in_use: impl IntoIterator<Item = &'a KeyCombination> + Copy,
) -> Option<KeyCombination> {
    let (modifiers, key) = match candidate {
        KeyCombination::Combo { modifiers, key } => (*modifiers, *key),
        _ => return None,
    };

    for modifier in Modifier::ALL {
        if modifiers.contains(modifier) {
            continue;
        }
        let variant = KeyCombination::combo(modifiers.with(modifier), key);
        let free = !in_use
            .into_iter()
            .any(|used| combinations_conflict(&variant, used));
        if free {
            return Some(variant);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_keys::{Key, Modifiers, SequenceStep};

    fn config(id: &str, keys: KeyCombination, priority: u8, enabled: bool) -> ShortcutConfig {
        ShortcutConfig {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: crate::action::Category::System,
            default_keys: keys.clone(),
            keys,
            enabled,
            priority,
            scope: crate::action::Scope::Global,
            customizable: true,
            customized: false,
        }
    }

    #[test]
    fn test_conflict_is_symmetric() {
        let a = KeyCombination::ctrl(Key::S);
        let b = KeyCombination::combo(Modifiers::CTRL, Key::S);
        let c = KeyCombination::ctrl(Key::D);
        assert_eq!(combinations_conflict(&a, &b), combinations_conflict(&b, &a));
        assert!(combinations_conflict(&a, &b));
        assert!(!combinations_conflict(&a, &c));
    }

    #[test]
    fn test_interval_does_not_affect_conflict() {
        let fast = KeyCombination::double_press_with_interval(Key::Shift, 300);
        let slow = KeyCombination::double_press_with_interval(Key::Shift, 800);
        assert!(combinations_conflict(&fast, &slow));
    }

    #[test]
    fn test_sequence_prefix_conflict() {
        let short = KeyCombination::sequence(vec![
            SequenceStep::simple(Key::G),
            SequenceStep::simple(Key::G),
        ]);
        let long = KeyCombination::sequence(vec![
            SequenceStep::simple(Key::G),
            SequenceStep::simple(Key::G),
            SequenceStep::simple(Key::H),
        ]);
        let other = KeyCombination::sequence(vec![
            SequenceStep::simple(Key::G),
            SequenceStep::simple(Key::H),
        ]);
        assert!(combinations_conflict(&short, &long));
        assert!(combinations_conflict(&long, &short));
        assert!(!combinations_conflict(&short, &other));
    }

    #[test]
    fn test_find_conflicts_skips_disabled_and_excluded() {
        let configs = vec![
            config("a", KeyCombination::ctrl(Key::S), 5, true),
            config("b", KeyCombination::ctrl(Key::S), 5, false),
            config("c", KeyCombination::ctrl(Key::D), 5, true),
        ];

        let hits = find_conflicts(&KeyCombination::ctrl(Key::S), &configs, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let hits = find_conflicts(&KeyCombination::ctrl(Key::S), &configs, Some("a"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_resolution_by_priority() {
        let candidate = KeyCombination::ctrl(Key::S);
        let existing = vec![ConflictInfo {
            id: "old".to_string(),
            name: "Old".to_string(),
            keys: KeyCombination::ctrl(Key::S),
            priority: 4,
        }];
        let in_use = vec![KeyCombination::ctrl(Key::S)];

        // Higher priority wins; the existing binding is disabled.
        assert_eq!(
            resolve_conflicts("new", &candidate, 7, &existing, &in_use),
            vec![Resolution::DisableExisting { id: "old".to_string() }]
        );

        // Lower priority yields to the existing binding.
        assert_eq!(
            resolve_conflicts("new", &candidate, 3, &existing, &in_use),
            vec![Resolution::DisableCandidate]
        );

        // Equal priority produces a suggestion with a free variant.
        assert_eq!(
            resolve_conflicts("new", &candidate, 4, &existing, &in_use),
            vec![Resolution::Suggest {
                id: "old".to_string(),
                alternative: Some(KeyCombination::combo(
                    Modifiers::CTRL.with(Modifier::Alt),
                    Key::S
                )),
            }]
        );

        assert!(resolve_conflicts("new", &candidate, 7, &[], &in_use).is_empty());
    }

    #[test]
    fn test_suggest_free_binding() {
        let candidate = KeyCombination::ctrl(Key::S);
        let in_use = vec![
            KeyCombination::ctrl(Key::S),
            KeyCombination::combo(Modifiers::CTRL.with(Modifier::Alt), Key::S),
        ];
        let suggestion = suggest_free_binding(&candidate, &in_use);
        assert_eq!(
            suggestion,
            Some(KeyCombination::combo(Modifiers::CTRL_SHIFT, Key::S))
        );

        assert!(suggest_free_binding(&KeyCombination::double_press(Key::Shift), &in_use).is_none());
    }
}
