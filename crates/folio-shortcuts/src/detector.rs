//! Key event matching and dispatch.
//!
//! [`KeyDetector`] holds the armed bindings and a small amount of timing
//! state: the keys currently held, the last release (for double-press), and
//! a rolling buffer of recent presses (for sequences). The host feeds every
//! keydown and keyup through [`key_down`](KeyDetector::key_down) and
//! [`key_up`](KeyDetector::key_up); the detector calls the matching
//! handler and reports what happened through [`DispatchOutcome`].

use std::time::Instant;

use folio_keys::{Key, KeyCombination, SequenceStep};
use tracing::{debug, trace};

use crate::action::ShortcutHandler;
use crate::event::KeyEvent;

/// Minimum spacing between processed keydown events, in milliseconds.
///
/// One 60 Hz frame. Auto-repeat and event storms beyond this rate carry no
/// gesture information and are dropped before matching.
pub const EVENT_THROTTLE_MS: u64 = 16;

/// Maximum number of presses remembered for sequence matching.
const SEQUENCE_BUFFER_CAP: usize = 8;

/// What the detector did with a keydown event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A binding fired; carries its action id.
    Activated(String),
    /// The event extended a prefix of at least one sequence binding.
    PendingSequence,
    /// No binding matched.
    NoMatch,
    /// The event was dropped before matching (not listening, throttled,
    /// auto-repeat, or focus on an editable element).
    Ignored,
}

struct Binding {
    id: String,
    keys: KeyCombination,
    handler: ShortcutHandler,
}

/// Matches incoming key events against armed bindings.
pub struct KeyDetector {
    bindings: Vec<Binding>,
    listening: bool,
    double_press_enabled: bool,
    throttle_ms: u64,
    pressed: Vec<Key>,
    last_event: Option<Instant>,
    last_release: Option<(Key, Instant)>,
    sequence_buffer: Vec<(SequenceStep, Instant)>,
}

impl Default for KeyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDetector {
    /// Create a detector with no bindings, not yet listening.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            listening: false,
            double_press_enabled: true,
            throttle_ms: EVENT_THROTTLE_MS,
            pressed: Vec::new(),
            last_event: None,
            last_release: None,
            sequence_buffer: Vec::new(),
        }
    }

    /// Begin processing events. Idempotent.
    pub fn start(&mut self) {
        if !self.listening {
            self.listening = true;
            self.reset_state();
            debug!(target: "folio::detector", "detector started");
        }
    }

    /// Stop processing events and drop all transient state. Idempotent.
    pub fn stop(&mut self) {
        if self.listening {
            self.listening = false;
            self.reset_state();
            debug!(target: "folio::detector", "detector stopped");
        }
    }

    /// Check if the detector is processing events.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Override the keydown throttle window.
    pub fn set_throttle_ms(&mut self, throttle_ms: u64) {
        self.throttle_ms = throttle_ms;
    }

    /// Enable or disable double-press matching.
    pub fn set_double_press_enabled(&mut self, enabled: bool) {
        self.double_press_enabled = enabled;
        if !enabled {
            self.last_release = None;
        }
    }

    /// Arm a binding, replacing any previous binding with the same id.
    pub fn register(&mut self, id: impl Into<String>, keys: KeyCombination, handler: ShortcutHandler) {
        let id = id.into();
        self.bindings.retain(|b| b.id != id);
        self.bindings.push(Binding { id, keys, handler });
    }

    /// Disarm the binding with the given id, if armed.
    pub fn unregister(&mut self, id: &str) {
        self.bindings.retain(|b| b.id != id);
    }

    /// Disarm everything.
    pub fn clear_all(&mut self) {
        self.bindings.clear();
        self.reset_state();
    }

    /// Number of armed bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// The keys currently held down.
    pub fn pressed_keys(&self) -> &[Key] {
        &self.pressed
    }

    fn reset_state(&mut self) {
        self.pressed.clear();
        self.last_event = None;
        self.last_release = None;
        self.sequence_buffer.clear();
    }

    /// Process a keydown event.
    ///
    /// Matching order is registration order; the first match wins, accepts
    /// the event, and runs its handler. Shortcuts are suppressed while an
    /// editable element has focus, except for Escape.
    pub fn key_down(&mut self, event: &mut KeyEvent) -> DispatchOutcome {
        if !self.listening || event.is_repeat {
            return DispatchOutcome::Ignored;
        }

        if let Some(last) = self.last_event {
            let elapsed = event.timestamp.saturating_duration_since(last);
            if elapsed.as_millis() < u128::from(self.throttle_ms) {
                trace!(target: "folio::detector", key = %event.key, "keydown throttled");
                return DispatchOutcome::Ignored;
            }
        }
        self.last_event = Some(event.timestamp);

        if event.focus.swallows_shortcuts() && event.key != Key::Escape {
            return DispatchOutcome::Ignored;
        }

        if !self.pressed.contains(&event.key) {
            self.pressed.push(event.key);
        }

        // Modifier presses never advance a sequence; "g g" must survive the
        // user holding Shift between steps.
        if !event.key.is_modifier() {
            self.push_sequence_step(SequenceStep::combo(event.modifiers, event.key), event.timestamp);
        }

        let mut pending = false;
        let mut matched: Option<(usize, String)> = None;

        for (index, binding) in self.bindings.iter().enumerate() {
            match self.match_binding(&binding.keys, event) {
                BindingMatch::Full => {
                    matched = Some((index, binding.id.clone()));
                    break;
                }
                BindingMatch::Prefix => pending = true,
                BindingMatch::None => {}
            }
        }

        if let Some((index, id)) = matched {
            event.accept();
            if matches!(self.bindings[index].keys, KeyCombination::Sequence { .. }) {
                self.sequence_buffer.clear();
            }
            if matches!(self.bindings[index].keys, KeyCombination::DoublePress { .. }) {
                self.last_release = None;
            }
            debug!(target: "folio::detector", id = %id, "shortcut activated");
            let handler = self.bindings[index].handler.clone();
            handler(event);
            return DispatchOutcome::Activated(id);
        }

        if pending {
            DispatchOutcome::PendingSequence
        } else {
            DispatchOutcome::NoMatch
        }
    }

    /// Process a keyup event.
    pub fn key_up(&mut self, event: &KeyEvent) {
        self.pressed.retain(|k| *k != event.key);
        if self.double_press_enabled {
            self.last_release = Some((event.key, event.timestamp));
        }
    }

    fn push_sequence_step(&mut self, step: SequenceStep, at: Instant) {
        if self.sequence_buffer.len() == SEQUENCE_BUFFER_CAP {
            self.sequence_buffer.remove(0);
        }
        self.sequence_buffer.push((step, at));
    }

    fn match_binding(&self, keys: &KeyCombination, event: &KeyEvent) -> BindingMatch {
        match keys {
            KeyCombination::Simple { key } => {
                if *key == event.key && event.modifiers.is_empty() {
                    BindingMatch::Full
                } else {
                    BindingMatch::None
                }
            }
            KeyCombination::Combo { modifiers, key } => {
                if *key == event.key && *modifiers == event.modifiers {
                    BindingMatch::Full
                } else {
                    BindingMatch::None
                }
            }
            KeyCombination::DoublePress { key, interval_ms } => {
                if !self.double_press_enabled || *key != event.key {
                    return BindingMatch::None;
                }
                match self.last_release {
                    Some((released, at)) if released == *key => {
                        let gap = event.timestamp.saturating_duration_since(at);
                        if gap.as_millis() <= u128::from(*interval_ms) {
                            BindingMatch::Full
                        } else {
                            BindingMatch::None
                        }
                    }
                    _ => BindingMatch::None,
                }
            }
            KeyCombination::Sequence { steps, interval_ms } => {
                self.match_sequence(steps, *interval_ms)
            }
        }
    }

    /// Compare a sequence binding against the tail of the press buffer.
    fn match_sequence(&self, steps: &[SequenceStep], interval_ms: u64) -> BindingMatch {
        if self.tail_matches(steps, interval_ms, steps.len()) {
            return BindingMatch::Full;
        }
        // Any proper prefix ending at the newest press keeps the gesture
        // alive.
        for taken in 1..steps.len() {
            if self.tail_matches(&steps[..taken], interval_ms, taken) {
                return BindingMatch::Prefix;
            }
        }
        BindingMatch::None
    }

    fn tail_matches(&self, steps: &[SequenceStep], interval_ms: u64, taken: usize) -> bool {
        if self.sequence_buffer.len() < taken {
            return false;
        }
        let tail = &self.sequence_buffer[self.sequence_buffer.len() - taken..];
        let steps_match = tail.iter().zip(steps.iter()).all(|((got, _), want)| got == want);
        if !steps_match {
            return false;
        }
        tail.windows(2).all(|pair| {
            let gap = pair[1].1.saturating_duration_since(pair[0].1);
            gap.as_millis() <= u128::from(interval_ms)
        })
    }
}

enum BindingMatch {
    Full,
    Prefix,
    None,
}

impl std::fmt::Debug for KeyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDetector")
            .field("bindings", &self.bindings.len())
            .field("listening", &self.listening)
            .field("double_press_enabled", &self.double_press_enabled)
            .field("pressed", &self.pressed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_keys::Modifiers;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::event::FocusTarget;

    fn counter_handler(hits: &Arc<AtomicUsize>) -> ShortcutHandler {
        let hits = Arc::clone(hits);
        Arc::new(move |_event| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn detector_with(id: &str, keys: KeyCombination, hits: &Arc<AtomicUsize>) -> KeyDetector {
        let mut detector = KeyDetector::new();
        detector.register(id, keys, counter_handler(hits));
        detector.start();
        detector
    }

    fn event_at(key: Key, modifiers: Modifiers, base: Instant, offset_ms: u64) -> KeyEvent {
        KeyEvent::new(key, modifiers).with_timestamp(base + Duration::from_millis(offset_ms))
    }

    #[test]
    fn test_combo_dispatch() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("save", KeyCombination::ctrl(Key::S), &hits);

        let mut event = KeyEvent::new(Key::S, Modifiers::CTRL);
        assert_eq!(
            detector.key_down(&mut event),
            DispatchOutcome::Activated("save".to_string())
        );
        assert!(event.is_accepted());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Wrong modifier set does not fire.
        let mut event = KeyEvent::new(Key::S, Modifiers::CTRL_SHIFT)
            .with_timestamp(Instant::now() + Duration::from_millis(100));
        assert_eq!(detector.key_down(&mut event), DispatchOutcome::NoMatch);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_not_listening_ignores() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("save", KeyCombination::ctrl(Key::S), &hits);
        detector.stop();

        let mut event = KeyEvent::new(Key::S, Modifiers::CTRL);
        assert_eq!(detector.key_down(&mut event), DispatchOutcome::Ignored);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_throttle_drops_rapid_events() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("help", KeyCombination::simple(Key::F1), &hits);
        let base = Instant::now();

        let mut first = event_at(Key::F1, Modifiers::NONE, base, 0);
        assert_eq!(
            detector.key_down(&mut first),
            DispatchOutcome::Activated("help".to_string())
        );

        // 5ms later, inside the throttle window.
        let mut second = event_at(Key::F1, Modifiers::NONE, base, 5);
        assert_eq!(detector.key_down(&mut second), DispatchOutcome::Ignored);

        let mut third = event_at(Key::F1, Modifiers::NONE, base, 40);
        assert_eq!(
            detector.key_down(&mut third),
            DispatchOutcome::Activated("help".to_string())
        );
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_text_input_suppression_except_escape() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("close", KeyCombination::simple(Key::Escape), &hits);
        detector.register("save", KeyCombination::ctrl(Key::S), counter_handler(&hits));
        let base = Instant::now();

        let mut save = event_at(Key::S, Modifiers::CTRL, base, 0).with_focus(FocusTarget::TextInput);
        assert_eq!(detector.key_down(&mut save), DispatchOutcome::Ignored);

        let mut escape =
            event_at(Key::Escape, Modifiers::NONE, base, 40).with_focus(FocusTarget::TextInput);
        assert_eq!(
            detector.key_down(&mut escape),
            DispatchOutcome::Activated("close".to_string())
        );
    }

    #[test]
    fn test_auto_repeat_ignored() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("save", KeyCombination::ctrl(Key::S), &hits);

        let mut event = KeyEvent::new(Key::S, Modifiers::CTRL).with_repeat(true);
        assert_eq!(detector.key_down(&mut event), DispatchOutcome::Ignored);
    }

    #[test]
    fn test_double_press_within_interval() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with(
            "search.open",
            KeyCombination::double_press_with_interval(Key::Shift, 500),
            &hits,
        );
        let base = Instant::now();

        let mut first = event_at(Key::Shift, Modifiers::SHIFT, base, 0);
        assert_eq!(detector.key_down(&mut first), DispatchOutcome::NoMatch);
        detector.key_up(&event_at(Key::Shift, Modifiers::NONE, base, 50));

        let mut second = event_at(Key::Shift, Modifiers::SHIFT, base, 300);
        assert_eq!(
            detector.key_down(&mut second),
            DispatchOutcome::Activated("search.open".to_string())
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_double_press_outside_interval() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with(
            "search.open",
            KeyCombination::double_press_with_interval(Key::Shift, 500),
            &hits,
        );
        let base = Instant::now();

        let mut first = event_at(Key::Shift, Modifiers::SHIFT, base, 0);
        detector.key_down(&mut first);
        detector.key_up(&event_at(Key::Shift, Modifiers::NONE, base, 50));

        let mut second = event_at(Key::Shift, Modifiers::SHIFT, base, 900);
        assert_eq!(detector.key_down(&mut second), DispatchOutcome::NoMatch);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_double_press_disabled_by_preference() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with(
            "search.open",
            KeyCombination::double_press_with_interval(Key::Shift, 500),
            &hits,
        );
        detector.set_double_press_enabled(false);
        let base = Instant::now();

        let mut first = event_at(Key::Shift, Modifiers::SHIFT, base, 0);
        detector.key_down(&mut first);
        detector.key_up(&event_at(Key::Shift, Modifiers::NONE, base, 50));

        let mut second = event_at(Key::Shift, Modifiers::SHIFT, base, 300);
        assert_eq!(detector.key_down(&mut second), DispatchOutcome::NoMatch);
    }

    #[test]
    fn test_sequence_dispatch_and_pending() {
        let hits = Arc::new(AtomicUsize::new(0));
        let steps = vec![SequenceStep::simple(Key::G), SequenceStep::simple(Key::G)];
        let mut detector = detector_with(
            "view.goTop",
            KeyCombination::sequence_with_interval(steps, 1000),
            &hits,
        );
        let base = Instant::now();

        let mut first = event_at(Key::G, Modifiers::NONE, base, 0);
        assert_eq!(detector.key_down(&mut first), DispatchOutcome::PendingSequence);

        let mut second = event_at(Key::G, Modifiers::NONE, base, 400);
        assert_eq!(
            detector.key_down(&mut second),
            DispatchOutcome::Activated("view.goTop".to_string())
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // The buffer is cleared on match; a third press starts over.
        let mut third = event_at(Key::G, Modifiers::NONE, base, 800);
        assert_eq!(detector.key_down(&mut third), DispatchOutcome::PendingSequence);
    }

    #[test]
    fn test_sequence_gap_timeout() {
        let hits = Arc::new(AtomicUsize::new(0));
        let steps = vec![SequenceStep::simple(Key::G), SequenceStep::simple(Key::G)];
        let mut detector = detector_with(
            "view.goTop",
            KeyCombination::sequence_with_interval(steps, 1000),
            &hits,
        );
        let base = Instant::now();

        let mut first = event_at(Key::G, Modifiers::NONE, base, 0);
        detector.key_down(&mut first);

        // Too slow; the second press becomes a fresh prefix.
        let mut second = event_at(Key::G, Modifiers::NONE, base, 2000);
        assert_eq!(detector.key_down(&mut second), DispatchOutcome::PendingSequence);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sequence_survives_held_modifier_press() {
        let hits = Arc::new(AtomicUsize::new(0));
        let steps = vec![SequenceStep::simple(Key::G), SequenceStep::simple(Key::G)];
        let mut detector = detector_with("view.goTop", KeyCombination::sequence(steps), &hits);
        let base = Instant::now();

        let mut first = event_at(Key::G, Modifiers::NONE, base, 0);
        detector.key_down(&mut first);

        // A stray Shift press between steps does not break the gesture.
        let mut shift = event_at(Key::Shift, Modifiers::SHIFT, base, 200);
        detector.key_down(&mut shift);

        let mut second = event_at(Key::G, Modifiers::NONE, base, 400);
        assert_eq!(
            detector.key_down(&mut second),
            DispatchOutcome::Activated("view.goTop".to_string())
        );
    }

    #[test]
    fn test_registration_order_first_match_wins() {
        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));
        let mut detector = KeyDetector::new();
        detector.register("first", KeyCombination::ctrl(Key::S), counter_handler(&hits_a));
        detector.register("second", KeyCombination::ctrl(Key::S), counter_handler(&hits_b));
        detector.start();

        let mut event = KeyEvent::new(Key::S, Modifiers::CTRL);
        assert_eq!(
            detector.key_down(&mut event),
            DispatchOutcome::Activated("first".to_string())
        );
        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_clears_transient_state() {
        let hits = Arc::new(AtomicUsize::new(0));
        let steps = vec![SequenceStep::simple(Key::G), SequenceStep::simple(Key::G)];
        let mut detector = detector_with("view.goTop", KeyCombination::sequence(steps), &hits);
        let base = Instant::now();

        let mut first = event_at(Key::G, Modifiers::NONE, base, 0);
        detector.key_down(&mut first);
        detector.stop();
        assert!(!detector.is_listening());
        detector.start();
        assert!(detector.is_listening());

        // Prefix state did not survive the restart.
        let mut second = event_at(Key::G, Modifiers::NONE, base, 400);
        assert_eq!(detector.key_down(&mut second), DispatchOutcome::PendingSequence);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut detector = detector_with("save", KeyCombination::ctrl(Key::S), &hits);
        detector.register("save", KeyCombination::ctrl(Key::D), counter_handler(&hits));
        assert_eq!(detector.binding_count(), 1);

        let mut old = KeyEvent::new(Key::S, Modifiers::CTRL);
        assert_eq!(detector.key_down(&mut old), DispatchOutcome::NoMatch);

        let mut new = KeyEvent::new(Key::D, Modifiers::CTRL)
            .with_timestamp(Instant::now() + Duration::from_millis(100));
        assert_eq!(
            detector.key_down(&mut new),
            DispatchOutcome::Activated("save".to_string())
        );
    }
}
