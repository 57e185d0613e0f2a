//! The engine instance hosts talk to
//!
//! A [`Keytrap`] listens on one [`InputTarget`], owns its bindings, sequence
//! progress and capture flags, and turns raw keyboard events into callback
//! invocations plus a [`Dispatch`] verdict.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::binding::{Binding, Callback, CallbackResult, SequenceStep};
use super::config::Keymap;
use super::event::{Element, KeyboardEvent};
use super::gate::{Dispatch, EventGate, InputTarget};
use super::normalizer::{modifiers_from_event, KeyNormalizer};
use super::parser::{normalize_pattern, split_steps, ComboParser};
use super::registry::{BindingRegistry, KeyQuery};
use super::sequence::{Deferred, SequenceMatcher, DEFAULT_SEQUENCE_TIMEOUT};
use super::types::{is_modifier, ActionKind, Modifiers, Pattern, Platform, SequenceSpec};
use crate::config::KeytrapConfig;

#[derive(Debug)]
pub struct Keytrap {
    keys: KeyNormalizer,
    parser: ComboParser,
    registry: BindingRegistry,
    sequences: SequenceMatcher,
    gate: EventGate,
    /// Key whose next keyup belongs to a sequence that already completed
    ignore_next_keyup: Option<String>,
    /// The keydown before this keypress already advanced a sequence
    ignore_next_keypress: bool,
}

impl Keytrap {
    /// Engine listening on the whole document
    pub fn new() -> Self {
        Self::with_target(InputTarget::Document)
    }

    pub fn with_target(target: InputTarget) -> Self {
        Self {
            keys: KeyNormalizer::new(),
            parser: ComboParser::new(Platform::current()),
            registry: BindingRegistry::new(),
            sequences: SequenceMatcher::new(DEFAULT_SEQUENCE_TIMEOUT),
            gate: EventGate::new(target),
            ignore_next_keyup: None,
            ignore_next_keypress: false,
        }
    }

    /// Resolve `mod` for `platform`; affects patterns bound afterwards
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.parser = ComboParser::new(platform);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.sequences.set_timeout(timeout);
        self
    }

    pub fn from_config(config: &KeytrapConfig) -> Self {
        Self::new()
            .with_platform(config.platform())
            .with_timeout(config.sequence_timeout())
    }

    pub fn platform(&self) -> Platform {
        self.parser.platform()
    }

    pub fn target(&self) -> &InputTarget {
        self.gate.target()
    }

    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    /// Raw keydown code for a key name under this instance's code table
    pub fn code_for_key(&self, key: &str) -> Option<u32> {
        self.keys.code_for_key(key)
    }

    /// Bind `callback` to a combo or sequence pattern
    ///
    /// `action` forces keydown, keyup or keypress; `None` picks the best
    /// action for each key. Binding the same pattern and action again
    /// replaces the earlier callback.
    pub fn bind<F, R>(&mut self, pattern: &str, action: Option<ActionKind>, callback: F) -> &mut Self
    where
        F: FnMut(&KeyboardEvent, &str) -> R + 'static,
        R: Into<CallbackResult>,
    {
        self.bind_callback(pattern, action, Callback::new(callback));
        self
    }

    /// Bind one callback to several patterns
    pub fn bind_many<F, R>(
        &mut self,
        patterns: &[&str],
        action: Option<ActionKind>,
        callback: F,
    ) -> &mut Self
    where
        F: FnMut(&KeyboardEvent, &str) -> R + 'static,
        R: Into<CallbackResult>,
    {
        let callback = Callback::new(callback);
        for pattern in patterns {
            self.bind_callback(pattern, action, callback.clone());
        }
        self
    }

    /// Bind a pattern that also fires inside inputs and editable elements
    pub fn bind_global<F, R>(
        &mut self,
        pattern: &str,
        action: Option<ActionKind>,
        callback: F,
    ) -> &mut Self
    where
        F: FnMut(&KeyboardEvent, &str) -> R + 'static,
        R: Into<CallbackResult>,
    {
        self.gate.allow_global(&normalize_pattern(pattern));
        self.bind(pattern, action, callback)
    }

    /// Neutralize a pattern by binding a no-op in its place
    pub fn unbind(&mut self, pattern: &str, action: Option<ActionKind>) -> &mut Self {
        self.bind_callback(pattern, action, Callback::noop());
        self
    }

    /// Run the callback bound to exactly `(pattern, action)`
    ///
    /// The callback receives an empty synthetic event. Returns false when
    /// nothing is bound under that pair.
    pub fn trigger(&mut self, pattern: &str, action: Option<ActionKind>) -> bool {
        let pattern = normalize_pattern(pattern);
        let Some(callback) = self.registry.direct(&pattern, action).cloned() else {
            tracing::debug!(pattern = %pattern, "trigger: nothing bound");
            return false;
        };

        let event = KeyboardEvent::synthetic(action.unwrap_or(ActionKind::Keydown));
        callback.call(&event, &pattern);
        true
    }

    /// Drop every binding and all sequence progress
    pub fn reset(&mut self) -> &mut Self {
        tracing::debug!(bindings = self.registry.len(), "resetting keytrap");
        self.registry.clear();
        self.sequences.clear();
        self.gate.clear();
        self.ignore_next_keyup = None;
        self.ignore_next_keypress = false;
        self
    }

    /// Extend this instance's key code table
    pub fn add_keycodes<I, S>(&mut self, codes: I) -> &mut Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        self.keys.add_keycodes(codes);
        self
    }

    /// Replace the editable-surface policy
    ///
    /// The predicate receives the event, its target element and the
    /// pattern about to fire; returning true keeps the binding from running.
    pub fn set_stop_callback<F>(&mut self, stop: F) -> &mut Self
    where
        F: Fn(&KeyboardEvent, Option<&Rc<Element>>, &str) -> bool + 'static,
    {
        self.gate.set_stop_callback(stop);
        self
    }

    /// Bind every command of a keymap, reporting fired commands to `on_command`
    ///
    /// `on_command` gets the command name, the event and the matched pattern.
    /// Bindings marked `suppress` always ask the host to prevent the default
    /// action. Returns the number of patterns bound.
    pub fn apply_keymap<F, R>(&mut self, keymap: &Keymap, on_command: F) -> usize
    where
        F: FnMut(&str, &KeyboardEvent, &str) -> R + 'static,
        R: Into<CallbackResult>,
    {
        self.add_keycodes(keymap.keycodes.iter().map(|(&code, name)| (code, name.clone())));

        let on_command = Rc::new(RefCell::new(on_command));
        let mut bound = 0;

        for binding in keymap.bindings.iter().filter(|b| !b.is_unbound()) {
            let handler = Rc::clone(&on_command);
            let command = binding.command.clone();
            let suppress = binding.suppress;
            let callback = Callback::new(move |event: &KeyboardEvent, combo: &str| -> CallbackResult {
                let mut handler = handler.borrow_mut();
                let result: CallbackResult = (*handler)(&command, event, combo).into();
                if suppress {
                    CallbackResult::Suppress
                } else {
                    result
                }
            });

            for pattern in &binding.patterns {
                if binding.global {
                    self.gate.allow_global(&normalize_pattern(pattern));
                }
                self.bind_callback(pattern, binding.action, callback.clone());
                bound += 1;
            }
        }

        tracing::info!(patterns = bound, "applied keymap");
        bound
    }

    fn bind_callback(&mut self, pattern: &str, action: Option<ActionKind>, callback: Callback) {
        let pattern = normalize_pattern(pattern);

        match self.parser.parse(&pattern, action, &self.keys) {
            Pattern::Combo(combo) => {
                tracing::debug!(pattern = %pattern, combo = %combo, "binding combo");
                self.registry
                    .insert(Binding::direct(combo, pattern.clone(), callback.clone()));
            }
            Pattern::Sequence(sequence) => {
                self.bind_sequence(&pattern, sequence, callback.clone());
            }
        }

        self.registry.insert_direct(&pattern, action, callback);
    }

    fn bind_sequence(&mut self, pattern: &str, sequence: SequenceSpec, callback: Callback) {
        tracing::debug!(pattern, steps = sequence.len(), "binding sequence");
        self.sequences.declare(pattern);

        let texts = split_steps(pattern);
        let next_actions: Vec<Option<ActionKind>> = sequence
            .steps
            .iter()
            .skip(1)
            .map(|step| Some(step.action))
            .chain(std::iter::once(None))
            .collect();

        for (level, (combo, next_action)) in sequence.steps.into_iter().zip(next_actions).enumerate() {
            let text = texts.get(level).copied().unwrap_or_default();
            let step = SequenceStep {
                sequence: pattern.to_string(),
                level,
                next_action,
            };
            self.registry
                .insert(Binding::step(combo, text, step, callback.clone()));
        }
    }

    /// Feed one raw event from the host
    ///
    /// `now` drives the sequence timeout; pending deferred bindings whose
    /// window elapsed fire first and are included in the result.
    pub fn handle_event(&mut self, event: &KeyboardEvent, now: Instant) -> Dispatch {
        let Some(character) = self.keys.character_from_event(event) else {
            tracing::trace!(which = event.which, "event carries no key");
            return self.tick(now);
        };

        if event.kind == ActionKind::Keyup
            && self.ignore_next_keyup.as_deref() == Some(character.as_str())
        {
            tracing::trace!(key = %character, "swallowing keyup of completed sequence");
            self.ignore_next_keyup = None;
            return self.tick(now);
        }

        let modifiers = modifiers_from_event(event);
        self.handle_key(&character, modifiers, event, now)
    }

    /// Match an already-normalized key against the bindings
    pub fn handle_key(
        &mut self,
        character: &str,
        modifiers: Modifiers,
        event: &KeyboardEvent,
        now: Instant,
    ) -> Dispatch {
        let mut dispatch = self.tick(now);
        let kind = event.kind;

        let query = KeyQuery {
            key: character,
            modifiers,
            kind,
            command_held: event.ctrl_key || event.meta_key,
        };
        let sequences = &self.sequences;
        let matches = self.registry.matches(query, |s| sequences.level(s));
        tracing::trace!(key = character, %kind, candidates = matches.len(), "handling key");

        let max_level = matches
            .iter()
            .filter_map(Binding::sequence_step)
            .map(|step| step.level)
            .max();
        let sequence_hit = max_level.is_some();

        let ignore_this_keypress = kind == ActionKind::Keypress && self.ignore_next_keypress;
        let should_reset = self.sequences.next_expected() == Some(kind)
            && !is_modifier(character)
            && !ignore_this_keypress;

        // The key broke every pending sequence: flush what they held back
        // before anything bound to this key runs.
        if should_reset && !sequence_hit {
            self.sequences.reset_except(&HashSet::new());
            let released = self.sequences.release(&HashSet::new());
            Self::fire_deferred(released, &mut dispatch);
        }

        let mut advanced = HashSet::new();
        let mut completed = HashSet::new();
        let mut keep = HashSet::new();

        for binding in &matches {
            let Some(step) = binding.sequence_step() else {
                continue;
            };
            keep.insert(step.sequence.clone());
            if Some(step.level) != max_level {
                tracing::trace!(sequence = %step.sequence, "sequence paused by deeper match");
                continue;
            }
            if self.gate.should_stop(event, &binding.pattern, Some(&step.sequence)) {
                continue;
            }

            match step.next_action {
                Some(next) => {
                    self.sequences.advance(&step.sequence, next, now);
                    advanced.insert(step.sequence.clone());
                }
                None => {
                    tracing::debug!(sequence = %step.sequence, "sequence complete");
                    let result = binding.callback.call(event, &step.sequence);
                    dispatch.record(&step.sequence, result);
                    if kind != ActionKind::Keyup {
                        self.ignore_next_keyup = Some(character.to_string());
                    }
                    completed.insert(step.sequence.clone());
                }
            }
        }

        for binding in matches.iter().filter(|b| !b.is_sequence()) {
            if sequence_hit && (!completed.is_empty() || advanced.is_empty()) {
                break;
            }
            if self.gate.should_stop(event, &binding.pattern, None) {
                continue;
            }

            if sequence_hit {
                self.sequences.defer(Deferred {
                    pattern: binding.pattern.clone(),
                    callback: binding.callback.clone(),
                    event: event.clone(),
                    held_by: advanced.iter().cloned().collect(),
                });
            } else {
                let result = binding.callback.call(event, &binding.pattern);
                dispatch.record(&binding.pattern, result);
            }
        }

        if should_reset && sequence_hit {
            self.sequences.reset_except(&keep);
        }
        self.sequences.complete(&completed);
        let released = self.sequences.release(&completed);
        Self::fire_deferred(released, &mut dispatch);

        self.ignore_next_keypress = sequence_hit && kind == ActionKind::Keydown;
        dispatch
    }

    /// Apply the sequence timeout without a new event
    ///
    /// Hosts call this when [`next_deadline`](Self::next_deadline) passes;
    /// direct bindings deferred behind an abandoned sequence fire here.
    pub fn tick(&mut self, now: Instant) -> Dispatch {
        let mut dispatch = Dispatch::default();
        if self.sequences.expire(now) {
            let released = self.sequences.release(&HashSet::new());
            Self::fire_deferred(released, &mut dispatch);
        }
        dispatch
    }

    /// When pending sequence progress will be dropped
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sequences.next_deadline()
    }

    fn fire_deferred(released: Vec<Deferred>, dispatch: &mut Dispatch) {
        for deferred in released {
            tracing::debug!(pattern = %deferred.pattern, "firing deferred binding");
            let result = deferred.callback.call(&deferred.event, &deferred.pattern);
            dispatch.record(&deferred.pattern, result);
        }
    }
}

impl Default for Keytrap {
    fn default() -> Self {
        Self::new()
    }
}
