//! Binding storage and lookup by canonical key

use std::collections::HashMap;

use super::binding::{Binding, BindingKind, Callback};
use super::types::{is_modifier, ActionKind, Modifiers};

/// Bindings sharing one canonical key
#[derive(Debug, Default, Clone)]
struct KeyBindings {
    /// Sequence steps, oldest first
    steps: Vec<Binding>,
    /// Direct combos, newest first
    direct: Vec<Binding>,
}

/// Everything the registry needs to know about the incoming key
#[derive(Debug, Clone, Copy)]
pub struct KeyQuery<'a> {
    pub key: &'a str,
    pub modifiers: Modifiers,
    pub kind: ActionKind,
    /// ctrl or meta physically held (keypress combos stop ignoring modifiers)
    pub command_held: bool,
}

/// Stores bindings indexed by canonical key, plus the exact-pattern map used
/// by `trigger`
#[derive(Debug, Default)]
pub struct BindingRegistry {
    by_key: HashMap<String, KeyBindings>,
    direct_map: HashMap<(String, Option<ActionKind>), Callback>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, replacing the one it supersedes
    ///
    /// A direct combo replaces an earlier direct binding with the same
    /// pattern and action; a sequence step replaces the same step of the same
    /// sequence.
    pub fn insert(&mut self, binding: Binding) {
        let entry = self.by_key.entry(binding.combo.key.clone()).or_default();
        match &binding.kind {
            BindingKind::Direct => {
                entry.direct.retain(|existing| {
                    !(existing.pattern == binding.pattern
                        && existing.combo.action == binding.combo.action)
                });
                entry.direct.insert(0, binding);
            }
            BindingKind::Step(step) => {
                entry.steps.retain(|existing| match existing.sequence_step() {
                    Some(other) => {
                        !(other.sequence == step.sequence
                            && other.level == step.level
                            && existing.combo.action == binding.combo.action)
                    }
                    None => true,
                });
                entry.steps.push(binding);
            }
        }
    }

    /// Remember the callback `trigger` should run for an exact pattern
    pub fn insert_direct(&mut self, pattern: &str, action: Option<ActionKind>, callback: Callback) {
        self.direct_map
            .insert((pattern.to_string(), action), callback);
    }

    pub fn direct(&self, pattern: &str, action: Option<ActionKind>) -> Option<&Callback> {
        self.direct_map.get(&(pattern.to_string(), action))
    }

    /// Bindings whose action and modifiers accept the query, steps first
    ///
    /// `level_of` reports the current level of a sequence; steps are only
    /// returned when they are the next step of their sequence.
    pub fn matches<F>(&self, query: KeyQuery<'_>, level_of: F) -> Vec<Binding>
    where
        F: Fn(&str) -> usize,
    {
        let Some(entry) = self.by_key.get(query.key) else {
            return Vec::new();
        };

        // keyup of a modifier key reports only that modifier
        let modifiers = if query.kind == ActionKind::Keyup && is_modifier(query.key) {
            Modifiers::from_name(query.key).unwrap_or(query.modifiers)
        } else {
            query.modifiers
        };

        let accepts = |binding: &Binding| {
            if binding.combo.action != query.kind {
                return false;
            }
            (query.kind == ActionKind::Keypress && !query.command_held)
                || binding.combo.modifiers == modifiers
        };

        let steps = entry.steps.iter().filter(|binding| {
            binding
                .sequence_step()
                .is_some_and(|step| level_of(&step.sequence) == step.level)
        });

        steps
            .chain(entry.direct.iter())
            .filter(|binding| accepts(binding))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_key
            .values()
            .map(|entry| entry.steps.len() + entry.direct.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.direct_map.clear();
    }
}
