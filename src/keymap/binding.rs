//! Binding records and the callbacks they carry

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::event::KeyboardEvent;
use super::types::{ActionKind, ComboSpec};

/// What a callback asks the host to do with the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackResult {
    /// Let the event continue to the host as usual
    #[default]
    Propagate,
    /// Prevent the default action and stop propagation
    Suppress,
}

impl From<()> for CallbackResult {
    fn from(_: ()) -> Self {
        CallbackResult::Propagate
    }
}

/// `false` suppresses, anything else propagates
impl From<bool> for CallbackResult {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            CallbackResult::Propagate
        } else {
            CallbackResult::Suppress
        }
    }
}

type CallbackFn = dyn FnMut(&KeyboardEvent, &str) -> CallbackResult;

/// A shared, mutable handler invoked with the event and the matched pattern
#[derive(Clone)]
pub struct Callback(Rc<RefCell<CallbackFn>>);

impl Callback {
    pub fn new<F, R>(mut f: F) -> Self
    where
        F: FnMut(&KeyboardEvent, &str) -> R + 'static,
        R: Into<CallbackResult>,
    {
        Callback(Rc::new(RefCell::new(
            move |event: &KeyboardEvent, combo: &str| -> CallbackResult { f(event, combo).into() },
        )))
    }

    /// Handler installed by `unbind`
    pub fn noop() -> Self {
        Callback::new(|_: &KeyboardEvent, _: &str| {})
    }

    pub fn call(&self, event: &KeyboardEvent, combo: &str) -> CallbackResult {
        let mut f = self.0.borrow_mut();
        (*f)(event, combo)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Position of a binding inside a multi-step sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    /// Normalized pattern of the whole sequence, used as its id
    pub sequence: String,
    /// Zero-based index of this step
    pub level: usize,
    /// Action the following step listens for; `None` on the final step
    pub next_action: Option<ActionKind>,
}

impl SequenceStep {
    pub fn is_final(&self) -> bool {
        self.next_action.is_none()
    }
}

/// How a binding reacts when it matches
#[derive(Debug, Clone)]
pub enum BindingKind {
    /// Standalone combo: run the callback
    Direct,
    /// One step of a sequence: advance it, or run the callback on the last step
    Step(SequenceStep),
}

/// An immutable registry entry
#[derive(Debug, Clone)]
pub struct Binding {
    pub combo: ComboSpec,
    /// Step text as written, e.g. `"i"` for the last step of `"g i"`
    pub pattern: String,
    pub kind: BindingKind,
    pub callback: Callback,
}

impl Binding {
    pub fn direct(combo: ComboSpec, pattern: impl Into<String>, callback: Callback) -> Self {
        Self {
            combo,
            pattern: pattern.into(),
            kind: BindingKind::Direct,
            callback,
        }
    }

    pub fn step(
        combo: ComboSpec,
        pattern: impl Into<String>,
        step: SequenceStep,
        callback: Callback,
    ) -> Self {
        Self {
            combo,
            pattern: pattern.into(),
            kind: BindingKind::Step(step),
            callback,
        }
    }

    pub fn sequence_step(&self) -> Option<&SequenceStep> {
        match &self.kind {
            BindingKind::Step(step) => Some(step),
            BindingKind::Direct => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, BindingKind::Step(_))
    }
}
