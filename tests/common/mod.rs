//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use keytrap::{Dispatch, KeyboardEvent, Keytrap};

/// Patterns seen by callbacks, in call order
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that appends the matched pattern
    pub fn callback(&self) -> impl FnMut(&KeyboardEvent, &str) + 'static {
        let log = Rc::clone(&self.0);
        move |_: &KeyboardEvent, combo: &str| log.borrow_mut().push(combo.to_string())
    }

    /// Callback that appends `label` instead of the pattern
    pub fn labelled(&self, label: &str) -> impl FnMut(&KeyboardEvent, &str) + 'static {
        let log = Rc::clone(&self.0);
        let label = label.to_string();
        move |_: &KeyboardEvent, _: &str| log.borrow_mut().push(label.clone())
    }

    pub fn hits(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// `t0` plus `ms` milliseconds
pub fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

/// A full press of a printable key: keydown, keypress, keyup
pub fn type_char(trap: &mut Keytrap, ch: char, now: Instant) -> Dispatch {
    let code = ch.to_ascii_uppercase() as u32;
    let shifted = ch.is_ascii_uppercase();
    let with_shift = |event: KeyboardEvent| if shifted { event.with_shift() } else { event };

    let mut dispatch = trap.handle_event(&with_shift(KeyboardEvent::keydown(code)), now);
    dispatch.merge(trap.handle_event(&with_shift(KeyboardEvent::keypress(ch)), now));
    dispatch.merge(trap.handle_event(&with_shift(KeyboardEvent::keyup(code)), now));
    dispatch
}

/// Type every character of `text` at the same instant
pub fn type_str(trap: &mut Keytrap, text: &str, now: Instant) -> Dispatch {
    let mut dispatch = Dispatch::default();
    for ch in text.chars() {
        dispatch.merge(type_char(trap, ch, now));
    }
    dispatch
}

/// Keydown + keyup of a key that produces no character (arrows, enter, ...)
pub fn press_named(trap: &mut Keytrap, code: u32, now: Instant) -> Dispatch {
    let mut dispatch = trap.handle_event(&KeyboardEvent::keydown(code), now);
    dispatch.merge(trap.handle_event(&KeyboardEvent::keyup(code), now));
    dispatch
}
