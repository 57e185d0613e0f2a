//! Offline replay of scripted keyboard input
//!
//! A script is a list of timestamped raw events. Replaying it against a
//! keymap reports which commands fired and when, which makes keymaps
//! testable without a window system.
//!
//! ```yaml
//! events:
//!   - { at_ms: 0,   type: keypress, key: "g" }
//!   - { at_ms: 120, type: keypress, key: "i" }
//!   - { at_ms: 500, type: keydown,  key: "s", ctrl: true }
//!   - { at_ms: 900, type: keypress, key: "a", target: { tag: input } }
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::KeytrapConfig;
use crate::keymap::{ActionKind, Dispatch, Element, KeyboardEvent, Keymap, Keytrap};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// One raw event; either `which` or `key` names the key
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub which: Option<u32>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub target: Option<ScriptTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptTarget {
    pub tag: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub editable: Option<bool>,
}

/// A command that fired during replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredCommand {
    pub at_ms: u64,
    pub command: String,
    pub pattern: String,
    /// The event (or timeout) that fired it asked the host to prevent the default action
    pub suppressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    IoError(String),
    ParseError(String),
    /// Event index and the key name that has no code
    UnknownKey(usize, String),
    /// Event index with neither `which` nor `key`
    MissingKey(usize),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::IoError(e) => write!(f, "IO error: {}", e),
            ReplayError::ParseError(e) => write!(f, "Parse error: {}", e),
            ReplayError::UnknownKey(idx, key) => write!(f, "Event {}: unknown key {:?}", idx, key),
            ReplayError::MissingKey(idx) => write!(f, "Event {}: needs `which` or `key`", idx),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Load a replay script; `.json` files are read as JSON, anything else as YAML
pub fn load_script(path: &Path) -> Result<ReplayScript, ReplayError> {
    let content = std::fs::read_to_string(path).map_err(|e| ReplayError::IoError(e.to_string()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| ReplayError::ParseError(e.to_string()))
    } else {
        parse_script(&content)
    }
}

pub fn parse_script(yaml: &str) -> Result<ReplayScript, ReplayError> {
    serde_yaml::from_str(yaml).map_err(|e| ReplayError::ParseError(e.to_string()))
}

impl ScriptEvent {
    fn to_keyboard_event(&self, index: usize, trap: &Keytrap) -> Result<KeyboardEvent, ReplayError> {
        let which = match (&self.which, &self.key) {
            (Some(which), _) => *which,
            (None, Some(key)) => key_code(self.kind, key, trap)
                .ok_or_else(|| ReplayError::UnknownKey(index, key.clone()))?,
            (None, None) => return Err(ReplayError::MissingKey(index)),
        };

        let mut event = KeyboardEvent::new(self.kind, which);
        event.shift_key = self.shift;
        event.ctrl_key = self.ctrl;
        event.alt_key = self.alt;
        event.meta_key = self.meta;

        if let Some(target) = &self.target {
            let mut element = Element::new(&target.tag).with_class(&target.class);
            element.content_editable = target.editable;
            event.target = Some(Rc::new(element));
        }

        Ok(event)
    }
}

/// Keypress carries the character itself; keydown/keyup carry the key code
fn key_code(kind: ActionKind, key: &str, trap: &Keytrap) -> Option<u32> {
    if kind == ActionKind::Keypress {
        let mut chars = key.chars();
        let ch = chars.next()?;
        return chars.next().is_none().then_some(ch as u32);
    }
    trap.code_for_key(key)
}

/// Replay `script` against a fresh engine loaded with `keymap`
///
/// Events must be in time order. After the last event the clock runs on to
/// the pending sequence deadline so deferred bindings get their chance.
pub fn replay(
    script: &ReplayScript,
    keymap: &Keymap,
    config: &KeytrapConfig,
) -> Result<Vec<FiredCommand>, ReplayError> {
    let fired: Rc<RefCell<Vec<(String, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);

    let mut trap = Keytrap::from_config(config);
    trap.apply_keymap(keymap, move |command: &str, _: &KeyboardEvent, pattern: &str| {
        sink.borrow_mut().push((command.to_string(), pattern.to_string()))
    });

    let start = Instant::now();
    let mut records = Vec::new();
    let drain = |at_ms: u64, dispatch: &Dispatch, records: &mut Vec<FiredCommand>| {
        for (command, pattern) in fired.borrow_mut().drain(..) {
            tracing::debug!(at_ms, command = %command, pattern = %pattern, "command fired");
            records.push(FiredCommand {
                at_ms,
                command,
                pattern,
                suppressed: dispatch.prevent_default,
            });
        }
    };

    let mut last_ms = 0;
    for (index, scripted) in script.events.iter().enumerate() {
        let event = scripted.to_keyboard_event(index, &trap)?;
        let now = start + Duration::from_millis(scripted.at_ms);

        // deferred bindings fire at their own deadline, not at this event
        if let Some(deadline) = trap.next_deadline().filter(|d| *d <= now) {
            let dispatch = trap.tick(deadline);
            drain(millis_since(start, deadline), &dispatch, &mut records);
        }

        let dispatch = trap.handle_event(&event, now);
        drain(scripted.at_ms, &dispatch, &mut records);
        last_ms = scripted.at_ms;
    }

    if let Some(deadline) = trap.next_deadline() {
        let dispatch = trap.tick(deadline);
        drain(millis_since(start, deadline).max(last_ms), &dispatch, &mut records);
    }

    Ok(records)
}

fn millis_since(start: Instant, at: Instant) -> u64 {
    at.saturating_duration_since(start).as_millis() as u64
}
