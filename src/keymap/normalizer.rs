//! Key code normalization
//!
//! Turns the numeric key code carried by a raw event into the canonical key
//! name bindings are indexed by. Named keys come from a per-instance table
//! that callers can extend; punctuation on keydown/keyup goes through a fixed
//! unshifted-symbol table; everything else falls back to the character for the
//! code.

use std::collections::HashMap;

use super::event::KeyboardEvent;
use super::types::{ActionKind, Modifiers};

/// Codes in this range are digit-pad keys; they never count as named keys
const KEYPAD_CODES: std::ops::RangeInclusive<u32> = 96..=111;

/// Punctuation reported by keydown/keyup, keyed by code
fn punctuation(code: u32) -> Option<&'static str> {
    let key = match code {
        106 => "*",
        107 => "+",
        109 => "-",
        110 => ".",
        111 => "/",
        186 => ";",
        187 => "=",
        188 => ",",
        189 => "-",
        190 => ".",
        191 => "/",
        192 => "`",
        219 => "[",
        220 => "\\",
        221 => "]",
        222 => "'",
        _ => return None,
    };
    Some(key)
}

/// Unshifted key for a shifted symbol on a US layout
pub fn unshifted(symbol: &str) -> Option<&'static str> {
    let key = match symbol {
        "~" => "`",
        "!" => "1",
        "@" => "2",
        "#" => "3",
        "$" => "4",
        "%" => "5",
        "^" => "6",
        "&" => "7",
        "*" => "8",
        "(" => "9",
        ")" => "0",
        "_" => "-",
        "+" => "=",
        ":" => ";",
        "\"" => "'",
        "<" => ",",
        ">" => ".",
        "?" => "/",
        "|" => "\\",
        _ => return None,
    };
    Some(key)
}

/// Code table for one engine instance
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    names: HashMap<u32, String>,
    /// Named key → code, excluding the keypad range
    named: HashMap<String, u32>,
}

impl KeyNormalizer {
    pub fn new() -> Self {
        let mut names: HashMap<u32, String> = [
            (8, "backspace"),
            (9, "tab"),
            (13, "enter"),
            (16, "shift"),
            (17, "ctrl"),
            (18, "alt"),
            (20, "capslock"),
            (27, "esc"),
            (32, "space"),
            (33, "pageup"),
            (34, "pagedown"),
            (35, "end"),
            (36, "home"),
            (37, "left"),
            (38, "up"),
            (39, "right"),
            (40, "down"),
            (45, "ins"),
            (46, "del"),
            (91, "meta"),
            (93, "meta"),
            (224, "meta"),
        ]
        .into_iter()
        .map(|(code, name)| (code, name.to_string()))
        .collect();

        // f1..f19
        for n in 1..20u32 {
            names.insert(111 + n, format!("f{}", n));
        }

        // digit pad
        for n in 0..=9u32 {
            names.insert(96 + n, n.to_string());
        }

        let mut normalizer = Self {
            names,
            named: HashMap::new(),
        };
        normalizer.rebuild_named();
        normalizer
    }

    /// Merge extra code → name mappings into the table
    ///
    /// A code that is already mapped is overwritten; other entries stay.
    pub fn add_keycodes<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        for (code, name) in codes {
            let name = name.into();
            tracing::debug!(code, name = %name, "adding keycode");
            self.names.insert(code, name);
        }
        self.rebuild_named();
    }

    fn rebuild_named(&mut self) {
        self.named.clear();
        for (&code, name) in &self.names {
            if KEYPAD_CODES.contains(&code) {
                continue;
            }
            // lowest code wins so the reverse lookup is deterministic
            self.named
                .entry(name.clone())
                .and_modify(|existing| *existing = (*existing).min(code))
                .or_insert(code);
        }
    }

    /// Whether `key` is a named (non-printable) key, which binds on keydown
    pub fn is_named_key(&self, key: &str) -> bool {
        self.named.contains_key(key)
    }

    /// Canonical key name for an event, or `None` if it carries no usable code
    pub fn character_from_event(&self, event: &KeyboardEvent) -> Option<String> {
        if event.kind == ActionKind::Keypress {
            let ch = char::from_u32(event.which).filter(|&c| c != '\0')?;
            return Some(if event.shift_key {
                ch.to_string()
            } else {
                ch.to_lowercase().collect()
            });
        }

        if let Some(name) = self.names.get(&event.which) {
            return Some(name.clone());
        }

        if let Some(symbol) = punctuation(event.which) {
            return Some(symbol.to_string());
        }

        let ch = char::from_u32(event.which).filter(|&c| c != '\0')?;
        Some(ch.to_lowercase().collect())
    }

    /// Raw key code a keydown/keyup for `key` would carry
    pub fn code_for_key(&self, key: &str) -> Option<u32> {
        if let Some(&code) = self.named.get(key) {
            return Some(code);
        }
        let mut chars = key.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if ch.is_ascii_alphanumeric() {
            return Some(ch.to_ascii_uppercase() as u32);
        }
        let base = unshifted(key).unwrap_or(key);
        [186, 187, 188, 189, 190, 191, 192, 219, 220, 221, 222]
            .into_iter()
            .find(|&code| punctuation(code) == Some(base))
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Modifier set straight from the event's flags
///
/// Never accumulated across events, so a missed keyup cannot leave a
/// modifier stuck.
pub fn modifiers_from_event(event: &KeyboardEvent) -> Modifiers {
    Modifiers::new(
        event.ctrl_key,
        event.shift_key,
        event.alt_key,
        event.meta_key,
    )
}
