//! Core types for the keymap system: Modifiers, ActionKind, Platform, ComboSpec

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    /// Modifier for a canonical key name (`"shift"`, `"ctrl"`, `"alt"`, `"meta"`)
    pub fn from_name(name: &str) -> Option<Modifiers> {
        match name {
            "shift" => Some(Modifiers::SHIFT),
            "ctrl" => Some(Modifiers::CTRL),
            "alt" => Some(Modifiers::ALT),
            "meta" => Some(Modifiers::META),
            _ => None,
        }
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Formats in pattern syntax, e.g. `shift+ctrl`
impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.shift() {
            parts.push("shift");
        }
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.meta() {
            parts.push("meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Whether a canonical key name is itself a modifier key
pub fn is_modifier(key: &str) -> bool {
    Modifiers::from_name(key).is_some()
}

/// The kind of keyboard event a binding listens for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Keydown,
    Keyup,
    Keypress,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Keydown => "keydown",
            ActionKind::Keyup => "keyup",
            ActionKind::Keypress => "keypress",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keydown" => Ok(ActionKind::Keydown),
            "keyup" => Ok(ActionKind::Keyup),
            "keypress" => Ok(ActionKind::Keypress),
            _ => Err(()),
        }
    }
}

/// Host platform family, decides what `mod` resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS / iOS: `mod` is the command (meta) key
    #[serde(alias = "apple", alias = "mac")]
    Macos,
    /// Everything else: `mod` is ctrl
    Other,
}

impl Platform {
    /// Platform of the running binary
    pub fn current() -> Platform {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Macos
        } else {
            Platform::Other
        }
    }

    /// Canonical modifier name `mod` expands to
    pub const fn mod_key(self) -> &'static str {
        match self {
            Platform::Macos => "meta",
            Platform::Other => "ctrl",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Macos => "macos",
            Platform::Other => "other",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "macos" | "mac" | "apple" => Ok(Platform::Macos),
            "other" | "linux" | "windows" => Ok(Platform::Other),
            _ => Err(()),
        }
    }
}

/// A single parsed combo: canonical key, required modifiers and action kind
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComboSpec {
    pub key: String,
    pub modifiers: Modifiers,
    pub action: ActionKind,
}

impl ComboSpec {
    pub fn new(key: impl Into<String>, modifiers: Modifiers, action: ActionKind) -> Self {
        Self {
            key: key.into(),
            modifiers,
            action,
        }
    }
}

impl fmt::Display for ComboSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// An ordered multi-step sequence sharing one terminal callback
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSpec {
    pub steps: Vec<ComboSpec>,
}

impl SequenceSpec {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Parsed form of a pattern string
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Combo(ComboSpec),
    Sequence(SequenceSpec),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_empty() {
        let mods = Modifiers::NONE;
        assert!(mods.is_empty());
        assert!(!mods.ctrl());
        assert!(!mods.shift());
        assert!(!mods.alt());
        assert!(!mods.meta());
    }

    #[test]
    fn test_modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.ctrl());
        assert!(mods.shift());
        assert!(!mods.alt());
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(!mods.contains(Modifiers::META));
    }

    #[test]
    fn test_modifiers_set_equality_ignores_order() {
        let a = Modifiers::new(true, true, false, false);
        let mut b = Modifiers::SHIFT;
        b |= Modifiers::CTRL;
        assert_eq!(a, b);
    }

    #[test]
    fn test_modifiers_display_pattern_syntax() {
        let mods = Modifiers::META | Modifiers::SHIFT;
        assert_eq!(mods.to_string(), "shift+meta");
    }

    #[test]
    fn test_is_modifier() {
        assert!(is_modifier("shift"));
        assert!(is_modifier("meta"));
        assert!(!is_modifier("k"));
        assert!(!is_modifier("mod"));
    }

    #[test]
    fn test_action_kind_from_str() {
        assert_eq!("keyup".parse::<ActionKind>(), Ok(ActionKind::Keyup));
        assert_eq!("KeyPress".parse::<ActionKind>(), Ok(ActionKind::Keypress));
        assert!("click".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_platform_mod_key() {
        assert_eq!(Platform::Macos.mod_key(), "meta");
        assert_eq!(Platform::Other.mod_key(), "ctrl");
    }

    #[test]
    fn test_combo_display() {
        let combo = ComboSpec::new("k", Modifiers::CTRL | Modifiers::SHIFT, ActionKind::Keydown);
        assert_eq!(combo.to_string(), "shift+ctrl+k");
    }
}
