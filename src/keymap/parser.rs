//! Pattern parsing: `"mod+shift+k"`, `"g i"`, `"?"` into combo specs
//!
//! Parsing never fails. A malformed pattern produces a combo whose key can
//! never be reported by an event, so the binding simply never fires.

use super::normalizer::{unshifted, KeyNormalizer};
use super::types::{ActionKind, ComboSpec, Modifiers, Pattern, Platform, SequenceSpec};

/// Split a pattern into its space separated steps
pub fn split_steps(pattern: &str) -> Vec<&str> {
    pattern.split_whitespace().collect()
}

/// Collapse whitespace runs so equivalent patterns share one identity
pub fn normalize_pattern(pattern: &str) -> String {
    split_steps(pattern).join(" ")
}

/// Split one step into its `+` separated tokens
///
/// `"+"` alone is the plus key; `"++"` inside a combo means "plus the plus
/// key" and is rewritten to the `plus` alias before splitting.
pub fn split_keys(combination: &str) -> Vec<String> {
    if combination == "+" {
        return vec!["+".to_string()];
    }
    combination
        .replace("++", "+plus")
        .split('+')
        .map(str::to_string)
        .collect()
}

/// Parses pattern strings for one platform
#[derive(Debug, Clone, Copy)]
pub struct ComboParser {
    platform: Platform,
}

impl ComboParser {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn alias<'a>(&self, token: &'a str) -> &'a str {
        match token {
            "option" => "alt",
            "command" => "meta",
            "return" => "enter",
            "escape" => "esc",
            "plus" => "+",
            "mod" => self.platform.mod_key(),
            other => other,
        }
    }

    /// Parse a single step into a combo
    ///
    /// `action` is the caller's explicit action; `None` picks the best one
    /// for the key.
    pub fn parse_combo(
        &self,
        combination: &str,
        action: Option<ActionKind>,
        keys: &KeyNormalizer,
    ) -> ComboSpec {
        let mut modifiers = Modifiers::NONE;
        let mut key = String::new();

        for token in split_keys(combination) {
            let mut token = self.alias(&token).to_string();

            // keydown/keyup report the unshifted key plus the shift flag
            if action.is_some_and(|a| a != ActionKind::Keypress) {
                if let Some(base) = unshifted(&token) {
                    token = base.to_string();
                    modifiers |= Modifiers::SHIFT;
                }
            }

            if let Some(modifier) = Modifiers::from_name(&token) {
                modifiers |= modifier;
            }

            key = token;
        }

        let action = pick_best_action(&key, modifiers, action, keys);
        ComboSpec::new(key, modifiers, action)
    }

    /// Parse a full pattern; more than one step yields a sequence
    pub fn parse(&self, pattern: &str, action: Option<ActionKind>, keys: &KeyNormalizer) -> Pattern {
        let steps = split_steps(pattern);
        if steps.len() > 1 {
            Pattern::Sequence(SequenceSpec {
                steps: steps
                    .into_iter()
                    .map(|step| self.parse_combo(step, action, keys))
                    .collect(),
            })
        } else {
            let step = steps.first().copied().unwrap_or("");
            Pattern::Combo(self.parse_combo(step, action, keys))
        }
    }
}

impl Default for ComboParser {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

/// Action a combo binds to when the caller does not say
///
/// Named keys never produce keypress events, so they bind on keydown;
/// printable keys bind on keypress. A combo with modifiers needs the
/// modifier flags of a keydown, so keypress is promoted to keydown.
pub fn pick_best_action(
    key: &str,
    modifiers: Modifiers,
    action: Option<ActionKind>,
    keys: &KeyNormalizer,
) -> ActionKind {
    let action = action.unwrap_or(if keys.is_named_key(key) {
        ActionKind::Keydown
    } else {
        ActionKind::Keypress
    });

    if action == ActionKind::Keypress && !modifiers.is_empty() {
        ActionKind::Keydown
    } else {
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::types::is_modifier;

    fn parse(pattern: &str, action: Option<ActionKind>, platform: Platform) -> Pattern {
        ComboParser::new(platform).parse(pattern, action, &KeyNormalizer::new())
    }

    fn combo(pattern: &str, action: Option<ActionKind>) -> ComboSpec {
        ComboParser::new(Platform::Other).parse_combo(pattern, action, &KeyNormalizer::new())
    }

    #[test]
    fn test_parse_ctrl_shift_k() {
        let spec = combo("ctrl+shift+k", None);
        assert_eq!(spec.key, "k");
        assert_eq!(spec.modifiers, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(spec.action, ActionKind::Keydown);
    }

    #[test]
    fn test_mod_resolves_per_platform() {
        let Pattern::Combo(mac) = parse("mod+s", None, Platform::Macos) else {
            panic!("expected a combo");
        };
        assert_eq!(mac.key, "s");
        assert_eq!(mac.modifiers, Modifiers::META);

        let Pattern::Combo(other) = parse("mod+s", None, Platform::Other) else {
            panic!("expected a combo");
        };
        assert_eq!(other.key, "s");
        assert_eq!(other.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(combo("option+a", None).modifiers, Modifiers::ALT);
        assert_eq!(combo("command+a", None).modifiers, Modifiers::META);
        assert_eq!(combo("return", None).key, "enter");
        assert_eq!(combo("escape", None).key, "esc");
        assert_eq!(combo("shift+plus", None).key, "+");
    }

    #[test]
    fn test_plus_key() {
        let plus = combo("+", None);
        assert_eq!(plus.key, "+");
        assert!(plus.modifiers.is_empty());

        let ctrl_plus = combo("ctrl++", None);
        assert_eq!(ctrl_plus.key, "+");
        assert_eq!(ctrl_plus.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn test_last_token_wins() {
        let spec = combo("a+b", None);
        assert_eq!(spec.key, "b");
        assert!(spec.modifiers.is_empty());
    }

    #[test]
    fn test_best_action() {
        assert_eq!(combo("a", None).action, ActionKind::Keypress);
        assert_eq!(combo("?", None).action, ActionKind::Keypress);
        assert_eq!(combo("enter", None).action, ActionKind::Keydown);
        assert_eq!(combo("f5", None).action, ActionKind::Keydown);
        assert_eq!(combo("shift+a", None).action, ActionKind::Keydown);
        assert_eq!(combo("a", Some(ActionKind::Keyup)).action, ActionKind::Keyup);
    }

    #[test]
    fn test_shifted_symbol_on_keydown() {
        let spec = combo("?", Some(ActionKind::Keydown));
        assert_eq!(spec.key, "/");
        assert_eq!(spec.modifiers, Modifiers::SHIFT);

        // keypress reports the shifted character itself
        let spec = combo("?", Some(ActionKind::Keypress));
        assert_eq!(spec.key, "?");
        assert!(spec.modifiers.is_empty());
    }

    #[test]
    fn test_modifier_only_combo() {
        let spec = combo("shift", None);
        assert_eq!(spec.key, "shift");
        assert_eq!(spec.modifiers, Modifiers::SHIFT);
        assert_eq!(spec.action, ActionKind::Keydown);
        assert!(is_modifier(&spec.key));
    }

    #[test]
    fn test_sequence_steps() {
        let Pattern::Sequence(seq) = parse("g  i", None, Platform::Other) else {
            panic!("expected a sequence");
        };
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.steps[0].key, "g");
        assert_eq!(seq.steps[1].key, "i");
        assert!(seq.steps.iter().all(|s| s.action == ActionKind::Keypress));
    }

    #[test]
    fn test_sequence_with_explicit_action() {
        let Pattern::Sequence(seq) = parse("up down", Some(ActionKind::Keyup), Platform::Other)
        else {
            panic!("expected a sequence");
        };
        assert!(seq.steps.iter().all(|s| s.action == ActionKind::Keyup));
    }

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern("  g   i "), "g i");
        assert_eq!(normalize_pattern("mod+k"), "mod+k");
    }

    #[test]
    fn test_empty_pattern_is_unreachable_combo() {
        let spec = combo("", None);
        assert_eq!(spec.key, "");
    }
}
