//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into [`Keymap`] values: named commands bound to
//! one or more patterns, plus extra key codes for the normalizer.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::parser::normalize_pattern;
use super::types::{ActionKind, Platform};

/// Command name that removes a binding when keymaps are layered
pub const UNBOUND_COMMAND: &str = "unbound";

/// Root structure of a keymap YAML file
#[derive(Debug, Default, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub keycodes: BTreeMap<u32, String>,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// One pattern or a list of patterns sharing a command
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyPatterns {
    One(String),
    Many(Vec<String>),
}

impl KeyPatterns {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyPatterns::One(pattern) => vec![pattern],
            KeyPatterns::Many(patterns) => patterns,
        }
    }
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub keys: KeyPatterns,
    pub command: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub global: bool,
    /// Ask the host to prevent the default action when the command fires
    #[serde(default)]
    pub suppress: bool,
}

/// A validated binding: patterns are normalized, the action is typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapBinding {
    pub patterns: Vec<String>,
    pub command: String,
    pub action: Option<ActionKind>,
    pub global: bool,
    pub suppress: bool,
}

impl KeymapBinding {
    pub fn new(pattern: &str, command: &str) -> Self {
        Self {
            patterns: vec![normalize_pattern(pattern)],
            command: command.to_string(),
            action: None,
            global: false,
            suppress: false,
        }
    }

    pub fn is_unbound(&self) -> bool {
        self.command == UNBOUND_COMMAND
    }
}

/// Bindings and key codes ready to apply to an engine instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    pub keycodes: BTreeMap<u32, String>,
    pub bindings: Vec<KeymapBinding>,
}

impl Keymap {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// First binding whose command is `command`
    pub fn binding_for(&self, command: &str) -> Option<&KeymapBinding> {
        self.bindings.iter().find(|b| b.command == command)
    }
}

/// Load a keymap from a YAML file
pub fn load_keymap_file(path: &Path, platform: Platform) -> Result<Keymap, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content, platform)
}

/// Parse a keymap from a YAML string, keeping entries for `platform`
pub fn parse_keymap_yaml(yaml: &str, platform: Platform) -> Result<Keymap, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let mut bindings = Vec::with_capacity(config.bindings.len());

    for entry in config.bindings {
        if let Some(ref name) = entry.platform {
            let wanted = name
                .parse::<Platform>()
                .map_err(|_| KeymapError::InvalidBinding(format!("Unknown platform: {}", name)))?;
            if wanted != platform {
                continue;
            }
        }

        bindings.push(parse_binding(entry)?);
    }

    Ok(Keymap {
        keycodes: config.keycodes,
        bindings,
    })
}

fn parse_binding(entry: BindingConfig) -> Result<KeymapBinding, KeymapError> {
    let command = entry.command.trim().to_string();
    if command.is_empty() {
        return Err(KeymapError::InvalidBinding("Missing command".to_string()));
    }

    let patterns: Vec<String> = entry
        .keys
        .into_vec()
        .iter()
        .map(|p| normalize_pattern(p))
        .collect();
    if patterns.is_empty() || patterns.iter().any(String::is_empty) {
        return Err(KeymapError::InvalidBinding(format!(
            "Empty key pattern for command: {}",
            command
        )));
    }

    let action = entry.action.as_deref().map(parse_action).transpose()?;

    Ok(KeymapBinding {
        patterns,
        command,
        action,
        global: entry.global,
        suppress: entry.suppress,
    })
}

fn parse_action(action: &str) -> Result<ActionKind, KeymapError> {
    action
        .parse::<ActionKind>()
        .map_err(|_| KeymapError::InvalidAction(action.to_string()))
}

/// Errors that can occur when parsing keymaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidBinding(String),
    InvalidAction(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidBinding(b) => write!(f, "Invalid binding: {}", b),
            KeymapError::InvalidAction(a) => write!(f, "Invalid action: {}", a),
        }
    }
}

impl std::error::Error for KeymapError {}
