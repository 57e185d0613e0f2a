//! Default keymap and layering
//!
//! The keymap that ships with the crate is embedded at compile time. Hosts
//! can layer a project-local `keymap.yaml` and the user's keymap on top.

use std::path::Path;

use super::config::{load_keymap_file, parse_keymap_yaml, Keymap, KeymapBinding};
use super::types::Platform;

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// The embedded keymap source
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: defaults + overrides
///
/// Loading order (each layer overrides the previous):
/// 1. Embedded default keymap (compiled into binary)
/// 2. keymap.yaml in current directory (project-local overrides)
/// 3. User keymap at ~/.config/keytrap/keymap.yaml
///
/// Bindings with `command: unbound` remove matching patterns from lower
/// layers.
pub fn load_default_keymap(platform: Platform) -> Keymap {
    let mut keymap = match parse_keymap_yaml(DEFAULT_KEYMAP_YAML, platform) {
        Ok(k) => {
            tracing::info!("Loaded embedded default keymap ({} bindings)", k.len());
            k
        }
        Err(e) => {
            tracing::warn!("Failed to parse embedded keymap: {}", e);
            Keymap::default()
        }
    };

    let local = Path::new("keymap.yaml");
    if local.exists() {
        match load_keymap_file(local, platform) {
            Ok(local_keymap) => {
                tracing::info!("Merging project keymap.yaml ({} bindings)", local_keymap.len());
                keymap = merge_keymaps(keymap, local_keymap);
            }
            Err(e) => {
                tracing::warn!("Failed to load project keymap.yaml: {}", e);
            }
        }
    }

    if let Some(user_path) = crate::config_paths::keymap_file() {
        if user_path.exists() {
            match load_keymap_file(&user_path, platform) {
                Ok(user_keymap) => {
                    tracing::info!(
                        "Merging user keymap from {} ({} bindings)",
                        user_path.display(),
                        user_keymap.len()
                    );
                    keymap = merge_keymaps(keymap, user_keymap);
                }
                Err(e) => {
                    tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
                }
            }
        }
    }

    keymap
}

/// Merge an overlay keymap into a base keymap
///
/// - Key codes from the overlay are added, overwriting the same code
/// - An `unbound` binding removes its patterns from every base binding
/// - A binding with the same patterns and action replaces the base one
/// - Otherwise the binding is added
pub fn merge_keymaps(base: Keymap, overlay: Keymap) -> Keymap {
    let mut result = base;
    result.keycodes.extend(overlay.keycodes);

    for binding in overlay.bindings {
        if binding.is_unbound() {
            remove_patterns(&mut result.bindings, &binding);
            continue;
        }

        let existing = result
            .bindings
            .iter()
            .position(|b| b.patterns == binding.patterns && b.action == binding.action);

        match existing {
            Some(idx) => result.bindings[idx] = binding,
            None => result.bindings.push(binding),
        }
    }

    result
}

fn remove_patterns(bindings: &mut Vec<KeymapBinding>, unbound: &KeymapBinding) {
    for binding in bindings.iter_mut() {
        if unbound.action.is_some() && binding.action != unbound.action {
            continue;
        }
        binding.patterns.retain(|p| !unbound.patterns.contains(p));
    }
    bindings.retain(|b| !b.patterns.is_empty());
}
