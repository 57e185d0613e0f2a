//! Keyboard shortcut engine
//!
//! This module turns human-readable patterns into bindings and matches raw
//! keyboard events against them:
//! - Single combos (`"mod+k"`, `"?"`, `"shift"`) and multi-step sequences
//!   (`"g i"`, the konami code)
//! - Platform-specific `mod` (command on macOS, ctrl elsewhere)
//! - Keydown, keyup and keypress bindings, with the best one picked per key
//! - Inputs and editable elements are left alone unless a binding is global
//! - User keymaps in YAML, layered over embedded defaults
//!
//! # Architecture
//!
//! ```text
//! KeyboardEvent → KeyNormalizer → BindingRegistry::matches()
//!               → SequenceMatcher (advance / complete / defer)
//!               → EventGate (stop?) → Callback → Dispatch
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut trap = Keytrap::new();
//! trap.bind("g i", None, |_, _| println!("inbox"));
//! trap.bind("mod+s", None, |_, _| false); // suppress the browser save
//!
//! let dispatch = trap.handle_event(&event, Instant::now());
//! ```

mod binding;
mod config;
mod defaults;
mod event;
mod gate;
mod normalizer;
mod parser;
mod registry;
mod sequence;
mod trap;
mod types;
#[cfg(feature = "winit")]
mod winit_adapter;

pub use binding::{Binding, BindingKind, Callback, CallbackResult, SequenceStep};
pub use config::{
    load_keymap_file, parse_keymap_yaml, Keymap, KeymapBinding, KeymapError, UNBOUND_COMMAND,
};
pub use defaults::{get_default_keymap_yaml, load_default_keymap, merge_keymaps};
pub use event::{Element, KeyboardEvent};
pub use gate::{Dispatch, EventGate, InputTarget, StopCallback, OPT_IN_CLASS};
pub use normalizer::{modifiers_from_event, KeyNormalizer};
pub use parser::{normalize_pattern, pick_best_action, ComboParser};
pub use registry::{BindingRegistry, KeyQuery};
pub use sequence::{SequenceMatcher, DEFAULT_SEQUENCE_TIMEOUT};
pub use trap::Keytrap;
pub use types::{ActionKind, ComboSpec, Modifiers, Pattern, Platform, SequenceSpec};
#[cfg(feature = "winit")]
pub use winit_adapter::{key_event_from_winit, keypress_from_text, legacy_code};
