//! keytrap - keyboard shortcut engine
//!
//! Parses combo and sequence patterns (`"mod+k"`, `"g i"`), matches raw
//! keyboard events against them and tells the host which callbacks ran and
//! whether to suppress the event.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod replay;
pub mod tracing;

// Re-export commonly used types
pub use config::KeytrapConfig;
pub use keymap::{
    ActionKind, CallbackResult, Dispatch, Element, InputTarget, KeyboardEvent, Keymap, Keytrap,
    Modifiers, Platform,
};
