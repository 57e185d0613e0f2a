//! Adapter to convert winit key events to raw keyboard events
//!
//! winit reports physical keys and committed text separately, so one winit
//! key press becomes a keydown from the physical key plus a keypress from
//! the text it produced.

use winit::event::ElementState;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use super::event::KeyboardEvent;
use super::types::ActionKind;

/// Legacy key code for a physical key
pub fn legacy_code(code: KeyCode) -> Option<u32> {
    let which = match code {
        KeyCode::Backspace => 8,
        KeyCode::Tab => 9,
        KeyCode::Enter | KeyCode::NumpadEnter => 13,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => 16,
        KeyCode::ControlLeft | KeyCode::ControlRight => 17,
        KeyCode::AltLeft | KeyCode::AltRight => 18,
        KeyCode::CapsLock => 20,
        KeyCode::Escape => 27,
        KeyCode::Space => 32,
        KeyCode::PageUp => 33,
        KeyCode::PageDown => 34,
        KeyCode::End => 35,
        KeyCode::Home => 36,
        KeyCode::ArrowLeft => 37,
        KeyCode::ArrowUp => 38,
        KeyCode::ArrowRight => 39,
        KeyCode::ArrowDown => 40,
        KeyCode::Insert => 45,
        KeyCode::Delete => 46,
        KeyCode::SuperLeft => 91,
        KeyCode::SuperRight => 93,

        KeyCode::Digit0 => 48,
        KeyCode::Digit1 => 49,
        KeyCode::Digit2 => 50,
        KeyCode::Digit3 => 51,
        KeyCode::Digit4 => 52,
        KeyCode::Digit5 => 53,
        KeyCode::Digit6 => 54,
        KeyCode::Digit7 => 55,
        KeyCode::Digit8 => 56,
        KeyCode::Digit9 => 57,

        KeyCode::KeyA => 65,
        KeyCode::KeyB => 66,
        KeyCode::KeyC => 67,
        KeyCode::KeyD => 68,
        KeyCode::KeyE => 69,
        KeyCode::KeyF => 70,
        KeyCode::KeyG => 71,
        KeyCode::KeyH => 72,
        KeyCode::KeyI => 73,
        KeyCode::KeyJ => 74,
        KeyCode::KeyK => 75,
        KeyCode::KeyL => 76,
        KeyCode::KeyM => 77,
        KeyCode::KeyN => 78,
        KeyCode::KeyO => 79,
        KeyCode::KeyP => 80,
        KeyCode::KeyQ => 81,
        KeyCode::KeyR => 82,
        KeyCode::KeyS => 83,
        KeyCode::KeyT => 84,
        KeyCode::KeyU => 85,
        KeyCode::KeyV => 86,
        KeyCode::KeyW => 87,
        KeyCode::KeyX => 88,
        KeyCode::KeyY => 89,
        KeyCode::KeyZ => 90,

        // Digit pad
        KeyCode::Numpad0 => 96,
        KeyCode::Numpad1 => 97,
        KeyCode::Numpad2 => 98,
        KeyCode::Numpad3 => 99,
        KeyCode::Numpad4 => 100,
        KeyCode::Numpad5 => 101,
        KeyCode::Numpad6 => 102,
        KeyCode::Numpad7 => 103,
        KeyCode::Numpad8 => 104,
        KeyCode::Numpad9 => 105,
        KeyCode::NumpadMultiply => 106,
        KeyCode::NumpadAdd => 107,
        KeyCode::NumpadSubtract => 109,
        KeyCode::NumpadDecimal => 110,
        KeyCode::NumpadDivide => 111,

        // Function keys
        KeyCode::F1 => 112,
        KeyCode::F2 => 113,
        KeyCode::F3 => 114,
        KeyCode::F4 => 115,
        KeyCode::F5 => 116,
        KeyCode::F6 => 117,
        KeyCode::F7 => 118,
        KeyCode::F8 => 119,
        KeyCode::F9 => 120,
        KeyCode::F10 => 121,
        KeyCode::F11 => 122,
        KeyCode::F12 => 123,
        KeyCode::F13 => 124,
        KeyCode::F14 => 125,
        KeyCode::F15 => 126,
        KeyCode::F16 => 127,
        KeyCode::F17 => 128,
        KeyCode::F18 => 129,
        KeyCode::F19 => 130,

        // Punctuation
        KeyCode::Semicolon => 186,
        KeyCode::Equal => 187,
        KeyCode::Comma => 188,
        KeyCode::Minus => 189,
        KeyCode::Period => 190,
        KeyCode::Slash => 191,
        KeyCode::Backquote => 192,
        KeyCode::BracketLeft => 219,
        KeyCode::Backslash => 220,
        KeyCode::BracketRight => 221,
        KeyCode::Quote => 222,

        _ => return None,
    };
    Some(which)
}

fn with_modifiers(mut event: KeyboardEvent, mods: ModifiersState) -> KeyboardEvent {
    event.shift_key = mods.shift_key();
    event.ctrl_key = mods.control_key();
    event.alt_key = mods.alt_key();
    event.meta_key = mods.super_key();
    event
}

/// Keydown or keyup for a physical key
///
/// Returns None for keys without a legacy code.
pub fn key_event_from_winit(
    physical_key: PhysicalKey,
    state: ElementState,
    mods: ModifiersState,
) -> Option<KeyboardEvent> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    let which = legacy_code(code)?;
    let kind = match state {
        ElementState::Pressed => ActionKind::Keydown,
        ElementState::Released => ActionKind::Keyup,
    };
    Some(with_modifiers(KeyboardEvent::new(kind, which), mods))
}

/// Keypress for the text a key press committed
///
/// Control characters (enter, tab, escape) never produce a keypress.
pub fn keypress_from_text(text: &str, mods: ModifiersState) -> Option<KeyboardEvent> {
    let mut chars = text.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || ch.is_control() {
        return None;
    }
    Some(with_modifiers(KeyboardEvent::keypress(ch), mods))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_keydown() {
        let event = key_event_from_winit(
            PhysicalKey::Code(KeyCode::KeyS),
            ElementState::Pressed,
            ModifiersState::CONTROL,
        )
        .unwrap();
        assert_eq!(event.kind, ActionKind::Keydown);
        assert_eq!(event.which, 83);
        assert!(event.ctrl_key);
        assert!(!event.meta_key);
    }

    #[test]
    fn test_release_is_keyup() {
        let event = key_event_from_winit(
            PhysicalKey::Code(KeyCode::Escape),
            ElementState::Released,
            ModifiersState::empty(),
        )
        .unwrap();
        assert_eq!(event.kind, ActionKind::Keyup);
        assert_eq!(event.which, 27);
    }

    #[test]
    fn test_super_is_meta() {
        let event = key_event_from_winit(
            PhysicalKey::Code(KeyCode::KeyK),
            ElementState::Pressed,
            ModifiersState::SUPER,
        )
        .unwrap();
        assert!(event.meta_key);
    }

    #[test]
    fn test_numpad_and_function_keys() {
        assert_eq!(legacy_code(KeyCode::Numpad7), Some(103));
        assert_eq!(legacy_code(KeyCode::F5), Some(116));
        assert_eq!(legacy_code(KeyCode::Slash), Some(191));
    }

    #[test]
    fn test_keypress_from_text() {
        let event = keypress_from_text("?", ModifiersState::SHIFT).unwrap();
        assert_eq!(event.kind, ActionKind::Keypress);
        assert_eq!(event.which, '?' as u32);
        assert!(event.shift_key);

        assert!(keypress_from_text("\r", ModifiersState::empty()).is_none());
        assert!(keypress_from_text("", ModifiersState::empty()).is_none());
    }
}
