//! Raw keyboard events and the element tree they target
//!
//! This is the input boundary of the engine. Hosts translate whatever their
//! windowing or DOM layer produces into a [`KeyboardEvent`] carrying a legacy
//! numeric key code (`which`), the four modifier flags and an optional target
//! element.

use std::rc::Rc;

use super::types::ActionKind;

/// An element in the host's focus tree
///
/// Only the properties the editable-surface policy needs are modelled.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Upper-case tag name, e.g. `INPUT`
    pub tag_name: String,
    /// Space separated class list
    pub class_name: String,
    /// Explicit content-editable flag; `None` inherits from the parent
    pub content_editable: Option<bool>,
    pub parent: Option<Rc<Element>>,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_uppercase(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn with_content_editable(mut self, editable: bool) -> Self {
        self.content_editable = Some(editable);
        self
    }

    pub fn with_parent(mut self, parent: Rc<Element>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }

    /// Effective content-editable state, inherited through the parent chain
    pub fn is_content_editable(&self) -> bool {
        match self.content_editable {
            Some(editable) => editable,
            None => self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_content_editable()),
        }
    }

    /// Whether this element is `ancestor` or sits somewhere below it
    pub fn belongs_to(element: &Rc<Element>, ancestor: &Rc<Element>) -> bool {
        let mut current = Some(Rc::clone(element));
        while let Some(element) = current {
            if Rc::ptr_eq(&element, ancestor) {
                return true;
            }
            current = element.parent.clone();
        }
        false
    }

    /// Native text-editing control (input, select, textarea)
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag_name.as_str(), "INPUT" | "SELECT" | "TEXTAREA")
    }
}

/// A raw keyboard event as delivered by the host
#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    pub kind: ActionKind,
    /// Legacy key code (`which` / `keyCode`); the character code for keypress
    pub which: u32,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub target: Option<Rc<Element>>,
    /// Innermost target when the event crossed a shadow boundary
    pub composed_target: Option<Rc<Element>>,
    /// Set on events fabricated by `Keytrap::trigger`
    pub synthetic: bool,
}

impl KeyboardEvent {
    pub fn new(kind: ActionKind, which: u32) -> Self {
        Self {
            kind,
            which,
            shift_key: false,
            ctrl_key: false,
            alt_key: false,
            meta_key: false,
            target: None,
            composed_target: None,
            synthetic: false,
        }
    }

    pub fn keydown(which: u32) -> Self {
        Self::new(ActionKind::Keydown, which)
    }

    pub fn keyup(which: u32) -> Self {
        Self::new(ActionKind::Keyup, which)
    }

    pub fn keypress(ch: char) -> Self {
        Self::new(ActionKind::Keypress, ch as u32)
    }

    /// The empty event handed to callbacks invoked through `trigger`
    pub fn synthetic(kind: ActionKind) -> Self {
        Self {
            synthetic: true,
            ..Self::new(kind, 0)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_target(mut self, target: Rc<Element>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_composed_target(mut self, target: Rc<Element>) -> Self {
        self.composed_target = Some(target);
        self
    }
}
