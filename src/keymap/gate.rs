//! Suppression policy and dispatch outcome
//!
//! Decides whether a matched binding may run for an event (the stop
//! predicate) and collects what the callbacks asked the host to do with the
//! event.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use super::binding::CallbackResult;
use super::event::{Element, KeyboardEvent};

/// Class that opts an editable element back into shortcut handling
pub const OPT_IN_CLASS: &str = "mousetrap";

/// Custom stop predicate: `(event, target element, pattern)`; true stops
pub type StopCallback = Box<dyn Fn(&KeyboardEvent, Option<&Rc<Element>>, &str) -> bool>;

/// The element tree an engine instance listens on
#[derive(Debug, Clone, Default)]
pub enum InputTarget {
    /// The whole document
    #[default]
    Document,
    /// A single element and everything inside it
    Element(Rc<Element>),
}

impl InputTarget {
    fn contains(&self, element: &Rc<Element>) -> bool {
        match self {
            InputTarget::Document => false,
            InputTarget::Element(root) => Element::belongs_to(element, root),
        }
    }
}

/// What the host should do with the event after dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    /// Patterns whose callbacks ran, in call order
    pub fired: Vec<String>,
}

impl Dispatch {
    pub fn record(&mut self, pattern: &str, result: CallbackResult) {
        self.fired.push(pattern.to_string());
        if result == CallbackResult::Suppress {
            self.prevent_default = true;
            self.stop_propagation = true;
        }
    }

    pub fn merge(&mut self, other: Dispatch) {
        self.prevent_default |= other.prevent_default;
        self.stop_propagation |= other.stop_propagation;
        self.fired.extend(other.fired);
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

pub struct EventGate {
    target: InputTarget,
    globals: HashSet<String>,
    stop: Option<StopCallback>,
}

impl EventGate {
    pub fn new(target: InputTarget) -> Self {
        Self {
            target,
            globals: HashSet::new(),
            stop: None,
        }
    }

    pub fn target(&self) -> &InputTarget {
        &self.target
    }

    /// Let `pattern` fire even inside editable elements
    pub fn allow_global(&mut self, pattern: &str) {
        self.globals.insert(pattern.to_string());
    }

    pub fn is_global(&self, pattern: &str) -> bool {
        self.globals.contains(pattern)
    }

    pub fn set_stop_callback<F>(&mut self, stop: F)
    where
        F: Fn(&KeyboardEvent, Option<&Rc<Element>>, &str) -> bool + 'static,
    {
        self.stop = Some(Box::new(stop));
    }

    pub fn clear(&mut self) {
        self.globals.clear();
    }

    /// Whether the binding for `pattern` must not run for this event
    ///
    /// `sequence` is the whole sequence when `pattern` is one of its steps;
    /// a global opt-in on either lets the event through.
    pub fn should_stop(&self, event: &KeyboardEvent, pattern: &str, sequence: Option<&str>) -> bool {
        if self.is_global(pattern) || sequence.is_some_and(|s| self.is_global(s)) {
            return false;
        }

        let stopped = match &self.stop {
            Some(stop) => stop(event, event.target.as_ref(), pattern),
            None => self.default_stop(event),
        };
        if stopped {
            tracing::trace!(pattern, "binding stopped by editable target");
        }
        stopped
    }

    /// Opt-in class and bound-element checks look at the event target;
    /// the editable check looks through shadow roots to the inner element.
    fn default_stop(&self, event: &KeyboardEvent) -> bool {
        if let Some(target) = &event.target {
            if target.has_class(OPT_IN_CLASS) || self.target.contains(target) {
                return false;
            }
        }

        event
            .composed_target
            .as_ref()
            .or(event.target.as_ref())
            .is_some_and(|element| element.is_form_control() || element.is_content_editable())
    }
}

impl Default for EventGate {
    fn default() -> Self {
        Self::new(InputTarget::Document)
    }
}

impl fmt::Debug for EventGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventGate")
            .field("target", &self.target)
            .field("globals", &self.globals)
            .field("custom_stop", &self.stop.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing_in(tag: &str) -> KeyboardEvent {
        KeyboardEvent::keypress('a').with_target(Rc::new(Element::new(tag)))
    }

    #[test]
    fn test_form_controls_stop() {
        let gate = EventGate::default();
        assert!(gate.should_stop(&typing_in("input"), "a", None));
        assert!(gate.should_stop(&typing_in("select"), "a", None));
        assert!(gate.should_stop(&typing_in("textarea"), "a", None));
        assert!(!gate.should_stop(&typing_in("div"), "a", None));
    }

    #[test]
    fn test_no_target_never_stops() {
        let gate = EventGate::default();
        assert!(!gate.should_stop(&KeyboardEvent::keypress('a'), "a", None));
    }

    #[test]
    fn test_content_editable_stops() {
        let gate = EventGate::default();
        let editor = Rc::new(Element::new("div").with_content_editable(true));
        let para = Rc::new(Element::new("p").with_parent(editor));
        let event = KeyboardEvent::keypress('a').with_target(para);
        assert!(gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_opt_in_class() {
        let gate = EventGate::default();
        let input = Rc::new(Element::new("input").with_class("search mousetrap"));
        let event = KeyboardEvent::keypress('a').with_target(input);
        assert!(!gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_elements_inside_bound_target_pass() {
        let form = Rc::new(Element::new("form"));
        let input = Rc::new(Element::new("input").with_parent(Rc::clone(&form)));
        let gate = EventGate::new(InputTarget::Element(form));

        let event = KeyboardEvent::keypress('a').with_target(input);
        assert!(!gate.should_stop(&event, "a", None));
        assert!(gate.should_stop(&typing_in("input"), "a", None));
    }

    #[test]
    fn test_composed_target_wins() {
        let gate = EventGate::default();
        let host = Rc::new(Element::new("my-widget"));
        let inner = Rc::new(Element::new("input"));
        let event = KeyboardEvent::keypress('a')
            .with_target(host)
            .with_composed_target(inner);
        assert!(gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_opt_in_class_on_shadow_host() {
        let gate = EventGate::default();
        let host = Rc::new(Element::new("my-widget").with_class("mousetrap"));
        let inner = Rc::new(Element::new("input"));
        let event = KeyboardEvent::keypress('a')
            .with_target(host)
            .with_composed_target(inner);
        assert!(!gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_opt_in_class_on_inner_element_is_ignored() {
        let gate = EventGate::default();
        let host = Rc::new(Element::new("my-widget"));
        let inner = Rc::new(Element::new("input").with_class("mousetrap"));
        let event = KeyboardEvent::keypress('a')
            .with_target(host)
            .with_composed_target(inner);
        assert!(gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_shadow_host_inside_bound_target_passes() {
        let root = Rc::new(Element::new("section"));
        let host = Rc::new(Element::new("my-widget").with_parent(Rc::clone(&root)));
        let inner = Rc::new(Element::new("textarea"));
        let gate = EventGate::new(InputTarget::Element(root));

        let event = KeyboardEvent::keypress('a')
            .with_target(host)
            .with_composed_target(inner);
        assert!(!gate.should_stop(&event, "a", None));
    }

    #[test]
    fn test_global_patterns_bypass() {
        let mut gate = EventGate::default();
        gate.allow_global("mod+s");
        gate.allow_global("g i");
        assert!(!gate.should_stop(&typing_in("input"), "mod+s", None));
        assert!(!gate.should_stop(&typing_in("input"), "i", Some("g i")));
        assert!(gate.should_stop(&typing_in("input"), "a", None));
    }

    #[test]
    fn test_custom_stop_callback() {
        let mut gate = EventGate::default();
        gate.set_stop_callback(|_, _, pattern| pattern == "x");
        assert!(!gate.should_stop(&typing_in("input"), "a", None));
        assert!(gate.should_stop(&KeyboardEvent::keypress('x'), "x", None));
    }

    #[test]
    fn test_dispatch_record() {
        let mut dispatch = Dispatch::default();
        dispatch.record("a", CallbackResult::Propagate);
        assert!(!dispatch.prevent_default);
        dispatch.record("b", CallbackResult::Suppress);
        assert!(dispatch.prevent_default);
        assert!(dispatch.stop_propagation);
        assert_eq!(dispatch.fired, vec!["a", "b"]);
    }
}
