//! Editable-surface policy tests
//!
//! Which bindings may run when the event targets inputs, editable regions
//! or the element an instance is bound to.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use common::{type_char, Recorder};
use keytrap::{ActionKind, Element, InputTarget, KeyboardEvent, Keytrap, Platform};

fn keypress_in(ch: char, element: &Rc<Element>) -> KeyboardEvent {
    KeyboardEvent::keypress(ch).with_target(Rc::clone(element))
}

#[test]
fn test_form_controls_block_plain_bindings() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());
    let now = Instant::now();

    for tag in ["input", "select", "textarea"] {
        let element = Rc::new(Element::new(tag));
        let dispatch = trap.handle_event(&keypress_in('a', &element), now);
        assert!(dispatch.is_empty(), "{} should block", tag);
    }

    let div = Rc::new(Element::new("div"));
    trap.handle_event(&keypress_in('a', &div), now);
    assert_eq!(hits.hits(), vec!["a"]);
}

#[test]
fn test_content_editable_is_inherited() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());
    let now = Instant::now();

    let editor = Rc::new(Element::new("div").with_content_editable(true));
    let paragraph = Rc::new(Element::new("p").with_parent(Rc::clone(&editor)));
    let locked = Rc::new(
        Element::new("span")
            .with_content_editable(false)
            .with_parent(Rc::clone(&paragraph)),
    );

    trap.handle_event(&keypress_in('a', &paragraph), now);
    assert!(hits.is_empty());

    trap.handle_event(&keypress_in('a', &locked), now);
    assert_eq!(hits.hits(), vec!["a"]);
}

#[test]
fn test_opt_in_class_reenables_shortcuts() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());

    let search = Rc::new(Element::new("input").with_class("search mousetrap"));
    trap.handle_event(&keypress_in('a', &search), Instant::now());
    assert_eq!(hits.hits(), vec!["a"]);
}

#[test]
fn test_shadow_target_takes_precedence() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());

    let host = Rc::new(Element::new("my-widget"));
    let inner = Rc::new(Element::new("input"));
    let event = KeyboardEvent::keypress('a')
        .with_target(host)
        .with_composed_target(inner);

    assert!(trap.handle_event(&event, Instant::now()).is_empty());
    assert!(hits.is_empty());
}

#[test]
fn test_opt_in_shadow_host_lets_inner_input_through() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());

    let host = Rc::new(Element::new("my-widget").with_class("mousetrap"));
    let inner = Rc::new(Element::new("input"));
    let event = KeyboardEvent::keypress('a')
        .with_target(host)
        .with_composed_target(inner);

    trap.handle_event(&event, Instant::now());
    assert_eq!(hits.hits(), vec!["a"]);
}

#[test]
fn test_global_bindings_fire_inside_inputs() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new().with_platform(Platform::Other);
    trap.bind_global("mod+s", None, hits.callback());
    trap.bind("a", None, hits.callback());

    let input = Rc::new(Element::new("input"));
    let save = KeyboardEvent::keydown('S' as u32)
        .with_ctrl()
        .with_target(Rc::clone(&input));
    trap.handle_event(&save, Instant::now());
    trap.handle_event(&keypress_in('a', &input), Instant::now());

    assert_eq!(hits.hits(), vec!["mod+s"]);
}

#[test]
fn test_instance_bound_to_an_input_handles_its_own_keys() {
    let input = Rc::new(Element::new("textarea"));
    let other = Rc::new(Element::new("input"));
    let hits = Recorder::new();
    let mut trap = Keytrap::with_target(InputTarget::Element(Rc::clone(&input)));
    trap.bind("a", None, hits.callback());
    let now = Instant::now();

    trap.handle_event(&keypress_in('a', &input), now);
    trap.handle_event(&keypress_in('a', &other), now);
    assert_eq!(hits.hits(), vec!["a"]);
}

#[test]
fn test_custom_stop_callback_sees_pattern_and_target() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", None, hits.callback());
    trap.bind("b", None, hits.callback());
    trap.set_stop_callback(move |_, element, pattern| {
        let tag = element.map(|e| e.tag_name.clone()).unwrap_or_default();
        log.borrow_mut().push(format!("{}:{}", tag, pattern));
        pattern == "b"
    });

    // inputs no longer block anything on their own
    let input = Rc::new(Element::new("input"));
    let now = Instant::now();
    trap.handle_event(&keypress_in('a', &input), now);
    trap.handle_event(&keypress_in('b', &input), now);

    assert_eq!(hits.hits(), vec!["a"]);
    assert_eq!(*seen.borrow(), vec!["INPUT:a", "INPUT:b"]);
}

#[test]
fn test_stopped_binding_does_not_suppress() {
    let mut trap = Keytrap::new();
    trap.bind("a", None, |_: &KeyboardEvent, _: &str| false);

    let input = Rc::new(Element::new("input"));
    let dispatch = trap.handle_event(&keypress_in('a', &input), Instant::now());
    assert!(!dispatch.prevent_default);
    assert!(!dispatch.stop_propagation);

    let dispatch = trap.handle_event(&KeyboardEvent::keypress('a'), Instant::now());
    assert!(dispatch.prevent_default);
    assert!(dispatch.stop_propagation);
}

#[test]
fn test_sequence_steps_respect_inputs() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("g i", None, hits.callback());
    let now = Instant::now();

    let input = Rc::new(Element::new("input"));
    trap.handle_event(&keypress_in('g', &input), now);
    trap.handle_event(&keypress_in('i', &input), now);
    assert!(hits.is_empty());

    trap.bind_global("g i", None, hits.callback());
    trap.handle_event(&keypress_in('g', &input), now);
    trap.handle_event(&keypress_in('i', &input), now);
    assert_eq!(hits.hits(), vec!["g i"]);
}

#[test]
fn test_keypress_ignores_shift_and_alt() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("?", None, hits.callback());
    let now = Instant::now();

    trap.handle_event(&KeyboardEvent::keypress('?').with_shift(), now);
    trap.handle_event(&KeyboardEvent::keypress('?').with_alt(), now);
    trap.handle_event(&KeyboardEvent::keypress('?').with_ctrl(), now);

    assert_eq!(hits.hits(), vec!["?", "?"]);
}

#[test]
fn test_trigger_bypasses_the_gate() {
    let hits = Recorder::new();
    let mut trap = Keytrap::new();
    trap.bind("a", Some(ActionKind::Keyup), hits.callback());
    trap.set_stop_callback(|_, _, _| true);

    assert!(!trap.trigger("a", None));
    assert!(trap.trigger("a", Some(ActionKind::Keyup)));
    assert_eq!(hits.hits(), vec!["a"]);

    type_char(&mut trap, 'a', Instant::now());
    assert_eq!(hits.hits(), vec!["a"]);
}
