//! Comprehensive tests for fos-dom
//!
//! Builds small documents the way the renderer does and checks the tree
//! operations it depends on.

use fos_dom::{DomTree, Event, ScopedStyleSheet};
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// BUILDING
// ============================================================================

#[test]
fn test_build_list_into_document() {
    let mut tree = DomTree::new();
    let doc = tree.document();
    let ul = tree.create_element("ul");
    tree.append_child(doc, ul).unwrap();
    for label in ["one", "two", "three"] {
        let li = tree.create_element("li");
        tree.set_text_content(li, label).unwrap();
        tree.append_child(ul, li).unwrap();
    }
    assert!(tree.is_connected(tree.first_child(ul).unwrap()));
    assert_eq!(tree.text_content(ul), "onetwothree");
    assert_eq!(tree.elements(ul).count(), 4);
}

#[test]
fn test_template_clone_is_independent() {
    let mut tree = DomTree::new();
    let template = tree.create_fragment();
    let row = tree.create_element("tr");
    let cell = tree.create_element("td");
    tree.append_child(template, row).unwrap();
    tree.append_child(row, cell).unwrap();

    let a = tree.clone_node(template, true).unwrap();
    let b = tree.clone_node(template, true).unwrap();
    let a_cell = tree.elements(a).nth(1).unwrap();
    tree.set_attribute(a_cell, "class", "x").unwrap();

    let b_cell = tree.elements(b).nth(1).unwrap();
    assert_eq!(tree.get_attribute(b_cell, "class"), None);
    assert_eq!(tree.get_attribute(cell, "class"), None);
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_event_path_and_listeners() {
    let mut tree = DomTree::new();
    let outer = tree.create_element("div");
    let button = tree.create_element("button");
    tree.append_child(outer, button).unwrap();

    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    tree.add_event_listener(outer, "click", Rc::new(move |e: &Event| {
        assert_eq!(e.name, "click");
        h.set(h.get() + 1);
    }));

    assert_eq!(tree.event_path(button), vec![button, outer]);
    let event = Event::new("click", button);
    for node in tree.event_path(button) {
        for listener in tree.listeners(node, "click") {
            listener(&event);
        }
    }
    assert_eq!(hits.get(), 1);
}

// ============================================================================
// ADOPTED STYLESHEETS
// ============================================================================

#[test]
fn test_adopt_once_per_root() {
    let mut tree = DomTree::new();
    let doc = tree.document();
    let sheet = ScopedStyleSheet::new("class { color: red }");
    assert!(tree.adopt_stylesheet(doc, sheet.clone()));
    assert!(!tree.adopt_stylesheet(doc, sheet.clone()));
    assert_eq!(tree.adopted_stylesheets(doc).len(), 1);

    let detached = tree.create_fragment();
    assert!(tree.adopt_stylesheet(detached, sheet));
}
