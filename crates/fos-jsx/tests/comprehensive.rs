//! Comprehensive tests for fos-jsx
//!
//! Whole-module compilation, the built partial IR, and the compiled
//! templates instantiated through the fos-render runtime.

use fos_dom::{Event, NodeId, PropertyValue};
use fos_jsx::{
    build, compile, merge_children, AssignKind, Assignment, CompileError, Config, Node,
    NodeProps, Partial, Span,
};
use fos_html::OutlineEntry;
use fos_reactive::Runtime;
use fos_render::{PartialArg, PartialMeta, PropKind, RenderResult, Renderer, Value};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn partial_of(source: &str) -> Partial {
    match build(source, &Config::default()).unwrap() {
        Node::Partial(partial) => partial,
        other => panic!("expected a partial, got {:?}", other),
    }
}

fn compiled(source: &str) -> String {
    compile(source, &Config::default()).unwrap().code
}

fn renderer() -> Renderer {
    Renderer::new(Runtime::shared())
}

// ============================================================================
// ATTRIBUTE INLINING
// ============================================================================

#[test]
fn test_static_attributes_inline() {
    let partial = partial_of(r#"<div id="x" data-on class="a b"></div>"#);
    assert_eq!(partial.content, r#"<div id="x" data-on class="a b"></div>"#);
    assert!(partial.nodes.is_empty());
    assert_eq!(partial.meta(), PartialMeta::default());

    let code = compiled(r#"const el = <div id="x" data-on class="a b"></div>;"#);
    assert!(code.contains(r#"const _partial0 = _createPartial("<div id=\"x\" data-on class=\"a b\"></div>");"#));
    assert!(code.ends_with("const el = _partial0();"));
}

#[test]
fn test_folded_literals_inline() {
    let partial = partial_of(r#"<p title={"a" + "b"} tabindex={-1} hidden={false}>{1 + 1}</p>"#);
    assert_eq!(partial.content, r#"<p title="ab" tabindex="-1">2</p>"#);
    assert!(partial.nodes.is_empty());
}

#[test]
fn test_boolean_shorthand() {
    let partial = partial_of("<input disabled />");
    assert_eq!(partial.content, "<input disabled />");
}

#[test]
fn test_void_element_serialization() {
    let partial = partial_of(r#"<img src="a.png"/>"#);
    assert_eq!(partial.content, r#"<img src="a.png" />"#);
    assert!(partial.content.ends_with(" />"));
}

// ============================================================================
// DYNAMIC DISPATCH
// ============================================================================

#[test]
fn test_dynamic_dispatch_ir() {
    let partial = partial_of("<label><input value={sig} on:input={handler} /></label>");
    assert_eq!(partial.content, "<label><input /></label>");
    assert_eq!(
        partial.nodes,
        vec![NodeProps {
            walk: 1,
            assignments: vec![
                Assignment::new(AssignKind::Prop(PropKind::Prop), "value", "sig"),
                Assignment::new(AssignKind::Prop(PropKind::EventNS), "input", "handler"),
            ],
        }]
    );
    assert_eq!(partial.meta().to_json(), r#"{"1":0,"m":2}"#);
}

#[test]
fn test_dynamic_dispatch_code() {
    let code = compiled("const el = <label><input value={sig} on:input={handler} /></label>;");
    assert!(code.contains(
        r#"import { addEvent as _addEvent, createPartial as _createPartial, setProperty as _setProperty } from "fos-render/solid";"#
    ));
    assert!(code.contains(r#"const _partial0 = _createPartial("<label><input /></label>", {"1":0,"m":2});"#));
    assert!(code.contains(
        r#"_partial0([node => { _setProperty(node, "value", sig); _addEvent(node, "input", handler) }])"#
    ));
}

#[test]
fn test_dynamic_dispatch_through_runtime() {
    let partial = partial_of("<label><input value={sig} on:input={handler} /></label>");
    let renderer = renderer();
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());

    let calls: Rc<RefCell<Vec<(String, &'static str)>>> = Rc::default();
    let inputs = Rc::new(RefCell::new(0));
    let args: Vec<PartialArg> = partial
        .nodes
        .iter()
        .map(|node| {
            let assignments = node.assignments.clone();
            let (calls, inputs) = (calls.clone(), inputs.clone());
            Box::new(move |renderer: &Renderer, target: NodeId| -> RenderResult<()> {
                for assignment in &assignments {
                    let tag = renderer.tree().tag_name(target).unwrap_or_default().to_string();
                    calls.borrow_mut().push((tag, assignment.runtime_function()));
                    match assignment.runtime_function() {
                        "setProperty" => renderer.set_property(target, &assignment.name, Value::from("a"))?,
                        "addEvent" => {
                            let inputs = inputs.clone();
                            renderer.add_event(
                                target,
                                &assignment.name,
                                Value::handler(move |_| *inputs.borrow_mut() += 1),
                            )?
                        }
                        other => panic!("unexpected setter {}", other),
                    }
                }
                Ok(())
            }) as PartialArg
        })
        .collect();

    let out = factory.call(args).unwrap();
    let label = out.nodes()[0];
    let input = renderer.tree().first_child(label).unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![
            ("input".to_string(), "setProperty"),
            ("input".to_string(), "addEvent")
        ]
    );
    assert_eq!(
        renderer.tree().get_property(input, "value"),
        Some(&PropertyValue::String("a".into()))
    );
    assert!(!renderer.tree().has_attribute(input, "value"));
    renderer.dispatch_event(&Event::new("input", input));
    assert_eq!(*inputs.borrow(), 1);
}

#[test]
fn test_namespaced_setters() {
    let partial = partial_of(
        "<div class:active={on} style:color={c} prop:foo={f} use:ref={r} onClick={h} style={s} class={k}></div>",
    );
    let functions: Vec<&str> = partial.nodes[0]
        .assignments
        .iter()
        .map(Assignment::runtime_function)
        .collect();
    assert_eq!(
        functions,
        vec![
            "setClassToken",
            "setStyleProperty",
            "setProperty",
            "setRef",
            "addEvent",
            "setStyle",
            "setClass"
        ]
    );
    assert_eq!(partial.nodes[0].assignments[4].name, "click");
    assert_eq!(partial.nodes[0].assignments[0].arguments(), r#""active", on"#);
    assert_eq!(partial.nodes[0].assignments[3].arguments(), "r");
}

#[test]
fn test_spread_keeps_position() {
    let partial = partial_of(r#"<div a="1" {...props} b="2"></div>"#);
    assert_eq!(partial.content, r#"<div a="1"></div>"#);
    let assignments = &partial.nodes[0].assignments;
    assert_eq!(assignments[0].runtime_function(), "spreadProps");
    assert_eq!(assignments[1].runtime_function(), "setAttribute");
    assert_eq!(assignments[1].arguments(), r#""b", "2""#);
}

// ============================================================================
// CHILDREN
// ============================================================================

#[test]
fn test_static_children_inline() {
    let partial = partial_of("<ul>\n  <li>one</li>\n  <li>two &amp; three</li>\n</ul>");
    assert_eq!(partial.content, "<ul><li>one</li><li>two &amp; three</li></ul>");
    assert_eq!(partial.element_count, 3);
}

#[test]
fn test_dynamic_children_after_static_prefix() {
    let partial = partial_of("<p>Hello {name}!</p>");
    assert_eq!(partial.content, "<p>Hello </p>");
    assert_eq!(
        partial.nodes[0].assignments,
        vec![Assignment::new(AssignKind::Children, "children", r#"[name, "!"]"#)]
    );
}

#[test]
fn test_nested_dynamic_walks() {
    let partial = partial_of("<ul><li>a</li><li class={x}>b</li><li title={t}>c</li></ul>");
    let walks: Vec<usize> = partial.nodes.iter().map(|n| n.walk).collect();
    assert_eq!(walks, vec![2, 3]);
    assert_eq!(partial.meta().to_json(), r#"{"2":0,"3":1,"m":4}"#);
}

#[test]
fn test_nested_walks_through_runtime() {
    let partial = partial_of("<ul><li>a</li><li class={x}>b</li><li title={t}>c</li></ul>");
    let renderer = renderer();
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let args: Vec<PartialArg> = (0..partial.nodes.len())
        .map(|_| {
            let seen = seen.clone();
            Box::new(move |renderer: &Renderer, node: NodeId| -> RenderResult<()> {
                seen.borrow_mut().push(renderer.tree().text_content(node));
                Ok(())
            }) as PartialArg
        })
        .collect();
    factory.call(args).unwrap();
    assert_eq!(*seen.borrow(), vec!["b".to_string(), "c".to_string()]);
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn test_static_html_round_trip() {
    let source = r#"<div id="x" data-on class="a b"><p>hi <b>there</b></p><img src="a.png"/></div>"#;
    let partial = partial_of(source);
    let renderer = renderer();
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());
    let nodes = factory.call(Vec::new()).unwrap().nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(renderer.outer_html(nodes[0]), partial.content);
    assert_eq!(
        partial.content,
        r#"<div id="x" data-on class="a b"><p>hi <b>there</b></p><img src="a.png" /></div>"#
    );
}

#[test]
fn test_validation_counts_distinct_templates() {
    let output = compile(
        "const a = <p>x</p>; const b = <p>x</p>; const c = <i>y</i>;",
        &Config::default(),
    )
    .unwrap();
    assert_eq!(output.partials, 2);
    assert_eq!(output.validations, 2);
}

// ============================================================================
// HOISTING
// ============================================================================

#[test]
fn test_hoisting_within_one_module() {
    let code = compiled("const a = <b>x</b>;\nconst b = <b>x</b>;\nconst c = <b>x</b>;");
    assert_eq!(code.matches("_createPartial(\"<b>x</b>\")").count(), 1);
    assert_eq!(code.matches("_partial0()").count(), 3);
}

#[test]
fn test_hoisting_across_modules_is_independent() {
    let first = compiled("export const a = <b>x</b>;");
    let second = compiled("export const a = <b>x</b>;");
    for code in [&first, &second] {
        assert!(code.contains(r#"const _partial0 = _createPartial("<b>x</b>");"#));
    }
}

#[test]
fn test_same_html_different_meta_not_shared() {
    let code = compiled("const a = <b title={x}></b>; const b = <b></b>;");
    assert!(code.contains(r#"const _partial0 = _createPartial("<b></b>", {"m":1});"#));
    assert!(code.contains(r#"const _partial1 = _createPartial("<b></b>");"#));
}

#[test]
fn test_nested_jsx_in_props_compiles() {
    let code = compiled("const el = <div>{show ? <b>yes</b> : null}</div>;");
    assert!(code.contains(r#"_createPartial("<b>yes</b>")"#));
    assert!(code.contains("_createChildren(node, show ? _partial"));
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_invalid_nesting_rejected() {
    let err = build("<tr><div/></tr>", &Config::default()).unwrap_err();
    match err {
        CompileError::InvalidNesting { parent, child, .. } => {
            assert_eq!(parent, "tr");
            assert_eq!(child, "div");
        }
        other => panic!("expected InvalidNesting, got {:?}", other),
    }
}

#[test]
fn test_error_location() {
    let source = "const a = 1;\nconst el = <tr>\n  <div/>\n</tr>;";
    let err = compile(source, &Config::default()).unwrap_err();
    assert_eq!(err.line_column(source), (3, 4));
    let report = err.report(source, "app.jsx");
    assert!(report.contains("app.jsx"));
    assert!(report.contains("cannot be a child of <tr>"));
}

// ============================================================================
// MERGE PROPERTIES
// ============================================================================

fn leaf(tag: &'static str, dynamic: bool) -> Node {
    let mut nodes = Vec::new();
    if dynamic {
        nodes.push(NodeProps {
            walk: 0,
            assignments: vec![Assignment::new(AssignKind::Prop(PropKind::Attribute), "title", "t")],
        });
    }
    Node::Partial(Partial {
        tag: tag.into(),
        content: format!("<{0}></{0}>", tag),
        nodes,
        element_count: 1,
        xmlns: None,
        custom: false,
        outline: vec![OutlineEntry::new(0, tag, Vec::new())],
        span: Span::default(),
    })
}

fn node_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        "[a-z<& ]{0,3}".prop_map(Node::Text),
        any::<bool>().prop_map(|dynamic| leaf("b", dynamic)),
        any::<bool>().prop_map(|dynamic| leaf("i", dynamic)),
        "[xyz]".prop_map(Node::Code),
    ]
}

proptest! {
    #[test]
    fn prop_merge_is_associative(
        a in prop::collection::vec(node_strategy(), 0..5),
        b in prop::collection::vec(node_strategy(), 0..5),
        c in prop::collection::vec(node_strategy(), 0..5),
    ) {
        let concat = |x: Vec<Node>, y: Vec<Node>| x.into_iter().chain(y).collect::<Vec<_>>();

        let left = merge_children(concat(
            merge_children(concat(a.clone(), b.clone())),
            c.clone(),
        ));
        let right = merge_children(concat(a.clone(), merge_children(concat(b.clone(), c.clone()))));
        let flat = merge_children(concat(concat(a, b), c));

        prop_assert_eq!(&left, &flat);
        prop_assert_eq!(&right, &flat);
    }

    #[test]
    fn prop_merge_preserves_dynamic_count(nodes in prop::collection::vec(node_strategy(), 0..8)) {
        let dynamic = |nodes: &[Node]| nodes.iter().map(|n| match n {
            Node::Partial(p) => p.nodes.len(),
            _ => 0,
        }).sum::<usize>();
        let before = dynamic(&nodes);
        let merged = merge_children(nodes);
        prop_assert_eq!(dynamic(&merged), before);
    }
}
