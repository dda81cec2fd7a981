//! Edge case tests for fos-render

use fos_dom::{Namespace, NodeId};
use fos_reactive::{root, Context, ReactiveVec, Runtime, Signal};
use fos_render::{Children, PartialArg, PartialMeta, RenderError, RenderOptions, Renderer, Value};
use std::cell::Cell;
use std::rc::Rc;

fn renderer() -> Renderer {
    Renderer::new(Runtime::shared())
}

fn host(renderer: &Renderer) -> NodeId {
    let mut tree = renderer.tree_mut();
    let node = tree.create_element("div");
    let document = tree.document();
    tree.append_child(document, node).unwrap();
    node
}

// ============================================================================
// METADATA
// ============================================================================

#[test]
fn test_meta_identity_entries_are_implicit() {
    let renderer = renderer();
    let partial = renderer.create_partial(
        "<ul><li></li><li></li></ul>",
        PartialMeta::from_json(r#"{"m":3}"#).unwrap(),
    );
    let tags = Rc::new(std::cell::RefCell::new(Vec::new()));
    let args: Vec<PartialArg> = (0..3)
        .map(|i| {
            let tags = tags.clone();
            Box::new(move |renderer: &Renderer, node: NodeId| {
                let tag = renderer.tree().tag_name(node).unwrap_or("").to_string();
                tags.borrow_mut().push(format!("{}{}", tag, i));
                Ok(())
            }) as PartialArg
        })
        .collect();
    partial.call(args).unwrap();
    assert_eq!(*tags.borrow(), vec!["ul0", "li1", "li2"]);
}

#[test]
fn test_max_limits_walk() {
    let renderer = renderer();
    let partial = renderer.create_partial(
        "<p><b></b></p>",
        PartialMeta::from_json(r#"{"m":1}"#).unwrap(),
    );
    let noop = || -> PartialArg { Box::new(|_: &Renderer, _: NodeId| Ok(())) };
    assert!(matches!(
        partial.call(vec![noop(), noop()]),
        Err(RenderError::WalkExhausted { .. })
    ));
}

#[test]
fn test_invalid_metadata_is_an_error() {
    assert!(matches!(
        PartialMeta::from_json("{"),
        Err(RenderError::InvalidMetadata(_))
    ));
}

#[test]
fn test_xml_partial_keeps_namespace() {
    let renderer = renderer();
    let partial = renderer.create_partial(
        r#"<circle r="1"></circle>"#,
        PartialMeta::from_json(r#"{"x":"http://www.w3.org/2000/svg"}"#).unwrap(),
    );
    let node = partial.call(Vec::new()).unwrap().nodes()[0];
    assert_eq!(renderer.tree().namespace(node), Some(&Namespace::Svg));
}

#[test]
fn test_namespaced_prop_in_xml_template_needs_no_declaration() {
    let renderer = renderer();
    renderer.props_plugin_ns("route", |_: &Renderer, _: NodeId, _: &str, _: Value| Ok(()), false);
    assert!(renderer.xmlns_declarations().ends_with(r#" xmlns:route="/""#));

    let partial = renderer.create_partial(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><g route:to="/a"></g></svg>"#,
        PartialMeta::from_json(r#"{"x":"http://www.w3.org/2000/svg"}"#).unwrap(),
    );
    let svg = partial.call(Vec::new()).unwrap().nodes()[0];
    let tree = renderer.tree();
    let g = tree.children(svg)[0];
    assert_eq!(tree.get_attribute(g, "route:to"), Some("/a"));
    assert_eq!(tree.get_attribute(svg, "xmlns"), Some(Namespace::SVG_URI));
}

#[test]
fn test_import_flag_upgrades_custom_elements() {
    let renderer = renderer();
    let upgraded = Rc::new(Cell::new(0));
    let u = upgraded.clone();
    renderer
        .tree_mut()
        .custom_elements_mut()
        .define("x-card", Rc::new(move |_: NodeId| u.set(u.get() + 1)))
        .unwrap();

    let cloned = renderer.create_partial("<x-card></x-card>", PartialMeta::default());
    cloned.call(Vec::new()).unwrap();
    assert_eq!(upgraded.get(), 0);

    let imported = renderer.create_partial(
        "<x-card></x-card>",
        PartialMeta::from_json(r#"{"i":1}"#).unwrap(),
    );
    imported.call(Vec::new()).unwrap();
    imported.call(Vec::new()).unwrap();
    assert_eq!(upgraded.get(), 2);
}

// ============================================================================
// CHILDREN
// ============================================================================

#[test]
fn test_dynamic_children_keep_position_between_siblings() {
    let renderer = renderer();
    let parent = host(&renderer);
    let show = Signal::new(renderer.reactive(), true);
    let s = show.clone();
    let view = Children::List(vec![
        "<".into(),
        Children::dynamic(move || {
            if s.get() {
                Children::List(vec!["a".into(), "b".into()])
            } else {
                Children::None
            }
        }),
        ">".into(),
    ]);
    renderer.render(view, Some(parent), RenderOptions::default()).unwrap();
    assert_eq!(renderer.tree().text_content(parent), "<ab>");
    show.set(false);
    assert_eq!(renderer.tree().text_content(parent), "<>");
    show.set(true);
    assert_eq!(renderer.tree().text_content(parent), "<ab>");
}

#[test]
fn test_value_children() {
    let renderer = renderer();
    let parent = host(&renderer);
    let children = Children::List(vec![
        Value::Null.into(),
        Value::Bool(true).into(),
        Value::Number(1.5).into(),
        Value::Array(vec![Value::from("x"), Value::Undefined]).into(),
    ]);
    renderer.render(children, Some(parent), RenderOptions::default()).unwrap();
    assert_eq!(renderer.tree().text_content(parent), "1.5x");
}

#[test]
fn test_relative_insert_on_detached_reference_appends_inside() {
    let renderer = renderer();
    let lonely = renderer.tree_mut().create_element("span");
    renderer
        .render("x", Some(lonely), RenderOptions { clear: false, relative: true })
        .unwrap();
    assert_eq!(renderer.inner_html(lonely), "x");
}

#[test]
fn test_proto_prop_ignored() {
    let renderer = renderer();
    let div = renderer.tree_mut().create_element("div");
    renderer.assign_prop(div, "__proto__", Value::from("x")).unwrap();
    assert!(renderer.tree().attributes(div).is_empty());
}

#[test]
fn test_children_prop() {
    let renderer = renderer();
    let div = renderer
        .jsx("div", vec![("children".to_string(), Value::from("inner"))], Children::None)
        .unwrap();
    assert_eq!(renderer.outer_html(div.nodes()[0]), "<div>inner</div>");
}

#[test]
fn test_svg_element_namespace() {
    let renderer = renderer();
    let svg = renderer.jsx("svg", Vec::new(), Children::None).unwrap().nodes()[0];
    assert_eq!(renderer.tree().namespace(svg), Some(&Namespace::Svg));
}

// ============================================================================
// KEYED LIST CORNERS
// ============================================================================

#[test]
fn test_rows_with_reactive_tail_reorder() {
    let renderer = renderer();
    let parent = host(&renderer);
    let items = ReactiveVec::from_vec(renderer.reactive(), vec!["a", "b", "c"]);
    let suffix = Signal::new(renderer.reactive(), "1".to_string());

    let (source, sfx) = (items.clone(), suffix.clone());
    let list = renderer.map(
        move || source.to_vec(),
        move |_: &Renderer, item: &&'static str, _: usize| {
            let sfx = sfx.clone();
            Children::List(vec![
                (*item).into(),
                Children::dynamic(move || sfx.get().into()),
            ])
        },
        true,
    );
    renderer.render(list, Some(parent), RenderOptions::default()).unwrap();
    assert_eq!(renderer.tree().text_content(parent), "a1b1c1");

    items.reverse();
    assert_eq!(renderer.tree().text_content(parent), "c1b1a1");
    suffix.set("2".to_string());
    assert_eq!(renderer.tree().text_content(parent), "c2b2a2");
    items.swap(0, 2);
    assert_eq!(renderer.tree().text_content(parent), "a2b2c2");
}

#[test]
fn test_rows_rendering_nothing() {
    let renderer = renderer();
    let parent = host(&renderer);
    let items = ReactiveVec::from_vec(renderer.reactive(), vec![1, 2, 3]);
    let source = items.clone();
    let list = renderer.map(
        move || source.to_vec(),
        |_: &Renderer, item: &i32, _: usize| {
            if item % 2 == 0 {
                Children::None
            } else {
                Children::from(*item)
            }
        },
        true,
    );
    renderer.render(list, Some(parent), RenderOptions::default()).unwrap();
    assert_eq!(renderer.tree().text_content(parent), "13");
    items.reverse();
    assert_eq!(renderer.tree().text_content(parent), "31");
}

#[test]
fn test_nested_lists() {
    let renderer = renderer();
    let parent = host(&renderer);
    let outer = ReactiveVec::from_vec(renderer.reactive(), vec![1, 2]);
    let source = outer.clone();
    let list = renderer.map(
        move || source.to_vec(),
        |renderer: &Renderer, item: &i32, _: usize| {
            let n = *item;
            renderer.map(move || (0..n).collect::<Vec<i32>>(), |_: &Renderer, i: &i32, _: usize| Children::from(*i), true)
        },
        true,
    );
    renderer.render(list, Some(parent), RenderOptions::default()).unwrap();
    assert_eq!(renderer.tree().text_content(parent), "001");
    outer.reverse();
    assert_eq!(renderer.tree().text_content(parent), "010");
}

#[test]
fn test_context_reaches_row_callbacks() {
    let renderer = renderer();
    let parent = host(&renderer);
    let theme = Context::new("light");
    let items = ReactiveVec::from_vec(renderer.reactive(), vec!["a"]);
    let (source, ctx) = (items.clone(), theme.clone());
    root(renderer.reactive(), |_| {
        theme.provide(renderer.reactive(), "dark");
        let list = renderer.map(
            move || source.to_vec(),
            move |renderer: &Renderer, item: &&'static str, _: usize| {
                Children::from(format!("{}:{}", item, ctx.get(renderer.reactive())))
            },
            true,
        );
        renderer.insert(list, Some(parent), RenderOptions::default()).unwrap();
    });
    assert_eq!(renderer.tree().text_content(parent), "a:dark");
}
