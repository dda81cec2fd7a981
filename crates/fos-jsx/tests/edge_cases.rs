//! Edge case tests for fos-jsx

use fos_dom::Namespace;
use fos_jsx::{build, compile, AssignKind, CompileError, Config, Node, Partial, ReactiveLib};
use fos_reactive::Runtime;
use fos_render::Renderer;

fn partial_of(source: &str) -> Partial {
    match build(source, &Config::default()).unwrap() {
        Node::Partial(partial) => partial,
        other => panic!("expected a partial, got {:?}", other),
    }
}

fn compiled(source: &str) -> String {
    compile(source, &Config::default()).unwrap().code
}

// ============================================================================
// NAMESPACES AND CUSTOM ELEMENTS
// ============================================================================

#[test]
fn test_svg_gets_xmlns() {
    let partial = partial_of("<svg><circle r={r}/></svg>");
    assert_eq!(
        partial.content,
        r#"<svg xmlns="http://www.w3.org/2000/svg"><circle></circle></svg>"#
    );
    assert_eq!(partial.xmlns.as_deref(), Some(Namespace::SVG_URI));
    assert!(!partial.is_mergeable());
    assert_eq!(
        partial.meta().to_json(),
        r#"{"1":0,"m":2,"x":"http://www.w3.org/2000/svg"}"#
    );
}

#[test]
fn test_explicit_xmlns_not_duplicated() {
    let partial = partial_of(r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#);
    assert_eq!(partial.content.matches("xmlns=").count(), 1);
}

#[test]
fn test_svg_partial_through_runtime() {
    let partial = partial_of("<svg><circle r={r}/></svg>");
    let renderer = Renderer::new(Runtime::shared());
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());
    let nodes = factory.call(Vec::new()).unwrap().nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(renderer.tree().tag_name(nodes[0]), Some("svg"));
}

#[test]
fn test_svg_compiles_with_validation() {
    let output = compile(r#"const a = <svg><circle r="1"/></svg>;"#, &Config::default()).unwrap();
    assert_eq!(output.partials, 1);
    assert_eq!(output.validations, 1);
    assert!(output.code.ends_with("const a = _partial0();"));
}

#[test]
fn test_nested_svg_compiles_with_validation() {
    let output = compile(
        r#"const a = <div><svg><path d="M0"/></svg></div>;"#,
        &Config::default(),
    )
    .unwrap();
    assert_eq!(output.validations, 1);
    assert!(output.code.contains("<path d="));
}

#[test]
fn test_math_compiles_with_validation() {
    let output = compile("const a = <math><mi>x</mi></math>;", &Config::default()).unwrap();
    assert_eq!(output.validations, 1);
    assert!(output.code.contains("http://www.w3.org/1998/Math/MathML"));
}

#[test]
fn test_foreign_object_compiles_with_validation() {
    let output = compile(
        "const a = <svg><foreignObject><div>hi</div></foreignObject></svg>;",
        &Config::default(),
    )
    .unwrap();
    assert_eq!(output.validations, 1);
    assert!(output.code.contains("<div>hi</div>"));
}

#[test]
fn test_svg_static_round_trip() {
    let partial = partial_of(r#"<svg viewBox="0 0 2 2"><circle r="1"/></svg>"#);
    let renderer = Renderer::new(Runtime::shared());
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());
    let nodes = factory.call(Vec::new()).unwrap().nodes();
    assert_eq!(renderer.tree().get_attribute(nodes[0], "xmlns"), Some(Namespace::SVG_URI));
    assert_eq!(renderer.outer_html(nodes[0]), partial.content);
}

#[test]
fn test_custom_element_sets_import_flag() {
    let partial = partial_of(r#"<my-card title="x"></my-card>"#);
    assert!(partial.custom);
    assert!(!partial.is_mergeable());
    assert_eq!(partial.meta().to_json(), r#"{"i":1}"#);

    let partial = partial_of(r#"<button is="fancy-button">go</button>"#);
    assert!(partial.custom);
}

#[test]
fn test_custom_child_propagates_import() {
    let partial = partial_of("<div><my-card></my-card></div>");
    assert!(partial.custom);
    assert_eq!(partial.content, "<div><my-card></my-card></div>");
}

#[test]
fn test_custom_siblings_do_not_merge() {
    let code = compiled("const x = <><my-card/><b/></>;");
    assert!(code.contains("const x = [_partial0(), _partial1()];"));
}

#[test]
fn test_xmlns_declaration_is_runtime() {
    let partial = partial_of(r#"<div xmlns:foo="/"></div>"#);
    assert_eq!(partial.content, "<div></div>");
    let assignment = &partial.nodes[0].assignments[0];
    assert_eq!(assignment.kind, AssignKind::Xmlns);
    assert_eq!(assignment.runtime_function(), "setAttribute");
    assert_eq!(assignment.arguments(), r#""xmlns:foo", "/""#);
}

#[test]
fn test_plugin_namespace() {
    let config = Config {
        plugin_namespaces: vec!["route".into()],
        ..Config::default()
    };
    let Node::Partial(partial) = build(r#"<a route:href="/home">home</a>"#, &config).unwrap() else {
        panic!("expected a partial");
    };
    assert_eq!(partial.content, "<a>home</a>");
    let assignment = &partial.nodes[0].assignments[0];
    assert_eq!(assignment.runtime_function(), "assignProp");
    assert_eq!(assignment.arguments(), r#""route:href", "/home""#);

    let inline = partial_of(r#"<a route:href="/home">home</a>"#);
    assert_eq!(inline.content, r#"<a route:href="/home">home</a>"#);
}

// ============================================================================
// FRAGMENTS, COMPONENTS AND THE GENERIC PATH
// ============================================================================

#[test]
fn test_fragment_merges_into_one_partial() {
    let code = compiled("const x = <>a<b/>c</>;");
    assert!(code.contains(r#"_createPartial("a<b></b>c")"#));
    assert!(code.ends_with("const x = _partial0();"));
}

#[test]
fn test_empty_fragment() {
    let output = compile("const x = <></>;", &Config::default()).unwrap();
    assert_eq!(output.code, "const x = [];");
    assert_eq!(output.partials, 0);
}

#[test]
fn test_text_only_fragment() {
    assert_eq!(compiled("const x = <>hi</>;"), r#"const x = "hi";"#);
}

#[test]
fn test_component_props() {
    let code = compiled(r#"const x = <Foo a="1" {...rest} on:click={h} flag>hi</Foo>;"#);
    assert!(code.contains(
        r#"const x = _createComponent(Foo)({ a: "1", ...rest, "on:click": h, flag: true, children: "hi" });"#
    ));
    assert!(code.contains("createComponent as _createComponent"));
}

#[test]
fn test_component_children_array() {
    let code = compiled("const x = <List>{a}<b/></List>;");
    assert!(code.contains("_createComponent(List)({ children: [a, _partial0()] })"));
}

#[test]
fn test_member_component() {
    let code = compiled("const x = <UI.Button/>;");
    assert!(code.contains("_createComponent(UI.Button)({})"));
}

#[test]
fn test_component_inside_element() {
    let code = compiled("const x = <div><Foo/></div>;");
    assert!(code.contains("_createChildren(node, _createComponent(Foo)({}))"));
}

#[test]
fn test_element_as_attribute_value() {
    let code = compiled("const x = <Card icon=<i/> />;");
    assert!(code.contains("_createComponent(Card)({ icon: _partial0() })"));
}

#[test]
fn test_unknown_lowercase_tag_uses_jsx() {
    let code = compiled("const x = <foo bar={1}/>;");
    assert!(code.contains(r#"_jsx("foo", { bar: 1 })"#));
}

#[test]
fn test_invalid_custom_name_unresolved() {
    let err = compile("const x = <foo-Bar/>;", &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedName { ref name, .. } if name == "foo-Bar"));
}

// ============================================================================
// CHILDREN
// ============================================================================

#[test]
fn test_jsx_whitespace_and_entities() {
    let partial = partial_of("<p>\n  a &lt; b\n  c\n</p>");
    assert_eq!(partial.content, "<p>a &lt; b c</p>");
}

#[test]
fn test_skipped_children() {
    let partial = partial_of(r#"<p>{/* note */}{true}{null}{undefined}{"x"}{0}</p>"#);
    assert_eq!(partial.content, "<p>x0</p>");
    assert!(partial.nodes.is_empty());
}

#[test]
fn test_mixed_children_order() {
    let partial = partial_of("<div>{a}<b/>text</div>");
    assert_eq!(partial.content, "<div></div>");
    let children = &partial.nodes[0].assignments[0];
    assert_eq!(children.kind, AssignKind::Children);
    assert!(children.value.starts_with("[a, "));
}

#[test]
fn test_style_text_is_raw() {
    let partial = partial_of(r#"<style>{"a > b { color: red }"}</style>"#);
    assert_eq!(partial.content, "<style>a > b { color: red }</style>");

    let renderer = Renderer::new(Runtime::shared());
    let factory = renderer.create_partial(partial.content.clone(), partial.meta());
    let nodes = factory.call(Vec::new()).unwrap().nodes();
    assert_eq!(renderer.tree().text_content(nodes[0]), "a > b { color: red }");
}

#[test]
fn test_script_text_is_raw() {
    let output = compile(r#"const s = <script>{"if (a < b && c) go()"}</script>;"#, &Config::default())
        .unwrap();
    assert!(output.code.contains("if (a < b && c) go()"));
    assert_eq!(output.validations, 1);
}

#[test]
fn test_closing_tag_in_raw_text_rejected() {
    let err = build(r#"<script>{"x = '</SCRIPT>'"}</script>"#, &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::MalformedHtml { .. }));
    assert!(err.to_string().contains("</script"));
}

#[test]
fn test_title_text_still_escaped() {
    let partial = partial_of(r#"<title>{"a < b"}</title>"#);
    assert_eq!(partial.content, "<title>a &lt; b</title>");
}

#[test]
fn test_spread_child_rejected() {
    let err = build("<div>{...items}</div>", &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::SpreadChild { .. }));
}

#[test]
fn test_void_element_with_children_rejected() {
    let err = build("<br>text</br>", &Config::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidNesting { ref parent, .. } if parent == "br"
    ));
}

#[test]
fn test_block_inside_paragraph_rejected() {
    let err = build("<p><div/></p>", &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidNesting { .. }));
}

// ============================================================================
// VALIDATION AND CONFIGURATION
// ============================================================================

#[test]
fn test_implicit_tbody_is_malformed() {
    let err = compile("const t = <table><tr><td/></tr></table>;", &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::MalformedHtml { .. }));
    assert!(err.to_string().contains("tbody"));
}

#[test]
fn test_validation_can_be_disabled() {
    let config = Config {
        validate_html: false,
        ..Config::default()
    };
    let output = compile("const t = <table><tr><td/></tr></table>;", &config).unwrap();
    assert_eq!(output.validations, 0);
    assert_eq!(output.partials, 1);
}

#[test]
fn test_without_hoisting() {
    let config = Config {
        hoist: false,
        ..Config::default()
    };
    let output = compile("const a = <b>x</b>; const b = <b>x</b>;", &config).unwrap();
    assert_eq!(output.partials, 0);
    assert_eq!(output.validations, 2);
    assert_eq!(output.code.matches(r#"_createPartial("<b>x</b>")()"#).count(), 2);
    assert!(!output.code.contains("const _partial"));
}

#[test]
fn test_lib_selects_import_path() {
    let config = Config {
        lib: ReactiveLib::Flimsy,
        ..Config::default()
    };
    let code = compile("const a = <b/>;", &config).unwrap().code;
    assert!(code.starts_with("// fos-jsx (flimsy)\n"));
    assert!(code.contains(r#"from "fos-render/flimsy";"#));
}

#[test]
fn test_surrounding_code_preserved() {
    let source = "// <b>not jsx</b>\nconst s = \"<i>\";\nexport function App() {\n  return <p>{s}</p>;\n}\n";
    let code = compiled(source);
    assert!(code.contains("// <b>not jsx</b>\nconst s = \"<i>\";"));
    assert!(code.contains("return _partial0([node => { _createChildren(node, s) }]);"));
}

#[test]
fn test_syntax_error_position() {
    let source = "const a = <div>\n  <span>\n</div>;";
    let err = compile(source, &Config::default()).unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(err.line_column(source).0, 3);
}
