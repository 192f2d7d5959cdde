//! Integration tests for template resolution, memoization and cloning

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use xui_elements::{
    element, markup, CustomElementRegistry, Document, MarkupError, MarkupParser, Node,
    TemplateResolutionError, TemplateState, WidgetClass, WidgetInstance,
};

/// Parser that counts how often it is invoked
#[derive(Default)]
struct CountingParser {
    calls: AtomicUsize,
}

impl CountingParser {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarkupParser for CountingParser {
    fn parse(&self, source: &str) -> Result<Document, Vec<MarkupError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        markup::parse(source)
    }
}

fn define(registry: &mut CustomElementRegistry, ident: &str, template: &str, parser: &Arc<CountingParser>) -> WidgetClass {
    let class = WidgetClass::builder(ident)
        .template(template)
        .parser(Arc::clone(parser) as Arc<dyn MarkupParser>)
        .build();
    element(registry, &class).expect("Should register");
    class
}

fn mount(registry: &CustomElementRegistry, name: &str) -> Result<WidgetInstance, Arc<TemplateResolutionError>> {
    let mut instance = registry.create_element(name).expect("Should create");
    instance.connected_callback()?;
    Ok(instance)
}

#[test]
fn test_resolution_parses_once_per_class() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let class = define(
        &mut registry,
        "XuiButton",
        "<template><button><slot></slot></button></template>",
        &parser,
    );

    assert!(class.template_cache().unwrap().state().is_unresolved());
    let a = mount(&registry, "xui-button").unwrap();
    let b = mount(&registry, "xui-button").unwrap();
    let c = mount(&registry, "xui-button").unwrap();

    assert_eq!(parser.calls(), 1);
    assert!(matches!(class.template_cache().unwrap().state(), TemplateState::Fragment(_)));
    for instance in [&a, &b, &c] {
        assert_eq!(
            instance.shadow_root().unwrap().to_string(),
            "<button><slot></slot></button>"
        );
    }
}

#[test]
fn test_resolution_error_is_memoized_by_identity() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let class = define(&mut registry, "XuiEmpty", "<div>no template blocks</div>", &parser);

    let first = mount(&registry, "xui-empty").unwrap_err();
    let second = mount(&registry, "xui-empty").unwrap_err();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(parser.calls(), 1);
    assert!(matches!(*first, TemplateResolutionError::NotFound { .. }));
    match class.template_cache().unwrap().state() {
        TemplateState::Error(cached) => assert!(Arc::ptr_eq(&cached, &first)),
        other => panic!("Expected cached error, got {:?}", other),
    }
}

#[test]
fn test_failed_instance_gets_no_shadow_root() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    define(&mut registry, "XuiBroken", "<template><div></template>", &parser);

    let mut instance = registry.create_element("xui-broken").unwrap();
    let err = instance.connected_callback().unwrap_err();
    assert!(matches!(*err, TemplateResolutionError::Markup { .. }));
    assert!(instance.shadow_root().is_none());
}

#[test]
fn test_anonymous_single_block_ignores_element_name() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    define(&mut registry, "XuiBadge", "<template><span>new</span></template>", &parser);
    let badge = mount(&registry, "xui-badge").unwrap();
    assert_eq!(badge.shadow_root().unwrap().to_string(), "<span>new</span>");
}

#[test]
fn test_single_block_with_other_id_fails() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    define(
        &mut registry,
        "XuiBadge",
        r#"<template id="xui-label"><span></span></template>"#,
        &parser,
    );
    let err = mount(&registry, "xui-badge").unwrap_err();
    match &*err {
        TemplateResolutionError::NotFound { element_name, found } => {
            assert_eq!(element_name, "xui-badge");
            assert_eq!(found, &vec![Some("xui-label".to_string())]);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_shared_source_selects_by_id() {
    let source = r#"
        <template id="xui-header"><h1><slot></slot></h1></template>
        <template id="xui-footer"><footer><slot></slot></footer></template>
    "#;
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    define(&mut registry, "XuiHeader", source, &parser);
    define(&mut registry, "XuiFooter", source, &parser);

    let header = mount(&registry, "xui-header").unwrap();
    let footer = mount(&registry, "xui-footer").unwrap();
    assert_eq!(header.shadow_root().unwrap().to_string(), "<h1><slot></slot></h1>");
    assert_eq!(
        footer.shadow_root().unwrap().to_string(),
        "<footer><slot></slot></footer>"
    );
    // One parse per class
    assert_eq!(parser.calls(), 2);
}

#[test]
fn test_instances_receive_independent_clones() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let class = define(
        &mut registry,
        "XuiCard",
        r#"<template><div class="card"><p id="body">text</p></div></template>"#,
        &parser,
    );

    let mut first = mount(&registry, "xui-card").unwrap();
    let second = mount(&registry, "xui-card").unwrap();
    assert_eq!(first.shadow_root(), second.shadow_root());
    let body = first.shadow_root().unwrap().get_element_by_id("body").unwrap();
    assert_eq!(body.tag, "p");

    let card = first.shadow_root_mut().unwrap().children_mut()[0]
        .as_element_mut()
        .unwrap();
    card.set_attribute("class", "card selected");
    card.children.push(Node::Text("extra".to_string()));

    assert_ne!(first.shadow_root(), second.shadow_root());
    insta::assert_snapshot!(
        second.shadow_root().unwrap().to_string(),
        @r#"<div class="card"><p id="body">text</p></div>"#
    );
    match class.template_cache().unwrap().state() {
        TemplateState::Fragment(fragment) => assert_eq!(
            fragment.to_string(),
            r#"<div class="card"><p id="body">text</p></div>"#
        ),
        other => panic!("Expected fragment, got {:?}", other),
    }
}

#[test]
fn test_subclass_reads_parent_resolution() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let base = define(&mut registry, "XuiBase", "<template><em></em></template>", &parser);
    let child = WidgetClass::builder("XuiDerived").inherit(&base).build();
    element(&mut registry, &child).unwrap();

    let a = mount(&registry, "xui-base").unwrap();
    let b = mount(&registry, "xui-derived").unwrap();
    assert_eq!(a.shadow_root(), b.shadow_root());
    assert_eq!(parser.calls(), 1);
}

#[test]
fn test_subclass_connected_first_keeps_parent_slot_intact() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let base = define(
        &mut registry,
        "XuiBase",
        r#"<template id="xui-base"><em></em></template>"#,
        &parser,
    );
    let derived = WidgetClass::builder("XuiDerived").inherit(&base).build();
    element(&mut registry, &derived).unwrap();

    let err = mount(&registry, "xui-derived").unwrap_err();
    match &*err {
        TemplateResolutionError::NotFound { element_name, .. } => assert_eq!(element_name, "xui-derived"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(base.template_cache().unwrap().state().is_unresolved());

    let parent = mount(&registry, "xui-base").expect("Parent should still resolve");
    assert_eq!(parent.shadow_root().unwrap().to_string(), "<em></em>");
    assert!(matches!(derived.template_cache().unwrap().state(), TemplateState::Error(_)));
    assert_eq!(parser.calls(), 2);
}

#[test]
fn test_template_with_literal_less_than() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    define(
        &mut registry,
        "XuiMath",
        "<template><p>1 < 2<ul><li>a<li>b</ul><a href=/home>home</a></template>",
        &parser,
    );
    let math = mount(&registry, "xui-math").unwrap();
    assert_eq!(
        math.shadow_root().unwrap().to_string(),
        r#"<p>1 &lt; 2</p><ul><li>a</li><li>b</li></ul><a href="/home">home</a>"#
    );
}

#[test]
fn test_concurrent_first_resolution_parses_once() {
    let parser = Arc::new(CountingParser::default());
    let mut registry = CustomElementRegistry::new();
    let class = define(&mut registry, "XuiRace", "<template><b></b></template>", &parser);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let class = class.clone();
            scope.spawn(move || {
                let cache = class.template_cache().unwrap();
                cache.resolve("xui-race").unwrap();
            });
        }
    });

    assert_eq!(parser.calls(), 1);
}
