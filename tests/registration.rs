//! Integration tests for the registrar against the in-memory host registry

use pretty_assertions::assert_eq;
use xui_elements::{
    element, element_with, CustomElementRegistry, DefineError, DefinitionOptions, ElementDecorator,
    ElementRegistry, ElementSettings, ElementSettingsArgs, NamingError, RegistrationError,
    WidgetClass,
};

#[test]
fn test_bare_marker_registers_derived_name() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::new("XuiButton");
    element(&mut registry, &class).expect("Should register");

    assert_eq!(registry.get("xui-button"), Some(&class));
    assert_eq!(class.settings(), Some(&ElementSettings::named("xui-button")));
}

#[test]
fn test_single_word_class_is_never_registered() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::new("Button");
    let err = element(&mut registry, &class).unwrap_err();

    assert_eq!(
        err.to_string(),
        "defined element for class 'Button' lacks a dash in the auto-generated tag name 'button'"
    );
    assert!(registry.is_empty());
    assert!(class.settings().is_none());
}

#[test]
fn test_single_word_class_with_explicit_name() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::new("Button");
    element_with(ElementSettingsArgs::named("xui-button2"))
        .unwrap()
        .apply(&mut registry, &class)
        .unwrap();
    assert_eq!(registry.get_name(&class), Some("xui-button2"));
}

#[test]
fn test_explicit_name_without_dash_fails_before_host_call() {
    let registry = CustomElementRegistry::new();
    let err = element_with(ElementSettingsArgs::named("button")).unwrap_err();
    assert!(matches!(err, NamingError::ExplicitNameLacksDash { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_registration_is_rejected_by_host() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::new("XuiButton");
    element(&mut registry, &class).unwrap();

    let again = element(&mut registry, &class);
    assert_eq!(
        again,
        Err(RegistrationError::Define(DefineError::NameTaken {
            name: "xui-button".to_string()
        }))
    );

    let other_name = element_with(ElementSettingsArgs::named("xui-button-alias"))
        .unwrap()
        .apply(&mut registry, &class);
    assert!(matches!(
        other_name,
        Err(RegistrationError::Define(DefineError::ClassAlreadyDefined { .. }))
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_two_classes_same_derived_name() {
    let mut registry = CustomElementRegistry::new();
    element(&mut registry, &WidgetClass::new("XuiButton")).unwrap();
    let err = element(&mut registry, &WidgetClass::new("XuiButton")).unwrap_err();
    assert!(matches!(err, RegistrationError::Define(DefineError::NameTaken { .. })));
}

#[test]
fn test_extends_is_passed_to_host() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::builder("FancyButton")
        .template("<template><b><slot></slot></b></template>")
        .build();
    element_with(ElementSettingsArgs::named("xui-fancy-button").extends("button"))
        .unwrap()
        .apply(&mut registry, &class)
        .unwrap();

    let def = registry.definition("xui-fancy-button").unwrap();
    assert_eq!(
        def.options,
        DefinitionOptions {
            extends: Some("button".to_string())
        }
    );

    let mut instance = registry.create_customized("button", "xui-fancy-button").unwrap();
    instance.connected_callback().unwrap();
    assert_eq!(instance.local_name(), "button");
    assert_eq!(instance.shadow_root().unwrap().to_string(), "<b><slot></slot></b>");
}

#[test]
fn test_explicit_name_rejected_by_host_rules() {
    let mut registry = CustomElementRegistry::new();
    let err = element_with(ElementSettingsArgs::named("Xui-Button"))
        .unwrap()
        .apply(&mut registry, &WidgetClass::new("Anything"))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Define(DefineError::InvalidName { .. })));
}

#[test]
fn test_no_argument_marker() {
    let mut registry = CustomElementRegistry::new();
    let class = WidgetClass::new("XuiToggle");
    let settings = ElementDecorator::new().apply(&mut registry, &class).unwrap();
    assert_eq!(settings, ElementSettings::named("xui-toggle"));
}

#[test]
fn test_registrar_accepts_trait_objects() {
    let mut registry = CustomElementRegistry::new();
    let host: &mut dyn ElementRegistry = &mut registry;
    let class = WidgetClass::new("XuiDyn");
    element(host, &class).unwrap();
    assert!(registry.is_defined("xui-dyn"));
}
