//! xui-elements - class registration and template stamping for UI widgets
//!
//! A widget is described by a [`WidgetClass`]. The registrar ([`element`],
//! [`element_with`]) gives the class a registration name and defines it with
//! the host registry exactly once. When an instance of the class is first
//! inserted into a document its class's template is parsed (once per class),
//! and a clone of the resulting fragment is placed in a fresh shadow root.
//!
//! # Example
//!
//! ```rust
//! use xui_elements::{element, CustomElementRegistry, WidgetClass};
//!
//! let mut registry = CustomElementRegistry::new();
//! let button = WidgetClass::builder("XuiButton")
//!     .template(r#"<template><button><slot></slot></button></template>"#)
//!     .build();
//! element(&mut registry, &button).unwrap();
//!
//! let mut instance = registry.create_element("xui-button").unwrap();
//! instance.connected_callback().unwrap();
//! assert_eq!(
//!     instance.shadow_root().unwrap().to_string(),
//!     "<button><slot></slot></button>"
//! );
//! ```

pub mod class;
pub mod dom;
pub mod element;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod markup;
pub mod naming;
pub mod registry;
pub mod template;

pub use class::{ClassId, Lifecycle, WidgetClass, WidgetClassBuilder};
pub use dom::{Document, Element, Fragment, Node, ShadowRoot};
pub use element::{element, element_with, ElementDecorator, ElementSettings, ElementSettingsArgs};
pub use error::{
    CreateError, DefineError, MarkupError, NamingError, RegistrationError, TemplateResolutionError,
};
pub use instance::WidgetInstance;
pub use manifest::{Manifest, ManifestError, WidgetEntry};
pub use markup::{HtmlParser, MarkupParser};
pub use registry::{CustomElementRegistry, Definition, DefinitionOptions, ElementRegistry};
pub use template::{TemplateCache, TemplateState};
