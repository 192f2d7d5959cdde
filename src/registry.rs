//! Host component registry
//!
//! [`ElementRegistry`] is the seam the registrar talks to.
//! [`CustomElementRegistry`] is an in-memory host: it enforces name validity
//! and uniqueness, and creates instances of defined elements.

use std::collections::HashMap;

use tracing::trace;

use crate::class::{ClassId, WidgetClass};
use crate::error::{CreateError, DefineError};
use crate::instance::WidgetInstance;

/// Host-specific options passed along with a definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionOptions {
    /// Native element kind this widget customizes, e.g. `button`
    pub extends: Option<String>,
}

/// The host's global table of element definitions
pub trait ElementRegistry {
    /// Define `class` under `name`. Hosts reject duplicate names.
    fn define(
        &mut self,
        name: &str,
        class: &WidgetClass,
        options: &DefinitionOptions,
    ) -> Result<(), DefineError>;

    /// Look up the class defined under `name`
    fn get(&self, name: &str) -> Option<&WidgetClass>;

    /// Look up the name `class` was defined under
    fn get_name(&self, class: &WidgetClass) -> Option<&str>;
}

/// A stored definition
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub class: WidgetClass,
    pub options: DefinitionOptions,
}

/// Names reserved by other markup vocabularies
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// In-memory host registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: Vec<Definition>,
    by_name: HashMap<String, usize>,
    by_class: HashMap<ClassId, usize>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Defined names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Create an autonomous element, e.g. `<xui-button>`
    pub fn create_element(&self, name: &str) -> Result<WidgetInstance, CreateError> {
        let def = self.definition(name).ok_or_else(|| CreateError::Undefined {
            name: name.to_string(),
        })?;
        if let Some(extends) = &def.options.extends {
            return Err(CreateError::CustomizedBuiltIn {
                name: name.to_string(),
                extends: extends.clone(),
            });
        }
        trace!(name, "creating element");
        Ok(WidgetInstance::new(def.class.clone(), name, name, None))
    }

    /// Create a customized built-in, e.g. `<button is="xui-fancy">`
    pub fn create_customized(&self, local_name: &str, is: &str) -> Result<WidgetInstance, CreateError> {
        let def = self.definition(is).ok_or_else(|| CreateError::Undefined {
            name: is.to_string(),
        })?;
        match &def.options.extends {
            Some(extends) if extends == local_name => {
                trace!(local_name, is, "creating customized built-in");
                Ok(WidgetInstance::new(def.class.clone(), is, local_name, Some(is)))
            }
            Some(extends) => Err(CreateError::WrongLocalName {
                name: is.to_string(),
                expected: extends.clone(),
                local_name: local_name.to_string(),
            }),
            None => Err(CreateError::WrongLocalName {
                name: is.to_string(),
                expected: is.to_string(),
                local_name: local_name.to_string(),
            }),
        }
    }
}

impl ElementRegistry for CustomElementRegistry {
    fn define(
        &mut self,
        name: &str,
        class: &WidgetClass,
        options: &DefinitionOptions,
    ) -> Result<(), DefineError> {
        check_custom_element_name(name)?;

        if self.by_name.contains_key(name) {
            return Err(DefineError::NameTaken {
                name: name.to_string(),
            });
        }

        if let Some(&i) = self.by_class.get(&class.id()) {
            return Err(DefineError::ClassAlreadyDefined {
                class: class.ident().to_string(),
                existing: self.definitions[i].name.clone(),
            });
        }

        if let Some(extends) = &options.extends {
            if check_custom_element_name(extends).is_ok() {
                return Err(DefineError::ExtendsCustomElement {
                    name: name.to_string(),
                    extends: extends.clone(),
                });
            }
        }

        let index = self.definitions.len();
        self.definitions.push(Definition {
            name: name.to_string(),
            class: class.clone(),
            options: options.clone(),
        });
        self.by_name.insert(name.to_string(), index);
        self.by_class.insert(class.id(), index);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&WidgetClass> {
        self.definition(name).map(|d| &d.class)
    }

    fn get_name(&self, class: &WidgetClass) -> Option<&str> {
        self.by_class
            .get(&class.id())
            .map(|&i| self.definitions[i].name.as_str())
    }
}

/// Check the host's rules for custom element names
pub fn check_custom_element_name(name: &str) -> Result<(), DefineError> {
    let invalid = |reason: &str| DefineError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(invalid("must start with a lowercase ASCII letter"));
    }
    if !name.contains('-') {
        return Err(invalid("must contain a hyphen"));
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("must not contain uppercase ASCII letters"));
    }
    if let Some(c) = name.chars().find(|&c| {
        c.is_ascii() && !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'))
    }) {
        return Err(invalid(&format!("must not contain '{}'", c)));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(invalid("the name is reserved"));
    }
    Ok(())
}
