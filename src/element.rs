//! The registrar: names a widget class and defines it with the host registry
//!
//! Two forms mirror how a class marker is used:
//!
//! ```rust
//! use xui_elements::{element, element_with, CustomElementRegistry, ElementSettingsArgs, WidgetClass};
//!
//! let mut registry = CustomElementRegistry::new();
//!
//! // Bare form: the name is derived from the class identifier
//! let button = WidgetClass::new("XuiButton");
//! element(&mut registry, &button).unwrap();
//! assert_eq!(button.tag_name(), Some("xui-button"));
//!
//! // Configured form: explicit name and definition options
//! let fancy = WidgetClass::new("Button2");
//! element_with(ElementSettingsArgs::named("xui-button2").extends("button"))
//!     .unwrap()
//!     .apply(&mut registry, &fancy)
//!     .unwrap();
//! assert_eq!(fancy.tag_name(), Some("xui-button2"));
//! ```

use tracing::debug;

use crate::class::WidgetClass;
use crate::error::{NamingError, RegistrationError};
use crate::naming;
use crate::registry::{DefinitionOptions, ElementRegistry};

/// Registration metadata recorded on a class once it has been defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSettings {
    /// Registration name
    pub name: String,
    /// Options passed through to the host registry
    pub options: DefinitionOptions,
}

impl ElementSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: DefinitionOptions::default(),
        }
    }
}

/// Author-supplied configuration for the configured form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSettingsArgs {
    /// Explicit registration name; derived from the class when absent
    pub name: Option<String>,
    pub options: DefinitionOptions,
}

impl ElementSettingsArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the widget as extending a native element kind
    pub fn extends(mut self, local_name: impl Into<String>) -> Self {
        self.options.extends = Some(local_name.into());
        self
    }
}

/// A configured class marker, ready to be applied to a class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDecorator {
    args: ElementSettingsArgs,
}

impl ElementDecorator {
    /// A marker with no settings; applying it behaves like [`element`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name `class` and define it with `registry`.
    ///
    /// The host registry is always consulted, so applying a marker to a
    /// class that is already defined surfaces the host's rejection.
    pub fn apply<R>(&self, registry: &mut R, class: &WidgetClass) -> Result<ElementSettings, RegistrationError>
    where
        R: ElementRegistry + ?Sized,
    {
        let name = match &self.args.name {
            Some(name) => name.clone(),
            None => naming::tag_name(class.ident())?,
        };
        let settings = ElementSettings {
            name,
            options: self.args.options.clone(),
        };

        registry.define(&settings.name, class, &settings.options)?;
        debug!(class = %class, name = %settings.name, extends = ?settings.options.extends, "defined element");

        class
            .record_settings(settings.clone())
            .map_err(|existing| RegistrationError::AlreadyRegistered {
                class: class.ident().to_string(),
                existing: existing.name,
            })?;
        Ok(settings)
    }
}

/// Bare form: derive the name from the class identifier and define it
pub fn element<R>(registry: &mut R, class: &WidgetClass) -> Result<ElementSettings, RegistrationError>
where
    R: ElementRegistry + ?Sized,
{
    ElementDecorator::new().apply(registry, class)
}

/// Configured form: validate an explicit name now and return the marker
pub fn element_with(args: ElementSettingsArgs) -> Result<ElementDecorator, NamingError> {
    if let Some(name) = &args.name {
        naming::validate_explicit_name(name)?;
    }
    Ok(ElementDecorator { args })
}
