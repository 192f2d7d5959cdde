//! Widget manifests
//!
//! A manifest declares widget classes in TOML so a set of widgets can be
//! defined without writing code:
//!
//! ```toml
//! [[widget]]
//! class = "XuiButton"
//! template = "templates/button.html"
//!
//! [[widget]]
//! class = "FancyButton"
//! name = "xui-fancy-button"
//! extends = "button"
//! inherits = "XuiButton"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::class::WidgetClass;
use crate::element::{element_with, ElementSettingsArgs};
use crate::error::RegistrationError;
use crate::registry::ElementRegistry;

/// Errors that can occur when loading or applying a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("error reading template file {path}: {message}")]
    TemplateRead { path: PathBuf, message: String },

    #[error("widget '{class}' sets both `template` and `markup`")]
    ConflictingTemplate { class: String },

    #[error("widget '{class}' inherits from '{parent}', which is not declared before it")]
    UnknownParent { class: String, parent: String },

    #[error("widget '{class}': {source}")]
    Registration {
        class: String,
        #[source]
        source: RegistrationError,
    },
}

/// One `[[widget]]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetEntry {
    /// Class identifier, used to derive the name when `name` is absent
    pub class: String,
    pub name: Option<String>,
    pub extends: Option<String>,
    /// Path to a markup file, relative to the manifest
    pub template: Option<PathBuf>,
    /// Inline template markup
    pub markup: Option<String>,
    /// Class identifier of a widget declared earlier in the manifest
    pub inherits: Option<String>,
}

#[derive(Deserialize)]
struct TomlManifest {
    #[serde(default)]
    widget: Vec<WidgetEntry>,
}

/// A parsed manifest
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub widgets: Vec<WidgetEntry>,
    /// Base path for resolving relative template paths
    base_path: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest from a TOML file; template paths resolve relative to it
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_str(&content)?;
        manifest.base_path = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Parse a manifest from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let parsed: TomlManifest = toml::from_str(content)?;
        Ok(Self {
            widgets: parsed.widget,
            base_path: None,
        })
    }

    /// Set the base path for template file resolution
    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    /// Resolve a relative path against the base path
    pub fn resolve_path(&self, relative: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(relative),
            None => relative.to_path_buf(),
        }
    }

    /// Build every declared class and define it with `registry`.
    ///
    /// Classes are defined in declaration order; the first failure stops
    /// the run and leaves earlier definitions in place.
    pub fn define<R>(&self, registry: &mut R) -> Result<Vec<WidgetClass>, ManifestError>
    where
        R: ElementRegistry + ?Sized,
    {
        let mut classes: Vec<WidgetClass> = Vec::with_capacity(self.widgets.len());
        let mut by_ident: HashMap<&str, usize> = HashMap::new();

        for widget in &self.widgets {
            let mut builder = WidgetClass::builder(widget.class.as_str());

            if let Some(parent) = &widget.inherits {
                let &index = by_ident
                    .get(parent.as_str())
                    .ok_or_else(|| ManifestError::UnknownParent {
                        class: widget.class.clone(),
                        parent: parent.clone(),
                    })?;
                builder = builder.inherit(&classes[index]);
            }

            if let Some(source) = self.template_source(widget)? {
                builder = builder.template(source);
            }

            let class = builder.build();
            let registration = |source: RegistrationError| ManifestError::Registration {
                class: widget.class.clone(),
                source,
            };

            let mut args = ElementSettingsArgs::new();
            args.name = widget.name.clone();
            args.options.extends = widget.extends.clone();
            element_with(args)
                .map_err(|e| registration(e.into()))?
                .apply(registry, &class)
                .map_err(registration)?;

            debug!(class = %widget.class, "manifest widget defined");
            by_ident.insert(widget.class.as_str(), classes.len());
            classes.push(class);
        }

        Ok(classes)
    }

    fn template_source(&self, widget: &WidgetEntry) -> Result<Option<String>, ManifestError> {
        match (&widget.template, &widget.markup) {
            (Some(_), Some(_)) => Err(ManifestError::ConflictingTemplate {
                class: widget.class.clone(),
            }),
            (Some(path), None) => {
                let full_path = self.resolve_path(path);
                std::fs::read_to_string(&full_path)
                    .map(Some)
                    .map_err(|e| ManifestError::TemplateRead {
                        path: full_path,
                        message: e.to_string(),
                    })
            }
            (None, markup) => Ok(markup.clone()),
        }
    }
}
