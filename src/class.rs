//! Widget classes and their lifecycle hooks

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::element::ElementSettings;
use crate::instance::WidgetInstance;
use crate::markup::{HtmlParser, MarkupParser};
use crate::template::TemplateCache;

/// Hooks a widget class may override.
///
/// The host calls these from the matching lifecycle notifications on
/// [`WidgetInstance`]. Every hook defaults to a no-op.
pub trait Lifecycle: Send + Sync {
    /// Runs after the template has been attached on insertion
    fn connected(&self, _element: &mut WidgetInstance) {}

    fn disconnected(&self, _element: &mut WidgetInstance) {}

    /// Runs for attributes listed by [`Lifecycle::observed_attributes`]
    fn attribute_changed(
        &self,
        _element: &mut WidgetInstance,
        _name: &str,
        _old_value: Option<&str>,
        _new_value: Option<&str>,
    ) {
    }

    fn adopted(&self, _element: &mut WidgetInstance) {}

    fn observed_attributes(&self) -> &[&str] {
        &[]
    }
}

struct NoBehavior;

impl Lifecycle for NoBehavior {}

/// Process-unique identity of a widget class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A widget class: an identifier, an optional template and behavior.
///
/// `WidgetClass` is a cheap handle; clones refer to the same class and
/// compare equal. Registration metadata lives in a private write-once slot
/// that only the registrar fills in.
#[derive(Clone)]
pub struct WidgetClass {
    inner: Arc<ClassInner>,
}

struct ClassInner {
    id: ClassId,
    ident: String,
    parent: Option<WidgetClass>,
    template: Option<Arc<TemplateCache>>,
    behavior: Arc<dyn Lifecycle>,
    settings: OnceLock<ElementSettings>,
}

impl WidgetClass {
    /// Create a class with no template and no behavior
    pub fn new(ident: impl Into<String>) -> Self {
        Self::builder(ident).build()
    }

    pub fn builder(ident: impl Into<String>) -> WidgetClassBuilder {
        WidgetClassBuilder::new(ident)
    }

    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    /// The class identifier names are derived from
    pub fn ident(&self) -> &str {
        &self.inner.ident
    }

    pub fn parent(&self) -> Option<&WidgetClass> {
        self.inner.parent.as_ref()
    }

    /// Check whether `ancestor` is this class or one of its parents
    pub fn inherits_from(&self, ancestor: &WidgetClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// The template slot; inherited from the parent when not overridden
    pub fn template_cache(&self) -> Option<&TemplateCache> {
        self.inner.template.as_deref()
    }

    pub(crate) fn template_cache_arc(&self) -> Option<&Arc<TemplateCache>> {
        self.inner.template.as_ref()
    }

    pub fn behavior(&self) -> Arc<dyn Lifecycle> {
        Arc::clone(&self.inner.behavior)
    }

    /// Registration metadata, present once the class has been defined
    pub fn settings(&self) -> Option<&ElementSettings> {
        self.inner.settings.get()
    }

    /// Registration name, present once the class has been defined
    pub fn tag_name(&self) -> Option<&str> {
        self.settings().map(|s| s.name.as_str())
    }

    /// Fill the metadata slot; returns the settings already stored if any
    pub(crate) fn record_settings(&self, settings: ElementSettings) -> Result<(), ElementSettings> {
        self.inner.settings.set(settings)
    }
}

impl PartialEq for WidgetClass {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for WidgetClass {}

impl Hash for WidgetClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetClass")
            .field("id", &self.inner.id)
            .field("ident", &self.inner.ident)
            .field("parent", &self.inner.parent.as_ref().map(|p| p.ident()))
            .field("settings", &self.inner.settings.get())
            .field("has_template", &self.inner.template.is_some())
            .finish()
    }
}

impl fmt::Display for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.ident)
    }
}

/// Builder for [`WidgetClass`]
pub struct WidgetClassBuilder {
    ident: String,
    template: Option<String>,
    parser: Option<Arc<dyn MarkupParser>>,
    behavior: Option<Arc<dyn Lifecycle>>,
    parent: Option<WidgetClass>,
}

impl WidgetClassBuilder {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            template: None,
            parser: None,
            behavior: None,
            parent: None,
        }
    }

    /// Set the markup the class's template block is read from
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(source.into());
        self
    }

    /// Replace the markup parser used for this class's template
    pub fn parser(mut self, parser: Arc<dyn MarkupParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn behavior(mut self, behavior: impl Lifecycle + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    /// Derive from `parent`.
    ///
    /// Without its own template the subclass reuses the parent's source. It
    /// sees whatever the parent has already resolved, but resolves into its
    /// own slot when the parent has not.
    pub fn inherit(mut self, parent: &WidgetClass) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn build(self) -> WidgetClass {
        let template = match self.template {
            Some(source) => {
                let parser = self
                    .parser
                    .unwrap_or_else(|| Arc::new(HtmlParser) as Arc<dyn MarkupParser>);
                Some(Arc::new(TemplateCache::new(source, parser)))
            }
            None => self
                .parent
                .as_ref()
                .and_then(|p| p.template_cache_arc())
                .map(|slot| Arc::new(TemplateCache::inherit(slot))),
        };

        let behavior = self
            .behavior
            .or_else(|| self.parent.as_ref().map(|p| p.behavior()))
            .unwrap_or_else(|| Arc::new(NoBehavior));

        WidgetClass {
            inner: Arc::new(ClassInner {
                id: ClassId::next(),
                ident: self.ident,
                parent: self.parent,
                template,
                behavior,
                settings: OnceLock::new(),
            }),
        }
    }
}
