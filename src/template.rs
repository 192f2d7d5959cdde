//! Per-class template cache
//!
//! A class's template source is parsed the first time one of its instances
//! is connected. The outcome, a fragment or an error, is stored once and
//! shared by every later instance; a failed resolution is never retried.
//!
//! A subclass that reuses its parent's source gets its own slot. It reads
//! the parent's outcome once the parent has resolved, and otherwise
//! resolves into its own slot under its own element name.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace, warn};

use crate::dom::{Document, Element, Fragment};
use crate::error::TemplateResolutionError;
use crate::markup::MarkupParser;

type Resolution = Result<Arc<Fragment>, Arc<TemplateResolutionError>>;

/// Snapshot of a template slot
#[derive(Debug, Clone)]
pub enum TemplateState {
    Unresolved,
    Fragment(Arc<Fragment>),
    Error(Arc<TemplateResolutionError>),
}

impl TemplateState {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, TemplateState::Unresolved)
    }
}

/// Template source plus its memoized resolution
pub struct TemplateCache {
    source: String,
    parser: Arc<dyn MarkupParser>,
    resolved: OnceLock<Resolution>,
    parent: Option<Arc<TemplateCache>>,
}

impl TemplateCache {
    pub fn new(source: impl Into<String>, parser: Arc<dyn MarkupParser>) -> Self {
        Self {
            source: source.into(),
            parser,
            resolved: OnceLock::new(),
            parent: None,
        }
    }

    /// A slot for a subclass that reuses `parent`'s source and parser
    pub fn inherit(parent: &Arc<TemplateCache>) -> Self {
        Self {
            source: parent.source.clone(),
            parser: Arc::clone(&parent.parser),
            resolved: OnceLock::new(),
            parent: Some(Arc::clone(parent)),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The slot this one falls back to, if inherited
    pub fn parent(&self) -> Option<&TemplateCache> {
        self.parent.as_deref()
    }

    /// Own outcome, else the nearest resolved ancestor's
    fn lookup(&self) -> Option<&Resolution> {
        self.resolved
            .get()
            .or_else(|| self.parent.as_deref().and_then(TemplateCache::lookup))
    }

    pub fn state(&self) -> TemplateState {
        match self.lookup() {
            None => TemplateState::Unresolved,
            Some(Ok(fragment)) => TemplateState::Fragment(Arc::clone(fragment)),
            Some(Err(err)) => TemplateState::Error(Arc::clone(err)),
        }
    }

    /// Resolve the fragment for an element named `element_name`.
    ///
    /// Only the first call parses. Later calls return the stored fragment,
    /// or the very same error value, whatever name they pass. An inherited
    /// slot never writes to its parent.
    pub fn resolve(&self, element_name: &str) -> Result<Arc<Fragment>, Arc<TemplateResolutionError>> {
        if let Some(resolved) = self.lookup() {
            trace!(element_name, ok = resolved.is_ok(), "template cache hit");
            return resolved.clone();
        }

        self.resolved
            .get_or_init(|| {
                debug!(element_name, "resolving template");
                let resolved = self.parse_fragment(element_name).map(Arc::new).map_err(Arc::new);
                if let Err(err) = &resolved {
                    warn!(element_name, error = %err, "template resolution failed; caching error");
                }
                resolved
            })
            .clone()
    }

    fn parse_fragment(&self, element_name: &str) -> Result<Fragment, TemplateResolutionError> {
        let document = self
            .parser
            .parse(&self.source)
            .map_err(|errors| TemplateResolutionError::Markup {
                element_name: element_name.to_string(),
                errors,
            })?;
        let template = select_template(&document, element_name)?;
        Ok(Fragment::from_template(template))
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("source", &self.source)
            .field("inherited", &self.parent.is_some())
            .field("state", &self.state())
            .finish()
    }
}

/// Pick the template block for `element_name`.
///
/// A lone template block is used when it has no id or its id matches.
/// Otherwise the element whose id equals `element_name` must be a template.
pub fn select_template<'d>(
    document: &'d Document,
    element_name: &str,
) -> Result<&'d Element, TemplateResolutionError> {
    let blocks = document.template_blocks();
    if let [only] = blocks.as_slice() {
        match only.id() {
            None => return Ok(*only),
            Some(id) if id == element_name => return Ok(*only),
            Some(_) => {}
        }
    }

    match document.get_element_by_id(element_name) {
        Some(el) if el.is_template() => Ok(el),
        Some(el) => Err(TemplateResolutionError::NotATemplate {
            element_name: element_name.to_string(),
            found: el.tag.clone(),
        }),
        None => Err(TemplateResolutionError::NotFound {
            element_name: element_name.to_string(),
            found: blocks.iter().map(|b| b.id().map(str::to_string)).collect(),
        }),
    }
}
