//! Widget instances and lifecycle dispatch

use std::sync::Arc;

use tracing::trace;

use crate::class::WidgetClass;
use crate::dom::ShadowRoot;
use crate::error::TemplateResolutionError;

/// One element created from a defined widget class
#[derive(Debug)]
pub struct WidgetInstance {
    class: WidgetClass,
    element_name: String,
    local_name: String,
    is: Option<String>,
    attributes: Vec<(String, String)>,
    shadow_root: Option<ShadowRoot>,
    connected: bool,
}

impl WidgetInstance {
    pub(crate) fn new(class: WidgetClass, element_name: &str, local_name: &str, is: Option<&str>) -> Self {
        Self {
            class,
            element_name: element_name.to_string(),
            local_name: local_name.to_string(),
            is: is.map(str::to_string),
            attributes: Vec::new(),
            shadow_root: None,
            connected: false,
        }
    }

    pub fn class(&self) -> &WidgetClass {
        &self.class
    }

    /// The registration name this instance was created from
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    /// The tag name in the document: the registration name for autonomous
    /// elements, the native kind for customized built-ins
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn is(&self) -> Option<&str> {
        self.is.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn shadow_root(&self) -> Option<&ShadowRoot> {
        self.shadow_root.as_ref()
    }

    pub fn shadow_root_mut(&mut self) -> Option<&mut ShadowRoot> {
        self.shadow_root.as_mut()
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, notifying the class if it observes `name`
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let old = match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value.to_string())),
            None => {
                self.attributes.push((name.clone(), value.to_string()));
                None
            }
        };
        self.notify_attribute(&name, old.as_deref(), Some(value));
    }

    pub fn remove_attribute(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(pos) = self.attributes.iter().position(|(k, _)| *k == name) {
            let (_, old) = self.attributes.remove(pos);
            self.notify_attribute(&name, Some(&old), None);
        }
    }

    fn notify_attribute(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        let behavior = self.class.behavior();
        if behavior.observed_attributes().contains(&name) {
            behavior.attribute_changed(self, name, old, new);
        }
    }

    /// Insertion into a document.
    ///
    /// On the first insertion the class's template fragment is resolved and
    /// cloned into a new open shadow root. A cached resolution error is
    /// returned as-is and no shadow root is created.
    pub fn connected_callback(&mut self) -> Result<(), Arc<TemplateResolutionError>> {
        self.attach_template()?;
        self.connected = true;
        let behavior = self.class.behavior();
        behavior.connected(self);
        Ok(())
    }

    pub fn disconnected_callback(&mut self) {
        self.connected = false;
        let behavior = self.class.behavior();
        behavior.disconnected(self);
    }

    /// Move to a new document
    pub fn adopted_callback(&mut self) {
        let behavior = self.class.behavior();
        behavior.adopted(self);
    }

    fn attach_template(&mut self) -> Result<(), Arc<TemplateResolutionError>> {
        if self.shadow_root.is_some() {
            return Ok(());
        }
        let Some(cache) = self.class.template_cache() else {
            return Ok(());
        };

        let fragment = cache.resolve(&self.element_name)?;
        let mut root = ShadowRoot::new();
        root.append_fragment(&fragment);
        trace!(element = %self.element_name, nodes = root.children().len(), "attached shadow root");
        self.shadow_root = Some(root);
        Ok(())
    }
}
