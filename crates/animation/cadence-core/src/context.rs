//! Shared element registry threaded through a sequence run.
//!
//! [`AnimationContext`] is a capability handle: clones alias one registry.
//! It is single-threaded and unsynchronized. Units running in parallel share
//! it and must not issue conflicting writes.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Opaque renderable owned by the host. The engine stores it and hands it
/// back; it never inspects it.
#[derive(Clone, Serialize, Deserialize)]
pub struct AnimationElement {
    pub id: String,
    /// Host-side component name.
    pub component: String,
    #[serde(default)]
    pub props: serde_json::Value,
    /// Host reference (widget, scene node, ...). Not serialized.
    #[serde(skip)]
    pub external: Option<Rc<dyn Any>>,
}

impl AnimationElement {
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            props: serde_json::Value::Null,
            external: None,
        }
    }

    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }

    pub fn with_external<T: Any>(mut self, external: T) -> Self {
        self.external = Some(Rc::new(external));
        self
    }

    pub fn external_as<T: Any>(&self) -> Option<&T> {
        self.external.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for AnimationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationElement")
            .field("id", &self.id)
            .field("component", &self.component)
            .field("props", &self.props)
            .field("has_external", &self.external.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct AnimationContext {
    elements: Rc<RefCell<HashMap<String, AnimationElement>>>,
}

impl AnimationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element under its id, returning any element it replaced.
    pub fn insert(&self, element: AnimationElement) -> Option<AnimationElement> {
        self.elements
            .borrow_mut()
            .insert(element.id.clone(), element)
    }

    pub fn get(&self, id: &str) -> Option<AnimationElement> {
        self.elements.borrow().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<AnimationElement> {
        self.elements.borrow_mut().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.elements.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Read access without cloning. `f` must not write to this context.
    pub fn with_element<R>(&self, id: &str, f: impl FnOnce(&AnimationElement) -> R) -> Option<R> {
        self.elements.borrow().get(id).map(f)
    }

    /// In-place mutation. `f` must not touch this context.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut AnimationElement) -> R) -> Option<R> {
        self.elements.borrow_mut().get_mut(id).map(f)
    }

    pub fn clear(&self) {
        self.elements.borrow_mut().clear();
    }

    /// True when both handles alias the same registry.
    pub fn ptr_eq(&self, other: &AnimationContext) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }
}

impl fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationContext")
            .field("elements", &self.ids())
            .finish()
    }
}
