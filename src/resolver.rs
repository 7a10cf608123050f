//! Type discriminators and the resolver that maps them to frame types.
//!
//! Every frame type is described by a static [`TypeDescriptor`] table. The
//! discriminator written into an element is the descriptor's `name`; the
//! [`TypeRegistry`] turns stored names back into descriptors so that
//! supertype relationships can be honoured when a caller asks for a broader type.

use std::{fmt, ptr};

use ahash::AHashMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    adapter::GraphAdapter,
    errors::FrameGraphError,
    types::{Element, ElementKind},
};

/// Default property key holding the type discriminator.
pub const DEFAULT_TYPE_KEY: &str = "_type";

/// Capability table for one frame type.
///
/// Descriptors are meant to live in statics. Supertype lists that point at other
/// statics have to be statics themselves:
///
/// ```
/// use framegraph::TypeDescriptor;
///
/// static AGENT: TypeDescriptor = TypeDescriptor::vertex("Agent");
/// static PERSON_SUPERTYPES: [&TypeDescriptor; 1] = [&AGENT];
/// static PERSON: TypeDescriptor = TypeDescriptor::vertex("Person")
///     .with_supertypes(&PERSON_SUPERTYPES)
///     .with_properties(&["name"]);
///
/// assert!(PERSON.is_a(&AGENT));
/// ```
///
/// Descriptors compare by address, so two statics sharing a name are distinct types.
pub struct TypeDescriptor {
    pub name: &'static str,
    pub kind: ElementKind,
    pub supertypes: &'static [&'static TypeDescriptor],
    /// Property keys the frame type reads and writes.
    pub properties: &'static [&'static str],
    /// Edge labels the frame type navigates.
    pub labels: &'static [&'static str],
}

impl TypeDescriptor {
    pub const fn vertex(name: &'static str) -> Self {
        Self {
            name,
            kind: ElementKind::Vertex,
            supertypes: &[],
            properties: &[],
            labels: &[],
        }
    }

    pub const fn edge(name: &'static str) -> Self {
        Self {
            name,
            kind: ElementKind::Edge,
            supertypes: &[],
            properties: &[],
            labels: &[],
        }
    }

    pub const fn with_supertypes(mut self, supertypes: &'static [&'static TypeDescriptor]) -> Self {
        self.supertypes = supertypes;
        self
    }

    pub const fn with_properties(mut self, properties: &'static [&'static str]) -> Self {
        self.properties = properties;
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// True when this is one of the untyped roots ([`TVERTEX`], [`TEDGE`]).
    pub fn is_root(&self) -> bool {
        ptr::eq(self, &TVERTEX) || ptr::eq(self, &TEDGE)
    }

    /// True when `self` is `other` or inherits from it.
    ///
    /// Supertype cycles are tolerated: each descriptor is visited once.
    pub fn is_a(&self, other: &TypeDescriptor) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if other.is_root() {
            return true;
        }
        let mut pending: Vec<&TypeDescriptor> = vec![self];
        let mut seen: Vec<&TypeDescriptor> = Vec::new();
        while let Some(current) = pending.pop() {
            if current.name == other.name {
                return true;
            }
            if seen.iter().any(|visited| ptr::eq(*visited, current)) {
                continue;
            }
            seen.push(current);
            for parent in current.supertypes {
                pending.push(*parent);
            }
        }
        false
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supertypes: Vec<&str> = self.supertypes.iter().map(|parent| parent.name).collect();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("supertypes", &supertypes)
            .field("properties", &self.properties)
            .field("labels", &self.labels)
            .finish()
    }
}

/// Root descriptor every vertex frame type is compatible with.
pub static TVERTEX: TypeDescriptor = TypeDescriptor::vertex("TVertex");

/// Root descriptor every edge frame type is compatible with.
pub static TEDGE: TypeDescriptor = TypeDescriptor::edge("TEdge");

/// Materialization mode for casts, reframes and traversal terminals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CastMode {
    /// Validate the stored discriminator against the requested type.
    #[default]
    Checked,
    /// Wrap the element as requested without touching the adapter.
    Explicit,
}

/// Lookup table from stored discriminator names to descriptors.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    by_name: AHashMap<&'static str, &'static TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(&TVERTEX);
        registry.register(&TEDGE);
        registry
    }

    /// Registers a descriptor and, transitively, its supertypes.
    pub fn register(&mut self, descriptor: &'static TypeDescriptor) -> &mut Self {
        if self.by_name.insert(descriptor.name, descriptor).is_none() {
            for parent in descriptor.supertypes {
                self.register(*parent);
            }
        }
        self
    }

    pub fn with(mut self, descriptor: &'static TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Maps elements to and from frame types through a stored discriminator.
pub trait TypeResolver {
    /// Reads the stored discriminator. `None` for untyped elements and for names
    /// the resolver does not know.
    fn resolve(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
    ) -> Result<Option<&'static TypeDescriptor>, FrameGraphError>;

    /// Writes the discriminator for `descriptor` onto a freshly created element.
    fn stamp(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
        descriptor: &'static TypeDescriptor,
    ) -> Result<(), FrameGraphError>;

    /// Fails with [`FrameGraphError::TypeMismatch`] when `element` cannot be viewed
    /// as `requested`.
    fn check(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
        requested: &'static TypeDescriptor,
    ) -> Result<(), FrameGraphError>;
}

/// Resolver storing the discriminator as a string property and honouring
/// supertype chains of registered descriptors.
#[derive(Clone, Debug)]
pub struct PolymorphicTypeResolver {
    registry: TypeRegistry,
    type_key: String,
}

impl PolymorphicTypeResolver {
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_type_key(registry, DEFAULT_TYPE_KEY)
    }

    pub fn with_type_key<K: Into<String>>(registry: TypeRegistry, type_key: K) -> Self {
        Self {
            registry,
            type_key: type_key.into(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    fn stored_name(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
    ) -> Result<Option<String>, FrameGraphError> {
        match adapter.get_property(element, &self.type_key)? {
            None => Ok(None),
            Some(Value::String(name)) => Ok(Some(name)),
            Some(other) => Err(FrameGraphError::type_mismatch(
                "string discriminator",
                other.to_string(),
            )),
        }
    }
}

impl Default for PolymorphicTypeResolver {
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}

impl TypeResolver for PolymorphicTypeResolver {
    fn resolve(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
    ) -> Result<Option<&'static TypeDescriptor>, FrameGraphError> {
        let Some(name) = self.stored_name(adapter, element)? else {
            return Ok(None);
        };
        let descriptor = self.registry.get(&name);
        if descriptor.is_none() {
            warn!(%element, discriminator = %name, "unregistered type discriminator");
        }
        Ok(descriptor)
    }

    fn stamp(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
        descriptor: &'static TypeDescriptor,
    ) -> Result<(), FrameGraphError> {
        if descriptor.kind != element.kind() {
            return Err(FrameGraphError::type_mismatch(
                descriptor.name,
                element.kind().to_string(),
            ));
        }
        if descriptor.is_root() {
            return Ok(());
        }
        debug!(%element, frame_type = descriptor.name, "stamping type discriminator");
        adapter.set_property(
            element,
            &self.type_key,
            Value::String(descriptor.name.to_string()),
        )
    }

    fn check(
        &self,
        adapter: &dyn GraphAdapter,
        element: Element,
        requested: &'static TypeDescriptor,
    ) -> Result<(), FrameGraphError> {
        if requested.kind != element.kind() {
            return Err(FrameGraphError::type_mismatch(
                requested.name,
                element.kind().to_string(),
            ));
        }
        if requested.is_root() {
            return Ok(());
        }
        let Some(name) = self.stored_name(adapter, element)? else {
            return Ok(());
        };
        if name == requested.name {
            return Ok(());
        }
        match self.registry.get(&name) {
            Some(stored) if stored.is_a(requested) => Ok(()),
            _ => Err(FrameGraphError::type_mismatch(requested.name, name)),
        }
    }
}
