use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cell::RefCell;
use core::fmt;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::{Object, ObjectId, Value};
use vc_utils::hash::HashMap;

use crate::Configuration;
use crate::engine::MappingEngine;
use crate::error::{Cause, ConvertError, Errors};
use crate::mapping::Mapping;
use crate::typemap::TypeMap;

// -----------------------------------------------------------------------------
// Shared state

/// State shared by every context of one top-level call.
#[derive(Default)]
pub(super) struct Invocation {
    errors: RefCell<Errors>,
    /// Destination produced for each source object, keeping the source alive.
    source_to_destination: RefCell<HashMap<ObjectId, (Object, Value)>>,
    /// Source values read per destination path.
    parent_sources: RefCell<HashMap<String, Value>>,
    last_source: RefCell<Value>,
}

impl Invocation {
    pub fn take_errors(&self) -> Errors {
        core::mem::take(&mut *self.errors.borrow_mut())
    }

    pub fn add_parent_source(&self, path: &str, source: Value) {
        self.parent_sources.borrow_mut().insert(path.to_owned(), source.clone());
        *self.last_source.borrow_mut() = source;
    }

    /// The source read at `path`, else the last source read.
    pub fn parent_source(&self, path: &str) -> Value {
        match self.parent_sources.borrow().get(path) {
            Some(source) => source.clone(),
            None => self.last_source.borrow().clone(),
        }
    }
}

/// Destination caches shared between a context and its non-cyclic
/// property contexts.
#[derive(Default)]
pub(super) struct PathState {
    pub destinations: HashMap<String, Value>,
    pub shaded: Vec<String>,
}

// -----------------------------------------------------------------------------
// ParentContext

/// The enclosing step of a [`MappingContext`], as it was when the child
/// was created.
pub struct ParentContext {
    source: Value,
    source_type: Type,
    destination: Value,
    destination_type: Type,
    destination_path: String,
    type_map: Option<Arc<TypeMap>>,
    mapping: Option<Arc<Mapping>>,
    pub(super) paths: Rc<RefCell<PathState>>,
    pub(super) intermediates: Rc<RefCell<HashMap<String, Value>>>,
}

impl ParentContext {
    #[inline]
    pub fn source(&self) -> &Value {
        &self.source
    }

    #[inline]
    pub fn source_type(&self) -> &Type {
        &self.source_type
    }

    #[inline]
    pub fn destination(&self) -> &Value {
        &self.destination
    }

    #[inline]
    pub fn destination_type(&self) -> &Type {
        &self.destination_type
    }

    #[inline]
    pub fn destination_path(&self) -> &str {
        &self.destination_path
    }

    #[inline]
    pub fn type_map(&self) -> Option<&Arc<TypeMap>> {
        self.type_map.as_ref()
    }

    #[inline]
    pub fn mapping(&self) -> Option<&Arc<Mapping>> {
        self.mapping.as_ref()
    }
}

impl fmt::Debug for ParentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentContext")
            .field("source_type", &self.source_type)
            .field("destination_type", &self.destination_type)
            .field("destination_path", &self.destination_path)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// MappingContext

/// One step of a mapping call: a source value, the destination type, and
/// the destination value once it exists.
///
/// Converters receive a `&mut MappingContext` and may map nested values
/// through [`map`](Self::map) and [`map_into`](Self::map_into); conditions
/// and providers only read it.
pub struct MappingContext<'a> {
    pub(super) engine: &'a MappingEngine,
    pub(super) invocation: Rc<Invocation>,
    pub(super) paths: Rc<RefCell<PathState>>,
    pub(super) intermediates: Rc<RefCell<HashMap<String, Value>>>,
    pub(super) parent: Option<Rc<ParentContext>>,
    pub(super) source: Value,
    pub(super) source_type: Type,
    pub(super) destination: Value,
    pub(super) destination_type: Type,
    pub(super) destination_path: String,
    pub(super) type_map_name: Option<Arc<str>>,
    pub(super) type_map: Option<Arc<TypeMap>>,
    pub(super) mapping: Option<Arc<Mapping>>,
    pub(super) provided_destination: bool,
}

impl<'a> MappingContext<'a> {
    pub(super) fn root(
        engine: &'a MappingEngine,
        source: Value,
        destination: Value,
        destination_type: Type,
        type_map_name: Option<Arc<str>>,
    ) -> Self {
        Self {
            engine,
            invocation: Rc::new(Invocation::default()),
            paths: Rc::default(),
            intermediates: Rc::default(),
            parent: None,
            source_type: source.runtime_type(),
            source,
            provided_destination: !destination.is_null(),
            destination,
            destination_type,
            destination_path: String::new(),
            type_map_name,
            type_map: None,
            mapping: None,
        }
    }

    fn snapshot(&self) -> Rc<ParentContext> {
        Rc::new(ParentContext {
            source: self.source.clone(),
            source_type: self.source_type.clone(),
            destination: self.destination.clone(),
            destination_type: self.destination_type.clone(),
            destination_path: self.destination_path.clone(),
            type_map: self.type_map.clone(),
            mapping: self.mapping.clone(),
            paths: self.paths.clone(),
            intermediates: self.intermediates.clone(),
        })
    }

    /// A nested step. Cyclic steps start with empty destination caches.
    fn child(
        &self,
        source: Value,
        source_type: Type,
        destination: Value,
        destination_type: Type,
        mapping: Option<Arc<Mapping>>,
        inherit: bool,
    ) -> MappingContext<'a> {
        let mut destination_path = self.destination_path.clone();
        if let Some(mapping) = &mapping {
            destination_path.push_str(mapping.path());
        }
        MappingContext {
            engine: self.engine,
            invocation: self.invocation.clone(),
            paths: if inherit { self.paths.clone() } else { Rc::default() },
            intermediates: Rc::default(),
            parent: Some(self.snapshot()),
            source,
            source_type,
            destination,
            destination_type,
            destination_path,
            type_map_name: None,
            type_map: None,
            mapping,
            provided_destination: self.provided_destination,
        }
    }

    /// The step that maps the value of `mapping`, read as `source`.
    pub(super) fn property_context(&self, source: Value, mapping: &Arc<Mapping>) -> MappingContext<'a> {
        let source_type = if source.is_null() {
            mapping.source_type().clone()
        } else {
            source.runtime_type()
        };
        let destination_type = mapping.last_destination_property().ty().clone();
        self.child(
            source,
            source_type,
            Value::Null,
            destination_type,
            Some(mapping.clone()),
            !mapping.is_cyclic(),
        )
    }

    // -------------------------------------------------------------------------
    // Public view

    #[inline]
    pub fn source(&self) -> &Value {
        &self.source
    }

    #[inline]
    pub fn source_type(&self) -> &Type {
        &self.source_type
    }

    /// The destination value; `Null` until it is created or provided.
    #[inline]
    pub fn destination(&self) -> &Value {
        &self.destination
    }

    #[inline]
    pub fn destination_type(&self) -> &Type {
        &self.destination_type
    }

    /// The destination path of this step relative to the top-level
    /// destination, e.g. `customer.address.`.
    #[inline]
    pub fn destination_path(&self) -> &str {
        &self.destination_path
    }

    #[inline]
    pub fn type_map_name(&self) -> Option<&str> {
        self.type_map_name.as_deref()
    }

    /// The type map being applied, if this step applies one.
    #[inline]
    pub fn type_map(&self) -> Option<&Arc<TypeMap>> {
        self.type_map.as_ref()
    }

    /// The mapping this step produces a value for.
    #[inline]
    pub fn mapping(&self) -> Option<&Arc<Mapping>> {
        self.mapping.as_ref()
    }

    #[inline]
    pub fn parent(&self) -> Option<&ParentContext> {
        self.parent.as_deref()
    }

    /// Returns `true` if the top-level call maps into an existing destination.
    #[inline]
    pub fn is_provided_destination(&self) -> bool {
        self.provided_destination
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.engine.registry()
    }

    #[inline]
    pub fn configuration(&self) -> &'a Configuration {
        self.engine.configuration()
    }

    /// Maps `source` to a new value of `destination_type`.
    pub fn map(&mut self, source: &Value, destination_type: &Type) -> Result<Value, ConvertError> {
        let mut child = self.child(
            source.clone(),
            source.runtime_type(),
            Value::Null,
            destination_type.clone(),
            None,
            false,
        );
        Ok(self.engine.map(&mut child)?)
    }

    /// Maps `source` into the existing `destination`.
    pub fn map_into(&mut self, source: &Value, destination: &Value) -> Result<Value, ConvertError> {
        let mut child = self.child(
            source.clone(),
            source.runtime_type(),
            destination.clone(),
            destination.runtime_type(),
            None,
            false,
        );
        Ok(self.engine.map(&mut child)?)
    }

    // -------------------------------------------------------------------------
    // Engine state

    pub(super) fn add_error(&self, message: impl Into<String>) {
        self.invocation.errors.borrow_mut().add(message);
    }

    pub(super) fn add_error_with_cause(&self, message: impl Into<String>, cause: Cause) {
        self.invocation.errors.borrow_mut().add_with_cause(message, cause);
    }

    /// Sets the destination; `track` records it as the destination of the
    /// current source object.
    pub(super) fn set_destination(&mut self, destination: Value, track: bool) {
        if track && let Some(source) = self.source.as_object() {
            self.invocation
                .source_to_destination
                .borrow_mut()
                .insert(source.id(), (source.clone(), destination.clone()));
        }
        self.destination = destination;
    }

    /// The destination already produced for `source` in this call.
    pub(super) fn destination_for(&self, source: &Value) -> Option<Value> {
        let object = source.as_object()?;
        self.invocation
            .source_to_destination
            .borrow()
            .get(&object.id())
            .map(|(_, destination)| destination.clone())
            .filter(|destination| !destination.is_null())
    }

    pub(super) fn shade(&self, path: String) {
        self.paths.borrow_mut().shaded.push(path);
    }

    pub(super) fn is_shaded(&self, path: &str) -> bool {
        self.paths.borrow().shaded.iter().any(|shaded| path.starts_with(shaded.as_str()))
    }
}

impl fmt::Debug for MappingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("source_type", &self.source_type)
            .field("destination_type", &self.destination_type)
            .field("destination_path", &self.destination_path)
            .field("type_map_name", &self.type_map_name)
            .finish_non_exhaustive()
    }
}
