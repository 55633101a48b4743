use alloc::sync::Arc;

use vc_utils::hash::HashMap;

use crate::info::{AccessLevel, Constructor, FieldInfo, MethodInfo, Type, TypeName};

/// Runtime description of a struct type.
///
/// Built with chained `with_*` calls and registered in a
/// [`TypeRegistry`](crate::registry::TypeRegistry). Fields and methods keep
/// their declaration order and are indexed by name; the first declaration
/// of a name wins lookups.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{StructInfo, Type};
///
/// let info = StructInfo::new("Person")
///     .with_property("name", Type::String)
///     .with_property("active", Type::Bool);
///
/// assert_eq!(info.fields().len(), 2);
/// assert!(info.method("getName").is_some());
/// assert!(info.method("isActive").is_some());
/// assert!(info.method("setActive").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct StructInfo {
    name: TypeName,
    parent: Option<TypeName>,
    is_final: bool,
    fields: Vec<FieldInfo>,
    field_index: HashMap<Arc<str>, usize>,
    methods: Vec<MethodInfo>,
    method_index: HashMap<Arc<str>, usize>,
    constructor: Constructor,
}

impl StructInfo {
    /// Creates a struct description with a default constructor.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            is_final: false,
            fields: Vec::new(),
            field_index: HashMap::default(),
            methods: Vec::new(),
            method_index: HashMap::default(),
            constructor: Constructor::Default,
        }
    }

    /// Declares the parent type.
    #[inline]
    pub fn with_parent(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Marks the type as final (it cannot be subclassed or proxied).
    #[inline]
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    #[inline]
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.field_index
            .entry(field.name_arc().clone())
            .or_insert(self.fields.len());
        self.fields.push(field);
        self
    }

    /// Declares a public field.
    #[inline]
    pub fn with_public_field(self, name: &str, ty: Type) -> Self {
        self.with_field(FieldInfo::new(name, ty))
    }

    #[inline]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.method_index
            .entry(method.name().into())
            .or_insert(self.methods.len());
        self.methods.push(method);
        self
    }

    #[inline]
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = constructor;
        self
    }

    /// Declares a private field plus a public getter and setter for it.
    ///
    /// The getter is `isName` for `bool` properties and `getName` otherwise.
    pub fn with_property(self, name: &str, ty: Type) -> Self {
        let cap = capitalize(name);
        let getter = if ty == Type::Bool {
            format!("is{cap}")
        } else {
            format!("get{cap}")
        };
        let setter = format!("set{cap}");

        self.with_field(FieldInfo::new(name, ty.clone()).with_access(AccessLevel::Private))
            .with_method(MethodInfo::slot_getter(getter, ty.clone(), name))
            .with_method(MethodInfo::slot_setter(setter, ty, name))
    }

    /// Declares a private field with only a public getter.
    pub fn with_read_only_property(self, name: &str, ty: Type) -> Self {
        let getter = format!("get{}", capitalize(name));
        self.with_field(FieldInfo::new(name, ty.clone()).with_access(AccessLevel::Private))
            .with_method(MethodInfo::slot_getter(getter, ty, name))
    }

    #[inline]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> Type {
        Type::Struct(self.name.clone())
    }

    #[inline]
    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    #[inline]
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Returns the field declared directly on this type.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.field_index.get(name).and_then(|&i| self.fields.get(i))
    }

    /// Returns the method declared directly on this type.
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.method_index.get(name).and_then(|&i| self.methods.get(i))
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::info::{FieldInfo, MethodInfo, StructInfo, Type};

    #[test]
    fn lookups_use_the_first_declaration() {
        let info = StructInfo::new("Item")
            .with_field(FieldInfo::new("code", Type::String))
            .with_property("count", Type::I32)
            .with_field(FieldInfo::new("code", Type::I64))
            .with_method(MethodInfo::slot_getter("getCount", Type::I64, "count"));

        assert_eq!(info.fields().len(), 3);
        assert_eq!(info.methods().len(), 3);
        assert_eq!(info.field("code").unwrap().ty(), &Type::String);
        assert_eq!(info.method("getCount").unwrap().ty(), &Type::I32);
        assert!(info.method("setCount").is_some());
        assert!(info.field("missing").is_none());
    }
}
