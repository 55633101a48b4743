use alloc::sync::Arc;

use vc_utils::hash::HashMap;

use crate::ReflectError;
use crate::info::{Constructor, StructInfo, Type, TypeName};
use crate::value::{Object, Value};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of struct descriptions.
///
/// Besides lookup it answers the questions a mapper asks about types:
/// the inheritance chain, assignability and how to create instances.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{StructInfo, Type};
/// use vc_reflect::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// registry.register(StructInfo::new("Animal").with_property("name", Type::String));
/// registry.register(StructInfo::new("Dog").with_parent("Animal"));
///
/// assert!(registry.is_assignable(&Type::structure("Animal"), &Type::structure("Dog")));
/// assert!(!registry.is_assignable(&Type::structure("Dog"), &Type::structure("Animal")));
///
/// let dog = registry.instantiate(&Type::structure("Dog")).unwrap();
/// assert_eq!(dog.type_name().as_str(), "Dog");
/// ```
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    structs: HashMap<TypeName, Arc<StructInfo>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            structs: HashMap::default(),
        }
    }

    /// Registers a struct, overwriting any previous description of the
    /// same name. Returns `true` if the name was new.
    pub fn register(&mut self, info: StructInfo) -> bool {
        self.structs
            .insert(info.name().clone(), Arc::new(info))
            .is_none()
    }

    /// Chained form of [`register`](Self::register).
    #[inline]
    pub fn with(mut self, info: StructInfo) -> Self {
        self.register(info);
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<StructInfo>> {
        self.structs.get(name)
    }

    /// Returns the description of a struct type, `None` for other types.
    #[inline]
    pub fn get_type(&self, ty: &Type) -> Option<&Arc<StructInfo>> {
        ty.struct_name().and_then(|name| self.get(name.as_str()))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    /// Returns the number of registered structs.
    #[inline]
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StructInfo>> {
        self.structs.values()
    }

    /// Returns the inheritance chain of `name`, most-derived first.
    ///
    /// Unregistered parents end the chain. A parent cycle is cut at the
    /// first repeated type.
    pub fn hierarchy(&self, name: &str) -> Vec<Arc<StructInfo>> {
        let mut chain: Vec<Arc<StructInfo>> = Vec::new();
        let mut next = self.get(name);
        while let Some(info) = next {
            if chain.iter().any(|seen| seen.name() == info.name()) {
                break;
            }
            chain.push(info.clone());
            next = info.parent().and_then(|p| self.get(p.as_str()));
        }
        chain
    }

    /// Returns `true` if `child` is `parent` or inherits from it.
    pub fn is_subtype(&self, child: &TypeName, parent: &TypeName) -> bool {
        child == parent
            || self
                .hierarchy(child.as_str())
                .iter()
                .any(|info| info.name() == parent)
    }

    /// Returns `true` if a value of type `from` may be stored where `to`
    /// is declared.
    ///
    /// Containers are compared element-wise, an `Any` element on either
    /// side is compatible since runtime containers do not track them.
    pub fn is_assignable(&self, to: &Type, from: &Type) -> bool {
        match (to, from) {
            (Type::Any, _) => true,
            (Type::Struct(a), Type::Struct(b)) => self.is_subtype(b, a),
            (Type::List(a), Type::List(b)) | (Type::Array(a), Type::Array(b)) => {
                self.elements_assignable(a, b)
            }
            (Type::Map(ka, va), Type::Map(kb, vb)) => {
                self.elements_assignable(ka, kb) && self.elements_assignable(va, vb)
            }
            _ => to == from,
        }
    }

    fn elements_assignable(&self, to: &Type, from: &Type) -> bool {
        *from == Type::Any || self.is_assignable(to, from)
    }

    /// Returns `true` if `ty` can be created by [`instantiate`](Self::instantiate)
    /// or [`construct`](Self::construct).
    pub fn is_instantiable(&self, ty: &Type) -> bool {
        self.get_type(ty)
            .is_some_and(|info| !matches!(info.constructor(), Constructor::None))
    }

    /// Creates an instance through the no-argument constructor.
    pub fn instantiate(&self, ty: &Type) -> Result<Object, ReflectError> {
        let info = self.struct_info(ty)?;
        match info.constructor() {
            Constructor::Default => Ok(Object::new(info.name().clone())),
            _ => Err(ReflectError::NotInstantiable(ty.clone())),
        }
    }

    /// Creates an instance through the parameter constructor.
    pub fn construct(&self, ty: &Type, args: &[Value]) -> Result<Object, ReflectError> {
        let info = self.struct_info(ty)?;
        let Constructor::Parameters { params, factory } = info.constructor() else {
            return Err(ReflectError::NotInstantiable(ty.clone()));
        };
        if params.len() != args.len() {
            return Err(ReflectError::ArgumentCount {
                ty: info.name().clone(),
                expected: params.len(),
                found: args.len(),
            });
        }

        let object = Object::new(info.name().clone());
        match factory {
            Some(factory) => factory(&object, args)?,
            None => {
                for (param, arg) in params.iter().zip(args) {
                    object.set(param.name(), arg.clone());
                }
            }
        }
        Ok(object)
    }

    fn struct_info(&self, ty: &Type) -> Result<&Arc<StructInfo>, ReflectError> {
        match ty {
            Type::Struct(name) => self
                .get(name.as_str())
                .ok_or_else(|| ReflectError::UnknownType(name.clone())),
            _ => Err(ReflectError::NotInstantiable(ty.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TypeRegistry;
    use crate::ReflectError;
    use crate::info::{Constructor, ParamInfo, StructInfo, Type};
    use crate::value::Value;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(StructInfo::new("Base").with_property("id", Type::I64))
            .with(StructInfo::new("Mid").with_parent("Base"))
            .with(StructInfo::new("Leaf").with_parent("Mid"))
            .with(StructInfo::new("Abstract").with_constructor(Constructor::None))
            .with(
                StructInfo::new("Point").with_constructor(Constructor::assigning(vec![
                    ParamInfo::new("x", Type::I32),
                    ParamInfo::new("y", Type::I32),
                ])),
            )
    }

    #[test]
    fn hierarchy_is_most_derived_first() {
        let registry = registry();
        let names: Vec<_> = registry
            .hierarchy("Leaf")
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, ["Leaf", "Mid", "Base"]);
    }

    #[test]
    fn hierarchy_stops_at_cycles() {
        let registry = TypeRegistry::new()
            .with(StructInfo::new("A").with_parent("B"))
            .with(StructInfo::new("B").with_parent("A"));
        assert_eq!(registry.hierarchy("A").len(), 2);
    }

    #[test]
    fn assignability() {
        let registry = registry();
        let base = Type::structure("Base");
        let leaf = Type::structure("Leaf");

        assert!(registry.is_assignable(&base, &leaf));
        assert!(!registry.is_assignable(&leaf, &base));
        assert!(registry.is_assignable(&Type::Any, &Type::I32));
        assert!(!registry.is_assignable(&Type::I64, &Type::I32));
        assert!(registry.is_assignable(&Type::list(base.clone()), &Type::list(leaf)));
        assert!(registry.is_assignable(&Type::list(base), &Type::list(Type::Any)));
    }

    #[test]
    fn instantiation() {
        let registry = registry();
        assert!(registry.instantiate(&Type::structure("Leaf")).is_ok());
        assert!(matches!(
            registry.instantiate(&Type::structure("Abstract")),
            Err(ReflectError::NotInstantiable(_))
        ));
        assert!(matches!(
            registry.instantiate(&Type::structure("Missing")),
            Err(ReflectError::UnknownType(_))
        ));
        assert!(!registry.is_instantiable(&Type::structure("Abstract")));
    }

    #[test]
    fn construct_assigns_parameters() {
        let registry = registry();
        let point = registry
            .construct(&Type::structure("Point"), &[Value::from(1), Value::from(2)])
            .unwrap();
        assert_eq!(point.get("x"), Value::I32(1));
        assert_eq!(point.get("y"), Value::I32(2));

        assert!(matches!(
            registry.construct(&Type::structure("Point"), &[Value::from(1)]),
            Err(ReflectError::ArgumentCount { expected: 2, found: 1, .. })
        ));
    }
}
