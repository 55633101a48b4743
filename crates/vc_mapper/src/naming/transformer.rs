use alloc::sync::Arc;

use super::NameableType;

// -----------------------------------------------------------------------------
// NameTransformer

/// Turns a member name into the property name used for matching.
pub trait NameTransformer: Send + Sync {
    fn transform(&self, name: &str, nameable: NameableType) -> String;

    /// A stable name, part of the descriptor cache key and of [`Settings`](crate::Settings).
    fn name(&self) -> &str;
}

/// Strips `get`/`is` from method names: `getName` becomes `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaBeansAccessorTransformer;

impl NameTransformer for JavaBeansAccessorTransformer {
    fn transform(&self, name: &str, nameable: NameableType) -> String {
        if nameable == NameableType::Method {
            if let Some(rest) = name.strip_prefix("get").filter(|r| !r.is_empty()) {
                return decapitalize(rest);
            }
            if let Some(rest) = name.strip_prefix("is").filter(|r| !r.is_empty()) {
                return decapitalize(rest);
            }
        }
        name.to_owned()
    }

    fn name(&self) -> &str {
        "Javabeans Accessor"
    }
}

/// Strips `set` from method names: `setName` becomes `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaBeansMutatorTransformer;

impl NameTransformer for JavaBeansMutatorTransformer {
    fn transform(&self, name: &str, nameable: NameableType) -> String {
        match name.strip_prefix("set") {
            Some(rest) if nameable == NameableType::Method && !rest.is_empty() => decapitalize(rest),
            _ => name.to_owned(),
        }
    }

    fn name(&self) -> &str {
        "Javabeans Mutator"
    }
}

/// Leaves names untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl NameTransformer for IdentityTransformer {
    #[inline]
    fn transform(&self, name: &str, _nameable: NameableType) -> String {
        name.to_owned()
    }

    fn name(&self) -> &str {
        "Identity"
    }
}

/// Lower-cases the first character, unless the first two are both upper case
/// (`URL` stays `URL`).
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_uppercase() && chars.next().is_some_and(char::is_uppercase) {
        return name.to_owned();
    }
    first.to_lowercase().chain(name[first.len_utf8()..].chars()).collect()
}

// -----------------------------------------------------------------------------
// NameTransformers

/// The built-in transformers.
pub struct NameTransformers;

impl NameTransformers {
    #[inline]
    pub fn javabeans_accessor() -> Arc<dyn NameTransformer> {
        Arc::new(JavaBeansAccessorTransformer)
    }

    #[inline]
    pub fn javabeans_mutator() -> Arc<dyn NameTransformer> {
        Arc::new(JavaBeansMutatorTransformer)
    }

    #[inline]
    pub fn identity() -> Arc<dyn NameTransformer> {
        Arc::new(IdentityTransformer)
    }

    /// Looks a built-in transformer up by its [`name`](NameTransformer::name).
    pub fn by_name(name: &str) -> Option<Arc<dyn NameTransformer>> {
        match name {
            "Javabeans Accessor" => Some(Self::javabeans_accessor()),
            "Javabeans Mutator" => Some(Self::javabeans_mutator()),
            "Identity" => Some(Self::identity()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JavaBeansAccessorTransformer, JavaBeansMutatorTransformer, NameTransformer, decapitalize};
    use crate::naming::NameableType;

    #[test]
    fn accessor_strips_get_and_is() {
        let t = JavaBeansAccessorTransformer;
        assert_eq!(t.transform("getFirstName", NameableType::Method), "firstName");
        assert_eq!(t.transform("isActive", NameableType::Method), "active");
        assert_eq!(t.transform("get", NameableType::Method), "get");
        assert_eq!(t.transform("getURL", NameableType::Method), "URL");
        assert_eq!(t.transform("getName", NameableType::Field), "getName");
        assert_eq!(t.transform("Customer", NameableType::Class), "Customer");
    }

    #[test]
    fn mutator_strips_set() {
        let t = JavaBeansMutatorTransformer;
        assert_eq!(t.transform("setV3", NameableType::Method), "v3");
        assert_eq!(t.transform("set", NameableType::Method), "set");
        assert_eq!(t.transform("setName", NameableType::Generic), "setName");
    }

    #[test]
    fn decapitalize_rules() {
        assert_eq!(decapitalize("Name"), "name");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize("ID"), "ID");
        assert_eq!(decapitalize(""), "");
    }
}
