use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeName

/// The name of a registered struct type.
///
/// Cheap to clone, compares and hashes like the underlying `str`,
/// so maps keyed by `TypeName` can be queried with a plain `&str`.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::TypeName;
///
/// let name = TypeName::new("shop::Customer");
/// assert_eq!(name.as_str(), "shop::Customer");
/// assert_eq!(name.simple_name(), "Customer");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Creates a new type name.
    #[inline]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the full name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name without any `::` or `.` separated module prefix.
    pub fn simple_name(&self) -> &str {
        let name = self.as_str();
        let name = name.rsplit("::").next().unwrap_or(name);
        name.rsplit('.').next().unwrap_or(name)
    }
}

impl Borrow<str> for TypeName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    #[inline]
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for TypeName {
    #[inline]
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&TypeName> for TypeName {
    #[inline]
    fn from(value: &TypeName) -> Self {
        value.clone()
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeName;

    #[test]
    fn simple_name_strips_prefixes() {
        assert_eq!(TypeName::new("Order").simple_name(), "Order");
        assert_eq!(TypeName::new("a::b::Order").simple_name(), "Order");
        assert_eq!(TypeName::new("org.shop.Order").simple_name(), "Order");
    }
}
