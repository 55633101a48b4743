use core::fmt;

/// Visibility of a field or method.
///
/// Ordered from the most to the least visible. A configured level admits
/// every member that is at least as visible as itself.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::AccessLevel;
///
/// assert!(AccessLevel::Protected.permits(AccessLevel::Public));
/// assert!(!AccessLevel::Public.permits(AccessLevel::Private));
/// assert!(AccessLevel::Private.permits(AccessLevel::Private));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    #[default]
    Public,
    Protected,
    PackagePrivate,
    Private,
}

impl AccessLevel {
    /// Returns `true` if a member declared with `member` is accessible
    /// when `self` is the configured access level.
    #[inline]
    pub const fn permits(self, member: AccessLevel) -> bool {
        member as u8 <= self as u8
    }

    /// Returns the lowercase name, e.g. `"package_private"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::PackagePrivate => "package_private",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
