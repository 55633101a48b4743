use alloc::sync::Arc;
use core::fmt;

use crate::ReflectError;
use crate::info::Type;
use crate::value::{Object, Value};

/// Initializes a freshly allocated object from constructor arguments.
pub type FactoryFn = Arc<dyn Fn(&Object, &[Value]) -> Result<(), ReflectError> + Send + Sync>;

// -----------------------------------------------------------------------------
// ParamInfo

/// A named constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    name: Arc<str>,
    ty: Type,
}

impl ParamInfo {
    pub fn new(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

// -----------------------------------------------------------------------------
// Constructor

/// How instances of a struct type are created.
#[derive(Clone, Default)]
pub enum Constructor {
    /// A no-argument constructor, slots start empty.
    #[default]
    Default,
    /// A constructor taking named parameters.
    ///
    /// Without a factory every argument is stored in the slot named
    /// after its parameter.
    Parameters {
        params: Vec<ParamInfo>,
        factory: Option<FactoryFn>,
    },
    /// The type cannot be instantiated.
    None,
}

impl Constructor {
    /// A parameter constructor that assigns each argument to its slot.
    pub fn assigning(params: Vec<ParamInfo>) -> Self {
        Self::Parameters {
            params,
            factory: None,
        }
    }

    /// A parameter constructor with a custom initializer.
    pub fn with_factory<F>(params: Vec<ParamInfo>, factory: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<(), ReflectError> + Send + Sync + 'static,
    {
        Self::Parameters {
            params,
            factory: Some(Arc::new(factory)),
        }
    }

    /// Returns the parameters, empty for the default constructor.
    pub fn params(&self) -> &[ParamInfo] {
        match self {
            Self::Parameters { params, .. } => params,
            _ => &[],
        }
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    #[inline]
    pub fn has_params(&self) -> bool {
        matches!(self, Self::Parameters { .. })
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Parameters { params, factory } => f
                .debug_struct("Parameters")
                .field("params", params)
                .field("custom_factory", &factory.is_some())
                .finish(),
            Self::None => f.write_str("None"),
        }
    }
}
