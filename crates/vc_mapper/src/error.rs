use alloc::sync::Arc;
use core::error::Error as StdError;
use core::fmt;

use thiserror::Error;

/// A shareable error cause.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

// -----------------------------------------------------------------------------
// ErrorMessage

/// One reported problem, with an optional underlying cause.
#[derive(Clone)]
pub struct ErrorMessage {
    message: String,
    cause: Option<Cause>,
}

impl ErrorMessage {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    #[inline]
    pub fn with_cause(message: impl Into<String>, cause: Cause) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMessage")
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for ErrorMessage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Writes `heading`, the numbered messages with their causes and the count.
fn format_messages(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    messages: &[ErrorMessage],
) -> fmt::Result {
    writeln!(f, "{heading}:")?;
    writeln!(f)?;
    for (index, message) in messages.iter().enumerate() {
        writeln!(f, "{}) {}", index + 1, message.message)?;
        if let Some(cause) = &message.cause {
            writeln!(f, "Caused by: {cause}")?;
        }
        writeln!(f)?;
    }
    match messages.len() {
        1 => f.write_str("1 error"),
        n => write!(f, "{n} errors"),
    }
}

/// The cause of the only message that carries one.
fn single_cause(messages: &[ErrorMessage]) -> Option<&(dyn StdError + 'static)> {
    let mut causes = messages.iter().filter_map(|m| m.cause.as_ref());
    let first = causes.next()?;
    if causes.next().is_some() {
        return None;
    }
    Some(&**first as &(dyn StdError + 'static))
}

// -----------------------------------------------------------------------------
// Batched errors

macro_rules! batched_error {
    ($(#[$meta:meta])* $name:ident => $heading:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            messages: Vec<ErrorMessage>,
        }

        impl $name {
            #[inline]
            pub fn new(messages: Vec<ErrorMessage>) -> Self {
                Self { messages }
            }

            /// Creates an error holding a single message.
            #[inline]
            pub fn message(message: impl Into<String>) -> Self {
                Self::new(vec![ErrorMessage::new(message)])
            }

            #[inline]
            pub fn messages(&self) -> &[ErrorMessage] {
                &self.messages
            }

            #[inline]
            pub fn into_messages(self) -> Vec<ErrorMessage> {
                self.messages
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                format_messages(f, $heading, &self.messages)
            }
        }

        impl StdError for $name {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                single_cause(&self.messages)
            }
        }
    };
}

batched_error! {
    /// Problems found while building a [`TypeMap`](crate::TypeMap) or
    /// declaring explicit mappings.
    ConfigurationError => "ModelMapper configuration errors"
}

batched_error! {
    /// Problems found while mapping one object graph.
    MappingError => "ModelMapper mapping errors"
}

batched_error! {
    /// Destination (or, when strict, source) properties left without mapping.
    ValidationError => "ModelMapper validation errors"
}

// -----------------------------------------------------------------------------
// Error

/// Every failure a [`ModelMapper`](crate::ModelMapper) operation can report.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// All messages of the wrapped error.
    pub fn messages(&self) -> &[ErrorMessage] {
        match self {
            Self::Configuration(e) => e.messages(),
            Self::Mapping(e) => e.messages(),
            Self::Validation(e) => e.messages(),
        }
    }
}

// -----------------------------------------------------------------------------
// ConvertError

/// Failure reported by a [`Converter`](crate::convert::Converter).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("{0}")]
    Message(String),

    /// A nested build failed; passed through unchanged.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Other(Box<dyn StdError + Send + Sync + 'static>),
}

impl ConvertError {
    #[inline]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[inline]
    pub fn other(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }
}

impl From<vc_reflect::ReflectError> for ConvertError {
    #[inline]
    fn from(value: vc_reflect::ReflectError) -> Self {
        Self::other(value)
    }
}

// -----------------------------------------------------------------------------
// Errors

/// Accumulates messages during one build or one mapping call.
#[derive(Debug, Default, Clone)]
pub(crate) struct Errors {
    messages: Vec<ErrorMessage>,
}

impl Errors {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(ErrorMessage::new(message));
        self
    }

    #[inline]
    pub fn add_with_cause(&mut self, message: impl Into<String>, cause: Cause) -> &mut Self {
        self.messages.push(ErrorMessage::with_cause(message, cause));
        self
    }

    #[inline]
    pub fn merge(&mut self, messages: impl IntoIterator<Item = ErrorMessage>) {
        self.messages.extend(messages);
    }

    #[cfg(test)]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[inline]
    pub fn take(&mut self) -> Vec<ErrorMessage> {
        core::mem::take(&mut self.messages)
    }

    pub fn into_configuration(self) -> Result<(), ConfigurationError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::new(self.messages))
        }
    }

    pub fn into_mapping(self) -> Result<(), MappingError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(MappingError::new(self.messages))
        }
    }

    pub fn into_validation(self) -> Result<(), ValidationError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.messages))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::error::Error as _;

    use super::{ConfigurationError, ErrorMessage, Errors, MappingError};

    #[test]
    fn display_numbers_messages() {
        let error = ConfigurationError::new(vec![
            ErrorMessage::new("first"),
            ErrorMessage::new("second"),
        ]);
        let text = error.to_string();
        assert!(text.starts_with("ModelMapper configuration errors:\n\n1) first\n"));
        assert!(text.contains("2) second"));
        assert!(text.ends_with("2 errors"));

        let single = MappingError::message("only");
        assert!(single.to_string().ends_with("1 error"));
    }

    #[test]
    fn single_cause_is_exposed() {
        let cause = Arc::new(vc_reflect::ReflectError::custom("boom"));
        let error = MappingError::new(vec![
            ErrorMessage::with_cause("failed", cause.clone()),
            ErrorMessage::new("other"),
        ]);
        assert_eq!(error.source().map(ToString::to_string), Some("boom".into()));
        assert!(error.to_string().contains("Caused by: boom"));

        let two = MappingError::new(vec![
            ErrorMessage::with_cause("a", cause.clone()),
            ErrorMessage::with_cause("b", cause),
        ]);
        assert!(two.source().is_none());
    }

    #[test]
    fn accumulator_converts_when_non_empty() {
        assert!(Errors::new().into_configuration().is_ok());

        let mut errors = Errors::new();
        errors.add("x").add("y");
        let taken = errors.take();
        assert_eq!(taken.len(), 2);
        assert!(errors.clone().into_mapping().is_ok());

        errors.merge(taken);
        let error = errors.into_mapping().unwrap_err();
        assert_eq!(error.messages().len(), 2);
    }
}
