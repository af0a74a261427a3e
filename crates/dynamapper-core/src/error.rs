//! Error types for the Dynamapper core library
//!
//! This module defines the error handling system for the mapping engine,
//! using thiserror for the error definitions and anyhow to carry failures
//! raised by user-supplied accessors.

use std::fmt;
use thiserror::Error;

/// Main error type for mapping and copy operations
#[derive(Error, Debug)]
pub enum MapperError {
    /// A required accessor was not found on the source type
    #[error("No accessor '{accessor}' found on '{source_type}' ({strategy} binding)")]
    Lookup {
        accessor: String,
        source_type: String,
        strategy: BindingKind,
    },

    /// A type could not be constructed
    #[error("Cannot instantiate '{type_name}': {reason}")]
    Instantiation { type_name: String, reason: String },

    /// An accessor exists but failed while being invoked
    #[error("Accessor '{accessor}' on '{source_type}' failed: {source}")]
    Invocation {
        accessor: String,
        source_type: String,
        #[source]
        source: anyhow::Error,
    },

    /// The value shape cannot be mapped into the requested destination
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The type registry is inconsistent
    #[error("Registration error: {message}")]
    Registration { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, MapperError>;

/// Which binding strategy was active when a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Accessor named by a field tag
    Explicit,
    /// Accessor derived from the field name
    Convention,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Explicit => write!(f, "explicit"),
            BindingKind::Convention => write!(f, "convention"),
        }
    }
}

impl MapperError {
    /// Create a lookup error
    pub fn lookup(
        accessor: impl Into<String>,
        source_type: impl Into<String>,
        strategy: BindingKind,
    ) -> Self {
        Self::Lookup {
            accessor: accessor.into(),
            source_type: source_type.into(),
            strategy,
        }
    }

    /// Create an instantiation error
    pub fn instantiation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a registration error
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// True when the error points at a mismatch between the two type
    /// definitions rather than at a failure inside user code
    pub fn is_configuration_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Lookup { .. } | Self::TypeMismatch { .. } | Self::Registration { .. }
        )
    }
}

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for MapperError {
    fn from(err: serde_yaml::Error) -> Self {
        MapperError::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for MapperError {
    fn from(err: std::io::Error) -> Self {
        MapperError::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MapperError::lookup("getName", "Person", BindingKind::Explicit);
        assert_eq!(
            err.to_string(),
            "No accessor 'getName' found on 'Person' (explicit binding)"
        );
    }

    #[test]
    fn test_invocation_keeps_cause() {
        let err = MapperError::Invocation {
            accessor: "getAge".to_string(),
            source_type: "Person".to_string(),
            source: anyhow::anyhow!("age not loaded"),
        };
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("age not loaded"));
    }

    #[test]
    fn test_configuration_mismatch_classification() {
        assert!(MapperError::lookup("getX", "T", BindingKind::Convention).is_configuration_mismatch());
        assert!(MapperError::type_mismatch("Person", "Array").is_configuration_mismatch());
        assert!(!MapperError::instantiation("T", "no constructor").is_configuration_mismatch());
    }
}
