//! Error types for schema synthesis and field resolution.
//!
//! Every failure in this crate is structural: a domain type that cannot be
//! described, a field that cannot be read, or an instance handed to the wrong
//! accessor. None of them are retryable.

use async_graphql::ErrorExtensions;

/// Errors that can occur while synthesizing or resolving schema types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphTypeError {
    /// A declared field is not readable on its declaring type.
    #[error("Cannot bind field {type_name}.{field}: {reason}")]
    Binding {
        /// Declaring domain type.
        type_name: String,
        /// Field that could not be bound.
        field: String,
        /// Why binding failed.
        reason: String,
    },

    /// A domain type has a shape that cannot be turned into a schema type.
    #[error("Cannot synthesize {}: {reason}", display_location(.type_name, .field))]
    Synthesis {
        /// Offending domain type.
        type_name: String,
        /// Offending field, when the failure happened inside a field.
        field: Option<String>,
        /// Why synthesis failed.
        reason: String,
    },

    /// An instance passed to an accessor is not of the accessor's declaring type.
    #[error("Accessor for {type_name}.{field} received an instance of {actual}")]
    AccessorFailure {
        /// Declaring domain type expected by the accessor.
        type_name: String,
        /// Field the accessor reads.
        field: String,
        /// Type of the instance actually received.
        actual: String,
    },

    /// A configuration callback or registration is invalid.
    #[error("Invalid configuration for {type_name}: {reason}")]
    Configuration {
        /// Domain type the configuration targets.
        type_name: String,
        /// What was wrong.
        reason: String,
    },

    /// The data-access collaborator failed to produce instances.
    #[error("Data source error: {0}")]
    Source(String),

    /// Lowering to an executable schema failed.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),
}

fn display_location(type_name: &str, field: &Option<String>) -> String {
    match field {
        Some(field) => format!("{type_name}.{field}"),
        None => type_name.to_string(),
    }
}

impl GraphTypeError {
    /// Creates a new `Binding` error.
    #[must_use]
    pub fn binding(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Binding {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Synthesis` error not tied to a specific field.
    #[must_use]
    pub fn synthesis(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Synthesis {
            type_name: type_name.into(),
            field: None,
            reason: reason.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Source` error.
    #[must_use]
    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Attaches the enclosing type and field to a synthesis error that has no
    /// field location yet. Other errors are returned unchanged.
    #[must_use]
    pub fn within_field(self, type_name: &str, field: &str) -> Self {
        match self {
            Self::Synthesis {
                field: None,
                reason,
                type_name: inner,
            } => Self::Synthesis {
                type_name: type_name.to_string(),
                field: Some(field.to_string()),
                reason: format!("{reason} (resolving {inner})"),
            },
            other => other,
        }
    }

    /// Returns the error code used in GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Binding { .. } => "BINDING_ERROR",
            Self::Synthesis { .. } => "SYNTHESIS_ERROR",
            Self::AccessorFailure { .. } => "ACCESSOR_FAILURE",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Source(_) => "SOURCE_ERROR",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
        }
    }

    /// Returns whether the error should abort startup rather than surface per query.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AccessorFailure { .. } | Self::Source(_))
    }

    /// Converts the error into a GraphQL error carrying a `code` extension.
    #[must_use]
    pub fn into_graphql(self) -> async_graphql::Error {
        let code = self.error_code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphTypeError::binding("Loja", "Nome", "no reader").error_code(),
            "BINDING_ERROR"
        );
        assert_eq!(
            GraphTypeError::synthesis("Vec<Vec<i32>>", "nested").error_code(),
            "SYNTHESIS_ERROR"
        );
        assert_eq!(
            GraphTypeError::source_failed("down").error_code(),
            "SOURCE_ERROR"
        );
    }

    #[test]
    fn test_within_field_adds_location_once() {
        let err = GraphTypeError::synthesis("Vec<Vec<i32>>", "nested collections are not supported")
            .within_field("Grid", "cells")
            .within_field("Outer", "grid");

        match &err {
            GraphTypeError::Synthesis {
                type_name, field, ..
            } => {
                assert_eq!(type_name, "Grid");
                assert_eq!(field.as_deref(), Some("cells"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Cannot synthesize Grid.cells"));
    }

    #[test]
    fn test_fatality() {
        assert!(GraphTypeError::binding("A", "b", "c").is_fatal());
        assert!(GraphTypeError::configuration("A", "b").is_fatal());
        assert!(!GraphTypeError::source_failed("x").is_fatal());
        assert!(
            !GraphTypeError::AccessorFailure {
                type_name: "A".into(),
                field: "b".into(),
                actual: "C".into(),
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_into_graphql_sets_code() {
        let err = GraphTypeError::source_failed("database offline").into_graphql();
        assert!(err.message.contains("database offline"));
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(
            code,
            Some(async_graphql::Value::String("SOURCE_ERROR".to_string()))
        );
    }
}
