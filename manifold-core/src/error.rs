//! Error types for Manifold.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ManifoldError`] - Top-level error type for all Manifold operations
//! - [`ConfigError`] - Errors raised while finalizing configuration
//! - [`LookupError`] - Errors raised while resolving a dispatch capability
//! - [`RouteError`] - Errors from path routing

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Manifold operations.
#[derive(Error, Debug)]
pub enum ManifoldError {
    /// An error occurred while committing configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An error occurred while resolving a capability.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// An error occurred during path routing.
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while finalizing an application's configuration.
///
/// These are fatal to that application's configuration: the registrations
/// must be fixed and committed again, never retried as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two non-overriding actions registered the same identity in one layer.
    #[error("conflicting registrations for {identity} in application {layer:?}")]
    Conflict {
        /// Name of the application layer holding the conflicting actions.
        layer: String,
        /// The identity both actions registered under.
        identity: String,
    },

    /// A registered path pattern was rejected by the router backend.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidRoute {
        /// The offending pattern.
        pattern: String,
        /// Why the router backend rejected it.
        reason: String,
    },
}

/// Errors raised while resolving a capability against argument types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Multiple equally-specific dispatch candidates at equal inheritance
    /// distance. Never silently resolved.
    #[error("ambiguous dispatch for capability {capability:?}: {candidates} equally specific candidates")]
    Ambiguous {
        /// The capability being resolved.
        capability: String,
        /// How many candidates tied.
        candidates: usize,
    },

    /// No registration matches the argument types anywhere in the ancestry.
    #[error("no component found for capability {capability:?}")]
    NotFound {
        /// The capability being resolved.
        capability: String,
    },
}

/// Errors from path routing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path router has no match for the given path.
    #[error("no route found for path: {0}")]
    NotFound(String),
}

// Convenience conversion
impl From<BoxError> for ManifoldError {
    fn from(err: BoxError) -> Self {
        ManifoldError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let conflict = ConfigError::Conflict {
            layer: "billing".to_string(),
            identity: "view GET (Invoice)".to_string(),
        };
        assert_eq!(
            conflict.to_string(),
            "conflicting registrations for view GET (Invoice) in application \"billing\""
        );

        let ambiguous = LookupError::Ambiguous {
            capability: "GET".to_string(),
            candidates: 2,
        };
        assert_eq!(
            ambiguous.to_string(),
            "ambiguous dispatch for capability \"GET\": 2 equally specific candidates"
        );

        let miss = RouteError::NotFound("/missing".to_string());
        assert_eq!(miss.to_string(), "no route found for path: /missing");
    }

    #[test]
    fn test_top_level_conversions() {
        let err: ManifoldError = LookupError::NotFound {
            capability: "GET".to_string(),
        }
        .into();
        assert!(matches!(err, ManifoldError::Lookup(_)));

        let err: ManifoldError = RouteError::NotFound("/x".to_string()).into();
        assert!(matches!(err, ManifoldError::Route(_)));
    }
}
