//! Path-routing abstraction layer.
//!
//! The URL-to-handler matching table is an external collaborator: Manifold
//! only requires something that resolves a path remainder into a routed
//! value plus extracted variables. The `manifold` crate ships a
//! matchit-backed default implementation of this trait.

use std::collections::HashMap;

/// Path variables extracted by a router match (`name` → raw value).
pub type Variables = HashMap<String, String>;

/// Result of a path-routing lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch<'a, V> {
    /// The path matched, with the routed value and extracted variables.
    Found {
        /// The routed value.
        value: &'a V,
        /// Variables extracted from the path.
        variables: Variables,
    },
    /// No matching route.
    NotFound,
}

impl<'a, V> PathMatch<'a, V> {
    /// Returns true if the path matched.
    pub fn is_found(&self) -> bool {
        matches!(self, PathMatch::Found { .. })
    }

    /// Returns the matched value, discarding variables.
    pub fn value(self) -> Option<&'a V> {
        match self {
            PathMatch::Found { value, .. } => Some(value),
            PathMatch::NotFound => None,
        }
    }
}

/// A router that resolves paths to values.
///
/// Implementations own their matching strategy; Manifold only consumes
/// this interface during publishing.
pub trait PathRouter<V>: Send + Sync {
    /// Resolve a path into a value plus extracted variables.
    fn resolve(&self, path: &str) -> PathMatch<'_, V>;

    /// Check whether a path would match.
    fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_found()
    }
}
