//! Route tables and the matchit-backed default path router.
//!
//! Each application owns a [`RouteTable`]: the (pattern, target) pairs its
//! configuration registered. The merged, queryable router is built from
//! those tables at lookup time, shallow layers first so descendant patterns
//! shadow ancestor ones. [`TrajectRouter`] is the default [`PathRouter`]
//! backend, using `matchit`'s `{param}` / `{*rest}` syntax.

use crate::app::App;
use crate::dispatch::ModelFactory;
use crate::mount::ContextFactory;
use manifold_core::{ConfigError, PathMatch, PathRouter};
use std::fmt;
use std::sync::Arc;

/// Variable name capturing the delegated path tail under a mount pattern.
pub(crate) const REMAINDER: &str = "__remainder";

/// What a route pattern resolves to.
#[derive(Clone)]
pub enum RouteTarget {
    /// A terminal target: build a model and dispatch a view on it.
    Model(ModelFactory),
    /// Delegation to a child application mounted under this pattern.
    Delegate {
        /// The mounted child application.
        app: Arc<App>,
        /// Derives the child mount's context from the mount variables.
        context: ContextFactory,
    },
}

impl fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Model(_) => f.write_str("Model"),
            RouteTarget::Delegate { app, .. } => write!(f, "Delegate({})", app.name()),
        }
    }
}

/// One application's own route registrations.
///
/// Kept as ordered (pattern, target) pairs so lookup merging can rebuild a
/// combined [`TrajectRouter`] across the whole extension chain.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<(String, RouteTarget)>,
}

impl RouteTable {
    /// Register a terminal route.
    pub fn add_model(&mut self, pattern: String, factory: ModelFactory) -> Result<(), ConfigError> {
        validate(&pattern)?;
        self.entries.push((pattern, RouteTarget::Model(factory)));
        Ok(())
    }

    /// Register a mount point: the pattern itself plus a catch-all for
    /// everything below it, both delegating to the child application.
    pub fn add_delegate(
        &mut self,
        pattern: String,
        app: Arc<App>,
        context: ContextFactory,
    ) -> Result<(), ConfigError> {
        validate(&pattern)?;
        let tail = format!("{}/{{*{}}}", pattern.trim_end_matches('/'), REMAINDER);
        validate(&tail)?;

        let target = RouteTarget::Delegate { app, context };
        self.entries.push((pattern, target.clone()));
        self.entries.push((tail, target));
        Ok(())
    }

    /// The registered (pattern, target) pairs in registration order.
    pub fn entries(&self) -> &[(String, RouteTarget)] {
        &self.entries
    }

    /// True when no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate(pattern: &str) -> Result<(), ConfigError> {
    let mut probe = matchit::Router::new();
    probe
        .insert(pattern, ())
        .map_err(|err| ConfigError::InvalidRoute {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
}

/// The matchit-backed default path router.
pub struct TrajectRouter<V> {
    inner: matchit::Router<V>,
}

impl<V: Send + Sync> PathRouter<V> for TrajectRouter<V> {
    fn resolve(&self, path: &str) -> PathMatch<'_, V> {
        match self.inner.at(path) {
            Ok(matched) => PathMatch::Found {
                value: matched.value,
                variables: matched
                    .params
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            },
            Err(_) => PathMatch::NotFound,
        }
    }
}

/// Builder for [`TrajectRouter`].
pub struct TrajectRouterBuilder<V> {
    inner: matchit::Router<V>,
}

impl<V> Default for TrajectRouterBuilder<V> {
    fn default() -> Self {
        Self {
            inner: matchit::Router::new(),
        }
    }
}

impl<V> TrajectRouterBuilder<V> {
    /// Insert a pattern. Returns `false` when the pattern is already taken,
    /// which during lookup merging means an earlier (shallower) layer
    /// shadowed it.
    pub fn insert(&mut self, pattern: &str, value: V) -> bool {
        self.inner.insert(pattern, value).is_ok()
    }

    /// Freeze the router.
    pub fn build(self) -> TrajectRouter<V> {
        TrajectRouter { inner: self.inner }
    }
}
