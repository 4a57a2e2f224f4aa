//! Request-scoped mounts and their contexts.
//!
//! A [`Mount`] binds an application instance to a context for the duration
//! of one request. Mounts compose: when routing delegates a path to a child
//! application, the publisher creates a child mount (with a context derived
//! from path variables) under the current one and continues traversal there.
//! Mounts are never shared across requests.

use crate::app::App;
use manifold_core::Variables;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Arbitrary key/value parameters supplied by a mounting caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context(HashMap<String, String>);

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Read a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for Context {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// Derives a mount context from the path variables of the mount match.
pub type ContextFactory = Arc<dyn Fn(&Variables) -> Context + Send + Sync>;

type ContextProducer = Box<dyn Fn() -> Context + Send>;

/// A request-scoped binding of an application to a context.
pub struct Mount {
    app: Arc<App>,
    producer: ContextProducer,
    resolved: OnceCell<Context>,
    children: HashMap<String, Mount>,
}

impl Mount {
    /// Create a mount with a deferred context producer.
    ///
    /// The producer runs lazily because context values may depend on path
    /// variables not known when the mount is constructed.
    pub fn new(app: Arc<App>, producer: impl Fn() -> Context + Send + 'static) -> Self {
        Self {
            app,
            producer: Box::new(producer),
            resolved: OnceCell::new(),
            children: HashMap::new(),
        }
    }

    /// Create a root mount with an already-known context.
    pub fn root(app: Arc<App>, context: Context) -> Self {
        Self::new(app, move || context.clone())
    }

    /// The application this mount binds.
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Resolve the mount context, invoking the producer at most once per
    /// mount instance. Repeat calls return the memoized value; producers may
    /// be expensive or side-effecting.
    pub fn resolve_context(&self) -> &Context {
        self.resolved.get_or_init(|| (self.producer)())
    }

    /// Look up an already-resolved child mount by name.
    pub fn child(&self, name: &str) -> Option<&Mount> {
        self.children.get(name)
    }

    /// Get or create the child mount registered under `name`.
    pub(crate) fn child_entry(
        &mut self,
        name: impl Into<String>,
        make: impl FnOnce() -> Mount,
    ) -> &mut Mount {
        self.children.entry(name.into()).or_insert_with(make)
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("app", &self.app.name())
            .field("resolved", &self.resolved.get().is_some())
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}
