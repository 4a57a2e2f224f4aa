//! Composable applications.
//!
//! An [`App`] is the composable unit: it owns a configuration registry, a
//! dispatch layer, a route table, and a cached lookup, and may extend any
//! number of parent applications. Its effective behavior is its own layer
//! merged on top of all ancestors', own registrations always winning.
//!
//! The lifecycle is two-phased: configuration actions accumulate during the
//! registration phase, [`App::commit`] finalizes them (rejecting in-layer
//! conflicts), and only then does the application serve requests through
//! its callable entry point [`App::handle`].

use crate::cache::LookupCache;
use crate::config::{Action, ConfigRegistry, ConfigSource};
use crate::dispatch::{DispatchIndex, ModelFactory, View};
use crate::lookup::Lookup;
use crate::mount::{Context, Mount};
use crate::publish::publish;
use crate::request::Request;
use crate::router::RouteTable;
use manifold_core::{
    BoxError, Capability, ConfigError, RawRequest, Response, Signature, TypeInfo, Variables,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A composable application.
pub struct App {
    name: String,
    extends: Vec<Arc<App>>,
    config: Mutex<ConfigRegistry>,
    // The own dispatch layer. Index and route table live under one lock
    // and are always swapped as a pair, so a concurrent lookup build can
    // never pair one commit's index with another commit's routes.
    layer: RwLock<(DispatchIndex, RouteTable)>,
    cache: LookupCache,
    epoch: AtomicU64,
}

impl App {
    /// Create an application extending the given parents, in precedence
    /// order. Applications are created through a
    /// [`Runtime`](crate::runtime::Runtime), which supplies the implicit
    /// root parent.
    pub(crate) fn create(name: impl Into<String>, extends: Vec<Arc<App>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            extends,
            config: Mutex::new(ConfigRegistry::new()),
            layer: RwLock::new((DispatchIndex::default(), RouteTable::default())),
            cache: LookupCache::new(),
            epoch: AtomicU64::new(0),
        })
    }

    /// The application name. Used only in diagnostics; not a uniqueness
    /// key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent applications, in declared precedence order.
    pub fn extends(&self) -> &[Arc<App>] {
        &self.extends
    }

    /// The current registration epoch. Moves on every commit or clear;
    /// lookup snapshots use it to detect staleness across the whole
    /// extension chain.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// A consistent (index, routes) snapshot taken under one lock
    /// acquisition.
    pub(crate) fn layer_snapshot(&self) -> (DispatchIndex, RouteTable) {
        self.layer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mutated(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate();
    }

    // ------------------------------------------------------------------
    // Registration phase
    // ------------------------------------------------------------------

    /// Queue one configuration action.
    pub fn register(&self, action: Action) {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(action);
    }

    /// Queue all actions a source object declares. This is the entry point
    /// the scanning collaborator calls during startup discovery.
    pub fn configurable(&self, source: &dyn ConfigSource) {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from(source);
    }

    /// Register a terminal route pattern backed by a typed model factory.
    pub fn path<T, F>(&self, pattern: &str, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Variables) -> Option<T> + Send + Sync + 'static,
    {
        self.register(Action::route(pattern, ModelFactory::of(factory)));
    }

    /// Register a view for `capability` dispatched on model type `T`.
    pub fn view<T, F>(&self, capability: &str, handler: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Request, &Context) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        self.register(Action::view(
            Capability::from(capability),
            Signature::single::<T>(),
            View::of::<T, _>(handler),
        ));
    }

    /// Register a view marked as an explicit override of a same-identity
    /// sibling registration in this layer.
    pub fn view_override<T, F>(&self, capability: &str, handler: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Request, &Context) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        self.register(
            Action::view(
                Capability::from(capability),
                Signature::single::<T>(),
                View::of::<T, _>(handler),
            )
            .overriding(),
        );
    }

    /// Mount a child application under a path pattern. The context factory
    /// derives the child mount's context from the pattern's path variables
    /// at request time.
    pub fn mount<F>(&self, pattern: &str, child: &Arc<App>, context: F)
    where
        F: Fn(&Variables) -> Context + Send + Sync + 'static,
    {
        self.register(Action::mount_point(
            pattern,
            Arc::clone(child),
            Arc::new(context),
        ));
    }

    /// Declare that `Sub` dispatches to registrations for `Super` at one
    /// extra specificity hop.
    pub fn isa<Sub: 'static, Super: 'static>(&self) {
        self.register(Action::isa(TypeInfo::of::<Sub>(), TypeInfo::of::<Super>()));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Finalize the accumulated configuration into this application's own
    /// layer.
    ///
    /// On conflict the layer is left empty and unusable; fix the
    /// registrations and commit again.
    pub fn commit(&self) -> Result<(), ConfigError> {
        let finalized = self
            .config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finalize(&self.name);

        match finalized {
            Ok(layer) => {
                *self.layer.write().unwrap_or_else(PoisonError::into_inner) = layer;
                self.mutated();
                tracing::debug!(app = %self.name, "configuration committed");
                Ok(())
            }
            Err(err) => {
                *self.layer.write().unwrap_or_else(PoisonError::into_inner) =
                    (DispatchIndex::default(), RouteTable::default());
                self.mutated();
                tracing::error!(app = %self.name, error = %err, "configuration commit failed");
                Err(err)
            }
        }
    }

    /// Reset this application's own registrations to empty and invalidate
    /// its cached lookup. Parents and children keep their own state;
    /// descendant lookups that merged this layer go stale and rebuild on
    /// next access.
    pub fn clear(&self) {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.layer.write().unwrap_or_else(PoisonError::into_inner) =
            (DispatchIndex::default(), RouteTable::default());
        self.mutated();
        tracing::debug!(app = %self.name, "registrations cleared");
    }

    // ------------------------------------------------------------------
    // Serving phase
    // ------------------------------------------------------------------

    /// The memoized merged lookup for this application, built on first
    /// call.
    pub fn lookup(self: &Arc<Self>) -> Arc<Lookup> {
        self.cache.get(self)
    }

    /// Build a request bound once, immutably, to this application's
    /// current lookup.
    pub fn bind_request(self: &Arc<Self>, raw: RawRequest) -> Request {
        Request::bind(raw, self.lookup())
    }

    /// Wrap this application in a root mount carrying `context`.
    pub fn as_mount(self: &Arc<Self>, context: Context) -> Mount {
        Mount::root(Arc::clone(self), context)
    }

    /// The callable entry point: handle one inbound request with an empty
    /// context.
    pub fn handle(self: &Arc<Self>, raw: RawRequest) -> Response {
        self.handle_in_context(raw, Context::new())
    }

    /// Handle one inbound request mounted in the given context.
    pub fn handle_in_context(self: &Arc<Self>, raw: RawRequest, context: Context) -> Response {
        let mut request = self.bind_request(raw);
        let root = self.as_mount(context);
        publish(&mut request, root)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field(
                "extends",
                &self.extends.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
