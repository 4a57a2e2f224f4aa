//! The explicitly constructed framework runtime.
//!
//! One [`Runtime`] owns the root application and the registry of every
//! application created through it. The root is an implicit ancestor of any
//! application created without explicit parents, so framework-level
//! registrations made on it are inherited everywhere. Passing the runtime
//! around (rather than reaching for an ambient global) keeps application
//! composition testable.

use crate::app::App;
use manifold_core::ConfigError;
use std::sync::{Arc, Mutex, PoisonError};

/// The framework runtime: root application plus the discovery registry of
/// created applications.
#[derive(Debug)]
pub struct Runtime {
    root: Arc<App>,
    apps: Mutex<Vec<Arc<App>>>,
}

impl Runtime {
    /// Create a runtime with an empty root application named `"global"`.
    pub fn new() -> Self {
        Self {
            root: App::create("global", Vec::new()),
            apps: Mutex::new(Vec::new()),
        }
    }

    /// The root application. Every application created without explicit
    /// parents extends it.
    pub fn root(&self) -> &Arc<App> {
        &self.root
    }

    /// Create an application extending the root implicitly.
    pub fn app(&self, name: &str) -> Arc<App> {
        self.app_extending(name, &[])
    }

    /// Create an application with an explicit ordered parent list. An
    /// empty list falls back to the implicit root parent. Order matters:
    /// earlier parents take precedence at equal inheritance depth.
    pub fn app_extending(&self, name: &str, parents: &[&Arc<App>]) -> Arc<App> {
        let extends = if parents.is_empty() {
            vec![Arc::clone(&self.root)]
        } else {
            parents.iter().map(|parent| Arc::clone(parent)).collect()
        };
        let app = App::create(name, extends);
        self.apps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&app));
        app
    }

    /// A snapshot of every application created through this runtime, in
    /// creation order. This is the registry a scanning pass iterates.
    pub fn apps(&self) -> Vec<Arc<App>> {
        self.apps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Commit the root and every created application, in creation order,
    /// failing fast on the first configuration error.
    pub fn commit(&self) -> Result<(), ConfigError> {
        self.root.commit()?;
        for app in self.apps() {
            app.commit()?;
        }
        Ok(())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
