//! Testing utilities for Manifold.
//!
//! Small probes used by the integration suites (and available to
//! downstream crates testing their own applications):
//!
//! - [`ViewRecorder`]: builds views that count their invocations
//! - [`ContextProbe`]: builds context factories that count how often the
//!   producer actually runs

use crate::dispatch::View;
use crate::mount::{Context, ContextFactory};
use manifold_core::{Response, Variables};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds views that record how many times they were invoked.
#[derive(Clone, Default)]
pub struct ViewRecorder {
    hits: Arc<AtomicUsize>,
}

impl ViewRecorder {
    /// Create a recorder with zero hits.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times views built from this recorder have run.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Build a view for model type `T` that responds 200 with `body`.
    pub fn view<T: Send + Sync + 'static>(&self, body: &'static str) -> View {
        let hits = Arc::clone(&self.hits);
        View::of::<T, _>(move |_, _, _| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(Response::ok(body))
        })
    }
}

/// Builds context factories that count producer invocations.
#[derive(Clone, Default)]
pub struct ContextProbe {
    calls: Arc<AtomicUsize>,
}

impl ContextProbe {
    /// Create a probe with zero calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times factories built from this probe have produced a
    /// context.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Build a context factory copying every mount variable into the
    /// context.
    pub fn factory(&self) -> ContextFactory {
        let calls = Arc::clone(&self.calls);
        Arc::new(move |variables: &Variables| {
            calls.fetch_add(1, Ordering::SeqCst);
            let mut context = Context::new();
            for (key, value) in variables {
                context.insert(key.clone(), value.clone());
            }
            context
        })
    }
}
