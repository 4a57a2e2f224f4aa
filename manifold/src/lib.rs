//! # manifold — Composable Application Dispatch Core
//!
//! `manifold` is the dispatch core of a request-handling runtime:
//! independently defined applications compose by extension/override, each
//! application's registered behavior is merged into a cached lookup, and an
//! inbound request is routed through a chain of mounted applications to the
//! handler that produces its response.
//!
//! ## Quick Start
//!
//! ```rust
//! use manifold::{RawRequest, Response, Runtime, Variables};
//!
//! struct Item { id: u64 }
//!
//! let runtime = Runtime::new();
//! let app = runtime.app("shop");
//!
//! // Registration phase: routes and views accumulate as actions.
//! app.path::<Item, _>("/items/{id}", |vars: &Variables| {
//!     vars.get("id").and_then(|raw| raw.parse().ok()).map(|id| Item { id })
//! });
//! app.view::<Item, _>("GET", |item, _request, _context| {
//!     Ok(Response::ok(format!("item {}", item.id)))
//! });
//!
//! // Commit finalizes the layer; conflicts are rejected here, loudly.
//! runtime.commit().expect("configuration is conflict-free");
//!
//! // Serving phase: the application is the callable entry point.
//! let response = app.handle(RawRequest::get("/items/42"));
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), "item 42");
//! ```
//!
//! ## Composition
//!
//! Applications extend other applications: a descendant's registrations
//! always shadow its ancestors', and conflicting registrations within one
//! application are rejected at commit time. Mounting embeds one application
//! inside another at request time, with a context derived from the mount
//! pattern's path variables.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod app;
mod cache;
mod config;
mod dispatch;
mod lookup;
mod mount;
mod publish;
mod request;
mod router;
mod runtime;
pub mod testing;

// Re-exports from manifold-core
pub use manifold_core::{
    BoxError, Capability, ConfigError, LookupError, ManifoldError, PathMatch, PathRouter,
    RawRequest, Response, RouteError, Signature, TypeInfo, TypeSpec, Variables,
};

pub use app::App;
pub use cache::LookupCache;
pub use config::{Action, ConfigRegistry, ConfigSource, Identity};
pub use dispatch::{AnyModel, DispatchIndex, ModelFactory, View, ViewEntry};
pub use lookup::Lookup;
pub use mount::{Context, ContextFactory, Mount};
pub use publish::publish;
pub use request::Request;
pub use router::{RouteTable, RouteTarget, TrajectRouter, TrajectRouterBuilder};
pub use runtime::Runtime;
