//! # manifold-core
//!
//! Core traits and exchange types for the Manifold dispatch framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! transports, routers, and extensions that don't need the full `manifold`
//! implementation.
//!
//! # The Seams
//!
//! Manifold treats three collaborators as external, and this crate holds
//! the interfaces they plug into:
//!
//! - **Transport**: a server loop hands the entry application a
//!   [`RawRequest`] and receives a [`Response`] back. Manifold never parses
//!   sockets or speaks HTTP itself.
//! - **Path router**: a [`PathRouter`] turns a path remainder into a routed
//!   value plus extracted [`Variables`]. The `manifold` crate ships a
//!   matchit-backed default, but any implementation of the trait will do.
//! - **Scanner**: startup discovery feeds configuration actions into an
//!   application; the action types themselves live in `manifold` since they
//!   reference its registries.
//!
//! # Dispatch Keys
//!
//! Behavior is registered under a ([`Capability`], [`Signature`]) pair: an
//! abstract operation name plus an ordered tuple of argument type
//! descriptors ([`TypeSpec`]). Resolution picks the most specific compatible
//! registration; see the `manifold` crate for the ranking rules.
//!
//! # Error Types
//!
//! - [`ManifoldError`] - top-level error type
//! - [`ConfigError`] - configuration commit failures
//! - [`LookupError`] - dispatch resolution failures
//! - [`RouteError`] - path routing failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod capability;
mod error;
mod routing;
mod transport;

// Re-exports
pub use capability::{Capability, Signature, TypeInfo, TypeSpec};
pub use error::{BoxError, ConfigError, LookupError, ManifoldError, RouteError};
pub use routing::{PathMatch, PathRouter, Variables};
pub use transport::{RawRequest, Response};
