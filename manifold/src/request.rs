//! Requests bound to an application's dispatch lookup.

use crate::lookup::Lookup;
use manifold_core::{RawRequest, Variables};
use std::sync::Arc;

/// One inbound request, bound at creation to the entry application's
/// lookup.
///
/// The lookup handle is assigned exactly once and stays fixed for the life
/// of the request; the path-traversal cursor is mutated only by the
/// publisher during dispatch.
pub struct Request {
    raw: RawRequest,
    lookup: Arc<Lookup>,
    remaining: String,
    variables: Variables,
}

impl Request {
    pub(crate) fn bind(raw: RawRequest, lookup: Arc<Lookup>) -> Self {
        let remaining = raw.path.clone();
        Self {
            raw,
            lookup,
            remaining,
            variables: Variables::new(),
        }
    }

    /// The request method, used as the dispatch capability.
    pub fn method(&self) -> &str {
        &self.raw.method
    }

    /// The full request path as received from the transport.
    pub fn path(&self) -> &str {
        &self.raw.path
    }

    /// The request body.
    pub fn body(&self) -> &[u8] {
        &self.raw.body
    }

    /// The lookup this request dispatches through.
    pub fn lookup(&self) -> &Arc<Lookup> {
        &self.lookup
    }

    /// The not-yet-routed tail of the path.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// Path variables of the terminal route match. Empty until the
    /// publisher reaches a terminal target.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    // Cursor state is owned by the publisher during dispatch.
    pub(crate) fn advance(&mut self, rest: String) {
        self.remaining = rest;
    }

    pub(crate) fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
    }
}
