//! Type-erased views, model factories, and the per-application dispatch
//! layer.
//!
//! A [`View`] is the implementation side of a dispatch registration: a
//! type-erased callable invoked with the routed model, the request, and the
//! resolved mount context. [`View::of`] bridges strongly-typed handler
//! closures into the erased form, downcasting the model internally.

use crate::mount::Context;
use crate::request::Request;
use manifold_core::{BoxError, Capability, Response, Signature, TypeInfo, Variables};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A routed model instance, type-erased for dispatch.
pub type AnyModel = Box<dyn Any + Send + Sync>;

type ViewFn =
    dyn Fn(&(dyn Any + Send + Sync), &Request, &Context) -> Result<Response, BoxError> + Send + Sync;

/// A type-erased view implementation.
#[derive(Clone)]
pub struct View(Arc<ViewFn>);

impl View {
    /// Wrap a typed handler, downcasting the model to `T` at call time.
    ///
    /// The dispatch index only resolves a view for arguments matching its
    /// registered signature, so the downcast failing means a registration
    /// was made with a signature that doesn't describe its handler; that is
    /// reported as a handler error rather than a panic.
    pub fn of<T, F>(handler: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Request, &Context) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |model, request, context| {
            let model = model.downcast_ref::<T>().ok_or_else(|| -> BoxError {
                format!(
                    "view registered for {} invoked with a different model type",
                    TypeInfo::of::<T>()
                )
                .into()
            })?;
            handler(model, request, context)
        }))
    }

    /// Invoke the view.
    pub fn invoke(
        &self,
        model: &(dyn Any + Send + Sync),
        request: &Request,
        context: &Context,
    ) -> Result<Response, BoxError> {
        (self.0)(model, request, context)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("View")
    }
}

/// Builds a model instance from resolved path variables.
///
/// Returning `None` means the variables do not denote an instance (for
/// example an id that fails to parse); the publisher turns that into a
/// not-found response.
#[derive(Clone)]
pub struct ModelFactory(Arc<dyn Fn(&Variables) -> Option<AnyModel> + Send + Sync>);

impl ModelFactory {
    /// Wrap a typed factory closure.
    pub fn of<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Variables) -> Option<T> + Send + Sync + 'static,
    {
        Self(Arc::new(move |variables| {
            factory(variables).map(|model| Box::new(model) as AnyModel)
        }))
    }

    /// Build a model from the given variables.
    pub fn build(&self, variables: &Variables) -> Option<AnyModel> {
        (self.0)(variables)
    }
}

impl fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelFactory")
    }
}

/// One view registration in an application's own layer.
#[derive(Clone, Debug)]
pub struct ViewEntry {
    /// The capability the view answers.
    pub capability: Capability,
    /// The argument signature it was registered under.
    pub signature: Signature,
    /// The implementation.
    pub view: View,
}

/// One application's own dispatch layer.
///
/// Populated immutably by a successful configuration commit; conflict
/// detection happens at commit time, so the index never holds two entries
/// for the same (capability, signature) key.
#[derive(Clone, Debug, Default)]
pub struct DispatchIndex {
    entries: Vec<ViewEntry>,
    isa: Vec<(TypeInfo, TypeInfo)>,
}

impl DispatchIndex {
    /// Store one view entry in this layer.
    pub fn register(&mut self, capability: Capability, signature: Signature, view: View) {
        self.entries.push(ViewEntry {
            capability,
            signature,
            view,
        });
    }

    /// Declare a subtype edge: `sub` dispatches to registrations for
    /// `superty` at one extra specificity hop.
    pub fn register_isa(&mut self, sub: TypeInfo, superty: TypeInfo) {
        self.isa.push((sub, superty));
    }

    /// All view entries in this layer.
    pub fn entries(&self) -> &[ViewEntry] {
        &self.entries
    }

    /// All declared subtype edges in this layer.
    pub fn isa_edges(&self) -> &[(TypeInfo, TypeInfo)] {
        &self.isa
    }

    /// True when no registrations exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.isa.is_empty()
    }
}
