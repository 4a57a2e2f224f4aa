//! The publisher: route traversal, dispatch, and response conversion.
//!
//! The publisher walks the mount/path structure: it routes the remaining
//! path against the current mount's application, following delegations into
//! child mounts until a terminal target is found, then dispatches the
//! request method as a capability against the routed model's run-time type.
//! Every per-request failure is converted to a status response at this
//! boundary; nothing escapes to crash the serving process.

use crate::mount::Mount;
use crate::request::Request;
use crate::router::{REMAINDER, RouteTarget};
use manifold_core::{Capability, LookupError, PathMatch, Response, RouteError};
use std::sync::Arc;

/// Longest delegation chain followed for one request. Mounts registered
/// at `/` consume no path prefix, so a delegation cycle between such
/// mounts would otherwise recurse without bound.
const MAX_MOUNT_DEPTH: usize = 32;

/// Publish a request through a root mount, producing the response handed
/// back to the transport collaborator.
pub fn publish(request: &mut Request, mut root: Mount) -> Response {
    publish_at(request, &mut root, 0)
}

fn publish_at(request: &mut Request, mount: &mut Mount, depth: usize) -> Response {
    // Routing consults the current mount's application; view dispatch
    // below goes through the request's own lookup.
    let routing = mount.app().lookup();
    let (target, variables) = match routing.route(request.remaining()) {
        PathMatch::Found { value, variables } => (value.clone(), variables),
        PathMatch::NotFound => {
            let err = RouteError::NotFound(request.path().to_string());
            tracing::debug!(app = mount.app().name(), error = %err, "router miss");
            return Response::not_found();
        }
    };

    match target {
        RouteTarget::Delegate { app, context } => {
            if depth >= MAX_MOUNT_DEPTH {
                tracing::error!(
                    path = request.path(),
                    app = mount.app().name(),
                    "mount delegation depth exceeded; refusing to recurse further"
                );
                return Response::server_error();
            }
            let mut variables = variables;
            let rest = variables
                .remove(REMAINDER)
                .map(|tail| format!("/{tail}"))
                .unwrap_or_else(|| "/".to_string());

            // The consumed prefix names the child mount under its parent.
            let consumed = request
                .remaining()
                .strip_suffix(rest.as_str())
                .unwrap_or(request.remaining())
                .to_string();

            tracing::debug!(
                parent = mount.app().name(),
                child = app.name(),
                mount = %consumed,
                "delegating to child application"
            );

            let child_app = Arc::clone(&app);
            let mount_variables = variables;
            let child = mount.child_entry(consumed, move || {
                Mount::new(child_app, move || context(&mount_variables))
            });
            request.advance(rest);
            publish_at(request, child, depth + 1)
        }
        RouteTarget::Model(factory) => {
            let Some(model) = factory.build(&variables) else {
                tracing::debug!(
                    path = request.path(),
                    "model factory produced no instance"
                );
                return Response::not_found();
            };
            request.set_variables(variables);

            let capability = Capability::new(request.method());
            let resolved = request
                .lookup()
                .resolve(&capability, &[(*model).type_id()])
                .cloned();
            match resolved {
                Ok(view) => {
                    let context = mount.resolve_context();
                    match view.invoke(model.as_ref(), request, context) {
                        Ok(response) => response,
                        Err(err) => {
                            tracing::error!(
                                path = request.path(),
                                capability = %capability,
                                error = %err,
                                "view execution failed"
                            );
                            Response::server_error()
                        }
                    }
                }
                Err(err @ LookupError::Ambiguous { .. }) => {
                    tracing::error!(path = request.path(), error = %err, "refusing ambiguous dispatch");
                    Response::server_error()
                }
                Err(err @ LookupError::NotFound { .. }) => {
                    tracing::debug!(path = request.path(), error = %err, "no view for capability");
                    Response::not_found()
                }
            }
        }
    }
}
