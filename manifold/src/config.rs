//! Configuration actions and the per-application registry.
//!
//! Applications accumulate [`Action`]s in any order during the registration
//! phase. Finalizing groups them by [`Identity`] — the key under which they
//! can conflict — and either rejects the layer with a
//! [`ConfigError::Conflict`] or performs the winners into a freshly built
//! dispatch layer and route table. Inherited actions never participate:
//! layering across applications happens at lookup-merge time, where the
//! current layer always shadows its ancestors.

use crate::app::App;
use crate::dispatch::{DispatchIndex, ModelFactory, View};
use crate::mount::ContextFactory;
use crate::router::RouteTable;
use manifold_core::{Capability, ConfigError, Signature, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One configuration action awaiting commit.
#[derive(Clone, Debug)]
pub struct Action {
    kind: ActionKind,
    overriding: bool,
}

#[derive(Clone)]
enum ActionKind {
    View {
        capability: Capability,
        signature: Signature,
        view: View,
    },
    Route {
        pattern: String,
        factory: ModelFactory,
    },
    MountPoint {
        pattern: String,
        app: Arc<App>,
        context: ContextFactory,
    },
    Isa {
        sub: TypeInfo,
        superty: TypeInfo,
    },
}

impl fmt::Debug for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::View {
                capability,
                signature,
                ..
            } => write!(f, "View({capability} {signature})"),
            ActionKind::Route { pattern, .. } => write!(f, "Route({pattern})"),
            ActionKind::MountPoint { pattern, app, .. } => {
                write!(f, "MountPoint({pattern} -> {})", app.name())
            }
            ActionKind::Isa { sub, superty } => write!(f, "Isa({sub} -> {superty})"),
        }
    }
}

impl Action {
    /// Register a view for a capability and argument signature.
    pub fn view(capability: Capability, signature: Signature, view: View) -> Self {
        Self {
            kind: ActionKind::View {
                capability,
                signature,
                view,
            },
            overriding: false,
        }
    }

    /// Register a terminal route pattern backed by a model factory.
    pub fn route(pattern: impl Into<String>, factory: ModelFactory) -> Self {
        Self {
            kind: ActionKind::Route {
                pattern: pattern.into(),
                factory,
            },
            overriding: false,
        }
    }

    /// Register a mount point delegating a path subtree to a child
    /// application.
    pub fn mount_point(
        pattern: impl Into<String>,
        app: Arc<App>,
        context: ContextFactory,
    ) -> Self {
        Self {
            kind: ActionKind::MountPoint {
                pattern: pattern.into(),
                app,
                context,
            },
            overriding: false,
        }
    }

    /// Declare a subtype edge for dispatch specificity.
    pub fn isa(sub: TypeInfo, superty: TypeInfo) -> Self {
        Self {
            kind: ActionKind::Isa { sub, superty },
            overriding: false,
        }
    }

    /// Mark this action as an explicit override of a sibling action with
    /// the same identity in the same layer.
    pub fn overriding(mut self) -> Self {
        self.overriding = true;
        self
    }

    /// The key under which this action can conflict.
    pub fn identity(&self) -> Identity {
        match &self.kind {
            ActionKind::View {
                capability,
                signature,
                ..
            } => Identity::View(capability.clone(), signature.clone()),
            // Mounts and routes share pattern space.
            ActionKind::Route { pattern, .. } => Identity::Route(pattern.clone()),
            ActionKind::MountPoint { pattern, .. } => Identity::Route(pattern.clone()),
            ActionKind::Isa { sub, .. } => Identity::Isa(sub.id(), sub.name()),
        }
    }
}

/// The key under which configuration actions conflict.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A view registration for (capability, signature).
    View(Capability, Signature),
    /// A route or mount registration for a pattern.
    Route(String),
    /// A subtype declaration for one type.
    Isa(TypeId, &'static str),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::View(capability, signature) => write!(f, "view {capability} {signature}"),
            Identity::Route(pattern) => write!(f, "route {pattern}"),
            Identity::Isa(_, name) => write!(f, "isa {name}"),
        }
    }
}

/// A source object declaring configuration actions.
///
/// The scanning collaborator hands these to [`App::configurable`] during
/// startup discovery.
pub trait ConfigSource {
    /// The actions this source declares.
    fn actions(&self) -> Vec<Action>;
}

/// Accumulates configuration actions for one application layer.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    actions: Vec<Action>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one action.
    pub fn add(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Queue all actions a source declares.
    pub fn extend_from(&mut self, source: &dyn ConfigSource) {
        self.actions.extend(source.actions());
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when no actions are queued.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Drop all queued actions.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Finalize the queued actions into a fresh dispatch layer and route
    /// table, draining the queue.
    ///
    /// Actions are grouped by identity in first-seen order. A group with
    /// one member wins unconditionally; a group where exactly one member is
    /// marked overriding resolves to that member; anything else is a
    /// conflict naming `layer` and the identity.
    pub fn finalize(&mut self, layer: &str) -> Result<(DispatchIndex, RouteTable), ConfigError> {
        let actions = std::mem::take(&mut self.actions);
        tracing::debug!(layer, actions = actions.len(), "finalizing configuration");

        let mut order: Vec<Identity> = Vec::new();
        let mut groups: HashMap<Identity, Vec<Action>> = HashMap::new();
        for action in actions {
            let identity = action.identity();
            groups
                .entry(identity.clone())
                .or_insert_with(|| {
                    order.push(identity);
                    Vec::new()
                })
                .push(action);
        }

        let mut index = DispatchIndex::default();
        let mut routes = RouteTable::default();
        for identity in &order {
            let Some(group) = groups.remove(identity) else {
                continue;
            };
            let winner = select_winner(group, layer, identity)?;
            perform(winner, &mut index, &mut routes)?;
        }
        Ok((index, routes))
    }
}

fn select_winner(group: Vec<Action>, layer: &str, identity: &Identity) -> Result<Action, ConfigError> {
    let total = group.len();
    let (mut overriding, mut plain): (Vec<_>, Vec<_>) =
        group.into_iter().partition(|action| action.overriding);

    let winner = if total == 1 {
        plain.pop().or_else(|| overriding.pop())
    } else if overriding.len() == 1 {
        overriding.pop()
    } else {
        None
    };

    winner.ok_or_else(|| ConfigError::Conflict {
        layer: layer.to_string(),
        identity: identity.to_string(),
    })
}

fn perform(
    action: Action,
    index: &mut DispatchIndex,
    routes: &mut RouteTable,
) -> Result<(), ConfigError> {
    match action.kind {
        ActionKind::View {
            capability,
            signature,
            view,
        } => index.register(capability, signature, view),
        ActionKind::Route { pattern, factory } => routes.add_model(pattern, factory)?,
        ActionKind::MountPoint {
            pattern,
            app,
            context,
        } => routes.add_delegate(pattern, app, context)?,
        ActionKind::Isa { sub, superty } => index.register_isa(sub, superty),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifold_core::Response;

    struct Item;

    fn get_view(body: &'static str) -> Action {
        Action::view(
            Capability::from("GET"),
            Signature::single::<Item>(),
            View::of::<Item, _>(move |_, _, _| Ok(Response::ok(body))),
        )
    }

    #[test]
    fn test_single_action_wins() {
        let mut registry = ConfigRegistry::new();
        registry.add(get_view("a"));
        let (index, _) = registry.finalize("app").expect("single action commits");
        assert_eq!(index.entries().len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_two_plain_actions_conflict() {
        let mut registry = ConfigRegistry::new();
        registry.add(get_view("a"));
        registry.add(get_view("b"));
        let err = registry.finalize("app").expect_err("conflict");
        assert_eq!(
            err,
            ConfigError::Conflict {
                layer: "app".to_string(),
                identity: "view GET (Item)".to_string(),
            }
        );
    }

    #[test]
    fn test_marked_override_wins() {
        let mut registry = ConfigRegistry::new();
        registry.add(get_view("a"));
        registry.add(get_view("b").overriding());
        let (index, _) = registry.finalize("app").expect("override resolves");
        assert_eq!(index.entries().len(), 1);
    }

    #[test]
    fn test_two_overrides_still_conflict() {
        let mut registry = ConfigRegistry::new();
        registry.add(get_view("a").overriding());
        registry.add(get_view("b").overriding());
        assert!(registry.finalize("app").is_err());
    }

    #[test]
    fn test_distinct_identities_do_not_conflict() {
        let mut registry = ConfigRegistry::new();
        registry.add(get_view("a"));
        registry.add(Action::view(
            Capability::from("POST"),
            Signature::single::<Item>(),
            View::of::<Item, _>(|_, _, _| Ok(Response::ok("p"))),
        ));
        let (index, _) = registry.finalize("app").expect("distinct identities");
        assert_eq!(index.entries().len(), 2);
    }
}
