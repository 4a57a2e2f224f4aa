//! Merged, immutable dispatch lookups.
//!
//! A [`Lookup`] is a read-only snapshot of one application's combined
//! behavior: its own dispatch layer and route table merged with all
//! ancestors', descendant-wins. Layers are collected by a depth-first walk
//! of the extension list in declared order, de-duplicated so a layer
//! reachable through multiple inheritance paths is consulted once, at its
//! first-visit depth.
//!
//! Resolution ranks candidates by signature specificity: per argument, an
//! exact type match costs 0, each declared-subtype hop costs 1, and `Any`
//! costs a fixed large amount. The minimal total cost wins; among equal
//! costs the shallowest layer wins; distinct survivors at equal cost and
//! equal depth are ambiguous and refuse to resolve.

use crate::app::App;
use crate::dispatch::{View, ViewEntry};
use crate::router::{RouteTarget, TrajectRouter, TrajectRouterBuilder};
use manifold_core::{Capability, LookupError, PathMatch, PathRouter, Signature, TypeSpec};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Cost of an `Any` argument position: higher than any realistic declared
/// subtype chain, so every concrete match beats it.
const ANY_COST: u32 = 10_000;

/// Longest subtype chain walked before giving up; guards declared cycles.
const MAX_ISA_HOPS: u32 = 64;

struct Candidate {
    signature: Signature,
    view: View,
    depth: u32,
    layer: String,
}

/// An immutable merged view of one application's dispatch table and route
/// table, including all ancestors.
pub struct Lookup {
    views: HashMap<Capability, Vec<Candidate>>,
    isa: HashMap<TypeId, TypeId>,
    router: TrajectRouter<RouteTarget>,
    stamps: Vec<(Weak<App>, u64)>,
}

impl Lookup {
    /// Build a fresh snapshot for `app`. Construction reads the layer
    /// registries but never mutates them; the snapshot is only handed out
    /// once fully built.
    pub(crate) fn build(app: &Arc<App>) -> Arc<Self> {
        let mut layers: Vec<(Arc<App>, u32)> = Vec::new();
        collect_layers(app, 0, &mut layers);

        // Shallow layers first; the sort is stable, so discovery order is
        // kept within a depth and earlier-declared parents merge first.
        layers.sort_by_key(|(_, depth)| *depth);

        let stamps = layers
            .iter()
            .map(|(layer, _)| (Arc::downgrade(layer), layer.epoch()))
            .collect();

        let mut views: HashMap<Capability, Vec<Candidate>> = HashMap::new();
        let mut isa: HashMap<TypeId, TypeId> = HashMap::new();
        let mut router = TrajectRouterBuilder::default();

        for (layer, depth) in &layers {
            let (index, routes) = layer.layer_snapshot();
            for ViewEntry {
                capability,
                signature,
                view,
            } in index.entries()
            {
                views.entry(capability.clone()).or_default().push(Candidate {
                    signature: signature.clone(),
                    view: view.clone(),
                    depth: *depth,
                    layer: layer.name().to_string(),
                });
            }
            for (sub, superty) in index.isa_edges() {
                // Shallowest declaration of an edge wins.
                isa.entry(sub.id()).or_insert_with(|| superty.id());
            }
            for (pattern, target) in routes.entries() {
                if !router.insert(pattern, target.clone()) {
                    tracing::debug!(
                        pattern = %pattern,
                        layer = layer.name(),
                        "route pattern shadowed by a shallower layer"
                    );
                }
            }
        }

        // Identical (capability, signature) keys: only the shallowest
        // layer's entry survives. Equal-depth duplicates from distinct
        // layers all survive and surface as ambiguity if they win.
        for candidates in views.values_mut() {
            let mut min_depth: HashMap<&Signature, u32> = HashMap::new();
            for candidate in candidates.iter() {
                min_depth
                    .entry(&candidate.signature)
                    .and_modify(|depth| *depth = (*depth).min(candidate.depth))
                    .or_insert(candidate.depth);
            }
            let min_depth: HashMap<Signature, u32> = min_depth
                .into_iter()
                .map(|(signature, depth)| (signature.clone(), depth))
                .collect();
            candidates.retain(|candidate| {
                min_depth
                    .get(&candidate.signature)
                    .is_some_and(|depth| candidate.depth == *depth)
            });
        }

        tracing::debug!(
            app = app.name(),
            layers = layers.len(),
            capabilities = views.len(),
            "lookup built"
        );

        Arc::new(Self {
            views,
            isa,
            router: router.build(),
            stamps,
        })
    }

    /// True while every merged layer still sits at the registration epoch
    /// this snapshot was built from. An ancestor `clear()` or `commit()`
    /// moves its epoch and makes every descendant snapshot stale.
    pub(crate) fn is_fresh(&self) -> bool {
        self.stamps.iter().all(|(layer, epoch)| {
            layer
                .upgrade()
                .is_some_and(|layer| layer.epoch() == *epoch)
        })
    }

    /// Resolve the most specific compatible view for a capability and
    /// argument run-time types.
    pub fn resolve(
        &self,
        capability: &Capability,
        args: &[TypeId],
    ) -> Result<&View, LookupError> {
        let not_found = || LookupError::NotFound {
            capability: capability.to_string(),
        };
        let candidates = self.views.get(capability).ok_or_else(not_found)?;

        let mut best: Vec<&Candidate> = Vec::new();
        let mut best_cost = u32::MAX;
        for candidate in candidates {
            let Some(cost) = self.signature_cost(&candidate.signature, args) else {
                continue;
            };
            if cost < best_cost {
                best_cost = cost;
                best.clear();
            }
            if cost == best_cost {
                best.push(candidate);
            }
        }
        if best.is_empty() {
            return Err(not_found());
        }

        // Equal specificity: the shallowest layer wins.
        let min_depth = best.iter().map(|c| c.depth).min().unwrap_or(0);
        best.retain(|candidate| candidate.depth == min_depth);

        if best.len() > 1 {
            let layers: Vec<&str> = best.iter().map(|c| c.layer.as_str()).collect();
            tracing::warn!(
                capability = %capability,
                ?layers,
                "equally specific candidates at equal inheritance distance"
            );
            return Err(LookupError::Ambiguous {
                capability: capability.to_string(),
                candidates: best.len(),
            });
        }
        Ok(&best[0].view)
    }

    /// Resolve a path against the merged route table.
    pub fn route(&self, path: &str) -> PathMatch<'_, RouteTarget> {
        self.router.resolve(path)
    }

    fn signature_cost(&self, signature: &Signature, args: &[TypeId]) -> Option<u32> {
        if signature.arity() != args.len() {
            return None;
        }
        let mut total = 0u32;
        for (spec, &actual) in signature.specs().iter().zip(args) {
            total += self.arg_cost(spec, actual)?;
        }
        Some(total)
    }

    fn arg_cost(&self, spec: &TypeSpec, actual: TypeId) -> Option<u32> {
        match spec {
            TypeSpec::Any => Some(ANY_COST),
            TypeSpec::Is(info) => {
                let mut current = actual;
                let mut hops = 0u32;
                loop {
                    if current == info.id() {
                        return Some(hops);
                    }
                    match self.isa.get(&current) {
                        Some(&parent) if hops < MAX_ISA_HOPS => {
                            current = parent;
                            hops += 1;
                        }
                        _ => return None,
                    }
                }
            }
        }
    }
}

fn collect_layers(app: &Arc<App>, depth: u32, layers: &mut Vec<(Arc<App>, u32)>) {
    if layers.iter().any(|(seen, _)| Arc::ptr_eq(seen, app)) {
        return;
    }
    layers.push((Arc::clone(app), depth));
    for parent in app.extends() {
        collect_layers(parent, depth + 1, layers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Action;
    use crate::mount::Context;
    use crate::request::Request;
    use manifold_core::{RawRequest, Response};

    struct Animal;
    struct Dog;

    // All candidate views wrap a Dog handler so any winner can be invoked
    // with a Dog model; the registered signature alone drives ranking.
    fn ok_view<T: Send + Sync + 'static>(body: &'static str) -> View {
        View::of::<T, _>(move |_, _, _| Ok(Response::ok(body)))
    }

    fn committed(app: &Arc<App>) {
        app.commit().expect("commit succeeds");
    }

    fn winner_body(app: &Arc<App>, args: &[TypeId]) -> String {
        let lookup = app.lookup();
        let view = lookup
            .resolve(&Capability::from("GET"), args)
            .expect("a candidate resolves");
        let request = Request::bind(RawRequest::get("/"), app.lookup());
        view.invoke(&Dog, &request, &Context::new())
            .expect("view runs")
            .body()
            .to_string()
    }

    #[test]
    fn test_subtype_hops_rank_specificity() {
        let app = App::create("zoo", Vec::new());
        app.isa::<Dog, Animal>();
        app.register(Action::view(
            Capability::from("GET"),
            Signature::single::<Animal>(),
            ok_view::<Dog>("animal"),
        ));
        committed(&app);

        // One hop up the declared chain resolves to the supertype view.
        assert_eq!(winner_body(&app, &[TypeId::of::<Dog>()]), "animal");

        // An exact registration beats the supertype one.
        app.isa::<Dog, Animal>();
        app.register(Action::view(
            Capability::from("GET"),
            Signature::single::<Animal>(),
            ok_view::<Dog>("animal"),
        ));
        app.view::<Dog, _>("GET", |_, _, _| Ok(Response::ok("dog")));
        committed(&app);

        assert_eq!(winner_body(&app, &[TypeId::of::<Dog>()]), "dog");
    }

    #[test]
    fn test_any_loses_to_concrete() {
        let app = App::create("generic", Vec::new());
        app.register(Action::view(
            Capability::from("GET"),
            Signature::new(vec![TypeSpec::Any]),
            ok_view::<Dog>("any"),
        ));
        app.view::<Dog, _>("GET", |_, _, _| Ok(Response::ok("dog")));
        committed(&app);

        assert_eq!(winner_body(&app, &[TypeId::of::<Dog>()]), "dog");

        // The Any registration still catches unregistered types.
        assert_eq!(winner_body(&app, &[TypeId::of::<Animal>()]), "any");
    }

    #[test]
    fn test_unknown_capability_is_not_found() {
        let app = App::create("empty", Vec::new());
        committed(&app);
        let lookup = app.lookup();
        let err = lookup
            .resolve(&Capability::from("DELETE"), &[TypeId::of::<Dog>()])
            .expect_err("nothing registered");
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_diamond_layer_visited_once() {
        let root = App::create("root", Vec::new());
        root.view::<Dog, _>("GET", |_, _, _| Ok(Response::ok("root")));
        committed(&root);

        let left = App::create("left", vec![Arc::clone(&root)]);
        let right = App::create("right", vec![Arc::clone(&root)]);
        committed(&left);
        committed(&right);

        let bottom = App::create("bottom", vec![left, right]);
        committed(&bottom);

        // The shared grand-ancestor is merged once, so no ambiguity.
        let lookup = bottom.lookup();
        assert!(
            lookup
                .resolve(&Capability::from("GET"), &[TypeId::of::<Dog>()])
                .is_ok()
        );
    }
}
