mod common;

use common::{Item, item_factory};
use manifold::{Capability, LookupError, RawRequest, Response, Runtime};
use std::any::TypeId;

#[test]
fn inherited_view_resolves_through_descendant() {
    let runtime = Runtime::new();
    let base = runtime.app("base");
    base.view::<Item, _>("GET", |item, _, _| Ok(Response::ok(format!("base:{}", item.id))));

    let derived = runtime.app_extending("derived", &[&base]);
    derived.path::<Item, _>("/items/{id}", item_factory);
    runtime.commit().expect("no conflicts");

    let response = derived.handle(RawRequest::get("/items/9"));
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "base:9");
}

#[test]
fn descendant_override_wins_over_ancestor() {
    let runtime = Runtime::new();
    let base = runtime.app("base");
    base.view::<Item, _>("GET", |item, _, _| Ok(Response::ok(format!("base:{}", item.id))));

    let derived = runtime.app_extending("derived", &[&base]);
    derived.path::<Item, _>("/items/{id}", item_factory);
    derived.view::<Item, _>("GET", |item, _, _| {
        Ok(Response::ok(format!("derived:{}", item.id)))
    });
    // Same identity across two layers is an override, not a conflict.
    runtime.commit().expect("no conflicts");

    let response = derived.handle(RawRequest::get("/items/9"));
    assert_eq!(response.body(), "derived:9");
}

#[test]
fn transitive_ancestors_are_merged() {
    let runtime = Runtime::new();
    let grand = runtime.app("grand");
    grand.view::<Item, _>("GET", |item, _, _| Ok(Response::ok(format!("grand:{}", item.id))));

    let parent = runtime.app_extending("parent", &[&grand]);
    let leaf = runtime.app_extending("leaf", &[&parent]);
    leaf.path::<Item, _>("/items/{id}", item_factory);
    runtime.commit().expect("no conflicts");

    let response = leaf.handle(RawRequest::get("/items/3"));
    assert_eq!(response.body(), "grand:3");
}

#[test]
fn root_registrations_are_implicit_everywhere() {
    let runtime = Runtime::new();
    runtime
        .root()
        .view::<Item, _>("GET", |item, _, _| Ok(Response::ok(format!("root:{}", item.id))));

    let app = runtime.app("leaf");
    app.path::<Item, _>("/items/{id}", item_factory);
    runtime.commit().expect("no conflicts");

    let response = app.handle(RawRequest::get("/items/5"));
    assert_eq!(response.body(), "root:5");
}

#[test]
fn equal_depth_siblings_are_ambiguous() {
    let runtime = Runtime::new();
    let left = runtime.app("left");
    left.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("left")));
    let right = runtime.app("right");
    right.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("right")));

    let bottom = runtime.app_extending("bottom", &[&left, &right]);
    bottom.path::<Item, _>("/items/{id}", item_factory);
    runtime.commit().expect("no in-layer conflicts");

    // Direct resolution refuses to guess.
    let err = bottom
        .lookup()
        .resolve(&Capability::from("GET"), &[TypeId::of::<Item>()])
        .expect_err("equally specific candidates at equal depth");
    assert!(matches!(err, LookupError::Ambiguous { candidates: 2, .. }));

    // At the publisher boundary ambiguity surfaces as a server error.
    let response = bottom.handle(RawRequest::get("/items/1"));
    assert_eq!(response.status(), 500);
}

#[test]
fn own_registration_beats_equal_depth_siblings() {
    let runtime = Runtime::new();
    let left = runtime.app("left");
    left.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("left")));
    let right = runtime.app("right");
    right.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("right")));

    let bottom = runtime.app_extending("bottom", &[&left, &right]);
    bottom.path::<Item, _>("/items/{id}", item_factory);
    bottom.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("bottom")));
    runtime.commit().expect("no in-layer conflicts");

    let response = bottom.handle(RawRequest::get("/items/1"));
    assert_eq!(response.body(), "bottom");
}
