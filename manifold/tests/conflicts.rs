mod common;

use common::{Item, item_factory};
use manifold::{ConfigError, RawRequest, Response, Runtime};

#[test]
fn same_layer_conflict_fails_commit() {
    let runtime = Runtime::new();
    let app = runtime.app("shop");
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("a")));
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("b")));
    app.path::<Item, _>("/items/{id}", item_factory);

    let err = app.commit().expect_err("two non-overriding registrations");
    assert!(matches!(err, ConfigError::Conflict { .. }));

    // A failed commit leaves the layer empty: nothing serves.
    let response = app.handle(RawRequest::get("/items/1"));
    assert_eq!(response.status(), 404);
}

#[test]
fn marked_override_resolves_in_layer() {
    let runtime = Runtime::new();
    let app = runtime.app("shop");
    app.path::<Item, _>("/items/{id}", item_factory);
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("plain")));
    app.view_override::<Item, _>("GET", |_, _, _| Ok(Response::ok("override")));
    runtime.commit().expect("explicit override is not a conflict");

    let response = app.handle(RawRequest::get("/items/1"));
    assert_eq!(response.body(), "override");
}

#[test]
fn cross_layer_same_identity_is_not_a_conflict() {
    let runtime = Runtime::new();
    let base = runtime.app("base");
    base.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("base")));
    let derived = runtime.app_extending("derived", &[&base]);
    derived.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("derived")));
    runtime
        .commit()
        .expect("ancestor and descendant layers never conflict");
}

#[test]
fn duplicate_route_pattern_in_layer_conflicts() {
    let runtime = Runtime::new();
    let app = runtime.app("shop");
    app.path::<Item, _>("/items/{id}", item_factory);
    app.path::<Item, _>("/items/{id}", item_factory);

    let err = app.commit().expect_err("duplicate route pattern");
    assert!(matches!(err, ConfigError::Conflict { .. }));
}

#[test]
fn invalid_route_pattern_fails_commit() {
    let runtime = Runtime::new();
    let app = runtime.app("shop");
    app.path::<Item, _>("/items/{unclosed", item_factory);

    let err = app.commit().expect_err("malformed pattern");
    assert!(matches!(err, ConfigError::InvalidRoute { .. }));
}

#[test]
fn recommit_after_fixing_conflict_serves() {
    let runtime = Runtime::new();
    let app = runtime.app("shop");
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("a")));
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("b")));
    assert!(app.commit().is_err());

    app.path::<Item, _>("/items/{id}", item_factory);
    app.view::<Item, _>("GET", |_, _, _| Ok(Response::ok("fixed")));
    app.commit().expect("fixed registrations commit");

    let response = app.handle(RawRequest::get("/items/1"));
    assert_eq!(response.body(), "fixed");
}
