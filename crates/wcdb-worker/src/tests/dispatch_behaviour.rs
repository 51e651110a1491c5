//! Behavioural tests for the worker dispatch loop.

use std::cell::RefCell;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

use crate::health::HEALTHY_MESSAGE;
use crate::tests::session::Session;

#[fixture]
fn world() -> RefCell<Session> {
    RefCell::new(Session::new())
}

#[given("a fresh worker")]
fn given_fresh_worker(world: &RefCell<Session>) {
    assert!(!world.borrow().worker.has_instance());
}

#[given("a worker whose next construction fails")]
fn given_failing_construction(world: &RefCell<Session>) {
    world.borrow().module.fail_next(1);
}

#[given("a worker whose constructions take {millis} milliseconds")]
fn given_slow_construction(world: &RefCell<Session>, millis: u64) {
    world
        .borrow()
        .module
        .set_delay(Duration::from_millis(millis));
}

#[when("the controller requests {selector} as {id}")]
fn when_request(world: &RefCell<Session>, selector: String, id: i64) {
    world.borrow_mut().request(&selector, id);
}

#[when("the controller enables capability logging as {id}")]
fn when_enable_logging(world: &RefCell<Session>, id: i64) {
    world.borrow_mut().send(json!({
        "id": id,
        "type": "setLogEnabled",
        "payload": {"enabled": true}
    }));
}

#[when("the controller looks up contact {username} as {id}")]
fn when_lookup_contact(world: &RefCell<Session>, username: String, id: i64) {
    world.borrow_mut().send(json!({
        "id": id,
        "type": "getContact",
        "payload": {"username": username}
    }));
}

#[when("the controller runs a query as {id}")]
fn when_run_query(world: &RefCell<Session>, id: i64) {
    world.borrow_mut().send(json!({
        "id": id,
        "type": "execQuery",
        "payload": {"kind": "message", "sql": "SELECT count(*) FROM Msg"}
    }));
}

#[when("the controller sends a frame without an id")]
fn when_frame_without_id(world: &RefCell<Session>) {
    world.borrow_mut().send(json!({"type": "getSessions"}));
}

#[when("the controller sends a line that is not an object")]
fn when_non_object(world: &RefCell<Session>) {
    world.borrow_mut().send(json!(["getSessions"]));
}

#[when("the controller sends a frame with id {id} and no type")]
fn when_frame_without_type(world: &RefCell<Session>, id: i64) {
    world.borrow_mut().send(json!({"id": id, "payload": {}}));
}

#[when("the controller queues {selector} as {id} and closes the channel")]
fn when_queue_and_close(world: &RefCell<Session>, selector: String, id: i64) {
    world
        .borrow_mut()
        .serve_and_close(vec![json!({"id": id, "type": selector})]);
}

#[when("the instance raises a {event} monitor event")]
fn when_monitor_event(world: &RefCell<Session>, event: String) {
    let fired = world
        .borrow_mut()
        .raise(&event, r#"{"sessionId":"wxid_a","count":1}"#);
    assert!(fired, "no monitor callback was registered");
}

#[then("reply {id} reports success")]
fn then_success(world: &RefCell<Session>, id: i64) {
    assert_eq!(world.borrow().result(id), &json!({"success": true}));
}

#[then("reply {id} reports a healthy native library")]
fn then_healthy(world: &RefCell<Session>, id: i64) {
    assert_eq!(
        world.borrow().result(id),
        &json!({"success": true, "message": HEALTHY_MESSAGE})
    );
}

#[then("reply {id} reports unknown method {selector}")]
fn then_unknown_method(world: &RefCell<Session>, id: i64, selector: String) {
    let selector = strip_quotes(&selector);
    assert_eq!(
        world.borrow().result(id),
        &json!({"success": false, "error": format!("Unknown method: {selector}")})
    );
}

#[then("reply {id} comes from instance {serial}")]
fn then_from_instance(world: &RefCell<Session>, id: i64, serial: usize) {
    let world = world.borrow();
    let result = world.result(id);
    assert_eq!(result.get("instance"), Some(&json!(serial)), "{result}");
}

#[then("reply {id} is an error mentioning {text}")]
fn then_error_mentions(world: &RefCell<Session>, id: i64, text: String) {
    let expected = strip_quotes(&text);
    let world = world.borrow();
    let error = world.error(id);
    assert!(
        error.contains(expected),
        "expected error containing '{expected}', got: {error}"
    );
}

#[then("the capability was constructed {count} times")]
fn then_constructions(world: &RefCell<Session>, count: usize) {
    assert_eq!(world.borrow().module.constructions(), count);
}

#[then("instance {serial} was shut down {count} times")]
fn then_shut_down(world: &RefCell<Session>, serial: usize, count: usize) {
    assert_eq!(world.borrow().built(serial).shutdowns(), count);
}

#[then("no operational instance exists")]
fn then_no_instance(world: &RefCell<Session>) {
    assert!(!world.borrow().worker.has_instance());
}

#[then("exactly one monitor push was relayed for {event}")]
fn then_one_push(world: &RefCell<Session>, event: String) {
    let world = world.borrow();
    let pushes = world.pushes();
    assert_eq!(pushes.len(), 1, "{pushes:?}");
    let push = pushes.first().expect("one push");
    assert!(push.id().is_sentinel());
    let encoded = serde_json::to_value(push).expect("encode push");
    assert_eq!(
        encoded,
        json!({
            "id": -1,
            "type": "monitor",
            "payload": {"type": event, "json": r#"{"sessionId":"wxid_a","count":1}"#}
        })
    );
}

#[then("no messages were sent")]
fn then_nothing_sent(world: &RefCell<Session>) {
    assert!(world.borrow().received().is_empty());
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches('"')
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Configuration is acknowledged without building an instance"
)]
fn configuration_is_deferred(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Instance-bound requests share one instance"
)]
fn requests_share_instance(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Health check uses a throwaway instance"
)]
fn health_check_is_isolated(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Unknown selectors are reported in the result"
)]
fn unknown_selectors(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Monitor events are pushed with the sentinel id"
)]
fn monitor_pushes(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Registering the monitor again replaces the callback"
)]
fn monitor_registration_replaces(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Failed construction is retried by the next request"
)]
fn construction_retry(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "A panicking operation does not stop the worker"
)]
fn panicking_operation(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Operation failures become error replies"
)]
fn operation_failures(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Explicit shutdown tears the instance down"
)]
fn explicit_shutdown(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Uncorrelated frames are dropped"
)]
fn uncorrelated_frames(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Requests without a selector are rejected"
)]
fn requests_without_selector(world: RefCell<Session>) {
    drop(world);
}

#[scenario(
    path = "tests/features/worker_dispatch.feature",
    name = "Closing the channel drains handlers and shuts the instance down"
)]
fn closing_the_channel(world: RefCell<Session>) {
    drop(world);
}
