//! Sync engine against a mocked monitoring API.

use healthcheck_sync::remote::{GatewayError, HttpGateway, RemoteGateway};
use healthcheck_sync::sync::{DesiredSpecBuilder, Operation, SyncEngine, SyncError, SyncOutcome};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const COLLECTION: &str = "/api/v1/healthchecks";

async fn engine_for(server: &MockServer) -> SyncEngine<HttpGateway> {
    let gateway = HttpGateway::new(&common::remote_config(&server.uri())).unwrap();
    SyncEngine::new(gateway, DesiredSpecBuilder::default())
}

async fn mount_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::check_list(&[(
            "other",
            "ns_bar",
            "bar.example.com",
        )])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COLLECTION))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "name": "ns_foo",
            "description": "ns_foo",
            "target": "foo.example.com",
            "port": 8080,
            "protocol": "http",
            "path": "/",
            "method": "GET",
            "httpCode": "200",
            "timeout": 30,
            "interval": 60,
            "enabled": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "new-id" })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let outcome = engine
        .reconcile(&common::present("ns", "foo", "foo.example.com"))
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Created);
}

#[tokio::test]
async fn test_update_when_found() {
    let server = MockServer::start().await;
    mount_list(&server, common::check_list(&[("abc", "ns_foo", "old.example.com")])).await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/abc", COLLECTION)))
        .and(body_partial_json(json!({ "target": "foo.example.com", "path": "/healthz" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let state = common::present_with(
        "ns",
        "foo",
        Some("foo.example.com"),
        &[("health-check-path", "/healthz")],
    );
    assert_eq!(engine.reconcile(&state).await.unwrap(), SyncOutcome::Updated);
}

#[tokio::test]
async fn test_delete_when_absent() {
    let server = MockServer::start().await;
    mount_list(&server, common::check_list(&[("abc", "ns_foo", "foo.example.com")])).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/abc", COLLECTION)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert_eq!(
        engine.reconcile(&common::absent("ns", "foo")).await.unwrap(),
        SyncOutcome::Deleted
    );
}

#[tokio::test]
async fn test_absent_without_record_is_noop() {
    let server = MockServer::start().await;
    mount_list(&server, common::check_list(&[])).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert_eq!(
        engine.reconcile(&common::absent("ns", "foo")).await.unwrap(),
        SyncOutcome::NoOp
    );
}

#[tokio::test]
async fn test_server_error_on_list_blocks_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .reconcile(&common::present("ns", "foo", "foo.example.com"))
        .await
        .unwrap_err();
    match err {
        SyncError::LookupFailed { key, source } => {
            assert_eq!(key, "ns_foo");
            assert!(matches!(source, GatewayError::Status { status: 503, .. }));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_list_is_lookup_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&common::remote_config(&server.uri())).unwrap();
    let err = gateway.find("ns_foo").await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn test_malformed_list_is_lookup_failure() {
    let server = MockServer::start().await;
    mount_list(&server, json!({ "http-checks": "not-a-list" })).await;

    let engine = engine_for(&server).await;
    let err = engine.reconcile(&common::absent("ns", "foo")).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::LookupFailed { source: GatewayError::Decode(_), .. }
    ));
}

#[tokio::test]
async fn test_unreachable_remote_is_lookup_failure() {
    // Nothing listens on port 9 (discard) in the test environment.
    let gateway = HttpGateway::new(&common::remote_config("http://127.0.0.1:9")).unwrap();
    let engine = SyncEngine::new(gateway, DesiredSpecBuilder::default());

    let err = engine.reconcile(&common::absent("ns", "foo")).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::LookupFailed { source: GatewayError::Transport(_), .. }
    ));
}

#[tokio::test]
async fn test_rejected_update_is_mutation_failure() {
    let server = MockServer::start().await;
    mount_list(&server, common::check_list(&[("abc", "ns_foo", "foo.example.com")])).await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/abc", COLLECTION)))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad port"))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .reconcile(&common::present("ns", "foo", "foo.example.com"))
        .await
        .unwrap_err();
    match err {
        SyncError::MutationFailed { operation, source, .. } => {
            assert_eq!(operation, Operation::Update);
            assert!(matches!(source, GatewayError::Status { status: 422, ref body } if body == "bad port"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_of_vanished_record_is_noop() {
    let server = MockServer::start().await;
    mount_list(&server, common::check_list(&[("abc", "ns_foo", "foo.example.com")])).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/abc", COLLECTION)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert_eq!(
        engine.reconcile(&common::absent("ns", "foo")).await.unwrap(),
        SyncOutcome::NoOp
    );
}

#[tokio::test]
async fn test_bad_timeout_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::check_list(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let state = common::present_with(
        "ns",
        "foo",
        Some("foo.example.com"),
        &[("health-check-timeout", "abc")],
    );
    let err = engine.reconcile(&state).await.unwrap_err();
    assert!(matches!(err, SyncError::ConversionFailed { field: "timeout", .. }));
}

#[tokio::test]
async fn test_null_fields_in_unrelated_record_do_not_block_lookup() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        json!({
            "count": 1,
            "http-checks": [{
                "id": "zzz",
                "name": "other_check",
                "description": null,
                "target": "other.example.com",
                "port": null,
                "valid-status": null
            }]
        }),
    )
    .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert_eq!(
        engine.reconcile(&common::absent("ns", "foo")).await.unwrap(),
        SyncOutcome::NoOp
    );
}

#[tokio::test]
async fn test_duplicate_names_update_the_first_record() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        common::check_list(&[
            ("first", "ns_foo", "foo.example.com"),
            ("second", "ns_foo", "foo.example.com"),
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/first", COLLECTION)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/second", COLLECTION)))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert_eq!(
        engine
            .reconcile(&common::present("ns", "foo", "foo.example.com"))
            .await
            .unwrap(),
        SyncOutcome::Updated
    );
}
