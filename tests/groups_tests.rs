//! Directory proxy routes through the full router.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{Value, json};

fn sample_users() -> Value {
    json!([
        {"id": 1, "groups": ["a", "b"]},
        {"id": 2, "app_metadata": {"groups": ["b", "c"]}}
    ])
}

fn sorted(value: &Value) -> Vec<String> {
    let mut v: Vec<String> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g.as_str().unwrap().to_string())
        .collect();
    v.sort();
    v
}

#[tokio::test]
async fn groups_without_token_never_reaches_directory() {
    let app = TestApp::spawn().await;
    app.directory_returns(sample_users()).await;

    for uri in ["/groups", "/groups/a/users"] {
        let res = app.get(uri, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let res = app.get(uri, Some("Bearer")).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let forged = sign(ROTATED_PEM, PRIMARY_KID, &claims(AUDIENCE));
        let res = app.get_with_token(uri, &forged).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    assert!(app.directory_requests().await.is_empty());
}

#[tokio::test]
async fn groups_are_distinct_across_both_membership_shapes() {
    let app = TestApp::spawn().await;
    app.directory_returns(sample_users()).await;

    let res = app.get_with_token("/groups", &valid_token()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(sorted(&res.body), ["a", "b", "c"]);
}

#[tokio::test]
async fn groups_forward_the_callers_token() {
    let app = TestApp::spawn().await;
    app.directory_returns(sample_users()).await;
    let token = valid_token();

    app.get_with_token("/groups", &token).await;

    let requests = app.directory_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        format!("Bearer {token}").as_str()
    );
}

#[tokio::test]
async fn groups_are_stable_and_unique_across_queries() {
    let app = TestApp::spawn().await;
    app.directory_returns(json!([
        {"id": 1, "groups": ["ops", "dev"]},
        {"id": 2, "groups": ["dev"]},
        {"id": 3, "app_metadata": {"groups": ["dev", "qa"]}},
        {"id": 4}
    ]))
    .await;
    let token = valid_token();

    let first = app.get_with_token("/groups", &token).await;
    let second = app.get_with_token("/groups", &token).await;

    assert_eq!(first.body, second.body);
    let groups = sorted(&first.body);
    assert_eq!(groups, ["dev", "ops", "qa"]);
    assert_eq!(groups.len(), first.body.as_array().unwrap().len());

    // No caching: each query fetched the directory again.
    assert_eq!(app.directory_requests().await.len(), 2);
}

#[tokio::test]
async fn users_in_group_returns_full_records() {
    let app = TestApp::spawn().await;
    app.directory_returns(sample_users()).await;

    let res = app.get_with_token("/groups/b/users", &valid_token()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, sample_users());

    let res = app.get_with_token("/groups/a/users", &valid_token()).await;
    assert_eq!(res.body, json!([{"id": 1, "groups": ["a", "b"]}]));
}

#[tokio::test]
async fn users_in_unknown_group_is_empty_not_error() {
    let app = TestApp::spawn().await;
    app.directory_returns(sample_users()).await;

    let res = app.get_with_token("/groups/nobody/users", &valid_token()).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn directory_failure_is_a_generic_500() {
    let app = TestApp::spawn().await;
    app.directory_fails(
        403,
        json!({"statusCode": 403, "error": "Forbidden", "message": "Insufficient scope, expected: read:users"}),
    )
    .await;

    let res = app.get_with_token("/groups", &valid_token()).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"]["message"], "Failed to fetch unique groups");
    assert!(!res.body.to_string().contains("Insufficient scope"));

    let res = app.get_with_token("/groups/a/users", &valid_token()).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.body["error"]["message"],
        "Failed to fetch users for the specified group"
    );
    assert!(!res.body.to_string().contains("Insufficient scope"));
}

#[tokio::test]
async fn malformed_directory_payload_is_a_500() {
    let app = TestApp::spawn().await;
    app.directory_returns(json!({"users": [], "total": 0})).await;

    let res = app.get_with_token("/groups", &valid_token()).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"]["code"], "UPSTREAM_ERROR");
}
