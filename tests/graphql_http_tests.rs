// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL HTTP surface tests.
//!
//! These tests verify that:
//! 1. Anonymous requests reach the schema (auth never rejects at the edge)
//! 2. Mutations without a signed-in user fail with UNAUTHENTICATED
//! 3. Database failures surface as INTERNAL without leaking detail
//! 4. CORS preflight and health check behave

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

/// Build a POST /graphql request carrying a GraphQL JSON body.
fn graphql_post(body: Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, token);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Read a JSON response body.
async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_graphiql_served_on_get() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/graphql")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/graphql")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/graphql")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The predicate declines the origin, so no allow-origin header comes back.
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_me_without_token_is_null() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(graphql_post(
            json!({ "query": "{ me { _id name } }" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["me"], Value::Null);
    assert!(body.get("errors").is_none(), "anonymous me should not error");
}

#[tokio::test]
async fn test_garbage_token_continues_anonymously() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(graphql_post(
            json!({ "query": "{ me { _id name } }" }),
            Some("Bearer not.a.token"),
        ))
        .await
        .unwrap();

    // Bad tokens do not fail the request; they resolve as anonymous.
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["me"], Value::Null);
}

#[tokio::test]
async fn test_create_pin_without_user_is_unauthenticated() {
    let (app, _) = common::create_test_app();

    let query = r#"
        mutation {
            createPin(input: {
                title: "Coffee",
                image: "https://example.com/c.jpg",
                content: "Great espresso",
                latitude: 37.7577,
                longitude: -122.4376
            }) { _id }
        }
    "#;

    let response = app
        .oneshot(graphql_post(json!({ "query": query }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_database_failure_surfaces_as_internal() {
    // The mock database errors on every operation.
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(graphql_post(
            json!({ "query": "{ getPins { _id title } }" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "INTERNAL");
    // The raw database detail must not leak to clients.
    assert_eq!(body["errors"][0]["message"], "Internal server error");
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}
