// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_graphql::ErrorExtensions;
use pindrop::error::AppError;

fn extension_code(err: &AppError) -> String {
    let extended = err.extend();
    let json = serde_json::to_value(&extended.extensions).unwrap();
    json["code"].as_str().unwrap().to_string()
}

#[test]
fn test_error_codes_follow_apollo_convention() {
    assert_eq!(AppError::Unauthenticated.code(), "UNAUTHENTICATED");
    assert_eq!(AppError::Forbidden.code(), "FORBIDDEN");
    assert_eq!(AppError::NotFound("pin p1".to_string()).code(), "NOT_FOUND");
    assert_eq!(
        AppError::BadRequest("bad title".to_string()).code(),
        "BAD_USER_INPUT"
    );
    assert_eq!(AppError::Database("boom".to_string()).code(), "INTERNAL");
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).code(),
        "INTERNAL"
    );
}

#[test]
fn test_extend_carries_code_extension() {
    assert_eq!(
        extension_code(&AppError::Unauthenticated),
        "UNAUTHENTICATED"
    );
    assert_eq!(extension_code(&AppError::Forbidden), "FORBIDDEN");
    assert_eq!(
        extension_code(&AppError::NotFound("pin p1".to_string())),
        "NOT_FOUND"
    );
}

#[test]
fn test_client_facing_messages_keep_their_detail() {
    let err = AppError::NotFound("pin p1".to_string()).extend();
    assert_eq!(err.message, "Resource not found: pin p1");

    let err = AppError::BadRequest("title too long".to_string()).extend();
    assert_eq!(err.message, "Invalid request: title too long");
}

#[test]
fn test_database_detail_does_not_leak() {
    let err = AppError::Database("connection to 10.0.0.5:443 refused".to_string()).extend();
    assert_eq!(err.message, "Internal server error");

    let err = AppError::Internal(anyhow::anyhow!("stack detail here")).extend();
    assert_eq!(err.message, "Internal server error");
}

#[test]
fn test_validation_errors_map_to_bad_input() {
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1))]
        title: String,
    }

    let probe = Probe {
        title: String::new(),
    };
    let err: AppError = probe.validate().unwrap_err().into();
    assert_eq!(err.code(), "BAD_USER_INPUT");
}
