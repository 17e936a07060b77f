// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL API client for the pindrop server.
//!
//! Handles:
//! - Query/mutation execution over HTTP POST
//! - Response envelope decoding (`data` + `errors`)
//! - Attaching the Google ID token for authenticated calls

use crate::client::types::{Pin, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const ME_QUERY: &str = "
query {
    me {
        _id
        name
        email
        picture
    }
}
";

const GET_PINS_QUERY: &str = "
query {
    getPins {
        _id
        createdAt
        title
        image
        content
        latitude
        longitude
        author {
            _id
            name
            email
            picture
        }
        comments {
            text
            createdAt
            author {
                _id
                name
                picture
            }
        }
    }
}
";

const CREATE_PIN_MUTATION: &str = "
mutation($input: CreatePinInput!) {
    createPin(input: $input) {
        _id
        createdAt
        title
        image
        content
        latitude
        longitude
        author {
            _id
            name
            email
            picture
        }
        comments {
            text
            createdAt
        }
    }
}
";

const DELETE_PIN_MUTATION: &str = "
mutation($pinId: ID!) {
    deletePin(pinId: $pinId) {
        _id
        createdAt
        title
        image
        content
        latitude
        longitude
    }
}
";

const CREATE_COMMENT_MUTATION: &str = "
mutation($pinId: ID!, $text: String!) {
    createComment(pinId: $pinId, text: $text) {
        _id
        createdAt
        title
        image
        content
        latitude
        longitude
        author {
            _id
            name
            email
            picture
        }
        comments {
            text
            createdAt
            author {
                _id
                name
                picture
            }
        }
    }
}
";

/// Errors from talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned error: {message}")]
    GraphQL {
        message: String,
        code: Option<String>,
    },

    #[error("response carried no data")]
    MissingData,
}

/// Fields for a new pin, matching the server's `CreatePinInput`.
#[derive(Debug, Clone, Serialize)]
pub struct PinSubmission {
    pub title: String,
    pub image: String,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct ResponseBody<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
    #[serde(default)]
    extensions: serde_json::Value,
}

impl ErrorEntry {
    fn code(&self) -> Option<String> {
        self.extensions
            .get("code")
            .and_then(|code| code.as_str())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
struct MeData {
    me: Option<User>,
}

#[derive(Deserialize)]
struct GetPinsData {
    #[serde(rename = "getPins")]
    get_pins: Vec<Pin>,
}

#[derive(Deserialize)]
struct CreatePinData {
    #[serde(rename = "createPin")]
    create_pin: Pin,
}

#[derive(Deserialize)]
struct DeletePinData {
    #[serde(rename = "deletePin")]
    delete_pin: Pin,
}

#[derive(Deserialize)]
struct CreateCommentData {
    #[serde(rename = "createComment")]
    create_comment: Pin,
}

/// GraphQL API client.
#[derive(Clone)]
pub struct PindropClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl PindropClient {
    /// Create an unauthenticated client against the given `/graphql` endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// Attach a Google ID token for subsequent calls.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Fetch the caller's profile. `None` means the token was missing or
    /// rejected and the server sees us as anonymous.
    pub async fn me(&self) -> Result<Option<User>, ClientError> {
        let data: MeData = self.execute(ME_QUERY, json!({})).await?;
        Ok(data.me)
    }

    /// Fetch all pins, oldest first.
    pub async fn get_pins(&self) -> Result<Vec<Pin>, ClientError> {
        let data: GetPinsData = self.execute(GET_PINS_QUERY, json!({})).await?;
        Ok(data.get_pins)
    }

    /// Create a pin from a completed draft.
    pub async fn create_pin(&self, submission: PinSubmission) -> Result<Pin, ClientError> {
        let data: CreatePinData = self
            .execute(CREATE_PIN_MUTATION, json!({ "input": submission }))
            .await?;
        Ok(data.create_pin)
    }

    /// Delete a pin by id. The server enforces ownership.
    pub async fn delete_pin(&self, pin_id: &str) -> Result<Pin, ClientError> {
        let data: DeletePinData = self
            .execute(DELETE_PIN_MUTATION, json!({ "pinId": pin_id }))
            .await?;
        Ok(data.delete_pin)
    }

    /// Add a comment and get the updated pin back.
    pub async fn create_comment(&self, pin_id: &str, text: &str) -> Result<Pin, ClientError> {
        let data: CreateCommentData = self
            .execute(
                CREATE_COMMENT_MUTATION,
                json!({ "pinId": pin_id, "text": text }),
            )
            .await?;
        Ok(data.create_comment)
    }

    /// Execute one GraphQL document and decode the envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ClientError> {
        let mut request = self.http.post(&self.endpoint).json(&RequestBody {
            query,
            variables,
        });

        if let Some(token) = &self.auth_token {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: ResponseBody<T> = response.json().await?;

        decode_envelope(body)
    }
}

/// Turn a decoded envelope into data or the first server error.
fn decode_envelope<T>(body: ResponseBody<T>) -> Result<T, ClientError> {
    if let Some(entry) = body.errors.first() {
        return Err(ClientError::GraphQL {
            message: entry.message.clone(),
            code: entry.code(),
        });
    }

    body.data.ok_or(ClientError::MissingData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data_decodes() {
        let raw = r#"{
            "data": {
                "me": {
                    "_id": "google-sub-1",
                    "name": "Ada",
                    "email": "ada@example.com",
                    "picture": null
                }
            }
        }"#;

        let body: ResponseBody<MeData> = serde_json::from_str(raw).unwrap();
        let data = decode_envelope(body).unwrap();
        let me = data.me.unwrap();
        assert_eq!(me.id, "google-sub-1");
        assert_eq!(me.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn envelope_error_wins_over_partial_data() {
        let raw = r#"{
            "data": null,
            "errors": [
                {
                    "message": "Not authenticated",
                    "extensions": { "code": "UNAUTHENTICATED" }
                }
            ]
        }"#;

        let body: ResponseBody<MeData> = serde_json::from_str(raw).unwrap();
        let err = decode_envelope(body).unwrap_err();
        match err {
            ClientError::GraphQL { message, code } => {
                assert_eq!(message, "Not authenticated");
                assert_eq!(code.as_deref(), Some("UNAUTHENTICATED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_data_and_errors_is_an_error() {
        let raw = r#"{ "data": null }"#;
        let body: ResponseBody<GetPinsData> = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            decode_envelope(body),
            Err(ClientError::MissingData)
        ));
    }

    #[test]
    fn pin_wire_format_decodes() {
        let raw = r#"{
            "data": {
                "getPins": [
                    {
                        "_id": "pin-1",
                        "createdAt": "2026-08-24T12:00:00Z",
                        "title": "Coffee",
                        "image": "https://example.com/c.jpg",
                        "content": "Great espresso",
                        "latitude": 37.7577,
                        "longitude": -122.4376,
                        "author": { "_id": "u1", "name": "Ada" },
                        "comments": [
                            {
                                "text": "Agreed",
                                "createdAt": "2026-08-24T12:05:00Z",
                                "author": { "_id": "u2", "name": "Grace" }
                            }
                        ]
                    }
                ]
            }
        }"#;

        let body: ResponseBody<GetPinsData> = serde_json::from_str(raw).unwrap();
        let pins = decode_envelope(body).unwrap().get_pins;
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].id, "pin-1");
        assert_eq!(pins[0].comments.len(), 1);
        assert_eq!(
            pins[0].comments[0].author.as_ref().map(|a| a.id.as_str()),
            Some("u2")
        );
    }
}
