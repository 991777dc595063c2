use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_invalid_input_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_invalid_invocation_error(&self) -> bool {
        self.code == 100
    }
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        authorizor_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            102 => (StatusCode::FORBIDDEN, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_invocation_error() -> Error {
    Error {
        code: 100,
        message: "invalid invocation".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        code: 102,
        message: "unauthorized".into(),
    }
}

pub fn invalid_policy_error(reason: impl Into<String>) -> Error {
    Error {
        code: 103,
        message: format!("invalid pricing policy: {}", reason.into()),
    }
}

pub fn invalid_request_error(reason: impl Into<String>) -> Error {
    Error {
        code: 104,
        message: format!("invalid request: {}", reason.into()),
    }
}

pub fn expired_quote_error() -> Error {
    Error {
        code: 105,
        message: "quote has expired".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn authorizor_error<T: Debug>(err: T) -> Error {
    tracing::error!("authorizor error: {:?}", err);

    Error {
        code: 3,
        message: "authorizor error".into(),
    }
}

pub fn serialization_error<T: Debug>(err: T) -> Error {
    tracing::error!("serialization error: {:?}", err);

    Error {
        code: 4,
        message: "serialization error".into(),
    }
}

pub fn server_error<T: Debug>(err: T) -> Error {
    tracing::error!("server error: {:?}", err);

    Error {
        code: 5,
        message: "server error".into(),
    }
}

pub fn config_error(key: &str) -> Error {
    Error {
        code: 6,
        message: format!("invalid configuration value for {}", key),
    }
}

#[test]
fn internal_errors_hide_their_message() {
    let response = database_error("connection refused").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = config_error("LISTEN_ADDR").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn client_errors_map_to_client_status_codes() {
    let response = invalid_policy_error("tiers overlap").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = expired_quote_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = unauthorized_error().into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn policy_error_carries_reason() {
    let err = invalid_policy_error("minFee exceeds maxFee");
    assert_eq!(err.code, 103);
    assert_eq!(err.message, "invalid pricing policy: minFee exceeds maxFee");
}

#[test]
fn error_kinds_are_distinguishable() {
    assert!(invalid_input_error().is_invalid_input_error());
    assert!(!invalid_input_error().is_invalid_invocation_error());
    assert!(invalid_invocation_error().is_invalid_invocation_error());
    assert!(!invalid_request_error("distance must not be negative").is_invalid_input_error());
    assert!(!expired_quote_error().is_invalid_input_error());
}
