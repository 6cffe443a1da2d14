//! HTTP routes for momentum
//!
//! Shared response/body helpers live here; each endpoint family gets its own
//! module. All handlers speak JSON and return `Response<BoxBody>`.

pub mod auth_routes;
pub mod goals;
pub mod health;
pub mod quote;
pub mod tasks;

pub use auth_routes::handle_auth_request;
pub use goals::handle_goals_request;
pub use health::health_check;
pub use quote::handle_quote_request;
pub use tasks::handle_tasks_request;

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::extract_token_from_header;
use crate::server::AppState;
use crate::types::TrackerError;

pub(crate) type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Error body shape shared by all failure responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Body for delete confirmations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response<BoxBody> {
    json_response(
        status,
        &ErrorResponse {
            message: message.into(),
        },
    )
}

pub(crate) fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub(crate) fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, TrackerError> {
    let body = req
        .collect()
        .await
        .map_err(|e| TrackerError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 10240 {
        return Err(TrackerError::Http("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| TrackerError::Http(format!("Invalid JSON: {}", e)))
}

pub(crate) fn get_auth_header(req: &Request<hyper::body::Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// The authenticated caller, as carried by every item operation
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
}

/// Validate the bearer token on a request.
///
/// Returns the ready-made 401 response on failure; the message distinguishes
/// a missing token, an expired token, and a malformed one.
pub(crate) fn authenticate(
    auth_header: Option<&str>,
    state: &Arc<AppState>,
) -> Result<AuthUser, Response<BoxBody>> {
    let token = match extract_token_from_header(auth_header) {
        Some(t) => t,
        None => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "No token, authorization denied",
            ))
        }
    };

    let result = state.jwt.verify_token(token);
    if !result.valid {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            result.error.unwrap_or_else(|| "Token is not valid".into()),
        ));
    }

    let claims = result.claims.expect("valid result carries claims");
    let id = match ObjectId::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Token is not valid",
            ))
        }
    };

    Ok(AuthUser {
        id,
        username: claims.username,
    })
}
