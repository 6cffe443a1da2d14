//! HTTP routes for authentication
//!
//! - POST /api/auth/register - Create an account, returns a session token
//! - POST /api/auth/login    - Authenticate and get a session token
//! - GET  /api/auth/verify   - Check the current token, returns the username

use bson::doc;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, TokenInput};
use crate::db::schemas::{UserDoc, USER_COLLECTION};
use crate::routes::{
    authenticate, cors_preflight, error_response, get_auth_header, json_response, parse_json_body,
    BoxBody, ErrorResponse,
};
use crate::server::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub username: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /api/auth/register
///
/// Flow:
/// 1. Validate required fields
/// 2. Check the email is not already registered
/// 3. Hash the password with argon2
/// 4. Store the user and return a JWT token
async fn handle_register(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: RegisterRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let email = body.email.trim().to_string();
    let username = body.username.trim().to_string();

    if email.is_empty() || body.password.is_empty() || username.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: email, password, username",
        );
    }

    if body.password.len() < 8 {
        return error_response(StatusCode::BAD_REQUEST, "Password must be at least 8 characters");
    }

    let collection = match state.mongo.collection::<UserDoc>(USER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        }
    };

    // Check if the email is already registered
    match collection.find_one(doc! { "email": &email }).await {
        Ok(Some(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                "An account with this email already exists",
            )
        }
        Ok(None) => {}
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        }
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to hash password: {}", e),
            )
        }
    };

    let user = UserDoc::new(email.clone(), username.clone(), password_hash);

    let user_id = match collection.insert_one(user).await {
        Ok(id) => id,
        Err(e) => {
            // Unique index may race with the existence check above
            let error_str = e.to_string();
            if error_str.contains("duplicate key") || error_str.contains("E11000") {
                return error_response(
                    StatusCode::CONFLICT,
                    "An account with this email already exists",
                );
            }
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create user: {}", e),
            );
        }
    };

    info!("Registered new user: {}", email);

    let token = match state.jwt.generate_token(TokenInput {
        user_id: user_id.to_hex(),
        username: username.clone(),
    }) {
        Ok(t) => t,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate token: {}", e),
            )
        }
    };

    json_response(StatusCode::CREATED, &AuthResponse { token, username })
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same generic 401 to prevent
/// account enumeration.
async fn handle_login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let email = body.email.trim().to_string();
    if email.is_empty() || body.password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: email, password",
        );
    }

    let collection = match state.mongo.collection::<UserDoc>(USER_COLLECTION).await {
        Ok(c) => c,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        }
    };

    let user = match collection.find_one(doc! { "email": &email }).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("Login failed - user not found: {}", email);
            return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        }
    };

    let password_valid = match verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Password verification error: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error");
        }
    };

    if !password_valid {
        warn!("Login failed - invalid password: {}", email);
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let user_id = match user._id {
        Some(id) => id,
        None => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "User record missing id")
        }
    };

    let token = match state.jwt.generate_token(TokenInput {
        user_id: user_id.to_hex(),
        username: user.username.clone(),
    }) {
        Ok(t) => t,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate token: {}", e),
            )
        }
    };

    info!("Login successful: {}", email);

    json_response(
        StatusCode::OK,
        &AuthResponse {
            token,
            username: user.username,
        },
    )
}

/// GET /api/auth/verify
///
/// Get the current user's name from the token.
async fn handle_verify(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let user = match authenticate(get_auth_header(&req), &state) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    json_response(
        StatusCode::OK,
        &VerifyResponse {
            username: user.username,
        },
    )
}

// =============================================================================
// Router
// =============================================================================

/// Route /api/auth/* requests. Returns None for paths outside this family.
pub async fn handle_auth_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let method = req.method();

    if !path.starts_with("/api/auth") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    // Remove query string for matching
    let path = path.split('?').next().unwrap_or(path);

    let response = match (method, path) {
        (&Method::POST, "/api/auth/register") => handle_register(req, state).await,
        (&Method::POST, "/api/auth/login") => handle_login(req, state).await,
        (&Method::GET, "/api/auth/verify") => handle_verify(req, state).await,

        (_, "/api/auth/register") | (_, "/api/auth/login") | (_, "/api/auth/verify") => {
            json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &ErrorResponse {
                    message: "Method not allowed".into(),
                },
            )
        }

        _ => json_response(
            StatusCode::NOT_FOUND,
            &ErrorResponse {
                message: "Auth endpoint not found".into(),
            },
        ),
    };

    Some(response)
}
