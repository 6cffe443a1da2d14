//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling; one spawned task per
//! connection, match-based routing over the path families.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::MongoClient;
use crate::quote::{QuoteCache, QuoteFetcher};
use crate::routes;
use crate::routes::BoxBody;
use crate::types::TrackerError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: MongoClient,
    pub jwt: JwtValidator,
    /// Quote cache, injected into the quote handler
    pub quote_cache: Arc<QuoteCache>,
    /// Upstream quote client
    pub quote_fetcher: QuoteFetcher,
}

impl AppState {
    /// Create application state from validated configuration
    pub fn new(args: Args, mongo: MongoClient) -> Result<Self, TrackerError> {
        let jwt = if args.dev_mode && args.jwt_secret.is_none() {
            JwtValidator::new_dev()
        } else {
            JwtValidator::new(args.jwt_secret(), args.jwt_expiry_seconds)?
        };

        let quote_cache = Arc::new(QuoteCache::new(Duration::from_secs(
            args.quote_cache_ttl_seconds,
        )));
        let quote_fetcher = QuoteFetcher::new(args.quote_api_url.clone());

        Ok(Self {
            args,
            mongo,
            jwt,
            quote_cache,
            quote_fetcher,
        })
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), TrackerError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Momentum listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - using built-in JWT secret");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // Item routes (/api/tasks*, /api/goals*) - these consume the request
    if path.starts_with("/api/tasks") {
        if let Some(response) = routes::handle_tasks_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    if path.starts_with("/api/goals") {
        if let Some(response) = routes::handle_goals_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    // Auth routes (/api/auth/*)
    if path.starts_with("/api/auth") {
        if let Some(response) = routes::handle_auth_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    let response = match (method, path.as_str()) {
        // Health check
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        // Motivational quote (no auth)
        (Method::GET, "/api/quote") => {
            let query = req.uri().query();
            routes::handle_quote_request(query, Arc::clone(&state)).await
        }

        // CORS preflight
        (Method::OPTIONS, _) => routes::cors_preflight(),

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Not found response
fn not_found_response(path: &str) -> Response<BoxBody> {
    let body = serde_json::json!({
        "message": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(routes::full_body(body.to_string()))
        .unwrap()
}
