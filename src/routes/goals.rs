//! HTTP routes for goals
//!
//! Mirrors the task routes, with a category type validated against the
//! fixed enumeration {general, weekly, monthly}.

use bson::{doc, oid::ObjectId};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::schemas::{GoalDoc, GoalType, GOAL_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::{
    authenticate, cors_preflight, error_response, get_auth_header, json_response, parse_json_body,
    AuthUser, BoxBody, MessageResponse,
};
use crate::server::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Goal as returned to clients. Every field is always present.
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub order: f64,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

impl GoalResponse {
    fn from_doc(doc: GoalDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            title: doc.title,
            completed: doc.completed,
            order: doc.order,
            goal_type: doc.goal_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub goal_type: Option<serde_json::Value>,
}

/// Partial update. Fields arrive as raw JSON values so a wrong type yields a
/// 400 naming the field instead of a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub completed: Option<serde_json::Value>,
    pub title: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub goal_type: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "newOrder")]
    pub new_order: Option<serde_json::Value>,
}

/// Resolve the requested goal type, defaulting to general when absent.
pub(crate) fn parse_goal_type(value: Option<&serde_json::Value>) -> Result<GoalType, String> {
    match value {
        None => Ok(GoalType::default()),
        Some(v) => v
            .as_str()
            .and_then(|s| s.parse::<GoalType>().ok())
            .ok_or_else(|| "Invalid goal type".to_string()),
    }
}

/// Validate a partial update and build the `$set` document.
///
/// A body with none of the recognized fields is rejected as a no-op.
pub(crate) fn build_goal_update(body: &UpdateGoalRequest) -> Result<bson::Document, String> {
    let mut updates = bson::Document::new();

    if let Some(completed) = &body.completed {
        match completed.as_bool() {
            Some(value) => {
                updates.insert("completed", value);
            }
            None => return Err("Completed must be a boolean".into()),
        }
    }

    if let Some(title) = &body.title {
        match title.as_str() {
            Some(value) if !value.trim().is_empty() => {
                updates.insert("title", value.trim());
            }
            _ => return Err("Title must be a non-empty string".into()),
        }
    }

    if let Some(order) = &body.order {
        match order.as_f64() {
            Some(value) => {
                updates.insert("order", value);
            }
            None => return Err("Order must be a number".into()),
        }
    }

    if let Some(goal_type) = &body.goal_type {
        match goal_type.as_str().and_then(|s| s.parse::<GoalType>().ok()) {
            Some(value) => {
                updates.insert("goal_type", value.as_str());
            }
            None => return Err("Invalid goal type".into()),
        }
    }

    if updates.is_empty() {
        return Err("No valid fields to update".into());
    }

    Ok(updates)
}

// =============================================================================
// Route Handlers
// =============================================================================

async fn collection(
    state: &AppState,
) -> Result<MongoCollection<GoalDoc>, Response<BoxBody>> {
    state
        .mongo
        .collection::<GoalDoc>(GOAL_COLLECTION)
        .await
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })
}

fn parse_goal_id(id: &str) -> Result<ObjectId, Response<BoxBody>> {
    ObjectId::parse_str(id)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "Goal not found"))
}

/// GET /api/goals
async fn handle_list(user: AuthUser, state: Arc<AppState>) -> Response<BoxBody> {
    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! { "user_id": user.id }).await {
        Ok(goals) => {
            let goals: Vec<GoalResponse> = goals.into_iter().map(GoalResponse::from_doc).collect();
            json_response(StatusCode::OK, &goals)
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error fetching goals: {}", e),
        ),
    }
}

/// POST /api/goals
///
/// New goals start uncompleted at order 0; type defaults to general.
async fn handle_create(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: CreateGoalRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let title = body.title.trim().to_string();
    if title.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Title is required");
    }

    let goal_type = match parse_goal_type(body.goal_type.as_ref()) {
        Ok(t) => t,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut goal = GoalDoc::new(user.id, title, goal_type);
    match collection.insert_one(goal.clone()).await {
        Ok(id) => {
            goal._id = Some(id);
            json_response(StatusCode::CREATED, &GoalResponse::from_doc(goal))
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error creating goal: {}", e),
        ),
    }
}

/// PUT /api/goals/:id
async fn handle_update(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let goal_id = match parse_goal_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let body: UpdateGoalRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let updates = match build_goal_update(&body) {
        Ok(u) => u,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection
        .find_one_and_update(
            doc! { "_id": goal_id, "user_id": user.id },
            doc! { "$set": updates },
        )
        .await
    {
        Ok(Some(goal)) => json_response(StatusCode::OK, &GoalResponse::from_doc(goal)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Goal not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error updating goal: {}", e),
        ),
    }
}

/// PUT /api/goals/:id/reorder
///
/// Stores the new order value verbatim; siblings are never renumbered.
async fn handle_reorder(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let goal_id = match parse_goal_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let body: ReorderRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let new_order = match body.new_order.as_ref().and_then(|v| v.as_f64()) {
        Some(value) => value,
        None => return error_response(StatusCode::BAD_REQUEST, "New order must be a number"),
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection
        .find_one_and_update(
            doc! { "_id": goal_id, "user_id": user.id },
            doc! { "$set": { "order": new_order } },
        )
        .await
    {
        Ok(Some(goal)) => json_response(StatusCode::OK, &GoalResponse::from_doc(goal)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Goal not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error reordering goal: {}", e),
        ),
    }
}

/// DELETE /api/goals/:id
async fn handle_delete(user: AuthUser, state: Arc<AppState>, id: &str) -> Response<BoxBody> {
    let goal_id = match parse_goal_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection
        .find_one_and_delete(doc! { "_id": goal_id, "user_id": user.id })
        .await
    {
        Ok(Some(_)) => json_response(
            StatusCode::OK,
            &MessageResponse {
                message: "Goal deleted".into(),
            },
        ),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Goal not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error deleting goal: {}", e),
        ),
    }
}

// =============================================================================
// Router
// =============================================================================

/// Route /api/goals* requests. Returns None for paths outside this family.
pub async fn handle_goals_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();

    let rest = path.strip_prefix("/api/goals")?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    if req.method() == Method::OPTIONS {
        return Some(cors_preflight());
    }

    // Every goal operation requires a valid session
    let user = match authenticate(get_auth_header(&req), &state) {
        Ok(u) => u,
        Err(resp) => return Some(resp),
    };

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let method = req.method().clone();

    let response = match (method, segments.as_slice()) {
        (Method::GET, []) => handle_list(user, state).await,
        (Method::POST, []) => handle_create(req, user, state).await,
        (Method::PUT, [id]) => {
            let id = id.to_string();
            handle_update(req, user, state, &id).await
        }
        (Method::PUT, [id, "reorder"]) => {
            let id = id.to_string();
            handle_reorder(req, user, state, &id).await
        }
        (Method::DELETE, [id]) => {
            let id = id.to_string();
            handle_delete(user, state, &id).await
        }
        _ => error_response(StatusCode::NOT_FOUND, "Goal endpoint not found"),
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(body: serde_json::Value) -> UpdateGoalRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_goal_type_defaults_to_general_when_omitted() {
        assert_eq!(parse_goal_type(None), Ok(GoalType::General));
    }

    #[test]
    fn test_goal_type_parses_valid_values() {
        let weekly = json!("weekly");
        assert_eq!(parse_goal_type(Some(&weekly)), Ok(GoalType::Weekly));
    }

    #[test]
    fn test_goal_type_rejects_invalid_values() {
        let invalid = json!("invalid");
        assert_eq!(
            parse_goal_type(Some(&invalid)),
            Err("Invalid goal type".to_string())
        );

        let not_a_string = json!(3);
        assert_eq!(
            parse_goal_type(Some(&not_a_string)),
            Err("Invalid goal type".to_string())
        );
    }

    #[test]
    fn test_update_accepts_type_change() {
        let updates = build_goal_update(&update(json!({ "type": "monthly" }))).unwrap();
        assert_eq!(updates.get_str("goal_type").unwrap(), "monthly");
    }

    #[test]
    fn test_update_rejects_invalid_type() {
        let err = build_goal_update(&update(json!({ "type": "yearly" }))).unwrap_err();
        assert_eq!(err, "Invalid goal type");
    }

    #[test]
    fn test_update_with_no_recognized_fields_is_rejected() {
        let err = build_goal_update(&update(json!({}))).unwrap_err();
        assert_eq!(err, "No valid fields to update");
    }

    #[test]
    fn test_update_mixes_fields() {
        let updates =
            build_goal_update(&update(json!({ "completed": true, "type": "weekly" }))).unwrap();
        assert!(updates.get_bool("completed").unwrap());
        assert_eq!(updates.get_str("goal_type").unwrap(), "weekly");
    }
}
