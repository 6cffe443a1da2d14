//! HTTP routes for tasks
//!
//! CRUD + reorder, scoped to the authenticated owner. Every response carries
//! the full task shape; list order is store-native (clients sort by `order`).

use bson::{doc, oid::ObjectId};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::schemas::{TaskDoc, TASK_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::{
    authenticate, cors_preflight, error_response, get_auth_header, json_response, parse_json_body,
    AuthUser, BoxBody, MessageResponse,
};
use crate::server::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Task as returned to clients. Every field is always present.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub order: f64,
}

impl TaskResponse {
    fn from_doc(doc: TaskDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            title: doc.title,
            completed: doc.completed,
            order: doc.order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
}

/// Partial update. Fields arrive as raw JSON values so a wrong type yields a
/// 400 naming the field instead of a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: Option<serde_json::Value>,
    pub title: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "newOrder")]
    pub new_order: Option<serde_json::Value>,
}

/// Validate a partial update and build the `$set` document.
///
/// A body with none of the recognized fields is rejected as a no-op.
pub(crate) fn build_task_update(body: &UpdateTaskRequest) -> Result<bson::Document, String> {
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
) -> Result<MongoCollection<TaskDoc>, Response<BoxBody>> {
    state
        .mongo
        .collection::<TaskDoc>(TASK_COLLECTION)
        .await
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
        })
}

fn parse_task_id(id: &str) -> Result<ObjectId, Response<BoxBody>> {
    // An id that cannot be a document id cannot belong to the caller
    ObjectId::parse_str(id)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "Task not found"))
}

/// GET /api/tasks
///
/// All tasks owned by the caller, in store-native order.
async fn handle_list(user: AuthUser, state: Arc<AppState>) -> Response<BoxBody> {
    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! { "user_id": user.id }).await {
        Ok(tasks) => {
            let tasks: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from_doc).collect();
            json_response(StatusCode::OK, &tasks)
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error fetching tasks: {}", e),
        ),
    }
}

/// POST /api/tasks
///
/// New tasks start uncompleted at order 0.
async fn handle_create(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: CreateTaskRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let title = body.title.trim().to_string();
    if title.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Task title is required");
    }

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut task = TaskDoc::new(user.id, title);
    match collection.insert_one(task.clone()).await {
        Ok(id) => {
            task._id = Some(id);
            json_response(StatusCode::CREATED, &TaskResponse::from_doc(task))
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error creating task: {}", e),
        ),
    }
}

/// PUT /api/tasks/:id
///
/// Partial field update; unknown or unowned ids are indistinguishable.
async fn handle_update(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let task_id = match parse_task_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let body: UpdateTaskRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        }
    };

    let updates = match build_task_update(&body) {
        Ok(u) => u,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection
        .find_one_and_update(
            doc! { "_id": task_id, "user_id": user.id },
            doc! { "$set": updates },
        )
        .await
    {
        Ok(Some(task)) => json_response(StatusCode::OK, &TaskResponse::from_doc(task)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error updating task: {}", e),
        ),
    }
}

/// PUT /api/tasks/:id/reorder
///
/// Stores the new order value verbatim. Siblings are never renumbered, so
/// duplicate order values can accumulate; display order then falls back to
/// arrival order for ties.
async fn handle_reorder(
    req: Request<hyper::body::Incoming>,
    user: AuthUser,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let task_id = match parse_task_id(id) {
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
            doc! { "_id": task_id, "user_id": user.id },
            doc! { "$set": { "order": new_order } },
        )
        .await
    {
        Ok(Some(task)) => json_response(StatusCode::OK, &TaskResponse::from_doc(task)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error reordering task: {}", e),
        ),
    }
}

/// DELETE /api/tasks/:id
///
/// Hard delete; the document is gone immediately.
async fn handle_delete(user: AuthUser, state: Arc<AppState>, id: &str) -> Response<BoxBody> {
    let task_id = match parse_task_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let collection = match collection(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection
        .find_one_and_delete(doc! { "_id": task_id, "user_id": user.id })
        .await
    {
        Ok(Some(_)) => json_response(
            StatusCode::OK,
            &MessageResponse {
                message: "Task deleted".into(),
            },
        ),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error deleting task: {}", e),
        ),
    }
}

// =============================================================================
// Router
// =============================================================================

/// Route /api/tasks* requests. Returns None for paths outside this family.
pub async fn handle_tasks_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();

    let rest = path.strip_prefix("/api/tasks")?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    if req.method() == Method::OPTIONS {
        return Some(cors_preflight());
    }

    // Every task operation requires a valid session
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
        _ => error_response(StatusCode::NOT_FOUND, "Task endpoint not found"),
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(body: serde_json::Value) -> UpdateTaskRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_update_accepts_each_recognized_field() {
        let updates =
            build_task_update(&update(json!({ "completed": true, "order": 3 }))).unwrap();
        assert!(updates.get_bool("completed").unwrap());
        assert_eq!(updates.get_f64("order").unwrap(), 3.0);

        let updates = build_task_update(&update(json!({ "title": "  Buy milk  " }))).unwrap();
        assert_eq!(updates.get_str("title").unwrap(), "Buy milk");
    }

    #[test]
    fn test_update_rejects_non_boolean_completed() {
        let err = build_task_update(&update(json!({ "completed": "yes" }))).unwrap_err();
        assert_eq!(err, "Completed must be a boolean");
    }

    #[test]
    fn test_update_rejects_empty_title() {
        let err = build_task_update(&update(json!({ "title": "   " }))).unwrap_err();
        assert_eq!(err, "Title must be a non-empty string");

        let err = build_task_update(&update(json!({ "title": 7 }))).unwrap_err();
        assert_eq!(err, "Title must be a non-empty string");
    }

    #[test]
    fn test_update_rejects_non_numeric_order() {
        let err = build_task_update(&update(json!({ "order": "5" }))).unwrap_err();
        assert_eq!(err, "Order must be a number");
    }

    #[test]
    fn test_update_with_no_recognized_fields_is_rejected() {
        let err = build_task_update(&update(json!({}))).unwrap_err();
        assert_eq!(err, "No valid fields to update");

        // Unrecognized fields do not count
        let err = build_task_update(&update(json!({ "owner": "someone-else" }))).unwrap_err();
        assert_eq!(err, "No valid fields to update");
    }

    #[test]
    fn test_fractional_order_is_accepted() {
        let updates = build_task_update(&update(json!({ "order": 2.5 }))).unwrap();
        assert_eq!(updates.get_f64("order").unwrap(), 2.5);
    }
}
