use crate::{
    auth::Identity,
    error::AppError,
    models::{Todo, TodoInput, TodoPatch, TodoQuery},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Loads a todo and runs it through the access policy. Every `/{id}` route goes through here.
async fn load_owned(state: &AppState, identity: &Identity, id: Uuid) -> Result<Todo, AppError> {
    let todo = state.todos.find_by_id(id).await?;
    state.policy.authorize(identity, todo, "Todo")
}

/// Lists the authenticated user's todos, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false` to filter by completion.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Todo` objects owned by the caller.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    query: web::Query<TodoQuery>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let todos = state
        .todos
        .list_by_owner(identity.user_id, &query)
        .await?;

    let todos: Vec<Todo> = todos
        .into_iter()
        .filter(|todo| state.policy.can_access(&identity, todo))
        .collect();

    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a todo owned by the authenticated user.
///
/// The owner is always the caller; an owner field in the body is ignored.
///
/// ## Responses:
/// - `200 OK`: the created `Todo`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: title or description out of bounds.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    todo_data: web::Json<TodoInput>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = Todo::new(todo_data.into_inner(), identity.user_id);
    let todo = state.todos.insert(todo).await?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Retrieves a single todo.
///
/// ## Responses:
/// - `200 OK`: the `Todo`.
/// - `401`, `403` (not the owner), `404` (no such todo).
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    todo_id: web::Path<Uuid>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let todo = load_owned(&state, &identity, todo_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Partially updates a todo. Absent fields keep their current value.
///
/// ## Responses:
/// - `200 OK`: the updated `Todo`.
/// - `401`, `403` (not the owner), `404` (no such todo), `422` (invalid fields).
#[put("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    todo_id: web::Path<Uuid>,
    patch: web::Json<TodoPatch>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let mut todo = load_owned(&state, &identity, todo_id.into_inner()).await?;
    todo.apply(patch.into_inner());
    let todo = state.todos.update(todo).await?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes a todo.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Todo deleted successfully"}`.
/// - `401`, `403` (not the owner), `404` (no such todo).
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    todo_id: web::Path<Uuid>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let todo = load_owned(&state, &identity, todo_id.into_inner()).await?;

    if !state.todos.delete(todo.id).await? {
        return Err(AppError::NotFound("Todo not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Todo deleted successfully" })))
}
