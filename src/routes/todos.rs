use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Todo, TodoInput},
    store::TodoStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Loads a todo and checks it belongs to the caller: absent rows are 404,
/// rows owned by someone else are 403.
async fn owned_todo(
    store: &dyn TodoStore,
    id: Uuid,
    owner: Uuid,
) -> Result<Todo, AppError> {
    let todo = store.find_by_id(id).await?.ok_or(AppError::TodoNotFound)?;
    if todo.user_id != owner {
        return Err(AppError::AccessDenied);
    }
    Ok(todo)
}

/// Create a todo owned by the caller.
#[post("")]
pub async fn create_todo(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
    body: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let todo = Todo::new(body.into_inner(), user.0.id);
    store.insert(&todo).await?;
    Ok(HttpResponse::Created().json(todo))
}

/// List the caller's todos, newest first.
#[get("")]
pub async fn list_todos(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todos = store.list_by_user(user.0.id).await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

/// Search the caller's todos by title substring (case-insensitive).
#[get("/search")]
pub async fn search_todos(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, AppError> {
    let todos = store.search_by_title(user.0.id, &query.keyword).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Fetch a single todo by id.
#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = owned_todo(store.as_ref(), id.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Replace a todo's title, description and completion flag.
#[put("/{id}")]
pub async fn update_todo(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
    id: web::Path<Uuid>,
    body: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let mut todo = owned_todo(store.as_ref(), id.into_inner(), user.0.id).await?;
    todo.apply(body.into_inner());
    store.update(&todo).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Delete a todo.
#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<dyn TodoStore>,
    user: CurrentUser,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = owned_todo(store.as_ref(), id.into_inner(), user.0.id).await?;
    store.delete(todo.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
