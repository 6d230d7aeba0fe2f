use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use orgtree_core::hierarchy::{Person, PersonId};

use crate::{
    handlers::AppError,
    models::{CreatePerson, UpdatePerson},
    state::AppState,
};

/// List all persons (GET /api/persons).
pub async fn list_persons(State(state): State<AppState>) -> Result<Json<Vec<Person>>, AppError> {
    Ok(Json(state.service.list_persons().await?))
}

/// Create a new person (POST /api/persons).
pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<CreatePerson>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(AppError::from_rejection)?;
    let person = state.service.create_person(payload.into_new_person()).await?;

    Ok((StatusCode::CREATED, Json(person)))
}

/// Get a single person by ID (GET /api/persons/{id}).
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
) -> Result<Json<Person>, AppError> {
    Ok(Json(state.service.get_person(id).await?))
}

/// Update a person by ID (PUT /api/persons/{id}).
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
    payload: Result<Json<UpdatePerson>, JsonRejection>,
) -> Result<Json<Person>, AppError> {
    let Json(payload) = payload.map_err(AppError::from_rejection)?;

    Ok(Json(state.service.update_person(id, payload.into_update()).await?))
}

/// Delete a person by ID (DELETE /api/persons/{id}).
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<PersonId>,
) -> Result<StatusCode, AppError> {
    state.service.delete_person(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
