//! Group handlers, including the ancestor and subtree traversals.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use orgtree_core::hierarchy::{
    AncestorNode, FilterCriteria, Group, GroupId, HierarchyError, SubtreeNode,
};

use crate::{
    handlers::AppError,
    models::{CreateGroup, UpdateGroup},
    state::AppState,
};

/// List all groups (GET /api/groups).
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, AppError> {
    Ok(Json(state.service.list_groups().await?))
}

/// Create a new group (POST /api/groups).
pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<CreateGroup>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(AppError::from_rejection)?;
    let group = state.service.create_group(payload.into_new_group()).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// Get a single group by ID (GET /api/groups/{id}).
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<Group>, AppError> {
    Ok(Json(state.service.get_group(id).await?))
}

/// Update a group by ID (PUT /api/groups/{id}).
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
    payload: Result<Json<UpdateGroup>, JsonRejection>,
) -> Result<Json<Group>, AppError> {
    let Json(payload) = payload.map_err(AppError::from_rejection)?;

    Ok(Json(state.service.update_group(id, payload.into_update()).await?))
}

/// Delete a group by ID (DELETE /api/groups/{id}).
///
/// Child groups become roots and members become unassigned.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<StatusCode, AppError> {
    state.service.delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ancestor chain of a group (GET /api/groups/{id}/ancestors).
pub async fn get_ancestors(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<AncestorNode>, AppError> {
    Ok(Json(state.service.fetch_ancestors(id).await?))
}

/// Filtered subtree of a group (GET /api/groups/{id}/subtree).
///
/// Query parameters are person filters applied in the order given, e.g.
/// `?jobTitle=eng&firstName=Alice`.
pub async fn get_subtree(
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SubtreeNode>, AppError> {
    let filters = FilterCriteria::from_pairs(params).map_err(HierarchyError::from)?;

    Ok(Json(state.service.fetch_subtree(id, &filters).await?))
}
