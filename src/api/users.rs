//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, UserFilter, UserInfo},
};

use super::AuthenticatedUser;

/// Register a new user account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let user = state.services.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<UserInfo>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<UserInfo>>> {
    claims.require_admin()?;

    let users = state.services.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// Search users by optional criteria
#[utoipa::path(
    get,
    path = "/users/filter",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserFilter),
    responses(
        (status = 200, description = "Users matching the criteria", body = Vec<UserInfo>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn filter_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Vec<UserInfo>>> {
    claims.require_admin()?;

    let users = state.services.users.find_users(&filter).await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserInfo),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserInfo>> {
    require_self_or_admin(&claims, id)?;

    let user = state.services.users.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Update a user account
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserInfo),
        (status = 400, description = "Invalid input or no fields to update"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(mut request): Json<UpdateUser>,
) -> AppResult<Json<UserInfo>> {
    require_self_or_admin(&claims, id)?;

    // Only admins may change role or account status
    if claims.require_admin().is_err() {
        request.role = None;
        request.status = None;
    }

    let user = state.services.users.update_user(id, request).await?;
    Ok(Json(user.into()))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_self_or_admin(claims: &crate::models::user::UserClaims, id: Uuid) -> AppResult<()> {
    if claims.user_id == id || claims.require_admin().is_ok() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Not allowed to access another user's account".to_string(),
        ))
    }
}
