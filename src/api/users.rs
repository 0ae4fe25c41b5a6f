// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints.
//!
//! Signup and login are open. Reads are open as well; mutations require a
//! bearer token and pass through the ownership check, so a user can only
//! modify their own account while admins can modify anyone's.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, Auth, Role};
use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, SignupResponse, UpdateUserRequest,
};
use crate::query::{project_records, RawPageParams};
use crate::state::AppState;
use crate::storage::{can_mutate, CodeRepository, CodeResponse, StorageError, StoredUser};
use crate::storage::{UserRepository, UserResponse};

// ========== Handlers ==========

/// List accounts.
///
/// Out-of-range paging values fall back to their defaults rather than
/// clamping, and `fields` trims each record to the named top-level keys.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(RawPageParams),
    responses(
        (status = 200, description = "Accounts matching the page window", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<RawPageParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let window = params.normalize();

    let repo = UserRepository::new(&state.storage);
    let users = repo
        .list(&window)
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    let projected = project_records(&responses, &window.fields)
        .map_err(|e| ApiError::internal(format!("Failed to project users: {e}")))?;

    Ok(Json(projected))
}

/// Register a new account.
///
/// Every signup gets the user role; promotion happens later through an
/// admin PATCH.
#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "Users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let repo = UserRepository::new(&state.storage);

    let existing = repo
        .find_by_email(&request.email)
        .map_err(|e| ApiError::internal(format!("Failed to check email: {e}")))?;
    if !existing.is_empty() {
        return Err(ApiError::conflict("Email already exists"));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        email: request.email,
        name: request.name,
        age: request.age,
        country: request.country,
        password_hash,
        role: Role::User,
        created_at: Utc::now(),
    };

    repo.create(&user)
        .map_err(|e| ApiError::internal(format!("Failed to create user: {e}")))?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Exchange credentials for a bearer token.
///
/// Unknown email and wrong password both come back as the same 401 so the
/// response does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let repo = UserRepository::new(&state.storage);

    let matches = repo
        .find_by_email(&request.email)
        .map_err(|e| ApiError::internal(format!("Failed to look up email: {e}")))?;
    let Some(user) = matches.into_iter().next() else {
        return Err(ApiError::unauthorized("Authentication failed"));
    };

    let verified = verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::internal(format!("Failed to verify password: {e}")))?;
    if !verified {
        return Err(ApiError::unauthorized("Authentication failed"));
    }

    let token = state
        .tokens
        .issue(&user.id, user.role, &user.email)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse {
        message: "Authentication successful".to_string(),
        token,
    }))
}

/// Fetch a single account by id.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account found", body = UserResponse),
        (status = 404, description = "No such account")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let repo = UserRepository::new(&state.storage);

    let user = repo.get(&user_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
        other => ApiError::internal(format!("Failed to load user: {other}")),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// List the code submissions owned by one account.
#[utoipa::path(
    get,
    path = "/users/{user_id}/codes",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "Account id"),
        RawPageParams
    ),
    responses(
        (status = 200, description = "Codes owned by the account", body = Vec<CodeResponse>)
    )
)]
pub async fn list_user_codes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RawPageParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let window = params.normalize();

    let repo = CodeRepository::new(&state.storage);
    let codes = repo
        .list_by_owner(&user_id, &window)
        .map_err(|e| ApiError::internal(format!("Failed to list codes: {e}")))?;

    let responses: Vec<CodeResponse> = codes.into_iter().map(CodeResponse::from).collect();
    let projected = project_records(&responses, &window.fields)
        .map_err(|e| ApiError::internal(format!("Failed to project codes: {e}")))?;

    Ok(Json(projected))
}

/// Update an account.
///
/// All fields are optional. The role field only takes effect when the
/// caller is an admin; for everyone else it is silently dropped.
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "Account id")
    ),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account updated", body = MessageResponse),
        (status = 403, description = "Caller does not own the account"),
        (status = 404, description = "No such account"),
        (status = 409, description = "New email already registered")
    )
)]
pub async fn update_user(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !can_mutate(&actor, &user_id) {
        return Err(ApiError::forbidden(
            "You do not have permission to modify this user",
        ));
    }

    let repo = UserRepository::new(&state.storage);

    let mut user = repo.get(&user_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
        other => ApiError::internal(format!("Failed to load user: {other}")),
    })?;

    if let Some(email) = request.email {
        if email != user.email {
            let taken = repo
                .find_by_email(&email)
                .map_err(|e| ApiError::internal(format!("Failed to check email: {e}")))?;
            if !taken.is_empty() {
                return Err(ApiError::conflict("Email already exists"));
            }
            user.email = email;
        }
    }
    if let Some(password) = request.password {
        user.password_hash = hash_password(&password)
            .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;
    }
    if let Some(name) = request.name {
        user.name = name;
    }
    if let Some(age) = request.age {
        user.age = age;
    }
    if let Some(country) = request.country {
        user.country = country;
    }
    if let Some(role) = request.role {
        // Only admins may change roles. A user sending their own role
        // field gets the rest of the patch applied without it.
        if actor.is_admin() {
            user.role = role;
        }
    }

    repo.update(&user)
        .map_err(|e| ApiError::internal(format!("Failed to update user: {e}")))?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "account updated");

    Ok(Json(MessageResponse::new("User updated")))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "Account id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 403, description = "Caller does not own the account"),
        (status = 404, description = "No such account")
    )
)]
pub async fn delete_user(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !can_mutate(&actor, &user_id) {
        return Err(ApiError::forbidden(
            "You do not have permission to delete this user",
        ));
    }

    let repo = UserRepository::new(&state.storage);

    repo.delete(&user_id).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(format!("User {user_id} not found")),
        other => ApiError::internal(format!("Failed to delete user: {other}")),
    })?;

    tracing::info!(user_id = %user_id, actor = %actor.user_id, "account deleted");

    Ok(Json(MessageResponse::new("User deleted")))
}
