// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    models::{
        DeleteCodeRequest, LoginRequest, LoginResponse, MessageResponse, SignupRequest,
        SignupResponse, UpdateUserRequest,
    },
    state::AppState,
    storage::{CodeResponse, UserResponse},
};

pub mod codes;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{user_id}/codes", get(users::list_user_codes))
        .route("/codes", get(codes::list_codes).post(codes::create_code))
        .route("/codes/uploads/{code_id}", get(codes::download_code))
        .route(
            "/codes/{code_id}",
            get(codes::get_code)
                .patch(codes::update_code)
                .delete(codes::delete_code),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::list_users,
        users::signup,
        users::login,
        users::get_user,
        users::list_user_codes,
        users::update_user,
        users::delete_user,
        codes::list_codes,
        codes::get_code,
        codes::download_code,
        codes::create_code,
        codes::update_code,
        codes::delete_code,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Role,
            UserResponse,
            CodeResponse,
            SignupRequest,
            SignupResponse,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            DeleteCodeRequest,
            MessageResponse,
            codes::CreateCodeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Users", description = "Account signup, login and management"),
        (name = "Codes", description = "Code submission records and their source files"),
        (name = "Health", description = "Service health and readiness")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSigner;
    use crate::storage::{DocumentStorage, StoragePaths, UploadStorage};
    use tempfile::TempDir;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().unwrap();
        let uploads = UploadStorage::new(storage.paths().uploads_dir());
        uploads.initialize().unwrap();
        let state = AppState::new(storage, uploads, TokenSigner::new(b"test-secret", 3600));

        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
