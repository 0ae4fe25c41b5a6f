// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthenticatedUser, AuthError, TokenError};
use crate::state::AppState;
use crate::storage::{StorageError, UserRepository};

/// Extractor for authenticated users.
///
/// Validates the bearer token from the Authorization header, then
/// confirms the claim snapshot against the stored account: the account
/// must still exist, and its stored role and id must equal the claimed
/// ones. A token issued before a role change is therefore rejected on
/// its next use, even though it is still within its lifetime.
///
/// # Example
///
/// ```rust,ignore
/// async fn delete_code(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<MessageResponse>, ApiError> {
///     // user.user_id and user.role reflect the stored account
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if an earlier extractor already confirmed the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        // Verify signature, structure, and expiry
        let claims = state.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        // The claims are a login-time snapshot; confirm them against the
        // live record so role changes invalidate outstanding tokens.
        let users = UserRepository::new(&state.storage);
        let stored = match users.get(&claims.sub) {
            Ok(user) => user,
            Err(StorageError::NotFound(_)) => return Err(AuthError::StaleIdentity),
            Err(e) => return Err(AuthError::StoreFailure(e.to_string())),
        };

        if stored.role != claims.role || stored.id != claims.sub {
            return Err(AuthError::StaleIdentity);
        }

        let user = AuthenticatedUser {
            user_id: stored.id,
            email: stored.email,
            role: stored.role,
        };

        // Attach the confirmed identity to the request context
        parts.extensions.insert(user.clone());

        Ok(Auth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, TokenSigner};
    use crate::storage::{DocumentStorage, StoragePaths, StoredUser, UploadStorage};
    use axum::http::Request;
    use chrono::Utc;
    use tempfile::TempDir;

    /// Helper to create a test AppState backed by a temp directory.
    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");
        let uploads = UploadStorage::new(storage.paths().uploads_dir());

        let state = AppState::new(storage, uploads, TokenSigner::new(b"test-secret", 3600));
        (state, temp_dir)
    }

    fn seed_user(state: &AppState, id: &str, role: Role) {
        let users = UserRepository::new(&state.storage);
        users
            .create(&StoredUser {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                name: "Ada".to_string(),
                age: 36,
                country: "UK".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role,
                created_at: Utc::now(),
            })
            .expect("Failed to seed user");
    }

    fn parts_with_token(token: &str) -> Parts {
        Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_schemes() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_garbage_tokens() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = parts_with_token("definitely.not.valid");

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_tokens_from_another_key() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "user-1", Role::User);

        let other = TokenSigner::new(b"some-other-secret", 3600);
        let token = other.issue("user-1", Role::User, "user-1@example.com").unwrap();
        let mut parts = parts_with_token(&token);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn auth_extractor_accepts_a_live_token() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "user-1", Role::User);

        let token = state
            .tokens
            .issue("user-1", Role::User, "user-1@example.com")
            .unwrap();
        let mut parts = parts_with_token(&token);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        let Auth(user) = result.expect("token should be accepted");
        assert_eq!(user.user_id, "user-1");
        assert_eq!(user.role, Role::User);

        // The confirmed identity was attached to the request context
        let cached = parts.extensions.get::<AuthenticatedUser>();
        assert_eq!(cached.map(|u| u.user_id.as_str()), Some("user-1"));
    }

    #[tokio::test]
    async fn token_issued_before_role_change_is_rejected() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "user-1", Role::User);

        let token = state
            .tokens
            .issue("user-1", Role::User, "user-1@example.com")
            .unwrap();

        // The token works while the stored role still matches.
        let mut parts = parts_with_token(&token);
        assert!(Auth::from_request_parts(&mut parts, &state).await.is_ok());

        // An admin promotes the account directly in the store.
        let users = UserRepository::new(&state.storage);
        let mut stored = users.get("user-1").unwrap();
        stored.role = Role::Admin;
        users.update(&stored).unwrap();

        // The pre-change token is now stale and must die.
        let mut parts = parts_with_token(&token);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::StaleIdentity)));
    }

    #[tokio::test]
    async fn token_for_a_deleted_account_is_rejected() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "user-1", Role::User);

        let token = state
            .tokens
            .issue("user-1", Role::User, "user-1@example.com")
            .unwrap();

        let users = UserRepository::new(&state.storage);
        users.delete("user-1").unwrap();

        let mut parts = parts_with_token(&token);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::StaleIdentity)));
    }

    #[tokio::test]
    async fn corrupt_account_document_is_a_store_failure() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "user-1", Role::User);

        let token = state
            .tokens
            .issue("user-1", Role::User, "user-1@example.com")
            .unwrap();

        // Clobber the stored document so the read fails mid-confirmation.
        std::fs::write(state.storage.paths().user("user-1"), b"{ not json").unwrap();

        let mut parts = parts_with_token(&token);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::StoreFailure(_))));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let user = AuthenticatedUser {
            user_id: "user_from_context".to_string(),
            email: "ctx@example.com".to_string(),
            role: Role::Admin,
        };
        parts.extensions.insert(user.clone());

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().0.user_id, "user_from_context");
    }
}
