// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Variants stay distinct internally so logs can say what actually
/// happened, but every credential-class failure is serialized to the
/// same response body. The wire never reveals which check failed.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed, forged, or otherwise unverifiable
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Token claims no longer match the stored account (role changed,
    /// id mismatch, or the account is gone)
    StaleIdentity,
    /// The account store failed while confirming the claims
    StoreFailure(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code sent on the wire.
    ///
    /// Codes are per status class, not per variant, so that the
    /// response body cannot be used to probe which check rejected a
    /// token.
    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "unauthorized",
            _ => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::StaleIdentity => StatusCode::UNAUTHORIZED,
            AuthError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Token is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::StaleIdentity => {
                write!(f, "Token claims do not match the stored account")
            }
            AuthError::StoreFailure(msg) => {
                write!(f, "Account store failure during authentication: {msg}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The detailed cause goes to the log only.
        if status.is_server_error() {
            tracing::error!(error = %self, "authentication check failed on the store side");
        } else {
            tracing::debug!(error = %self, "request rejected during authentication");
        }

        let message = match status {
            StatusCode::UNAUTHORIZED => "Authentication failed",
            _ => "Internal server error",
        };
        let body = Json(AuthErrorBody {
            error: message.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
