// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Accounts**: Signup, login, and profile update payloads
//! - **Codes**: The delete request body (create/update arrive as
//!   multipart forms and are parsed field by field in the handler)
//! - **Shared**: The plain message envelope used by mutations

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::UserResponse;

// =============================================================================
// Account Models
// =============================================================================

/// Request to create a new account.
///
/// There is no role field: every signup starts as a normal user, and
/// only an admin can promote an account afterwards.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Login email (must be unused)
    pub email: String,
    /// Plaintext password (hashed before storage, never persisted)
    pub password: String,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Country of residence
    pub country: String,
}

/// Response after a successful signup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    /// Confirmation message
    pub message: String,
    /// The created account
    pub user: UserResponse,
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Confirmation message
    pub message: String,
    /// Bearer token for subsequent requests (one hour lifetime)
    pub token: String,
}

/// Request to update an account. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New login email
    pub email: Option<String>,
    /// New plaintext password (re-hashed before storage)
    pub password: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New age
    pub age: Option<u32>,
    /// New country
    pub country: Option<String>,
    /// New role. Honored only when the acting identity is an admin;
    /// user-role requests have this field ignored.
    pub role: Option<Role>,
}

// =============================================================================
// Code Models
// =============================================================================

/// JSON body of a code delete request.
///
/// `userID` is the claimed owner of the targeted submission. Users must
/// claim themselves; admins may omit the field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DeleteCodeRequest {
    /// Claimed owner account id
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

// =============================================================================
// Shared Models
// =============================================================================

/// Plain confirmation message returned by mutations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    /// Build a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
