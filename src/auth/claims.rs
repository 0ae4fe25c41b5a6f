// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by an issued token.
///
/// The role and email are snapshots from login time. They are never
/// trusted on their own: the request guard re-fetches the account and
/// rejects the token when the stored values have drifted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id).
    pub sub: String,
    /// Account email at issuance time.
    pub email: String,
    /// Account role at issuance time.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// An authenticated user, confirmed against the account store.
///
/// Built by the request guard after the token claims have been checked
/// against the stored account record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account id (the token `sub` claim).
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Role as stored on the account record.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Build from verified claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }

    /// Check if the user has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
