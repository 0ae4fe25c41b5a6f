// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides token-based authentication for the CodeVault API.
//!
//! ## Auth Flow
//!
//! 1. Client signs up with email and password; the password is stored
//!    only as an Argon2 hash
//! 2. Client logs in; on a successful credential check the server
//!    issues an HS256 token carrying the account id, email, and a role
//!    snapshot (one hour lifetime)
//! 3. Client sends `Authorization: Bearer <token>`
//! 4. The `Auth` extractor:
//!    - Verifies the signature and expiry
//!    - Re-fetches the account and requires the stored role and id to
//!      match the claims, so stale tokens die on role changes
//!
//! ## Security
//!
//! - All non-health, non-credential endpoints require authentication
//! - The signing secret is injected from configuration, never defaulted
//! - All credential failures share one response body
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod tokens;

pub use claims::{AuthenticatedUser, Claims};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{hash_password, verify_password};
pub use roles::Role;
pub use tokens::{TokenError, TokenSigner};
