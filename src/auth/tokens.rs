// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256-signed claim sets. The signing secret is injected at
//! construction time and shared by every issue/verify call in the
//! process; there is no refresh mechanism, an expired token requires a
//! fresh login.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;

use super::claims::Claims;
use super::roles::Role;

/// Tolerated clock skew when checking expiry (seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Errors from token issuance or verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, structure, or claim validation failed.
    #[error("token is invalid")]
    Invalid,
    /// The token expiry has passed.
    #[error("token has expired")]
    Expired,
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenSigner {
    /// Create a signer from a shared secret and a token lifetime.
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Issue a token for an account.
    ///
    /// The embedded role and email are snapshots at issuance time; the
    /// request guard re-confirms them against the stored account on
    /// every use.
    pub fn issue(&self, account_id: &str, role: Role, email: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token's signature, structure, and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
