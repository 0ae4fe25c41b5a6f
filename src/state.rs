// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.

use crate::auth::TokenSigner;
use crate::storage::{DocumentStorage, UploadStorage};

/// Application state shared across all request handlers.
///
/// Cloning is cheap: the stores hold paths, the signer holds keys.
#[derive(Clone)]
pub struct AppState {
    /// Document store for account and submission records.
    pub storage: DocumentStorage,
    /// File store for uploaded sources.
    pub uploads: UploadStorage,
    /// Token issue/verify service carrying the injected signing secret.
    pub tokens: TokenSigner,
}

impl AppState {
    /// Create application state from its three services.
    pub fn new(storage: DocumentStorage, uploads: UploadStorage, tokens: TokenSigner) -> Self {
        Self {
            storage,
            uploads,
            tokens,
        }
    }
}
