// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository over document storage.
//!
//! ## Storage Layout
//!
//! One JSON document per account:
//! ```text
//! {root}/users/{user_id}.json
//! ```
//!
//! The document includes the password hash, so the stored form is never
//! returned to API clients directly; handlers convert to
//! [`UserResponse`] first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};
use crate::auth::Role;
use crate::query::PageWindow;

/// Account record stored in `{user_id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique account identifier (UUID)
    pub id: String,
    /// Login email, unique across accounts
    pub email: String,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Country of residence
    pub country: String,
    /// Argon2 hash of the account password (PHC string)
    pub password_hash: String,
    /// Authorization role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Response returned to API clients (never includes the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique account identifier
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Country of residence
    pub country: String,
    /// Authorization role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            age: user.age,
            country: user.country,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Repository for account operations on document storage.
pub struct UserRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if an account exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get an account by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new account.
    ///
    /// # Returns
    /// - `Ok(())` if successful
    /// - `Err(StorageError::AlreadyExists)` if the id is already taken
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Update an existing account.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        if !self.exists(&user.id) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }

        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Delete an account, returning the removed record.
    pub fn delete(&self, user_id: &str) -> StorageResult<StoredUser> {
        let user = self.get(user_id)?;
        self.storage.delete(self.storage.paths().user(user_id))?;
        Ok(user)
    }

    /// Find accounts by email.
    ///
    /// Email is unique by construction, so this returns at most one
    /// record on a healthy store, but the scan reports whatever is
    /// actually there.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Vec<StoredUser>> {
        let mut matches = Vec::new();
        for user in self.load_all()? {
            if user.email == email {
                matches.push(user);
            }
        }
        Ok(matches)
    }

    /// List accounts within a pagination window.
    ///
    /// Results are ordered by creation time (id as tiebreak) so paging
    /// is stable across requests. A zero limit means no cap.
    pub fn list(&self, window: &PageWindow) -> StorageResult<Vec<StoredUser>> {
        let mut users = self.load_all()?;
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(apply_window(users, window))
    }

    fn load_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in &ids {
            if let Ok(user) = self.get(id) {
                users.push(user);
            }
        }
        Ok(users)
    }
}

/// Apply offset and limit to an ordered record list.
pub(super) fn apply_window<T>(records: Vec<T>, window: &PageWindow) -> Vec<T> {
    let iter = records.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
