// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Code submission repository over document storage.
//!
//! ## Storage Layout
//!
//! One JSON document per submission:
//! ```text
//! {root}/codes/{code_id}.json
//! ```
//!
//! The document references the uploaded source by its stored name under
//! `{root}/uploads/`. Pairing record and file operations is the job of
//! the lifecycle layer, not this repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, OwnedResource, StorageError, StorageResult};
use super::users::apply_window;
use crate::query::PageWindow;

/// Code submission record stored in `{code_id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCode {
    /// Unique submission identifier (UUID)
    pub id: String,
    /// Programming language of the submission
    pub language: String,
    /// Account that owns this submission
    pub user_id: String,
    /// Stored name of the uploaded source file under the upload root
    pub source_file: String,
    /// When the submission was created
    pub created_at: DateTime<Utc>,
    /// When the submission was last modified
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredCode {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}

/// Response returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CodeResponse {
    /// Unique submission identifier
    pub id: String,
    /// Programming language of the submission
    pub language: String,
    /// Account that owns this submission
    pub user_id: String,
    /// Stored name of the uploaded source file
    pub source_file: String,
    /// When the submission was created
    pub created_at: DateTime<Utc>,
    /// When the submission was last modified
    pub updated_at: DateTime<Utc>,
}

impl From<StoredCode> for CodeResponse {
    fn from(code: StoredCode) -> Self {
        Self {
            id: code.id,
            language: code.language,
            user_id: code.user_id,
            source_file: code.source_file,
            created_at: code.created_at,
            updated_at: code.updated_at,
        }
    }
}

/// Repository for code submission operations on document storage.
pub struct CodeRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> CodeRepository<'a> {
    /// Create a new CodeRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a submission exists.
    pub fn exists(&self, code_id: &str) -> bool {
        self.storage.exists(self.storage.paths().code(code_id))
    }

    /// Get a submission by ID.
    pub fn get(&self, code_id: &str) -> StorageResult<StoredCode> {
        let path = self.storage.paths().code(code_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Code {code_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new submission record.
    pub fn create(&self, code: &StoredCode) -> StorageResult<()> {
        if self.exists(&code.id) {
            return Err(StorageError::AlreadyExists(format!("Code {}", code.id)));
        }

        self.storage
            .write_json(self.storage.paths().code(&code.id), code)
    }

    /// Update an existing submission record.
    pub fn update(&self, code: &StoredCode) -> StorageResult<()> {
        if !self.exists(&code.id) {
            return Err(StorageError::NotFound(format!("Code {}", code.id)));
        }

        self.storage
            .write_json(self.storage.paths().code(&code.id), code)
    }

    /// Delete a submission record, returning the removed record.
    pub fn delete(&self, code_id: &str) -> StorageResult<StoredCode> {
        let code = self.get(code_id)?;
        self.storage.delete(self.storage.paths().code(code_id))?;
        Ok(code)
    }

    /// List submissions within a pagination window.
    ///
    /// Ordered by creation time (id as tiebreak) for stable paging.
    pub fn list(&self, window: &PageWindow) -> StorageResult<Vec<StoredCode>> {
        let mut codes = self.load_all()?;
        codes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(apply_window(codes, window))
    }

    /// List submissions owned by one account, within a window.
    pub fn list_by_owner(
        &self,
        owner_user_id: &str,
        window: &PageWindow,
    ) -> StorageResult<Vec<StoredCode>> {
        let mut codes = self.load_all()?;
        codes.retain(|code| code.user_id == owner_user_id);
        codes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(apply_window(codes, window))
    }

    fn load_all(&self) -> StorageResult<Vec<StoredCode>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().codes_dir(), "json")?;

        let mut codes = Vec::new();
        for id in &ids {
            if let Ok(code) = self.get(id) {
                codes.push(code);
            }
        }
        Ok(codes)
    }
}
