// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coordinates code records with their stored source files.
//!
//! A submission is a record plus exactly one file. The pairing rules
//! live here so handlers never juggle the two stores themselves:
//!
//! - create: file first, then record; if the record write fails the
//!   file is removed again so no orphan survives a failed create
//! - replace: record first, then the previous file is removed; a failed
//!   removal is reported, never propagated, so the record update stands
//! - delete: record first, then the file, with the same best-effort rule
//!
//! File cleanup failures surface as a [`CleanupOutcome`] so callers can
//! log the orphan instead of silently leaking it.

use chrono::Utc;
use thiserror::Error;

use super::repository::{CodeRepository, StoredCode, UserRepository};
use super::uploads::{UploadError, UploadStorage};
use super::{DocumentStorage, StorageError};

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The claimed owner account does not exist.
    #[error("owner account {0} not found")]
    OwnerNotFound(String),
    /// The upload store rejected or failed the file operation.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// The document store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What happened to the file side of a replace or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The previous file was removed.
    Removed(String),
    /// Removal failed; the named file may linger as an orphan.
    Failed { stored_name: String, reason: String },
    /// No file needed removal.
    NotNeeded,
}

/// An upload received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Client-supplied file name.
    pub original_name: String,
    /// Declared content type.
    pub content_type: String,
}

/// Lifecycle operations over one document store and one upload store.
pub struct CodeLifecycle<'a> {
    storage: &'a DocumentStorage,
    uploads: &'a UploadStorage,
}

impl<'a> CodeLifecycle<'a> {
    /// Create a new CodeLifecycle.
    pub fn new(storage: &'a DocumentStorage, uploads: &'a UploadStorage) -> Self {
        Self { storage, uploads }
    }

    /// Create a submission: store the file, then the record.
    ///
    /// The owner account must exist before anything is written. If the
    /// record write fails after the file landed, the file is removed
    /// again and the original error is returned.
    pub fn create(
        &self,
        owner_id: &str,
        language: &str,
        upload: &ReceivedUpload,
    ) -> Result<StoredCode, LifecycleError> {
        let users = UserRepository::new(self.storage);
        if !users.exists(owner_id) {
            return Err(LifecycleError::OwnerNotFound(owner_id.to_string()));
        }

        let stored_name =
            self.uploads
                .store(&upload.bytes, &upload.original_name, &upload.content_type)?;

        let now = Utc::now();
        let code = StoredCode {
            id: uuid::Uuid::new_v4().to_string(),
            language: language.to_string(),
            user_id: owner_id.to_string(),
            source_file: stored_name.clone(),
            created_at: now,
            updated_at: now,
        };

        let codes = CodeRepository::new(self.storage);
        if let Err(e) = codes.create(&code) {
            if let Err(cleanup) = self.uploads.delete(&stored_name) {
                tracing::warn!(
                    file = %stored_name,
                    error = %cleanup,
                    "failed to remove upload after aborted create"
                );
            }
            return Err(e.into());
        }

        Ok(code)
    }

    /// Replace parts of a submission: record first, old file second.
    ///
    /// When a new file arrives it is stored, the record is updated to
    /// point at it, and only then is the previous file removed. A
    /// failed removal is reported in the outcome; the record update is
    /// already durable at that point and stands either way.
    pub fn replace(
        &self,
        code_id: &str,
        language: Option<&str>,
        new_upload: Option<&ReceivedUpload>,
    ) -> Result<(StoredCode, CleanupOutcome), LifecycleError> {
        let codes = CodeRepository::new(self.storage);
        let mut code = codes.get(code_id)?;
        let previous_file = code.source_file.clone();

        if let Some(upload) = new_upload {
            code.source_file =
                self.uploads
                    .store(&upload.bytes, &upload.original_name, &upload.content_type)?;
        }
        if let Some(language) = language {
            code.language = language.to_string();
        }
        code.updated_at = Utc::now();

        if let Err(e) = codes.update(&code) {
            // A freshly stored replacement is rolled back like a failed create.
            if new_upload.is_some() {
                if let Err(cleanup) = self.uploads.delete(&code.source_file) {
                    tracing::warn!(
                        file = %code.source_file,
                        error = %cleanup,
                        "failed to remove upload after aborted replace"
                    );
                }
            }
            return Err(e.into());
        }

        let outcome = if code.source_file != previous_file {
            self.remove_file(previous_file)
        } else {
            CleanupOutcome::NotNeeded
        };

        Ok((code, outcome))
    }

    /// Delete a submission: record first, then its file.
    ///
    /// The file removal is best-effort; a failure is reported in the
    /// outcome while the record stays deleted.
    pub fn delete(&self, code_id: &str) -> Result<(StoredCode, CleanupOutcome), LifecycleError> {
        let codes = CodeRepository::new(self.storage);
        let code = codes.delete(code_id)?;

        let outcome = self.remove_file(code.source_file.clone());
        Ok((code, outcome))
    }

    fn remove_file(&self, stored_name: String) -> CleanupOutcome {
        match self.uploads.delete(&stored_name) {
            Ok(()) => CleanupOutcome::Removed(stored_name),
            Err(e) => CleanupOutcome::Failed {
                stored_name,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::storage::repository::StoredUser;
    use crate::storage::{StoragePaths, UploadStorage};
    use std::fs;
    use tempfile::TempDir;

    fn test_stores() -> (DocumentStorage, UploadStorage, TempDir) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");
        let uploads = UploadStorage::new(storage.paths().uploads_dir());
        (storage, uploads, temp)
    }

    fn seed_user(storage: &DocumentStorage, id: &str) {
        let users = UserRepository::new(storage);
        users
            .create(&StoredUser {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                name: "Ada".to_string(),
                age: 36,
                country: "UK".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role: Role::User,
                created_at: Utc::now(),
            })
            .expect("Failed to seed user");
    }

    fn c_upload(name: &str, body: &[u8]) -> ReceivedUpload {
        ReceivedUpload {
            bytes: body.to_vec(),
            original_name: name.to_string(),
            content_type: "text/x-c".to_string(),
        }
    }

    #[test]
    fn create_stores_file_and_record() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let code = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"int main() {}"))
            .unwrap();

        let repo = CodeRepository::new(&storage);
        assert!(repo.exists(&code.id));
        assert!(uploads.exists(&code.source_file));
        assert_eq!(uploads.read(&code.source_file).unwrap(), b"int main() {}");
    }

    #[test]
    fn create_for_missing_owner_writes_nothing() {
        let (storage, uploads, _temp) = test_stores();
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let result = lifecycle.create("ghost", "c", &c_upload("main.c", b"x"));
        assert!(matches!(result, Err(LifecycleError::OwnerNotFound(_))));

        // No file was stored
        let entries = fs::read_dir(storage.paths().uploads_dir()).unwrap().count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn create_rejects_disallowed_content_type() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let upload = ReceivedUpload {
            bytes: b"print('hi')".to_vec(),
            original_name: "script.py".to_string(),
            content_type: "text/x-python".to_string(),
        };
        let result = lifecycle.create("user-1", "python", &upload);
        assert!(matches!(
            result,
            Err(LifecycleError::Upload(UploadError::UnsupportedContentType(_)))
        ));
    }

    #[test]
    fn failed_record_write_rolls_back_the_file() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        // Squat a plain file on the codes directory path so the record
        // write cannot succeed.
        let codes_dir = storage.paths().codes_dir();
        fs::remove_dir_all(&codes_dir).unwrap();
        fs::write(&codes_dir, b"squatter").unwrap();

        let result = lifecycle.create("user-1", "c", &c_upload("main.c", b"x"));
        assert!(matches!(result, Err(LifecycleError::Storage(_))));

        // The stored file was removed again
        let entries = fs::read_dir(storage.paths().uploads_dir()).unwrap().count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn replace_with_new_file_removes_the_old_one() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let created = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"old"))
            .unwrap();
        let old_file = created.source_file.clone();

        let (updated, outcome) = lifecycle
            .replace(&created.id, None, Some(&c_upload("main.c", b"new")))
            .unwrap();

        assert_ne!(updated.source_file, old_file);
        assert!(uploads.exists(&updated.source_file));
        assert!(!uploads.exists(&old_file));
        assert_eq!(outcome, CleanupOutcome::Removed(old_file));
    }

    #[test]
    fn replace_without_file_keeps_the_file() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let created = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"body"))
            .unwrap();

        let (updated, outcome) = lifecycle
            .replace(&created.id, Some("javascript"), None)
            .unwrap();

        assert_eq!(updated.language, "javascript");
        assert_eq!(updated.source_file, created.source_file);
        assert!(uploads.exists(&created.source_file));
        assert_eq!(outcome, CleanupOutcome::NotNeeded);
    }

    #[test]
    fn replace_reports_a_failed_cleanup_without_failing() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let created = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"old"))
            .unwrap();

        // The old file vanishes out from under us.
        uploads.delete(&created.source_file).unwrap();

        let (updated, outcome) = lifecycle
            .replace(&created.id, None, Some(&c_upload("main.c", b"new")))
            .unwrap();

        assert!(uploads.exists(&updated.source_file));
        assert!(matches!(outcome, CleanupOutcome::Failed { .. }));

        // The record update stands despite the failed cleanup.
        let repo = CodeRepository::new(&storage);
        assert_eq!(repo.get(&created.id).unwrap().source_file, updated.source_file);
    }

    #[test]
    fn replace_missing_code_is_not_found() {
        let (storage, uploads, _temp) = test_stores();
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let result = lifecycle.replace("ghost", Some("c"), None);
        assert!(matches!(
            result,
            Err(LifecycleError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn delete_removes_record_then_file() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let created = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"body"))
            .unwrap();

        let (deleted, outcome) = lifecycle.delete(&created.id).unwrap();
        assert_eq!(deleted.id, created.id);
        assert_eq!(outcome, CleanupOutcome::Removed(created.source_file.clone()));

        let repo = CodeRepository::new(&storage);
        assert!(!repo.exists(&created.id));
        assert!(!uploads.exists(&created.source_file));

        // A second delete finds nothing.
        assert!(matches!(
            lifecycle.delete(&created.id),
            Err(LifecycleError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn delete_with_file_already_gone_still_deletes_the_record() {
        let (storage, uploads, _temp) = test_stores();
        seed_user(&storage, "user-1");
        let lifecycle = CodeLifecycle::new(&storage, &uploads);

        let created = lifecycle
            .create("user-1", "c", &c_upload("main.c", b"body"))
            .unwrap();
        uploads.delete(&created.source_file).unwrap();

        let (_, outcome) = lifecycle.delete(&created.id).unwrap();
        assert!(matches!(outcome, CleanupOutcome::Failed { .. }));

        let repo = CodeRepository::new(&storage);
        assert!(!repo.exists(&created.id));
    }
}
