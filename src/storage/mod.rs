// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for accounts, code submissions, and uploaded
//! source files. Everything is plain files under one root directory;
//! there is no external database.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/
//!     {user_id}.json     # Account record (includes password hash)
//!   codes/
//!     {code_id}.json     # Submission record (references its source file)
//!   uploads/
//!     {millis}_{name}    # Uploaded source files
//! ```
//!
//! ## Invariants
//!
//! - Record writes are atomic (temp file + rename)
//! - Every submission record points at a file that was live when the
//!   record was written; cleanup failures may leave orphan files but
//!   never dangling records on the create path
//! - All mutations pass the ownership checks in [`ownership`]

pub mod document_fs;
pub mod lifecycle;
pub mod ownership;
pub mod paths;
pub mod repository;
pub mod uploads;

pub use document_fs::{DocumentStorage, StorageError, StorageResult};
pub use lifecycle::{CleanupOutcome, CodeLifecycle, LifecycleError, ReceivedUpload};
pub use ownership::{can_mutate, verify_claimed_owner, OwnedResource, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{
    CodeRepository, CodeResponse, StoredCode, StoredUser, UserRepository, UserResponse,
};
pub use uploads::{UploadError, UploadStorage, ALLOWED_CONTENT_TYPES};
