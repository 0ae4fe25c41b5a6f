// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to document storage.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the DocumentStorage for all file operations.

pub mod codes;
pub mod users;

pub use codes::{CodeRepository, CodeResponse, StoredCode};
pub use users::{StoredUser, UserRepository, UserResponse};
