// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage for uploaded source files.
//!
//! Files live flat under the upload root with a
//! `{unix_millis}_{sanitized original name}` name, so stored names stay
//! recognizable while never colliding with path syntax. Only
//! allow-listed content types are accepted, and the check runs before
//! any byte reaches disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

/// Content types accepted for uploaded source files.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["text/x-c", "application/javascript"];

/// Errors from upload storage operations.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Content type is not on the allow-list.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    /// Stored file does not exist.
    #[error("stored file not found: {0}")]
    NotFound(String),
    /// Underlying filesystem failure.
    #[error("upload storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// File store for uploaded sources.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Create an upload store rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the upload root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload root. Safe to call multiple times.
    pub fn initialize(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Check a content type against the allow-list.
    pub fn accepts(content_type: &str) -> bool {
        ALLOWED_CONTENT_TYPES.contains(&content_type)
    }

    /// Store an upload and return its unique stored name.
    ///
    /// Rejects disallowed content types before touching disk. The
    /// stored name embeds the arrival time plus the sanitized original
    /// name; a numeric tag is appended if that name is already taken.
    pub fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        content_type: &str,
    ) -> Result<String, UploadError> {
        if !Self::accepts(content_type) {
            return Err(UploadError::UnsupportedContentType(content_type.to_string()));
        }

        fs::create_dir_all(&self.root)?;

        let millis = Utc::now().timestamp_millis();
        let base = sanitize_name(original_name);
        let mut stored_name = format!("{millis}_{base}");
        let mut tag = 1;
        while self.root.join(&stored_name).exists() {
            stored_name = format!("{millis}-{tag}_{base}");
            tag += 1;
        }

        fs::write(self.root.join(&stored_name), bytes)?;
        Ok(stored_name)
    }

    /// Read a stored file.
    pub fn read(&self, stored_name: &str) -> Result<Vec<u8>, UploadError> {
        fs::read(self.root.join(stored_name)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UploadError::NotFound(stored_name.to_string()),
            _ => UploadError::Io(e),
        })
    }

    /// Delete a stored file.
    pub fn delete(&self, stored_name: &str) -> Result<(), UploadError> {
        fs::remove_file(self.root.join(stored_name)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => UploadError::NotFound(stored_name.to_string()),
            _ => UploadError::Io(e),
        })
    }

    /// Check whether a stored file exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.root.join(stored_name).is_file()
    }
}

/// Keep the original name recognizable while stripping path separators
/// and anything else that could escape the upload root.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
