// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the storage layout.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DATA_DIR;

/// Storage path builder.
///
/// All paths are relative to the storage root (the `DATA_DIR`
/// environment variable, `./data` by default).
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StoragePaths {
    /// Create paths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding account documents: `{root}/users/`
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to one account document: `{root}/users/{user_id}.json`
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    /// Directory holding code documents: `{root}/codes/`
    pub fn codes_dir(&self) -> PathBuf {
        self.root.join("codes")
    }

    /// Path to one code document: `{root}/codes/{code_id}.json`
    pub fn code(&self, code_id: &str) -> PathBuf {
        self.codes_dir().join(format!("{code_id}.json"))
    }

    /// Directory holding uploaded source files: `{root}/uploads/`
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Path to one uploaded file: `{root}/uploads/{stored_name}`
    pub fn upload(&self, stored_name: &str) -> PathBuf {
        self.uploads_dir().join(stored_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new(DEFAULT_DATA_DIR));
    }

    #[test]
    fn user_paths() {
        let paths = StoragePaths::new("/tmp/store");
        assert_eq!(paths.users_dir(), PathBuf::from("/tmp/store/users"));
        assert_eq!(
            paths.user("user-123"),
            PathBuf::from("/tmp/store/users/user-123.json")
        );
    }

    #[test]
    fn code_paths() {
        let paths = StoragePaths::new("/tmp/store");
        assert_eq!(paths.codes_dir(), PathBuf::from("/tmp/store/codes"));
        assert_eq!(
            paths.code("code-9"),
            PathBuf::from("/tmp/store/codes/code-9.json")
        );
    }

    #[test]
    fn upload_paths() {
        let paths = StoragePaths::new("/tmp/store");
        assert_eq!(paths.uploads_dir(), PathBuf::from("/tmp/store/uploads"));
        assert_eq!(
            paths.upload("173_main.c"),
            PathBuf::from("/tmp/store/uploads/173_main.c")
        );
    }
}
