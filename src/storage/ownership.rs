// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for mutations.
//!
//! The policy is uniform across record kinds: admins may mutate any
//! record, users only records they own. Code mutations additionally
//! carry a claimed owner id in the request body, which must agree with
//! both the acting identity and the stored record.

use crate::auth::{AuthenticatedUser, Role};

use super::{StorageError, StorageResult};

/// Decide whether an identity may mutate a record owned by `owner_id`.
pub fn can_mutate(user: &AuthenticatedUser, owner_id: &str) -> bool {
    user.role.has_privilege(Role::Admin) || user.user_id == owner_id
}

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user may mutate this resource.
    ///
    /// # Errors
    /// Returns `StorageError::PermissionDenied` if the user neither owns
    /// the resource nor holds the admin role.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StorageResult<()> {
        if can_mutate(user, self.owner_user_id()) {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                user_id: user.user_id.clone(),
                resource: "resource".to_string(),
            })
        }
    }
}

/// Validate the owner id claimed in a code mutation request.
///
/// The claim must name an account the identity can act for; a user-role
/// identity must claim itself, an admin may omit the claim entirely.
/// When the stored record is at hand, the claim must also match the
/// recorded owner. The check runs on the claim alone first, so a bad
/// claim is rejected before any store access.
pub fn verify_claimed_owner(
    user: &AuthenticatedUser,
    claimed: Option<&str>,
    recorded: Option<&str>,
) -> StorageResult<()> {
    let denied = || {
        Err(StorageError::PermissionDenied {
            user_id: user.user_id.clone(),
            resource: "code".to_string(),
        })
    };

    match claimed {
        Some(owner) => {
            if !can_mutate(user, owner) {
                return denied();
            }
            if let Some(recorded) = recorded {
                if owner != recorded {
                    return denied();
                }
            }
            Ok(())
        }
        None => {
            if user.role.has_privilege(Role::Admin) {
                Ok(())
            } else {
                denied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    struct TestResource {
        owner: String,
    }

    impl OwnedResource for TestResource {
        fn owner_user_id(&self) -> &str {
            &self.owner
        }
    }

    fn make_user(user_id: &str, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            role,
        }
    }

    #[test]
    fn user_can_mutate_own_records() {
        let user = make_user("user_123", Role::User);
        assert!(can_mutate(&user, "user_123"));
        assert!(!can_mutate(&user, "user_456"));
    }

    #[test]
    fn admin_can_mutate_any_record() {
        let admin = make_user("admin_1", Role::Admin);
        assert!(can_mutate(&admin, "admin_1"));
        assert!(can_mutate(&admin, "user_456"));
    }

    #[test]
    fn ownership_verification_passes_for_owner() {
        let resource = TestResource {
            owner: "user_123".to_string(),
        };
        let user = make_user("user_123", Role::User);

        assert!(resource.verify_ownership(&user).is_ok());
    }

    #[test]
    fn ownership_verification_fails_for_non_owner() {
        let resource = TestResource {
            owner: "user_123".to_string(),
        };
        let user = make_user("user_456", Role::User);

        let result = resource.verify_ownership(&user);
        assert!(matches!(result, Err(StorageError::PermissionDenied { .. })));
    }

    #[test]
    fn ownership_verification_passes_for_admin() {
        let resource = TestResource {
            owner: "user_123".to_string(),
        };
        let admin = make_user("admin_1", Role::Admin);

        assert!(resource.verify_ownership(&admin).is_ok());
    }

    #[test]
    fn claimed_owner_must_match_identity_for_users() {
        let user = make_user("user_123", Role::User);

        assert!(verify_claimed_owner(&user, Some("user_123"), None).is_ok());
        assert!(verify_claimed_owner(&user, Some("user_456"), None).is_err());
        assert!(verify_claimed_owner(&user, None, None).is_err());
    }

    #[test]
    fn claimed_owner_must_match_the_record() {
        let user = make_user("user_123", Role::User);

        assert!(verify_claimed_owner(&user, Some("user_123"), Some("user_123")).is_ok());

        // Claiming yourself against a record someone else owns is denied.
        let result = verify_claimed_owner(&user, Some("user_123"), Some("user_456"));
        assert!(matches!(result, Err(StorageError::PermissionDenied { .. })));
    }

    #[test]
    fn admin_may_omit_the_claim() {
        let admin = make_user("admin_1", Role::Admin);

        assert!(verify_claimed_owner(&admin, None, None).is_ok());
        assert!(verify_claimed_owner(&admin, None, Some("user_456")).is_ok());
        assert!(verify_claimed_owner(&admin, Some("user_456"), Some("user_456")).is_ok());

        // Even an admin's explicit claim has to agree with the record.
        let result = verify_claimed_owner(&admin, Some("user_123"), Some("user_456"));
        assert!(matches!(result, Err(StorageError::PermissionDenied { .. })));
    }
}
