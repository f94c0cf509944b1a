//! Ownership-based authorization policy.
//!
//! Every todo and category has exactly one owner; an ability on a resource
//! is granted iff the requesting principal is that owner. List operations
//! need no check here because the repository scopes them by owner.

use crate::error::{Error, Result};
use crate::types::{Category, Todo, UserId};

/// Capability being exercised on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    /// Read the resource.
    View,
    /// Modify the resource (including attaching/detaching categories).
    Update,
    /// Permanently remove the resource.
    Delete,
}

/// A resource with exactly one owning user.
pub trait Owned {
    /// The owning user's identity.
    fn owner(&self) -> UserId;
}

impl Owned for Todo {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

impl Owned for Category {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// Check that `user` may exercise `ability` on `resource`.
///
/// The ability is taken for call-site clarity; the rule is the same for
/// all three: owner only.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] when `user` is not the owner.
pub fn authorize(user: UserId, resource: &impl Owned, ability: Ability) -> Result<()> {
    if resource.owner() == user {
        Ok(())
    } else {
        tracing::debug!(user = %user, ?ability, "authorization denied");
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn todo_owned_by(user_id: UserId) -> Todo {
        Todo {
            id: crate::types::TodoId::new(),
            user_id,
            title: "t".to_string(),
            description: None,
            completed: false,
            priority: None,
            due_date: None,
            categories: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_authorized_for_all_abilities() {
        let owner = UserId(Uuid::new_v4());
        let todo = todo_owned_by(owner);

        for ability in [Ability::View, Ability::Update, Ability::Delete] {
            assert!(authorize(owner, &todo, ability).is_ok());
        }
    }

    #[test]
    fn non_owner_is_forbidden() {
        let todo = todo_owned_by(UserId(Uuid::new_v4()));
        let stranger = UserId(Uuid::new_v4());

        for ability in [Ability::View, Ability::Update, Ability::Delete] {
            assert_eq!(
                authorize(stranger, &todo, ability),
                Err(Error::Forbidden)
            );
        }
    }
}
