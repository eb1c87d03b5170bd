//! Permission evaluator: pure predicates deciding `(actor, action, target)`.
//!
//! Decisions are made in two stages. Collection predicates run before a
//! specific object is known; object predicates run once the target is
//! resolved, and only after the collection check passed. Inbound adapters
//! translate a `false` into 401 (anonymous) or 403 (authenticated) without
//! disclosing which rule failed.
//!
//! Safe (read) methods are always allowed regardless of authentication
//! state. This is a deliberate simplification of the public catalogue, not
//! an oversight.

use super::user::{User, UserId};

/// Requesting principal.
#[derive(Debug, Clone)]
pub enum Actor {
    /// No credentials presented.
    Anonymous,
    /// Authenticated user resolved from a session token.
    Known(User),
}

impl Actor {
    /// Authenticated user backing this actor, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Known(user) => Some(user),
        }
    }

    /// True when credentials were presented and resolved.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    fn is_moderator(&self) -> bool {
        self.user().is_some_and(User::is_moderator)
    }

    fn is(&self, author: UserId) -> bool {
        self.user().is_some_and(|user| user.id() == author)
    }
}

/// Coarse access classification; everything that mutates is a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Safe method (list, retrieve).
    Read,
    /// Create, update or delete.
    Write,
}

/// Collection-level check for titles, categories and genres.
#[must_use]
pub fn catalogue_collection(actor: &Actor, kind: AccessKind) -> bool {
    match kind {
        AccessKind::Read => true,
        AccessKind::Write => actor.is_admin(),
    }
}

/// Object-level check for titles, categories and genres.
///
/// The catalogue has no ownership, so the object rule matches the
/// collection rule; it exists as a separate decision point because denial
/// must be evaluated again once the object is resolved.
#[must_use]
pub fn catalogue_object(actor: &Actor, kind: AccessKind) -> bool {
    catalogue_collection(actor, kind)
}

/// Collection-level check for reviews and comments.
#[must_use]
pub fn review_collection(actor: &Actor, kind: AccessKind) -> bool {
    match kind {
        AccessKind::Read => true,
        AccessKind::Write => actor.is_authenticated(),
    }
}

/// Object-level check for reviews and comments.
///
/// Writes are limited to admins (or superusers), moderators and the
/// object's author.
#[must_use]
pub fn review_object(actor: &Actor, kind: AccessKind, author: UserId) -> bool {
    match kind {
        AccessKind::Read => true,
        AccessKind::Write => actor.is_admin() || actor.is_moderator() || actor.is(author),
    }
}

/// Check for the user administration endpoint; reads and writes alike are
/// restricted to admins and superusers, at both levels.
#[must_use]
pub fn user_admin(actor: &Actor) -> bool {
    actor.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{EmailAddress, Role, Username};
    use rstest::rstest;

    fn known(role: Role, superuser: bool) -> Actor {
        let mut user = User::with_role(
            Username::new(format!("{role}_{superuser}")).expect("valid username"),
            EmailAddress::new("actor@example.com").expect("valid email"),
            role,
        );
        if superuser {
            user.set_superuser(true);
        }
        Actor::Known(user)
    }

    #[rstest]
    #[case(Actor::Anonymous)]
    #[case(known(Role::User, false))]
    #[case(known(Role::Moderator, false))]
    #[case(known(Role::Admin, false))]
    #[case(known(Role::User, true))]
    fn reads_are_always_allowed(#[case] actor: Actor) {
        assert!(catalogue_collection(&actor, AccessKind::Read));
        assert!(catalogue_object(&actor, AccessKind::Read));
        assert!(review_collection(&actor, AccessKind::Read));
        assert!(review_object(&actor, AccessKind::Read, UserId::random()));
    }

    #[rstest]
    #[case(Actor::Anonymous, false)]
    #[case(known(Role::User, false), false)]
    #[case(known(Role::Moderator, false), false)]
    #[case(known(Role::Admin, false), true)]
    #[case(known(Role::User, true), true)]
    #[case(known(Role::Moderator, true), true)]
    fn catalogue_writes_require_admin_or_superuser(#[case] actor: Actor, #[case] allowed: bool) {
        assert_eq!(catalogue_collection(&actor, AccessKind::Write), allowed);
        assert_eq!(catalogue_object(&actor, AccessKind::Write), allowed);
    }

    #[rstest]
    #[case(Actor::Anonymous, false)]
    #[case(known(Role::User, false), true)]
    #[case(known(Role::Moderator, false), true)]
    #[case(known(Role::Admin, false), true)]
    fn review_writes_require_authentication(#[case] actor: Actor, #[case] allowed: bool) {
        assert_eq!(review_collection(&actor, AccessKind::Write), allowed);
    }

    #[rstest]
    fn review_object_writes_allow_the_author() {
        let author = known(Role::User, false);
        let author_id = author.user().expect("known actor").id();

        assert!(review_object(&author, AccessKind::Write, author_id));
        assert!(!review_object(
            &known(Role::User, false),
            AccessKind::Write,
            author_id
        ));
    }

    #[rstest]
    #[case(known(Role::Moderator, false), true)]
    #[case(known(Role::Admin, false), true)]
    #[case(known(Role::User, true), true)]
    #[case(known(Role::User, false), false)]
    #[case(Actor::Anonymous, false)]
    fn review_object_writes_allow_privileged_roles(#[case] actor: Actor, #[case] allowed: bool) {
        assert_eq!(
            review_object(&actor, AccessKind::Write, UserId::random()),
            allowed
        );
    }

    #[rstest]
    #[case(Actor::Anonymous, false)]
    #[case(known(Role::User, false), false)]
    #[case(known(Role::Moderator, false), false)]
    #[case(known(Role::Admin, false), true)]
    #[case(known(Role::User, true), true)]
    fn user_admin_endpoint_is_admin_only(#[case] actor: Actor, #[case] allowed: bool) {
        assert_eq!(user_admin(&actor), allowed);
    }
}
