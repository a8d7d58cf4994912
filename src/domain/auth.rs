//! Authorization rule and password hashing.
//!
//! The single authorization rule in the system: mutating a recipe or review
//! requires the caller to be its owner or an admin. Violations are
//! `Forbidden`, deliberately distinct from `Unauthorized` (no valid
//! credential) and `NotFound` (resource absent).

use super::error::Error;
use super::ids::UserId;
use super::user::User;

/// Ensure the actor may mutate a resource owned by `owner`.
pub fn ensure_owner_or_admin(owner: &UserId, actor: &User) -> Result<(), Error> {
    if actor.id == *owner || actor.is_admin() {
        return Ok(());
    }
    Err(Error::forbidden(
        "you are not allowed to modify this resource",
    ))
}

/// Ensure the actor holds the admin role.
pub fn ensure_admin(actor: &User) -> Result<(), Error> {
    if actor.is_admin() {
        return Ok(());
    }
    Err(Error::forbidden("admin access required"))
}

/// Hash a raw password for storage.
pub fn hash_password(raw: &str) -> Result<String, Error> {
    bcrypt::hash(raw, bcrypt::DEFAULT_COST)
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))
}

/// Verify a raw password against a stored hash.
pub fn verify_password(raw: &str, hash: &str) -> Result<bool, Error> {
    bcrypt::verify(raw, hash)
        .map_err(|error| Error::internal(format!("password verification failed: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role};

    fn user_with_role(role: Role) -> User {
        User::new(
            "Ada".to_owned(),
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            role,
        )
    }

    #[test]
    fn owner_may_mutate() {
        let actor = user_with_role(Role::User);
        assert!(ensure_owner_or_admin(&actor.id, &actor).is_ok());
    }

    #[test]
    fn admin_may_mutate_any_resource() {
        let admin = user_with_role(Role::Admin);
        let owner = UserId::generate();
        assert!(ensure_owner_or_admin(&owner, &admin).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let actor = user_with_role(Role::User);
        let owner = UserId::generate();
        let err = ensure_owner_or_admin(&owner, &actor).expect_err("not the owner");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn non_admin_fails_admin_gate() {
        let actor = user_with_role(Role::User);
        let err = ensure_admin(&actor).expect_err("not an admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn password_round_trips_through_hash() {
        // The minimum cost (4) keeps the test fast; the service itself uses
        // DEFAULT_COST. bcrypt does not export its MIN_COST constant.
        let hash = bcrypt::hash("s3cret", 4).expect("hash");
        assert!(verify_password("s3cret", &hash).expect("verify"));
        assert!(!verify_password("wrong", &hash).expect("verify"));
    }
}
