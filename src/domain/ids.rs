//! Strongly typed entity identifiers.
//!
//! Each entity gets its own UUID newtype so references cannot be mixed up
//! across repositories or handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from its canonical string form.
            pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(raw).map(Self)
            }

            /// Borrow the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user account.
    UserId
);
entity_id!(
    /// Identifier of a recipe category.
    CategoryId
);
entity_id!(
    /// Identifier of a recipe.
    RecipeId
);
entity_id!(
    /// Identifier of a review.
    ReviewId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = RecipeId::generate();
        let parsed = RecipeId::parse(&id.to_string()).expect("canonical form parses");
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(UserId::parse("not-a-uuid").is_err());
    }
}
