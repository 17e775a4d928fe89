//! NewType wrappers for strong typing throughout the contact service.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing an external user id where a contact id is expected).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Opaque identifier of a persisted contact.
    ///
    /// Generated once at creation time and never reassigned. The token is
    /// also used as the database record key, so uniqueness is enforced by
    /// the store in addition to the generator's entropy.
    ContactId
);

newtype_string!(
    /// External user identifier from the authentication provider.
    ///
    /// This is the JWT `sub` claim, or "anonymous" for local single-user
    /// mode. It is used to scope contact ownership to specific users.
    ExternalUserId
);

newtype_string!(
    /// Identity provider that authenticated the user.
    ///
    /// Common values: "jwt", "anonymous". Used to determine how the
    /// credential was validated.
    IdentityProvider
);

impl ContactId {
    /// Generate a fresh contact identifier.
    ///
    /// SHA-256 digest of a random UUIDv4, rendered as 64 lowercase hex
    /// characters. Collision-resistant; no ordering or structure is implied.
    pub fn generate() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }
}
