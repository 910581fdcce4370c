//! Unique identifiers for FocusForge records.
//!
//! The hosted backend assigns ids, so they are kept as opaque strings.
//! Local backends mint ULIDs.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an id issued by the backend.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh id.
            pub fn generate() -> Self {
                Self(Ulid::new().to_string())
            }

            /// Borrow the raw id.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated user (also the profile id)
    UserId
);

string_id!(
    /// Identifier of a focus session
    SessionId
);

string_id!(
    /// Identifier of a distraction event
    DistractionId
);

string_id!(
    /// Identifier of an earned badge
    BadgeId
);
