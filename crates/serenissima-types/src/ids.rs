//! Type-safe identifier wrappers.
//!
//! Entities minted by this tooling get strongly-typed UUID v7 identifiers
//! (time-ordered, so business ids derived from them sort by creation time).
//! Entities whose identity lives in the external Record Store -- citizens
//! and buildings -- are keyed by stable strings instead, wrapped in newtypes
//! so the two kinds of string can never be swapped at a call site.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an activity (one time-boxed citizen action).
    ActivityId
}

define_id! {
    /// Unique identifier for a stratagem (a long-lived declared plan).
    StratagemId
}

define_id! {
    /// Unique identifier for a contract between citizens.
    ContractId
}

define_id! {
    /// Unique identifier for a resource stack.
    ResourceId
}

define_id! {
    /// Unique identifier for a pairwise citizen relationship record.
    RelationshipId
}

define_id! {
    /// Unique identifier for a notification delivered to a citizen.
    NotificationId
}

/// Generates a newtype wrapper around [`String`] for store-owned identities.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_string_id! {
    /// A citizen's stable username, the identity used everywhere in the
    /// Record Store (e.g. `"TechnoMedici"`).
    Username
}

define_string_id! {
    /// A building's stable identifier (e.g. `"building_45.4306_12.3355"`).
    BuildingId
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn uuid_ids_are_distinct_types() {
        let activity = ActivityId::new();
        let stratagem = StratagemId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(activity.into_inner(), Uuid::nil());
        assert_ne!(stratagem.into_inner(), Uuid::nil());
    }

    #[test]
    fn uuid_v7_ids_are_time_ordered() {
        let first = ActivityId::new();
        let second = ActivityId::new();
        assert!(first < second);
    }

    #[test]
    fn string_ids_round_trip_serde() {
        let username = Username::from("TechnoMedici");
        let json = serde_json::to_string(&username).unwrap();
        assert_eq!(json, "\"TechnoMedici\"");
        let back: Username = serde_json::from_str(&json).unwrap();
        assert_eq!(back, username);
    }

    #[test]
    fn string_ids_display_their_contents() {
        let building = BuildingId::from("building_45.4306_12.3355");
        assert_eq!(building.to_string(), "building_45.4306_12.3355");
        assert_eq!(building.as_str(), "building_45.4306_12.3355");
    }
}
