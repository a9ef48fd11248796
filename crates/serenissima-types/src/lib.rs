//! Shared type definitions for the La Serenissima simulation tooling.
//!
//! This crate is the single source of truth for all entity types used across
//! the workspace. Every entity here mirrors a row in the external Record
//! Store; the store client ([`serenissima-store`]) serializes these types
//! to and from table fields.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers (UUID newtypes plus the
//!   string-keyed identities used by the store: usernames and building ids)
//! - [`enums`] -- Enumeration types (activity/stratagem lifecycles, social
//!   classes, resources, tables)
//! - [`structs`] -- Core entity structs (citizens, activities, stratagems,
//!   relationships, contracts, resource stacks)
//! - [`position`] -- Geographic positions and the three accepted input forms
//!
//! [`serenissima-store`]: ../serenissima_store/index.html

pub mod enums;
pub mod ids;
pub mod position;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActivityStatus, ActivityType, ContractStatus, ProblemSeverity, ResourceType, SocialClass,
    StratagemStatus, StratagemType, Table,
};
pub use ids::{
    ActivityId, BuildingId, ContractId, NotificationId, RelationshipId, ResourceId, StratagemId,
    Username,
};
pub use position::{Position, PositionError};
pub use structs::{
    Activity, ActivityDetails, Building, Citizen, Contract, Notification, Problem, Relationship,
    ResourceStack, StatusError, Stratagem, StratagemParticipant,
};
