//! Core entity structs mirroring rows in the external Record Store.
//!
//! Every struct here serializes to the field set of one store table. The
//! store never owns in-memory state beyond a single invocation: these types
//! are fetched, mutated, and written back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{
    ActivityStatus, ActivityType, ContractStatus, ProblemSeverity, ResourceType, SocialClass,
    StratagemStatus, StratagemType,
};
use crate::ids::{ActivityId, BuildingId, ContractId, ResourceId, StratagemId, Username};
use crate::position::Position;

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

/// A simulated agent. Created at world bootstrap, mutated by processors,
/// never deleted during normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
    /// Stable identity used across all tables.
    pub username: Username,
    /// Given name, for display and narrative text.
    pub first_name: String,
    /// Family name, for display and narrative text.
    pub last_name: String,
    /// Currency balance in ducats.
    pub ducats: Decimal,
    /// Social class, affecting available actions and timing windows.
    pub social_class: SocialClass,
    /// Last known position, if the citizen has one recorded.
    pub position: Option<Position>,
    /// Whether the citizen currently needs to eat.
    pub hungry: bool,
    /// Whether the citizen is controlled by an AI agent rather than a human.
    pub is_ai: bool,
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A building or public work, used by activities as a location reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Stable identity used across all tables.
    pub building_id: BuildingId,
    /// Display name.
    pub name: String,
    /// The building's position, if surveyed.
    pub position: Option<Position>,
    /// When a dock manager last inspected this building, if ever.
    /// Stamped by dock management activity creation.
    pub checked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// A scheduled or completed action performed by one citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Globally unique business id, e.g. `"fishing-0192f3..."`.
    pub activity_id: String,
    /// The kind of action.
    pub activity_type: ActivityType,
    /// The acting citizen.
    pub citizen: Username,
    /// Where the citizen starts, if known.
    pub from_building: Option<BuildingId>,
    /// Where the action takes place or ends, if the type has a target.
    pub to_building: Option<BuildingId>,
    /// Window open. Always `<= end`.
    pub start: DateTime<Utc>,
    /// Window close. Always `>= start`.
    pub end: DateTime<Utc>,
    /// Lifecycle status; transitions are monotonic.
    pub status: ActivityStatus,
    /// Short human-readable title.
    pub title: String,
    /// Longer human-readable description.
    pub description: String,
    /// Type-specific structured payload.
    pub details: ActivityDetails,
}

impl Activity {
    /// Mint a new business id for an activity of the given type.
    ///
    /// UUID v7 keeps business ids sortable by creation time.
    pub fn mint_id(activity_type: ActivityType) -> String {
        format!("{}-{}", activity_type.as_str(), ActivityId::new())
    }

    /// Advance the status, enforcing the monotonic state machine.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] if the transition is not allowed.
    pub fn advance(&mut self, next: ActivityStatus) -> Result<(), StatusError> {
        if self.status.can_transition_to(next) {
            self.status = next;
            Ok(())
        } else {
            Err(StatusError {
                activity_id: self.activity_id.clone(),
                from: self.status,
                to: next,
            })
        }
    }
}

/// A disallowed activity status transition.
#[derive(Debug, thiserror::Error)]
#[error("activity {activity_id}: illegal status transition {from:?} -> {to:?}")]
pub struct StatusError {
    /// The activity whose transition was rejected.
    pub activity_id: String,
    /// The status the activity was in.
    pub from: ActivityStatus,
    /// The status the caller tried to move to.
    pub to: ActivityStatus,
}

/// Type-specific activity payload.
///
/// Replaces the free-form notes JSON of earlier tooling with a closed,
/// schema-checked set of shapes. Unknown payloads fail loudly at the
/// serialization boundary instead of deep inside a processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityDetails {
    /// No parameters beyond the common fields.
    None,
    /// Travel path from a routing service, if one was supplied.
    Goto {
        /// Waypoints along the route, start to destination.
        path: Vec<Position>,
    },
    /// Fishing expedition parameters.
    Fishing {
        /// Units of fish expected on success.
        expected_catch: u32,
    },
    /// Public dock management parameters.
    DockManagement {
        /// Fee collected per inspection, in ducats.
        inspection_fee: Decimal,
    },
    /// Participation in a collective delivery stratagem.
    CollectiveDelivery {
        /// Business id of the governing stratagem.
        stratagem_id: String,
        /// The resource being carried.
        resource: ResourceType,
        /// Units carried on this trip.
        amount: u32,
    },
}

// ---------------------------------------------------------------------------
// Stratagems
// ---------------------------------------------------------------------------

/// A longer-lived declared plan by one citizen, accumulating the outcomes
/// of many activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratagem {
    /// Globally unique business id.
    pub stratagem_id: String,
    /// The kind of plan.
    pub stratagem_type: StratagemType,
    /// The citizen who declared and funds the plan.
    pub executor: Username,
    /// The building deliveries converge on.
    pub target_building: BuildingId,
    /// The resource being collected.
    pub resource: ResourceType,
    /// Units needed for the plan to complete.
    pub target_amount: u32,
    /// Ducats paid per unit delivered.
    pub reward_per_unit: Decimal,
    /// When the plan lapses if the target is not reached.
    pub expires_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: StratagemStatus,
    /// Units delivered so far. Derived from participant rows; stored for
    /// display, recomputed on every delivery.
    pub collected_amount: u32,
}

impl Stratagem {
    /// Mint a new business id for a stratagem of the given type.
    pub fn mint_id(stratagem_type: StratagemType) -> String {
        format!("{}-{}", stratagem_type.as_str(), StratagemId::new())
    }
}

/// One citizen's participation in one stratagem.
///
/// Normalized child record: one row per (stratagem, username), so
/// concurrent deliveries by different participants touch different rows
/// instead of racing over one embedded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratagemParticipant {
    /// Business id of the stratagem joined.
    pub stratagem_id: String,
    /// The joining citizen.
    pub username: Username,
    /// When the citizen joined.
    pub joined_at: DateTime<Utc>,
    /// The citizen's trust score with the executor at join time, kept for
    /// provenance.
    pub trust_at_join: Decimal,
    /// Units delivered under this stratagem so far.
    pub amount_delivered: u32,
    /// Ducats earned under this stratagem so far.
    pub reward_earned: Decimal,
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// A pairwise record between two citizens.
///
/// Scores are stored unbounded; classification reads them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// First citizen (lexicographically smaller username by convention).
    pub citizen_a: Username,
    /// Second citizen.
    pub citizen_b: Username,
    /// Trust score; negative means distrust.
    pub trust: Decimal,
    /// Interaction strength; grows without bound.
    pub strength: Decimal,
    /// Cached classification title, refreshed by the narrative pass.
    pub title: Option<String>,
    /// Cached classification description, refreshed by the narrative pass.
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// An offer or agreement between citizens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Globally unique business id.
    pub contract_id: String,
    /// The citizen offering the asset. Only the seller may cancel.
    pub seller: Username,
    /// The accepting citizen, once one exists.
    pub buyer: Option<Username>,
    /// What is being sold (land parcel id, building id, ...).
    pub asset: String,
    /// Asking price in ducats.
    pub price: Decimal,
    /// Lifecycle status.
    pub status: ContractStatus,
}

impl Contract {
    /// Mint a new business id for a contract.
    pub fn mint_id() -> String {
        format!("contract-{}", ContractId::new())
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A stack of one resource type owned by one citizen at one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStack {
    /// Globally unique business id.
    pub resource_stack_id: String,
    /// The resource type.
    pub resource: ResourceType,
    /// The owning citizen.
    pub owner: Username,
    /// The building currently holding the stack.
    pub holder_building: BuildingId,
    /// Units in the stack. A stack at zero is kept, not deleted, so the
    /// audit trail of where goods sat stays intact.
    pub count: u32,
}

impl ResourceStack {
    /// Mint a new business id for a resource stack.
    pub fn mint_id(resource: ResourceType) -> String {
        format!("{}-{}", resource.as_str(), ResourceId::new())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A message delivered to a citizen about something done to their balance,
/// goods, or standing. Every audited effect writes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Globally unique business id.
    pub notification_id: String,
    /// The citizen concerned.
    pub citizen: Username,
    /// Human-readable reason string (e.g. `"collective_delivery_reward"`).
    pub reason: String,
    /// Free-text detail for the citizen's feed.
    pub content: String,
    /// When the effect happened.
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Mint a new business id for a notification.
    pub fn mint_id() -> String {
        format!("note-{}", crate::ids::NotificationId::new())
    }
}

// ---------------------------------------------------------------------------
// Problems (analysis only)
// ---------------------------------------------------------------------------

/// A reported problem, as surfaced by the Simulation API. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Problem identifier assigned upstream.
    pub problem_id: String,
    /// Severity band.
    pub severity: ProblemSeverity,
    /// The affected citizen, if the problem is citizen-scoped.
    pub citizen: Option<Username>,
    /// Short human-readable title.
    pub title: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn advance_rejects_backward_transitions() {
        let mut activity = Activity {
            activity_id: Activity::mint_id(ActivityType::Fishing),
            activity_type: ActivityType::Fishing,
            citizen: Username::from("TechnoMedici"),
            from_building: None,
            to_building: None,
            start: Utc::now(),
            end: Utc::now(),
            status: ActivityStatus::Created,
            title: "Fishing".to_owned(),
            description: String::new(),
            details: ActivityDetails::Fishing { expected_catch: 3 },
        };
        activity.advance(ActivityStatus::Processed).unwrap();
        let err = activity.advance(ActivityStatus::InProgress).unwrap_err();
        assert_eq!(err.from, ActivityStatus::Processed);
        assert_eq!(activity.status, ActivityStatus::Processed);
    }

    #[test]
    fn business_ids_embed_the_type() {
        let id = Activity::mint_id(ActivityType::ManagePublicDock);
        assert!(id.starts_with("manage_public_dock-"));
        let id = Stratagem::mint_id(StratagemType::OrganizeCollectiveDelivery);
        assert!(id.starts_with("organize_collective_delivery-"));
    }

    #[test]
    fn activity_details_round_trip_tagged() {
        let details = ActivityDetails::CollectiveDelivery {
            stratagem_id: "organize_collective_delivery-x".to_owned(),
            resource: ResourceType::Paper,
            amount: 10,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "collective_delivery");
        let back: ActivityDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }
}
