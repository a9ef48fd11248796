//! Enumeration types for the La Serenissima simulation tooling.
//!
//! Lifecycle enums carry their own transition rules: the status machines
//! here are the single source of truth consulted by creators and processors,
//! so a status can never silently revert to an earlier state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record Store tables
// ---------------------------------------------------------------------------

/// A table in the external Record Store, referenced by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Table {
    /// Simulated agents (human- and AI-controlled).
    Citizens,
    /// Buildings and public works, referenced by activities as locations.
    Buildings,
    /// Time-boxed citizen actions with a lifecycle status.
    Activities,
    /// Long-lived multi-participant plans.
    Stratagems,
    /// One row per (stratagem, citizen) participation.
    StratagemParticipants,
    /// Offers and agreements between citizens.
    Contracts,
    /// Resource stacks held at buildings.
    Resources,
    /// Pairwise trust/strength records between citizens.
    Relationships,
    /// Messages delivered to citizens about outcomes.
    Notifications,
}

impl Table {
    /// The table's name as the Record Store knows it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Citizens => "CITIZENS",
            Self::Buildings => "BUILDINGS",
            Self::Activities => "ACTIVITIES",
            Self::Stratagems => "STRATAGEMS",
            Self::StratagemParticipants => "STRATAGEM_PARTICIPANTS",
            Self::Contracts => "CONTRACTS",
            Self::Resources => "RESOURCES",
            Self::Relationships => "RELATIONSHIPS",
            Self::Notifications => "NOTIFICATIONS",
        }
    }
}

// ---------------------------------------------------------------------------
// Social classes
// ---------------------------------------------------------------------------

/// A citizen's social class.
///
/// Class affects which actions are available and how long the default
/// activity windows are: the leisured classes move at a statelier pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SocialClass {
    /// The patrician nobility.
    Nobili,
    /// Wealthy non-noble citizens: merchants, professionals.
    Cittadini,
    /// Artisans and shopkeepers.
    Popolani,
    /// Porters and manual laborers.
    Facchini,
    /// Foreign residents and traders.
    Forestieri,
    /// Painters, sculptors, and performers.
    Artisti,
}

impl SocialClass {
    /// Multiplier applied to default activity durations, in percent.
    ///
    /// 100 means the base duration; the nobility take half again as long
    /// over everything, laborers are brisk.
    pub const fn pace_pct(self) -> u32 {
        match self {
            Self::Nobili => 150,
            Self::Cittadini | Self::Artisti => 120,
            Self::Popolani | Self::Forestieri => 100,
            Self::Facchini => 80,
        }
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// The type of a citizen activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Travel to another building or point.
    GotoLocation,
    /// Fish from a jetty or boat; yields fish on processing.
    Fishing,
    /// Inspect and operate a public dock; the dock's `checked_at`
    /// timestamp is stamped at creation time.
    ManagePublicDock,
    /// Declare participation in a collective delivery stratagem.
    JoinCollectiveDelivery,
    /// Carry resources to the target building of a collective delivery.
    DeliverToBuilding,
}

impl ActivityType {
    /// Default duration of this activity in minutes, before the social
    /// class pace multiplier is applied.
    pub const fn default_duration_minutes(self) -> u32 {
        match self {
            Self::GotoLocation => 30,
            Self::Fishing => 90,
            Self::ManagePublicDock => 60,
            Self::JoinCollectiveDelivery => 5,
            Self::DeliverToBuilding => 45,
        }
    }

    /// Whether creating this activity requires an existing target building.
    pub const fn requires_target_building(self) -> bool {
        match self {
            Self::GotoLocation | Self::ManagePublicDock | Self::DeliverToBuilding => true,
            Self::Fishing | Self::JoinCollectiveDelivery => false,
        }
    }

    /// Stable string used in business ids and store fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GotoLocation => "goto_location",
            Self::Fishing => "fishing",
            Self::ManagePublicDock => "manage_public_dock",
            Self::JoinCollectiveDelivery => "join_collective_delivery",
            Self::DeliverToBuilding => "deliver_to_building",
        }
    }
}

/// Lifecycle status of an activity.
///
/// Transitions are monotonic: `Created -> InProgress -> Completed/Processed`,
/// with `Failed` reachable from either live state. Terminal states admit no
/// further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Recorded but not yet started.
    Created,
    /// The time window has opened.
    InProgress,
    /// The window elapsed; effects not yet applied.
    Completed,
    /// Effects applied exactly once. Terminal.
    Processed,
    /// The activity could not run or its effects could not apply. Terminal.
    Failed,
}

impl ActivityStatus {
    /// Whether this status admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }

    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// The machine never moves backwards and never leaves a terminal state.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Created => matches!(
                next,
                Self::InProgress | Self::Completed | Self::Processed | Self::Failed
            ),
            Self::InProgress => matches!(next, Self::Completed | Self::Processed | Self::Failed),
            Self::Completed => matches!(next, Self::Processed | Self::Failed),
            Self::Processed | Self::Failed => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Stratagems
// ---------------------------------------------------------------------------

/// The type of a stratagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemType {
    /// Rally citizens to deliver a resource to one building, paying a
    /// per-unit reward from the organizer's purse.
    OrganizeCollectiveDelivery,
}

impl StratagemType {
    /// Stable string used in business ids and store fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrganizeCollectiveDelivery => "organize_collective_delivery",
        }
    }
}

/// Lifecycle status of a stratagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemStatus {
    /// Accepting joins and deliveries.
    Active,
    /// Target reached or manually concluded. Terminal.
    Completed,
    /// Past the expiry timestamp. Terminal.
    Expired,
    /// Withdrawn by the executor. Terminal.
    Cancelled,
}

impl StratagemStatus {
    /// Whether this status admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Open for acceptance or cancellation.
    Active,
    /// Fulfilled. Terminal.
    Completed,
    /// Withdrawn by the seller. Terminal.
    Cancelled,
}

impl ContractStatus {
    /// Whether this status admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A tradeable resource in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Writing paper from the mainland mills.
    Paper,
    /// Fresh fish from the lagoon.
    Fish,
    /// Construction timber.
    Timber,
    /// Milled grain.
    Grain,
    /// Wine in cask.
    Wine,
    /// Salt from the pans.
    Salt,
}

impl ResourceType {
    /// Stable string used in store fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Fish => "fish",
            Self::Timber => "timber",
            Self::Grain => "grain",
            Self::Wine => "wine",
            Self::Salt => "salt",
        }
    }
}

// ---------------------------------------------------------------------------
// Problems (analysis only)
// ---------------------------------------------------------------------------

/// Severity band of a reported problem, as surfaced by the Simulation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSeverity {
    /// Cosmetic or informational.
    Low,
    /// Degraded but functioning.
    Medium,
    /// A citizen is blocked.
    High,
    /// Systemic breakage.
    Critical,
}
